use crate::object::Object;
use crate::token::{Token, Type, Location};

static mut HAD_ERROR: bool = false;
static mut HAD_RUNTIME_ERROR: bool = false;

/// Checks if an error occurred during scanning, parsing, resolving or interpreting.
pub fn did_error() -> bool {
    unsafe { HAD_ERROR || HAD_RUNTIME_ERROR }
}

/// Resets the error flags.
/// This is used to reset the interpreter between prompt lines.
pub fn reset_error() {
    unsafe {
        HAD_ERROR = false;
        HAD_RUNTIME_ERROR = false;
    }
}

/// Every error type must implement this trait.
pub trait Error {
    /// Prints the error message and sets the error flag.
    fn throw(&self);
}

fn report(token: &Token, message: &str) {
    if token.r#type == Type::EOF {
        eprintln!("[line {}] Error at end: {}", token.location.line, message);
    } else {
        eprintln!("[line {}] Error at '{}': {}", token.location.line, token.lexeme, message);
    }
}

/// Represents an error that occurs during scanning.
#[derive(Debug)]
pub struct ScanError {
    pub location: Location,
    pub message: String,
}

impl Error for ScanError {
    fn throw(&self) {
        eprintln!("[line {}] Error: {}", self.location.line, self.message);

        unsafe {
            HAD_ERROR = true;
        }
    }
}

/// Represents an error that occurs during parsing.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Error for ParseError {
    fn throw(&self) {
        report(&self.token, &self.message);

        unsafe {
            HAD_ERROR = true;
        }
    }
}

/// Represents an error that occurs during resolution.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Error for ResolveError {
    fn throw(&self) {
        report(&self.token, &self.message);

        unsafe {
            HAD_ERROR = true;
        }
    }
}

/// Represents an error that occurs during runtime.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Error for RuntimeError {
    fn throw(&self) {
        report(&self.token, &self.message);

        unsafe {
            HAD_RUNTIME_ERROR = true;
        }
    }
}

/// A non-local control transfer raised during evaluation.
///
/// Return, break and continue unwind the evaluator the same way a runtime
/// error does, but they are control flow, not failures: a return is caught
/// at the innermost call dispatch, break and continue at the innermost
/// loop. Whatever reaches the top level uncaught is reported as an error.
#[derive(Debug)]
pub enum Escape {
    Return(Token, Object),
    Break(Token),
    Continue(Token),
    Error(RuntimeError),
}

impl From<RuntimeError> for Escape {
    fn from(error: RuntimeError) -> Self {
        Escape::Error(error)
    }
}
