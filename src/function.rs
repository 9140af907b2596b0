use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{Escape, RuntimeError};
use crate::interpreter::Interpreter;
use crate::object::{Object, Callable};
use crate::stmt::FunctionData;
use crate::token::Token;

/// A user function: its declaration plus the environment it closed over.
///
/// The closure is shared, not copied. Mutating a captured variable after the
/// function is built is visible through every closure over the same frame.
#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: Rc<FunctionData>,
    pub closure: Rc<RefCell<Environment>>,
}

impl Function {
    pub fn new(declaration: &FunctionData, closure: Rc<RefCell<Environment>>) -> Self {
        Function {
            declaration: Rc::new(declaration.clone()),
            closure,
        }
    }

    /// Returns a copy of this function whose closure is extended by one
    /// frame binding `this` to the given instance. The resolver accounts for
    /// that extra frame when it resolves `this` inside method bodies.
    pub fn bind(&self, instance: &Object) -> Function {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));
        environment.borrow_mut().define("this", instance.clone());

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
        }
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Escape> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        self.declaration.params.iter().zip(arguments).for_each(|(param, arg)| {
            environment.define(&param.lexeme, arg);
        });

        interpreter.execute_block(&self.declaration.body, Rc::new(RefCell::new(environment)))?;

        Ok(Object::from(crate::literal::Literal::Nil))
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// A function provided by the interpreter itself.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: Token,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Escape> {
        (self.function)(interpreter, arguments).map_err(Escape::from)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    pub fn get_globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: Token::from("clock"),
                arity: 0,
                function: |_, _| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .expect("system clock to be set past the epoch")
                        .as_secs();
                    Ok(Object::from(now as f64))
                },
            },
        ]
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name.lexeme)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name.lexeme)
    }
}
