//! Slate is a small, dynamically typed scripting language with lexical
//! scoping, first-class functions and classes with single inheritance. It is
//! implemented as a tree-walk interpreter with a hand-written recursive
//! descent parser.
//!
//! ## Pipeline
//! Source text goes through four passes:
//!
//! 1. **Scanning** ([`scanner`]) turns the characters into a flat list of
//!    [`Token`](token::Token)s ending with an EOF sentinel. Problems at this
//!    stage are single-character affairs like an unterminated string; they
//!    are reported and the scanner keeps going so several of them can be
//!    fixed at once.
//! 2. **Parsing** ([`parser`]) builds the abstract syntax tree out of
//!    [`Expr`](expr::Expr) and [`Stmt`](stmt::Stmt) nodes. `for` loops do
//!    not survive this stage: they are rewritten into plain while loops
//!    inside a block. On a syntax error the parser synchronizes to the next
//!    statement boundary and carries on.
//! 3. **Resolving** ([`resolver`]) walks the finished tree once and records,
//!    for every local variable use, how many scopes lie between the use and
//!    the declaration it refers to. The interpreter later follows exactly
//!    that many environment links, which is what makes closures capture the
//!    binding they saw and not whatever happens to shadow it at call time.
//! 4. **Interpreting** ([`interpreter`]) executes the tree, threading
//!    [`Object`](object::Object) values through a chain of
//!    [`Environment`](environment::Environment)s. Return, break and continue
//!    travel as typed escapes distinct from runtime errors.
//!
//! Running a file interprets it once and exits non-zero if anything was
//! reported. Running without arguments starts a prompt that reuses one
//! interpreter instance across lines, so definitions persist.

use std::{fs, process};
use std::io::Write;

pub mod error;
pub mod token;
pub mod scanner;
pub mod expr;
pub mod stmt;
pub mod environment;
pub mod parser;
pub mod ast;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod function;
pub mod resolver;
pub mod class;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use parser::Parser;
use scanner::Scanner;
use resolver::Resolver;

#[allow(non_camel_case_types)]
pub struct slate<'out> {
    interpreter: interpreter::Interpreter<'out>,
}

impl<'out> slate<'out> {
    /// Creates a new interpreter writing `print` output to the given sink.
    pub fn new(out: &'out mut dyn Write) -> Self {
        slate {
            interpreter: interpreter::Interpreter::new(Box::new(out)),
        }
    }

    /// Reads and interprets a script file.
    /// Exits with 65 if any diagnostic was reported.
    pub fn run_file(&mut self, path: String) {
        let contents = fs::read_to_string(path)
            .expect("Should have been able to read the file");

        self.run(&contents);

        if error::did_error() {
            process::exit(65);
        }
    }

    /// Runs an interactive prompt.
    ///
    /// Lines share one interpreter, so variables and functions defined on
    /// earlier lines stay visible. Error flags are cleared between lines.
    /// History is kept in `~/.slate_history` across sessions.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("line editor to initialize");

        let history = home::home_dir().map(|dir| dir.join(".slate_history"));
        if let Some(history) = &history {
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());

                    self.run(&line);
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("readline error: {error}");
                    break;
                },
            }
        }

        if let Some(history) = &history {
            let _ = editor.save_history(history);
        }
    }

    /// Runs a chunk of source through the whole pipeline.
    /// Each stage only runs when the previous ones reported nothing.
    fn run(&mut self, source: &str) {
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
