use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

use crate::error::{Escape, RuntimeError};
use crate::function::Function;
use crate::object::{Callable, Object};
use crate::interpreter::Interpreter;
use crate::token::Token;

/// A class: a name, an optional superclass and a method table.
/// Methods are stored unbound; they pick up a receiver on lookup.
#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Function>,
}

impl Class {
    pub fn new(name: String, superclass: Option<Rc<Class>>, methods: HashMap<String, Function>) -> Self {
        Class { name, superclass, methods }
    }

    /// Returns the method with the given name, searching up the superclass
    /// chain.
    pub fn find_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        match &self.superclass {
            Some(superclass) => superclass.find_method(name),
            None => None,
        }
    }
}

impl Callable for Class {
    fn arity(&self) -> usize {
        match self.find_method("init") {
            Some(init) => init.arity(),
            None => 0,
        }
    }

    /// Calling a class constructs an instance of it. If an initializer is
    /// defined anywhere on the class chain it runs bound to the fresh
    /// instance; the call evaluates to the instance either way, even when
    /// the initializer returns early.
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Escape> {
        let instance = Object::from(Instance {
            class: Rc::new(self.clone()),
            fields: HashMap::new(),
        });

        if let Some(init) = self.find_method("init") {
            match init.bind(&instance).call(interpreter, arguments) {
                Ok(_) | Err(Escape::Return(_, _)) => (),
                Err(escape) => return Err(escape),
            }
        }

        Ok(instance)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

/// An instance of a class: a reference to the class plus an open field map.
#[derive(Debug, Clone)]
pub struct Instance {
    pub class: Rc<Class>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    /// Looks up a property. Fields shadow methods; a method found on the
    /// class chain is returned bound to this instance.
    pub fn get(&self, name: &Token, instance: &Object) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            Ok(field.clone())
        } else if let Some(method) = self.class.find_method(&name.lexeme) {
            Ok(Object::from(method.bind(instance)))
        } else {
            Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined property '{}'", name.lexeme),
            })
        }
    }

    /// Writes a field, creating it on first assignment.
    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl From<&Rc<Class>> for Instance {
    fn from(value: &Rc<Class>) -> Self {
        Instance { class: Rc::clone(value), fields: HashMap::new() }
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} object>", self.class.name)
    }
}
