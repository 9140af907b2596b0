use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{Error, Escape, RuntimeError};
use crate::expr::{Expr, ExprVisitor};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Type};

/// Walks the AST and executes it.
///
/// The interpreter keeps the global environment, the current environment and
/// the side table built by the resolver. Variable uses recorded in the side
/// table are read at exactly the recorded depth; everything else goes to the
/// globals. `print` output goes to the injected sink so the driver and the
/// tests decide where it ends up.
pub struct Interpreter<'out> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<Token, usize>,
    out: Box<dyn Write + 'out>,
}

impl<'out> Interpreter<'out> {
    pub fn new(out: Box<dyn Write + 'out>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            let name = native.name.lexeme.clone();
            globals.borrow_mut().define(&name, Object::from(native));
        }

        Interpreter {
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Interprets a list of statements.
    ///
    /// A runtime error, or an escape that nothing caught, is reported and
    /// stops execution of the remaining statements.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            if let Err(escape) = self.execute(statement) {
                match escape {
                    Escape::Error(error) => error.throw(),
                    Escape::Return(keyword, _) => RuntimeError {
                        token: keyword,
                        message: "Return statement at the top level".to_string(),
                    }.throw(),
                    Escape::Break(keyword) => RuntimeError {
                        token: keyword,
                        message: "Break statement at the top level".to_string(),
                    }.throw(),
                    Escape::Continue(keyword) => RuntimeError {
                        token: keyword,
                        message: "Continue statement at the top level".to_string(),
                    }.throw(),
                }
                return;
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, Escape> {
        expr.accept(self)
    }

    /// Executes statements in the given environment, restoring the previous
    /// one afterwards no matter how the block exits.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<(), Escape> {
        let previous = mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    /// Records how many environments sit between a variable use and its
    /// declaration. Called by the resolver.
    pub fn resolve(&mut self, name: &Token, depth: usize) {
        self.locals.insert(name.clone(), depth);
    }

    fn look_up_variable(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(name) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn check_number_operand(operator: &Token, operand: &Object) -> Result<f64, RuntimeError> {
        match operand {
            Object::Literal(Literal::Number(n)) => Ok(*n),
            _ => Err(RuntimeError {
                token: operator.clone(),
                message: "Operand must be a number".to_string(),
            }),
        }
    }

    fn check_number_operands(operator: &Token, left: &Object, right: &Object) -> Result<(f64, f64), RuntimeError> {
        match (left, right) {
            (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Ok((*l, *r)),
            _ => Err(RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers".to_string(),
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn sink() -> Interpreter<'static> {
        Interpreter::new(Box::new(std::io::sink()))
    }

    #[cfg(test)]
    pub(crate) fn hop_count(&self, name: &Token) -> Option<usize> {
        self.locals.get(name).copied()
    }
}

impl<'out> ExprVisitor<Result<Object, Escape>> for Interpreter<'out> {
    fn visit_literal_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Literal(literal) = expr else { unreachable!() };

        Ok(Object::from(literal.clone()))
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Grouping(grouping) = expr else { unreachable!() };

        self.evaluate(&grouping.expr)
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Unary(unary) = expr else { unreachable!() };

        let right = self.evaluate(&unary.expr)?;

        match unary.operator.r#type {
            Type::Minus => {
                let value = Self::check_number_operand(&unary.operator, &right)?;
                Ok(Object::from(-value))
            },
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!(),
        }
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Binary(binary) = expr else { unreachable!() };

        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;

        match binary.operator.r#type {
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),

            Type::Greater => {
                let (l, r) = Self::check_number_operands(&binary.operator, &left, &right)?;
                Ok(Object::from(l > r))
            },
            Type::GreaterEqual => {
                let (l, r) = Self::check_number_operands(&binary.operator, &left, &right)?;
                Ok(Object::from(l >= r))
            },
            Type::Less => {
                let (l, r) = Self::check_number_operands(&binary.operator, &left, &right)?;
                Ok(Object::from(l < r))
            },
            Type::LessEqual => {
                let (l, r) = Self::check_number_operands(&binary.operator, &left, &right)?;
                Ok(Object::from(l <= r))
            },

            Type::Minus => {
                let (l, r) = Self::check_number_operands(&binary.operator, &left, &right)?;
                Ok(Object::from(l - r))
            },
            Type::Star => {
                let (l, r) = Self::check_number_operands(&binary.operator, &left, &right)?;
                Ok(Object::from(l * r))
            },
            Type::Slash => {
                let (l, r) = Self::check_number_operands(&binary.operator, &left, &right)?;
                if r == 0.0 {
                    return Err(RuntimeError {
                        token: binary.operator.clone(),
                        message: "Division by zero".to_string(),
                    }.into());
                }
                Ok(Object::from(l / r))
            },

            Type::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => {
                    Ok(Object::from(l + r))
                },
                (Object::Literal(Literal::String(l)), Object::Literal(Literal::String(r))) => {
                    Ok(Object::from(format!("{l}{r}")))
                },
                _ => Err(RuntimeError {
                    token: binary.operator.clone(),
                    message: "Operands must be two numbers or two strings".to_string(),
                }.into()),
            },

            _ => unreachable!(),
        }
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Logical(logical) = expr else { unreachable!() };

        let left = self.evaluate(&logical.left)?;

        // Short-circuits to the operand that decided the result,
        // without coercing it to a boolean.
        if logical.operator.r#type == Type::Or {
            if left.is_truthy() {
                return Ok(left);
            }
        } else if !left.is_truthy() {
            return Ok(left);
        }

        self.evaluate(&logical.right)
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Variable(variable) = expr else { unreachable!() };

        Ok(self.look_up_variable(&variable.name)?)
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Assign(assign) = expr else { unreachable!() };

        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.name) {
            Some(distance) => {
                self.environment.borrow_mut().assign_at(*distance, &assign.name, value.clone());
            },
            None => {
                self.globals.borrow_mut().assign(&assign.name, value.clone())?;
            },
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Call(call) = expr else { unreachable!() };

        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let callable: &dyn Callable = match &callee {
            Object::Function(function) => function,
            Object::NativeFunction(function) => function,
            Object::Class(class) => class.as_ref(),
            _ => return Err(RuntimeError {
                token: call.paren.clone(),
                message: "Can only call functions and classes".to_string(),
            }.into()),
        };

        if callable.arity() != arguments.len() {
            return Err(RuntimeError {
                token: call.paren.clone(),
                message: format!(
                    "Expected {} parameters, but got {} arguments",
                    callable.arity(),
                    arguments.len()
                ),
            }.into());
        }

        // The call boundary: a return escape is caught here, while break
        // and continue must not make it out of the function.
        match callable.call(self, arguments) {
            Ok(value) => Ok(value),
            Err(Escape::Return(_, value)) => Ok(value),
            Err(Escape::Break(keyword)) => Err(RuntimeError {
                token: keyword,
                message: "Break statement at the function level".to_string(),
            }.into()),
            Err(Escape::Continue(keyword)) => Err(RuntimeError {
                token: keyword,
                message: "Continue statement at the function level".to_string(),
            }.into()),
            Err(escape) => Err(escape),
        }
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Get(get) = expr else { unreachable!() };

        let object = self.evaluate(&get.object)?;

        match &object {
            Object::Instance(instance) => Ok(instance.borrow().get(&get.name, &object)?),
            _ => Err(RuntimeError {
                token: get.name.clone(),
                message: "Only instances have properties".to_string(),
            }.into()),
        }
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Set(set) = expr else { unreachable!() };

        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = &object else {
            return Err(RuntimeError {
                token: set.name.clone(),
                message: "Only instances have properties".to_string(),
            }.into());
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());

        Ok(value)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::This(this) = expr else { unreachable!() };

        Ok(self.look_up_variable(&this.keyword)?)
    }

    fn visit_super_expr(&mut self, expr: &Expr) -> Result<Object, Escape> {
        let Expr::Super(super_expr) = expr else { unreachable!() };

        let Some(distance) = self.locals.get(&super_expr.keyword).copied() else {
            return Err(RuntimeError {
                token: super_expr.keyword.clone(),
                message: "Cannot use 'super' outside of a subclass".to_string(),
            }.into());
        };

        let superclass = self.environment.borrow().get_at(distance, &super_expr.keyword)?;
        let Object::Class(superclass) = superclass else { unreachable!() };

        // `this` always lives exactly one frame inside the frame holding
        // `super`; the lookup is static even though the receiver is not.
        let instance = self.environment.borrow().get_at(distance - 1, &Token::from("this"))?;

        match superclass.find_method(&super_expr.method.lexeme) {
            Some(method) => Ok(Object::from(method.bind(&instance))),
            None => Err(RuntimeError {
                token: super_expr.method.clone(),
                message: format!("Undefined property '{}'", super_expr.method.lexeme),
            }.into()),
        }
    }
}

impl<'out> StmtVisitor<Result<(), Escape>> for Interpreter<'out> {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Expression(data) = stmt else { unreachable!() };

        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Print(data) = stmt else { unreachable!() };

        let value = self.evaluate(&data.expr)?;
        writeln!(self.out, "{value}").expect("output stream to be writable");

        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Var(data) = stmt else { unreachable!() };

        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Block(data) = stmt else { unreachable!() };

        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&data.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::If(data) = stmt else { unreachable!() };

        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)?;
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)?;
        }

        Ok(())
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::While(data) = stmt else { unreachable!() };

        while self.evaluate(&data.condition)?.is_truthy() {
            match self.execute(&data.body) {
                Ok(()) => (),
                Err(Escape::Break(_)) => break,
                Err(Escape::Continue(_)) => {
                    // A for loop keeps its update expression as the second
                    // statement of the body block. Continue skips the rest
                    // of the body but the update must still run, in its own
                    // scope to keep name resolution right.
                    if data.is_desugared_for {
                        let Stmt::Block(block) = &*data.body else { unreachable!() };

                        let environment = Environment::new(Some(Rc::clone(&self.environment)));
                        self.execute_block(&block.statements[1..], Rc::new(RefCell::new(environment)))?;
                    }
                },
                Err(escape) => return Err(escape),
            }
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Function(data) = stmt else { unreachable!() };

        let function = Function::new(data, Rc::clone(&self.environment));
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(function));

        Ok(())
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Class(data) = stmt else { unreachable!() };

        let superclass = match &data.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Object::Class(class) => Some(class),
                _ => {
                    let Expr::Variable(variable) = expr else { unreachable!() };
                    return Err(RuntimeError {
                        token: variable.name.clone(),
                        message: "Superclass must be a class".to_string(),
                    }.into());
                },
            },
            None => None,
        };

        // Methods close over an extra frame holding `super` so that super
        // calls inside them can find it later, long after this scope is
        // gone. The resolver pushes the matching scope.
        if let Some(superclass) = &superclass {
            let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
            environment.borrow_mut().define("super", Object::Class(Rc::clone(superclass)));
            self.environment = environment;
        }

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(function) = method else { unreachable!() };

            methods.insert(
                function.name.lexeme.clone(),
                Function::new(function, Rc::clone(&self.environment)),
            );
        }

        if superclass.is_some() {
            let enclosing = self.environment.borrow().enclosing.clone()
                .expect("super scope to have an enclosing environment");
            self.environment = enclosing;
        }

        let class = Class::new(data.name.lexeme.clone(), superclass, methods);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Rc::new(class)));

        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Return(data) = stmt else { unreachable!() };

        let value = match &data.value {
            Some(value) => self.evaluate(value)?,
            None => Object::from(Literal::Nil),
        };

        Err(Escape::Return(data.keyword.clone(), value))
    }

    fn visit_break_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Break(data) = stmt else { unreachable!() };

        Err(Escape::Break(data.keyword.clone()))
    }

    fn visit_continue_stmt(&mut self, stmt: &Stmt) -> Result<(), Escape> {
        let Stmt::Continue(data) = stmt else { unreachable!() };

        Err(Escape::Continue(data.keyword.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::expr::{BinaryData, GroupingData, LogicalData, UnaryData};
    use crate::token::Location;

    fn token(r#type: Type, lexeme: &str) -> Token {
        Token::new(r#type, lexeme.to_string(), None, Location::new(1, 0))
    }

    fn number(n: f64) -> Expr {
        Expr::Literal(Literal::Number(n))
    }

    fn string(s: &str) -> Expr {
        Expr::Literal(Literal::String(s.to_string()))
    }

    fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
        Expr::Binary(BinaryData {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    #[test]
    fn evaluate_literal() {
        let mut interpreter = Interpreter::sink();
        let value = interpreter.evaluate(&number(12.0)).unwrap();
        assert_eq!(value, Object::from(12.0));
    }

    #[test]
    fn evaluate_grouping() {
        let mut interpreter = Interpreter::sink();
        let expr = Expr::Grouping(GroupingData { expr: Box::new(number(12.0)) });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(12.0));
    }

    #[test]
    fn evaluate_unary_minus() {
        let mut interpreter = Interpreter::sink();
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Minus, "-"),
            expr: Box::new(number(12.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(-12.0));
    }

    #[test]
    fn evaluate_unary_minus_on_string_is_an_error() {
        let mut interpreter = Interpreter::sink();
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Minus, "-"),
            expr: Box::new(string("no")),
        });

        let Err(Escape::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Operand must be a number");
    }

    #[test]
    fn evaluate_bang_uses_truthiness() {
        let mut interpreter = Interpreter::sink();
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Bang, "!"),
            expr: Box::new(number(0.0)),
        });
        // 0 is truthy, so !0 is false.
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(false));
    }

    #[test]
    fn evaluate_arithmetic() {
        let mut interpreter = Interpreter::sink();
        let expr = binary(number(6.0), token(Type::Star, "*"), number(7.0));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(42.0));
    }

    #[test]
    fn evaluate_string_concatenation() {
        let mut interpreter = Interpreter::sink();
        let expr = binary(string("foo"), token(Type::Plus, "+"), string("bar"));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("foobar"));
    }

    #[test]
    fn adding_string_and_number_is_an_error() {
        let mut interpreter = Interpreter::sink();
        let expr = binary(string("foo"), token(Type::Plus, "+"), number(1.0));

        let Err(Escape::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Operands must be two numbers or two strings");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let mut interpreter = Interpreter::sink();
        let expr = binary(number(1.0), token(Type::Slash, "/"), number(0.0));

        let Err(Escape::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Division by zero");
    }

    #[test]
    fn comparison_requires_numbers() {
        let mut interpreter = Interpreter::sink();
        let expr = binary(string("a"), token(Type::Less, "<"), number(1.0));

        let Err(Escape::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Operands must be numbers");
    }

    #[test]
    fn equality_across_types_is_false() {
        let mut interpreter = Interpreter::sink();
        let expr = binary(number(1.0), token(Type::EqualEqual, "=="), string("1"));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(false));

        let expr = binary(
            Expr::Literal(Literal::Nil),
            token(Type::EqualEqual, "=="),
            Expr::Literal(Literal::Nil),
        );
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(true));
    }

    #[test]
    fn logical_operators_return_the_deciding_operand() {
        let mut interpreter = Interpreter::sink();

        let expr = Expr::Logical(LogicalData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::Or, "or"),
            right: Box::new(string("fallback")),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("fallback"));

        let expr = Expr::Logical(LogicalData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::And, "and"),
            right: Box::new(string("never")),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(Literal::Nil));
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let mut interpreter = Interpreter::sink();
        let expr = Expr::Variable(crate::expr::VariableData { name: token(Type::Identifier, "ghost") });

        let Err(Escape::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Undefined variable 'ghost'");
    }

    #[test]
    fn calling_a_number_is_an_error() {
        let mut interpreter = Interpreter::sink();
        let expr = Expr::Call(crate::expr::CallData {
            callee: Box::new(number(4.0)),
            paren: token(Type::RightParen, ")"),
            arguments: vec![],
        });

        let Err(Escape::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Can only call functions and classes");
    }

    #[test]
    fn clock_returns_a_number() {
        let mut interpreter = Interpreter::sink();
        let expr = Expr::Call(crate::expr::CallData {
            callee: Box::new(Expr::Variable(crate::expr::VariableData {
                name: token(Type::Identifier, "clock"),
            })),
            paren: token(Type::RightParen, ")"),
            arguments: vec![],
        });

        let value = interpreter.evaluate(&expr).unwrap();
        let Object::Literal(Literal::Number(seconds)) = value else {
            panic!("expected a number");
        };
        assert!(seconds > 0.0);
    }

    #[test]
    fn print_writes_to_the_injected_sink() {
        let mut output = Vec::new();
        {
            let mut interpreter = Interpreter::new(Box::new(&mut output));
            let stmt = Stmt::Print(crate::stmt::PrintData { expr: number(3.0) });
            interpreter.execute(&stmt).unwrap();
        }

        assert_eq!(std::str::from_utf8(&output).unwrap(), "3\n");
    }
}
