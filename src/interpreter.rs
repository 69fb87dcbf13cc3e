//! Tree‑walking evaluator.
//!
//! Statements return a [`Flow`] describing how control leaves them; `break`
//! and `return` travel outward as values until a loop or call boundary
//! consumes them.  Runtime errors travel as `Err(LoxError::Runtime)` all the
//! way to [`Interpreter::interpret`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info, trace};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::callable::{Callable, LoxFunction, NativeFunction};
use crate::class::LoxClass;
use crate::environment::{undefined, Environment};
use crate::error::{LoxError, Result, Warning};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How control left a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Break,
    Return(Value),
}

/// Collaborator behind `execute "path";`.  Implementations typically run
/// the whole pipeline on the named script against `interpreter`.
pub trait ScriptLoader {
    fn execute(&self, interpreter: &mut Interpreter, path: &str) -> Result<()>;
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
    loader: Option<Rc<dyn ScriptLoader>>,
    warnings: Vec<Warning>,
    started: Instant,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Interpreter printing to `output`; defines the native functions.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Native(Rc::new(NativeFunction::new("clock", 0, |interpreter, _args| {
                Ok(Value::Number(interpreter.started.elapsed().as_secs_f64()))
            }))),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
            loader: None,
            warnings: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn with_loader(mut self, loader: Rc<dyn ScriptLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn set_loader(&mut self, loader: Rc<dyn ScriptLoader>) {
        self.loader = Some(loader);
    }

    pub fn globals(&self) -> Rc<RefCell<Environment>> {
        Rc::clone(&self.globals)
    }

    /// Queues a warning found while running, e.g. in an `execute`d script.
    pub fn report_warning(&mut self, warning: Warning) {
        debug!("Queued warning: {}", warning);

        self.warnings.push(warning);
    }

    /// Hands over every warning queued since the last call.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Records the scope distance computed by the resolver for one
    /// variable occurrence.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        trace!("Recording {:?} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Runs a program at top level, in the global scope.  Stops at the first
    /// runtime error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        info!("Interpreting {} statements", statements.len());

        let previous = std::mem::replace(&mut self.environment, Rc::clone(&self.globals));
        let result = self.run_statements(statements);
        self.environment = previous;

        self.output.flush()?;
        result?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Executes `statements` inside `environment`, restoring the current
    /// environment on every exit path.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.run_statements(statements);
        self.environment = previous;
        result
    }

    fn run_statements(&mut self, statements: &[Stmt]) -> Result<Flow> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                signal => return Ok(signal),
            }
        }
        Ok(Flow::Normal)
    }

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let env = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, Rc::new(RefCell::new(env)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                debug!("Entering while loop");
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
                debug!("Exited while loop");
                Ok(Flow::Normal)
            }

            Stmt::Break { .. } => Ok(Flow::Break),

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);
                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                self.execute_class(name, superclass.as_ref(), methods)?;
                Ok(Flow::Normal)
            }

            Stmt::Execute { keyword, path } => {
                let path: Rc<str> = match self.evaluate(path)? {
                    Value::String(path) => path,
                    _ => return Err(LoxError::runtime(keyword, "Execute path must be a string.")),
                };
                let loader = self
                    .loader
                    .clone()
                    .ok_or_else(|| LoxError::runtime(keyword, "No script loader available."))?;

                info!("Executing script '{}'", path);
                loader.execute(self, &path)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<()> {
        debug!("Declaring class '{}'", name.lexeme);

        // Declared first so methods can refer to the class by name.
        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        let superclass: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let at: &Token = match expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };
                    return Err(LoxError::runtime(at, "Superclass must be a class."));
                }
            },
            None => None,
        };

        let enclosing: Option<Rc<RefCell<Environment>>> = superclass.as_ref().map(|class| {
            let mut env = Environment::with_enclosing(Rc::clone(&self.environment));
            env.define("super", Value::Class(Rc::clone(class)));
            std::mem::replace(&mut self.environment, Rc::new(RefCell::new(env)))
        });

        let mut table: HashMap<String, Rc<LoxFunction>> = HashMap::new();
        for method in methods {
            let function = LoxFunction::new(
                Rc::clone(method),
                Rc::clone(&self.environment),
                method.name.lexeme == "init",
            );
            table.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = LoxClass::new(name.lexeme.clone(), superclass, table);

        if let Some(previous) = enclosing {
            self.environment = previous;
        }

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))?;

        info!("Class '{}' defined", name.lexeme);
        Ok(())
    }

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        trace!("Evaluating expression: {:?}", expr);

        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let decided = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&distance) => {
                        if !self
                            .environment
                            .borrow_mut()
                            .assign_at(distance, &name.lexeme, value.clone())
                        {
                            return Err(undefined(name));
                        }
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                let callable: Rc<dyn Callable> = callee.as_callable().ok_or_else(|| {
                    LoxError::runtime(paren, "Can only call functions and classes.")
                })?;

                if values.len() != callable.arity() {
                    return Err(LoxError::runtime(
                        paren,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            values.len()
                        ),
                    ));
                }

                callable.call(self, paren, values)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let instance = match self.evaluate(object)? {
                    Value::Instance(instance) => instance,
                    _ => return Err(LoxError::runtime(name, "Only instances have fields.")),
                };
                let value = self.evaluate(value)?;
                instance.set(name, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        trace!("Binary {} on {} and {}", operator.lexeme, left, right);

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{}{}", a, b))),
                (Value::String(a), other) => Ok(Value::string(format!("{}{}", a, other))),
                (other, Value::String(b)) => Ok(Value::string(format!("{}{}", other, b))),
                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or at least one string.",
                )),
            },

            TokenType::MINUS => numeric(operator, left, right, |a, b| Value::Number(a - b)),
            TokenType::STAR => numeric(operator, left, right, |a, b| Value::Number(a * b)),
            TokenType::SLASH => numeric(operator, left, right, |a, b| Value::Number(a / b)),

            TokenType::GREATER => numeric(operator, left, right, |a, b| Value::Bool(a > b)),
            TokenType::GREATER_EQUAL => numeric(operator, left, right, |a, b| Value::Bool(a >= b)),
            TokenType::LESS => numeric(operator, left, right, |a, b| Value::Bool(a < b)),
            TokenType::LESS_EQUAL => numeric(operator, left, right, |a, b| Value::Bool(a <= b)),

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
        }
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance: usize = *self.locals.get(&id).ok_or_else(|| undefined(keyword))?;

        let scope: Rc<RefCell<Environment>> = Environment::ancestor(&self.environment, distance)
            .ok_or_else(|| undefined(keyword))?;

        let superclass: Rc<LoxClass> = match scope.borrow().get_at(0, "super") {
            Some(Value::Class(class)) => class,
            _ => return Err(undefined(keyword)),
        };

        // `this` always sits one scope inside `super`.
        let instance = match self
            .environment
            .borrow()
            .get_at(distance.saturating_sub(1), "this")
        {
            Some(Value::Instance(instance)) => instance,
            _ => return Err(LoxError::runtime(keyword, "Undefined variable 'this'.")),
        };

        let found: Rc<LoxFunction> = superclass.find_method(&method.lexeme).ok_or_else(|| {
            LoxError::runtime(method, format!("Undefined property '{}'.", method.lexeme))
        })?;

        Ok(Value::Function(Rc::new(found.bind(instance))))
    }

    /// Resolved occurrences read the exact scope the resolver picked; the
    /// rest are globals, looked up by name at run time.
    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => self
                .environment
                .borrow()
                .get_at(distance, &name.lexeme)
                .ok_or_else(|| undefined(name)),
            None => self.globals.borrow().get(name),
        }
    }
}

fn numeric(
    operator: &Token,
    left: Value,
    right: Value,
    op: impl FnOnce(f64, f64) -> Value,
) -> Result<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(op(a, b)),
        _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
    }
}
