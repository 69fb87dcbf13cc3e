//! The `Callable` capability and its function variants.
//!
//! Three value kinds can be called: host‑provided [`NativeFunction`]s,
//! user‑defined [`LoxFunction`] closures, and classes
//! ([`LoxClass`](crate::class::LoxClass), which construct an instance).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

pub trait Callable {
    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    /// Invoke with already‑evaluated arguments.  The caller has checked the
    /// argument count against [`arity`](Callable::arity); `paren` locates
    /// runtime errors.
    fn call(
        self: Rc<Self>,
        interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value>;
}

/// Signature of a host function.  Errors are plain messages; the call site
/// attaches the line.
pub type NativeFn = fn(&Interpreter, &[Value]) -> std::result::Result<Value, String>;

pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn new<S: Into<String>>(name: S, arity: usize, func: NativeFn) -> Self {
        Self {
            name: name.into(),
            arity,
            func,
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        self: Rc<Self>,
        interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(interpreter, &arguments).map_err(|message| LoxError::runtime(paren, message))
    }
}

/// User function or method: declaration plus the environment it closes over.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn is_initializer(&self) -> bool {
        self.is_initializer
    }

    /// A fresh copy of this method whose closure defines `this` as
    /// `instance`, one scope inside the original closure.
    pub fn bind(&self, instance: Rc<LoxInstance>) -> LoxFunction {
        let mut env = Environment::with_enclosing(Rc::clone(&self.closure));
        env.define("this", Value::Instance(instance));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(env)),
            is_initializer: self.is_initializer,
        }
    }

    fn this(&self, paren: &Token) -> Result<Value> {
        self.closure
            .borrow()
            .get_at(0, "this")
            .ok_or_else(|| LoxError::runtime(paren, "Initializer is not bound to an instance."))
    }
}

impl fmt::Debug for LoxFunction {
    // The closure is left out: it can contain this very function.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.declaration.name.lexeme)
            .field("arity", &self.declaration.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

impl Callable for LoxFunction {
    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        self: Rc<Self>,
        interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        let mut env = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            env.define(&param.lexeme, argument);
        }

        let flow: Flow =
            interpreter.execute_block(&self.declaration.body, Rc::new(RefCell::new(env)))?;

        if self.is_initializer {
            return self.this(paren);
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal | Flow::Break => Ok(Value::Nil),
        }
    }
}
