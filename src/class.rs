use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::{Callable, LoxFunction};
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// A class: its name, optional superclass and method table.
///
/// The superclass chain is acyclic; the resolver rejects `class A < A` and a
/// class value only exists once its declaration has finished.
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    /// Own methods first, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }
}

impl Callable for LoxClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.find_method("init").map(|init| init.arity()).unwrap_or(0)
    }

    fn call(
        self: Rc<Self>,
        interpreter: &mut Interpreter,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Constructing instance of '{}'", self.name);

        let instance = Rc::new(LoxInstance::new(Rc::clone(&self)));

        if let Some(init) = self.find_method("init") {
            Rc::new(init.bind(Rc::clone(&instance))).call(interpreter, paren, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

/// An object.  Fields spring into existence on first assignment.
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: RefCell<HashMap<String, Value>>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn class(&self) -> &Rc<LoxClass> {
        &self.class
    }

    /// Fields shadow methods; a method is bound to this instance on every
    /// lookup.
    pub fn get(self: &Rc<Self>, name: &Token) -> Result<Value> {
        if let Some(value) = self.fields.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = self.class.find_method(&name.lexeme) {
            return Ok(Value::Function(Rc::new(method.bind(Rc::clone(self)))));
        }

        Err(LoxError::runtime(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&self, name: &Token, value: Value) {
        self.fields.borrow_mut().insert(name.lexeme.clone(), value);
    }
}

impl fmt::Debug for LoxInstance {
    // Field values are left out: an instance may hold itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<String> = self.fields.borrow().keys().cloned().collect();
        fields.sort();

        f.debug_struct("LoxInstance")
            .field("class", &self.class.name)
            .field("fields", &fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FunctionDecl;
    use crate::environment::Environment;

    fn method(name: &str, params: usize) -> Rc<LoxFunction> {
        let decl = FunctionDecl {
            name: Token::identifier(name, 1),
            params: (0..params)
                .map(|i| Token::identifier(format!("p{}", i), 1))
                .collect(),
            body: vec![],
        };

        Rc::new(LoxFunction::new(
            Rc::new(decl),
            Rc::new(RefCell::new(Environment::new())),
            name == "init",
        ))
    }

    fn class(name: &str, superclass: Option<Rc<LoxClass>>, methods: &[(&str, usize)]) -> Rc<LoxClass> {
        let table = methods
            .iter()
            .map(|(m, arity)| (m.to_string(), method(m, *arity)))
            .collect();

        Rc::new(LoxClass::new(name.to_string(), superclass, table))
    }

    #[test]
    fn find_method_walks_superclass_chain() {
        let base = class("Base", None, &[("speak", 0), ("init", 2)]);
        let derived = class("Derived", Some(Rc::clone(&base)), &[("speak", 1)]);

        assert_eq!(derived.find_method("speak").unwrap().arity(), 1);
        assert_eq!(derived.find_method("init").unwrap().arity(), 2);
        assert!(derived.find_method("missing").is_none());
    }

    #[test]
    fn class_arity_follows_init() {
        assert_eq!(class("Empty", None, &[]).arity(), 0);
        assert!(method("init", 0).is_initializer());
        assert!(!method("norm", 0).is_initializer());
        assert_eq!(class("Point", None, &[("init", 2)]).arity(), 2);
    }

    #[test]
    fn fields_shadow_methods() {
        let point = class("Point", None, &[("norm", 0)]);
        let instance = Rc::new(LoxInstance::new(point));
        let name = Token::identifier("norm", 1);

        assert!(matches!(instance.get(&name).unwrap(), Value::Function(_)));

        instance.set(&name, Value::Number(5.0));
        assert_eq!(instance.get(&name).unwrap(), Value::Number(5.0));
    }

    #[test]
    fn undefined_property_is_an_error() {
        let instance = Rc::new(LoxInstance::new(class("Point", None, &[])));
        let err = instance.get(&Token::identifier("x", 9)).unwrap_err();

        assert_eq!(
            err.to_string(),
            "[line 9] RuntimeError: Undefined property 'x'."
        );
    }

    #[test]
    fn methods_are_bound_fresh_on_each_lookup() {
        let instance = Rc::new(LoxInstance::new(class("Point", None, &[("norm", 0)])));
        let name = Token::identifier("norm", 1);

        assert_ne!(instance.get(&name).unwrap(), instance.get(&name).unwrap());
        assert_eq!(Value::Instance(Rc::clone(&instance)).to_string(), "<instance Point>");
    }
}
