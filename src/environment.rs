use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One lexical scope: a name → value map plus a link to the enclosing scope.
///
/// Scopes are shared through `Rc<RefCell<_>>` so a closure can keep the
/// scope it was defined in alive after the defining block has exited.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn enclosing(&self) -> Option<Rc<RefCell<Environment>>> {
        self.enclosing.clone()
    }

    /// Binds `name` in this scope, shadowing or replacing any previous value.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup along the whole chain.  Used for globals.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Dynamic assignment along the whole chain.  Never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// The scope exactly `distance` hops above `env` (`0` is `env` itself).
    pub fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut current: Rc<RefCell<Environment>> = Rc::clone(env);
        for _ in 0..distance {
            let next = current.borrow().enclosing()?;
            current = next;
        }
        Some(current)
    }

    /// Reads `name` exactly `distance` hops up the chain.
    pub fn get_at(&self, distance: usize, name: &str) -> Option<Value> {
        if distance == 0 {
            self.values.get(name).cloned()
        } else {
            self.enclosing
                .as_ref()
                .and_then(|enc| enc.borrow().get_at(distance - 1, name))
        }
    }

    /// Writes `name` exactly `distance` hops up the chain.  Returns `false`
    /// when no such binding exists there.
    pub fn assign_at(&mut self, distance: usize, name: &str, value: Value) -> bool {
        if distance == 0 {
            match self.values.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            }
        } else {
            match &self.enclosing {
                Some(enc) => enc.borrow_mut().assign_at(distance - 1, name, value),
                None => false,
            }
        }
    }

    /// Names bound directly in this scope, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }
}

pub(crate) fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
