use std::fmt;
use std::rc::Rc;

use crate::ast::LiteralValue;
use crate::callable::{Callable, LoxFunction, NativeFunction};
use crate::class::{LoxClass, LoxInstance};

/// Every runtime value.  Closed sum type: operators and call sites match on
/// it exhaustively.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<LoxInstance>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else, `0` and `""` included,
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// The callable capability of this value, if any.
    pub fn as_callable(&self) -> Option<Rc<dyn Callable>> {
        match self {
            Value::Native(f) => Some(Rc::clone(f) as Rc<dyn Callable>),
            Value::Function(f) => Some(Rc::clone(f) as Rc<dyn Callable>),
            Value::Class(c) => Some(Rc::clone(c) as Rc<dyn Callable>),
            _ => None,
        }
    }

    pub fn string<S: AsRef<str>>(s: S) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::Str(s) => Value::string(s),
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Nil => Value::Nil,
        }
    }
}

/// `nil` equals only `nil`; numbers, strings and booleans compare by value;
/// objects compare by identity.  No coercion.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Native(func) => write!(f, "<native fn {}>", func.name()),

            Value::Function(func) => write!(f, "<fn {}>", func.name()),

            Value::Class(class) => write!(f, "<class {}>", class.name),

            Value::Instance(instance) => write!(f, "<instance {}>", instance.class().name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
    }

    #[test]
    fn equality_has_no_coercion() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::Number(1.0), Value::string("1"));
        assert_eq!(Value::string("a"), Value::string("a"));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn numbers_print_naturally() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-2.0).to_string(), "-2");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn scalars_print_as_source_spelling() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::string("hi").to_string(), "hi");
    }

    #[test]
    fn only_callables_expose_the_capability() {
        assert!(Value::Number(1.0).as_callable().is_none());
        assert!(Value::string("f").as_callable().is_none());
    }
}
