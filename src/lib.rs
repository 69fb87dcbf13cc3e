//! **Rox**: a tree‑walking interpreter for the Lox language.
//!
//! The pipeline is scanner → parser → resolver → interpreter; [`Session`]
//! drives all four for the binary, the REPL and the tests.

pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod token;
pub mod value;

pub use error::{LoxError, Result, Warning};
pub use interpreter::Interpreter;
pub use session::{Outcome, Session};
pub use value::Value;
