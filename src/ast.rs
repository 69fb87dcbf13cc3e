//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Nodes are immutable once built.  Expressions that the resolver binds
//! (`Variable`, `Assign`, `This`, `Super`) carry an [`ExprId`]: a stable
//! identity for *this syntactic occurrence*, independent of its name or shape.
//! The interpreter keys its scope-distance side table by that id.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a resolvable expression node.
///
/// Ids come from one process-wide counter, so nodes parsed from different
/// REPL lines or `execute`d files never collide inside a shared interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub usize);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// `true` / `false`.
    Bool(bool),

    /// The `nil` literal.
    Nil,
}

/// Every kind of *expression* in Lox.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix unary operator expression, `!ready` or `-42`.
    Unary { operator: Token, right: Box<Expr> },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// Assignment expression: `identifier "=" expression`.
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function‑, method‑ or constructor call.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// `object.name`
    Get { object: Box<Expr>, name: Token },

    /// `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// `this` inside a method.
    This { id: ExprId, keyword: Token },

    /// `super.method` inside a subclass method.
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    pub fn variable(name: Token) -> Self {
        Expr::Variable {
            id: ExprId::fresh(),
            name,
        }
    }

    pub fn assign(name: Token, value: Expr) -> Self {
        Expr::Assign {
            id: ExprId::fresh(),
            name,
            value: Box::new(value),
        }
    }
}

/// Function or method declaration.  Shared via `Rc` between the AST and every
/// closure created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

/// Complete executable constructs.  A program is a sequence of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop; `for` loops are desugared into this.
    While { condition: Expr, body: Box<Stmt> },

    /// `break;` ‑ leaves the nearest enclosing loop.
    Break { keyword: Token },

    /// Function declaration ‑ becomes a first‑class callable value.
    Function(Rc<FunctionDecl>),

    /// `return` statement inside a function body.
    Return {
        keyword: Token,
        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    /// Class declaration with optional superclass (always a `Variable`
    /// when produced by the parser).
    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },

    /// `execute "path";` ‑ runs another script in the current interpreter.
    Execute { keyword: Token, path: Expr },
}
