//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of name → [`Binding`] maps tracking
//!    declared/defined/used), mirroring exactly the environments the
//!    interpreter will create: one per block, function call, bound method
//!    (`this`) and subclass body (`super`).
//! 2. Report static errors (redeclaration, read in own initializer, misplaced
//!    `return` / `this` / `super` / `break`, bad superclass) and warn about
//!    locals that are never used.
//! 3. Tell the interpreter, for *each* variable occurrence, at what depth the
//!    binding lives.  Occurrences left unrecorded are globals.

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::error::{LoxError, Warning};
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// What kind of class body are we in?  Used to validate `this` / `super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

#[derive(Copy, Clone, Debug)]
struct Binding {
    defined: bool,
    used: bool,
    line: usize,
}

/// Everything the resolver found.  Any error blocks execution; warnings
/// never do.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub errors: Vec<LoxError>,
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances by calling back into the interpreter.
pub struct Resolver<'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashMap<String, Binding>>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
    diagnostics: Diagnostics,
}

impl<'interp> Resolver<'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        info!("Resolver instantiated");
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Walk all top‑level statements.
    pub fn resolve(mut self, statements: &[Stmt]) -> Diagnostics {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.resolve_stmts(statements);

        // Inner scopes close first; report in source order.
        self.diagnostics.warnings.sort_by_key(|warning| warning.line);

        info!(
            "Resolve pass finished: {} error(s), {} warning(s)",
            self.diagnostics.errors.len(),
            self.diagnostics.warnings.len()
        );
        self.diagnostics
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(decl) => {
                // name is visible *inside* its own body, for recursion
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionType::Function);
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.loop_depth += 1;
                self.resolve_stmt(body);
                self.loop_depth -= 1;
            }

            Stmt::Break { keyword } => {
                if self.loop_depth == 0 {
                    self.error(keyword, "Cannot break outside of loop.");
                }
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Cannot return from top-level code.");
                }
                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Cannot return a value from an initializer.");
                    }
                    self.resolve_expr(expr);
                }
            }

            Stmt::Execute { path, .. } => {
                self.resolve_expr(path);
            }
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) {
        debug!("Resolving class '{}'", name.lexeme);

        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            match superclass {
                Expr::Variable {
                    name: super_name, ..
                } if super_name.lexeme == name.lexeme => {
                    self.error(super_name, "A class cannot inherit from itself.");
                }
                Expr::Variable { .. } => {}
                // The parser only builds `Variable` here; hand-built ASTs may not.
                _ => self.error(name, "Superclass must be a class name."),
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            // `super` sits exactly one scope above `this`.
            self.begin_scope();
            self.synthetic("super", name.line);
        }

        self.begin_scope();
        self.synthetic("this", name.line);

        for method in methods {
            let kind = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                let in_own_initializer = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&name.lexeme))
                    .map(|binding| !binding.defined)
                    .unwrap_or(false);

                if in_own_initializer {
                    self.error(name, "Cannot read local variable in its own initializer.");
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                // First resolve RHS, then bind LHS
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Cannot use 'this' outside of a class.");
                    return;
                }
                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.error(keyword, "Cannot use 'super' outside of a class.");
                        return;
                    }
                    ClassType::Class => {
                        self.error(keyword, "Cannot use 'super' in a class with no superclass.");
                        return;
                    }
                    ClassType::Subclass => {}
                }
                self.resolve_local(*id, keyword);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.  Loop depth
    /// restarts at zero: `break` never crosses a call boundary.
    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionType) {
        let enclosing_function = self.current_function;
        let enclosing_loop_depth = self.loop_depth;
        self.current_function = kind;
        self.loop_depth = 0;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.loop_depth = enclosing_loop_depth;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope, warning about bindings never read or
    /// assigned.
    fn end_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };

        let mut unused: Vec<(String, Binding)> = scope
            .into_iter()
            .filter(|(_, binding)| !binding.used)
            .collect();
        unused.sort_by(|a, b| a.1.line.cmp(&b.1.line).then_with(|| a.0.cmp(&b.0)));

        for (name, binding) in unused {
            debug!("Unused local '{}' declared on line {}", name, binding.line);
            self.diagnostics.warnings.push(Warning::new(
                binding.line,
                format!("Variable '{}' declared but never used.", name),
            ));
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return; // globals are late-bound and may be redeclared
        };

        if scope.contains_key(&name.lexeme) {
            self.error(name, "Variable with this name already declared in this scope.");
            return;
        }

        scope.insert(
            name.lexeme.clone(),
            Binding {
                defined: false,
                used: false,
                line: name.line,
            },
        );
    }

    fn define(&mut self, name: &Token) {
        if let Some(binding) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.get_mut(&name.lexeme))
        {
            binding.defined = true;
        }
    }

    /// Always‑defined binding the interpreter supplies itself (`this`, `super`).
    fn synthetic(&mut self, name: &str, line: usize) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name.to_string(),
                Binding {
                    defined: true,
                    used: true,
                    line,
                },
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at depth `d`, or leave it unrecorded
    /// (global) if no enclosing scope declares it.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(binding) = scope.get_mut(&name.lexeme) {
                binding.used = true;
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.resolve(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.diagnostics
            .errors
            .push(LoxError::resolve(token, message));
    }
}
