//! Driver boundary: runs source text through scan → parse → resolve →
//! interpret against one long‑lived [`Interpreter`].
//!
//! A [`Session`] replaces the usual process‑wide "had error" flags: each
//! [`Session::run`] reports its own [`Outcome`], and the diagnostics of the
//! last run stay inspectable until [`Session::reset`].

use std::fs;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info, warn};

use crate::ast::Stmt;
use crate::error::{LoxError, Result, Warning};
use crate::interpreter::{Interpreter, ScriptLoader};
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    /// Scan, parse or resolve error; nothing was executed.
    StaticError,
    RuntimeError,
}

impl Outcome {
    /// Process exit status for a script run (sysexits `EX_DATAERR` /
    /// `EX_SOFTWARE`).
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Ok => 0,
            Outcome::StaticError => 65,
            Outcome::RuntimeError => 70,
        }
    }
}

/// A resolved program, ready for [`Interpreter::interpret`].
#[derive(Debug)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub warnings: Vec<Warning>,
}

/// Scans, parses and resolves `source`, recording scope distances in
/// `interpreter`.  Every static error found is returned; lexical errors do
/// not stop the parse.
pub fn compile(
    interpreter: &mut Interpreter,
    source: &str,
) -> std::result::Result<Program, Vec<LoxError>> {
    let mut errors: Vec<LoxError> = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => {
                debug!("Lex debug: {}", e);
                errors.push(e);
            }
        }
    }

    info!("Scanned {} tokens ({} lex errors)", tokens.len(), errors.len());

    let statements: Vec<Stmt> = match Parser::new(tokens).parse() {
        Ok(statements) if errors.is_empty() => statements,
        Ok(_) => return Err(errors),
        Err(parse_errors) => {
            errors.extend(parse_errors);
            return Err(errors);
        }
    };

    let diagnostics = Resolver::new(interpreter).resolve(&statements);
    if diagnostics.has_errors() {
        return Err(diagnostics.errors);
    }

    Ok(Program {
        statements,
        warnings: diagnostics.warnings,
    })
}

/// One interpreter plus the diagnostics of its most recent run.
pub struct Session {
    interpreter: Interpreter,
    diagnostics: Box<dyn Write>,
    errors: Vec<LoxError>,
    warnings: Vec<Warning>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session printing program output to stdout and diagnostics to stderr.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Session writing `print` output to `output` and diagnostics to
    /// `diagnostics`.  `execute` loads scripts from the filesystem.
    pub fn with_output(output: Box<dyn Write>, diagnostics: Box<dyn Write>) -> Self {
        info!("Session created");

        let interpreter = Interpreter::with_output(output).with_loader(Rc::new(FileScriptLoader));

        Self {
            interpreter,
            diagnostics,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Runs one unit of source (a file, or one REPL line).  Nothing executes
    /// if any static error is found; a runtime error stops the remaining
    /// statements of this run only.
    pub fn run(&mut self, source: &str) -> Outcome {
        info!("Running {} bytes of source", source.len());

        let program: Program = match compile(&mut self.interpreter, source) {
            Ok(program) => program,
            Err(errors) => {
                for e in &errors {
                    self.emit(e);
                }
                self.errors.extend(errors);
                return Outcome::StaticError;
            }
        };

        for warning in &program.warnings {
            warn!("{}", warning);
            self.emit(warning);
        }
        self.warnings.extend(program.warnings);

        let result = self.interpreter.interpret(&program.statements);

        for warning in self.interpreter.take_warnings() {
            self.emit(&warning);
            self.warnings.push(warning);
        }

        match result {
            Ok(()) => Outcome::Ok,
            Err(e) => {
                // A script failing inside `execute` lands here too: it is
                // discovered while running.
                debug!("Runtime debug: {}", e);
                self.emit(&e);
                self.errors.push(e);
                Outcome::RuntimeError
            }
        }
    }

    /// Forgets the diagnostics of previous runs.  Globals persist.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }

    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    fn emit(&mut self, diagnostic: &dyn std::fmt::Display) {
        // A broken diagnostics sink has nowhere left to report to.
        if writeln!(self.diagnostics, "{}", diagnostic).is_err() {
            warn!("Failed to write diagnostic: {}", diagnostic);
        }
    }
}

/// Loads `execute`d scripts from the filesystem, relative to the working
/// directory, and runs them in the caller's global scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileScriptLoader;

impl ScriptLoader for FileScriptLoader {
    fn execute(&self, interpreter: &mut Interpreter, path: &str) -> Result<()> {
        info!("Loading script '{}'", path);

        let source: String = fs::read_to_string(path).map_err(|e| LoxError::Script {
            path: path.to_string(),
            errors: vec![LoxError::Io(e)],
        })?;

        let program: Program = compile(interpreter, &source).map_err(|errors| LoxError::Script {
            path: path.to_string(),
            errors,
        })?;

        for warning in program.warnings {
            warn!("{}: {}", path, warning);
            interpreter.report_warning(warning);
        }

        interpreter.interpret(&program.statements)
    }
}
