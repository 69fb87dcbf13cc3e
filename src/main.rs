use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::scanner::Scanner;
use rox::token::Token;
use rox::{LoxError, Outcome, Session};

/// sysexits `EX_NOINPUT`: the script could not be read.
const EXIT_NO_INPUT: i32 = 66;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// Log file used with --log
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token instead of `TYPE lexeme literal`
        #[arg(long)]
        json: bool,
    },

    /// Parses a Lox program and prints each statement's AST
    Parse { filename: PathBuf },

    /// Runs a Lox program; starts the REPL when no file is given
    Run { filename: Option<PathBuf> },
}

/// Reads a script, exiting with `EX_NOINPUT` if that fails.
fn read_source(filename: &Path) -> String {
    info!("Reading file: {:?}", filename);

    match fs::read_to_string(filename).context(format!("Failed to read file {:?}", filename)) {
        Ok(source) => {
            info!("Read {} bytes from {:?}", source.len(), filename);
            source
        }
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(EXIT_NO_INPUT);
        }
    }
}

fn init_logger(path: &Path) -> Result<()> {
    // Create or open the log file
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    // Configure env_logger to write to file with module and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    info!("Running Tokenize subcommand");

    let source = read_source(filename);
    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);

                if json {
                    println!("{}", serde_json::to_string(&token)?);
                } else {
                    println!("{}", token);
                }
            }

            Err(e) => {
                tokenized = false;
                debug!("Tokenization debug: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");
        std::process::exit(Outcome::StaticError.exit_code());
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn parse(filename: &Path) -> Result<()> {
    info!("Running Parse subcommand");

    let source = read_source(filename);
    let mut errors: Vec<LoxError> = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    match Parser::new(tokens).parse() {
        Ok(statements) if errors.is_empty() => {
            info!("Parsed {} statements", statements.len());

            for stmt in &statements {
                println!("{}", AstPrinter::print_stmt(stmt));
            }
        }

        result => {
            errors.extend(result.err().unwrap_or_default());

            for e in &errors {
                debug!("Parse debug: {}", e);
                eprintln!("{}", e);
            }
            std::process::exit(Outcome::StaticError.exit_code());
        }
    }

    info!("Parse subcommand completed");
    Ok(())
}

fn run_file(filename: &Path) -> Result<()> {
    info!("Running Run subcommand");

    let source = read_source(filename);
    let outcome = Session::new().run(&source);

    info!("Program finished: {:?}", outcome);

    if outcome != Outcome::Ok {
        std::process::exit(outcome.exit_code());
    }
    Ok(())
}

/// Interactive prompt.  Each line runs against the same interpreter; errors
/// are reported and the prompt continues.
fn repl() -> Result<()> {
    info!("Starting REPL");

    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;
    let mut session = Session::new();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = editor.add_history_entry(line.as_str()) {
                        debug!("Failed to record history entry: {}", e);
                    }
                }

                let outcome = session.run(&line);
                debug!("REPL line finished: {:?}", outcome);
                session.reset();
            }

            Err(ReadlineError::Interrupted) => continue,

            Err(ReadlineError::Eof) => break,

            Err(e) => return Err(e).context("Failed to read line"),
        }
    }

    info!("REPL finished");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger(&args.log_file)?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Some(Commands::Tokenize { filename, json }) => tokenize(&filename, json),

        Some(Commands::Parse { filename }) => parse(&filename),

        Some(Commands::Run {
            filename: Some(filename),
        }) => run_file(&filename),

        Some(Commands::Run { filename: None }) | None => repl(),
    }
}
