//! rlox - run a Lox-family script, or start an interactive REPL
//!
//! # Usage
//!
//! ```bash
//! # Start an interactive REPL
//! rlox
//!
//! # Run a script file
//! rlox script.lox
//!
//! # Dump tokens and the parsed AST before evaluating
//! rlox --token-dump --ast-dump script.lox
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser as ClapParser;
use colored::Colorize;

use rlox::error::Error;
use rlox::eval::Interpreter;
use rlox::{lexer, parser};

/// A tree-walking interpreter for a small Lox-family scripting language
#[derive(ClapParser, Debug)]
#[command(name = "rlox")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Script to run; omit to start an interactive REPL
    script: Option<PathBuf>,

    /// Print the token stream before evaluating
    #[arg(long)]
    token_dump: bool,

    /// Print the parsed AST (S-expression form) before evaluating
    #[arg(long)]
    ast_dump: bool,

    /// Print the value of every top-level declaration as it evaluates
    #[arg(long)]
    immediate_result_dump: bool,
}

fn main() -> ExitCode {
    // clap's required-arity checking treats `script` as optional, so a
    // usage error (more than one positional argument) is checked by hand
    // first to get the conventional exit(64) rather than clap's exit(2).
    let positional_count = std::env::args().skip(1).filter(|a| !a.starts_with('-')).count();
    if positional_count > 1 {
        eprintln!("Usage: rlox [script]");
        return ExitCode::from(64);
    }

    let args = Args::parse();

    match &args.script {
        Some(path) => run_file(path, &args),
        None => run_repl(&args),
    }
}

fn run_file(path: &PathBuf, args: &Args) -> ExitCode {
    let source = match fs::read_to_string(path).with_context(|| format!("reading {}", path.display())) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::from(74);
        }
    };

    let mut interpreter = Interpreter::new();
    match run_source(&source, &mut interpreter, args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(65)
        }
    }
}

fn run_repl(args: &Args) -> ExitCode {
    println!("{}", "rlox interactive session".bold());
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    loop {
        print!(">> ");
        if io::stdout().flush().is_err() {
            return ExitCode::SUCCESS;
        }

        let mut line = String::new();
        let bytes = match stdin.lock().read_line(&mut line) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("{}: {err}", "error".red());
                return ExitCode::from(74);
            }
        };
        if bytes == 0 {
            // EOF on stdin ends the session cleanly.
            return ExitCode::SUCCESS;
        }
        if line.trim().is_empty() {
            continue;
        }

        // A REPL line's errors are reported but never end the session --
        // the interpreter's environment is preserved across iterations.
        if let Err(err) = run_source(&line, &mut interpreter, args) {
            eprintln!("{err}");
        }
    }
}

fn run_source(source: &str, interpreter: &mut Interpreter, args: &Args) -> Result<(), Error> {
    if args.token_dump {
        let tokens = lexer::lex(source)?;
        println!("{}", "-- tokens --".dimmed());
        for token in &tokens {
            println!("{} {:?}", token.kind, token.literal);
        }
    }

    let program = parser::parse(source)?;

    if args.ast_dump {
        println!("{}", "-- ast --".dimmed());
        for expr in &program {
            println!("{}", expr.ast_repr());
        }
    }

    let results = interpreter.run(&program)?;

    if args.immediate_result_dump {
        println!("{}", "-- results --".dimmed());
        for value in &results {
            println!("{}", value.ast_repr());
        }
    }

    Ok(())
}
