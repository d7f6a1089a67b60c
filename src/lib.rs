//! # rlox
//!
//! A tree-walking interpreter for a small dynamically-typed scripting
//! language in the Lox family. Source text is lexed into a token stream,
//! parsed into a heterogeneous expression tree honoring operator
//! precedence and l-value/r-value distinction, and evaluated against a
//! lexically scoped variable environment.
//!
//! ```text
//! source text → [lexer] → tokens → [parser] → expression trees → [evaluator] → effects
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rlox::run_source;
//!
//! let mut interpreter = rlox::eval::Interpreter::new();
//! let results = run_source("print 1 + 2 * 3;", &mut interpreter);
//! assert!(results.is_ok());
//! ```
//!
//! ## Modules
//!
//! - [`ast`]: Token, literal value, and expression tree definitions
//! - [`lexer`]: Source text to token stream
//! - [`parser`]: Recursive-descent parser producing expression trees
//! - [`environment`]: The evaluator's stack of lexical scope frames
//! - [`eval`]: Tree-walking evaluator
//! - [`error`]: The single `{message, line}` error carrier shared by every stage

#![doc(html_root_url = "https://docs.rs/rlox/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ast;
pub mod environment;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, Literal, Token, TokenKind};
pub use environment::Environment;
pub use error::Error;
pub use eval::Interpreter;
pub use parser::Parser;

/// Lexes, parses, and evaluates `source` against `interpreter` in one call.
///
/// This is the primary entry point for embedders: it is what both the
/// REPL and file-mode CLI driver reduce to, with `interpreter` either
/// fresh (file mode) or reused across calls (REPL mode).
///
/// # Example
///
/// ```rust
/// use rlox::{run_source, eval::Interpreter};
///
/// let mut interpreter = Interpreter::new();
/// let results = run_source("var x = 1 + 1; print x;", &mut interpreter).unwrap();
/// assert_eq!(results.len(), 2);
/// ```
pub fn run_source<W: std::io::Write>(
    source: &str,
    interpreter: &mut Interpreter<W>,
) -> Result<Vec<Literal>, Error> {
    let program = parser::parse(source)?;
    interpreter.run(&program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_numeric_expression() {
        let mut interpreter = Interpreter::new();
        let results = run_source("print 1 + 2 * 3;", &mut interpreter).unwrap();
        assert_eq!(results, vec![Literal::Nil]);
    }

    #[test]
    fn end_to_end_lex_error_short_circuits_parse_and_eval() {
        let mut interpreter = Interpreter::new();
        let err = run_source("1 @ 2;", &mut interpreter).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn repl_style_reuse_preserves_environment_across_calls() {
        let mut interpreter = Interpreter::new();
        run_source("var a = 1;", &mut interpreter).unwrap();
        let results = run_source("a;", &mut interpreter).unwrap();
        assert_eq!(results, vec![Literal::Nil]);
    }
}
