//! The single error carrier threaded through lexing, parsing, and evaluation.

use thiserror::Error as ThisError;

/// A diagnostic produced by any stage of the pipeline.
///
/// Every fallible operation in this crate returns `Result<T, Error>`. The
/// error is deliberately one flat shape rather than a per-stage enum: the
/// lexer, the parser, and the evaluator all report the same `{message,
/// line}` pair, and the outermost driver is the only place that ever prints
/// one.
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("[line {line}] Error : {message}")]
pub struct Error {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// 1-indexed source line the error is attributed to.
    pub line: usize,
}

impl Error {
    /// Builds a new error with the given message and line.
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Error {
            message: message.into(),
            line,
        }
    }
}
