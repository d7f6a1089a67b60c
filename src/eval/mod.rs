//! Tree-walking evaluation of parsed expressions.
//!
//! # Example
//!
//! ```rust
//! use rlox::eval::Interpreter;
//! use rlox::ast::{Expr, Literal};
//!
//! let mut interpreter = Interpreter::new();
//! let expr = Expr::Literal(Literal::Number(42.0));
//! let result = interpreter.evaluate(&expr).unwrap();
//! assert_eq!(result, Literal::Number(42.0));
//! ```

pub mod interpreter;

pub use interpreter::Interpreter;
