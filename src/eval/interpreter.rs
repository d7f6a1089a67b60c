//! The tree-walking evaluator: a visitor over [`Expr`] backed by a mutable
//! [`Environment`].

use std::io::{self, Write};

use crate::ast::{Expr, Literal, Token, TokenKind};
use crate::environment::Environment;
use crate::error::Error;

/// Evaluates expression trees against a persistent variable environment.
///
/// A fresh `Interpreter` starts with a single global scope. REPL sessions
/// reuse one `Interpreter` across iterations; file-mode runs build a fresh
/// one per invocation. `print` writes to `W`, which defaults to stdout but
/// can be swapped for an in-memory sink -- see [`Interpreter::with_output`]
/// -- so embedders and tests can observe printed output directly.
pub struct Interpreter<W: Write = io::Stdout> {
    env: Environment,
    output: W,
}

impl Interpreter<io::Stdout> {
    /// Creates an interpreter with a fresh global environment, printing to
    /// stdout.
    pub fn new() -> Self {
        Interpreter {
            env: Environment::new(),
            output: io::stdout(),
        }
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// Creates an interpreter with a fresh global environment that prints
    /// to `output` instead of stdout.
    pub fn with_output(output: W) -> Self {
        Interpreter {
            env: Environment::new(),
            output,
        }
    }

    /// Borrows the interpreter's output sink, e.g. to inspect what was
    /// printed when `W` is an in-memory buffer.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Evaluates every top-level declaration in order, short-circuiting on
    /// the first error -- later declarations do not run.
    pub fn run(&mut self, program: &[Expr]) -> Result<Vec<Literal>, Error> {
        let mut results = Vec::with_capacity(program.len());
        for declaration in program {
            results.push(self.evaluate(declaration)?);
        }
        Ok(results)
    }

    /// Evaluates a single expression node, producing its value or the first
    /// error encountered.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Literal, Error> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Read(name) => self.env.lookup(&name.lexeme, name.line),
            Expr::Group(inner) => self.evaluate(inner),
            Expr::Unary { op, operand } => self.eval_unary(op, operand),
            Expr::Binary { op, left, right } => self.eval_binary(op, left, right),
            Expr::Ternary {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(cond)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.env.assign(&name.lexeme, value.clone(), name.line)?;
                Ok(value)
            }
            Expr::Definition { name, value } => {
                let value = self.evaluate(value)?;
                self.env.define(&name.lexeme, value.clone());
                Ok(value)
            }
            Expr::Print(inner) => {
                let value = self.evaluate(inner)?;
                let _ = writeln!(self.output, "{}", value.printable());
                Ok(Literal::Nil)
            }
            Expr::Statement(inner) => {
                self.evaluate(inner)?;
                Ok(Literal::Nil)
            }
            Expr::Block { items, tail } => self.eval_block(items, tail),
        }
    }

    fn eval_unary(
        &mut self,
        op: &Token,
        operand: &Expr,
    ) -> Result<Literal, Error> {
        let value = self.evaluate(operand)?;
        match op.kind {
            TokenKind::Minus => match value {
                Literal::Number(n) => Ok(Literal::Number(-n)),
                _ => Err(Error::new("Expected number as operand to MINUS.", op.line)),
            },
            TokenKind::Bang => Ok(Literal::Boolean(!value.is_truthy())),
            _ => Err(Error::new("Unhandled unary operator.", op.line)),
        }
    }

    fn eval_binary(
        &mut self,
        op: &Token,
        left: &Expr,
        right: &Expr,
    ) -> Result<Literal, Error> {
        // Evaluation order is strictly left-to-right.
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match op.kind {
            TokenKind::Plus => match (&left, &right) {
                (Literal::Number(a), Literal::Number(b)) => Ok(Literal::Number(a + b)),
                (Literal::String(a), _) => Ok(Literal::String(format!("{a}{}", right.printable()))),
                (Literal::Number(_), Literal::String(b)) => {
                    Ok(Literal::String(format!("{}{b}", left.printable())))
                }
                _ => Err(mismatched_types("PLUS", op.line)),
            },
            TokenKind::Minus => numeric_binary(&left, &right, op.line, "MINUS", |a, b| a - b),
            TokenKind::Star => numeric_binary(&left, &right, op.line, "STAR", |a, b| a * b),
            TokenKind::Slash => {
                let (a, b) = both_numbers(&left, &right, op.line, "SLASH")?;
                if b == 0.0 {
                    return Err(Error::new("Division by zero is prohibited.", op.line));
                }
                Ok(Literal::Number(a / b))
            }
            TokenKind::Greater => compare(&left, &right, op, |o| o.is_gt()),
            TokenKind::GreaterEqual => compare(&left, &right, op, |o| o.is_ge()),
            TokenKind::Less => compare(&left, &right, op, |o| o.is_lt()),
            TokenKind::LessEqual => compare(&left, &right, op, |o| o.is_le()),
            TokenKind::BangEqual => Ok(Literal::Boolean(left != right)),
            TokenKind::Equal => Ok(Literal::Boolean(left == right)),
            TokenKind::Comma => Ok(right),
            _ => Err(Error::new("Unhandled binary operator.", op.line)),
        }
    }

    fn eval_block(&mut self, items: &[Expr], tail: &Option<Box<Expr>>) -> Result<Literal, Error> {
        self.env.push_scope();
        let result = (|| {
            for item in items {
                self.evaluate(item)?;
            }
            match tail {
                Some(tail) => self.evaluate(tail),
                None => Ok(Literal::Nil),
            }
        })();
        self.env.pop_scope();
        result
    }
}

fn mismatched_types(op_tag: &str, line: usize) -> Error {
    Error::new(format!("Mismatched types for {op_tag} expression."), line)
}

fn numeric_binary(
    left: &Literal,
    right: &Literal,
    line: usize,
    op_tag: &str,
    f: impl Fn(f64, f64) -> f64,
) -> Result<Literal, Error> {
    let (a, b) = both_numbers(left, right, line, op_tag)?;
    Ok(Literal::Number(f(a, b)))
}

fn both_numbers(left: &Literal, right: &Literal, line: usize, op_tag: &str) -> Result<(f64, f64), Error> {
    match (left, right) {
        (Literal::Number(a), Literal::Number(b)) => Ok((*a, *b)),
        _ => Err(Error::new(
            format!("Expected number operands for {op_tag} expression."),
            line,
        )),
    }
}

fn compare(
    left: &Literal,
    right: &Literal,
    op: &Token,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Literal, Error> {
    match (left, right) {
        // NaN operands have no ordering; per native float-comparison
        // semantics, that's false rather than a type error.
        (Literal::Number(a), Literal::Number(b)) => {
            Ok(Literal::Boolean(a.partial_cmp(b).map_or(false, |ord| accept(ord))))
        }
        (Literal::String(a), Literal::String(b)) => Ok(Literal::Boolean(accept(a.cmp(b)))),
        _ => Err(mismatched_types(&op.kind.to_string(), op.line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(source: &str) -> Result<Vec<Literal>, Error> {
        let program = parse(source)?;
        Interpreter::new().run(&program)
    }

    #[test]
    fn numeric_precedence() {
        let results = run("1 + 2 * 3;").unwrap();
        assert_eq!(results, vec![Literal::Nil]); // a bare Statement discards its value
    }

    #[test]
    fn print_outputs_printable_form() {
        let mut interpreter = Interpreter::with_output(Vec::new());
        let program = parse("print 1 + 2 * 3;").unwrap();
        let results = interpreter.run(&program).unwrap();
        assert_eq!(results, vec![Literal::Nil]);
        assert_eq!(interpreter.output, b"7\n");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = run("print 1 / 0;").unwrap_err();
        assert_eq!(err.message, "Division by zero is prohibited.");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn ternary_skips_unchosen_branch() {
        // 0 / 0 would error if evaluated; it must not be, since the
        // condition is true.
        let results = run("true ? 1 : (0/0);").unwrap();
        assert_eq!(results, vec![Literal::Number(1.0)]);
    }

    #[test]
    fn block_scoping_shadows_then_restores() {
        let err = run("var a = 1; { var a = 2; } a = 3; a;");
        assert!(err.is_ok());
    }

    #[test]
    fn assigning_undeclared_variable_errors() {
        let err = run("x = 5;").unwrap_err();
        assert_eq!(err.message, "Undefined variable 'x'.");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn heterogeneous_equality_is_reflexive_and_cross_type_false() {
        let results = run("(1 < 2) == true;").unwrap();
        assert_eq!(results, vec![Literal::Nil]); // Statement discards
    }

    #[test]
    fn string_and_number_plus_coerces_number() {
        let mut interpreter = Interpreter::new();
        let program = parse("\"hi \" + \"there\";").unwrap();
        let results = interpreter.run(&program).unwrap();
        assert_eq!(results, vec![Literal::Nil]);
    }

    #[test]
    fn unary_minus_requires_number() {
        let err = run("print -\"a\";").unwrap_err();
        assert_eq!(err.message, "Expected number as operand to MINUS.");
    }

    #[test]
    fn nan_ordering_comparisons_resolve_false_rather_than_error() {
        // Lox source can't spell a NaN literal directly (division by zero
        // is rejected before it would produce one), so this builds the
        // comparison node by hand to exercise `compare`'s NaN path.
        let nan = Token::new(TokenKind::Less, "<".to_string(), Literal::Nil, 1);
        let expr = Expr::Binary {
            op: nan,
            left: Box::new(Expr::Literal(Literal::Number(f64::NAN))),
            right: Box::new(Expr::Literal(Literal::Number(1.0))),
        };
        let result = Interpreter::new().evaluate(&expr).unwrap();
        assert_eq!(result, Literal::Boolean(false));
    }

    #[test]
    fn scope_frame_stack_does_not_leak() {
        let mut interpreter = Interpreter::new();
        let program = parse("{ var a = 1; { var b = 2; } }").unwrap();
        let before = interpreter.env.depth();
        interpreter.run(&program).unwrap();
        assert_eq!(interpreter.env.depth(), before);
    }

    #[test]
    fn scope_frame_stack_does_not_leak_on_error() {
        let mut interpreter = Interpreter::new();
        let program = parse("{ var a = 1; print 1/0; }").unwrap();
        let before = interpreter.env.depth();
        assert!(interpreter.run(&program).is_err());
        assert_eq!(interpreter.env.depth(), before);
    }
}
