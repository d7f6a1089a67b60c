//! Recursive-descent parser: token sequence to a list of top-level
//! expression trees.
//!
//! Each grammar rule is its own method, consuming a prefix of the token
//! stream and returning the node it built. Precedence, lowest to highest:
//! `list → assignment → ternary → equality → comparison → addition →
//! multiplication → unary → primary`.

use crate::ast::{Expr, Literal, Token, TokenKind};
use crate::error::Error;
use crate::lexer;

/// Lexes and parses `source` in one step, filtering comment tokens before
/// parsing as the parser's contract requires.
pub fn parse(source: &str) -> Result<Vec<Expr>, Error> {
    let tokens = lexer::lex(source)?;
    Parser::new(tokens).parse_program()
}

/// A recursive-descent parser over an already-lexed token sequence.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Builds a parser over `tokens`, discarding any `COMMENT` tokens --
    /// the parser's contract takes a comment-filtered stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        let tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .collect();
        Parser { tokens, pos: 0 }
    }

    /// `program → declaration* END`
    pub fn parse_program(&mut self) -> Result<Vec<Expr>, Error> {
        let mut declarations = Vec::new();
        while !self.check(TokenKind::End) {
            declarations.push(self.declaration()?);
        }
        Ok(declarations)
    }

    /// `declaration → definition | statement`
    fn declaration(&mut self) -> Result<Expr, Error> {
        if self.match_one(&[TokenKind::Var]).is_some() {
            self.definition()
        } else {
            self.statement()
        }
    }

    /// `definition → "var" IDENTIFIER ( "=" expression )? ";"`
    fn definition(&mut self) -> Result<Expr, Error> {
        let name = self.expect_identifier()?;
        let value = if self.match_one(&[TokenKind::Assign]).is_some() {
            self.expression()?
        } else {
            Expr::Literal(Literal::Nil)
        };
        self.expect(TokenKind::Semicolon, "Expected ';' after expression.")?;
        Ok(Expr::Definition {
            name,
            value: Box::new(value),
        })
    }

    /// `statement → block | print | exprStmt`
    fn statement(&mut self) -> Result<Expr, Error> {
        if self.match_one(&[TokenKind::LeftBrace]).is_some() {
            return self.block();
        }
        if self.match_one(&[TokenKind::Print]).is_some() {
            return self.print_statement();
        }
        self.expr_statement()
    }

    /// `block → "{" declaration* expression? "}"`
    ///
    /// Parses declarations until either `}` or an expression that is NOT
    /// followed by `;` -- that expression becomes the block's tail value.
    fn block(&mut self) -> Result<Expr, Error> {
        let mut items = Vec::new();
        let mut tail = None;

        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::End) {
            if self.match_one(&[TokenKind::Var]).is_some() {
                items.push(self.definition()?);
                continue;
            }
            if self.match_one(&[TokenKind::Print]).is_some() {
                items.push(self.print_statement()?);
                continue;
            }
            if self.match_one(&[TokenKind::LeftBrace]).is_some() {
                items.push(self.block()?);
                continue;
            }

            let expr = self.expression()?;
            if self.match_one(&[TokenKind::Semicolon]).is_some() {
                items.push(Expr::Statement(Box::new(expr)));
            } else if self.check(TokenKind::RightBrace) {
                tail = Some(Box::new(expr));
                break;
            } else {
                return Err(Error::new(
                    "Expected ';' after expression.",
                    self.peek().line,
                ));
            }
        }

        self.expect(TokenKind::RightBrace, "Expected '}' token")?;
        Ok(Expr::Block { items, tail })
    }

    /// `print → "print" expression ";"`
    fn print_statement(&mut self) -> Result<Expr, Error> {
        let value = self.expression()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after expression.")?;
        Ok(Expr::Print(Box::new(value)))
    }

    /// `exprStmt → expression ";"`
    fn expr_statement(&mut self) -> Result<Expr, Error> {
        let expr = self.expression()?;
        self.expect(TokenKind::Semicolon, "Expected ';' after expression.")?;
        Ok(Expr::Statement(Box::new(expr)))
    }

    /// `expression → list`
    fn expression(&mut self) -> Result<Expr, Error> {
        self.list()
    }

    /// `list → assignment ( "," assignment )*`
    fn list(&mut self) -> Result<Expr, Error> {
        self.left_assoc(&[TokenKind::Comma], &[], Self::assignment)
    }

    /// `assignment → ternary ( "=" assignment )?`
    ///
    /// Right-associative. Only `Read` is an l-value; any other left operand
    /// makes `=` an error.
    fn assignment(&mut self) -> Result<Expr, Error> {
        let expr = self.ternary()?;

        if let Some(eq) = self.match_one(&[TokenKind::Assign]) {
            let value = self.assignment()?;
            return match expr {
                Expr::Read(name) => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                }),
                _ => Err(Error::new("Cannot assign to an rvalue.", eq.line)),
            };
        }

        Ok(expr)
    }

    /// `ternary → equality ( "?" ternary ":" ternary )?`
    ///
    /// Right-associative in both branches.
    fn ternary(&mut self) -> Result<Expr, Error> {
        let cond = self.equality()?;

        if self.match_one(&[TokenKind::Question]).is_some() {
            let then_branch = self.ternary()?;
            self.expect(TokenKind::Colon, "Expected ':' token")?;
            let else_branch = self.ternary()?;
            return Ok(Expr::Ternary {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(cond)
    }

    /// `equality → comparison ( ("!=" | "==") comparison )*`
    fn equality(&mut self) -> Result<Expr, Error> {
        self.left_assoc(&[TokenKind::BangEqual, TokenKind::Equal], &[], Self::comparison)
    }

    /// `comparison → addition ( (">"|">="|"<"|"<=") addition )*`
    fn comparison(&mut self) -> Result<Expr, Error> {
        self.left_assoc(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            &[],
            Self::addition,
        )
    }

    /// `addition → multiplication ( ("-"|"+") multiplication )*`
    ///
    /// `MINUS` is excluded from the missing-left-operand check here: it is
    /// also a valid unary prefix, so `-x` must not be misdiagnosed.
    fn addition(&mut self) -> Result<Expr, Error> {
        self.left_assoc(
            &[TokenKind::Minus, TokenKind::Plus],
            &[TokenKind::Minus],
            Self::multiplication,
        )
    }

    /// `multiplication → unary ( ("/"|"*") unary )*`
    fn multiplication(&mut self) -> Result<Expr, Error> {
        self.left_assoc(&[TokenKind::Slash, TokenKind::Star], &[], Self::unary)
    }

    /// `unary → ("!" | "-") unary | primary`
    fn unary(&mut self) -> Result<Expr, Error> {
        if let Some(op) = self.match_one(&[TokenKind::Bang, TokenKind::Minus]) {
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.primary()
    }

    /// `primary → NUMBER | STRING | "true" | "false" | "nil" | IDENTIFIER |
    /// "(" expression ")"`
    fn primary(&mut self) -> Result<Expr, Error> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number | TokenKind::String => {
                self.advance();
                Ok(Expr::Literal(token.literal))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(false)))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Literal(Literal::Nil))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Read(token))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RightParen, "Expected a closing ')' to match '('.")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            other => Err(Error::new(
                format!("Token type {other} does not match the primary rule."),
                token.line,
            )),
        }
    }

    /// Shared left-fold for the left-associative binary rules
    /// (`list`, `equality`, `comparison`, `addition`, `multiplication`).
    ///
    /// `unary_prefixes` carries operators in `ops` that are also valid unary
    /// prefixes (only `MINUS`, for `addition`) and so must be excluded from
    /// the missing-left-operand check.
    fn left_assoc(
        &mut self,
        ops: &[TokenKind],
        unary_prefixes: &[TokenKind],
        operand: fn(&mut Parser) -> Result<Expr, Error>,
    ) -> Result<Expr, Error> {
        let current = self.peek().kind;
        if ops.contains(&current) && !unary_prefixes.contains(&current) {
            return Err(Error::new(
                "Binary expression missing left operand.",
                self.peek().line,
            ));
        }

        let mut expr = operand(self)?;
        while let Some(op) = self.match_one(ops) {
            let right = operand(self)?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let current = self.tokens[self.pos].clone();
        if current.kind != TokenKind::End {
            self.pos += 1;
        }
        current
    }

    fn match_one(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if kinds.contains(&self.peek().kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, Error> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(Error::new(message.to_string(), self.peek().line))
        }
    }

    fn expect_identifier(&mut self) -> Result<Token, Error> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance())
        } else {
            Err(Error::new("Expected identifier.", self.peek().line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Expr {
        let mut decls = parse(input).unwrap();
        assert_eq!(decls.len(), 1);
        decls.remove(0)
    }

    #[test]
    fn precedence_multiplication_binds_tighter_than_addition() {
        let expr = parse_one("1 + 2 * 3;");
        assert_eq!(expr.ast_repr(), "(PLUS 1 (STAR 2 3))");
    }

    #[test]
    fn grouping_overrides_precedence() {
        let expr = parse_one("(1 + 2) * 3;");
        assert_eq!(expr.ast_repr(), "(STAR (group (PLUS 1 2)) 3)");
    }

    #[test]
    fn unary_minus() {
        let expr = parse_one("-1;");
        assert_eq!(expr.ast_repr(), "(MINUS 1)");
    }

    #[test]
    fn assignment_is_right_associative_over_read_target() {
        let decls = parse("var a = 1; var b = 1; a = b = 2;").unwrap();
        match &decls[2] {
            Expr::Statement(inner) => match &**inner {
                Expr::Assign { name, value } => {
                    assert_eq!(name.lexeme, "a");
                    assert!(matches!(**value, Expr::Assign { .. }));
                }
                other => panic!("expected assign, got {other:?}"),
            },
            other => panic!("expected statement, got {other:?}"),
        }
    }

    #[test]
    fn assigning_to_rvalue_is_an_error() {
        let err = parse("1 = 2;").unwrap_err();
        assert_eq!(err.message, "Cannot assign to an rvalue.");
    }

    #[test]
    fn missing_left_operand_is_detected() {
        let err = parse("== 3;").unwrap_err();
        assert_eq!(err.message, "Binary expression missing left operand.");
    }

    #[test]
    fn ternary_short_circuit_is_parsed_right_associative() {
        let expr = parse_one("true ? 1 : 0 ? 2 : 3;");
        match expr {
            Expr::Statement(inner) => assert!(matches!(*inner, Expr::Ternary { .. })),
            other => panic!("expected statement, got {other:?}"),
        }
    }

    #[test]
    fn block_with_tail_expression() {
        let expr = parse_one("{ var a = 1; a }");
        match expr {
            Expr::Block { items, tail } => {
                assert_eq!(items.len(), 1);
                assert!(tail.is_some());
            }
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn nested_block_parses_as_a_block_item() {
        let expr = parse_one("{ var a = 1; { var b = 2; } }");
        match expr {
            Expr::Block { items, tail } => {
                assert_eq!(items.len(), 2);
                assert!(tail.is_none());
                assert!(matches!(items[1], Expr::Block { .. }));
            }
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let err = parse("{ 1;").unwrap_err();
        assert_eq!(err.message, "Expected '}' token");
    }

    #[test]
    fn statement_without_semicolon_is_an_error() {
        let err = parse("1").unwrap_err();
        assert_eq!(err.message, "Expected ';' after expression.");
    }

    #[test]
    fn unexpected_primary_token_is_an_error() {
        let err = parse(") 1;").unwrap_err();
        assert_eq!(err.message, "Token type RIGHT_PAREN does not match the primary rule.");
    }

    #[test]
    fn unclosed_paren_is_an_error() {
        let err = parse("(1 + 2;").unwrap_err();
        assert_eq!(err.message, "Expected a closing ')' to match '('.");
    }

    #[test]
    fn comments_are_filtered_before_parsing() {
        let decls = parse("// hi\nprint 1;").unwrap();
        assert_eq!(decls.len(), 1);
    }
}
