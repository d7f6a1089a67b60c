//! Source text to token stream.
//!
//! The lexer matches the longest token that begins at the current position
//! from a fixed, ordered priority list (comments, multi-character operators
//! before their single-character prefixes, punctuation, reserved words,
//! identifiers, strings, numbers), and stops at the first run of text that
//! matches none of those.

use crate::ast::{Literal, Token, TokenKind};
use crate::error::Error;

/// Tokenizes `source`, returning the token sequence (terminated by an
/// [`TokenKind::End`] token) or the first lex error encountered.
pub fn lex(source: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(source).tokenize()
}

/// A hand-written longest-match lexer over a source string.
pub struct Lexer<'a> {
    source: &'a str,
    remaining: &'a str,
    position: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            remaining: source,
            position: 0,
            line: 1,
        }
    }

    /// Consumes the lexer, producing the full token sequence.
    ///
    /// Stops at the first unrecognizable run of text, per the lexer's
    /// no-recovery contract.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_end = token.kind == TokenKind::End;
            tokens.push(token);
            if is_end {
                return Ok(tokens);
            }
        }
    }

    /// Produces the next single token, or the `End` token at EOF.
    fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_whitespace();

        if self.remaining.is_empty() {
            return Ok(Token::new(TokenKind::End, String::new(), Literal::Nil, self.line));
        }

        let start_line = self.line;

        if let Some(token) = self.try_comment(start_line) {
            return Ok(token);
        }
        if let Some(token) = self.try_operator(start_line) {
            return Ok(token);
        }
        if let Some(token) = self.try_identifier_or_keyword(start_line) {
            return Ok(token);
        }
        if let Some(token) = self.try_string(start_line)? {
            return Ok(token);
        }
        if let Some(token) = self.try_number(start_line) {
            return Ok(token);
        }

        let ch = self.remaining.chars().next().unwrap();
        self.advance(ch.len_utf8());
        Err(Error::new(format!("Unexpected character(s): {ch}"), start_line))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.remaining.chars().next() {
            if ch.is_whitespace() {
                self.advance(ch.len_utf8());
            } else {
                break;
            }
        }
    }

    /// `//...` runs to end of line; `/*...*/` runs to the first `*/` (or EOF),
    /// counting any newlines inside. Comments are emitted as `COMMENT`
    /// tokens -- filtering them is the driver's job, not the lexer's.
    fn try_comment(&mut self, start_line: usize) -> Option<Token> {
        if self.remaining.starts_with("//") {
            let len = self.remaining.find('\n').unwrap_or(self.remaining.len());
            let lexeme = self.remaining[..len].to_string();
            self.advance(len);
            return Some(Token::new(TokenKind::Comment, lexeme, Literal::Nil, start_line));
        }

        if self.remaining.starts_with("/*") {
            let len = match self.remaining[2..].find("*/") {
                Some(idx) => idx + 4,
                None => self.remaining.len(),
            };
            let lexeme = self.remaining[..len].to_string();
            self.advance(len);
            return Some(Token::new(TokenKind::Comment, lexeme, Literal::Nil, start_line));
        }

        None
    }

    fn try_operator(&mut self, start_line: usize) -> Option<Token> {
        let (kind, len) = if self.remaining.starts_with("!=") {
            (TokenKind::BangEqual, 2)
        } else if self.remaining.starts_with("==") {
            (TokenKind::Equal, 2)
        } else if self.remaining.starts_with(">=") {
            (TokenKind::GreaterEqual, 2)
        } else if self.remaining.starts_with("<=") {
            (TokenKind::LessEqual, 2)
        } else if self.remaining.starts_with('(') {
            (TokenKind::LeftParen, 1)
        } else if self.remaining.starts_with(')') {
            (TokenKind::RightParen, 1)
        } else if self.remaining.starts_with('{') {
            (TokenKind::LeftBrace, 1)
        } else if self.remaining.starts_with('}') {
            (TokenKind::RightBrace, 1)
        } else if self.remaining.starts_with('[') {
            (TokenKind::LeftBracket, 1)
        } else if self.remaining.starts_with(']') {
            (TokenKind::RightBracket, 1)
        } else if self.remaining.starts_with(',') {
            (TokenKind::Comma, 1)
        } else if self.remaining.starts_with('.') {
            (TokenKind::Dot, 1)
        } else if self.remaining.starts_with('-') {
            (TokenKind::Minus, 1)
        } else if self.remaining.starts_with('+') {
            (TokenKind::Plus, 1)
        } else if self.remaining.starts_with(';') {
            (TokenKind::Semicolon, 1)
        } else if self.remaining.starts_with('/') {
            (TokenKind::Slash, 1)
        } else if self.remaining.starts_with('*') {
            (TokenKind::Star, 1)
        } else if self.remaining.starts_with('!') {
            (TokenKind::Bang, 1)
        } else if self.remaining.starts_with('>') {
            (TokenKind::Greater, 1)
        } else if self.remaining.starts_with('<') {
            (TokenKind::Less, 1)
        } else if self.remaining.starts_with('?') {
            // Per the open question: QUESTION/COLON sit above ASSIGN in the
            // dispatch table so ternary syntax is recognized.
            (TokenKind::Question, 1)
        } else if self.remaining.starts_with(':') {
            (TokenKind::Colon, 1)
        } else if self.remaining.starts_with('=') {
            (TokenKind::Assign, 1)
        } else {
            return None;
        };

        let lexeme: String = self.remaining.chars().take(len).collect();
        self.advance(len);
        Some(Token::new(kind, lexeme, Literal::Nil, start_line))
    }

    fn try_identifier_or_keyword(&mut self, start_line: usize) -> Option<Token> {
        let first = self.remaining.chars().next()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }

        let len = self
            .remaining
            .char_indices()
            .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);

        let lexeme: String = self.remaining[..len].to_string();
        self.advance(len);

        let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);
        let literal = match kind {
            TokenKind::True => Literal::Boolean(true),
            TokenKind::False => Literal::Boolean(false),
            _ => Literal::Nil,
        };
        Some(Token::new(kind, lexeme, literal, start_line))
    }

    /// `"..."`, single-line, no escape sequences. An unterminated string
    /// (no closing quote before a newline or EOF) is a lex error.
    fn try_string(&mut self, start_line: usize) -> Result<Option<Token>, Error> {
        if !self.remaining.starts_with('"') {
            return Ok(None);
        }

        let body = &self.remaining[1..];
        match body.find(['"', '\n']) {
            Some(idx) if body.as_bytes()[idx] == b'"' => {
                let value = body[..idx].to_string();
                let consumed = idx + 2; // opening quote + body + closing quote
                self.advance(consumed);
                Ok(Some(Token::new(
                    TokenKind::String,
                    format!("\"{value}\""),
                    Literal::String(value),
                    start_line,
                )))
            }
            _ => Err(Error::new("Unterminated string.", start_line)),
        }
    }

    /// `[0-9]+(\.[0-9]+)?`
    fn try_number(&mut self, start_line: usize) -> Option<Token> {
        let first = self.remaining.chars().next()?;
        if !first.is_ascii_digit() {
            return None;
        }

        let mut len = self
            .remaining
            .char_indices()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);

        let after_digits = &self.remaining[len..];
        if after_digits.starts_with('.') {
            let fraction_digits = after_digits[1..]
                .char_indices()
                .take_while(|(_, c)| c.is_ascii_digit())
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            if fraction_digits > 0 {
                len += 1 + fraction_digits;
            }
        }

        let lexeme = self.remaining[..len].to_string();
        self.advance(len);
        let value: f64 = lexeme.parse().expect("lexeme matched [0-9]+(\\.[0-9]+)?");
        Some(Token::new(TokenKind::Number, lexeme, Literal::Number(value), start_line))
    }

    /// Advances the cursor by `bytes`, counting every newline consumed so
    /// line numbers stay authoritative through whitespace and comments.
    fn advance(&mut self, bytes: usize) {
        let consumed = &self.remaining[..bytes];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
            }
        }
        self.position += bytes;
        self.remaining = &self.source[self.position..];
    }
}

fn keyword_kind(lexeme: &str) -> Option<TokenKind> {
    Some(match lexeme {
        "and" => TokenKind::And,
        "struct" => TokenKind::Struct,
        "else" => TokenKind::Else,
        "fun" => TokenKind::Fun,
        "for" => TokenKind::For,
        "if" => TokenKind::If,
        "nil" => TokenKind::Nil,
        "or" => TokenKind::Or,
        "print" => TokenKind::Print,
        "return" => TokenKind::Return,
        "super" => TokenKind::Super,
        "this" => TokenKind::This,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        _ => return None,
    })
}
