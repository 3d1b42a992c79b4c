//! Lexer and recursive-descent parser for table filters.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or_expr    := and_expr ("or" and_expr)*
//! and_expr   := not_expr ("and" not_expr)*
//! not_expr   := "not" not_expr | primary
//! primary    := "(" or_expr ")" | operand [compare_op operand]
//! operand    := identifier | literal
//! ```
//!
//! Keywords and literal prefixes are case-insensitive.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use chrono::{DateTime, Utc};
use tableset_core::expression::{CompareOp, LogicalOp};
use tableset_model::EntityValue;
use uuid::Uuid;

use super::ast::Filter;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while parsing a filter.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },
    /// A quoted literal was not closed.
    #[error("unterminated literal starting at offset {offset}")]
    UnterminatedLiteral {
        /// Byte offset of the opening quote's prefix.
        offset: usize,
    },
    /// A literal could not be decoded as its kind.
    #[error("invalid {kind} literal '{text}'")]
    InvalidLiteral {
        /// Literal kind.
        kind: &'static str,
        /// Offending text.
        text: String,
    },
}

// ---------------------------------------------------------------------------
// Token type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Literal(EntityValue),
    Compare(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(s) => write!(f, "identifier '{s}'"),
            Self::Literal(v) => write!(f, "literal {}", v.filter_literal()),
            Self::Compare(op) => write!(f, "'{}'", op.token()),
            Self::And => write!(f, "'and'"),
            Self::Or => write!(f, "'or'"),
            Self::Not => write!(f, "'not'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::Eof => write!(f, "end of filter"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    offset: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            offset: 0,
        }
    }

    fn tokenize(&mut self) -> Result<Vec<Token>, FilterError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok == Token::Eof;
            tokens.push(tok);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn next_token(&mut self) -> Result<Token, FilterError> {
        while self.chars.peek().is_some_and(char::is_ascii_whitespace) {
            self.bump();
        }

        let Some(&ch) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        match ch {
            '(' => {
                self.bump();
                Ok(Token::LParen)
            }
            ')' => {
                self.bump();
                Ok(Token::RParen)
            }
            '\'' => {
                let start = self.offset;
                let text = self.read_quoted(start)?;
                Ok(Token::Literal(EntityValue::String(text)))
            }
            c if c.is_ascii_digit() || c == '-' => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_word(),
            _ => Err(FilterError::UnexpectedToken {
                expected: "a filter token".to_owned(),
                found: format!("'{ch}'"),
            }),
        }
    }

    /// Read `'...'` with `''` standing for one quote.
    fn read_quoted(&mut self, start: usize) -> Result<String, FilterError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('\'') if self.chars.peek() == Some(&'\'') => {
                    self.bump();
                    text.push('\'');
                }
                Some('\'') => return Ok(text),
                Some(c) => text.push(c),
                None => return Err(FilterError::UnterminatedLiteral { offset: start }),
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, FilterError> {
        let mut text = String::new();
        if self.chars.peek() == Some(&'-') {
            text.push('-');
            self.bump();
        }
        let mut floating = false;
        while let Some(&c) = self.chars.peek() {
            match c {
                '0'..='9' => {}
                '.' => floating = true,
                'e' | 'E' => {
                    floating = true;
                    text.push(c);
                    self.bump();
                    if let Some(&sign @ ('+' | '-')) = self.chars.peek() {
                        text.push(sign);
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            text.push(c);
            self.bump();
        }

        let invalid = |kind| FilterError::InvalidLiteral {
            kind,
            text: text.clone(),
        };
        if let Some(&('L' | 'l')) = self.chars.peek() {
            self.bump();
            return text
                .parse()
                .map(|n| Token::Literal(EntityValue::Int64(n)))
                .map_err(|_| invalid("Int64"));
        }
        if floating {
            return text
                .parse()
                .map(|f| Token::Literal(EntityValue::Double(f)))
                .map_err(|_| invalid("Double"));
        }
        text.parse()
            .map(|n| Token::Literal(EntityValue::Int32(n)))
            .map_err(|_| invalid("Int32"))
    }

    fn read_word(&mut self) -> Result<Token, FilterError> {
        let start = self.offset;
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let lower = word.to_ascii_lowercase();
        if self.chars.peek() == Some(&'\'') {
            let text = self.read_quoted(start)?;
            return typed_literal(&lower, text).map(Token::Literal);
        }
        if let Some(op) = CompareOp::from_token(&lower) {
            return Ok(Token::Compare(op));
        }
        Ok(match lower.as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "true" => Token::Literal(EntityValue::Boolean(true)),
            "false" => Token::Literal(EntityValue::Boolean(false)),
            _ => Token::Identifier(word),
        })
    }
}

fn typed_literal(prefix: &str, text: String) -> Result<EntityValue, FilterError> {
    match prefix {
        "x" | "binary" => hex::decode(&text)
            .map(EntityValue::from)
            .map_err(|_| FilterError::InvalidLiteral {
                kind: "Binary",
                text,
            }),
        "datetime" => DateTime::parse_from_rfc3339(&text)
            .map(|dt| EntityValue::DateTime(dt.with_timezone(&Utc)))
            .map_err(|_| FilterError::InvalidLiteral {
                kind: "DateTime",
                text,
            }),
        "guid" => Uuid::parse_str(&text)
            .map(EntityValue::Guid)
            .map_err(|_| FilterError::InvalidLiteral { kind: "Guid", text }),
        _ => Err(FilterError::UnexpectedToken {
            expected: "X, binary, datetime or guid literal prefix".to_owned(),
            found: format!("'{prefix}'"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

enum Operand {
    Column(String),
    Value(EntityValue),
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), FilterError> {
        let tok = self.advance();
        if tok == *expected {
            Ok(())
        } else {
            Err(FilterError::UnexpectedToken {
                expected: expected.to_string(),
                found: tok.to_string(),
            })
        }
    }

    fn parse_or_expr(&mut self) -> Result<Filter, FilterError> {
        let mut left = self.parse_and_expr()?;
        while matches!(self.peek(), Token::Or) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Filter::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Filter, FilterError> {
        let mut left = self.parse_not_expr()?;
        while matches!(self.peek(), Token::And) {
            self.advance();
            let right = self.parse_not_expr()?;
            left = Filter::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Filter, FilterError> {
        if matches!(self.peek(), Token::Not) {
            self.advance();
            let inner = self.parse_not_expr()?;
            return Ok(Filter::Not(Box::new(inner)));
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> Result<Filter, FilterError> {
        if matches!(self.peek(), Token::LParen) {
            self.advance();
            let inner = self.parse_or_expr()?;
            self.expect(&Token::RParen)?;
            return Ok(inner);
        }

        let left = self.parse_operand()?;
        let Token::Compare(op) = *self.peek() else {
            return match left {
                Operand::Column(column) => Ok(Filter::Property(column)),
                Operand::Value(EntityValue::Boolean(b)) => Ok(Filter::Literal(b)),
                Operand::Value(value) => Err(FilterError::UnexpectedToken {
                    expected: "comparison operator".to_owned(),
                    found: format!("literal {}", value.filter_literal()),
                }),
            };
        };
        self.advance();
        let right = self.parse_operand()?;

        match (left, right) {
            (Operand::Column(column), Operand::Value(value)) => {
                Ok(Filter::Compare { column, op, value })
            }
            (Operand::Value(value), Operand::Column(column)) => Ok(Filter::Compare {
                column,
                op: op.flip(),
                value,
            }),
            (Operand::Column(_), Operand::Column(column)) => Err(FilterError::UnexpectedToken {
                expected: "literal".to_owned(),
                found: format!("identifier '{column}'"),
            }),
            (Operand::Value(_), Operand::Value(value)) => Err(FilterError::UnexpectedToken {
                expected: "identifier".to_owned(),
                found: format!("literal {}", value.filter_literal()),
            }),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, FilterError> {
        match self.advance() {
            Token::Identifier(name) => Ok(Operand::Column(name)),
            Token::Literal(value) => Ok(Operand::Value(value)),
            other => Err(FilterError::UnexpectedToken {
                expected: "identifier or literal".to_owned(),
                found: other.to_string(),
            }),
        }
    }
}

/// Parse filter text.
///
/// # Errors
///
/// Returns `FilterError` on malformed text, an invalid literal or trailing
/// tokens.
pub fn parse_filter(input: &str) -> Result<Filter, FilterError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let filter = parser.parse_or_expr()?;
    parser.expect(&Token::Eof)?;
    Ok(filter)
}
