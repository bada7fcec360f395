//! CSS token types.

use crate::length::LengthUnit;
use crate::rcstring::RcString;

/// Whether a numeric token was written as an integer or with a fractional /
/// exponent part.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Number,
}

/// Whether a hash token's body is a valid identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HashKind {
    /// The body would parse as an identifier; usable as an ID selector.
    Id,
    Unrestricted,
}

/// Error conditions the tokenizer reports in the token stream itself, so
/// downstream parsers stay aligned with the input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    EofInString,
    EofInComment,
    EofInUrl,
}

/// One CSS token, per CSS Syntax Module Level 3.
///
/// Numeric tokens keep the verbatim source text alongside the parsed value;
/// dimension tokens additionally pre-parse their unit as a [`LengthUnit`]
/// when it is one, so length consumers don't re-examine the unit string.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A run of whitespace, collapsed into one token carrying the run's text.
    Whitespace(RcString),
    Ident(RcString),
    /// `name(` — the open parenthesis is consumed.
    Function(RcString),
    AtKeyword(RcString),
    Hash {
        value: RcString,
        kind: HashKind,
    },
    String(RcString),
    /// A string terminated by an unescaped newline.
    BadString(RcString),
    Url(RcString),
    BadUrl,
    Delim(char),
    Number {
        value: f64,
        text: RcString,
        kind: NumberKind,
    },
    Percentage {
        /// The number as written: `50%` stores `50.0`.
        value: f64,
        text: RcString,
        kind: NumberKind,
    },
    Dimension {
        value: f64,
        text: RcString,
        unit: RcString,
        /// Pre-parsed unit for the units that name lengths.
        length_unit: Option<LengthUnit>,
        kind: NumberKind,
    },
    Colon,
    Semicolon,
    Comma,
    /// `<!--`
    Cdo,
    /// `-->`
    Cdc,
    SquareOpen,
    SquareClose,
    ParenOpen,
    ParenClose,
    CurlyOpen,
    CurlyClose,
    Error(TokenizerError),
    Eof,
}

/// A token plus the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Token {
        Token { kind, offset }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace(_))
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    pub fn is_delim(&self, c: char) -> bool {
        matches!(self.kind, TokenKind::Delim(d) if d == c)
    }

    pub fn as_ident(&self) -> Option<&RcString> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}
