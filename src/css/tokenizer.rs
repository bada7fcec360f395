//! CSS tokenizer, per CSS Syntax Module Level 3.
//!
//! One deliberate difference from the spec: the input is *not* preprocessed.
//! Newlines are not collapsed (`\r`, `\r\n` and `\x0c` survive) and NUL bytes
//! are not replaced, so the raw bytes of the source show up in token text.
//! Parse errors the spec describes for unterminated constructs are emitted as
//! [`TokenKind::Error`] tokens so the stream stays aligned with the input.

use crate::css::token::{HashKind, NumberKind, Token, TokenKind, TokenizerError};
use crate::length::LengthUnit;
use crate::rcstring::RcString;

/// Tokenizes a CSS source string.  [`Tokenizer::next`] returns [`TokenKind::Eof`]
/// forever once the input is exhausted.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

const REPLACEMENT: char = '\u{FFFD}';

fn is_newline(b: u8) -> bool {
    b == b'\n' || b == b'\r' || b == b'\x0c'
}

fn is_whitespace(b: u8) -> bool {
    is_newline(b) || b == b'\t' || b == b' '
}

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c >= '\u{80}'
}

fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

fn is_non_printable(b: u8) -> bool {
    b <= 0x08 || b == 0x0b || (0x0e..=0x1f).contains(&b) || b == 0x7f
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Tokenizer<'a> {
        Tokenizer { input, pos: 0 }
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.input.as_bytes().get(pos).copied()
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.input.get(pos..).and_then(|s| s.chars().next())
    }

    /// `\` followed by anything but a newline (or EOF) begins an escape.
    fn is_valid_escape(&self, pos: usize) -> bool {
        if self.byte_at(pos) != Some(b'\\') {
            return false;
        }
        match self.byte_at(pos + 1) {
            None => false,
            Some(b) => !is_newline(b),
        }
    }

    /// Would the input at `pos` start an identifier?
    fn would_start_ident(&self, pos: usize) -> bool {
        match self.char_at(pos) {
            Some('-') => match self.char_at(pos + 1) {
                Some('-') => true,
                Some(c) if is_ident_start_char(c) => true,
                _ => self.is_valid_escape(pos + 1),
            },
            Some(c) if is_ident_start_char(c) => true,
            Some('\\') => self.is_valid_escape(pos),
            _ => false,
        }
    }

    /// Would the input at `pos` start a number?
    fn would_start_number(&self, pos: usize) -> bool {
        match self.byte_at(pos) {
            Some(b'+') | Some(b'-') => match self.byte_at(pos + 1) {
                Some(b) if is_digit(b) => true,
                Some(b'.') => matches!(self.byte_at(pos + 2), Some(b) if is_digit(b)),
                _ => false,
            },
            Some(b'.') => matches!(self.byte_at(pos + 1), Some(b) if is_digit(b)),
            Some(b) => is_digit(b),
            None => false,
        }
    }

    /// Consumes an escaped code point; `self.pos` is just past the backslash.
    fn consume_escaped(&mut self) -> char {
        let Some(first) = self.char_at(self.pos) else {
            // EOF after a backslash is a parse error; the spec says to return
            // the replacement character.
            return REPLACEMENT;
        };

        if first.is_ascii_hexdigit() {
            let start = self.pos;
            let mut digits = 0;
            while digits < 6 {
                match self.byte_at(self.pos) {
                    Some(b) if b.is_ascii_hexdigit() => {
                        self.pos += 1;
                        digits += 1;
                    }
                    _ => break,
                }
            }

            let value = u32::from_str_radix(&self.input[start..self.pos], 16).unwrap();

            // One whitespace character after the escape is consumed; \r\n
            // counts as one.
            match self.byte_at(self.pos) {
                Some(b'\r') => {
                    self.pos += 1;
                    if self.byte_at(self.pos) == Some(b'\n') {
                        self.pos += 1;
                    }
                }
                Some(b) if is_whitespace(b) => self.pos += 1,
                _ => (),
            }

            if value == 0 || (0xD800..=0xDFFF).contains(&value) || value > 0x10FFFF {
                REPLACEMENT
            } else {
                char::from_u32(value).unwrap_or(REPLACEMENT)
            }
        } else {
            self.pos += first.len_utf8();
            first
        }
    }

    /// Consumes an identifier sequence starting at `self.pos`.
    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();

        loop {
            match self.char_at(self.pos) {
                Some(c) if is_ident_char(c) => {
                    result.push(c);
                    self.pos += c.len_utf8();
                }
                Some('\\') if self.is_valid_escape(self.pos) => {
                    self.pos += 1;
                    result.push(self.consume_escaped());
                }
                _ => break,
            }
        }

        result
    }

    /// Consumes the numeric part of a number/percentage/dimension token.
    fn consume_number(&mut self) -> (f64, NumberKind, RcString) {
        let start = self.pos;
        let mut kind = NumberKind::Integer;

        if matches!(self.byte_at(self.pos), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        while matches!(self.byte_at(self.pos), Some(b) if is_digit(b)) {
            self.pos += 1;
        }
        if self.byte_at(self.pos) == Some(b'.')
            && matches!(self.byte_at(self.pos + 1), Some(b) if is_digit(b))
        {
            kind = NumberKind::Number;
            self.pos += 2;
            while matches!(self.byte_at(self.pos), Some(b) if is_digit(b)) {
                self.pos += 1;
            }
        }
        if matches!(self.byte_at(self.pos), Some(b'e') | Some(b'E')) {
            let mut lookahead = self.pos + 1;
            if matches!(self.byte_at(lookahead), Some(b'+') | Some(b'-')) {
                lookahead += 1;
            }
            if matches!(self.byte_at(lookahead), Some(b) if is_digit(b)) {
                kind = NumberKind::Number;
                self.pos = lookahead + 1;
                while matches!(self.byte_at(self.pos), Some(b) if is_digit(b)) {
                    self.pos += 1;
                }
            }
        }

        let text = &self.input[start..self.pos];
        let value = text.parse::<f64>().unwrap_or(0.0);
        (value, kind, RcString::from(text))
    }

    fn consume_numeric_token(&mut self, start: usize) -> Token {
        let (value, kind, text) = self.consume_number();

        if self.would_start_ident(self.pos) {
            let unit = self.consume_ident_sequence();
            let length_unit = LengthUnit::from_unit_str(&unit);
            Token::new(
                TokenKind::Dimension {
                    value,
                    text,
                    unit: RcString::from(unit),
                    length_unit,
                    kind,
                },
                start,
            )
        } else if self.byte_at(self.pos) == Some(b'%') {
            self.pos += 1;
            Token::new(TokenKind::Percentage { value, text, kind }, start)
        } else {
            Token::new(TokenKind::Number { value, text, kind }, start)
        }
    }

    fn consume_string(&mut self, start: usize, quote: u8) -> Token {
        let mut value = String::new();

        loop {
            match self.byte_at(self.pos) {
                None => {
                    return Token::new(TokenKind::Error(TokenizerError::EofInString), start);
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Token::new(TokenKind::String(RcString::from(value)), start);
                }
                Some(b) if is_newline(b) => {
                    // The newline is reconsumed; it will show up as whitespace.
                    return Token::new(TokenKind::BadString(RcString::from(value)), start);
                }
                Some(b'\\') => {
                    match self.byte_at(self.pos + 1) {
                        None => {
                            // A backslash at EOF is dropped.
                            self.pos += 1;
                        }
                        Some(b'\r') => {
                            // Escaped newline: line continuation.
                            self.pos += 2;
                            if self.byte_at(self.pos) == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        Some(b) if is_newline(b) => {
                            self.pos += 2;
                        }
                        Some(_) => {
                            self.pos += 1;
                            value.push(self.consume_escaped());
                        }
                    }
                }
                Some(_) => {
                    let c = self.char_at(self.pos).unwrap();
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn consume_url_token(&mut self, start: usize) -> Token {
        // Leading whitespace inside url( ) was already skipped by the caller.
        let mut value = String::new();

        loop {
            match self.byte_at(self.pos) {
                None => {
                    return Token::new(TokenKind::Error(TokenizerError::EofInUrl), start);
                }
                Some(b')') => {
                    self.pos += 1;
                    return Token::new(TokenKind::Url(RcString::from(value)), start);
                }
                Some(b) if is_whitespace(b) => {
                    while matches!(self.byte_at(self.pos), Some(b) if is_whitespace(b)) {
                        self.pos += 1;
                    }
                    return match self.byte_at(self.pos) {
                        None => Token::new(TokenKind::Error(TokenizerError::EofInUrl), start),
                        Some(b')') => {
                            self.pos += 1;
                            Token::new(TokenKind::Url(RcString::from(value)), start)
                        }
                        Some(_) => self.consume_remnants_of_bad_url(start),
                    };
                }
                Some(b) if b == b'"' || b == b'\'' || b == b'(' || is_non_printable(b) => {
                    return self.consume_remnants_of_bad_url(start);
                }
                Some(b'\\') => {
                    if self.is_valid_escape(self.pos) {
                        self.pos += 1;
                        value.push(self.consume_escaped());
                    } else {
                        return self.consume_remnants_of_bad_url(start);
                    }
                }
                Some(_) => {
                    let c = self.char_at(self.pos).unwrap();
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn consume_remnants_of_bad_url(&mut self, start: usize) -> Token {
        loop {
            match self.byte_at(self.pos) {
                None => break,
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) if self.is_valid_escape(self.pos) => {
                    self.pos += 1;
                    let _ = self.consume_escaped();
                }
                Some(_) => {
                    let c = self.char_at(self.pos).unwrap();
                    self.pos += c.len_utf8();
                }
            }
        }

        Token::new(TokenKind::BadUrl, start)
    }

    fn consume_ident_like_token(&mut self, start: usize) -> Token {
        let name = self.consume_ident_sequence();

        if self.byte_at(self.pos) == Some(b'(') {
            self.pos += 1;

            if name.eq_ignore_ascii_case("url") {
                // url( followed by optional whitespace and a quote is a
                // url() *function*, anything else is a <url-token>.
                let after_paren = self.pos;
                let mut lookahead = self.pos;
                while matches!(self.byte_at(lookahead), Some(b) if is_whitespace(b)) {
                    lookahead += 1;
                }

                match self.byte_at(lookahead) {
                    Some(b'"') | Some(b'\'') => {
                        self.pos = after_paren;
                        Token::new(TokenKind::Function(RcString::from(name)), start)
                    }
                    _ => {
                        self.pos = lookahead;
                        self.consume_url_token(start)
                    }
                }
            } else {
                Token::new(TokenKind::Function(RcString::from(name)), start)
            }
        } else {
            Token::new(TokenKind::Ident(RcString::from(name)), start)
        }
    }

    /// Consumes comments; an unterminated one produces an error token.
    fn consume_comments(&mut self) -> Option<Token> {
        while self.input[self.pos..].starts_with("/*") {
            let start = self.pos;
            match self.input[self.pos + 2..].find("*/") {
                Some(end) => {
                    self.pos += 2 + end + 2;
                }
                None => {
                    self.pos = self.input.len();
                    return Some(Token::new(
                        TokenKind::Error(TokenizerError::EofInComment),
                        start,
                    ));
                }
            }
        }

        None
    }

    /// Returns the next token.  At EOF, returns [`TokenKind::Eof`] forever.
    pub fn next(&mut self) -> Token {
        if let Some(error) = self.consume_comments() {
            return error;
        }

        let start = self.pos;
        let Some(b) = self.byte_at(self.pos) else {
            return Token::new(TokenKind::Eof, self.input.len());
        };

        match b {
            b if is_whitespace(b) => {
                while matches!(self.byte_at(self.pos), Some(b) if is_whitespace(b)) {
                    self.pos += 1;
                }
                Token::new(
                    TokenKind::Whitespace(RcString::from(&self.input[start..self.pos])),
                    start,
                )
            }

            b'"' | b'\'' => {
                self.pos += 1;
                self.consume_string(start, b)
            }

            b'#' => {
                self.pos += 1;
                let is_name = matches!(self.char_at(self.pos), Some(c) if is_ident_char(c))
                    || self.is_valid_escape(self.pos);
                if is_name {
                    let kind = if self.would_start_ident(self.pos) {
                        HashKind::Id
                    } else {
                        HashKind::Unrestricted
                    };
                    let value = self.consume_ident_sequence();
                    Token::new(
                        TokenKind::Hash {
                            value: RcString::from(value),
                            kind,
                        },
                        start,
                    )
                } else {
                    Token::new(TokenKind::Delim('#'), start)
                }
            }

            b'(' => {
                self.pos += 1;
                Token::new(TokenKind::ParenOpen, start)
            }
            b')' => {
                self.pos += 1;
                Token::new(TokenKind::ParenClose, start)
            }
            b'[' => {
                self.pos += 1;
                Token::new(TokenKind::SquareOpen, start)
            }
            b']' => {
                self.pos += 1;
                Token::new(TokenKind::SquareClose, start)
            }
            b'{' => {
                self.pos += 1;
                Token::new(TokenKind::CurlyOpen, start)
            }
            b'}' => {
                self.pos += 1;
                Token::new(TokenKind::CurlyClose, start)
            }
            b':' => {
                self.pos += 1;
                Token::new(TokenKind::Colon, start)
            }
            b';' => {
                self.pos += 1;
                Token::new(TokenKind::Semicolon, start)
            }
            b',' => {
                self.pos += 1;
                Token::new(TokenKind::Comma, start)
            }

            b'+' | b'.' => {
                if self.would_start_number(self.pos) {
                    self.consume_numeric_token(start)
                } else {
                    self.pos += 1;
                    Token::new(TokenKind::Delim(b as char), start)
                }
            }

            b'-' => {
                if self.would_start_number(self.pos) {
                    self.consume_numeric_token(start)
                } else if self.input[self.pos..].starts_with("-->") {
                    self.pos += 3;
                    Token::new(TokenKind::Cdc, start)
                } else if self.would_start_ident(self.pos) {
                    self.consume_ident_like_token(start)
                } else {
                    self.pos += 1;
                    Token::new(TokenKind::Delim('-'), start)
                }
            }

            b'<' => {
                if self.input[self.pos..].starts_with("<!--") {
                    self.pos += 4;
                    Token::new(TokenKind::Cdo, start)
                } else {
                    self.pos += 1;
                    Token::new(TokenKind::Delim('<'), start)
                }
            }

            b'@' => {
                self.pos += 1;
                if self.would_start_ident(self.pos) {
                    let name = self.consume_ident_sequence();
                    Token::new(TokenKind::AtKeyword(RcString::from(name)), start)
                } else {
                    Token::new(TokenKind::Delim('@'), start)
                }
            }

            b'\\' => {
                if self.is_valid_escape(self.pos) {
                    self.consume_ident_like_token(start)
                } else {
                    // Parse error per the spec; emit the backslash as a delim.
                    self.pos += 1;
                    Token::new(TokenKind::Delim('\\'), start)
                }
            }

            b if is_digit(b) => self.consume_numeric_token(start),

            _ => {
                let c = self.char_at(self.pos).unwrap();
                if is_ident_start_char(c) {
                    self.consume_ident_like_token(start)
                } else {
                    self.pos += c.len_utf8();
                    Token::new(TokenKind::Delim(c), start)
                }
            }
        }
    }
}
