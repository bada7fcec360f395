//! The `An+B` microsyntax used by `:nth-child()` and friends.
//!
//! The surface syntax is awkward because it rides on top of CSS tokenization:
//! `3n-2` arrives as a single dimension token with unit `n-2`, `-n` is an
//! ident, `+n` is a delim followed by an ident, and `+ n` (with a space) is
//! invalid.  The parser classifies each shape explicitly rather than
//! re-tokenizing.

use crate::css::component_value::ComponentValue;
use crate::css::token::{NumberKind, Token, TokenKind};
use crate::error::{FileOffset, ParseError, ParseResult};

/// The coefficients of `a·k + b`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AnbValue {
    pub a: i32,
    pub b: i32,
}

impl AnbValue {
    pub fn new(a: i32, b: i32) -> AnbValue {
        AnbValue { a, b }
    }

    /// Whether `index` is in the progression: ∃ k ≥ 0 with `a·k + b == index`.
    pub fn evaluate(&self, index: i32) -> bool {
        if self.a == 0 {
            return index == self.b;
        }

        let diff = index - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }
}

/// A parsed An+B value plus whatever components followed it, so callers can
/// parse an `of S` tail.
#[derive(Debug)]
pub struct AnbResult<'a> {
    pub value: AnbValue,
    pub remaining: &'a [ComponentValue],
}

const UNEXPECTED_TOKEN: &str = "Unexpected token when parsing An+B microsyntax";
const END_OF_LIST: &str = "An+B microsyntax unexpected end of list";

/// Shapes of the `n`-bearing identifiers and dimension units.
enum NForm {
    /// `n`
    Bare,
    /// `n-`, must be followed by a signless integer
    Dash,
    /// `n-123`
    DashDigits(i32),
}

/// Parser for the An+B microsyntax over a span of component values.
pub struct AnbParser;

impl AnbParser {
    /// Parses the leading An+B value of `components`.
    pub fn parse(components: &[ComponentValue]) -> ParseResult<AnbResult<'_>> {
        let mut p = Cursor { components };

        p.skip_whitespace();
        if p.is_eof() {
            return Err(ParseError::new(
                "An+B microsyntax expected, found empty list",
                FileOffset::EndOfString,
            ));
        }

        // A leading '+' must be glued to an n-form ident: "+ 2n" is invalid.
        let mut after_plus = false;
        let value = loop {
            let Some(token) = p.front_token() else {
                return Err(p.error("Expected CSS token when parsing An+B microsyntax"));
            };

            match &token.kind {
                TokenKind::Delim('+') => {
                    p.advance();
                    if p.is_eof() {
                        return Err(p.end_of_list());
                    }
                    if p.front_is_whitespace() {
                        return Err(p.unexpected());
                    }
                    after_plus = true;
                }

                TokenKind::Ident(name) => {
                    let name = name.clone();
                    p.advance();

                    if !after_plus {
                        if name.equals_ignore_case("even") {
                            break AnbValue::new(2, 0);
                        } else if name.equals_ignore_case("odd") {
                            break AnbValue::new(2, 1);
                        }
                    }

                    let (sign, form) = match split_n_form(&name) {
                        Some(parts) => parts,
                        None => return Err(p.unexpected()),
                    };
                    if after_plus && sign < 0 {
                        // "+-n" cannot tokenize this way, but be strict.
                        return Err(p.unexpected());
                    }

                    break p.finish_n_form(sign, form)?;
                }

                TokenKind::Dimension {
                    value, unit, kind, ..
                } => {
                    if after_plus || *kind != NumberKind::Integer {
                        return Err(p.unexpected());
                    }
                    let a = *value as i32;
                    let unit = unit.clone();
                    p.advance();

                    let form = match split_n_form(&unit) {
                        Some((1, form)) => form,
                        _ => return Err(p.unexpected()),
                    };

                    break p.finish_dimension(a, form)?;
                }

                TokenKind::Number { value, kind, .. } => {
                    if after_plus || *kind != NumberKind::Integer {
                        return Err(p.unexpected());
                    }
                    let b = *value as i32;
                    p.advance();
                    break AnbValue::new(0, b);
                }

                _ => return Err(p.unexpected()),
            }
        };

        p.skip_whitespace();

        Ok(AnbResult {
            value,
            remaining: p.components,
        })
    }
}

/// Splits an ident like `n`, `-n`, `n-`, `n-123` into its sign and shape.
fn split_n_form(text: &str) -> Option<(i32, NForm)> {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text),
    };

    let rest = match rest.strip_prefix(|c| c == 'n' || c == 'N') {
        Some(rest) => rest,
        None => return None,
    };

    if rest.is_empty() {
        return Some((sign, NForm::Bare));
    }
    if rest == "-" {
        return Some((sign, NForm::Dash));
    }
    if let Some(digits) = rest.strip_prefix('-') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let value: i32 = digits.parse().ok()?;
            return Some((sign, NForm::DashDigits(value)));
        }
    }

    None
}

struct Cursor<'a> {
    components: &'a [ComponentValue],
}

impl<'a> Cursor<'a> {
    fn is_eof(&self) -> bool {
        self.components.is_empty()
    }

    // Peeks return `'a` references into the component span, not borrows of
    // the cursor, so the cursor can advance while they are held.
    fn front_token(&self) -> Option<&'a Token> {
        self.components.first().and_then(|c| c.as_token())
    }

    fn front_is_whitespace(&self) -> bool {
        self.components
            .first()
            .map(|c| c.is_whitespace())
            .unwrap_or(false)
    }

    fn advance(&mut self) {
        self.components = &self.components[1..];
    }

    fn skip_whitespace(&mut self) {
        while self.front_is_whitespace() {
            self.advance();
        }
    }

    fn error(&self, reason: &str) -> ParseError {
        let location = self
            .components
            .first()
            .map(|c| FileOffset::Offset(c.source_offset()))
            .unwrap_or(FileOffset::EndOfString);
        ParseError::new(reason, location)
    }

    fn unexpected(&self) -> ParseError {
        self.error(UNEXPECTED_TOKEN)
    }

    fn end_of_list(&self) -> ParseError {
        self.error(END_OF_LIST)
    }

    /// Finishes `a·n` once the coefficient sign and n-shape are known.
    fn finish_n_form(&mut self, sign: i32, form: NForm) -> ParseResult<AnbValue> {
        let a = sign;
        match form {
            NForm::Bare => {
                let b = self.parse_b_tail()?;
                Ok(AnbValue::new(a, b))
            }
            NForm::Dash => {
                let b = self.parse_signless_integer()?;
                Ok(AnbValue::new(a, -b))
            }
            NForm::DashDigits(digits) => Ok(AnbValue::new(a, -digits)),
        }
    }

    /// Finishes `<n-dimension>` forms like `123n`, `123n-`, `123n-45`.
    fn finish_dimension(&mut self, a: i32, form: NForm) -> ParseResult<AnbValue> {
        match form {
            NForm::Bare => {
                let b = self.parse_b_tail()?;
                Ok(AnbValue::new(a, b))
            }
            NForm::Dash => {
                let b = self.parse_signless_integer()?;
                Ok(AnbValue::new(a, -b))
            }
            NForm::DashDigits(digits) => Ok(AnbValue::new(a, -digits)),
        }
    }

    /// Parses the `± B` part that may follow a bare `n`: either a signed
    /// integer token (`+2`, `-2`), or an explicit `+`/`-` delim followed by a
    /// signless integer.  Anything ident-like here is an error; other tokens
    /// end the An+B value.
    fn parse_b_tail(&mut self) -> ParseResult<i32> {
        self.skip_whitespace();

        let Some(token) = self.front_token() else {
            if self.is_eof() {
                return Ok(0);
            }
            return Err(self.error("Expected CSS token when parsing An+B microsyntax"));
        };

        match &token.kind {
            TokenKind::Number { value, text, kind } => {
                let signed = text.starts_with('+') || text.starts_with('-');
                if !signed || *kind != NumberKind::Integer {
                    return Err(self.unexpected());
                }
                let b = *value as i32;
                self.advance();
                Ok(b)
            }

            TokenKind::Delim(sign @ ('+' | '-')) => {
                let sign = if *sign == '-' { -1 } else { 1 };
                self.advance();
                let b = self.parse_signless_integer()?;
                Ok(sign * b)
            }

            TokenKind::Ident(_) | TokenKind::Dimension { .. } => Err(self.unexpected()),

            _ => Ok(0),
        }
    }

    /// Parses a whitespace-separated signless integer, for the `n- 2` and
    /// `n + 2` shapes.
    fn parse_signless_integer(&mut self) -> ParseResult<i32> {
        self.skip_whitespace();

        if self.is_eof() {
            return Err(self.end_of_list());
        }

        let Some(token) = self.front_token() else {
            return Err(self.error("Expected CSS token when parsing An+B microsyntax"));
        };

        match &token.kind {
            TokenKind::Number { value, text, kind } => {
                let signless = !text.starts_with('+') && !text.starts_with('-');
                if !signless || *kind != NumberKind::Integer {
                    return Err(self.unexpected());
                }
                let b = *value as i32;
                self.advance();
                Ok(b)
            }
            _ => Err(self.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::component_value::{parse_list_of_component_values, WhitespaceHandling};

    fn parse(s: &str) -> ParseResult<(AnbValue, usize)> {
        let components = parse_list_of_component_values(s, WhitespaceHandling::Keep);
        AnbParser::parse(&components).map(|r| (r.value, r.remaining.len()))
    }

    fn value(s: &str) -> AnbValue {
        let (value, remaining) = parse(s).unwrap();
        assert_eq!(remaining, 0, "input {s:?} should be fully consumed");
        value
    }

    fn error(s: &str) -> String {
        parse(s).unwrap_err().reason
    }

    #[test]
    fn keywords() {
        assert_eq!(value("even"), AnbValue::new(2, 0));
        assert_eq!(value("odd"), AnbValue::new(2, 1));
        assert_eq!(value("EVEN"), AnbValue::new(2, 0));
    }

    #[test]
    fn empty_list_is_an_error() {
        assert_eq!(error(""), "An+B microsyntax expected, found empty list");
        assert_eq!(error("   "), "An+B microsyntax expected, found empty list");
    }

    #[test]
    fn plain_integers() {
        assert_eq!(value("5"), AnbValue::new(0, 5));
        assert_eq!(value("+6"), AnbValue::new(0, 6));
        assert_eq!(value("-17"), AnbValue::new(0, -17));
    }

    #[test]
    fn dimension_forms() {
        assert_eq!(value("2n"), AnbValue::new(2, 0));
        assert_eq!(value("2n+0"), AnbValue::new(2, 0));
        assert_eq!(value("4n+1"), AnbValue::new(4, 1));
        assert_eq!(value("-1n+6"), AnbValue::new(-1, 6));
        assert_eq!(value("-4n+10"), AnbValue::new(-4, 10));
        assert_eq!(value("0n+5"), AnbValue::new(0, 5));
        assert_eq!(value("3n-6"), AnbValue::new(3, -6));
        assert_eq!(value("3n-6234"), AnbValue::new(3, -6234));
        assert_eq!(value("123n -2"), AnbValue::new(123, -2));
        assert_eq!(value("123n +2"), AnbValue::new(123, 2));
        assert_eq!(value("123n - 3"), AnbValue::new(123, -3));
        assert_eq!(value("123n + 3"), AnbValue::new(123, 3));
        assert_eq!(value("123n-1"), AnbValue::new(123, -1));
        assert_eq!(value("+123n-1"), AnbValue::new(123, -1));
        assert_eq!(value("123n- 1"), AnbValue::new(123, -1));
        assert_eq!(value("+123n- 1"), AnbValue::new(123, -1));
    }

    #[test]
    fn ident_forms() {
        assert_eq!(value("n"), AnbValue::new(1, 0));
        assert_eq!(value("n+0"), AnbValue::new(1, 0));
        assert_eq!(value("1n+0"), AnbValue::new(1, 0));
        assert_eq!(value("-n"), AnbValue::new(-1, 0));
        assert_eq!(value("-n+2"), AnbValue::new(-1, 2));
        assert_eq!(value("-n- 2"), AnbValue::new(-1, -2));
        assert_eq!(value("-n-2"), AnbValue::new(-1, -2));
        assert_eq!(value("-n + 3"), AnbValue::new(-1, 3));
        assert_eq!(value("-n - 3"), AnbValue::new(-1, -3));
        assert_eq!(value("-n+ 6"), AnbValue::new(-1, 6));
        assert_eq!(value("n-2"), AnbValue::new(1, -2));
        assert_eq!(value("+n-2"), AnbValue::new(1, -2));
        assert_eq!(value("n- 2"), AnbValue::new(1, -2));
        assert_eq!(value("+n- 2"), AnbValue::new(1, -2));
        assert_eq!(value("n + 123"), AnbValue::new(1, 123));
        assert_eq!(value("+n + 123"), AnbValue::new(1, 123));
        assert_eq!(value("n - 123"), AnbValue::new(1, -123));
        assert_eq!(value("+n - 123"), AnbValue::new(1, -123));
        assert_eq!(value("-n- 123"), AnbValue::new(-1, -123));
    }

    #[test]
    fn whitespace_corners() {
        // The `n` is not part of the value, so it remains unconsumed.
        assert_eq!(parse("3 n").unwrap(), (AnbValue::new(0, 3), 1));
        assert_eq!(error("+ 2n"), UNEXPECTED_TOKEN);
        assert_eq!(error("+ 2"), UNEXPECTED_TOKEN);
    }

    #[test]
    fn signed_integer_required_after_n_with_space() {
        assert_eq!(value("3n + 1"), AnbValue::new(3, 1));
        assert_eq!(value("+3n - 2"), AnbValue::new(3, -2));
        assert_eq!(error("3n + -6"), UNEXPECTED_TOKEN);
        assert_eq!(error("-n- +123"), UNEXPECTED_TOKEN);
        assert_eq!(error("+n- +2"), UNEXPECTED_TOKEN);
        assert_eq!(error("+123n- +2"), UNEXPECTED_TOKEN);
    }

    #[test]
    fn trailing_garbage() {
        assert_eq!(error("3n-6a"), UNEXPECTED_TOKEN);
        assert_eq!(error("-n n"), UNEXPECTED_TOKEN);
        assert_eq!(error("+n n"), UNEXPECTED_TOKEN);
        assert_eq!(error("+n + n"), UNEXPECTED_TOKEN);
        assert_eq!(error("123n 1"), UNEXPECTED_TOKEN);

        // A non-ident token after the value is not an error; it stays in the
        // remaining components.
        assert_eq!(parse("n+0\u{10}").unwrap(), (AnbValue::new(1, 0), 1));
    }

    #[test]
    fn unexpected_end_of_stream() {
        assert_eq!(error("+"), END_OF_LIST);
        assert_eq!(error("++"), END_OF_LIST);
        assert_eq!(error("n-"), END_OF_LIST);
        assert_eq!(error("-n +"), END_OF_LIST);
    }

    #[test]
    fn functions_are_not_tokens() {
        assert_eq!(
            error("func()"),
            "Expected CSS token when parsing An+B microsyntax"
        );
    }

    #[test]
    fn evaluate() {
        // even
        let even = AnbValue::new(2, 0);
        assert!(even.evaluate(2));
        assert!(even.evaluate(4));
        assert!(!even.evaluate(3));

        // odd
        let odd = AnbValue::new(2, 1);
        assert!(odd.evaluate(1));
        assert!(!odd.evaluate(2));

        // constant
        let five = AnbValue::new(0, 5);
        assert!(five.evaluate(5));
        assert!(!five.evaluate(10));

        // negative coefficient counts downward from b
        let first_three = AnbValue::new(-1, 3);
        assert!(first_three.evaluate(1));
        assert!(first_three.evaluate(3));
        assert!(!first_three.evaluate(4));

        // k must be non-negative
        let from_four = AnbValue::new(2, 4);
        assert!(!from_four.evaluate(2));
        assert!(from_four.evaluate(4));
        assert!(from_four.evaluate(6));
    }
}
