//! Angle values.

use std::f64::consts::PI;

use float_cmp::approx_eq;

use crate::css::component_value::ComponentValue;
use crate::css::token::TokenKind;
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::parsers::{finite_f64, Parse, ValueCursor};

/// An angle, stored in radians normalized to `[0, 2π)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Angle(f64);

impl Angle {
    pub fn new(rad: f64) -> Angle {
        Angle(Angle::normalize(rad))
    }

    pub fn from_degrees(deg: f64) -> Angle {
        Angle(Angle::normalize(deg.to_radians()))
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    // Normalizes an angle to [0.0, 2*PI)
    fn normalize(rad: f64) -> f64 {
        let res = rad % (PI * 2.0);
        if approx_eq!(f64, res, 0.0) {
            0.0
        } else if res < 0.0 {
            res + PI * 2.0
        } else {
            res
        }
    }
}

/// How bare numbers are treated when parsing an `<angle>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AngleParseOptions {
    /// Only dimension tokens with an angle unit are accepted.
    RequireUnits,
    /// A bare `0` is accepted; any other bare number is an error.
    AllowBareZero,
    /// Bare numbers are degrees, as in the SVG `transform` grammars.
    AllowNumbersInDegrees,
}

// angle:
// https://www.w3.org/TR/SVG/types.html#DataTypeAngle
//
// angle ::= number ("deg" | "grad" | "rad" | "turn")?
//
/// Parses one `<angle>` component value.
pub fn parse_angle(
    components: &[ComponentValue],
    options: AngleParseOptions,
) -> ParseResult<Angle> {
    let mut cursor = ValueCursor::new(components);
    let angle = parse_angle_item(&mut cursor, options)?;
    cursor.expect_exhausted()?;
    Ok(angle)
}

pub(crate) fn parse_angle_item(
    cursor: &mut ValueCursor<'_>,
    options: AngleParseOptions,
) -> ParseResult<Angle> {
    let token = cursor.next_token()?;
    let offset = FileOffset::Offset(token.offset);

    match &token.kind {
        TokenKind::Number { value, .. } => {
            let allowed = match options {
                AngleParseOptions::RequireUnits => false,
                AngleParseOptions::AllowBareZero => *value == 0.0,
                AngleParseOptions::AllowNumbersInDegrees => true,
            };
            if !allowed {
                return Err(ParseError::new("expected angle with unit", offset));
            }

            let degrees = finite_f64(*value).map_err(|reason| ParseError::new(reason, offset))?;
            Ok(Angle::from_degrees(degrees))
        }

        TokenKind::Dimension { value, unit, .. } => {
            let value = finite_f64(*value).map_err(|reason| ParseError::new(reason, offset))?;

            if unit.equals_lowercase("deg") {
                Ok(Angle::from_degrees(value))
            } else if unit.equals_lowercase("grad") {
                Ok(Angle::from_degrees(value * 360.0 / 400.0))
            } else if unit.equals_lowercase("rad") {
                Ok(Angle::new(value))
            } else if unit.equals_lowercase("turn") {
                Ok(Angle::from_degrees(value * 360.0))
            } else {
                Err(ParseError::new("invalid angle unit", offset))
            }
        }

        _ => Err(ParseError::new("expected angle", offset)),
    }
}

impl Parse for Angle {
    fn parse(components: &[ComponentValue]) -> ParseResult<Angle> {
        parse_angle(components, AngleParseOptions::AllowNumbersInDegrees)
    }
}
