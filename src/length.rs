//! CSS `<length-percentage>` values.
//!
//! A [`Length`] keeps the number and unit as written; nothing is resolved at
//! parse time.  [`Length::to_pixels`] performs the resolution once a viewport
//! and font metrics are known, which is also when the CSS `transform`
//! property's deferred translations get computed.

use crate::css::component_value::ComponentValue;
use crate::css::token::TokenKind;
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::parsers::{finite_f64, Parse, ValueCursor};
use crate::rect::Rect;

/// Units for length values.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum LengthUnit {
    /// `50%` is stored as `50.0` with this unit.
    Percent,

    /// Pixels, or the CSS default unit.  Unitless "user units" also land
    /// here; they are defined to be equal to pixels.
    Px,

    /// Size of the current font
    Em,

    /// x-height of the current font
    Ex,

    /// Inches (96 px)
    In,

    /// Centimeters
    Cm,

    /// Millimeters
    Mm,

    /// Points (1/72 inch)
    Pt,

    /// Picas (12 points)
    Pc,

    /// Advance measure of a '0' character
    Ch,
}

impl LengthUnit {
    /// Maps a dimension token's unit to a length unit, if it is one.
    pub fn from_unit_str(unit: &str) -> Option<LengthUnit> {
        match unit.to_ascii_lowercase().as_str() {
            "px" => Some(LengthUnit::Px),
            "em" => Some(LengthUnit::Em),
            "ex" => Some(LengthUnit::Ex),
            "in" => Some(LengthUnit::In),
            "cm" => Some(LengthUnit::Cm),
            "mm" => Some(LengthUnit::Mm),
            "pt" => Some(LengthUnit::Pt),
            "pc" => Some(LengthUnit::Pc),
            "ch" => Some(LengthUnit::Ch),
            _ => None,
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = match self {
            LengthUnit::Percent => "%",
            LengthUnit::Px => "px",
            LengthUnit::Em => "em",
            LengthUnit::Ex => "ex",
            LengthUnit::In => "in",
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
            LengthUnit::Pt => "pt",
            LengthUnit::Pc => "pc",
            LengthUnit::Ch => "ch",
        };

        write!(f, "{unit}")
    }
}

/// Which viewport dimension percentages resolve against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Extent {
    X,
    Y,
    /// The normalized diagonal, `sqrt(w² + h²) / sqrt(2)`.
    Diagonal,
}

/// Font-derived sizes needed to resolve `em`/`ex`/`ch` lengths.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontMetrics {
    pub font_size: f64,
    /// Defaults to half the font size when unknown.
    pub ex_height: Option<f64>,
    /// Advance of '0'; defaults to half the font size when unknown.
    pub ch_width: Option<f64>,
}

impl Default for FontMetrics {
    fn default() -> FontMetrics {
        FontMetrics {
            font_size: 16.0,
            ex_height: None,
            ch_width: None,
        }
    }
}

const PX_PER_INCH: f64 = 96.0;
const POINTS_PER_INCH: f64 = 72.0;
const CM_PER_INCH: f64 = 2.54;
const MM_PER_INCH: f64 = 25.4;
const PICA_PER_INCH: f64 = 6.0;

/// A `<length-percentage>`: numeric value plus unit, unresolved.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Default for Length {
    fn default() -> Length {
        Length::new(0.0, LengthUnit::Px)
    }
}

impl Length {
    pub fn new(value: f64, unit: LengthUnit) -> Length {
        Length { value, unit }
    }

    /// Resolves to user-space pixels against a viewport and font metrics.
    pub fn to_pixels(&self, viewport: &Rect, font_metrics: &FontMetrics, extent: Extent) -> f64 {
        match self.unit {
            LengthUnit::Px => self.value,

            LengthUnit::Percent => {
                let reference = match extent {
                    Extent::X => viewport.width(),
                    Extent::Y => viewport.height(),
                    Extent::Diagonal => normalized_diagonal(viewport),
                };
                self.value / 100.0 * reference
            }

            LengthUnit::Em => self.value * font_metrics.font_size,
            LengthUnit::Ex => {
                self.value
                    * font_metrics
                        .ex_height
                        .unwrap_or(font_metrics.font_size / 2.0)
            }
            LengthUnit::Ch => {
                self.value
                    * font_metrics
                        .ch_width
                        .unwrap_or(font_metrics.font_size / 2.0)
            }

            LengthUnit::In => self.value * PX_PER_INCH,
            LengthUnit::Cm => self.value * PX_PER_INCH / CM_PER_INCH,
            LengthUnit::Mm => self.value * PX_PER_INCH / MM_PER_INCH,
            LengthUnit::Pt => self.value * PX_PER_INCH / POINTS_PER_INCH,
            LengthUnit::Pc => self.value * PX_PER_INCH / PICA_PER_INCH,
        }
    }
}

fn normalized_diagonal(viewport: &Rect) -> f64 {
    // https://www.w3.org/TR/SVG/coords.html#Units
    let (w, h) = viewport.size();
    (w * w + h * h).sqrt() / std::f64::consts::SQRT_2
}

/// Parses a single `<length-percentage>` component.
///
/// `allow_user_units` is the presentation-attribute grammar, where bare
/// numbers mean user units; in property context only `0` may omit a unit.
pub fn parse_length_percentage(
    components: &[ComponentValue],
    allow_user_units: bool,
) -> ParseResult<Length> {
    let mut cursor = ValueCursor::new(components);
    let length = parse_length_percentage_item(&mut cursor, allow_user_units)?;
    cursor.expect_exhausted()?;
    Ok(length)
}

/// Like [`parse_length_percentage`], but consumes one length from a cursor so
/// list grammars (dash arrays, transform arguments) can reuse it.
pub(crate) fn parse_length_percentage_item(
    cursor: &mut ValueCursor<'_>,
    allow_user_units: bool,
) -> ParseResult<Length> {
    let token = cursor.next_token()?;
    let offset = FileOffset::Offset(token.offset);

    match &token.kind {
        TokenKind::Dimension {
            value, length_unit, ..
        } => match length_unit {
            Some(unit) => {
                let value = finite_f64(*value).map_err(|reason| ParseError::new(reason, offset))?;
                Ok(Length::new(value, *unit))
            }
            None => Err(ParseError::new("invalid length unit", offset)),
        },

        TokenKind::Percentage { value, .. } => {
            let value = finite_f64(*value).map_err(|reason| ParseError::new(reason, offset))?;
            Ok(Length::new(value, LengthUnit::Percent))
        }

        TokenKind::Number { value, .. } => {
            // Unitless zero is always a valid length; other bare numbers are
            // user units and only allowed in attribute context.
            if *value == 0.0 || allow_user_units {
                let value = finite_f64(*value).map_err(|reason| ParseError::new(reason, offset))?;
                Ok(Length::new(value, LengthUnit::Px))
            } else {
                Err(ParseError::new("expected length with unit", offset))
            }
        }

        _ => Err(ParseError::new("expected length", offset)),
    }
}

impl Parse for Length {
    fn parse(components: &[ComponentValue]) -> ParseResult<Length> {
        parse_length_percentage(components, false)
    }
}
