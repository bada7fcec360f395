//! Handling of `preserveAspectRatio` values.
//!
//! [`AspectRatio`] encapsulates a `preserveAspectRatio` value
//! [per the SVG specification][spec].
//!
//! ```
//! # use svgfront::AspectRatio;
//! # use svgfront::Parse;
//! assert_eq!(
//!     AspectRatio::parse_str("xMidYMid").unwrap(),
//!     AspectRatio::default()
//! );
//! ```
//!
//! [spec]: https://www.w3.org/TR/SVG/coords.html#PreserveAspectRatioAttribute

use crate::css::component_value::ComponentValue;
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::parsers::{Parse, ValueCursor};
use crate::rect::Rect;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum FitMode {
    #[default]
    Meet,
    Slice,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum Align1D {
    Min,
    #[default]
    Mid,
    Max,
}

impl Align1D {
    fn compute(self, dest_pos: f64, dest_size: f64, obj_size: f64) -> f64 {
        match self {
            Align1D::Min => dest_pos,
            Align1D::Mid => dest_pos + (dest_size - obj_size) / 2.0,
            Align1D::Max => dest_pos + dest_size - obj_size,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Align {
    x: Align1D,
    y: Align1D,
    fit: FitMode,
}

/// A `preserveAspectRatio` value: one of the ten align keywords plus an
/// optional `meet`/`slice`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AspectRatio {
    align: Option<Align>,
}

impl Default for AspectRatio {
    fn default() -> AspectRatio {
        AspectRatio {
            align: Some(Align::default()),
        }
    }
}

impl AspectRatio {
    pub fn is_slice(&self) -> bool {
        matches!(
            self.align,
            Some(Align {
                fit: FitMode::Slice,
                ..
            })
        )
    }

    /// `preserveAspectRatio="none"`: scale non-uniformly to fill.
    pub fn is_none(&self) -> bool {
        self.align.is_none()
    }

    /// Fits `object` into `viewport`, returning the rectangle the object
    /// should occupy.
    pub fn compute(&self, object: &Rect, viewport: &Rect) -> Rect {
        match self.align {
            None => *viewport,

            Some(Align { x, y, fit }) => {
                let (obj_width, obj_height) = object.size();
                let (vp_width, vp_height) = viewport.size();

                let w_factor = vp_width / obj_width;
                let h_factor = vp_height / obj_height;

                let factor = match fit {
                    FitMode::Meet => w_factor.min(h_factor),
                    FitMode::Slice => w_factor.max(h_factor),
                };

                let w = obj_width * factor;
                let h = obj_height * factor;

                let xpos = x.compute(viewport.x0, vp_width, w);
                let ypos = y.compute(viewport.y0, vp_height, h);

                Rect::new(xpos, ypos, xpos + w, ypos + h)
            }
        }
    }
}

fn parse_align_xy(name: &str, offset: usize) -> ParseResult<Option<(Align1D, Align1D)>> {
    use self::Align1D::*;

    match name {
        "none" => Ok(None),

        "xMinYMin" => Ok(Some((Min, Min))),
        "xMidYMin" => Ok(Some((Mid, Min))),
        "xMaxYMin" => Ok(Some((Max, Min))),

        "xMinYMid" => Ok(Some((Min, Mid))),
        "xMidYMid" => Ok(Some((Mid, Mid))),
        "xMaxYMid" => Ok(Some((Max, Mid))),

        "xMinYMax" => Ok(Some((Min, Max))),
        "xMidYMax" => Ok(Some((Mid, Max))),
        "xMaxYMax" => Ok(Some((Max, Max))),

        _ => Err(ParseError::new(
            format!("invalid align value '{name}'"),
            FileOffset::Offset(offset),
        )),
    }
}

impl Parse for AspectRatio {
    fn parse(components: &[ComponentValue]) -> ParseResult<AspectRatio> {
        let mut cursor = ValueCursor::new(components);

        let align_token = cursor.next_token()?;
        let align_offset = align_token.offset;
        let align_name = match align_token.as_ident() {
            Some(name) => name,
            None => {
                return Err(ParseError::new(
                    "expected align value",
                    FileOffset::Offset(align_offset),
                ))
            }
        };

        let align_xy = parse_align_xy(align_name, align_offset)?;

        let fit = match cursor.peek() {
            None => FitMode::default(),
            Some(_) => {
                let fit_token = cursor.next_token()?;
                let fit_offset = fit_token.offset;
                match fit_token.as_ident() {
                    Some(name) if name.as_str() == "meet" => FitMode::Meet,
                    Some(name) if name.as_str() == "slice" => FitMode::Slice,
                    _ => {
                        return Err(ParseError::new(
                            "expected 'meet' or 'slice'",
                            FileOffset::Offset(fit_offset),
                        ))
                    }
                }
            }
        };

        cursor.expect_exhausted()?;

        Ok(AspectRatio {
            align: align_xy.map(|(x, y)| Align { x, y, fit }),
        })
    }
}
