//! Affine transforms and the two transform grammars.
//!
//! This module contains the following:
//!
//! * [`Transform`], a plain 2D affine matrix.
//!
//! * [`parse_svg_transform`] for the SVG 1.1 `transform` *attribute*, which
//!   takes bare numbers and is whitespace/comma flexible.
//!
//! * [`CssTransform`] and [`parse_css_transform`] for the `transform`
//!   *property* from CSS Transforms Level 1, which takes `<length-percentage>`
//!   translations.  Translations stay symbolic until
//!   [`CssTransform::compute`] resolves them against a viewport and font
//!   metrics.

use crate::angle::{parse_angle_item, Angle, AngleParseOptions};
use crate::css::component_value::{BlockKind, ComponentValue};
use crate::css::token::TokenKind;
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::length::{parse_length_percentage_item, Extent, FontMetrics, Length, LengthUnit};
use crate::parsers::{Parse, ValueCursor};
use crate::rect::Rect;
use crate::util::near_equals;
use crate::vector::Vector2;

/// A 2D transformation matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Transform {
    #[inline]
    pub fn new_unchecked(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new_unchecked(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub fn new_translate(tx: f64, ty: f64) -> Self {
        Self::new_unchecked(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Self::new_unchecked(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    #[inline]
    pub fn new_rotate(a: Angle) -> Self {
        let (s, c) = a.radians().sin_cos();
        Self::new_unchecked(c, s, -s, c, 0.0, 0.0)
    }

    #[inline]
    pub fn new_skew(ax: Angle, ay: Angle) -> Self {
        Self::new_unchecked(1.0, ay.radians().tan(), ax.radians().tan(), 1.0, 0.0, 0.0)
    }

    /// `t1` then `t2`: points transformed by the result see `t1` first.
    #[must_use]
    pub fn multiply(t1: &Transform, t2: &Transform) -> Self {
        #[allow(clippy::suspicious_operation_groupings)]
        Transform {
            xx: t1.xx * t2.xx + t1.yx * t2.xy,
            yx: t1.xx * t2.yx + t1.yx * t2.yy,
            xy: t1.xy * t2.xx + t1.yy * t2.xy,
            yy: t1.xy * t2.yx + t1.yy * t2.yy,
            x0: t1.x0 * t2.xx + t1.y0 * t2.xy + t2.x0,
            y0: t1.x0 * t2.yx + t1.y0 * t2.yy + t2.y0,
        }
    }

    #[inline]
    pub fn pre_transform(&self, t: &Transform) -> Self {
        Self::multiply(t, self)
    }

    #[inline]
    pub fn post_transform(&self, t: &Transform) -> Self {
        Self::multiply(self, t)
    }

    #[inline]
    pub fn pre_translate(&self, x: f64, y: f64) -> Self {
        self.pre_transform(&Transform::new_translate(x, y))
    }

    #[inline]
    pub fn pre_scale(&self, sx: f64, sy: f64) -> Self {
        self.pre_transform(&Transform::new_scale(sx, sy))
    }

    #[inline]
    pub fn pre_rotate(&self, angle: Angle) -> Self {
        self.pre_transform(&Transform::new_rotate(angle))
    }

    #[inline]
    pub fn post_translate(&self, x: f64, y: f64) -> Self {
        self.post_transform(&Transform::new_translate(x, y))
    }

    #[inline]
    fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.yx
    }

    #[inline]
    pub fn is_invertible(&self) -> bool {
        let det = self.determinant();

        det != 0.0 && det.is_finite()
    }

    /// Whether this is the identity matrix, within epsilon.
    pub fn is_identity(&self) -> bool {
        near_equals(self.xx, 1.0, 1e-9)
            && near_equals(self.yx, 0.0, 1e-9)
            && near_equals(self.xy, 0.0, 1e-9)
            && near_equals(self.yy, 1.0, 1e-9)
            && near_equals(self.x0, 0.0, 1e-9)
            && near_equals(self.y0, 0.0, 1e-9)
    }

    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();

        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let inv_det = 1.0 / det;

        Some(Transform::new_unchecked(
            inv_det * self.yy,
            inv_det * (-self.yx),
            inv_det * (-self.xy),
            inv_det * self.xx,
            inv_det * (self.xy * self.y0 - self.yy * self.x0),
            inv_det * (self.yx * self.x0 - self.xx * self.y0),
        ))
    }

    /// Transforms a direction; the translation does not apply.
    #[inline]
    pub fn transform_vector(&self, v: Vector2) -> Vector2 {
        Vector2::new(v.x * self.xx + v.y * self.xy, v.x * self.yx + v.y * self.yy)
    }

    #[inline]
    pub fn transform_position(&self, p: Vector2) -> Vector2 {
        let v = self.transform_vector(p);
        Vector2::new(v.x + self.x0, v.y + self.y0)
    }

    /// The tight box around the transformed corners of `rect`.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let points = [
            self.transform_position(Vector2::new(rect.x0, rect.y0)),
            self.transform_position(Vector2::new(rect.x1, rect.y0)),
            self.transform_position(Vector2::new(rect.x0, rect.y1)),
            self.transform_position(Vector2::new(rect.x1, rect.y1)),
        ];

        let mut result = Rect::empty_at(points[0]);
        for &p in &points[1..] {
            result.add_point(p);
        }

        result
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::identity()
    }
}

/// Parses the SVG 1.1 `transform` attribute grammar into a matrix.
///
/// `matrix|translate|scale|rotate|skewX|skewY`, arguments are bare numbers
/// (angles in degrees), whitespace/comma flexible, composed left-to-right.
/// An empty list is the identity.
pub fn parse_svg_transform(components: &[ComponentValue]) -> ParseResult<Transform> {
    let mut cursor = ValueCursor::new(components);
    let mut result = Transform::identity();

    loop {
        if cursor.peek().is_none() {
            break;
        }

        result = parse_svg_transform_command(&mut cursor)?.post_transform(&result);
        cursor.optional_comma();
    }

    Ok(result)
}

/// Convenience entry point over raw attribute text.
pub fn parse_svg_transform_str(input: &str) -> ParseResult<Transform> {
    parse_svg_transform(&crate::css::parse_value(input))
}

impl Parse for Transform {
    fn parse(components: &[ComponentValue]) -> ParseResult<Transform> {
        parse_svg_transform(components)
    }
}

fn parse_svg_transform_command(cursor: &mut ValueCursor<'_>) -> ParseResult<Transform> {
    // `scale(2)` tokenizes as a function, but `scale (2)` is an ident
    // followed by a parenthesized block; the grammar allows both.
    let (name, arguments, offset) = match cursor.next() {
        Some(ComponentValue::Function(function)) => {
            (&function.name, &function.values, function.offset)
        }

        Some(ComponentValue::Token(token)) if token.as_ident().is_some() => {
            let name = token.as_ident().unwrap();
            match cursor.next() {
                Some(ComponentValue::Block(block)) if block.kind == BlockKind::Paren => {
                    (name, &block.values, token.offset)
                }
                _ => {
                    return Err(ParseError::new(
                        "expected '(' after transform name",
                        FileOffset::Offset(token.offset),
                    ))
                }
            }
        }

        Some(other) => {
            return Err(ParseError::new(
                "expected transform function",
                FileOffset::Offset(other.source_offset()),
            ))
        }
        None => {
            return Err(ParseError::new(
                "expected transform function",
                FileOffset::EndOfString,
            ))
        }
    };

    let mut args = ValueCursor::new(arguments);
    let transform = match name.as_str() {
        "matrix" => parse_matrix_args(&mut args)?,
        "translate" => parse_translate_args(&mut args)?,
        "scale" => parse_scale_args(&mut args)?,
        "rotate" => parse_rotate_args(&mut args)?,
        "skewX" => Transform::new_skew(parse_degrees(&mut args)?, Angle::new(0.0)),
        "skewY" => Transform::new_skew(Angle::new(0.0), parse_degrees(&mut args)?),
        _ => {
            return Err(ParseError::new(
                "expected matrix|translate|scale|rotate|skewX|skewY",
                FileOffset::Offset(offset),
            ))
        }
    };

    args.expect_exhausted()?;
    Ok(transform)
}

fn parse_degrees(args: &mut ValueCursor<'_>) -> ParseResult<Angle> {
    Ok(Angle::from_degrees(args.expect_number()?))
}

fn parse_matrix_args(args: &mut ValueCursor<'_>) -> ParseResult<Transform> {
    let mut values = [0.0; 6];

    for (i, value) in values.iter_mut().enumerate() {
        if i > 0 {
            args.optional_comma();
        }
        *value = args.expect_number()?;
    }

    Ok(Transform::new_unchecked(
        values[0], values[1], values[2], values[3], values[4], values[5],
    ))
}

fn parse_translate_args(args: &mut ValueCursor<'_>) -> ParseResult<Transform> {
    let tx = args.expect_number()?;

    // A trailing comma without a second argument is an error.
    let ty = if args.peek().is_some() {
        args.optional_comma();
        args.expect_number()?
    } else {
        0.0
    };

    Ok(Transform::new_translate(tx, ty))
}

fn parse_scale_args(args: &mut ValueCursor<'_>) -> ParseResult<Transform> {
    let sx = args.expect_number()?;

    let sy = if args.peek().is_some() {
        args.optional_comma();
        args.expect_number()?
    } else {
        sx
    };

    Ok(Transform::new_scale(sx, sy))
}

fn parse_rotate_args(args: &mut ValueCursor<'_>) -> ParseResult<Transform> {
    let angle = parse_degrees(args)?;

    if args.peek().is_none() {
        return Ok(Transform::new_rotate(angle));
    }

    args.optional_comma();
    let cx = args.expect_number()?;
    args.optional_comma();
    let cy = args.expect_number()?;

    Ok(Transform::new_translate(cx, cy)
        .pre_rotate(angle)
        .pre_translate(-cx, -cy))
}

/// One element of a CSS `transform` list.
///
/// Everything except translations folds into a matrix immediately;
/// translations keep their lengths so percentages and font-relative units can
/// resolve later.
#[derive(Debug, Clone, PartialEq)]
pub enum CssTransformElement {
    Simple(Transform),
    Translate(Length, Length),
}

/// The parsed value of the CSS `transform` property.
///
/// `none` parses to the empty list, which computes to the identity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CssTransform {
    elements: Vec<CssTransformElement>,
}

impl CssTransform {
    pub fn elements(&self) -> &[CssTransformElement] {
        &self.elements
    }

    /// Appends a matrix, merging with a trailing matrix element.
    fn add_transform(&mut self, transform: Transform) {
        if let Some(CssTransformElement::Simple(existing)) = self.elements.last_mut() {
            *existing = transform.post_transform(existing);
            return;
        }

        self.elements.push(CssTransformElement::Simple(transform));
    }

    fn add_translate(&mut self, x: Length, y: Length) {
        self.elements.push(CssTransformElement::Translate(x, y));
    }

    /// Resolves deferred translations and composes the final matrix.
    pub fn compute(&self, viewport: &Rect, font_metrics: &FontMetrics) -> Transform {
        let mut result = Transform::identity();

        for element in &self.elements {
            let transform = match element {
                CssTransformElement::Simple(transform) => *transform,
                CssTransformElement::Translate(x, y) => Transform::new_translate(
                    x.to_pixels(viewport, font_metrics, Extent::X),
                    y.to_pixels(viewport, font_metrics, Extent::Y),
                ),
            };
            result = transform.post_transform(&result);
        }

        result
    }
}

/// Parses the CSS `transform` property grammar.
///
/// CSS Transforms 1: <https://www.w3.org/TR/css-transforms-1/#transform-property>
pub fn parse_css_transform(components: &[ComponentValue]) -> ParseResult<CssTransform> {
    let mut cursor = ValueCursor::new(components);

    if let Some(ComponentValue::Token(token)) = cursor.peek() {
        if let TokenKind::Ident(ident) = &token.kind {
            if ident.equals_lowercase("none") {
                cursor.next();
                cursor.expect_exhausted()?;
                return Ok(CssTransform::default());
            }
        }
    }

    let mut result = CssTransform::default();
    let mut parsed_any = false;

    loop {
        match cursor.peek() {
            None => break,
            Some(ComponentValue::Function(function)) => {
                cursor.next();
                parse_css_transform_function(&function.name, &function.values, function.offset, &mut result)?;
                parsed_any = true;
            }
            Some(other) => {
                return Err(ParseError::new(
                    "expected transform function",
                    FileOffset::Offset(other.source_offset()),
                ))
            }
        }
    }

    if !parsed_any {
        // <transform-list> = <transform-function>+
        return Err(ParseError::new(
            "expected at least one transform function",
            FileOffset::EndOfString,
        ));
    }

    Ok(result)
}

fn parse_css_transform_function(
    name: &crate::rcstring::RcString,
    arguments: &[ComponentValue],
    offset: usize,
    result: &mut CssTransform,
) -> ParseResult<()> {
    let mut args = ValueCursor::new(arguments);

    // Unlike the attribute grammar, the property grammar requires commas
    // between arguments, and function names are case-sensitive.
    match name.as_str() {
        "matrix" => {
            let mut values = [0.0; 6];
            for (i, value) in values.iter_mut().enumerate() {
                if i > 0 {
                    expect_comma(&mut args)?;
                }
                *value = args.expect_number()?;
            }
            result.add_transform(Transform::new_unchecked(
                values[0], values[1], values[2], values[3], values[4], values[5],
            ));
        }

        "translate" => {
            let x = parse_length_percentage_item(&mut args, true)?;
            let y = if try_comma(&mut args) {
                parse_length_percentage_item(&mut args, true)?
            } else {
                Length::new(0.0, LengthUnit::Px)
            };
            result.add_translate(x, y);
        }
        "translateX" => {
            let x = parse_length_percentage_item(&mut args, true)?;
            result.add_translate(x, Length::new(0.0, LengthUnit::Px));
        }
        "translateY" => {
            let y = parse_length_percentage_item(&mut args, true)?;
            result.add_translate(Length::new(0.0, LengthUnit::Px), y);
        }

        "scale" => {
            let x = args.expect_number()?;
            let y = if try_comma(&mut args) {
                args.expect_number()?
            } else {
                x
            };
            result.add_transform(Transform::new_scale(x, y));
        }
        "scaleX" => {
            let x = args.expect_number()?;
            result.add_transform(Transform::new_scale(x, 1.0));
        }
        "scaleY" => {
            let y = args.expect_number()?;
            result.add_transform(Transform::new_scale(1.0, y));
        }

        "rotate" => {
            let angle = parse_angle_item(&mut args, AngleParseOptions::AllowNumbersInDegrees)?;
            result.add_transform(Transform::new_rotate(angle));
        }

        "skew" => {
            let ax = parse_angle_item(&mut args, AngleParseOptions::AllowNumbersInDegrees)?;
            let ay = if try_comma(&mut args) {
                parse_angle_item(&mut args, AngleParseOptions::AllowNumbersInDegrees)?
            } else {
                Angle::new(0.0)
            };
            result.add_transform(Transform::new_skew(ax, ay));
        }
        "skewX" => {
            let ax = parse_angle_item(&mut args, AngleParseOptions::AllowNumbersInDegrees)?;
            result.add_transform(Transform::new_skew(ax, Angle::new(0.0)));
        }
        "skewY" => {
            let ay = parse_angle_item(&mut args, AngleParseOptions::AllowNumbersInDegrees)?;
            result.add_transform(Transform::new_skew(Angle::new(0.0), ay));
        }

        _ => {
            return Err(ParseError::new(
                "expected matrix|translate|translateX|translateY|scale|scaleX|scaleY|rotate|skew|skewX|skewY",
                FileOffset::Offset(offset),
            ))
        }
    }

    args.expect_exhausted()
}

fn try_comma(args: &mut ValueCursor<'_>) -> bool {
    match args.peek() {
        Some(ComponentValue::Token(token)) if matches!(token.kind, TokenKind::Comma) => {
            args.next();
            true
        }
        _ => false,
    }
}

fn expect_comma(args: &mut ValueCursor<'_>) -> ParseResult<()> {
    if try_comma(args) {
        Ok(())
    } else {
        Err(args.error("expected ','"))
    }
}
