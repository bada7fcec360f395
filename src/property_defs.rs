//! Value types for the supported CSS properties.
//!
//! Keyword properties get their enum, `Default` (the CSS initial value), and
//! `Parse` impl from the `make_ident_property!` macro; properties with
//! richer grammars implement `Parse` by hand below.

use crate::css::component_value::ComponentValue;
use crate::css::token::TokenKind;
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::length::{parse_length_percentage_item, Length, LengthUnit};
use crate::parsers::{NumberOrPercentage, Parse, ValueCursor};
use crate::path_builder::FillRule;
use crate::rcstring::RcString;
use crate::util::clamp;

/// Generates a keyword property: the enum, its initial value, and a `Parse`
/// impl that accepts exactly one of the listed identifiers
/// (case-insensitively).
macro_rules! make_ident_property {
    ($(#[$attr:meta])*
     $name:ident,
     default: $default:ident,
     identifiers: {
         $($str:expr => $variant:ident,)+
     }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
        }

        impl Default for $name {
            fn default() -> $name {
                $name::$default
            }
        }

        impl Parse for $name {
            fn parse(components: &[ComponentValue]) -> ParseResult<$name> {
                let mut cursor = ValueCursor::new(components);
                let token = cursor.next_token()?;
                let result = match token.as_ident() {
                    $(Some(ident) if ident.equals_ignore_case($str) => $name::$variant,)+
                    _ => {
                        return Err(ParseError::new(
                            "unexpected value",
                            FileOffset::Offset(token.offset),
                        ))
                    }
                };
                cursor.expect_exhausted()?;
                Ok(result)
            }
        }
    };
}

make_ident_property!(
    /// `display`, with the CSS 2 keyword set.  Everything except `none`
    /// renders; the distinctions matter only to layout engines.
    Display,
    default: Inline,
    identifiers: {
        "inline" => Inline,
        "block" => Block,
        "list-item" => ListItem,
        "inline-block" => InlineBlock,
        "table" => Table,
        "table-row-group" => TableRowGroup,
        "table-header-group" => TableHeaderGroup,
        "table-footer-group" => TableFooterGroup,
        "table-row" => TableRow,
        "table-column-group" => TableColumnGroup,
        "table-column" => TableColumn,
        "table-cell" => TableCell,
        "table-caption" => TableCaption,
        "none" => None,
    }
);

make_ident_property!(
    /// `visibility`
    Visibility,
    default: Visible,
    identifiers: {
        "visible" => Visible,
        "hidden" => Hidden,
        "collapse" => Collapse,
    }
);

make_ident_property!(
    /// `overflow`
    Overflow,
    default: Visible,
    identifiers: {
        "visible" => Visible,
        "hidden" => Hidden,
        "scroll" => Scroll,
        "auto" => Auto,
    }
);

make_ident_property!(
    /// `stroke-linecap`
    StrokeLinecap,
    default: Butt,
    identifiers: {
        "butt" => Butt,
        "round" => Round,
        "square" => Square,
    }
);

make_ident_property!(
    /// `stroke-linejoin`
    StrokeLinejoin,
    default: Miter,
    identifiers: {
        "miter" => Miter,
        "round" => Round,
        "bevel" => Bevel,
    }
);

make_ident_property!(
    /// `pointer-events`
    PointerEvents,
    default: VisiblePainted,
    identifiers: {
        "none" => None,
        "bounding-box" => BoundingBox,
        "visiblePainted" => VisiblePainted,
        "visibleFill" => VisibleFill,
        "visibleStroke" => VisibleStroke,
        "visible" => Visible,
        "painted" => Painted,
        "fill" => Fill,
        "stroke" => Stroke,
        "all" => All,
    }
);

// fill-rule and clip-rule share the geometry module's FillRule.
impl Parse for FillRule {
    fn parse(components: &[ComponentValue]) -> ParseResult<FillRule> {
        let mut cursor = ValueCursor::new(components);
        let token = cursor.next_token()?;
        let result = match token.as_ident() {
            Some(ident) if ident.equals_ignore_case("nonzero") => FillRule::NonZero,
            Some(ident) if ident.equals_ignore_case("evenodd") => FillRule::EvenOdd,
            _ => {
                return Err(ParseError::new(
                    "unexpected value",
                    FileOffset::Offset(token.offset),
                ))
            }
        };
        cursor.expect_exhausted()?;
        Ok(result)
    }
}

/// An opacity in `[0, 1]`, from a number or percentage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Opacity(pub f64);

impl Default for Opacity {
    fn default() -> Opacity {
        Opacity(1.0)
    }
}

impl Parse for Opacity {
    fn parse(components: &[ComponentValue]) -> ParseResult<Opacity> {
        let NumberOrPercentage { value } = NumberOrPercentage::parse(components)?;
        Ok(Opacity(clamp(value, 0.0, 1.0)))
    }
}

/// `font-family`: an ordered list of family names.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FontFamily(pub Vec<RcString>);

impl Parse for FontFamily {
    fn parse(components: &[ComponentValue]) -> ParseResult<FontFamily> {
        let mut families = Vec::new();

        for entry in components.split(|v| {
            matches!(v, ComponentValue::Token(t) if matches!(t.kind, TokenKind::Comma))
        }) {
            let mut idents: Vec<&str> = Vec::new();
            let mut string: Option<RcString> = None;

            for value in entry {
                match value {
                    ComponentValue::Token(token) => match &token.kind {
                        TokenKind::Whitespace(_) => (),
                        TokenKind::String(s) if idents.is_empty() && string.is_none() => {
                            string = Some(s.clone());
                        }
                        TokenKind::Ident(ident) if string.is_none() => {
                            idents.push(ident.as_str());
                        }
                        _ => {
                            return Err(ParseError::new(
                                "unexpected value in font family",
                                FileOffset::Offset(token.offset),
                            ))
                        }
                    },
                    other => {
                        return Err(ParseError::new(
                            "unexpected value in font family",
                            FileOffset::Offset(other.source_offset()),
                        ))
                    }
                }
            }

            if let Some(string) = string {
                families.push(string);
            } else if !idents.is_empty() {
                families.push(RcString::from(idents.join(" ")));
            } else {
                return Err(ParseError::new(
                    "empty font family entry",
                    FileOffset::EndOfString,
                ));
            }
        }

        Ok(FontFamily(families))
    }
}

/// `stroke-miterlimit`: a number, at least 1.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokeMiterlimit(pub f64);

impl Default for StrokeMiterlimit {
    fn default() -> StrokeMiterlimit {
        StrokeMiterlimit(4.0)
    }
}

impl Parse for StrokeMiterlimit {
    fn parse(components: &[ComponentValue]) -> ParseResult<StrokeMiterlimit> {
        let mut cursor = ValueCursor::new(components);
        let value = cursor.expect_number()?;
        cursor.expect_exhausted()?;

        if value >= 1.0 {
            Ok(StrokeMiterlimit(value))
        } else {
            Err(ParseError::new(
                "stroke-miterlimit must be at least 1",
                FileOffset::EndOfString,
            ))
        }
    }
}

/// `stroke-dasharray`: `none` or a list of non-negative lengths.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum StrokeDasharray {
    #[default]
    None,
    Dashes(Vec<Length>),
}

impl StrokeDasharray {
    /// The dash grammar allows commas or whitespace between entries.
    pub fn parse_with_units(
        components: &[ComponentValue],
        allow_user_units: bool,
    ) -> ParseResult<StrokeDasharray> {
        let mut cursor = ValueCursor::new(components);

        if let Some(ident) = cursor.peek().and_then(|c| c.as_ident()) {
            if ident.equals_lowercase("none") {
                cursor.next();
                cursor.expect_exhausted()?;
                return Ok(StrokeDasharray::None);
            }
        }

        let mut dashes = Vec::new();
        loop {
            let length = parse_length_percentage_item(&mut cursor, allow_user_units)?;
            if length.value < 0.0 {
                return Err(ParseError::new(
                    "dash lengths must be non-negative",
                    FileOffset::EndOfString,
                ));
            }
            dashes.push(length);

            if cursor.peek().is_none() {
                break;
            }
            cursor.optional_comma();
        }

        Ok(StrokeDasharray::Dashes(dashes))
    }
}

impl Parse for StrokeDasharray {
    fn parse(components: &[ComponentValue]) -> ParseResult<StrokeDasharray> {
        StrokeDasharray::parse_with_units(components, false)
    }
}

/// Reference-valued properties: `clip-path`, `mask`, `marker-*`.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Iri {
    #[default]
    None,
    Reference(RcString),
}

impl Parse for Iri {
    fn parse(components: &[ComponentValue]) -> ParseResult<Iri> {
        let mut cursor = ValueCursor::new(components);
        let token = cursor.next_token()?;

        let result = match &token.kind {
            TokenKind::Ident(ident) if ident.equals_lowercase("none") => Iri::None,
            TokenKind::Url(url) => Iri::Reference(url.clone()),
            _ => {
                return Err(ParseError::new(
                    "expected 'none' or url()",
                    FileOffset::Offset(token.offset),
                ))
            }
        };
        cursor.expect_exhausted()?;
        Ok(result)
    }
}

/// `filter`: only `none`, `url(...)`, and `blur(<length>)` are understood;
/// other filter functions are parse errors until they are listed.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum FilterValue {
    #[default]
    None,
    Reference(RcString),
    Blur(Length),
}

impl Parse for FilterValue {
    fn parse(components: &[ComponentValue]) -> ParseResult<FilterValue> {
        let mut cursor = ValueCursor::new(components);

        let result = match cursor.next() {
            Some(ComponentValue::Token(token)) => match &token.kind {
                TokenKind::Ident(ident) if ident.equals_lowercase("none") => FilterValue::None,
                TokenKind::Url(url) => FilterValue::Reference(url.clone()),
                _ => {
                    return Err(ParseError::new(
                        "unsupported filter value",
                        FileOffset::Offset(token.offset),
                    ))
                }
            },

            Some(ComponentValue::Function(function)) => {
                if function.name.equals_lowercase("blur") {
                    let length =
                        crate::length::parse_length_percentage(&function.values, false)?;
                    FilterValue::Blur(length)
                } else {
                    return Err(ParseError::new(
                        "unsupported filter function",
                        FileOffset::Offset(function.offset),
                    ));
                }
            }

            Some(other) => {
                return Err(ParseError::new(
                    "unsupported filter value",
                    FileOffset::Offset(other.source_offset()),
                ))
            }
            None => {
                return Err(ParseError::new(
                    "expected filter value",
                    FileOffset::EndOfString,
                ))
            }
        };

        cursor.expect_exhausted()?;
        Ok(result)
    }
}

/// `transform-origin`: two lengths/percentages, with keyword positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOrigin {
    pub x: Length,
    pub y: Length,
}

impl Default for TransformOrigin {
    fn default() -> TransformOrigin {
        TransformOrigin {
            x: Length::new(0.0, LengthUnit::Px),
            y: Length::new(0.0, LengthUnit::Px),
        }
    }
}

impl TransformOrigin {
    fn keyword_to_length(ident: &RcString, horizontal: bool) -> Option<Length> {
        if ident.equals_lowercase("center") {
            Some(Length::new(50.0, LengthUnit::Percent))
        } else if horizontal && ident.equals_lowercase("left") {
            Some(Length::new(0.0, LengthUnit::Percent))
        } else if horizontal && ident.equals_lowercase("right") {
            Some(Length::new(100.0, LengthUnit::Percent))
        } else if !horizontal && ident.equals_lowercase("top") {
            Some(Length::new(0.0, LengthUnit::Percent))
        } else if !horizontal && ident.equals_lowercase("bottom") {
            Some(Length::new(100.0, LengthUnit::Percent))
        } else {
            None
        }
    }

    fn component(
        cursor: &mut ValueCursor<'_>,
        horizontal: bool,
        allow_user_units: bool,
    ) -> ParseResult<Length> {
        if let Some(ident) = cursor.peek().and_then(|c| c.as_ident()) {
            if let Some(length) = TransformOrigin::keyword_to_length(ident, horizontal) {
                cursor.next();
                return Ok(length);
            }
        }

        parse_length_percentage_item(cursor, allow_user_units)
    }

    pub fn parse_with_units(
        components: &[ComponentValue],
        allow_user_units: bool,
    ) -> ParseResult<TransformOrigin> {
        let mut cursor = ValueCursor::new(components);

        let x = TransformOrigin::component(&mut cursor, true, allow_user_units)?;
        let y = if cursor.peek().is_some() {
            TransformOrigin::component(&mut cursor, false, allow_user_units)?
        } else {
            Length::new(50.0, LengthUnit::Percent)
        };

        cursor.expect_exhausted()?;
        Ok(TransformOrigin { x, y })
    }
}

impl Parse for TransformOrigin {
    fn parse(components: &[ComponentValue]) -> ParseResult<TransformOrigin> {
        TransformOrigin::parse_with_units(components, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_properties() {
        assert_eq!(Display::parse_str("none").unwrap(), Display::None);
        assert_eq!(Display::parse_str("inline").unwrap(), Display::Inline);
        assert_eq!(Display::parse_str("table-row").unwrap(), Display::TableRow);
        assert!(Display::parse_str("invisible").is_err());
        assert!(Display::parse_str("none none").is_err());

        assert_eq!(
            Visibility::parse_str("hidden").unwrap(),
            Visibility::Hidden
        );
        assert_eq!(Overflow::parse_str("auto").unwrap(), Overflow::Auto);
        assert_eq!(
            StrokeLinecap::parse_str("round").unwrap(),
            StrokeLinecap::Round
        );
        assert_eq!(
            StrokeLinejoin::parse_str("bevel").unwrap(),
            StrokeLinejoin::Bevel
        );
        assert_eq!(
            PointerEvents::parse_str("visiblePainted").unwrap(),
            PointerEvents::VisiblePainted
        );
    }

    #[test]
    fn defaults_are_css_initial_values() {
        assert_eq!(Display::default(), Display::Inline);
        assert_eq!(Visibility::default(), Visibility::Visible);
        assert_eq!(Opacity::default(), Opacity(1.0));
        assert_eq!(StrokeMiterlimit::default(), StrokeMiterlimit(4.0));
        assert_eq!(StrokeDasharray::default(), StrokeDasharray::None);
        assert_eq!(Iri::default(), Iri::None);
    }

    #[test]
    fn fill_rule() {
        assert_eq!(FillRule::parse_str("nonzero").unwrap(), FillRule::NonZero);
        assert_eq!(FillRule::parse_str("evenodd").unwrap(), FillRule::EvenOdd);
        assert!(FillRule::parse_str("both").is_err());
    }

    #[test]
    fn opacity_clamps() {
        assert_eq!(Opacity::parse_str("0.5").unwrap(), Opacity(0.5));
        assert_eq!(Opacity::parse_str("50%").unwrap(), Opacity(0.5));
        assert_eq!(Opacity::parse_str("1.5").unwrap(), Opacity(1.0));
        assert_eq!(Opacity::parse_str("-1").unwrap(), Opacity(0.0));
        assert!(Opacity::parse_str("fifty").is_err());
    }

    #[test]
    fn font_families() {
        assert_eq!(
            FontFamily::parse_str("sans-serif").unwrap(),
            FontFamily(vec![RcString::from("sans-serif")])
        );
        assert_eq!(
            FontFamily::parse_str("\"Noto Sans\", Arial Narrow, serif").unwrap(),
            FontFamily(vec![
                RcString::from("Noto Sans"),
                RcString::from("Arial Narrow"),
                RcString::from("serif")
            ])
        );
        assert!(FontFamily::parse_str("12").is_err());
        assert!(FontFamily::parse_str("serif,").is_err());
    }

    #[test]
    fn miterlimit_range() {
        assert_eq!(
            StrokeMiterlimit::parse_str("10").unwrap(),
            StrokeMiterlimit(10.0)
        );
        assert!(StrokeMiterlimit::parse_str("0.5").is_err());
        assert!(StrokeMiterlimit::parse_str("-1").is_err());
    }

    #[test]
    fn dasharrays() {
        assert_eq!(
            StrokeDasharray::parse_str("none").unwrap(),
            StrokeDasharray::None
        );

        let dashes = StrokeDasharray::parse_with_units(&crate::css::parse_value("1 2.5 3"), true)
            .unwrap();
        assert_eq!(
            dashes,
            StrokeDasharray::Dashes(vec![
                Length::new(1.0, LengthUnit::Px),
                Length::new(2.5, LengthUnit::Px),
                Length::new(3.0, LengthUnit::Px),
            ])
        );

        let dashes =
            StrokeDasharray::parse_str("1em, 20%").unwrap();
        assert_eq!(
            dashes,
            StrokeDasharray::Dashes(vec![
                Length::new(1.0, LengthUnit::Em),
                Length::new(20.0, LengthUnit::Percent),
            ])
        );

        assert!(StrokeDasharray::parse_with_units(&crate::css::parse_value("1 -2"), true).is_err());
        // Bare numbers require user units.
        assert!(StrokeDasharray::parse_str("1 2").is_err());
    }

    #[test]
    fn iris() {
        assert_eq!(Iri::parse_str("none").unwrap(), Iri::None);
        assert_eq!(
            Iri::parse_str("url(#clip)").unwrap(),
            Iri::Reference(RcString::from("#clip"))
        );
        assert!(Iri::parse_str("circle()").is_err());
    }

    #[test]
    fn filters() {
        assert_eq!(FilterValue::parse_str("none").unwrap(), FilterValue::None);
        assert_eq!(
            FilterValue::parse_str("url(#blurry)").unwrap(),
            FilterValue::Reference(RcString::from("#blurry"))
        );
        assert_eq!(
            FilterValue::parse_str("blur(5px)").unwrap(),
            FilterValue::Blur(Length::new(5.0, LengthUnit::Px))
        );

        assert!(FilterValue::parse_str("grayscale(1)").is_err());
        assert!(FilterValue::parse_str("blur(5px) blur(2px)").is_err());
    }

    #[test]
    fn transform_origins() {
        assert_eq!(
            TransformOrigin::parse_str("10px 20px").unwrap(),
            TransformOrigin {
                x: Length::new(10.0, LengthUnit::Px),
                y: Length::new(20.0, LengthUnit::Px),
            }
        );
        assert_eq!(
            TransformOrigin::parse_str("left top").unwrap(),
            TransformOrigin {
                x: Length::new(0.0, LengthUnit::Percent),
                y: Length::new(0.0, LengthUnit::Percent),
            }
        );
        assert_eq!(
            TransformOrigin::parse_str("center").unwrap(),
            TransformOrigin {
                x: Length::new(50.0, LengthUnit::Percent),
                y: Length::new(50.0, LengthUnit::Percent),
            }
        );
        assert!(TransformOrigin::parse_str("top left top").is_err());
    }
}
