//! SVG paint servers: the values of `fill` and `stroke`.

use crate::css::color::{Color, ColorParseOptions, ColorParser};
use crate::css::component_value::{trim_whitespace, ComponentValue};
use crate::css::token::TokenKind;
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::parsers::Parse;
use crate::rcstring::RcString;

/// A paint, per <https://www.w3.org/TR/SVG2/painting.html#SpecifyingPaint>.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintServer {
    None,
    /// `context-fill`: use the fill of the context element.
    ContextFill,
    /// `context-stroke`: use the stroke of the context element.
    ContextStroke,
    /// A plain color.
    Solid(Color),
    /// `url(#gradient) [fallback]`: a reference to a paint server element,
    /// with an optional fallback color used when the reference is broken.
    ElementReference {
        href: RcString,
        fallback: Option<Color>,
    },
}

impl Parse for PaintServer {
    fn parse(components: &[ComponentValue]) -> ParseResult<PaintServer> {
        let components = trim_whitespace(components);

        let Some(first) = components.first() else {
            return Err(ParseError::new(
                "expected paint value",
                FileOffset::EndOfString,
            ));
        };

        if let Some(ident) = first.as_ident() {
            if ident.equals_lowercase("none") && components.len() == 1 {
                return Ok(PaintServer::None);
            } else if ident.equals_lowercase("context-fill") && components.len() == 1 {
                return Ok(PaintServer::ContextFill);
            } else if ident.equals_lowercase("context-stroke") && components.len() == 1 {
                return Ok(PaintServer::ContextStroke);
            }
        }

        if let ComponentValue::Token(token) = first {
            if let TokenKind::Url(url) = &token.kind {
                let rest = trim_whitespace(&components[1..]);

                let fallback = if rest.is_empty() {
                    None
                } else if rest.len() == 1 && rest[0].as_ident().map_or(false, |i| i.equals_lowercase("none"))
                {
                    None
                } else {
                    Some(ColorParser::parse(rest, &ColorParseOptions::default())?)
                };

                return Ok(PaintServer::ElementReference {
                    href: url.clone(),
                    fallback,
                });
            }
        }

        ColorParser::parse(components, &ColorParseOptions::default()).map(PaintServer::Solid)
    }
}
