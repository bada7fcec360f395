//! CSS parsing and matching.
//!
//! # Terminology
//!
//! Consider a stylesheet like this:
//!
//! ```css
//! @font-face { font-family: Body; src: url("body.woff2"); }
//!
//! path.withColor {
//!         fill: red;
//!         stroke: green;
//! }
//! ```
//!
//! The example has two **rules**: an **at-rule** and a **qualified rule**.
//! Each rule has a **prelude** (the part before the block or semicolon) and
//! possibly a brace-enclosed **block**.  The prelude of a qualified rule is a
//! **selector list**; the block is a **declaration list** of
//! `property: value` pairs.
//!
//! The submodules layer the work: [`tokenizer`] turns text into tokens,
//! [`component_value`] groups them into nestable values, [`rule`] and
//! [`declaration`] assemble rules and declarations, [`selector_parser`]
//! parses selector lists into the [`selector`] model, which matches against
//! host trees, and [`color`] and [`anb`] parse the value microsyntaxes.
//!
//! The functions in this module are the top-level entry points.

pub mod anb;
pub mod color;
pub mod component_value;
pub mod declaration;
pub mod rule;
pub mod selector;
pub mod selector_parser;
pub mod token;
pub mod tokenizer;

use crate::css::component_value::{
    parse_list_of_component_values, ComponentValue, Function, WhitespaceHandling,
};
use crate::css::declaration::{Declaration, DeclarationListParser};
use crate::css::rule::{Rule, RuleParser};
use crate::css::selector::Selector;
use crate::css::selector_parser::SelectorParser;
use crate::css::token::TokenKind;
use crate::error::{FileOffset, ParseResult, ParseWarning};
use crate::rcstring::RcString;
use crate::session::Session;
use crate::svgfront_log;

/// A qualified rule whose prelude parsed as a valid selector list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorRule {
    pub selector: Selector,
    pub declarations: Vec<Declaration>,
}

/// Where a font in `src:` comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FontFaceSourceKind {
    /// A system font by name, `local(...)`.
    Local,
    /// A URL or file path, `url(...)`.
    Url,
    /// An inline `data:` URL.  The payload is kept verbatim; this crate does
    /// not decode or fetch anything.
    Data,
}

/// One entry of an `@font-face` rule's `src:` list.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFaceSource {
    pub kind: FontFaceSourceKind,
    pub payload: RcString,
    /// `format("woff2")` hint, if present.
    pub format_hint: RcString,
    /// `tech(...)` hints, if present.
    pub tech_hints: Vec<RcString>,
}

/// In-memory form of one `@font-face` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    pub family_name: RcString,
    pub sources: Vec<FontFaceSource>,
}

/// A parsed stylesheet: selector rules plus collected `@font-face` rules.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Stylesheet {
    rules: Vec<SelectorRule>,
    font_faces: Vec<FontFace>,
}

impl Stylesheet {
    pub fn rules(&self) -> &[SelectorRule] {
        &self.rules
    }

    pub fn font_faces(&self) -> &[FontFace] {
        &self.font_faces
    }
}

/// Parses a stylesheet.  Rules that fail to parse are dropped (and logged);
/// the rest of the stylesheet is unaffected.
pub fn parse_stylesheet(input: &str, session: &Session) -> Stylesheet {
    let mut warnings = Vec::new();
    parse_stylesheet_with_warnings(input, session, &mut warnings)
}

/// Like [`parse_stylesheet`], but reports dropped constructs through the
/// `warnings` collector.
pub fn parse_stylesheet_with_warnings(
    input: &str,
    session: &Session,
    warnings: &mut Vec<ParseWarning>,
) -> Stylesheet {
    let mut stylesheet = Stylesheet::default();

    for rule in RuleParser::parse_stylesheet(input) {
        match rule {
            Rule::Qualified(rule) => {
                let selector = match SelectorParser::parse_components(&rule.prelude) {
                    Ok(selector) => selector,
                    Err(e) => {
                        svgfront_log!(session, "Invalid selector; ignoring rule: {}", e);
                        warnings.push(ParseWarning::new(e.reason, e.location));
                        continue;
                    }
                };

                if !selector.is_valid() {
                    let offset = rule
                        .prelude
                        .first()
                        .map(|c| FileOffset::Offset(c.source_offset()))
                        .unwrap_or(FileOffset::EndOfString);
                    svgfront_log!(session, "Unsupported selector; ignoring rule");
                    warnings.push(ParseWarning::new("Unsupported selector", offset));
                    continue;
                }

                let declarations =
                    DeclarationListParser::parse_declarations_only(&rule.block.values);

                stylesheet.rules.push(SelectorRule {
                    selector,
                    declarations,
                });
            }

            Rule::At(rule) => {
                if rule.name.equals_lowercase("font-face") {
                    if let Some(font_face) = parse_font_face(&rule.block) {
                        stylesheet.font_faces.push(font_face);
                    }
                } else {
                    svgfront_log!(session, "Ignoring @{} rule", rule.name);
                }
            }

            Rule::Invalid(_) => {
                svgfront_log!(session, "Invalid rule; ignoring");
                warnings.push(ParseWarning::new("Invalid rule", FileOffset::EndOfString));
            }
        }
    }

    stylesheet
}

/// Parses a `style=""` attribute into its declarations.
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    let components = parse_list_of_component_values(input, WhitespaceHandling::Keep);
    DeclarationListParser::parse_declarations_only(&components)
}

/// Strictly parses a selector string, for `querySelector`-style APIs.
pub fn parse_selector(input: &str) -> ParseResult<Selector> {
    SelectorParser::parse(input)
}

/// Parses a presentation-attribute value string into component values,
/// trimming surrounding whitespace.
pub fn parse_value(input: &str) -> Vec<ComponentValue> {
    parse_list_of_component_values(input, WhitespaceHandling::TrimLeadingAndTrailing)
}

fn parse_font_face(block: &Option<crate::css::component_value::SimpleBlock>) -> Option<FontFace> {
    let block = block.as_ref()?;

    let mut family_name: Option<RcString> = None;
    let mut sources = Vec::new();

    for declaration in DeclarationListParser::parse_declarations_only(&block.values) {
        if declaration.name.equals_lowercase("font-family") {
            family_name = font_family_name(&declaration.values);
        } else if declaration.name.equals_lowercase("src") {
            sources = parse_font_face_sources(&declaration.values);
        }
    }

    Some(FontFace {
        family_name: family_name?,
        sources,
    })
}

/// The family is either a quoted string or a run of idents.
fn font_family_name(values: &[ComponentValue]) -> Option<RcString> {
    let mut idents: Vec<&str> = Vec::new();

    for value in values {
        match value {
            ComponentValue::Token(token) => match &token.kind {
                TokenKind::String(s) => return Some(s.clone()),
                TokenKind::Ident(ident) => idents.push(ident.as_str()),
                TokenKind::Whitespace(_) => (),
                _ => return None,
            },
            _ => return None,
        }
    }

    if idents.is_empty() {
        None
    } else {
        Some(RcString::from(idents.join(" ")))
    }
}

fn parse_font_face_sources(values: &[ComponentValue]) -> Vec<FontFaceSource> {
    let mut sources = Vec::new();

    for entry in values.split(|v| {
        matches!(
            v,
            ComponentValue::Token(t) if matches!(t.kind, TokenKind::Comma)
        )
    }) {
        if let Some(source) = parse_font_face_source(entry) {
            sources.push(source);
        }
    }

    sources
}

fn parse_font_face_source(entry: &[ComponentValue]) -> Option<FontFaceSource> {
    let mut source: Option<FontFaceSource> = None;

    for value in entry {
        match value {
            ComponentValue::Token(token) => match &token.kind {
                TokenKind::Whitespace(_) => (),
                TokenKind::Url(url) => {
                    source = Some(url_source(url.clone()));
                }
                _ => return None,
            },

            ComponentValue::Function(function) => {
                if function.name.equals_lowercase("url") {
                    let payload = function_string_argument(function)?;
                    source = Some(url_source(payload));
                } else if function.name.equals_lowercase("local") {
                    let payload = function_string_argument(function)?;
                    source = Some(FontFaceSource {
                        kind: FontFaceSourceKind::Local,
                        payload,
                        format_hint: RcString::new(),
                        tech_hints: Vec::new(),
                    });
                } else if function.name.equals_lowercase("format") {
                    if let Some(existing) = source.as_mut() {
                        existing.format_hint = function_string_argument(function)?;
                    }
                } else if function.name.equals_lowercase("tech") {
                    if let Some(existing) = source.as_mut() {
                        existing.tech_hints = function_ident_arguments(function);
                    }
                } else {
                    return None;
                }
            }

            ComponentValue::Block(_) => return None,
        }
    }

    source
}

fn url_source(payload: RcString) -> FontFaceSource {
    let kind = if payload.starts_with("data:") {
        FontFaceSourceKind::Data
    } else {
        FontFaceSourceKind::Url
    };

    FontFaceSource {
        kind,
        payload,
        format_hint: RcString::new(),
        tech_hints: Vec::new(),
    }
}

/// The single string (or ident run) argument of `url()`, `local()`,
/// `format()`.
fn function_string_argument(function: &Function) -> Option<RcString> {
    let mut result: Option<RcString> = None;

    for value in &function.values {
        match value {
            ComponentValue::Token(token) => match &token.kind {
                TokenKind::Whitespace(_) => (),
                TokenKind::String(s) | TokenKind::Ident(s) => {
                    if result.is_some() {
                        return None;
                    }
                    result = Some(s.clone());
                }
                _ => return None,
            },
            _ => return None,
        }
    }

    result
}

fn function_ident_arguments(function: &Function) -> Vec<RcString> {
    function
        .values
        .iter()
        .filter_map(|v| v.as_ident().cloned())
        .collect()
}
