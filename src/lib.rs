//! Parse CSS and SVG front-end grammars into typed, navigable data.
//!
//! This crate is the shared front end of an SVG rendering library: it turns
//! CSS3 source text (stylesheets, style attributes, selector strings,
//! presentation-attribute values) and the SVG-specific grammars (path data,
//! `transform`, `preserveAspectRatio`, `<length-percentage>`, colors) into
//! typed values, and gives the geometric path model exact operations (bounds,
//! length, hit testing, vertex iteration).  It does no rendering, layout, or
//! I/O; a host provides the element tree and consumes the parsed data.
//!
//! # Basic usage
//!
//! Parse a stylesheet and match its rules against your element tree (anything
//! implementing [`ElementLike`]):
//!
//! ```
//! use svgfront::{css, Session};
//!
//! let stylesheet = css::parse_stylesheet(
//!     "path.withColor { fill: red; stroke: blue; }",
//!     &Session::new(),
//! );
//!
//! for rule in stylesheet.rules() {
//!     // rule.selector.matches(&element) yields a match flag and the
//!     // selector's specificity; feed rule.declarations into a
//!     // PropertyRegistry at that specificity.
//!     assert_eq!(rule.declarations.len(), 2);
//! }
//! ```
//!
//! Parse path data into a spline and inspect it:
//!
//! ```
//! use svgfront::{parse_path, FillRule, Vector2};
//!
//! let parsed = parse_path("M 0 0 L 10 0 L 10 10 Z");
//! assert!(parsed.error.is_none());
//!
//! let path = parsed.path;
//! assert!(path.is_inside(Vector2::new(9.0, 8.0), FillRule::NonZero));
//! assert!(path.path_length() > 0.0);
//! ```
//!
//! # Threading
//!
//! The crate is single-threaded by design: parsed values share storage
//! through non-atomic reference counts ([`RcString`]), so values must not
//! cross threads.  Separate parsers on separate threads are fine; they share
//! no state.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(nonstandard_style, rust_2018_idioms, unused)]
#![warn(trivial_casts, trivial_numeric_casts)]

pub use crate::angle::{parse_angle, Angle, AngleParseOptions};
pub use crate::aspect_ratio::AspectRatio;
pub use crate::css::anb::{AnbParser, AnbResult, AnbValue};
pub use crate::css::color::{
    Color, ColorParseOptions, ColorParser, ColorSpaceId, ColorSpaceRegistry, ColorSpaceValue,
    Hsla, Rgba,
};
pub use crate::css::selector::{Selector, SelectorMatchResult, Specificity};
pub use crate::css::selector_parser::SelectorParser;
pub use crate::css::{FontFace, SelectorRule, Stylesheet};
pub use crate::element::{ElementLike, ElementTraversal, QualifiedName};
pub use crate::error::{FileOffset, LineColumn, ParseError, ParseResult, ParseWarning};
pub use crate::length::{Extent, FontMetrics, Length, LengthUnit};
pub use crate::paint_server::PaintServer;
pub use crate::parsers::Parse;
pub use crate::path_boolean::{segment_path_for_boolean, SegmentedPath};
pub use crate::path_builder::{FillRule, PathSpline, Vertex};
pub use crate::path_parser::{parse_path, ParsedPath};
pub use crate::properties::{
    Property, PropertyInheritOptions, PropertyRegistry, PropertyValue,
};
pub use crate::rcstring::RcString;
pub use crate::rect::Rect;
pub use crate::session::Session;
pub use crate::transform::{
    parse_css_transform, parse_svg_transform, parse_svg_transform_str, CssTransform, Transform,
};
pub use crate::vector::Vector2;

pub mod angle;
pub mod aspect_ratio;
pub mod const_map;
pub mod css;
pub mod element;
pub mod error;
pub mod length;
mod log;
pub mod paint_server;
pub mod parsers;
pub mod path_boolean;
pub mod path_builder;
pub mod path_parser;
pub mod properties;
pub mod property_defs;
pub mod rcstring;
pub mod rect;
mod session;
pub mod transform;
pub mod util;
pub mod vector;
