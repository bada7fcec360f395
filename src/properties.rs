//! CSS properties: per-property parsing, the property registry, and the
//! cascade.
//!
//! [`PropertyRegistry`] holds one [`Property`] slot per supported property.
//! Declarations are dispatched through a compile-time perfect-hash table of
//! parse functions; each parse records the declaration's specificity, and a
//! slot only accepts a new value at equal or higher specificity, so feeding
//! matched declarations in document order implements the cascade.
//!
//! Presentation attributes go through the same parse functions with the
//! `allow_user_units` flag set, which relaxes `<length>` to
//! `<length> | <number>` per SVG 2.

use std::collections::HashMap;

use crate::const_map::ConstMap;
use crate::css::color::{Color, ColorParseOptions, ColorParser};
use crate::css::component_value::{trim_whitespace, ComponentValue};
use crate::css::declaration::Declaration;
use crate::css::parse_value;
use crate::css::selector::Specificity;
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::length::{parse_length_percentage, Length, LengthUnit};
use crate::paint_server::PaintServer;
use crate::parsers::Parse;
use crate::path_builder::FillRule;
use crate::property_defs::{
    Display, FilterValue, FontFamily, Iri, Opacity, Overflow, PointerEvents, StrokeDasharray,
    StrokeLinecap, StrokeLinejoin, StrokeMiterlimit, TransformOrigin, Visibility,
};
use crate::rcstring::RcString;

/// The state of one property slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue<T> {
    /// Nothing set this property.
    NotSet,
    Set(T),
    /// Explicit `inherit`.
    Inherit,
    /// Explicit `initial`.
    Initial,
    /// Explicit `unset`.
    Unset,
}

/// Whether a property inherits from the parent element by default.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Inherits {
    Yes,
    No,
}

/// Scope of an [`PropertyRegistry::inherit_from`] pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PropertyInheritOptions {
    /// Automatically-inheriting properties pull from the parent.
    All,
    /// Only explicit `inherit` values pull from the parent.
    ExplicitlySetOnly,
}

/// One property slot: its state, the specificity that set it, where it was
/// set, and the property's initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property<T: Clone> {
    pub value: PropertyValue<T>,
    pub specificity: Specificity,
    pub source_offset: FileOffset,
    initial: T,
}

impl<T: Clone> Property<T> {
    pub fn new(initial: T) -> Property<T> {
        Property {
            value: PropertyValue::NotSet,
            specificity: Specificity::user_agent(),
            source_offset: FileOffset::EndOfString,
            initial,
        }
    }

    pub fn has_value(&self) -> bool {
        !matches!(self.value, PropertyValue::NotSet)
    }

    /// The set value, if the state is `Set`.
    pub fn get(&self) -> Option<&T> {
        match &self.value {
            PropertyValue::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Resolves to a concrete value: the set value, or the property's
    /// initial.  Run the cascade first so `inherit` has been replaced.
    pub fn resolve(&self) -> T {
        match &self.value {
            PropertyValue::Set(value) => value.clone(),
            _ => self.initial.clone(),
        }
    }

    fn set(&mut self, value: PropertyValue<T>, specificity: Specificity, offset: FileOffset) {
        self.value = value;
        self.specificity = specificity;
        self.source_offset = offset;
    }

    /// Merges with the parent's slot per the CSS cascade: an explicit
    /// `inherit` always pulls the parent; otherwise a value set here wins,
    /// and an empty slot pulls the parent only for inheriting properties
    /// when the pass asks for automatic inheritance.
    pub fn inherit_from(
        &self,
        parent: &Property<T>,
        inherits: Inherits,
        options: PropertyInheritOptions,
    ) -> Property<T> {
        match &self.value {
            PropertyValue::Inherit => {
                let mut result = self.clone();
                result.value = PropertyValue::Set(parent.resolve());
                result
            }

            PropertyValue::Set(_) | PropertyValue::Initial => self.clone(),

            PropertyValue::NotSet | PropertyValue::Unset => {
                if inherits == Inherits::Yes
                    && options == PropertyInheritOptions::All
                    && parent.has_value()
                {
                    let mut result = self.clone();
                    result.value = PropertyValue::Set(parent.resolve());
                    result
                } else {
                    self.clone()
                }
            }
        }
    }
}

/// A declaration kept verbatim because its property has no parser yet.
/// These are carried per element and are not inherited.
#[derive(Debug, Clone, PartialEq)]
pub struct UnparsedProperty {
    pub declaration: Declaration,
    pub specificity: Specificity,
}

/// Arguments handed to the per-property parse functions.
pub struct PropertyParseParams<'a> {
    pub components: &'a [ComponentValue],
    pub specificity: Specificity,
    pub source_offset: FileOffset,
    /// Presentation-attribute context: bare numbers are user units.
    pub allow_user_units: bool,
}

/// Runs `inner` and stores its value into `slot`, handling the CSS-wide
/// keywords and the specificity comparison.  Lower-specificity declarations
/// are ignored without error.
fn parse_into<T: Clone>(
    params: &PropertyParseParams<'_>,
    inner: impl FnOnce(&PropertyParseParams<'_>) -> ParseResult<T>,
    slot: &mut Property<T>,
) -> Option<ParseError> {
    if slot.has_value() && params.specificity < slot.specificity {
        return None;
    }

    // inherit | initial | unset
    let components = trim_whitespace(params.components);
    if components.len() == 1 {
        if let Some(ident) = components[0].as_ident() {
            let state = if ident.equals_lowercase("inherit") {
                Some(PropertyValue::Inherit)
            } else if ident.equals_lowercase("initial") {
                Some(PropertyValue::Initial)
            } else if ident.equals_lowercase("unset") {
                Some(PropertyValue::Unset)
            } else {
                None
            };

            if let Some(state) = state {
                slot.set(state, params.specificity, params.source_offset);
                return None;
            }
        }
    }

    match inner(params) {
        Ok(value) => {
            slot.set(
                PropertyValue::Set(value),
                params.specificity,
                params.source_offset,
            );
            None
        }
        Err(e) => Some(e),
    }
}

type PropertyParseFn =
    fn(&mut PropertyRegistry, &PropertyParseParams<'_>) -> Option<ParseError>;

macro_rules! longhand {
    ($fn_name:ident, $field:ident, $ty:ty) => {
        fn $fn_name(
            registry: &mut PropertyRegistry,
            params: &PropertyParseParams<'_>,
        ) -> Option<ParseError> {
            parse_into(params, |p| <$ty as Parse>::parse(p.components), &mut registry.$field)
        }
    };
}

longhand!(parse_font_family, font_family, FontFamily);
longhand!(parse_display, display, Display);
longhand!(parse_opacity, opacity, Opacity);
longhand!(parse_visibility, visibility, Visibility);
longhand!(parse_overflow, overflow, Overflow);
longhand!(parse_fill, fill, PaintServer);
longhand!(parse_fill_rule, fill_rule, FillRule);
longhand!(parse_fill_opacity, fill_opacity, Opacity);
longhand!(parse_stroke, stroke, PaintServer);
longhand!(parse_stroke_opacity, stroke_opacity, Opacity);
longhand!(parse_stroke_linecap, stroke_linecap, StrokeLinecap);
longhand!(parse_stroke_linejoin, stroke_linejoin, StrokeLinejoin);
longhand!(parse_stroke_miterlimit, stroke_miterlimit, StrokeMiterlimit);
longhand!(parse_clip_path, clip_path, Iri);
longhand!(parse_clip_rule, clip_rule, FillRule);
longhand!(parse_mask, mask, Iri);
longhand!(parse_filter, filter, FilterValue);
longhand!(parse_pointer_events, pointer_events, PointerEvents);
longhand!(parse_marker_start, marker_start, Iri);
longhand!(parse_marker_mid, marker_mid, Iri);
longhand!(parse_marker_end, marker_end, Iri);

fn parse_color(registry: &mut PropertyRegistry, params: &PropertyParseParams<'_>) -> Option<ParseError> {
    let error = parse_into(
        params,
        |p| ColorParser::parse(p.components, &ColorParseOptions::default()),
        &mut registry.color,
    );
    if error.is_some() {
        return error;
    }

    // From https://www.w3.org/TR/css-color-3/#currentcolor:
    // `currentColor` on the `color` property itself means `color: inherit`.
    if matches!(registry.color.get(), Some(Color::CurrentColor)) {
        let specificity = registry.color.specificity;
        let offset = registry.color.source_offset;
        registry.color.set(PropertyValue::Inherit, specificity, offset);
    }

    None
}

fn parse_font_size(registry: &mut PropertyRegistry, params: &PropertyParseParams<'_>) -> Option<ParseError> {
    parse_into(
        params,
        |p| parse_length_percentage(p.components, p.allow_user_units),
        &mut registry.font_size,
    )
}

fn parse_stroke_width(registry: &mut PropertyRegistry, params: &PropertyParseParams<'_>) -> Option<ParseError> {
    parse_into(
        params,
        |p| parse_length_percentage(p.components, p.allow_user_units),
        &mut registry.stroke_width,
    )
}

fn parse_stroke_dashoffset(
    registry: &mut PropertyRegistry,
    params: &PropertyParseParams<'_>,
) -> Option<ParseError> {
    parse_into(
        params,
        |p| parse_length_percentage(p.components, p.allow_user_units),
        &mut registry.stroke_dashoffset,
    )
}

fn parse_stroke_dasharray(
    registry: &mut PropertyRegistry,
    params: &PropertyParseParams<'_>,
) -> Option<ParseError> {
    parse_into(
        params,
        |p| StrokeDasharray::parse_with_units(p.components, p.allow_user_units),
        &mut registry.stroke_dasharray,
    )
}

fn parse_transform_origin(
    registry: &mut PropertyRegistry,
    params: &PropertyParseParams<'_>,
) -> Option<ParseError> {
    parse_into(
        params,
        |p| TransformOrigin::parse_with_units(p.components, p.allow_user_units),
        &mut registry.transform_origin,
    )
}

/// `marker` is a shorthand that assigns `marker-start`, `marker-mid`, and
/// `marker-end` together.
fn parse_marker(registry: &mut PropertyRegistry, params: &PropertyParseParams<'_>) -> Option<ParseError> {
    let value = match Iri::parse(params.components) {
        Ok(value) => Some(value),
        Err(e) => {
            // Let the CSS-wide keywords through; parse_into handles them per
            // longhand.
            let components = trim_whitespace(params.components);
            let is_wide_keyword = components.len() == 1
                && components[0].as_ident().map_or(false, |ident| {
                    ident.equals_lowercase("inherit")
                        || ident.equals_lowercase("initial")
                        || ident.equals_lowercase("unset")
                });
            if !is_wide_keyword {
                return Some(e);
            }
            None
        }
    };

    let assign = |slot: &mut Property<Iri>| -> Option<ParseError> {
        match &value {
            Some(value) => {
                let value = value.clone();
                parse_into(params, move |_| Ok(value), slot)
            }
            None => parse_into(params, |p| Iri::parse(p.components), slot),
        }
    };

    assign(&mut registry.marker_start)
        .or_else(|| assign(&mut registry.marker_mid))
        .or_else(|| assign(&mut registry.marker_end))
}

static PROPERTY_PARSERS: ConstMap<&'static str, PropertyParseFn, 28> = <ConstMap<&'static str, PropertyParseFn, 28>>::new([
    ("color", parse_color as PropertyParseFn),
    ("font-family", parse_font_family),
    ("font-size", parse_font_size),
    ("display", parse_display),
    ("opacity", parse_opacity),
    ("visibility", parse_visibility),
    ("overflow", parse_overflow),
    ("transform-origin", parse_transform_origin),
    ("fill", parse_fill),
    ("fill-rule", parse_fill_rule),
    ("fill-opacity", parse_fill_opacity),
    ("stroke", parse_stroke),
    ("stroke-opacity", parse_stroke_opacity),
    ("stroke-width", parse_stroke_width),
    ("stroke-linecap", parse_stroke_linecap),
    ("stroke-linejoin", parse_stroke_linejoin),
    ("stroke-miterlimit", parse_stroke_miterlimit),
    ("stroke-dasharray", parse_stroke_dasharray),
    ("stroke-dashoffset", parse_stroke_dashoffset),
    ("clip-path", parse_clip_path),
    ("clip-rule", parse_clip_rule),
    ("mask", parse_mask),
    ("filter", parse_filter),
    ("pointer-events", parse_pointer_events),
    ("marker-start", parse_marker_start),
    ("marker-mid", parse_marker_mid),
    ("marker-end", parse_marker_end),
    ("marker", parse_marker),
])
.expect_ok();

/// Names that are valid *presentation attributes*, per
/// <https://svgwg.org/svg2-draft/styling.html#PresentationAttributes>.
/// The value records whether the registry can parse the property; valid but
/// unparsed properties are kept verbatim in `unparsed_properties`.
static PRESENTATION_ATTRIBUTES: ConstMap<&'static str, bool, 60> = <ConstMap<&'static str, bool, 60>>::new([
    ("alignment-baseline", false),
    ("baseline-shift", false),
    ("clip-path", true),
    ("clip-rule", true),
    ("color", true),
    ("color-interpolation", false),
    ("color-interpolation-filters", false),
    ("color-rendering", false),
    ("cursor", false),
    ("direction", false),
    ("display", true),
    ("dominant-baseline", false),
    ("fill", true),
    ("fill-opacity", true),
    ("fill-rule", true),
    ("filter", true),
    ("flood-color", false),
    ("flood-opacity", false),
    ("font-family", true),
    ("font-size", true),
    ("font-size-adjust", false),
    ("font-stretch", false),
    ("font-style", false),
    ("font-variant", false),
    ("font-weight", false),
    ("glyph-orientation-horizontal", false),
    ("glyph-orientation-vertical", false),
    ("image-rendering", false),
    ("letter-spacing", false),
    ("lighting-color", false),
    ("marker-end", true),
    ("marker-mid", true),
    ("marker-start", true),
    ("mask", true),
    ("opacity", true),
    ("overflow", true),
    ("paint-order", false),
    ("pointer-events", true),
    ("shape-rendering", false),
    ("stop-color", false),
    ("stop-opacity", false),
    ("stroke", true),
    ("stroke-dasharray", true),
    ("stroke-dashoffset", true),
    ("stroke-linecap", true),
    ("stroke-linejoin", true),
    ("stroke-miterlimit", true),
    ("stroke-opacity", true),
    ("stroke-width", true),
    ("text-anchor", false),
    ("text-decoration", false),
    ("text-overflow", false),
    ("text-rendering", false),
    ("transform-origin", true),
    ("unicode-bidi", false),
    ("vector-effect", false),
    ("visibility", true),
    ("white-space", false),
    ("word-spacing", false),
    ("writing-mode", false),
])
.expect_ok();

/// The specified values of one element's properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRegistry {
    pub color: Property<Color>,
    pub font_family: Property<FontFamily>,
    pub font_size: Property<Length>,
    pub display: Property<Display>,
    pub opacity: Property<Opacity>,
    pub visibility: Property<Visibility>,
    pub overflow: Property<Overflow>,
    pub transform_origin: Property<TransformOrigin>,
    pub fill: Property<PaintServer>,
    pub fill_rule: Property<FillRule>,
    pub fill_opacity: Property<Opacity>,
    pub stroke: Property<PaintServer>,
    pub stroke_opacity: Property<Opacity>,
    pub stroke_width: Property<Length>,
    pub stroke_linecap: Property<StrokeLinecap>,
    pub stroke_linejoin: Property<StrokeLinejoin>,
    pub stroke_miterlimit: Property<StrokeMiterlimit>,
    pub stroke_dasharray: Property<StrokeDasharray>,
    pub stroke_dashoffset: Property<Length>,
    pub clip_path: Property<Iri>,
    pub clip_rule: Property<FillRule>,
    pub mask: Property<Iri>,
    pub filter: Property<FilterValue>,
    pub pointer_events: Property<PointerEvents>,
    pub marker_start: Property<Iri>,
    pub marker_mid: Property<Iri>,
    pub marker_end: Property<Iri>,

    /// Whitelisted presentation attributes without a parser, kept verbatim.
    pub unparsed_properties: HashMap<RcString, UnparsedProperty>,
}

impl Default for PropertyRegistry {
    fn default() -> PropertyRegistry {
        PropertyRegistry {
            color: Property::new(Color::Rgba(crate::css::color::Rgba::rgb(0, 0, 0))),
            font_family: Property::new(FontFamily::default()),
            font_size: Property::new(Length::new(16.0, LengthUnit::Px)),
            display: Property::new(Display::default()),
            opacity: Property::new(Opacity::default()),
            visibility: Property::new(Visibility::default()),
            overflow: Property::new(Overflow::default()),
            transform_origin: Property::new(TransformOrigin::default()),
            fill: Property::new(PaintServer::Solid(Color::Rgba(
                crate::css::color::Rgba::rgb(0, 0, 0),
            ))),
            fill_rule: Property::new(FillRule::default()),
            fill_opacity: Property::new(Opacity::default()),
            stroke: Property::new(PaintServer::None),
            stroke_opacity: Property::new(Opacity::default()),
            stroke_width: Property::new(Length::new(1.0, LengthUnit::Px)),
            stroke_linecap: Property::new(StrokeLinecap::default()),
            stroke_linejoin: Property::new(StrokeLinejoin::default()),
            stroke_miterlimit: Property::new(StrokeMiterlimit::default()),
            stroke_dasharray: Property::new(StrokeDasharray::default()),
            stroke_dashoffset: Property::new(Length::new(0.0, LengthUnit::Px)),
            clip_path: Property::new(Iri::default()),
            clip_rule: Property::new(FillRule::default()),
            mask: Property::new(Iri::default()),
            filter: Property::new(FilterValue::default()),
            pointer_events: Property::new(PointerEvents::default()),
            marker_start: Property::new(Iri::default()),
            marker_mid: Property::new(Iri::default()),
            marker_end: Property::new(Iri::default()),

            unparsed_properties: HashMap::new(),
        }
    }
}

impl PropertyRegistry {
    pub fn new() -> PropertyRegistry {
        PropertyRegistry::default()
    }

    /// Parses one declaration at the given specificity (`!important` is the
    /// caller's job to fold into the specificity).  Unknown declarations with
    /// a whitelisted name are kept verbatim; anything else is an error.
    pub fn parse_property(
        &mut self,
        declaration: &Declaration,
        specificity: Specificity,
    ) -> Option<ParseError> {
        let name = declaration.name.to_ascii_lowercase();

        if let Some(parse_fn) = PROPERTY_PARSERS.find(&name) {
            let params = PropertyParseParams {
                components: &declaration.values,
                specificity,
                source_offset: FileOffset::Offset(declaration.source_offset),
                allow_user_units: false,
            };
            return parse_fn(self, &params);
        }

        if PRESENTATION_ATTRIBUTES.contains(&name) {
            self.unparsed_properties.insert(
                declaration.name.clone(),
                UnparsedProperty {
                    declaration: declaration.clone(),
                    specificity,
                },
            );
            return None;
        }

        Some(ParseError::new(
            format!("Unknown property '{}'", declaration.name),
            FileOffset::Offset(declaration.source_offset),
        ))
    }

    /// Parses a `style=""` attribute; its declarations sit above all
    /// selector-matched ones, and `!important` above that.
    pub fn parse_style(&mut self, input: &str) {
        for declaration in crate::css::parse_style_attribute(input) {
            let specificity = if declaration.important {
                Specificity::important()
            } else {
                Specificity::style_attribute()
            };
            let _ = self.parse_property(&declaration, specificity);
        }
    }

    /// Parses a presentation attribute.  Returns `Ok(false)` when the name
    /// is not a presentation attribute at all; parse failures of valid
    /// attribute names are errors.
    ///
    /// In attribute context unitless lengths are allowed (user units).
    pub fn parse_presentation_attribute(
        &mut self,
        name: &str,
        value: &str,
    ) -> ParseResult<bool> {
        let name = name.to_ascii_lowercase();

        let Some(&has_parser) = PRESENTATION_ATTRIBUTES.find(&name) else {
            return Ok(false);
        };

        if !has_parser {
            let components = parse_value(value);
            self.unparsed_properties.insert(
                RcString::from(name.as_str()),
                UnparsedProperty {
                    declaration: Declaration {
                        name: RcString::from(name.as_str()),
                        values: components,
                        source_offset: 0,
                        important: false,
                    },
                    specificity: Specificity::from_abc(0, 0, 0),
                },
            );
            return Ok(true);
        }

        let parse_fn = PROPERTY_PARSERS
            .find(&name)
            .expect("whitelisted parseable attribute must have a parser");

        let components = parse_value(value);
        let params = PropertyParseParams {
            components: &components,
            // Presentation attributes sit at the bottom of the author level.
            specificity: Specificity::from_abc(0, 0, 0),
            source_offset: FileOffset::Offset(0),
            allow_user_units: true,
        };

        match parse_fn(self, &params) {
            None => Ok(true),
            Some(e) => Err(e),
        }
    }

    /// Produces this element's final values given the parent's: the CSS
    /// cascade's inheritance step.  Unparsed properties are not inherited.
    pub fn inherit_from(
        &self,
        parent: &PropertyRegistry,
        options: PropertyInheritOptions,
    ) -> PropertyRegistry {
        use Inherits::{No, Yes};

        PropertyRegistry {
            color: self.color.inherit_from(&parent.color, Yes, options),
            font_family: self.font_family.inherit_from(&parent.font_family, Yes, options),
            font_size: self.font_size.inherit_from(&parent.font_size, Yes, options),
            display: self.display.inherit_from(&parent.display, No, options),
            opacity: self.opacity.inherit_from(&parent.opacity, No, options),
            visibility: self.visibility.inherit_from(&parent.visibility, Yes, options),
            overflow: self.overflow.inherit_from(&parent.overflow, No, options),
            transform_origin: self
                .transform_origin
                .inherit_from(&parent.transform_origin, No, options),
            fill: self.fill.inherit_from(&parent.fill, Yes, options),
            fill_rule: self.fill_rule.inherit_from(&parent.fill_rule, Yes, options),
            fill_opacity: self
                .fill_opacity
                .inherit_from(&parent.fill_opacity, Yes, options),
            stroke: self.stroke.inherit_from(&parent.stroke, Yes, options),
            stroke_opacity: self
                .stroke_opacity
                .inherit_from(&parent.stroke_opacity, Yes, options),
            stroke_width: self
                .stroke_width
                .inherit_from(&parent.stroke_width, Yes, options),
            stroke_linecap: self
                .stroke_linecap
                .inherit_from(&parent.stroke_linecap, Yes, options),
            stroke_linejoin: self
                .stroke_linejoin
                .inherit_from(&parent.stroke_linejoin, Yes, options),
            stroke_miterlimit: self
                .stroke_miterlimit
                .inherit_from(&parent.stroke_miterlimit, Yes, options),
            stroke_dasharray: self
                .stroke_dasharray
                .inherit_from(&parent.stroke_dasharray, Yes, options),
            stroke_dashoffset: self
                .stroke_dashoffset
                .inherit_from(&parent.stroke_dashoffset, Yes, options),
            clip_path: self.clip_path.inherit_from(&parent.clip_path, No, options),
            clip_rule: self.clip_rule.inherit_from(&parent.clip_rule, Yes, options),
            mask: self.mask.inherit_from(&parent.mask, No, options),
            filter: self.filter.inherit_from(&parent.filter, No, options),
            pointer_events: self
                .pointer_events
                .inherit_from(&parent.pointer_events, Yes, options),
            marker_start: self
                .marker_start
                .inherit_from(&parent.marker_start, Yes, options),
            marker_mid: self.marker_mid.inherit_from(&parent.marker_mid, Yes, options),
            marker_end: self.marker_end.inherit_from(&parent.marker_end, Yes, options),

            // Unparsed properties stay with their element.
            unparsed_properties: self.unparsed_properties.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::color::Rgba;
    use crate::css::selector::SelectorMatchResult;
    use crate::element::test_tree::TestElement;
    use crate::element::{ElementLike, ElementTraversal, QualifiedName};
    use crate::session::Session;

    fn declaration(name: &str, value: &str) -> Declaration {
        let mut declarations = crate::css::parse_style_attribute(&format!("{name}: {value}"));
        assert_eq!(declarations.len(), 1, "bad test declaration {name}: {value}");
        declarations.remove(0)
    }

    fn abc(a: u32, b: u32, c: u32) -> Specificity {
        Specificity::from_abc(a, b, c)
    }

    #[test]
    fn parses_and_resolves_a_property() {
        let mut registry = PropertyRegistry::new();
        assert!(registry
            .parse_property(&declaration("fill", "red"), abc(0, 0, 1))
            .is_none());

        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn unset_properties_resolve_to_initial() {
        let registry = PropertyRegistry::new();
        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(0, 0, 0)))
        );
        assert_eq!(registry.stroke.resolve(), PaintServer::None);
        assert_eq!(registry.stroke_width.resolve(), Length::new(1.0, LengthUnit::Px));
    }

    #[test]
    fn higher_specificity_wins_regardless_of_order() {
        let mut registry = PropertyRegistry::new();
        registry.parse_property(&declaration("fill", "red"), abc(1, 0, 0));
        registry.parse_property(&declaration("fill", "blue"), abc(0, 0, 1));

        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn equal_specificity_follows_source_order() {
        let mut registry = PropertyRegistry::new();
        registry.parse_property(&declaration("fill", "red"), abc(0, 0, 1));
        registry.parse_property(&declaration("fill", "blue"), abc(0, 0, 1));

        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(0, 0, 255)))
        );
    }

    #[test]
    fn important_beats_style_attribute() {
        let mut registry = PropertyRegistry::new();
        registry.parse_property(&declaration("fill", "red"), Specificity::important());
        registry.parse_style("fill: blue");

        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn style_attribute_beats_selectors() {
        let mut registry = PropertyRegistry::new();
        registry.parse_style("fill: blue");
        registry.parse_property(&declaration("fill", "red"), abc(1, 1, 1));

        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(0, 0, 255)))
        );
    }

    #[test]
    fn important_in_style_attribute() {
        let mut registry = PropertyRegistry::new();
        registry.parse_style("fill: blue !important; stroke: green");

        assert_eq!(registry.fill.specificity, Specificity::important());
        assert_eq!(registry.stroke.specificity, Specificity::style_attribute());
    }

    #[test]
    fn unknown_property_is_an_error() {
        let mut registry = PropertyRegistry::new();
        let error = registry.parse_property(&declaration("zoom", "2"), abc(0, 0, 0));
        assert!(error.is_some());
    }

    #[test]
    fn bad_value_keeps_previous_value() {
        let mut registry = PropertyRegistry::new();
        registry.parse_property(&declaration("fill", "red"), abc(0, 0, 1));
        let error = registry.parse_property(&declaration("fill", "12"), abc(1, 0, 0));

        assert!(error.is_some());
        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn whitelisted_but_unparsed_declarations_are_kept() {
        let mut registry = PropertyRegistry::new();
        let error = registry.parse_property(&declaration("text-anchor", "middle"), abc(0, 0, 1));
        assert!(error.is_none());

        let unparsed = registry
            .unparsed_properties
            .get(&RcString::from("text-anchor"))
            .unwrap();
        assert_eq!(unparsed.specificity, abc(0, 0, 1));
    }

    #[test]
    fn marker_shorthand_expands() {
        let mut registry = PropertyRegistry::new();
        registry.parse_property(&declaration("marker", "url(#m)"), abc(0, 0, 1));

        let expected = Iri::Reference(RcString::from("#m"));
        assert_eq!(registry.marker_start.resolve(), expected);
        assert_eq!(registry.marker_mid.resolve(), expected);
        assert_eq!(registry.marker_end.resolve(), expected);
    }

    #[test]
    fn marker_shorthand_inherit_expands() {
        let mut parent = PropertyRegistry::new();
        parent.parse_property(&declaration("marker-mid", "url(#m)"), abc(0, 0, 1));

        let mut child = PropertyRegistry::new();
        child.parse_property(&declaration("marker", "inherit"), abc(0, 0, 1));
        assert!(matches!(child.marker_mid.value, PropertyValue::Inherit));

        let cascaded = child.inherit_from(&parent, PropertyInheritOptions::All);
        assert_eq!(
            cascaded.marker_mid.resolve(),
            Iri::Reference(RcString::from("#m"))
        );
    }

    #[test]
    fn current_color_on_color_property_becomes_inherit() {
        let mut registry = PropertyRegistry::new();
        registry.parse_property(&declaration("color", "currentColor"), abc(0, 0, 1));
        assert!(matches!(registry.color.value, PropertyValue::Inherit));

        // ...but currentColor on other color-valued properties stays.
        registry.parse_property(&declaration("fill", "currentColor"), abc(0, 0, 1));
        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::CurrentColor)
        );
    }

    #[test]
    fn presentation_attributes_allow_user_units() {
        let mut registry = PropertyRegistry::new();

        // Unitless lengths are valid in attribute form...
        assert_eq!(
            registry.parse_presentation_attribute("stroke-width", "2"),
            Ok(true)
        );
        assert_eq!(registry.stroke_width.resolve(), Length::new(2.0, LengthUnit::Px));

        // ...but not in declaration form.
        let error = registry.parse_property(&declaration("stroke-width", "3"), abc(1, 0, 0));
        assert!(error.is_some());
    }

    #[test]
    fn presentation_attributes_rank_below_selectors() {
        let mut registry = PropertyRegistry::new();
        registry.parse_presentation_attribute("fill", "green").unwrap();
        registry.parse_property(&declaration("fill", "red"), abc(0, 0, 1));

        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn unknown_attribute_names_are_not_presentation_attributes() {
        let mut registry = PropertyRegistry::new();
        assert_eq!(registry.parse_presentation_attribute("d", "M 0 0"), Ok(false));
        assert_eq!(registry.parse_presentation_attribute("x", "10"), Ok(false));
    }

    #[test]
    fn inheritance_pulls_inherited_properties_only() {
        let mut parent = PropertyRegistry::new();
        parent.parse_property(&declaration("fill", "red"), abc(0, 0, 1));
        parent.parse_property(&declaration("opacity", "0.5"), abc(0, 0, 1));

        let child = PropertyRegistry::new();
        let cascaded = child.inherit_from(&parent, PropertyInheritOptions::All);

        // fill inherits; opacity does not.
        assert_eq!(
            cascaded.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(255, 0, 0)))
        );
        assert_eq!(cascaded.opacity.resolve(), Opacity(1.0));
    }

    #[test]
    fn explicit_inherit_pulls_non_inherited_properties() {
        let mut parent = PropertyRegistry::new();
        parent.parse_property(&declaration("opacity", "0.5"), abc(0, 0, 1));

        let mut child = PropertyRegistry::new();
        child.parse_property(&declaration("opacity", "inherit"), abc(0, 0, 1));

        let cascaded = child.inherit_from(&parent, PropertyInheritOptions::All);
        assert_eq!(cascaded.opacity.resolve(), Opacity(0.5));
    }

    #[test]
    fn explicitly_set_only_skips_automatic_inheritance() {
        let mut parent = PropertyRegistry::new();
        parent.parse_property(&declaration("fill", "red"), abc(0, 0, 1));
        parent.parse_property(&declaration("opacity", "0.5"), abc(0, 0, 1));

        let mut child = PropertyRegistry::new();
        child.parse_property(&declaration("opacity", "inherit"), abc(0, 0, 1));

        let cascaded = child.inherit_from(&parent, PropertyInheritOptions::ExplicitlySetOnly);

        // Automatic inheritance is off...
        assert!(!cascaded.fill.has_value());
        // ...but explicit `inherit` still pulls.
        assert_eq!(cascaded.opacity.resolve(), Opacity(0.5));
    }

    #[test]
    fn unparsed_properties_are_not_inherited() {
        let mut parent = PropertyRegistry::new();
        parent.parse_property(&declaration("text-anchor", "middle"), abc(0, 0, 1));

        let child = PropertyRegistry::new();
        let cascaded = child.inherit_from(&parent, PropertyInheritOptions::All);
        assert!(cascaded.unparsed_properties.is_empty());
    }

    /// End-to-end: stylesheet parse, selector match, cascade.
    #[test]
    fn stylesheet_to_cascade() {
        let stylesheet = crate::css::parse_stylesheet(
            "path.withColor { fill: red !important; stroke: blue; } \
             g > :nth-child(2n of path) { fill: green; }",
            &Session::default(),
        );

        let document = TestElement::build(
            "g",
            &[],
            vec![
                TestElement::build("path", &[("id", "path1"), ("d", "M 1 1 L 4 5")], vec![]),
                TestElement::build(
                    "path",
                    &[
                        ("id", "path2"),
                        ("class", "withColor"),
                        ("d", "M 5 1 L 9 5"),
                    ],
                    vec![],
                ),
            ],
        );

        let path1 = document.first_child().unwrap();
        let path2 = document.last_child().unwrap();

        // path.withColor matches path2 with specificity (0,1,1).
        let rule0 = &stylesheet.rules()[0];
        assert!(!rule0.selector.matches(&path1).matched);
        let SelectorMatchResult {
            matched,
            specificity,
        } = rule0.selector.matches(&path2);
        assert!(matched);
        assert_eq!(specificity, abc(0, 1, 1));

        // g > :nth-child(2n of path) matches path2 (the 2nd path child) with
        // specificity (0,1,2), and not path1.
        let rule1 = &stylesheet.rules()[1];
        assert!(!rule1.selector.matches(&path1).matched);
        let result = rule1.selector.matches(&path2);
        assert!(result.matched);
        assert_eq!(result.specificity, abc(0, 1, 2));

        // Apply the matches to path2.
        let mut registry = PropertyRegistry::new();
        for rule in stylesheet.rules() {
            let result = rule.selector.matches(&path2);
            if !result.matched {
                continue;
            }
            for declaration in &rule.declarations {
                let specificity = if declaration.important {
                    Specificity::important()
                } else {
                    result.specificity
                };
                registry.parse_property(declaration, specificity);
            }
        }

        // `fill: red !important` beats `fill: green` from the later,
        // more specific rule.
        assert_eq!(
            registry.fill.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(255, 0, 0)))
        );
        assert_eq!(
            registry.stroke.resolve(),
            PaintServer::Solid(Color::Rgba(Rgba::rgb(0, 0, 255)))
        );

        // The `d` attribute on the matched elements parses into a spline.
        for element in ElementTraversal::descendants(&document) {
            let d = element
                .get_attribute(&QualifiedName::local("d"))
                .expect("both paths have d attributes");
            let parsed = crate::path_parser::parse_path(&d);
            assert!(parsed.error.is_none());
            assert_eq!(parsed.path.commands().len(), 2);
        }
    }
}
