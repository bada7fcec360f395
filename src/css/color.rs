//! Color values and the CSS color parser.
//!
//! Covers the modern CSS color grammars: hex, named colors, the legacy
//! comma-separated and modern space-separated `rgb()`/`hsl()` forms, `hwb()`,
//! `lab()`/`lch()`/`oklab()`/`oklch()`, and `color(<space> ...)` with a
//! pluggable color-space registry.  Values are kept in their source space;
//! conversion between spaces is a renderer concern.

use crate::const_map::ConstMap;
use crate::css::component_value::{
    parse_list_of_component_values, trim_whitespace, ComponentValue, Function, WhitespaceHandling,
};
use crate::css::token::{Token, TokenKind};
use crate::error::{FileOffset, ParseError, ParseResult};
use crate::rcstring::RcString;
use crate::util::clamp;

/// A color with 8-bit sRGB components.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Rgba {
        Rgba { r, g, b, a }
    }

    /// Fully opaque.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
        Rgba::new(r, g, b, 0xff)
    }
}

/// A color in HSL space; hue in degrees `[0, 360)`, saturation and lightness
/// in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: u8,
}

impl Hsla {
    pub fn new(h: f32, s: f32, l: f32, a: u8) -> Hsla {
        Hsla { h, s, l, a }
    }
}

/// The color spaces representable by [`ColorSpaceValue`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorSpaceId {
    Hwb,
    Lab,
    Lch,
    Oklab,
    Oklch,
    XyzD50,
    XyzD65,
    Srgb,
    SrgbLinear,
    DisplayP3,
    A98Rgb,
    ProphotoRgb,
    Rec2020,
}

impl ColorSpaceId {
    /// Resolves the `<ident>` of `color(<ident> ...)`; `name` must already be
    /// lowercase.
    pub fn from_name(name: &str) -> Option<ColorSpaceId> {
        match name {
            "srgb" => Some(ColorSpaceId::Srgb),
            "srgb-linear" => Some(ColorSpaceId::SrgbLinear),
            "display-p3" => Some(ColorSpaceId::DisplayP3),
            "a98-rgb" => Some(ColorSpaceId::A98Rgb),
            "prophoto-rgb" => Some(ColorSpaceId::ProphotoRgb),
            "rec2020" => Some(ColorSpaceId::Rec2020),
            "xyz" | "xyz-d65" => Some(ColorSpaceId::XyzD65),
            "xyz-d50" => Some(ColorSpaceId::XyzD50),
            _ => None,
        }
    }
}

/// A color in one of the non-RGB/HSL spaces, kept as raw channels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorSpaceValue {
    pub id: ColorSpaceId,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub alpha: u8,
}

/// A parsed CSS color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Color {
    Rgba(Rgba),
    Hsla(Hsla),
    ColorSpace(ColorSpaceValue),
    /// The `currentColor` keyword; resolves against the `color` property.
    CurrentColor,
}

impl Color {
    /// Looks up a named color; `name` must already be lowercase.
    pub fn by_name(name: &str) -> Option<Color> {
        NAMED_COLORS.find(name).map(|rgba| Color::Rgba(*rgba))
    }
}

/// Maps custom `color(<ident> ...)` space names to one of the built-in
/// spaces.  Consulted before the built-in names.
pub trait ColorSpaceRegistry {
    fn resolve(&self, name: &str) -> Option<ColorSpaceId>;
}

/// Options for [`ColorParser`].
#[derive(Default)]
pub struct ColorParseOptions<'a> {
    /// Custom color-space resolution for `color()`.
    pub registry: Option<&'a dyn ColorSpaceRegistry>,
}

static NAMED_COLORS: ConstMap<&'static str, Rgba, 149> = <ConstMap<&'static str, Rgba, 149>>::new([
    ("transparent", Rgba::new(0, 0, 0, 0)),
    ("aliceblue", Rgba::rgb(240, 248, 255)),
    ("antiquewhite", Rgba::rgb(250, 235, 215)),
    ("aqua", Rgba::rgb(0, 255, 255)),
    ("aquamarine", Rgba::rgb(127, 255, 212)),
    ("azure", Rgba::rgb(240, 255, 255)),
    ("beige", Rgba::rgb(245, 245, 220)),
    ("bisque", Rgba::rgb(255, 228, 196)),
    ("black", Rgba::rgb(0, 0, 0)),
    ("blanchedalmond", Rgba::rgb(255, 235, 205)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("blueviolet", Rgba::rgb(138, 43, 226)),
    ("brown", Rgba::rgb(165, 42, 42)),
    ("burlywood", Rgba::rgb(222, 184, 135)),
    ("cadetblue", Rgba::rgb(95, 158, 160)),
    ("chartreuse", Rgba::rgb(127, 255, 0)),
    ("chocolate", Rgba::rgb(210, 105, 30)),
    ("coral", Rgba::rgb(255, 127, 80)),
    ("cornflowerblue", Rgba::rgb(100, 149, 237)),
    ("cornsilk", Rgba::rgb(255, 248, 220)),
    ("crimson", Rgba::rgb(220, 20, 60)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("darkblue", Rgba::rgb(0, 0, 139)),
    ("darkcyan", Rgba::rgb(0, 139, 139)),
    ("darkgoldenrod", Rgba::rgb(184, 134, 11)),
    ("darkgray", Rgba::rgb(169, 169, 169)),
    ("darkgreen", Rgba::rgb(0, 100, 0)),
    ("darkgrey", Rgba::rgb(169, 169, 169)),
    ("darkkhaki", Rgba::rgb(189, 183, 107)),
    ("darkmagenta", Rgba::rgb(139, 0, 139)),
    ("darkolivegreen", Rgba::rgb(85, 107, 47)),
    ("darkorange", Rgba::rgb(255, 140, 0)),
    ("darkorchid", Rgba::rgb(153, 50, 204)),
    ("darkred", Rgba::rgb(139, 0, 0)),
    ("darksalmon", Rgba::rgb(233, 150, 122)),
    ("darkseagreen", Rgba::rgb(143, 188, 143)),
    ("darkslateblue", Rgba::rgb(72, 61, 139)),
    ("darkslategray", Rgba::rgb(47, 79, 79)),
    ("darkslategrey", Rgba::rgb(47, 79, 79)),
    ("darkturquoise", Rgba::rgb(0, 206, 209)),
    ("darkviolet", Rgba::rgb(148, 0, 211)),
    ("deeppink", Rgba::rgb(255, 20, 147)),
    ("deepskyblue", Rgba::rgb(0, 191, 255)),
    ("dimgray", Rgba::rgb(105, 105, 105)),
    ("dimgrey", Rgba::rgb(105, 105, 105)),
    ("dodgerblue", Rgba::rgb(30, 144, 255)),
    ("firebrick", Rgba::rgb(178, 34, 34)),
    ("floralwhite", Rgba::rgb(255, 250, 240)),
    ("forestgreen", Rgba::rgb(34, 139, 34)),
    ("fuchsia", Rgba::rgb(255, 0, 255)),
    ("gainsboro", Rgba::rgb(220, 220, 220)),
    ("ghostwhite", Rgba::rgb(248, 248, 255)),
    ("gold", Rgba::rgb(255, 215, 0)),
    ("goldenrod", Rgba::rgb(218, 165, 32)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("greenyellow", Rgba::rgb(173, 255, 47)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("honeydew", Rgba::rgb(240, 255, 240)),
    ("hotpink", Rgba::rgb(255, 105, 180)),
    ("indianred", Rgba::rgb(205, 92, 92)),
    ("indigo", Rgba::rgb(75, 0, 130)),
    ("ivory", Rgba::rgb(255, 255, 240)),
    ("khaki", Rgba::rgb(240, 230, 140)),
    ("lavender", Rgba::rgb(230, 230, 250)),
    ("lavenderblush", Rgba::rgb(255, 240, 245)),
    ("lawngreen", Rgba::rgb(124, 252, 0)),
    ("lemonchiffon", Rgba::rgb(255, 250, 205)),
    ("lightblue", Rgba::rgb(173, 216, 230)),
    ("lightcoral", Rgba::rgb(240, 128, 128)),
    ("lightcyan", Rgba::rgb(224, 255, 255)),
    ("lightgoldenrodyellow", Rgba::rgb(250, 250, 210)),
    ("lightgray", Rgba::rgb(211, 211, 211)),
    ("lightgreen", Rgba::rgb(144, 238, 144)),
    ("lightgrey", Rgba::rgb(211, 211, 211)),
    ("lightpink", Rgba::rgb(255, 182, 193)),
    ("lightsalmon", Rgba::rgb(255, 160, 122)),
    ("lightseagreen", Rgba::rgb(32, 178, 170)),
    ("lightskyblue", Rgba::rgb(135, 206, 250)),
    ("lightslategray", Rgba::rgb(119, 136, 153)),
    ("lightslategrey", Rgba::rgb(119, 136, 153)),
    ("lightsteelblue", Rgba::rgb(176, 196, 222)),
    ("lightyellow", Rgba::rgb(255, 255, 224)),
    ("lime", Rgba::rgb(0, 255, 0)),
    ("limegreen", Rgba::rgb(50, 205, 50)),
    ("linen", Rgba::rgb(250, 240, 230)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("maroon", Rgba::rgb(128, 0, 0)),
    ("mediumaquamarine", Rgba::rgb(102, 205, 170)),
    ("mediumblue", Rgba::rgb(0, 0, 205)),
    ("mediumorchid", Rgba::rgb(186, 85, 211)),
    ("mediumpurple", Rgba::rgb(147, 112, 219)),
    ("mediumseagreen", Rgba::rgb(60, 179, 113)),
    ("mediumslateblue", Rgba::rgb(123, 104, 238)),
    ("mediumspringgreen", Rgba::rgb(0, 250, 154)),
    ("mediumturquoise", Rgba::rgb(72, 209, 204)),
    ("mediumvioletred", Rgba::rgb(199, 21, 133)),
    ("midnightblue", Rgba::rgb(25, 25, 112)),
    ("mintcream", Rgba::rgb(245, 255, 250)),
    ("mistyrose", Rgba::rgb(255, 228, 225)),
    ("moccasin", Rgba::rgb(255, 228, 181)),
    ("navajowhite", Rgba::rgb(255, 222, 173)),
    ("navy", Rgba::rgb(0, 0, 128)),
    ("oldlace", Rgba::rgb(253, 245, 230)),
    ("olive", Rgba::rgb(128, 128, 0)),
    ("olivedrab", Rgba::rgb(107, 142, 35)),
    ("orange", Rgba::rgb(255, 165, 0)),
    ("orangered", Rgba::rgb(255, 69, 0)),
    ("orchid", Rgba::rgb(218, 112, 214)),
    ("palegoldenrod", Rgba::rgb(238, 232, 170)),
    ("palegreen", Rgba::rgb(152, 251, 152)),
    ("paleturquoise", Rgba::rgb(175, 238, 238)),
    ("palevioletred", Rgba::rgb(219, 112, 147)),
    ("papayawhip", Rgba::rgb(255, 239, 213)),
    ("peachpuff", Rgba::rgb(255, 218, 185)),
    ("peru", Rgba::rgb(205, 133, 63)),
    ("pink", Rgba::rgb(255, 192, 203)),
    ("plum", Rgba::rgb(221, 160, 221)),
    ("powderblue", Rgba::rgb(176, 224, 230)),
    ("purple", Rgba::rgb(128, 0, 128)),
    ("rebeccapurple", Rgba::rgb(102, 51, 153)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("rosybrown", Rgba::rgb(188, 143, 143)),
    ("royalblue", Rgba::rgb(65, 105, 225)),
    ("saddlebrown", Rgba::rgb(139, 69, 19)),
    ("salmon", Rgba::rgb(250, 128, 114)),
    ("sandybrown", Rgba::rgb(244, 164, 96)),
    ("seagreen", Rgba::rgb(46, 139, 87)),
    ("seashell", Rgba::rgb(255, 245, 238)),
    ("sienna", Rgba::rgb(160, 82, 45)),
    ("silver", Rgba::rgb(192, 192, 192)),
    ("skyblue", Rgba::rgb(135, 206, 235)),
    ("slateblue", Rgba::rgb(106, 90, 205)),
    ("slategray", Rgba::rgb(112, 128, 144)),
    ("slategrey", Rgba::rgb(112, 128, 144)),
    ("snow", Rgba::rgb(255, 250, 250)),
    ("springgreen", Rgba::rgb(0, 255, 127)),
    ("steelblue", Rgba::rgb(70, 130, 180)),
    ("tan", Rgba::rgb(210, 180, 140)),
    ("teal", Rgba::rgb(0, 128, 128)),
    ("thistle", Rgba::rgb(216, 191, 216)),
    ("tomato", Rgba::rgb(255, 99, 71)),
    ("turquoise", Rgba::rgb(64, 224, 208)),
    ("violet", Rgba::rgb(238, 130, 238)),
    ("wheat", Rgba::rgb(245, 222, 179)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("whitesmoke", Rgba::rgb(245, 245, 245)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("yellowgreen", Rgba::rgb(154, 205, 50)),
]).expect_ok();

/// Parser for CSS color values.
pub struct ColorParser;

impl ColorParser {
    /// Parses a color from a span of component values.
    pub fn parse(
        components: &[ComponentValue],
        options: &ColorParseOptions<'_>,
    ) -> ParseResult<Color> {
        let components = trim_whitespace(components);

        if components.is_empty() {
            return Err(ParseError::new("No color found", FileOffset::EndOfString));
        }
        if components.len() != 1 {
            return Err(ParseError::new(
                "Expected a single color",
                FileOffset::Offset(components[0].source_offset()),
            ));
        }

        match &components[0] {
            ComponentValue::Token(token) => match &token.kind {
                TokenKind::Hash { value, .. } => parse_hash(value, token.offset),

                TokenKind::Ident(name) => {
                    let lowercase = name.to_ascii_lowercase();

                    if lowercase == "currentcolor" {
                        return Ok(Color::CurrentColor);
                    }

                    Color::by_name(&lowercase).ok_or_else(|| {
                        ParseError::new(
                            format!("Invalid color '{name}'"),
                            FileOffset::Offset(token.offset),
                        )
                    })
                }

                _ => Err(ParseError::new(
                    "Unexpected token when parsing color",
                    FileOffset::Offset(token.offset),
                )),
            },

            ComponentValue::Function(function) => parse_color_function(function, options),

            ComponentValue::Block(block) => Err(ParseError::new(
                "Unexpected block when parsing color",
                FileOffset::Offset(block.offset),
            )),
        }
    }

    /// Convenience entry point over raw text.
    pub fn parse_str(input: &str, options: &ColorParseOptions<'_>) -> ParseResult<Color> {
        let components = parse_list_of_component_values(input, WhitespaceHandling::Keep);
        Self::parse(&components, options)
    }
}

fn parse_color_function(
    function: &Function,
    options: &ColorParseOptions<'_>,
) -> ParseResult<Color> {
    let name = &function.name;

    if name.equals_ignore_case("rgb") || name.equals_ignore_case("rgba") {
        parse_rgb(name, &function.values)
    } else if name.equals_ignore_case("hsl") || name.equals_ignore_case("hsla") {
        parse_hsl(name, &function.values)
    } else if name.equals_ignore_case("hwb") {
        parse_hwb(name, &function.values)
    } else if name.equals_ignore_case("lab") {
        parse_lab_like(name, &function.values, ColorSpaceId::Lab)
    } else if name.equals_ignore_case("lch") {
        parse_lch_like(name, &function.values, ColorSpaceId::Lch)
    } else if name.equals_ignore_case("oklab") {
        parse_lab_like(name, &function.values, ColorSpaceId::Oklab)
    } else if name.equals_ignore_case("oklch") {
        parse_lch_like(name, &function.values, ColorSpaceId::Oklch)
    } else if name.equals_ignore_case("color") {
        parse_color_space_function(name, &function.values, options)
    } else if name.equals_ignore_case("device-cmyk") {
        Err(ParseError::new(
            "Not implemented",
            FileOffset::Offset(function.offset),
        ))
    } else {
        Err(ParseError::new(
            format!("Unsupported color function '{name}'"),
            FileOffset::Offset(function.offset),
        ))
    }
}

/// Cursor over a color function's arguments.  Whitespace between arguments is
/// skipped; nested functions or blocks are errors.
struct FunctionArgs<'a> {
    function_name: &'a RcString,
    components: &'a [ComponentValue],
    last_offset: FileOffset,
}

impl<'a> FunctionArgs<'a> {
    fn new(function_name: &'a RcString, components: &'a [ComponentValue]) -> FunctionArgs<'a> {
        FunctionArgs {
            function_name,
            components,
            last_offset: FileOffset::Offset(0),
        }
    }

    fn skip_whitespace(&mut self) {
        while self
            .components
            .first()
            .map(|c| c.is_whitespace())
            .unwrap_or(false)
        {
            self.components = &self.components[1..];
        }
    }

    fn peek(&mut self) -> Option<&'a ComponentValue> {
        self.skip_whitespace();
        self.components.first()
    }

    fn is_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    fn next(&mut self) -> ParseResult<&'a Token> {
        match self.peek() {
            None => Err(ParseError::new(
                format!("Unexpected EOF when parsing function '{}'", self.function_name),
                self.last_offset,
            )),
            Some(ComponentValue::Token(token)) => {
                self.last_offset = FileOffset::Offset(token.offset);
                self.components = &self.components[1..];
                Ok(token)
            }
            Some(other) => Err(ParseError::new(
                format!("Unexpected token when parsing function '{}'", self.function_name),
                FileOffset::Offset(other.source_offset()),
            )),
        }
    }

    /// Consumes a comma if one is next; returns whether it did.
    fn try_skip_comma(&mut self) -> bool {
        match self.peek() {
            Some(ComponentValue::Token(token)) if matches!(token.kind, TokenKind::Comma) => {
                self.components = &self.components[1..];
                true
            }
            _ => false,
        }
    }

    fn require_comma(&mut self) -> ParseResult<()> {
        if self.try_skip_comma() {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("Missing comma when parsing function '{}'", self.function_name),
                self.last_offset,
            ))
        }
    }

    fn require_slash(&mut self) -> ParseResult<()> {
        match self.peek() {
            Some(component) if component.is_delim('/') => {
                self.components = &self.components[1..];
                Ok(())
            }
            _ => Err(ParseError::new(
                format!(
                    "Missing delimiter for alpha when parsing function '{}'",
                    self.function_name
                ),
                self.last_offset,
            )),
        }
    }

    fn require_eof(&mut self) -> ParseResult<()> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("Additional tokens when parsing function '{}'", self.function_name),
                self.last_offset,
            ))
        }
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::new(
            format!("Unexpected token when parsing function '{}'", self.function_name),
            FileOffset::Offset(token.offset),
        )
    }
}

fn parse_hash(value: &str, offset: usize) -> ParseResult<Color> {
    if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::new(
            format!("'#{value}' is not a hex number"),
            FileOffset::Offset(offset),
        ));
    }

    let hex = |i: usize| u8::from_str_radix(&value[i..i + 1], 16).unwrap();
    let hex2 = |i: usize| u8::from_str_radix(&value[i..i + 2], 16).unwrap();

    match value.len() {
        3 => Ok(Color::Rgba(Rgba::rgb(
            hex(0) * 17,
            hex(1) * 17,
            hex(2) * 17,
        ))),
        4 => Ok(Color::Rgba(Rgba::new(
            hex(0) * 17,
            hex(1) * 17,
            hex(2) * 17,
            hex(3) * 17,
        ))),
        6 => Ok(Color::Rgba(Rgba::rgb(hex2(0), hex2(2), hex2(4)))),
        8 => Ok(Color::Rgba(Rgba::new(hex2(0), hex2(2), hex2(4), hex2(6)))),
        _ => Err(ParseError::new(
            format!("'#{value}' is not a color"),
            FileOffset::Offset(offset),
        )),
    }
}

fn parse_rgb(name: &RcString, components: &[ComponentValue]) -> ParseResult<Color> {
    let mut args = FunctionArgs::new(name, components);

    let first = args.next()?;
    let requires_commas = args.try_skip_comma();

    // All three channels are numbers, or all three are percentages.
    let (r, g, b) = match &first.kind {
        TokenKind::Number { value, .. } => {
            let red = *value;
            let green = expect_number(&mut args)?;
            if requires_commas {
                args.require_comma()?;
            }
            let blue = expect_number(&mut args)?;
            (
                number_to_channel(red),
                number_to_channel(green),
                number_to_channel(blue),
            )
        }
        TokenKind::Percentage { value, .. } => {
            let red = *value;
            let green = expect_percentage(&mut args)?;
            if requires_commas {
                args.require_comma()?;
            }
            let blue = expect_percentage(&mut args)?;
            (
                percentage_to_channel(red),
                percentage_to_channel(green),
                percentage_to_channel(blue),
            )
        }
        _ => return Err(args.unexpected(first)),
    };

    let alpha = parse_optional_alpha(&mut args, requires_commas)?;

    Ok(Color::Rgba(Rgba::new(r, g, b, alpha)))
}

fn parse_hsl(name: &RcString, components: &[ComponentValue]) -> ParseResult<Color> {
    let mut args = FunctionArgs::new(name, components);

    let hue = parse_hue(&mut args)?;
    let requires_commas = args.try_skip_comma();

    let saturation = expect_percentage(&mut args)?;
    if requires_commas {
        args.require_comma()?;
    }
    let lightness = expect_percentage(&mut args)?;

    let alpha = parse_optional_alpha(&mut args, requires_commas)?;

    Ok(Color::Hsla(Hsla::new(
        normalize_angle_degrees(hue) as f32,
        clamp(saturation / 100.0, 0.0, 1.0) as f32,
        clamp(lightness / 100.0, 0.0, 1.0) as f32,
        alpha,
    )))
}

fn parse_hwb(name: &RcString, components: &[ComponentValue]) -> ParseResult<Color> {
    let mut args = FunctionArgs::new(name, components);

    let hue = parse_hue(&mut args)?;
    let requires_commas = args.try_skip_comma();

    let whiteness = expect_percentage(&mut args)?;
    if requires_commas {
        args.require_comma()?;
    }
    let blackness = expect_percentage(&mut args)?;

    let alpha = parse_optional_alpha(&mut args, requires_commas)?;

    Ok(Color::ColorSpace(ColorSpaceValue {
        id: ColorSpaceId::Hwb,
        c1: normalize_angle_degrees(hue),
        c2: clamp(whiteness / 100.0, 0.0, 1.0),
        c3: clamp(blackness / 100.0, 0.0, 1.0),
        alpha,
    }))
}

/// `lab()` and `oklab()`: lightness, then two unbounded (for numbers) axes.
/// Percentages scale to the space's native range and clamp.
fn parse_lab_like(
    name: &RcString,
    components: &[ComponentValue],
    id: ColorSpaceId,
) -> ParseResult<Color> {
    let mut args = FunctionArgs::new(name, components);

    // lab() L is 0..100; oklab() L is 0..1.  a/b percentages scale to ±125
    // (lab) or ±0.4 (oklab).
    let (l_max, ab_scale) = match id {
        ColorSpaceId::Lab => (100.0, 125.0),
        _ => (1.0, 0.4),
    };

    let l = {
        let token = args.next()?;
        match &token.kind {
            TokenKind::Percentage { value, .. } => clamp(value * l_max / 100.0, 0.0, l_max),
            TokenKind::Number { value, .. } => clamp(*value, 0.0, l_max),
            _ => return Err(args.unexpected(token)),
        }
    };

    let mut axis = |args: &mut FunctionArgs<'_>| -> ParseResult<f64> {
        let token = args.next()?;
        match &token.kind {
            TokenKind::Percentage { value, .. } => {
                Ok(clamp(value / 100.0 * ab_scale, -ab_scale, ab_scale))
            }
            TokenKind::Number { value, .. } => Ok(*value),
            _ => Err(args.unexpected(token)),
        }
    };

    let a = axis(&mut args)?;
    let b = axis(&mut args)?;

    let alpha = parse_slash_alpha(&mut args)?;
    args.require_eof()?;

    Ok(Color::ColorSpace(ColorSpaceValue {
        id,
        c1: l,
        c2: a,
        c3: b,
        alpha,
    }))
}

/// `lch()` and `oklch()`: lightness, non-negative chroma, hue angle.
fn parse_lch_like(
    name: &RcString,
    components: &[ComponentValue],
    id: ColorSpaceId,
) -> ParseResult<Color> {
    let mut args = FunctionArgs::new(name, components);

    let (l_max, c_scale) = match id {
        ColorSpaceId::Lch => (100.0, 150.0),
        _ => (1.0, 0.4),
    };

    let l = {
        let token = args.next()?;
        match &token.kind {
            TokenKind::Percentage { value, .. } => clamp(value * l_max / 100.0, 0.0, l_max),
            TokenKind::Number { value, .. } => clamp(*value, 0.0, l_max),
            _ => return Err(args.unexpected(token)),
        }
    };

    let c = {
        let token = args.next()?;
        match &token.kind {
            TokenKind::Percentage { value, .. } => clamp(value / 100.0 * c_scale, 0.0, c_scale),
            TokenKind::Number { value, .. } => value.max(0.0),
            _ => return Err(args.unexpected(token)),
        }
    };

    let h = normalize_angle_degrees(parse_hue(&mut args)?);

    let alpha = parse_slash_alpha(&mut args)?;
    args.require_eof()?;

    Ok(Color::ColorSpace(ColorSpaceValue {
        id,
        c1: l,
        c2: c,
        c3: h,
        alpha,
    }))
}

fn parse_color_space_function(
    name: &RcString,
    components: &[ComponentValue],
    options: &ColorParseOptions<'_>,
) -> ParseResult<Color> {
    let mut args = FunctionArgs::new(name, components);

    let ident_token = args.next()?;
    let space = match &ident_token.kind {
        TokenKind::Ident(ident) => ident.to_ascii_lowercase(),
        _ => return Err(args.unexpected(ident_token)),
    };

    let id = options
        .registry
        .and_then(|registry| registry.resolve(&space))
        .or_else(|| ColorSpaceId::from_name(&space))
        .ok_or_else(|| {
            ParseError::new(
                format!("Unsupported color space '{space}'"),
                FileOffset::Offset(ident_token.offset),
            )
        })?;

    let mut channels = [0.0; 3];
    for channel in &mut channels {
        let token = args.next()?;
        *channel = match &token.kind {
            TokenKind::Number { value, .. } => *value,
            TokenKind::Percentage { value, .. } => value / 100.0,
            _ => return Err(args.unexpected(token)),
        };
    }

    let alpha = parse_slash_alpha(&mut args)?;
    args.require_eof()?;

    Ok(Color::ColorSpace(ColorSpaceValue {
        id,
        c1: channels[0],
        c2: channels[1],
        c3: channels[2],
        alpha,
    }))
}

/// Hue per <https://www.w3.org/TR/css-color-4/#hue-syntax>: a bare number is
/// degrees; dimensions accept the CSS angle units.
fn parse_hue(args: &mut FunctionArgs<'_>) -> ParseResult<f64> {
    let token = args.next()?;

    match &token.kind {
        TokenKind::Number { value, .. } => Ok(*value),
        TokenKind::Dimension { value, unit, .. } => {
            if unit.equals_lowercase("deg") {
                Ok(*value)
            } else if unit.equals_lowercase("grad") {
                Ok(value / 400.0 * 360.0)
            } else if unit.equals_lowercase("rad") {
                Ok(value.to_degrees())
            } else if unit.equals_lowercase("turn") {
                Ok(value * 360.0)
            } else {
                Err(ParseError::new(
                    format!("Angle has unexpected dimension '{unit}'"),
                    FileOffset::Offset(token.offset),
                ))
            }
        }
        _ => Err(ParseError::new(
            "Unexpected token when parsing angle",
            FileOffset::Offset(token.offset),
        )),
    }
}

/// Alpha used by the legacy forms: a trailing `, A` (with commas) or `/ A`
/// (without).  Defaults to opaque; requires the arguments to end afterwards.
fn parse_optional_alpha(args: &mut FunctionArgs<'_>, requires_commas: bool) -> ParseResult<u8> {
    if args.is_eof() {
        return Ok(0xff);
    }

    if requires_commas {
        args.require_comma()?;
    } else {
        args.require_slash()?;
    }

    let alpha = parse_alpha_value(args)?;
    args.require_eof()?;
    Ok(alpha)
}

/// Alpha used by the modern forms: an optional `/ A` tail.
fn parse_slash_alpha(args: &mut FunctionArgs<'_>) -> ParseResult<u8> {
    if args.is_eof() {
        return Ok(0xff);
    }

    args.require_slash()?;
    parse_alpha_value(args)
}

fn parse_alpha_value(args: &mut FunctionArgs<'_>) -> ParseResult<u8> {
    let token = args.next()?;
    match &token.kind {
        TokenKind::Number { value, .. } => Ok(number_to_alpha(*value)),
        TokenKind::Percentage { value, .. } => Ok(percentage_to_channel(*value)),
        _ => Err(ParseError::new(
            "Unexpected alpha value",
            FileOffset::Offset(token.offset),
        )),
    }
}

fn expect_number(args: &mut FunctionArgs<'_>) -> ParseResult<f64> {
    let token = args.next()?;
    match &token.kind {
        TokenKind::Number { value, .. } => Ok(*value),
        _ => Err(args.unexpected(token)),
    }
}

fn expect_percentage(args: &mut FunctionArgs<'_>) -> ParseResult<f64> {
    let token = args.next()?;
    match &token.kind {
        TokenKind::Percentage { value, .. } => Ok(*value),
        _ => Err(args.unexpected(token)),
    }
}

fn normalize_angle_degrees(degrees: f64) -> f64 {
    degrees - (degrees / 360.0).floor() * 360.0
}

fn number_to_channel(number: f64) -> u8 {
    clamp(number.round(), 0.0, 255.0) as u8
}

fn percentage_to_channel(number: f64) -> u8 {
    // 100% -> 255.
    number_to_channel(number * 2.55)
}

fn number_to_alpha(number: f64) -> u8 {
    clamp((number * 255.0).round(), 0.0, 255.0) as u8
}
