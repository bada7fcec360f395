//! Parser for SVG path data.

use std::iter::Enumerate;
use std::str::Bytes;

use crate::error::{FileOffset, ParseError};
use crate::path_builder::PathSpline;
use crate::vector::Vector2;

#[derive(Debug, PartialEq, Copy, Clone)]
enum Token {
    Number(f64),
    Flag(bool),
    Command(u8),
    Comma,
}

use Token::{Comma, Command, Flag, Number};

#[derive(Debug, PartialEq, Copy, Clone)]
enum LexError {
    ParseFloatError,
    UnexpectedByte(u8),
    UnexpectedEof,
}

struct Lexer<'a> {
    input: &'a [u8],
    ci: Enumerate<Bytes<'a>>,
    current: Option<(usize, u8)>,
    flags_required: u8,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Lexer<'a> {
        let mut ci = input.bytes().enumerate();
        let current = ci.next();
        Lexer {
            input: input.as_bytes(),
            ci,
            current,
            flags_required: 0,
        }
    }

    // Flag tokens are annoying: without context, "11" is the number eleven,
    // but in an arc's argument sequence it is two flags.  When the parser
    // reaches the flag positions of an elliptical arc it calls this method,
    // and the lexer switches to reading single '0'/'1' bytes until two flags
    // have been produced.
    fn require_flags(&mut self) {
        self.flags_required = 2;
    }

    fn current_pos(&mut self) -> usize {
        match self.current {
            None => self.input.len(),
            Some((pos, _)) => pos,
        }
    }

    fn advance(&mut self) {
        self.current = self.ci.next();
    }

    fn advance_over_whitespace(&mut self) -> bool {
        let mut found_some = false;
        while self.current.is_some() && self.current.unwrap().1.is_ascii_whitespace() {
            found_some = true;
            self.current = self.ci.next();
        }
        found_some
    }

    fn advance_over_optional(&mut self, needle: u8) -> bool {
        match self.current {
            Some((_, c)) if c == needle => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn advance_over_digits(&mut self) -> bool {
        let mut found_some = false;
        while self.current.is_some() && self.current.unwrap().1.is_ascii_digit() {
            found_some = true;
            self.current = self.ci.next();
        }
        found_some
    }

    fn advance_over_simple_number(&mut self) -> bool {
        let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
        let found_digit = self.advance_over_digits();
        let _ = self.advance_over_optional(b'.');
        self.advance_over_digits() || found_digit
    }

    fn match_number(&mut self) -> Result<Token, LexError> {
        // remember the beginning
        let (start_pos, _) = self.current.unwrap();
        if !self.advance_over_simple_number() && start_pos != self.current_pos() {
            match self.current {
                None => return Err(LexError::UnexpectedEof),
                Some((_pos, c)) => return Err(LexError::UnexpectedByte(c)),
            }
        }
        if self.advance_over_optional(b'e') || self.advance_over_optional(b'E') {
            let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
            let _ = self.advance_over_digits();
        }
        let end_pos = match self.current {
            None => self.input.len(),
            Some((i, _)) => i,
        };

        // The range was already validated byte by byte, so from_utf8 cannot
        // fail here.
        match std::str::from_utf8(&self.input[start_pos..end_pos])
            .unwrap()
            .parse::<f64>()
        {
            Ok(n) => Ok(Number(n)),
            Err(_e) => Err(LexError::ParseFloatError),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, Result<Token, LexError>);

    fn next(&mut self) -> Option<Self::Item> {
        // eat whitespace
        self.advance_over_whitespace();

        match self.current {
            // commas are separators
            Some((pos, c)) if c == b',' => {
                self.advance();
                Some((pos, Ok(Comma)))
            }

            // alphabetic chars are commands
            Some((pos, c)) if c.is_ascii_alphabetic() => {
                let token = Command(c);
                self.advance();
                Some((pos, Ok(token)))
            }

            Some((pos, c)) if self.flags_required > 0 && c.is_ascii_digit() => match c {
                b'0' => {
                    self.flags_required -= 1;
                    self.advance();
                    Some((pos, Ok(Flag(false))))
                }
                b'1' => {
                    self.flags_required -= 1;
                    self.advance();
                    Some((pos, Ok(Flag(true))))
                }
                _ => Some((pos, Err(LexError::UnexpectedByte(c)))),
            },

            Some((pos, c)) if c.is_ascii_digit() || c == b'-' || c == b'+' || c == b'.' => {
                Some((pos, self.match_number()))
            }

            Some((pos, c)) => {
                self.advance();
                Some((pos, Err(LexError::UnexpectedByte(c))))
            }

            None => None,
        }
    }
}

#[derive(Debug, PartialEq)]
enum ErrorKind {
    UnexpectedToken,
    UnexpectedCommand,
    UnexpectedEof,
    LexError,
}

impl ErrorKind {
    fn reason(&self) -> &'static str {
        match self {
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::UnexpectedCommand => "unexpected command",
            ErrorKind::UnexpectedEof => "unexpected end of data",
            ErrorKind::LexError => "error processing token",
        }
    }

    fn at(self, position: usize) -> ParseError {
        ParseError::new(self.reason(), FileOffset::Offset(position))
    }
}

/// A parsed path plus the error that stopped parsing, if any.  Everything up
/// to the error position is kept in `path`.
#[derive(Debug)]
pub struct ParsedPath {
    pub path: PathSpline,
    pub error: Option<ParseError>,
}

/// Parses SVG path data, per <https://www.w3.org/TR/SVG/paths.html#PathDataBNF>.
///
/// Errors carry the byte offset of the offending token; the partial path
/// parsed so far is returned alongside.
pub fn parse_path(input: &str) -> ParsedPath {
    let mut spline = PathSpline::new();
    let error = {
        let mut parser = PathParser::new(&mut spline, input);
        parser.parse().err()
    };

    ParsedPath {
        path: spline,
        error,
    }
}

struct PathParser<'b> {
    tokens: Lexer<'b>,
    current_pos_and_token: Option<(usize, Result<Token, LexError>)>,

    spline: &'b mut PathSpline,

    // Current point; adjusted at every command
    current_x: f64,
    current_y: f64,

    // Last control point from previous cubic curve command, used to reflect
    // the new control point for smooth cubic curve commands.
    cubic_reflection_x: f64,
    cubic_reflection_y: f64,

    // Last control point from previous quadratic curve command, used to reflect
    // the new control point for smooth quadratic curve commands.
    quadratic_reflection_x: f64,
    quadratic_reflection_y: f64,

    // Start point of current subpath (i.e. position of last moveto);
    // used for closepath.
    subpath_start_x: f64,
    subpath_start_y: f64,
}

// This is a recursive descent parser for path data, with a few grammar
// peculiarities:
//
// - Commas are optional and interchangeable with whitespace, both inside
//   coordinate pairs and between them:
//
//     M 10 20 30 40
//     M 10, 20 30, 40
//     M 10, 20, 30, 40
//
// - Whitespace is optional where the tokens stay unambiguous:
//
//     M-10,20-30-40        is    M -10 20 -30 -40
//     M.1-2,3E2-4          is    M 0.1 -2 300 -4
impl<'b> PathParser<'b> {
    fn new(spline: &'b mut PathSpline, path_str: &'b str) -> PathParser<'b> {
        let mut lexer = Lexer::new(path_str);
        let pt = lexer.next();
        PathParser {
            tokens: lexer,
            current_pos_and_token: pt,

            spline,

            current_x: 0.0,
            current_y: 0.0,

            cubic_reflection_x: 0.0,
            cubic_reflection_y: 0.0,

            quadratic_reflection_x: 0.0,
            quadratic_reflection_y: 0.0,

            subpath_start_x: 0.0,
            subpath_start_y: 0.0,
        }
    }

    fn parse(&mut self) -> Result<(), ParseError> {
        if self.current_pos_and_token.is_none() {
            return Ok(());
        }

        self.moveto_drawto_command_groups()
    }

    // The match_* methods consume the requested token and return its value,
    // or return an error without advancing.  They are safe to use to probe
    // for one token kind, fail, and try another.

    fn token_error(&self, pos: usize, token: &Result<Token, LexError>) -> ParseError {
        match token {
            Ok(_) => ErrorKind::UnexpectedToken.at(pos),
            Err(_) => ErrorKind::LexError.at(pos),
        }
    }

    fn eof_error(&self) -> ParseError {
        ErrorKind::UnexpectedEof.at(self.tokens.input.len())
    }

    fn match_command(&mut self) -> Result<u8, ParseError> {
        let result = match &self.current_pos_and_token {
            Some((_, Ok(Command(c)))) => Ok(*c),
            Some((pos, t)) => Err(self.token_error(*pos, t)),
            None => Err(self.eof_error()),
        };
        if result.is_ok() {
            self.current_pos_and_token = self.tokens.next();
        }
        result
    }

    fn match_number(&mut self) -> Result<f64, ParseError> {
        let result = match &self.current_pos_and_token {
            Some((_, Ok(Number(n)))) => Ok(*n),
            Some((pos, t)) => Err(self.token_error(*pos, t)),
            None => Err(self.eof_error()),
        };
        if result.is_ok() {
            self.current_pos_and_token = self.tokens.next();
        }
        result
    }

    fn match_number_and_flags(&mut self) -> Result<(f64, bool, bool), ParseError> {
        // We can't just call match_number() here: if we do find a number, the
        // lexer has to be told to look for flags *before* advancing past it,
        // or it would read the flag characters as one number.
        let n = match &self.current_pos_and_token {
            Some((_, Ok(Number(n)))) => Ok(*n),
            Some((pos, t)) => Err(self.token_error(*pos, t)),
            None => Err(self.eof_error()),
        }?;

        self.tokens.require_flags();
        self.current_pos_and_token = self.tokens.next();

        self.eat_optional_comma();
        let f1 = self.match_flag()?;

        self.eat_optional_comma();
        let f2 = self.match_flag()?;

        Ok((n, f1, f2))
    }

    fn match_comma(&mut self) -> Result<(), ParseError> {
        let result = match &self.current_pos_and_token {
            Some((_, Ok(Comma))) => Ok(()),
            Some((pos, t)) => Err(self.token_error(*pos, t)),
            None => Err(self.eof_error()),
        };
        if result.is_ok() {
            self.current_pos_and_token = self.tokens.next();
        }
        result
    }

    fn eat_optional_comma(&mut self) {
        let _ = self.match_comma();
    }

    // Like match_number, but eats a leading comma if present.
    fn match_comma_number(&mut self) -> Result<f64, ParseError> {
        self.eat_optional_comma();
        self.match_number()
    }

    fn match_flag(&mut self) -> Result<bool, ParseError> {
        let result = match &self.current_pos_and_token {
            Some((_, Ok(Flag(f)))) => Ok(*f),
            Some((pos, t)) => Err(self.token_error(*pos, t)),
            None => Err(self.eof_error()),
        };
        if result.is_ok() {
            self.current_pos_and_token = self.tokens.next();
        }
        result
    }

    // The peek_* methods are the twins of match_*, but don't consume.

    fn peek_command(&mut self) -> Option<u8> {
        match &self.current_pos_and_token {
            Some((_, Ok(Command(c)))) => Some(*c),
            _ => None,
        }
    }

    fn peek_number(&mut self) -> Option<f64> {
        match &self.current_pos_and_token {
            Some((_, Ok(Number(n)))) => Some(*n),
            _ => None,
        }
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        match self.current_pos_and_token {
            Some((pos, _)) => kind.at(pos),
            None => kind.at(self.tokens.input.len()),
        }
    }

    fn coordinate_pair(&mut self) -> Result<(f64, f64), ParseError> {
        Ok((self.match_number()?, self.match_comma_number()?))
    }

    fn set_current_point(&mut self, x: f64, y: f64) {
        self.current_x = x;
        self.current_y = y;

        self.cubic_reflection_x = self.current_x;
        self.cubic_reflection_y = self.current_y;

        self.quadratic_reflection_x = self.current_x;
        self.quadratic_reflection_y = self.current_y;
    }

    fn set_cubic_reflection_and_current_point(&mut self, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.cubic_reflection_x = x3;
        self.cubic_reflection_y = y3;

        self.current_x = x4;
        self.current_y = y4;

        self.quadratic_reflection_x = self.current_x;
        self.quadratic_reflection_y = self.current_y;
    }

    fn set_quadratic_reflection_and_current_point(&mut self, a: f64, b: f64, c: f64, d: f64) {
        self.quadratic_reflection_x = a;
        self.quadratic_reflection_y = b;

        self.current_x = c;
        self.current_y = d;

        self.cubic_reflection_x = self.current_x;
        self.cubic_reflection_y = self.current_y;
    }

    fn emit_move_to(&mut self, x: f64, y: f64) {
        self.set_current_point(x, y);

        self.subpath_start_x = self.current_x;
        self.subpath_start_y = self.current_y;

        self.spline.move_to(Vector2::new(x, y));
    }

    fn emit_line_to(&mut self, x: f64, y: f64) {
        self.set_current_point(x, y);

        self.spline.line_to(Vector2::new(x, y));
    }

    fn emit_curve_to(&mut self, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.set_cubic_reflection_and_current_point(x3, y3, x4, y4);

        self.spline.curve_to(
            Vector2::new(x2, y2),
            Vector2::new(x3, y3),
            Vector2::new(x4, y4),
        );
    }

    fn emit_quadratic_curve_to(&mut self, a: f64, b: f64, c: f64, d: f64) {
        // raise quadratic Bézier to cubic
        let x2 = (self.current_x + 2.0 * a) / 3.0;
        let y2 = (self.current_y + 2.0 * b) / 3.0;
        let x4 = c;
        let y4 = d;
        let x3 = (x4 + 2.0 * a) / 3.0;
        let y3 = (y4 + 2.0 * b) / 3.0;

        self.set_quadratic_reflection_and_current_point(a, b, c, d);

        self.spline.curve_to(
            Vector2::new(x2, y2),
            Vector2::new(x3, y3),
            Vector2::new(x4, y4),
        );
    }

    fn emit_arc(
        &mut self,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) {
        self.set_current_point(x, y);

        self.spline.arc_to(
            Vector2::new(rx, ry),
            x_axis_rotation.to_radians(),
            large_arc,
            sweep,
            Vector2::new(x, y),
        );
    }

    fn emit_close_path(&mut self) {
        let (x, y) = (self.subpath_start_x, self.subpath_start_y);
        self.set_current_point(x, y);

        self.spline.close_path();
    }

    fn moveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        let (mut x, mut y) = self.coordinate_pair()?;

        if !absolute {
            x += self.current_x;
            y += self.current_y;
        }

        self.emit_move_to(x, y);

        if self.match_comma().is_ok() || self.peek_number().is_some() {
            // Further coordinate pairs after a moveto are implicit linetos.
            self.lineto_argument_sequence(absolute)
        } else {
            Ok(())
        }
    }

    fn moveto(&mut self) -> Result<(), ParseError> {
        match self.match_command()? {
            b'M' => self.moveto_argument_sequence(true),
            b'm' => self.moveto_argument_sequence(false),
            _ => Err(self.error(ErrorKind::UnexpectedCommand)),
        }
    }

    fn moveto_drawto_command_group(&mut self) -> Result<(), ParseError> {
        self.moveto()?;
        self.optional_drawto_commands().map(|_| ())
    }

    fn moveto_drawto_command_groups(&mut self) -> Result<(), ParseError> {
        loop {
            self.moveto_drawto_command_group()?;

            if self.current_pos_and_token.is_none() {
                break;
            }
        }

        Ok(())
    }

    fn optional_drawto_commands(&mut self) -> Result<bool, ParseError> {
        while self.drawto_command()? {
            // everything happens in the drawto_command() calls
        }

        Ok(false)
    }

    fn match_if_drawto_command_with_absolute(&mut self) -> Option<(u8, bool)> {
        let result = match self.peek_command() {
            Some(b'M') | Some(b'm') => None,
            Some(c) => {
                let c_up = c.to_ascii_uppercase();
                if c == c_up {
                    Some((c_up, true))
                } else {
                    Some((c_up, false))
                }
            }
            _ => None,
        };
        if result.is_some() {
            let _ = self.match_command();
        }
        result
    }

    fn drawto_command(&mut self) -> Result<bool, ParseError> {
        match self.match_if_drawto_command_with_absolute() {
            Some((b'Z', _)) => {
                self.emit_close_path();
                Ok(true)
            }
            Some((b'L', abs)) => {
                self.lineto_argument_sequence(abs)?;
                Ok(true)
            }
            Some((b'H', abs)) => {
                self.horizontal_lineto_argument_sequence(abs)?;
                Ok(true)
            }
            Some((b'V', abs)) => {
                self.vertical_lineto_argument_sequence(abs)?;
                Ok(true)
            }
            Some((b'C', abs)) => {
                self.curveto_argument_sequence(abs)?;
                Ok(true)
            }
            Some((b'S', abs)) => {
                self.smooth_curveto_argument_sequence(abs)?;
                Ok(true)
            }
            Some((b'Q', abs)) => {
                self.quadratic_curveto_argument_sequence(abs)?;
                Ok(true)
            }
            Some((b'T', abs)) => {
                self.smooth_quadratic_curveto_argument_sequence(abs)?;
                Ok(true)
            }
            Some((b'A', abs)) => {
                self.elliptical_arc_argument_sequence(abs)?;
                Ok(true)
            }
            Some(_) => Err(self.error(ErrorKind::UnexpectedCommand)),
            None => Ok(false),
        }
    }

    fn should_break_arg_sequence(&mut self) -> bool {
        if self.match_comma().is_ok() {
            // A comma means the sequence continues; eat it so the next loop
            // iteration starts at the next argument.
            false
        } else {
            self.peek_number().is_none()
        }
    }

    fn lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut x, mut y) = self.coordinate_pair()?;

            if !absolute {
                x += self.current_x;
                y += self.current_y;
            }

            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn horizontal_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let mut x = self.match_number()?;

            if !absolute {
                x += self.current_x;
            }

            let y = self.current_y;

            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn vertical_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let mut y = self.match_number()?;

            if !absolute {
                y += self.current_y;
            }

            let x = self.current_x;

            self.emit_line_to(x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut x2, mut y2) = self.coordinate_pair()?;

            self.eat_optional_comma();
            let (mut x3, mut y3) = self.coordinate_pair()?;

            self.eat_optional_comma();
            let (mut x4, mut y4) = self.coordinate_pair()?;

            if !absolute {
                x2 += self.current_x;
                y2 += self.current_y;
                x3 += self.current_x;
                y3 += self.current_y;
                x4 += self.current_x;
                y4 += self.current_y;
            }

            self.emit_curve_to(x2, y2, x3, y3, x4, y4);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn smooth_curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut x3, mut y3) = self.coordinate_pair()?;
            self.eat_optional_comma();
            let (mut x4, mut y4) = self.coordinate_pair()?;

            if !absolute {
                x3 += self.current_x;
                y3 += self.current_y;
                x4 += self.current_x;
                y4 += self.current_y;
            }

            // Reflect the previous curve's second control point.
            let (x2, y2) = (
                self.current_x + self.current_x - self.cubic_reflection_x,
                self.current_y + self.current_y - self.cubic_reflection_y,
            );

            self.emit_curve_to(x2, y2, x3, y3, x4, y4);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn quadratic_curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let (mut a, mut b) = self.coordinate_pair()?;
            self.eat_optional_comma();
            let (mut c, mut d) = self.coordinate_pair()?;

            if !absolute {
                a += self.current_x;
                b += self.current_y;
                c += self.current_x;
                d += self.current_y;
            }

            self.emit_quadratic_curve_to(a, b, c, d);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn smooth_quadratic_curveto_argument_sequence(
        &mut self,
        absolute: bool,
    ) -> Result<(), ParseError> {
        loop {
            let (mut c, mut d) = self.coordinate_pair()?;

            if !absolute {
                c += self.current_x;
                d += self.current_y;
            }

            let (a, b) = (
                self.current_x + self.current_x - self.quadratic_reflection_x,
                self.current_y + self.current_y - self.quadratic_reflection_y,
            );

            self.emit_quadratic_curve_to(a, b, c, d);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }

    fn elliptical_arc_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let rx = self.match_number()?.abs();
            let ry = self.match_comma_number()?.abs();

            self.eat_optional_comma();
            let (x_axis_rotation, large_arc, sweep) = self.match_number_and_flags()?;

            self.eat_optional_comma();

            let (mut x, mut y) = self.coordinate_pair()?;

            if !absolute {
                x += self.current_x;
                y += self.current_y;
            }

            self.emit_arc(rx, ry, x_axis_rotation, large_arc, sweep, x, y);

            if self.should_break_arg_sequence() {
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_builder::CommandKind;

    fn v(x: f64, y: f64) -> Vector2 {
        Vector2::new(x, y)
    }

    fn parse_ok(input: &str) -> PathSpline {
        let parsed = parse_path(input);
        assert_eq!(parsed.error, None, "unexpected error for {input:?}");
        parsed.path
    }

    fn parse_err(input: &str) -> (PathSpline, ParseError) {
        let parsed = parse_path(input);
        let error = parsed.error.expect("expected a parse error");
        (parsed.path, error)
    }

    fn error_position(input: &str) -> usize {
        let (_, error) = parse_err(input);
        match error.location {
            FileOffset::Offset(pos) => pos,
            FileOffset::EndOfString => input.len(),
        }
    }

    fn kinds(spline: &PathSpline) -> Vec<CommandKind> {
        spline.commands().iter().map(|c| c.kind).collect()
    }

    #[test]
    fn handles_empty_data() {
        let path = parse_ok("");
        assert!(path.is_empty());
    }

    #[test]
    fn handles_numbers() {
        assert_eq!(parse_ok("M 10 20").points(), &[v(10.0, 20.0)]);
        assert_eq!(parse_ok("M -10 -20").points(), &[v(-10.0, -20.0)]);
        assert_eq!(parse_ok("M .10 0.20").points(), &[v(0.10, 0.20)]);
        assert_eq!(parse_ok("M-.10-0.20").points(), &[v(-0.10, -0.20)]);
        assert_eq!(parse_ok("M10.5.50").points(), &[v(10.5, 0.50)]);
        assert_eq!(parse_ok("M1e2 1e-2").points(), &[v(100.0, 0.01)]);
        assert_eq!(parse_ok("M.1-2,3E2-4").points(), &[v(0.1, -2.0), v(300.0, -4.0)]);
    }

    #[test]
    fn simple_moveto_lineto_close() {
        let path = parse_ok("M 1 1 L 4 5 Z");

        assert_eq!(path.points(), &[v(1.0, 1.0), v(4.0, 5.0)]);
        assert_eq!(
            kinds(&path),
            vec![CommandKind::MoveTo, CommandKind::LineTo, CommandKind::ClosePath]
        );
        // The close reuses the subpath's start point.
        assert_eq!(path.commands()[2].point_index, 0);
    }

    #[test]
    fn implicit_linetos_after_moveto() {
        let path = parse_ok("M 1 2 3 4 5 6");
        assert_eq!(
            kinds(&path),
            vec![CommandKind::MoveTo, CommandKind::LineTo, CommandKind::LineTo]
        );
        assert_eq!(path.points(), &[v(1.0, 2.0), v(3.0, 4.0), v(5.0, 6.0)]);

        // Relative moveto makes the implicit linetos relative too.
        let path = parse_ok("m 1 2 3 4");
        assert_eq!(path.points(), &[v(1.0, 2.0), v(4.0, 6.0)]);
    }

    #[test]
    fn relative_commands_offset_from_current_point() {
        let path = parse_ok("M 10 10 l 5 -5 h 2 v 3");
        assert_eq!(
            path.points(),
            &[v(10.0, 10.0), v(15.0, 5.0), v(17.0, 5.0), v(17.0, 8.0)]
        );
    }

    #[test]
    fn horizontal_and_vertical_linetos() {
        let path = parse_ok("M 1 2 H 5 V 7");
        assert_eq!(path.points(), &[v(1.0, 2.0), v(5.0, 2.0), v(5.0, 7.0)]);
    }

    #[test]
    fn curveto() {
        let path = parse_ok("M 0 0 C 1 2 3 4 5 6");
        assert_eq!(
            kinds(&path),
            vec![CommandKind::MoveTo, CommandKind::CurveTo]
        );
        assert_eq!(
            path.points(),
            &[v(0.0, 0.0), v(1.0, 2.0), v(3.0, 4.0), v(5.0, 6.0)]
        );
    }

    #[test]
    fn smooth_curveto_reflects_control_point() {
        let path = parse_ok("M 0 0 C 0 1 2 3 4 4 S 7 5 8 8");
        // The reflected first control point is 2*(4,4) - (2,3) = (6,5).
        assert_eq!(
            path.points(),
            &[
                v(0.0, 0.0),
                v(0.0, 1.0),
                v(2.0, 3.0),
                v(4.0, 4.0),
                v(6.0, 5.0),
                v(7.0, 5.0),
                v(8.0, 8.0)
            ]
        );
    }

    #[test]
    fn smooth_curveto_without_previous_curve_uses_current_point() {
        let path = parse_ok("M 5 5 S 7 5 8 8");
        assert_eq!(
            path.points(),
            &[v(5.0, 5.0), v(5.0, 5.0), v(7.0, 5.0), v(8.0, 8.0)]
        );
    }

    #[test]
    fn quadratic_is_raised_to_cubic() {
        let path = parse_ok("M 0 0 Q 3 3 6 0");
        assert_eq!(
            kinds(&path),
            vec![CommandKind::MoveTo, CommandKind::CurveTo]
        );
        assert_eq!(
            path.points(),
            &[v(0.0, 0.0), v(2.0, 2.0), v(4.0, 2.0), v(6.0, 0.0)]
        );
    }

    #[test]
    fn smooth_quadratic_reflects_control_point() {
        let path = parse_ok("M 0 0 Q 3 3 6 0 T 12 0");
        // The reflected quadratic control point is 2*(6,0) - (3,3) = (9,-3),
        // then raised to a cubic.
        assert_eq!(
            path.points()[4..],
            [v(8.0, -2.0), v(10.0, -2.0), v(12.0, 0.0)]
        );
    }

    #[test]
    fn arcs_decompose_to_curves() {
        let path = parse_ok("M 0 0 A 10 10 0 0 1 10 10");
        assert!(path.commands().len() > 1);
        assert!(path
            .commands()
            .iter()
            .skip(1)
            .all(|c| c.kind == CommandKind::CurveTo));
    }

    #[test]
    fn arc_flags_without_separators() {
        // "0 0 1" flags packed against the coordinates.
        let path = parse_ok("M 0 0 A 10 10 0 0110 10");
        assert!(!path.is_empty());

        let path2 = parse_ok("M 0 0 A 10 10 0 0 1 10 10");
        assert_eq!(path.points(), path2.points());
    }

    #[test]
    fn z_reopens_subpath() {
        let path = parse_ok("M 1 1 L 2 1 Z L 3 3");
        assert_eq!(
            kinds(&path),
            vec![
                CommandKind::MoveTo,
                CommandKind::LineTo,
                CommandKind::ClosePath,
                CommandKind::MoveTo,
                CommandKind::LineTo
            ]
        );
        // The re-opened subpath starts at the initial point.
        assert_eq!(path.point_at(3, 0.0), v(1.0, 1.0));
        // Drawing after z continues from the subpath start.
        assert_eq!(path.points().last(), Some(&v(3.0, 3.0)));
    }

    #[test]
    fn relative_commands_after_z_use_subpath_start() {
        let path = parse_ok("m 1 1 l 1 0 z l 1 1");
        assert_eq!(path.points().last(), Some(&v(2.0, 2.0)));
    }

    #[test]
    fn first_command_must_be_moveto() {
        let (path, error) = parse_err("L 1 2");
        assert!(path.is_empty());
        assert_eq!(error.reason, "unexpected command");
    }

    #[test]
    fn unknown_command_is_an_error() {
        // 'B' is consumed as a command token before the error is raised.
        let (path, error) = parse_err("M 1 1 B 2 2");
        assert_eq!(kinds(&path), vec![CommandKind::MoveTo]);
        assert_eq!(error.reason, "unexpected command");
    }

    #[test]
    fn partial_path_is_kept_on_error() {
        let (path, _) = parse_err("M 1 1 L 2 2 L bogus");
        assert_eq!(
            kinds(&path),
            vec![CommandKind::MoveTo, CommandKind::LineTo, CommandKind::LineTo]
        );
        assert_eq!(path.points(), &[v(1.0, 1.0), v(2.0, 2.0), v(2.0, 2.0)]);
    }

    #[test]
    fn errors_carry_byte_offsets() {
        assert_eq!(error_position("M 1 1 L 2"), 9);
        assert_eq!(error_position("M 1 1 ,"), 7);
        assert_eq!(error_position("M 1 1 L 2 2 @"), 12);
    }

    #[test]
    fn leading_comma_is_an_error() {
        assert_eq!(error_position(", M 1 1"), 0);
    }

    #[test]
    fn double_comma_is_an_error() {
        let (_, error) = parse_err("M 1,,2");
        assert_eq!(error.reason, "unexpected token");
        assert_eq!(error_position("M 1,,2"), 4);
    }

    #[test]
    fn command_after_comma_is_an_error() {
        let (_, error) = parse_err("M 1 2, L 3 4");
        assert_eq!(error.reason, "unexpected token");
    }

    #[test]
    fn truncated_data_is_an_error() {
        for input in ["M", "M 1", "M 1 2 C 3 4", "M 1 2 A 3", "M 1 2 A 3 4 5 0"] {
            let parsed = parse_path(input);
            assert!(parsed.error.is_some(), "expected error for {input:?}");
        }
    }

    #[test]
    fn numbers_may_omit_whitespace() {
        let path = parse_ok("M-1-2-3-4");
        assert_eq!(path.points(), &[v(-1.0, -2.0), v(-3.0, -4.0)]);
    }

    #[test]
    fn lexer_reports_bad_bytes() {
        let (_, error) = parse_err("M 1 1 L 2 2 \x01");
        assert_eq!(error.reason, "error processing token");
    }
}
