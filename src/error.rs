//! Error types shared by all the parsers.

use std::fmt;

use thiserror::Error;

/// A position inside the source text of a parse.
///
/// Offsets are byte offsets; they are resolved to a line and column only when
/// an error is actually displayed, via [`FileOffset::resolve`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileOffset {
    /// Byte offset into the source string.
    Offset(usize),

    /// The error refers to the end of the source string.
    EndOfString,
}

/// A resolved source position: 1-based line, 0-based column.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl FileOffset {
    /// Returns the byte offset, resolving [`FileOffset::EndOfString`] against
    /// the length of `source`.
    pub fn byte_offset(&self, source: &str) -> usize {
        match *self {
            FileOffset::Offset(offset) => offset.min(source.len()),
            FileOffset::EndOfString => source.len(),
        }
    }

    /// Resolves this offset into a line and column within `source`.
    pub fn resolve(&self, source: &str) -> LineColumn {
        let offset = self.byte_offset(source);

        let mut line = 1;
        let mut line_start = 0;

        for (i, b) in source.bytes().enumerate().take(offset) {
            if b == b'\n' {
                line += 1;
                line_start = i + 1;
            }
        }

        LineColumn {
            line,
            column: offset - line_start,
        }
    }
}

impl fmt::Display for FileOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FileOffset::Offset(offset) => write!(f, "offset {offset}"),
            FileOffset::EndOfString => write!(f, "end of string"),
        }
    }
}

/// An error from one of the parsers, with the byte offset where it happened.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{reason} ({location})")]
pub struct ParseError {
    pub reason: String,
    pub location: FileOffset,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, location: FileOffset) -> ParseError {
        ParseError {
            reason: reason.into(),
            location,
        }
    }
}

/// A non-fatal diagnostic.  Shares the shape of [`ParseError`]; parsers push
/// these into an optional caller-supplied collector while continuing to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub reason: String,
    pub location: FileOffset,
}

impl ParseWarning {
    pub fn new(reason: impl Into<String>, location: FileOffset) -> ParseWarning {
        ParseWarning {
            reason: reason.into(),
            location,
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason, self.location)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
