//! Terminal-friendly rendering of a [ParseError] (A4): location, rule
//! path, and a one-line source snippet with a caret under the offending
//! column.

use std::fmt;

use crate::error::ParseError;
use crate::location::InputBuffer;

/// Renders a [ParseError] against the buffer it was recorded against.
///
/// Built as a borrowing wrapper rather than a method on `ParseError`
/// itself, since rendering needs the buffer and a `ParseError` on its own
/// only remembers a numeric location.
pub struct Diagnostic<'a> {
    error: &'a ParseError,
    buffer: &'a dyn InputBuffer,
}

impl<'a> Diagnostic<'a> {
    /// A renderer for `error`, resolved against `buffer`.
    pub fn new(error: &'a ParseError, buffer: &'a dyn InputBuffer) -> Self {
        Self { error, buffer }
    }

    fn line_text(&self) -> String {
        let index = self.error.location.index();

        let mut start = index;
        while start > 0 && !matches!(self.buffer.char_at(start - 1), Some('\n') | None) {
            start -= 1;
        }

        let mut end = index;
        while !matches!(self.buffer.char_at(end), Some('\n') | None) {
            end += 1;
        }

        (start..end).filter_map(|i| self.buffer.char_at(i)).collect()
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.error.line_col;

        writeln!(
            f,
            "{} at {}:{} (in {})",
            self.error.message,
            line,
            column,
            self.error.path.join("/")
        )?;
        writeln!(f, "  | {}", self.line_text())?;
        write!(f, "  | {}^", " ".repeat(column.saturating_sub(1)))
    }
}
