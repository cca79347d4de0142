//! Input buffers and the cursor ([InputLocation]) that walks them.
//!
//! A [Matcher](crate::matcher::Matcher) never touches the buffer directly:
//! it reads [InputLocation::current_char] and advances by asking the
//! location for its successor. This keeps the buffer immutable for the
//! whole parse and makes locations cheap, `Copy`-like values that contexts
//! can snapshot and roll back without touching the buffer at all.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A random-access, line/column-addressable source of characters.
///
/// Implementors are immutable for the lifetime of a parse. The crate ships
/// [StrBuffer] as a default implementation over a borrowed `&str`; callers
/// with a rope, a memory-mapped file, or some other backing store can
/// implement this trait directly instead.
pub trait InputBuffer {
    /// Number of characters in the buffer (not bytes).
    fn len(&self) -> usize;

    /// Whether the buffer has no characters at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The character at `index`, or `None` if `index` is at or past the end
    /// of the buffer (the caller treats that as the `EOI` sentinel).
    fn char_at(&self, index: usize) -> Option<char>;

    /// 1-based `(line, column)` of the character at `index`.
    fn line_col(&self, index: usize) -> (usize, usize);
}

/// A character read from the input, or the end-of-input sentinel.
///
/// Kept as its own type (rather than overloading `char` with a reserved
/// value) so that no valid source character is ever mistaken for `EOI`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum InputChar {
    /// An ordinary source character.
    Char(char),
    /// The sentinel past the end of the buffer.
    Eoi,
}

impl InputChar {
    /// `true` for [InputChar::Eoi].
    pub fn is_eoi(self) -> bool {
        matches!(self, InputChar::Eoi)
    }
}

impl fmt::Display for InputChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputChar::Char(ch) => write!(f, "{ch:?}"),
            InputChar::Eoi => write!(f, "<EOI>"),
        }
    }
}

/// The default [InputBuffer]: a borrowed `&str` with a pre-scanned
/// line-start table so `line_col` is `O(log n)` instead of rescanning from
/// the front on every diagnostic.
#[derive(Clone, Debug)]
pub struct StrBuffer<'a> {
    text: &'a str,
    chars: Vec<char>,
    line_starts: Vec<usize>,
}

impl<'a> StrBuffer<'a> {
    /// Scans `text` once, recording character positions and line starts.
    pub fn new(text: &'a str) -> Self {
        let chars: Vec<char> = text.chars().collect();

        let mut line_starts = vec![0usize];
        for (index, ch) in chars.iter().enumerate() {
            if *ch == '\n' {
                line_starts.push(index + 1);
            }
        }

        Self {
            text,
            chars,
            line_starts,
        }
    }

    /// The original source text.
    pub fn text(&self) -> &'a str {
        self.text
    }
}

impl InputBuffer for StrBuffer<'_> {
    fn len(&self) -> usize {
        self.chars.len()
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn line_col(&self, index: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&index) {
            Ok(exact) => exact,
            Err(insertion) => insertion - 1,
        };

        let column = index - self.line_starts[line];

        (line + 1, column + 1)
    }
}

/// A node in the persistent chain of synthetic characters queued ahead of
/// the real buffer position.
///
/// Sharing this chain through an [Rc] is what keeps [InputLocation] cheap to
/// copy even while it carries recovery-injected characters: cloning a
/// location clones a handful of `Rc` bumps, never the queued text itself.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
struct VirtualNode {
    ch: char,
    next: Option<Rc<VirtualNode>>,
}

/// A cursor into an [InputBuffer].
///
/// Two locations compare equal iff they denote the same logical position:
/// same real-buffer index *and* the same queue of not-yet-consumed virtual
/// characters. This is the identity check repetition matchers use to detect
/// an empty-matching iteration (see [Matcher::do_match](crate::matcher::Matcher::do_match)
/// on `ZeroOrMore`): consuming a virtual character is progress even when the
/// real buffer index does not move.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InputLocation {
    index: usize,
    virtual_head: Option<Rc<VirtualNode>>,
}

impl InputLocation {
    /// The location at the very start of a buffer.
    pub fn start() -> Self {
        Self {
            index: 0,
            virtual_head: None,
        }
    }

    /// Real-buffer index this location denotes (ignoring any queued virtual
    /// characters still ahead of it).
    pub fn index(&self) -> usize {
        self.index
    }

    /// The character under the cursor: the head of the virtual queue if
    /// non-empty, else the buffer character at `index`, else [InputChar::Eoi].
    pub fn current_char(&self, buffer: &dyn InputBuffer) -> InputChar {
        if let Some(node) = &self.virtual_head {
            return InputChar::Char(node.ch);
        }

        match buffer.char_at(self.index) {
            Some(ch) => InputChar::Char(ch),
            None => InputChar::Eoi,
        }
    }

    /// The location one character further along: pops the virtual queue if
    /// non-empty, else advances the real index by one. Advancing past the
    /// end of the buffer stays put (repeatedly advancing at `EOI` is a
    /// no-op, which is what lets repetition matchers terminate there).
    pub fn advance(&self, buffer: &dyn InputBuffer) -> Self {
        if let Some(node) = &self.virtual_head {
            return Self {
                index: self.index,
                virtual_head: node.next.clone(),
            };
        }

        if self.index >= buffer.len() {
            return self.clone();
        }

        Self {
            index: self.index + 1,
            virtual_head: None,
        }
    }

    /// Queues `chars` ahead of the cursor, to be consumed by subsequent
    /// [InputLocation::advance] calls before the real buffer resumes. Used
    /// by error recovery to synthesize a missing token.
    pub fn insert_virtual(&self, chars: &str) -> Self {
        let mut head = self.virtual_head.clone();

        for ch in chars.chars().rev() {
            head = Some(Rc::new(VirtualNode { ch, next: head }));
        }

        Self {
            index: self.index,
            virtual_head: head,
        }
    }
}

impl PartialEq for InputLocation {
    fn eq(&self, other: &Self) -> bool {
        if self.index != other.index {
            return false;
        }

        match (&self.virtual_head, &other.virtual_head) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for InputLocation {}

impl PartialOrd for InputLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.index.cmp(&other.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_the_buffer() {
        let buffer = StrBuffer::new("ab");
        let start = InputLocation::start();

        assert_eq!(start.current_char(&buffer), InputChar::Char('a'));

        let second = start.advance(&buffer);
        assert_eq!(second.current_char(&buffer), InputChar::Char('b'));

        let eoi = second.advance(&buffer);
        assert_eq!(eoi.current_char(&buffer), InputChar::Eoi);

        let still_eoi = eoi.advance(&buffer);
        assert_eq!(still_eoi, eoi);
    }

    #[test]
    fn equal_locations_compare_equal() {
        let buffer = StrBuffer::new("abc");
        let a = InputLocation::start().advance(&buffer);
        let b = InputLocation::start().advance(&buffer);

        assert_eq!(a, b);
    }

    #[test]
    fn virtual_insertion_is_progress_without_moving_the_index() {
        let buffer = StrBuffer::new("x");
        let loc = InputLocation::start();
        let injected = loc.insert_virtual(";");

        assert_ne!(loc, injected);
        assert_eq!(injected.index(), loc.index());
        assert_eq!(injected.current_char(&buffer), InputChar::Char(';'));

        let after = injected.advance(&buffer);
        assert_eq!(after.index(), loc.index());
        assert_eq!(after.current_char(&buffer), InputChar::Char('x'));
    }

    #[test]
    fn line_col_is_one_based() {
        let buffer = StrBuffer::new("ab\ncd");
        assert_eq!(buffer.line_col(0), (1, 1));
        assert_eq!(buffer.line_col(2), (1, 3));
        assert_eq!(buffer.line_col(3), (2, 1));
        assert_eq!(buffer.line_col(4), (2, 2));
    }
}
