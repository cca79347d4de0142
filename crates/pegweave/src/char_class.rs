//! Character classes used by `starter_chars`/`follower_chars`.
//!
//! A [CharClass] is a set of source characters plus two markers that never
//! denote a real character: [CharClass::EOI] (matches the end-of-input
//! sentinel) and an internal "emptiness" marker used only while the
//! follower-set walk (`follower::current_follower_chars`) is still climbing
//! the stack (see §4.5 of the spec). The empty marker never survives into a
//! class handed back to a caller.

use std::fmt;

use crate::location::InputChar;

/// An inclusive, closed set of Unicode scalar values plus the `EOI`/`EMPTY`
/// markers.
///
/// Ranges are kept as an unsorted `Vec` rather than merged into a canonical
/// form: grammars build small classes (single chars, digit/letter ranges)
/// and `contains` is a short linear scan, which is both simpler and faster
/// than maintaining sorted, merged intervals for the sizes this crate deals
/// with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharClass {
    ranges: Vec<(char, char)>,
    eoi: bool,
    empty: bool,
}

impl CharClass {
    /// The class containing nothing at all, not even `EOI` or `EMPTY`.
    pub fn none() -> Self {
        Self::default()
    }

    /// A class containing exactly one character.
    pub fn single(ch: char) -> Self {
        Self {
            ranges: vec![(ch, ch)],
            eoi: false,
            empty: false,
        }
    }

    /// A class containing every character in the inclusive range `lo..=hi`.
    pub fn range(lo: char, hi: char) -> Self {
        Self {
            ranges: vec![(lo, hi)],
            eoi: false,
            empty: false,
        }
    }

    /// A class containing one entry per character of `text`.
    pub fn of_str(text: &str) -> Self {
        let mut class = Self::none();

        for ch in text.chars() {
            class.ranges.push((ch, ch));
        }

        class
    }

    /// Sets the `EOI` marker and returns `self`.
    pub fn with_eoi(mut self) -> Self {
        self.eoi = true;
        self
    }

    /// Sets the `EMPTY` marker and returns `self`.
    pub fn with_empty(mut self) -> Self {
        self.empty = true;
        self
    }

    /// `true` if the `EMPTY` marker is set.
    ///
    /// Operands of repetition/predicate matchers must never report `EMPTY`
    /// in their `starter_chars` — an empty-matching operand is the grammar
    /// defect this crate's driver raises as [crate::error::ParseFault::GrammarDefect].
    pub fn contains_empty(&self) -> bool {
        self.empty
    }

    /// Strips the `EMPTY` marker. Used once the follower-set walk (§4.5)
    /// finishes climbing the stack, before handing the class to a caller.
    pub fn without_empty(mut self) -> Self {
        self.empty = false;
        self
    }

    /// Unions `other` into `self` in place.
    pub fn union_with(&mut self, other: &CharClass) {
        self.ranges.extend(other.ranges.iter().copied());
        self.eoi |= other.eoi;
        self.empty |= other.empty;
    }

    /// Returns the union of `self` and `other` as a new class.
    pub fn union(&self, other: &CharClass) -> CharClass {
        let mut result = self.clone();
        result.union_with(other);
        result
    }

    /// Whether `ch` is a member: an ordinary character is checked against
    /// the ranges, `EOI` against the `EOI` marker. `EMPTY` is never a member
    /// a caller tests for directly; use [CharClass::contains_empty].
    pub fn contains(&self, ch: InputChar) -> bool {
        match ch {
            InputChar::Eoi => self.eoi,
            InputChar::Char(ch) => self.ranges.iter().any(|&(lo, hi)| lo <= ch && ch <= hi),
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;

        let mut first = true;

        for &(lo, hi) in &self.ranges {
            if !first {
                write!(f, " ")?;
            }
            first = false;

            if lo == hi {
                write!(f, "{lo:?}")?;
            } else {
                write!(f, "{lo:?}-{hi:?}")?;
            }
        }

        if self.eoi {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "<EOI>")?;
        }

        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_membership() {
        let digits = CharClass::range('0', '9');
        assert!(digits.contains(InputChar::Char('5')));
        assert!(!digits.contains(InputChar::Char('a')));
        assert!(!digits.contains(InputChar::Eoi));
    }

    #[test]
    fn union_combines_markers() {
        let a = CharClass::single('a').with_empty();
        let b = CharClass::single('b').with_eoi();

        let combined = a.union(&b);
        assert!(combined.contains(InputChar::Char('a')));
        assert!(combined.contains(InputChar::Char('b')));
        assert!(combined.contains(InputChar::Eoi));
        assert!(combined.contains_empty());

        let stripped = combined.without_empty();
        assert!(!stripped.contains_empty());
    }
}
