//! Terminal matchers: single characters, character sets, and literal
//! strings. These are the leaves of a matcher graph — they consume input
//! directly rather than delegating to sub-contexts.

use std::borrow::Cow;

use crate::char_class::CharClass;
use crate::context::MatcherContext;
use crate::error::ParseFault;
use crate::location::InputChar;
use crate::matcher::Matcher;

/// Matches one specific character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Char {
    expected: char,
}

impl Char {
    /// A terminal matching exactly `expected`.
    pub fn new(expected: char) -> Self {
        Self { expected }
    }
}

impl Matcher for Char {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let buffer = ctx.input_buffer();
        if ctx.current_location().current_char(buffer) == InputChar::Char(self.expected) {
            ctx.advance_input_location();
            ctx.create_node();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{:?}", self.expected))
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::single(self.expected)
    }
}

/// Matches one character out of a [CharClass].
#[derive(Clone, Debug)]
pub struct CharSet {
    class: CharClass,
}

impl CharSet {
    /// A terminal matching any character in `class`.
    pub fn new(class: CharClass) -> Self {
        Self { class }
    }

    /// Convenience constructor for an inclusive character range.
    pub fn range(lo: char, hi: char) -> Self {
        Self::new(CharClass::range(lo, hi))
    }
}

impl Matcher for CharSet {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let buffer = ctx.input_buffer();
        let ch = ctx.current_location().current_char(buffer);

        if !ch.is_eoi() && self.class.contains(ch) {
            ctx.advance_input_location();
            ctx.create_node();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(self.class.to_string())
    }

    fn starter_chars(&self) -> CharClass {
        self.class.clone()
    }
}

/// Matches a literal, fixed-length string.
#[derive(Clone, Debug)]
pub struct Str {
    text: String,
}

impl Str {
    /// A terminal matching `text` verbatim.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Matcher for Str {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let buffer = ctx.input_buffer();
        let mut probe = ctx.current_location();

        for expected in self.text.chars() {
            if probe.current_char(buffer) != InputChar::Char(expected) {
                return Ok(false);
            }
            probe = probe.advance(buffer);
        }

        ctx.set_current_location(probe);
        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{:?}", self.text))
    }

    fn starter_chars(&self) -> CharClass {
        match self.text.chars().next() {
            Some(first) => CharClass::single(first),
            None => CharClass::none().with_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextArena;
    use crate::location::StrBuffer;
    use crate::recovery::Recovery;
    use std::rc::Rc;

    fn run(matcher: Rc<dyn Matcher>, text: &str) -> (bool, usize) {
        let buffer = StrBuffer::new(text);
        let mut arena = ContextArena::new(&buffer, Rc::new(Recovery::default()));
        let mut ctx = arena.bind_root(matcher);
        let matched = crate::driver::run_matcher(&mut *ctx.frames, ctx.run, 0).unwrap();
        let index = ctx.current_location().index();
        (matched, index)
    }

    #[test]
    fn char_matches_and_advances() {
        let (matched, index) = run(Rc::new(Char::new('a')), "ab");
        assert!(matched);
        assert_eq!(index, 1);
    }

    #[test]
    fn char_mismatch_fails_without_advancing() {
        let (matched, index) = run(Rc::new(Char::new('z')), "ab");
        assert!(!matched);
        assert_eq!(index, 0);
    }

    #[test]
    fn char_set_matches_range() {
        let (matched, index) = run(Rc::new(CharSet::range('0', '9')), "5x");
        assert!(matched);
        assert_eq!(index, 1);
    }

    #[test]
    fn str_matches_whole_literal() {
        let (matched, index) = run(Rc::new(Str::new("ab")), "ab");
        assert!(matched);
        assert_eq!(index, 2);
    }

    #[test]
    fn str_partial_match_fails_cleanly() {
        let (matched, index) = run(Rc::new(Str::new("abc")), "abx");
        assert!(!matched);
        assert_eq!(index, 0);
    }
}
