//! Free-function constructors for assembling a grammar as ordinary Rust
//! expressions (A5) — there is no macro or parsed-DSL front end (§1).

use std::borrow::Cow;
use std::rc::Rc;

use crate::matcher::{
    Action, Char, CharSet, FirstOf, Matcher, Optional, OneOrMore, Proxy, Sequence, Str, Test, TestNot, ZeroOrMore,
};

/// A terminal matching one character.
pub fn ch(expected: char) -> Rc<dyn Matcher> {
    Rc::new(Char::new(expected))
}

/// A terminal matching any character in `lo..=hi`.
pub fn char_range(lo: char, hi: char) -> Rc<dyn Matcher> {
    Rc::new(CharSet::range(lo, hi))
}

/// A terminal matching one character out of `chars`.
pub fn char_set(chars: &str) -> Rc<dyn Matcher> {
    Rc::new(CharSet::new(crate::char_class::CharClass::of_str(chars)))
}

/// A terminal matching the literal string `text`.
pub fn string(text: impl Into<String>) -> Rc<dyn Matcher> {
    Rc::new(Str::new(text))
}

/// An ordered conjunction of `children`.
pub fn seq(children: Vec<Rc<dyn Matcher>>) -> Rc<dyn Matcher> {
    Rc::new(Sequence::new(children))
}

/// An ordered conjunction of `children` with a cut point after the child
/// at `cut_after`: later siblings run enforced, routing a later failure
/// through the error handler instead of an ordinary backtrack.
pub fn seq_cut(children: Vec<Rc<dyn Matcher>>, cut_after: usize) -> Rc<dyn Matcher> {
    Rc::new(Sequence::new(children).with_cut_after(cut_after))
}

/// Ordered (committed) choice among `children`.
pub fn first_of(children: Vec<Rc<dyn Matcher>>) -> Rc<dyn Matcher> {
    Rc::new(FirstOf::new(children))
}

/// Zero or more repetitions of `operand`.
pub fn zero_or_more(operand: Rc<dyn Matcher>) -> Rc<dyn Matcher> {
    Rc::new(ZeroOrMore::new(operand))
}

/// One or more repetitions of `operand`.
pub fn one_or_more(operand: Rc<dyn Matcher>) -> Rc<dyn Matcher> {
    Rc::new(OneOrMore::new(operand))
}

/// Zero or one occurrence of `operand`.
pub fn optional(operand: Rc<dyn Matcher>) -> Rc<dyn Matcher> {
    Rc::new(Optional::new(operand))
}

/// Positive lookahead: succeeds without consuming iff `operand` matches.
pub fn test(operand: Rc<dyn Matcher>) -> Rc<dyn Matcher> {
    Rc::new(Test::new(operand))
}

/// Negative lookahead: succeeds without consuming iff `operand` does not
/// match.
pub fn test_not(operand: Rc<dyn Matcher>) -> Rc<dyn Matcher> {
    Rc::new(TestNot::new(operand))
}

/// A semantic action labeled `label`.
pub fn action(
    label: impl Into<Cow<'static, str>>,
    routine: impl Fn(&mut crate::context::MatcherContext) -> Result<bool, String> + 'static,
) -> Rc<dyn Matcher> {
    Rc::new(Action::new(label, routine))
}

/// An unbound forward-reference placeholder; [Proxy::bind] it once the
/// real rule is constructed, to close a cycle in the grammar graph.
pub fn proxy() -> Rc<Proxy> {
    Proxy::new()
}
