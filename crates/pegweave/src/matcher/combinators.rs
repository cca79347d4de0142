//! `Sequence` and `FirstOf`: the two structural combinators every other
//! grammar shape is built from.

use std::borrow::Cow;
use std::rc::Rc;

use crate::char_class::CharClass;
use crate::context::MatcherContext;
use crate::error::ParseFault;
use crate::matcher::Matcher;

/// An ordered conjunction: every child must match, left to right, at the
/// position left by the previous one.
///
/// A `Sequence` may carry a cut point (`with_cut_after`): once the child at
/// that index has matched, every subsequent child's sub-context is bound
/// with `enforced` set, so a later failure is routed through the error
/// handler instead of simply propagating up as an ordinary "no match" —
/// the grammar author's way of saying "past this point, I know which rule
/// we're in."
#[derive(Debug)]
pub struct Sequence {
    children: Vec<Rc<dyn Matcher>>,
    cut_after: Option<usize>,
}

impl Sequence {
    /// A plain sequence with no cut point.
    pub fn new(children: Vec<Rc<dyn Matcher>>) -> Self {
        Self {
            children,
            cut_after: None,
        }
    }

    /// Marks the child at `index` (0-based) as the cut point: children
    /// after it run enforced.
    pub fn with_cut_after(mut self, index: usize) -> Self {
        self.cut_after = Some(index);
        self
    }
}

impl Matcher for Sequence {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        for (position, child) in self.children.iter().enumerate() {
            let child_index = ctx.bind_sub(child.clone());

            if self.cut_after.is_some_and(|cut| position > cut) {
                ctx.set_child_enforced(child_index, true);
            }

            if !ctx.run_sub(child_index)? {
                return Ok(false);
            }
        }

        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        let joined = self
            .children
            .iter()
            .map(|child| child.label().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        Cow::Owned(format!("({joined})"))
    }

    fn starter_chars(&self) -> CharClass {
        leading_starter_chars(&self.children)
    }
}

/// Ordered (committed) choice: tries each child in turn at the original
/// start position, stopping at the first success. Because a failing child
/// never commits its cursor upward, later alternatives always see the
/// sequence's own `start_location`, not wherever the previous failed
/// attempt got to.
#[derive(Debug)]
pub struct FirstOf {
    children: Vec<Rc<dyn Matcher>>,
}

impl FirstOf {
    /// An ordered choice among `children`, tried top to bottom.
    pub fn new(children: Vec<Rc<dyn Matcher>>) -> Self {
        Self { children }
    }
}

impl Matcher for FirstOf {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        for child in &self.children {
            let child_index = ctx.bind_sub(child.clone());

            if ctx.run_sub(child_index)? {
                ctx.create_node();
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn label(&self) -> Cow<'static, str> {
        let joined = self
            .children
            .iter()
            .map(|child| child.label().into_owned())
            .collect::<Vec<_>>()
            .join(" | ");
        Cow::Owned(format!("({joined})"))
    }

    fn starter_chars(&self) -> CharClass {
        let mut acc = CharClass::none();
        for child in &self.children {
            acc.union_with(&child.starter_chars());
        }
        acc
    }
}

/// Starter-set computation shared by any matcher whose children run in a
/// fixed left-to-right order: union starter sets while each child can
/// match empty, stop at (and include) the first that can't.
pub(crate) fn leading_starter_chars(children: &[Rc<dyn Matcher>]) -> CharClass {
    let mut acc = CharClass::none();

    for child in children {
        let starters = child.starter_chars();
        let can_be_empty = starters.contains_empty();
        acc.union_with(&starters.without_empty());

        if !can_be_empty {
            return acc;
        }
    }

    acc.with_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextArena;
    use crate::location::StrBuffer;
    use crate::matcher::terminal::Str;
    use crate::recovery::Recovery;

    fn run(matcher: Rc<dyn Matcher>, text: &str) -> (bool, usize) {
        let buffer = StrBuffer::new(text);
        let mut arena = ContextArena::new(&buffer, Rc::new(Recovery::default()));
        let mut ctx = arena.bind_root(matcher);
        let matched = crate::driver::run_matcher(&mut *ctx.frames, ctx.run, 0).unwrap();
        let index = ctx.current_location().index();
        (matched, index)
    }

    #[test]
    fn sequence_requires_every_child() {
        let seq = Sequence::new(vec![Rc::new(Str::new("a")), Rc::new(Str::new("b"))]);
        let (matched, index) = run(Rc::new(seq), "ab");
        assert!(matched);
        assert_eq!(index, 2);
    }

    #[test]
    fn sequence_fails_without_committing_past_first_child() {
        let seq = Sequence::new(vec![Rc::new(Str::new("a")), Rc::new(Str::new("b"))]);
        let (matched, index) = run(Rc::new(seq), "ax");
        assert!(!matched);
        assert_eq!(index, 0);
    }

    #[test]
    fn first_of_commits_to_the_first_alternative_that_matches() {
        // S3: FirstOf("foo", "foobar") against "foobar" matches only "foo".
        let choice = FirstOf::new(vec![Rc::new(Str::new("foo")), Rc::new(Str::new("foobar"))]);
        let (matched, index) = run(Rc::new(choice), "foobar");
        assert!(matched);
        assert_eq!(index, 3);
    }

    #[test]
    fn first_of_falls_through_to_a_later_alternative() {
        let choice = FirstOf::new(vec![Rc::new(Str::new("x")), Rc::new(Str::new("y"))]);
        let (matched, index) = run(Rc::new(choice), "y");
        assert!(matched);
        assert_eq!(index, 1);
    }
}
