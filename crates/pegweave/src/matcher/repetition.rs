//! Repetition and optionality: `ZeroOrMore`, `OneOrMore`, `Optional`. All
//! three are [FollowMatcher]s, since the character right after one of them
//! legally includes both "another iteration starts here" and "whatever
//! comes after me" (§4.5).

use std::borrow::Cow;
use std::rc::Rc;

use crate::char_class::CharClass;
use crate::context::MatcherContext;
use crate::error::ParseFault;
use crate::matcher::{FollowMatcher, Matcher};

fn repetition_follower_chars(operand: &Rc<dyn Matcher>) -> CharClass {
    operand.starter_chars().without_empty().with_empty()
}

fn empty_match_defect(ctx: &MatcherContext, operand: &Rc<dyn Matcher>, rule: &str) -> ParseFault {
    let line_col = ctx.input_buffer().line_col(ctx.current_location().index());
    ParseFault::GrammarDefect {
        rule: rule.to_string(),
        line_col,
        detail: format!("operand `{}` matched without consuming input", operand.label()),
    }
}

/// Zero or more repetitions of `operand`, always succeeding.
#[derive(Debug)]
pub struct ZeroOrMore {
    operand: Rc<dyn Matcher>,
}

impl ZeroOrMore {
    /// Matches `operand` as many times as it succeeds, including zero.
    pub fn new(operand: Rc<dyn Matcher>) -> Self {
        Self { operand }
    }
}

impl Matcher for ZeroOrMore {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        loop {
            let before = ctx.current_location();
            let child_index = ctx.bind_sub(self.operand.clone());
            ctx.set_child_enforced(child_index, false);

            if !ctx.run_sub(child_index)? {
                break;
            }

            if ctx.current_location() == before {
                return Err(empty_match_defect(ctx, &self.operand, "ZeroOrMore"));
            }
        }

        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}*", self.operand.label()))
    }

    fn starter_chars(&self) -> CharClass {
        self.operand.starter_chars().without_empty().with_empty()
    }

    fn as_follow_matcher(&self) -> Option<&dyn FollowMatcher> {
        Some(self)
    }
}

impl FollowMatcher for ZeroOrMore {
    fn follower_chars(&self, _ctx: &MatcherContext) -> CharClass {
        repetition_follower_chars(&self.operand)
    }
}

/// One or more repetitions of `operand`; fails if it doesn't match at
/// least once.
#[derive(Debug)]
pub struct OneOrMore {
    operand: Rc<dyn Matcher>,
}

impl OneOrMore {
    /// Matches `operand` at least once, then as many further times as it
    /// succeeds.
    pub fn new(operand: Rc<dyn Matcher>) -> Self {
        Self { operand }
    }
}

impl Matcher for OneOrMore {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let first_index = ctx.bind_sub(self.operand.clone());
        ctx.set_child_enforced(first_index, false);

        if !ctx.run_sub(first_index)? {
            return Ok(false);
        }

        loop {
            let before = ctx.current_location();
            let child_index = ctx.bind_sub(self.operand.clone());
            ctx.set_child_enforced(child_index, false);

            if !ctx.run_sub(child_index)? {
                break;
            }

            if ctx.current_location() == before {
                return Err(empty_match_defect(ctx, &self.operand, "OneOrMore"));
            }
        }

        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}+", self.operand.label()))
    }

    fn starter_chars(&self) -> CharClass {
        self.operand.starter_chars()
    }

    fn as_follow_matcher(&self) -> Option<&dyn FollowMatcher> {
        Some(self)
    }
}

impl FollowMatcher for OneOrMore {
    fn follower_chars(&self, _ctx: &MatcherContext) -> CharClass {
        repetition_follower_chars(&self.operand)
    }
}

/// Zero or one occurrence of `operand`; always succeeds.
#[derive(Debug)]
pub struct Optional {
    operand: Rc<dyn Matcher>,
}

impl Optional {
    /// Matches `operand` if possible, otherwise succeeds trivially without
    /// consuming input.
    pub fn new(operand: Rc<dyn Matcher>) -> Self {
        Self { operand }
    }
}

impl Matcher for Optional {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let child_index = ctx.bind_sub(self.operand.clone());
        ctx.run_sub(child_index)?;
        ctx.create_node();
        Ok(true)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{}?", self.operand.label()))
    }

    fn starter_chars(&self) -> CharClass {
        self.operand.starter_chars().with_empty()
    }

    fn as_follow_matcher(&self) -> Option<&dyn FollowMatcher> {
        Some(self)
    }
}

impl FollowMatcher for Optional {
    fn follower_chars(&self, _ctx: &MatcherContext) -> CharClass {
        repetition_follower_chars(&self.operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextArena;
    use crate::location::StrBuffer;
    use crate::matcher::terminal::{CharSet, Str};
    use crate::recovery::Recovery;

    fn run(matcher: Rc<dyn Matcher>, text: &str) -> Result<(bool, usize), ParseFault> {
        let buffer = StrBuffer::new(text);
        let mut arena = ContextArena::new(&buffer, Rc::new(Recovery::default()));
        let mut ctx = arena.bind_root(matcher);
        let matched = crate::driver::run_matcher(&mut *ctx.frames, ctx.run, 0)?;
        let index = ctx.current_location().index();
        Ok((matched, index))
    }

    #[test]
    fn zero_or_more_consumes_every_repetition() {
        let digits = ZeroOrMore::new(Rc::new(CharSet::range('0', '9')));
        let (matched, index) = run(Rc::new(digits), "123x").unwrap();
        assert!(matched);
        assert_eq!(index, 3);
    }

    #[test]
    fn zero_or_more_succeeds_on_zero_repetitions() {
        let digits = ZeroOrMore::new(Rc::new(CharSet::range('0', '9')));
        let (matched, index) = run(Rc::new(digits), "x").unwrap();
        assert!(matched);
        assert_eq!(index, 0);
    }

    #[test]
    fn one_or_more_requires_at_least_one() {
        // S2: Digits = OneOrMore(CharRange('0','9')) against "42x".
        let digits = OneOrMore::new(Rc::new(CharSet::range('0', '9')));
        let (matched, index) = run(Rc::new(digits), "42x").unwrap();
        assert!(matched);
        assert_eq!(index, 2);
    }

    #[test]
    fn one_or_more_fails_with_zero_repetitions() {
        let digits = OneOrMore::new(Rc::new(CharSet::range('0', '9')));
        let (matched, index) = run(Rc::new(digits), "x").unwrap();
        assert!(!matched);
        assert_eq!(index, 0);
    }

    #[test]
    fn optional_always_succeeds() {
        let maybe_a = Optional::new(Rc::new(Str::new("a")));
        let (matched, index) = run(Rc::new(maybe_a), "x").unwrap();
        assert!(matched);
        assert_eq!(index, 0);
    }

    #[test]
    fn zero_or_more_of_an_empty_matching_operand_is_a_grammar_defect() {
        // S5: BadStar = ZeroOrMore(Optional("a")) against "aa" is a fault.
        let inner = Optional::new(Rc::new(Str::new("a")));
        let bad_star = ZeroOrMore::new(Rc::new(inner));
        let result = run(Rc::new(bad_star), "aa");
        assert!(matches!(result, Err(ParseFault::GrammarDefect { .. })));
    }
}
