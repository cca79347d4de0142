//! Syntactic predicates: `Test` (positive lookahead) and `TestNot`
//! (negative lookahead). Neither ever consumes input or contributes a
//! parse-tree node, including for whatever their operand matched (§4.3).

use std::borrow::Cow;
use std::rc::Rc;

use crate::char_class::CharClass;
use crate::context::MatcherContext;
use crate::error::ParseFault;
use crate::matcher::Matcher;

fn empty_predicate_defect(ctx: &MatcherContext, operand: &Rc<dyn Matcher>, rule: &str) -> ParseFault {
    let line_col = ctx.input_buffer().line_col(ctx.current_location().index());
    ParseFault::GrammarDefect {
        rule: rule.to_string(),
        line_col,
        detail: format!(
            "operand `{}` matched without consuming input short of end-of-input",
            operand.label()
        ),
    }
}

/// Positive lookahead: succeeds iff `operand` would match here, but never
/// advances the cursor or leaves a node behind.
#[derive(Debug)]
pub struct Test {
    operand: Rc<dyn Matcher>,
}

impl Test {
    /// Lookahead that succeeds iff `operand` matches at the current
    /// position.
    pub fn new(operand: Rc<dyn Matcher>) -> Self {
        Self { operand }
    }
}

impl Matcher for Test {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let before = ctx.current_location();
        let child_index = ctx.bind_sub(self.operand.clone());
        let matched = ctx.run_sub(child_index)?;

        let after = ctx.current_location();
        let buffer = ctx.input_buffer();
        let empty_match = matched && after == before && !after.current_char(buffer).is_eoi();

        ctx.set_current_location(before);

        if empty_match {
            return Err(empty_predicate_defect(ctx, &self.operand, "Test"));
        }

        Ok(matched)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("&{}", self.operand.label()))
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::none().with_empty()
    }

    fn is_predicate(&self) -> bool {
        true
    }
}

/// Negative lookahead: succeeds iff `operand` would *not* match here.
/// Otherwise behaves exactly like [Test].
#[derive(Debug)]
pub struct TestNot {
    operand: Rc<dyn Matcher>,
}

impl TestNot {
    /// Lookahead that succeeds iff `operand` does not match at the current
    /// position.
    pub fn new(operand: Rc<dyn Matcher>) -> Self {
        Self { operand }
    }
}

impl Matcher for TestNot {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        let before = ctx.current_location();
        let child_index = ctx.bind_sub(self.operand.clone());
        let matched = ctx.run_sub(child_index)?;

        let after = ctx.current_location();
        let buffer = ctx.input_buffer();
        let empty_match = matched && after == before && !after.current_char(buffer).is_eoi();

        ctx.set_current_location(before);

        if empty_match {
            return Err(empty_predicate_defect(ctx, &self.operand, "TestNot"));
        }

        Ok(!matched)
    }

    fn label(&self) -> Cow<'static, str> {
        Cow::Owned(format!("!{}", self.operand.label()))
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::none().with_empty()
    }

    fn is_predicate(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextArena;
    use crate::location::StrBuffer;
    use crate::matcher::combinators::Sequence;
    use crate::matcher::terminal::Str;
    use crate::recovery::Recovery;

    fn run(matcher: Rc<dyn Matcher>, text: &str) -> (bool, usize, usize) {
        let buffer = StrBuffer::new(text);
        let mut arena = ContextArena::new(&buffer, Rc::new(Recovery::default()));
        let mut ctx = arena.bind_root(matcher);
        let matched = crate::driver::run_matcher(&mut *ctx.frames, ctx.run, 0).unwrap();
        let index = ctx.current_location().index();
        let node_count = ctx.last_node().map_or(0, |node| node.sub_nodes.len());
        (matched, index, node_count)
    }

    #[test]
    fn test_does_not_consume_on_success() {
        // S4: Look = Test("x") "xy" against "xy": match, cursor at 2, one
        // node (the sequence) and the Test contributes none.
        let look = Sequence::new(vec![Rc::new(Test::new(Rc::new(Str::new("x")))), Rc::new(Str::new("xy"))]);
        let (matched, index, children) = run(Rc::new(look), "xy");
        assert!(matched);
        assert_eq!(index, 2);
        assert_eq!(children, 1);
    }

    #[test]
    fn test_fails_when_operand_does_not_match() {
        let look = Test::new(Rc::new(Str::new("x")));
        let (matched, index, _) = run(Rc::new(look), "y");
        assert!(!matched);
        assert_eq!(index, 0);
    }

    #[test]
    fn test_not_succeeds_when_operand_does_not_match() {
        let look = TestNot::new(Rc::new(Str::new("x")));
        let (matched, index, _) = run(Rc::new(look), "y");
        assert!(matched);
        assert_eq!(index, 0);
    }
}
