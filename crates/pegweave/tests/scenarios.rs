//! End-to-end scenarios (S1-S6) driven purely through the public API:
//! `Parser`, the `matcher::build` constructors, and a custom `ErrorHandler`.

use std::cell::RefCell;
use std::rc::Rc;

use pegweave::context::MatcherContext;
use pegweave::location::StrBuffer;
use pegweave::matcher::build::{action, char_range, first_of, one_or_more, seq, seq_cut, string, test};
use pegweave::recovery::ErrorHandler;
use pegweave::Parser;

#[test]
fn s1_literal_sequence_matches_and_consumes_fully() {
    let buffer = StrBuffer::new("ab");
    let run = Parser::new(&buffer).parse(string("ab")).unwrap();

    assert!(run.matched);
    assert!(run.fully_consumed);
    assert!(run.errors.is_empty());

    let node = run.node.unwrap();
    assert_eq!(node.label, "\"ab\"");
    assert_eq!(node.start.index(), 0);
    assert_eq!(node.end.index(), 2);
}

#[test]
fn s2_one_or_more_digits_stops_at_the_first_non_digit() {
    let buffer = StrBuffer::new("42x");
    let digits = one_or_more(char_range('0', '9'));
    let run = Parser::new(&buffer).parse(digits).unwrap();

    assert!(run.matched);
    assert!(!run.fully_consumed);

    let node = run.node.unwrap();
    assert_eq!(node.end.index(), 2);
    assert_eq!(node.sub_nodes.len(), 2);
}

#[test]
fn s3_first_of_commits_to_the_first_matching_alternative() {
    let buffer = StrBuffer::new("foobar");
    let word = first_of(vec![string("foo"), string("foobar")]);
    let run = Parser::new(&buffer).parse(word).unwrap();

    assert!(run.matched);
    assert!(!run.fully_consumed);
    assert_eq!(run.node.unwrap().end.index(), 3);
}

#[test]
fn s4_test_lookahead_never_consumes_or_leaves_a_node() {
    let buffer = StrBuffer::new("xy");
    let look = seq(vec![test(string("x")), string("xy")]);
    let run = Parser::new(&buffer).parse(look).unwrap();

    assert!(run.matched);
    assert!(run.fully_consumed);

    let node = run.node.unwrap();
    assert_eq!(node.end.index(), 2);
    // The `Test` contributes nothing: the sequence's only child is `"xy"`.
    assert_eq!(node.sub_nodes.len(), 1);
    assert_eq!(node.sub_nodes[0].label, "\"xy\"");
}

#[test]
fn a_test_operands_node_never_clobbers_last_node() {
    // P5: `last_node` after a parse equals the last node actually committed
    // in document order, never an orphaned node from a backtracked-away
    // predicate operand. `Str("b")` inside `test(...)` matches, but since
    // it never commits (the `Test` restores the cursor either way) its node
    // must not become the one an `Action` sees via `last_node()`.
    let buffer = StrBuffer::new("ab");
    let seen = Rc::new(RefCell::new(None));
    let seen_in_action = seen.clone();

    let grammar = seq(vec![
        string("a"),
        test(string("b")),
        action("check", move |ctx| {
            *seen_in_action.borrow_mut() = ctx.last_node().map(|node| node.label);
            Ok(true)
        }),
    ]);

    let run = Parser::new(&buffer).parse(grammar).unwrap();

    assert!(run.matched);
    assert_eq!(seen.borrow().as_deref(), Some("\"a\""));
}

#[test]
fn s5_zero_or_more_of_an_empty_matching_operand_is_a_grammar_fault() {
    use pegweave::matcher::build::{optional, zero_or_more};

    let buffer = StrBuffer::new("aa");
    let bad_star = zero_or_more(optional(string("a")));
    let result = Parser::new(&buffer).parse(bad_star);

    assert!(matches!(result, Err(pegweave::ParseFault::GrammarDefect { .. })));
}

/// A handler that always skips exactly one character and reports recovered,
/// regardless of the follower set — just enough to exercise S6's enforced
/// cut point without depending on the shipped `Recovery` strategy's window
/// search.
struct SkipOne;

impl ErrorHandler for SkipOne {
    fn handle_parse_error(&self, ctx: &mut MatcherContext) -> bool {
        let buffer = ctx.input_buffer();
        let next = ctx.current_location().advance(buffer);
        ctx.report_action_error(format!("skipped one character near `{}`", ctx.path().join("/")));
        ctx.set_current_location(next);
        true
    }
}

#[test]
fn s6_a_cut_point_routes_a_later_failure_through_the_error_handler() {
    // S = "a" <cut> "b", input "ax": recovers by skipping the "x", then
    // treats the cut child as matched, so the whole sequence matches.
    let buffer = StrBuffer::new("ax");
    let grammar = seq_cut(vec![string("a"), string("b")], 0);

    let run = Parser::new(&buffer)
        .with_recovery(SkipOne)
        .parse(grammar)
        .unwrap();

    assert!(run.matched);
    assert!(run.fully_consumed);
    assert_eq!(run.errors.len(), 1);
    assert_eq!(run.errors[0].location.index(), 1);
    assert_eq!(run.errors[0].path, vec!["(\"a\" \"b\")".to_string(), "\"b\"".to_string()]);
}
