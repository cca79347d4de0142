//! The `Parser` facade (A1): the single public entry point that drives a
//! root matcher to completion over a buffer.

use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::context::ContextArena;
use crate::error::{ParseError, ParseFault};
use crate::location::InputBuffer;
use crate::matcher::Matcher;
use crate::recovery::{ErrorHandler, Recovery};
use crate::tree::ParseNode;

/// Owns the buffer and recovery strategy for one parse and exposes the
/// single entry point, [Parser::parse].
pub struct Parser<'a> {
    buffer: &'a dyn InputBuffer,
    recovery: Rc<dyn ErrorHandler>,
}

impl<'a> Parser<'a> {
    /// A parser over `buffer`, with the default [Recovery] strategy.
    pub fn new(buffer: &'a dyn InputBuffer) -> Self {
        Self {
            buffer,
            recovery: Rc::new(Recovery::default()),
        }
    }

    /// Replaces the error-recovery strategy.
    pub fn with_recovery(mut self, recovery: impl ErrorHandler + 'static) -> Self {
        self.recovery = Rc::new(recovery);
        self
    }

    /// Drives `root` against the buffer to completion.
    ///
    /// A genuine panic inside a user [crate::matcher::Action] closure is
    /// caught here (the only place in this crate that calls
    /// `catch_unwind`) and converted into [ParseFault::ActionPanicked], so
    /// a buggy action can never unwind through the matcher-context stack.
    pub fn parse(self, root: Rc<dyn Matcher>) -> Result<ParseRun, ParseFault> {
        let mut arena = ContextArena::new(self.buffer, self.recovery);
        let root_label = root.label().into_owned();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = arena.bind_root(root);
            crate::driver::run_matcher(&mut *ctx.frames, ctx.run, 0)
        }));

        let matched = match outcome {
            Ok(result) => result?,
            Err(payload) => {
                return Err(ParseFault::ActionPanicked {
                    rule: root_label,
                    payload: panic_payload_message(payload),
                });
            }
        };

        let node = arena.frames[0].node();
        let errors = arena.run.errors.borrow().clone();
        let fully_consumed = arena.frames[0].current_location().index() == self.buffer.len();

        Ok(ParseRun {
            matched,
            node,
            errors,
            fully_consumed,
        })
    }
}

fn panic_payload_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "action panicked with a non-string payload".to_string()
    }
}

/// The result of [Parser::parse]: whether the root matched, the resulting
/// tree (if any), every recoverable error logged along the way, and
/// whether the match consumed the entire buffer.
#[derive(Debug)]
pub struct ParseRun {
    /// Whether the root matcher matched at all.
    pub matched: bool,
    /// The root [ParseNode], present whenever `matched` is `true` and the
    /// root matcher is not itself suppressed (leaf/without-node/predicate).
    pub node: Option<ParseNode>,
    /// Every [ParseError] recorded during the run, in discovery order.
    pub errors: Vec<ParseError>,
    /// Whether the match consumed the buffer all the way to `EOI`.
    pub fully_consumed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::StrBuffer;
    use crate::matcher::build::string;

    #[test]
    fn successful_parse_reports_the_root_node_and_full_consumption() {
        // S1: A = "ab" against "ab".
        let buffer = StrBuffer::new("ab");
        let run = Parser::new(&buffer).parse(string("ab")).unwrap();

        assert!(run.matched);
        assert!(run.fully_consumed);
        let node = run.node.unwrap();
        assert_eq!(node.label, "\"ab\"");
        assert_eq!(node.end.index(), 2);
    }

    #[test]
    fn failed_parse_reports_no_node_and_no_full_consumption() {
        let buffer = StrBuffer::new("xy");
        let run = Parser::new(&buffer).parse(string("ab")).unwrap();

        assert!(!run.matched);
        assert!(run.node.is_none());
        assert!(!run.fully_consumed);
    }

    #[test]
    fn panicking_action_is_converted_into_a_parser_fault() {
        let buffer = StrBuffer::new("");
        let boom = crate::matcher::build::action("boom", |_ctx| panic!("kaboom"));

        let result = Parser::new(&buffer).parse(boom);
        assert!(matches!(result, Err(ParseFault::ActionPanicked { .. })));
    }
}
