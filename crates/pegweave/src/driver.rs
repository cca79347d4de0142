//! The driver loop: invokes a bound frame's matcher, applies enforced
//! recovery on failure, commits progress upward on success, and retires the
//! frame (§4.2).

use crate::context::{Frame, MatcherContext, RunState};
use crate::error::ParseFault;

/// Runs the matcher bound to `frames[child_index]` to completion.
///
/// This is the sole place that commits a child's `current_location` into
/// its parent, which is what makes an ordinary match failure equivalent to
/// "the parent's cursor never moved" (invariant P1) without any explicit
/// rollback step.
pub(crate) fn run_matcher(
    frames: &mut Vec<Frame>,
    run: &RunState<'_>,
    child_index: usize,
) -> Result<bool, ParseFault> {
    let matcher = frames[child_index]
        .matcher()
        .expect("run_matcher invoked on an unbound or already-retired frame");

    let matched = {
        let mut ctx = MatcherContext {
            frames: &mut *frames,
            run,
            index: child_index,
        };

        let mut matched = matcher.do_match(&mut ctx)?;

        if !matched && ctx.enforced() {
            matched = run.error_handler.handle_parse_error(&mut ctx);
        }

        matched
    };

    if matched {
        if let Some(parent_index) = frames[child_index].parent() {
            let end = frames[child_index].current_location();
            frames[parent_index].set_current_location(end);
        }
    }

    frames[child_index].retire();

    Ok(matched)
}
