//! The follower-set walk (§4.5): computes the alphabet legal immediately
//! after the point of failure, by climbing the live context stack and
//! asking each [FollowMatcher] ancestor what can follow it.

use crate::char_class::CharClass;
use crate::context::MatcherContext;
use crate::matcher::FollowMatcher;

/// Walks from `ctx` parent-ward, unioning `follower_chars` from every
/// ancestor that is a [FollowMatcher]. Stops early once the accumulator no
/// longer carries the `EMPTY` marker — that marker means "still depends on
/// what follows the ancestor," so its absence means the set is complete.
/// The result never carries `EMPTY`; `EOI` is always a member, since
/// running off the end of input is always a legal way to stop.
pub fn current_follower_chars(ctx: &mut MatcherContext) -> CharClass {
    let mut acc = CharClass::none().with_empty();
    let mut cursor = Some(ctx.index);

    while let Some(index) = cursor {
        let matcher = ctx.frames[index].matcher();

        if let Some(matcher) = matcher {
            if let Some(follow) = matcher.as_follow_matcher() {
                let ancestor_ctx = MatcherContext {
                    frames: &mut *ctx.frames,
                    run: ctx.run,
                    index,
                };
                acc.union_with(&follow.follower_chars(&ancestor_ctx));
            }
        }

        if !acc.contains_empty() {
            return acc.without_empty().with_eoi();
        }

        cursor = ctx.frames[index].parent();
    }

    acc.without_empty().with_eoi()
}
