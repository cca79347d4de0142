//! The matcher trait and the built-in variants that implement it.
//!
//! A [Matcher] is one node in the (possibly cyclic) grammar graph. Grammars
//! are assembled directly as Rust values via [crate::matcher::build]; there
//! is no macro or DSL front end (out of scope, per §1).

mod action;
mod combinators;
mod predicate;
mod proxy;
mod repetition;
mod terminal;

pub mod build;

pub use action::Action;
pub use combinators::{FirstOf, Sequence};
pub use predicate::{Test, TestNot};
pub use proxy::Proxy;
pub use repetition::{OneOrMore, Optional, ZeroOrMore};
pub use terminal::{Char, CharSet, Str};

use std::borrow::Cow;
use std::fmt::Debug;
use std::rc::Rc;

use crate::char_class::CharClass;
use crate::context::MatcherContext;
use crate::error::ParseFault;

/// A node in the grammar graph.
///
/// Implementors are plain Rust structs held behind `Rc<dyn Matcher>`: the
/// grammar graph is built once, shared freely, and may be cyclic (see
/// [Proxy] for how forward references close such cycles). The trait is
/// open — a third-party `Matcher` composes with the built-ins exactly like
/// one of them, since nothing here depends on a closed enum.
pub trait Matcher: Debug {
    /// Runs this matcher against `ctx`, whose `current_location` starts
    /// equal to `start_location` (invariant 1). Returns `Ok(true)` on match,
    /// `Ok(false)` on ordinary failure (the context's cursor must then be
    /// left as found — [crate::driver::run_matcher] enforces this by simply
    /// not committing it upward), and `Err` only for a fatal
    /// [ParseFault] that should abort the whole parse.
    ///
    /// A failing [Action] reports its failure through
    /// [MatcherContext::report_action_error] and returns `Ok(false)`; it
    /// must never turn an ordinary action failure into `Err`.
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault>;

    /// Display name: the rule name for a named rule, or an
    /// operator-synthesised string (e.g. `"\"ab\""`, `"(a | b)"`) for an
    /// anonymous combinator.
    fn label(&self) -> Cow<'static, str>;

    /// When `true`, a successful match does not create its own parse-tree
    /// node; its children are adopted directly by the parent instead.
    fn is_without_node(&self) -> bool {
        false
    }

    /// When `true`, everything below this matcher runs "below leaf level":
    /// no parse-tree nodes are produced for any descendant, however deep.
    fn is_leaf(&self) -> bool {
        false
    }

    /// The set of characters that may begin a successful match of this
    /// matcher. Used by the follower-set walk and by diagnostics; operands
    /// of repetition/predicate matchers must never report the `EMPTY`
    /// marker here (an empty-matching operand is a grammar defect, not a
    /// character-set fact).
    fn starter_chars(&self) -> CharClass;

    /// Returns `self` as a [FollowMatcher] when this matcher knows what can
    /// legally follow it at its own stack level (repetition, optional).
    /// Most matchers return `None`.
    fn as_follow_matcher(&self) -> Option<&dyn FollowMatcher> {
        None
    }

    /// `true` for `Test`/`TestNot`: used by
    /// [MatcherContext::create_node] to suppress node creation, and by
    /// [MatcherContext::in_predicate] to recognise a predicate frame
    /// without downcasting.
    fn is_predicate(&self) -> bool {
        false
    }

    /// `Some(self)` only for [Proxy]. Lets `bind_sub` recognise and unwrap
    /// a forward-reference indirection without a general-purpose
    /// downcasting mechanism; every other matcher keeps the default.
    fn as_proxy(&self) -> Option<&Proxy> {
        None
    }
}

/// Implemented by matchers that can describe what legally follows them at
/// their own level in the live stack — repetition and optional variants.
/// Consulted by the follower-set walk (`crate::follower`) when computing
/// the resynchronisation alphabet for error recovery.
pub trait FollowMatcher: Matcher {
    /// The set of characters legal immediately after this matcher, given
    /// the live frame `ctx` currently executing it. Includes the `EMPTY`
    /// marker when the matcher's own completion adds nothing certain (e.g.
    /// a `ZeroOrMore` that could stop at any point also inherits whatever
    /// follows it), signalling the walk to keep climbing.
    fn follower_chars(&self, ctx: &MatcherContext) -> CharClass;
}

/// Unwraps a (possibly chained) [Proxy] down to the concrete matcher it
/// ultimately refers to. Used by `bind_sub` (§4.1.2): proxies exist only to
/// break cycles during grammar construction and are never visible to
/// `do_match`.
pub fn unwrap_proxy(matcher: Rc<dyn Matcher>) -> Rc<dyn Matcher> {
    let mut current = matcher;

    loop {
        let target = match current.as_proxy() {
            Some(proxy) => proxy.target(),
            None => return current,
        };

        match target {
            Some(target) => current = target,
            None => return current,
        }
    }
}
