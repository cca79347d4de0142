//! `Action`: a semantic routine spliced into the grammar graph. Actions
//! carry application-specific values explicitly; this crate performs no
//! automatic AST synthesis (a Non-goal).

use std::borrow::Cow;
use std::fmt;

use crate::char_class::CharClass;
use crate::context::MatcherContext;
use crate::error::ParseFault;
use crate::matcher::Matcher;

/// A semantic routine run against the live context.
///
/// The routine consumes no input and binds no children — it reads and
/// writes [MatcherContext::node_value]/[MatcherContext::int_tag] (or any
/// externally reachable scope its closure captures) and reports success,
/// ordinary failure, or an `ActionError` message. An `Err` is the Rust
/// rendition of "the action throws `ActionError`" (§4.3): it is recorded
/// through [MatcherContext::report_action_error] and folds into an
/// ordinary match failure, never into [ParseFault].
pub struct Action {
    label: Cow<'static, str>,
    routine: Box<dyn Fn(&mut MatcherContext) -> Result<bool, String>>,
}

impl Action {
    /// An action labeled `label`, running `routine` when matched.
    pub fn new(
        label: impl Into<Cow<'static, str>>,
        routine: impl Fn(&mut MatcherContext) -> Result<bool, String> + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            routine: Box::new(routine),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("label", &self.label).finish()
    }
}

impl Matcher for Action {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        match (self.routine)(ctx) {
            Ok(outcome) => Ok(outcome),
            Err(message) => {
                ctx.report_action_error(message);
                Ok(false)
            }
        }
    }

    fn label(&self) -> Cow<'static, str> {
        self.label.clone()
    }

    fn starter_chars(&self) -> CharClass {
        CharClass::none().with_empty()
    }
}
