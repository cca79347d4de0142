//! The two kinds of trouble a parse can report: recoverable [ParseError]s
//! and fatal [ParseFault]s (see §7 of the spec).

use std::fmt;

use thiserror::Error;

use crate::location::InputLocation;

/// A recoverable parse error: an [crate::matcher::Action] reported failure,
/// or the [crate::recovery::ErrorHandler] emitted a diagnostic while
/// resynchronising. Appended to [crate::parser::ParseRun::errors] and does
/// not by itself abort the parse.
#[derive(Clone, Debug, Error)]
pub struct ParseError {
    /// Cursor position where the failure was recorded.
    pub location: InputLocation,
    /// 1-based `(line, column)` of [ParseError::location], resolved against
    /// the buffer at the time the error was recorded.
    pub line_col: (usize, usize),
    /// Chain of rule labels from the root to the frame that failed, as
    /// produced by [crate::context::MatcherContext::path].
    pub path: Vec<String>,
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.line_col;
        write!(
            f,
            "{} at {}:{} (in {})",
            self.message,
            line,
            column,
            self.path.join("/")
        )
    }
}

/// A fatal parser fault: propagated with `?` up through every enclosing
/// [crate::matcher::Matcher::do_match] call to [crate::parser::Parser::parse],
/// which aborts the parse and returns the fault to the caller.
///
/// Faults signal a broken grammar or a broken action, never merely
/// unexpected input — bad input is always a [ParseError] or a plain match
/// failure instead.
#[derive(Clone, Debug, Error)]
pub enum ParseFault {
    /// A repetition or predicate operand matched without consuming input
    /// (and the current character was not `EOI`). Raised by `ZeroOrMore`,
    /// `OneOrMore`, `Test`, and `TestNot` per §4.3/§7.
    #[error("grammar defect in rule `{rule}` at {}:{}: {detail}", .line_col.0, .line_col.1)]
    GrammarDefect {
        /// Label of the rule whose operand matched empty.
        rule: String,
        /// 1-based `(line, column)` where the defect was detected.
        line_col: (usize, usize),
        /// Description of the offending operand.
        detail: String,
    },

    /// A user-supplied [crate::matcher::Action] closure panicked. Caught at
    /// the [crate::parser::Parser::parse] boundary with
    /// `std::panic::catch_unwind` and re-raised as this variant so that a
    /// buggy action cannot unwind through library internals.
    #[error("action panicked in rule `{rule}`: {payload}")]
    ActionPanicked {
        /// Label of the rule whose action panicked.
        rule: String,
        /// Panic payload, downcast to a string when possible.
        payload: String,
    },

    /// Any other condition that does not fit the two variants above (for
    /// instance a malformed context index surfaced by a third-party
    /// `Matcher` implementor). Carries no rule or location, only a
    /// free-form description.
    #[error("internal parser fault: {0}")]
    Internal(String),
}
