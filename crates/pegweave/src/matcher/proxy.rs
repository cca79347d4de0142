//! Forward-reference indirection for cyclic grammars.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::char_class::CharClass;
use crate::context::MatcherContext;
use crate::error::ParseFault;
use crate::matcher::Matcher;

/// A placeholder matcher that stands in for a rule not yet constructed.
///
/// Grammars are graphs, not trees, and Rust values can't reference each
/// other cyclically without an indirection to fill in after the fact. A
/// `Proxy` is built empty with [Proxy::new], wired into whatever sequences
/// or choices need to refer to the rule being defined, and then completed
/// once with [Proxy::bind] after the real matcher exists. [super::unwrap_proxy]
/// (called by `bind_sub`, §4.1.2) follows the chain down to the concrete
/// matcher; `do_match` itself never sees a `Proxy`.
#[derive(Default)]
pub struct Proxy {
    target: RefCell<Option<Rc<dyn Matcher>>>,
}

impl Proxy {
    /// An unbound proxy. Must be [Proxy::bind]-ed before any grammar using
    /// it is parsed with.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            target: RefCell::new(None),
        })
    }

    /// Completes the forward reference. Idempotent rebinding is allowed
    /// (useful when a grammar is rebuilt), but a grammar must never be
    /// driven through an unbound proxy.
    pub fn bind(&self, target: Rc<dyn Matcher>) {
        *self.target.borrow_mut() = Some(target);
    }

    /// The bound target, if any.
    pub fn target(&self) -> Option<Rc<dyn Matcher>> {
        self.target.borrow().clone()
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("bound", &self.target.borrow().is_some())
            .finish()
    }
}

impl Matcher for Proxy {
    fn do_match(&self, ctx: &mut MatcherContext) -> Result<bool, ParseFault> {
        Err(ParseFault::Internal(format!(
            "unbound Proxy reached do_match directly at frame `{}`; bind_sub should have unwrapped it",
            ctx.path().join("/")
        )))
    }

    fn label(&self) -> Cow<'static, str> {
        match self.target() {
            Some(target) => Cow::Owned(target.label().into_owned()),
            None => Cow::Borrowed("<unbound proxy>"),
        }
    }

    fn starter_chars(&self) -> CharClass {
        match self.target() {
            Some(target) => target.starter_chars(),
            None => CharClass::none(),
        }
    }

    fn as_proxy(&self) -> Option<&Proxy> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::terminal::Str;

    #[test]
    fn unbound_proxy_has_no_starter_chars() {
        let proxy = Proxy::new();
        assert_eq!(proxy.starter_chars(), CharClass::none());
    }

    #[test]
    fn bound_proxy_forwards_label_and_starters() {
        let proxy = Proxy::new();
        proxy.bind(Rc::new(Str::new("ab")));

        assert_eq!(proxy.label(), Cow::Borrowed("\"ab\""));
        assert!(proxy.starter_chars().contains(crate::location::InputChar::Char('a')));
    }
}
