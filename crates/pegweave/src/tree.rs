//! The parse tree ([ParseNode]) assembled by a successful parse.
//!
//! Construction rules (leaf suppression, predicate suppression,
//! "without-node" forwarding, and the right-biased value fold) live on
//! [crate::context::MatcherContext::create_node] — §4.4 of the spec — since
//! they need the live context's matcher and parent to decide what to do.
//! This module only defines the immutable node shape and the fold itself.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::location::InputLocation;

/// A value attached to a [ParseNode] by a semantic action.
///
/// Actions carry application-specific values explicitly (this crate
/// performs no automatic AST synthesis, per the spec's Non-goals); `Rc<dyn Any>`
/// lets a grammar attach anything `'static` without this crate needing to
/// know its shape.
pub type NodeValue = Rc<dyn Any>;

/// An immutable parse-tree node, built once by
/// [crate::context::MatcherContext::create_node] and never mutated again.
///
/// With the `serde` feature enabled, `ParseNode` serializes its structural
/// shape (label, span, children); `value` is grammar-specific (`Rc<dyn Any>`)
/// and has no general serialization, so it is skipped rather than guessed at.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseNode {
    /// Display name of the matcher that produced this node (the rule name,
    /// or an operator-synthesised label for anonymous combinators).
    pub label: String,
    /// Children, in left-to-right match order.
    pub sub_nodes: Vec<ParseNode>,
    /// Cursor position at the start of the match.
    pub start: InputLocation,
    /// Cursor position at the end of the match.
    pub end: InputLocation,
    /// This node's value: either set explicitly by an action, or folded
    /// from the children by [tree_value].
    #[cfg_attr(feature = "serde", serde(skip))]
    pub value: Option<NodeValue>,
}

impl ParseNode {
    /// Downcasts [ParseNode::value] to `T`, or `None` if unset or of a
    /// different type.
    pub fn value_as<T: 'static>(&self) -> Option<&T> {
        self.value.as_deref().and_then(|value| value.downcast_ref::<T>())
    }
}

impl fmt::Debug for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseNode")
            .field("label", &self.label)
            .field("start", &self.start.index())
            .field("end", &self.end.index())
            .field("sub_nodes", &self.sub_nodes)
            .finish()
    }
}

/// The tree-value fold (§4.4): an explicit `node_value` wins; otherwise the
/// value is inherited from the right-most child that has one, else `None`.
///
/// Right-biased rather than left-biased because in a left-to-right grammar
/// the last matched child is usually the most specific one (e.g. the tail
/// of a left-recursion-free expression chain), and changing this direction
/// is observable per the spec's open questions — it must not be "fixed" to
/// left-biased later.
pub fn tree_value(node_value: Option<NodeValue>, sub_nodes: &[ParseNode]) -> Option<NodeValue> {
    if let Some(value) = node_value {
        return Some(value);
    }

    sub_nodes.iter().rev().find_map(|node| node.value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::InputLocation;

    fn leaf(label: &str, value: Option<NodeValue>) -> ParseNode {
        ParseNode {
            label: label.to_string(),
            sub_nodes: Vec::new(),
            start: InputLocation::start(),
            end: InputLocation::start(),
            value,
        }
    }

    #[test]
    fn explicit_value_wins() {
        let explicit: NodeValue = Rc::new(42i32);
        let children = vec![leaf("a", Some(Rc::new(1i32)))];

        let folded = tree_value(Some(explicit), &children).unwrap();
        assert_eq!(*folded.downcast_ref::<i32>().unwrap(), 42);
    }

    #[test]
    fn falls_back_to_rightmost_non_null_child() {
        let children = vec![
            leaf("a", Some(Rc::new(1i32))),
            leaf("b", None),
            leaf("c", Some(Rc::new(3i32))),
        ];

        let folded = tree_value(None, &children).unwrap();
        assert_eq!(*folded.downcast_ref::<i32>().unwrap(), 3);
    }

    #[test]
    fn no_value_anywhere_folds_to_none() {
        let children = vec![leaf("a", None)];
        assert!(tree_value(None, &children).is_none());
    }
}
