//! The matcher-context stack: per-invocation frames, their binding/reuse
//! discipline, and the state every matcher and action reads or writes
//! through [MatcherContext].

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{ParseError, ParseFault};
use crate::location::{InputBuffer, InputLocation};
use crate::matcher::{unwrap_proxy, Matcher};
use crate::recovery::ErrorHandler;
use crate::tree::{tree_value, NodeValue, ParseNode};

/// One rule-invocation frame. Frames live in [MatcherContext]'s arena,
/// indexed by depth, and are reused rather than freed: `matcher == None`
/// marks a retired, reusable slot (invariant 4).
#[derive(Debug)]
pub(crate) struct Frame {
    matcher: Option<Rc<dyn Matcher>>,
    parent: Option<usize>,
    sub_context: Option<usize>,
    start_location: InputLocation,
    current_location: InputLocation,
    sub_nodes: Option<Vec<ParseNode>>,
    node: Option<ParseNode>,
    node_value: Option<NodeValue>,
    below_leaf_level: bool,
    enforced: bool,
    int_tag: i64,
    level: usize,
}

impl Frame {
    fn root() -> Self {
        Self {
            matcher: None,
            parent: None,
            sub_context: None,
            start_location: InputLocation::start(),
            current_location: InputLocation::start(),
            sub_nodes: None,
            node: None,
            node_value: None,
            below_leaf_level: false,
            enforced: false,
            int_tag: 0,
            level: 0,
        }
    }

    fn empty_at(level: usize) -> Self {
        Self {
            level,
            ..Self::root()
        }
    }

    pub(crate) fn matcher(&self) -> Option<Rc<dyn Matcher>> {
        self.matcher.clone()
    }

    pub(crate) fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub(crate) fn current_location(&self) -> InputLocation {
        self.current_location.clone()
    }

    pub(crate) fn node(&self) -> Option<ParseNode> {
        self.node.clone()
    }

    pub(crate) fn set_current_location(&mut self, location: InputLocation) {
        self.current_location = location;
    }

    /// Marks this frame retired (matcher <- None), making it eligible for
    /// reuse by its parent's next `bind_sub` call (invariant 4).
    pub(crate) fn retire(&mut self) {
        self.matcher = None;
    }
}

/// Shared, per-run state handed by reference to every [MatcherContext]:
/// the input buffer, the append-only parse-error list, the single-slot
/// `last_node` cell, and the error-recovery strategy.
pub(crate) struct RunState<'a> {
    pub buffer: &'a dyn InputBuffer,
    pub errors: RefCell<Vec<ParseError>>,
    pub last_node: RefCell<Option<ParseNode>>,
    pub error_handler: Rc<dyn ErrorHandler>,
}

/// The arena of frames for one parse run, plus the shared [RunState].
/// Owned by [crate::parser::Parser]; a [MatcherContext] is a transient view
/// into it for the duration of one `do_match`/recovery call.
pub(crate) struct ContextArena<'a> {
    pub frames: Vec<Frame>,
    pub run: RunState<'a>,
}

impl<'a> ContextArena<'a> {
    pub fn new(buffer: &'a dyn InputBuffer, error_handler: Rc<dyn ErrorHandler>) -> Self {
        Self {
            frames: vec![Frame::root()],
            run: RunState {
                buffer,
                errors: RefCell::new(Vec::new()),
                last_node: RefCell::new(None),
                error_handler,
            },
        }
    }

    /// Binds the root frame (index 0) to `matcher` and returns a context
    /// view onto it, ready for the driver to run.
    pub fn bind_root(&mut self, matcher: Rc<dyn Matcher>) -> MatcherContext<'_> {
        let unwrapped = unwrap_proxy(matcher);
        self.frames[0] = Frame {
            matcher: Some(unwrapped),
            ..Frame::root()
        };

        MatcherContext {
            frames: &mut self.frames,
            run: &self.run,
            index: 0,
        }
    }
}

/// The handle every [Matcher::do_match] and [crate::matcher::Action]
/// closure receives: a view into one frame of the live context stack, plus
/// the state shared across the whole parse.
pub struct MatcherContext<'a> {
    pub(crate) frames: &'a mut Vec<Frame>,
    pub(crate) run: &'a RunState<'a>,
    pub(crate) index: usize,
}

impl<'a> MatcherContext<'a> {
    fn frame(&self) -> &Frame {
        &self.frames[self.index]
    }

    fn frame_mut(&mut self) -> &mut Frame {
        let index = self.index;
        &mut self.frames[index]
    }

    /// Re-borrows this context as one over the same frame, for a strictly
    /// shorter lifetime. Lets a `Matcher` pass its `ctx` on to a helper
    /// without moving it.
    pub fn reborrow(&mut self) -> MatcherContext<'_> {
        MatcherContext {
            frames: &mut *self.frames,
            run: self.run,
            index: self.index,
        }
    }

    // -- read-only state -----------------------------------------------

    /// The buffer backing this parse.
    pub fn input_buffer(&self) -> &dyn InputBuffer {
        self.run.buffer
    }

    /// Snapshot of the errors recorded so far.
    pub fn parse_errors(&self) -> std::cell::Ref<'_, Vec<ParseError>> {
        self.run.errors.borrow()
    }

    /// Cursor at entry to this frame.
    pub fn start_location(&self) -> InputLocation {
        self.frame().start_location.clone()
    }

    /// Cursor as of right now.
    pub fn current_location(&self) -> InputLocation {
        self.frame().current_location.clone()
    }

    /// The matcher bound to this frame (`None` if retired, which should
    /// never be observable from inside `do_match`).
    pub fn matcher(&self) -> Option<Rc<dyn Matcher>> {
        self.frame().matcher.clone()
    }

    /// Index of the enclosing frame, `None` at the root.
    pub fn parent(&self) -> Option<usize> {
        self.frame().parent
    }

    /// Index of this frame's reusable child slot, if it has ever bound one.
    pub fn sub_context(&self) -> Option<usize> {
        self.frame().sub_context
    }

    /// Depth of this frame, for diagnostics.
    pub fn level(&self) -> usize {
        self.frame().level
    }

    /// Chain of matcher labels from the root down to this frame.
    pub fn path(&self) -> Vec<String> {
        let mut labels = Vec::new();
        let mut cursor = Some(self.index);

        while let Some(index) = cursor {
            let frame = &self.frames[index];
            if let Some(matcher) = &frame.matcher {
                labels.push(matcher.label().into_owned());
            }
            cursor = frame.parent;
        }

        labels.reverse();
        labels
    }

    /// Children accumulated so far, in match order.
    pub fn sub_nodes(&self) -> &[ParseNode] {
        self.frame().sub_nodes.as_deref().unwrap_or(&[])
    }

    /// The most recently published node across the whole run.
    pub fn last_node(&self) -> Option<ParseNode> {
        self.run.last_node.borrow().clone()
    }

    /// `true` if this frame or any ancestor is a `Test`/`TestNot` frame.
    pub fn in_predicate(&self) -> bool {
        let mut cursor = Some(self.index);

        while let Some(index) = cursor {
            let frame = &self.frames[index];
            if frame.matcher.as_ref().is_some_and(|m| m.is_predicate()) {
                return true;
            }
            cursor = frame.parent;
        }

        false
    }

    /// `true` if this frame runs below a leaf rule (no node will ever be
    /// produced for it or any of its descendants).
    pub fn is_below_leaf_level(&self) -> bool {
        self.frame().below_leaf_level
    }

    // -- read/write state -------------------------------------------------

    /// The value an action has attached to this frame, if any.
    pub fn node_value(&self) -> Option<NodeValue> {
        self.frame().node_value.clone()
    }

    /// Sets the value an action attaches to this frame; read back by
    /// [tree_value] when the node is created.
    pub fn set_node_value(&mut self, value: NodeValue) {
        self.frame_mut().node_value = Some(value);
    }

    /// Scratch integer available to actions across the lifetime of this
    /// frame (reset to `0` on each (re)binding).
    pub fn int_tag(&self) -> i64 {
        self.frame().int_tag
    }

    /// Sets the scratch integer.
    pub fn set_int_tag(&mut self, value: i64) {
        self.frame_mut().int_tag = value;
    }

    /// Whether a later failure in this frame (or frames bound after it)
    /// should be routed through the error handler.
    pub fn enforced(&self) -> bool {
        self.frame().enforced
    }

    /// Sets or clears this frame's own enforcement flag.
    pub fn set_enforced(&mut self, enforced: bool) {
        self.frame_mut().enforced = enforced;
    }

    /// Sets the enforcement flag on an already-bound child frame. Used by
    /// `Sequence` to arm recovery for sub-contexts bound after a cut point,
    /// and by `ZeroOrMore`/`OneOrMore` to clear it on entry (§4.3).
    pub fn set_child_enforced(&mut self, child_index: usize, enforced: bool) {
        self.frames[child_index].enforced = enforced;
    }

    /// Advances the cursor by one character (consuming either the next
    /// virtual character or the next buffer character).
    pub fn advance_input_location(&mut self) {
        let buffer = self.run.buffer;
        let next = self.frame().current_location.advance(buffer);
        self.frame_mut().current_location = next;
    }

    /// Sets the cursor directly. Used by terminals after matching more
    /// than one character, and by recovery strategies.
    pub fn set_current_location(&mut self, location: InputLocation) {
        self.frame_mut().current_location = location;
    }

    /// Queues a single synthetic character ahead of the cursor.
    pub fn insert_virtual_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        let text = ch.encode_utf8(&mut buf);
        let next = self.frame().current_location.insert_virtual(text);
        self.frame_mut().current_location = next;
    }

    /// Queues a synthetic string ahead of the cursor.
    pub fn insert_virtual_str(&mut self, text: &str) {
        let next = self.frame().current_location.insert_virtual(text);
        self.frame_mut().current_location = next;
    }

    // -- control ----------------------------------------------------------

    /// Binds (allocating on first use, resetting on reuse) this frame's
    /// sub-context to `matcher` and returns its index (§4.1).
    pub fn bind_sub(&mut self, matcher: Rc<dyn Matcher>) -> usize {
        let unwrapped = unwrap_proxy(matcher);
        let parent_index = self.index;
        let child_level = self.frames[parent_index].level + 1;

        let child_index = match self.frames[parent_index].sub_context {
            Some(child_index) => child_index,
            None => {
                let child_index = self.frames.len();
                self.frames.push(Frame::empty_at(child_level));
                self.frames[parent_index].sub_context = Some(child_index);
                child_index
            }
        };

        let below_leaf_level = self.frames[parent_index].below_leaf_level
            || self.frames[parent_index]
                .matcher
                .as_ref()
                .is_some_and(|m| m.is_leaf());
        let enforced = self.frames[parent_index].enforced;
        let start = self.frames[parent_index].current_location.clone();

        let child = &mut self.frames[child_index];
        child.matcher = Some(unwrapped);
        child.parent = Some(parent_index);
        child.start_location = start.clone();
        child.current_location = start;
        child.node = None;
        child.sub_nodes = None;
        child.node_value = None;
        child.below_leaf_level = below_leaf_level;
        child.enforced = enforced;
        child.int_tag = 0;
        child.level = child_level;

        child_index
    }

    /// Runs the previously [MatcherContext::bind_sub]-bound frame
    /// `child_index` to completion via [crate::driver::run_matcher],
    /// committing its end location into this frame on success.
    pub fn run_sub(&mut self, child_index: usize) -> Result<bool, ParseFault> {
        crate::driver::run_matcher(&mut *self.frames, self.run, child_index)
    }

    /// Appends a node directly to this frame's accumulating children,
    /// bypassing [MatcherContext::create_node]. Used when a matcher adopts
    /// nodes from elsewhere in the tree rather than creating its own.
    pub fn add_child_node(&mut self, node: ParseNode) {
        self.frame_mut().sub_nodes.get_or_insert_with(Vec::new).push(node);
    }

    /// Appends several nodes at once, in order.
    pub fn add_child_nodes(&mut self, nodes: Vec<ParseNode>) {
        self.frame_mut()
            .sub_nodes
            .get_or_insert_with(Vec::new)
            .extend(nodes);
    }

    /// Records a recoverable parse error at the current location and path,
    /// then returns — the caller is still responsible for returning
    /// `Ok(false)` from `do_match` afterward. This is the Rust rendition of
    /// an `Action` "throwing `ActionError`" (§4.2): it never becomes `Err`.
    pub fn report_action_error(&mut self, message: impl Into<String>) {
        let location = self.current_location();
        let line_col = self.run.buffer.line_col(location.index());
        let path = self.path();

        self.run.errors.borrow_mut().push(ParseError {
            location,
            line_col,
            path,
            message: message.into(),
        });
    }

    /// Builds this frame's parse-tree node, if any, per the suppression
    /// rules in §4.4, and publishes it to the parent and to `last_node`.
    ///
    /// Suppression checks `in_predicate`, not just this frame's own matcher:
    /// a `Test`/`TestNot` operand is not itself a predicate, but every node
    /// it would otherwise create is reachable only through a frame that gets
    /// discarded on backtrack, so it must never reach `last_node` either.
    pub fn create_node(&mut self) {
        let index = self.index;
        let matcher = match self.frames[index].matcher.clone() {
            Some(matcher) => matcher,
            None => return,
        };

        if self.frames[index].below_leaf_level || self.in_predicate() {
            return;
        }

        let sub_nodes = self.frames[index].sub_nodes.take().unwrap_or_default();

        if matcher.is_without_node() {
            if let Some(parent_index) = self.frames[index].parent {
                self.frames[parent_index]
                    .sub_nodes
                    .get_or_insert_with(Vec::new)
                    .extend(sub_nodes);
            }
            return;
        }

        let node_value = self.frames[index].node_value.take();
        let value = tree_value(node_value, &sub_nodes);

        let node = ParseNode {
            label: matcher.label().into_owned(),
            sub_nodes,
            start: self.frames[index].start_location.clone(),
            end: self.frames[index].current_location.clone(),
            value,
        };

        if let Some(parent_index) = self.frames[index].parent {
            self.frames[parent_index]
                .sub_nodes
                .get_or_insert_with(Vec::new)
                .push(node.clone());
        }

        *self.run.last_node.borrow_mut() = Some(node.clone());
        self.frames[index].node = Some(node);
    }
}
