//! Host seams - the narrow interfaces the renderer drives.
//!
//! The renderer never owns nodes. It talks to:
//! - a [`Scene`]: node query, creation, mutation, listeners, removal and the
//!   per-node [`Binding`] (the "join" data)
//! - a [`Scheduler`]: timed transitions with latest-wins interruption
//!
//! [`crate::engine::Scene`] and [`crate::animate::Timeline`] are the headless
//! implementations; a browser host would back the same traits with real DOM
//! nodes and an animation frame loop.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::descriptor::{Easing, ElementDescriptor};
use crate::error::HostResult;
use crate::types::{BindingFlags, Event, Namespace, NodeId};

// =============================================================================
// Callback Types
// =============================================================================

/// Listener attached to a node for one event name.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Completion hook run by the scheduler when a transition ends.
pub type EndHook = Box<dyn FnOnce(&mut dyn Scene, NodeId)>;

// =============================================================================
// Binding
// =============================================================================

/// Identity used to match a descriptor to a live node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchKey {
    /// Explicit descriptor key.
    Key(String),
    /// Position in the filtered forest.
    Index(usize),
}

impl MatchKey {
    /// Key for a descriptor at `index`: its own key if set, else the index.
    pub fn for_descriptor(descriptor: &ElementDescriptor, index: usize) -> Self {
        match &descriptor.key {
            Some(key) => MatchKey::Key(key.clone()),
            None => MatchKey::Index(index),
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKey::Key(key) => write!(f, "{:?}", key),
            MatchKey::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// The descriptor a node was last produced or matched by.
#[derive(Debug, Clone)]
pub struct Binding {
    pub descriptor: Rc<ElementDescriptor>,
    /// Position of the descriptor among its siblings.
    pub index: usize,
    pub key: MatchKey,
    pub flags: BindingFlags,
}

impl Binding {
    /// Fresh binding for a descriptor at `index`.
    pub fn new(descriptor: Rc<ElementDescriptor>, index: usize) -> Self {
        let key = MatchKey::for_descriptor(&descriptor, index);
        Self {
            descriptor,
            index,
            key,
            flags: BindingFlags::NONE,
        }
    }

    /// Whether an exit transition has been scheduled for the node.
    pub fn is_exiting(&self) -> bool {
        self.flags.contains(BindingFlags::EXITING)
    }
}

// =============================================================================
// Scene
// =============================================================================

/// Node query, creation and mutation.
///
/// Mutations return [`HostResult`]; the renderer logs failures and continues.
pub trait Scene {
    /// First node matching `selector`, if any.
    fn select(&self, selector: &str) -> Option<NodeId>;

    /// Create a detached element.
    fn create_element(&mut self, namespace: Namespace, tag: &str) -> HostResult<NodeId>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> HostResult<()>;

    /// Move `child` under `parent`, before `before` (or last when `None`).
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> HostResult<()>;

    /// Direct children of `parent`, in document order.
    fn children(&self, parent: NodeId) -> Vec<NodeId>;

    /// Sibling following `node`.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Whether `node` is a live node.
    fn contains(&self, node: NodeId) -> bool;

    /// Current attribute value.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set (`Some`) or remove (`None`) an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>) -> HostResult<()>;

    /// Current inline style value.
    fn style(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set (`Some`) or remove (`None`) an inline style property.
    fn set_style(&mut self, node: NodeId, name: &str, value: Option<&str>) -> HostResult<()>;

    /// Replace the text content.
    fn set_text(&mut self, node: NodeId, text: &str) -> HostResult<()>;

    /// Replace the inner markup.
    fn set_html(&mut self, node: NodeId, html: &str) -> HostResult<()>;

    /// Install (`Some`) or clear (`None`) the listener for `event`.
    ///
    /// There is at most one listener per event name: installing replaces.
    fn set_listener(
        &mut self,
        node: NodeId,
        event: &str,
        listener: Option<Listener>,
    ) -> HostResult<()>;

    /// Detach `node` (and its subtree) from the scene.
    fn remove(&mut self, node: NodeId) -> HostResult<()>;

    /// Binding stored on `node`.
    fn binding(&self, node: NodeId) -> Option<Binding>;

    /// Store (`Some`) or clear (`None`) the binding of `node`.
    fn set_binding(&mut self, node: NodeId, binding: Option<Binding>) -> HostResult<()>;

    /// All descendants of `node` in document order (pre-order).
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }
}

// =============================================================================
// Transition Plans
// =============================================================================

/// Resolved target values for one lifecycle state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Targets {
    /// Normalized attribute names and values.
    pub attributes: Vec<(String, String)>,
    /// Normalized style property names and values.
    pub styles: Vec<(String, String)>,
    /// Text content to set when the transition starts.
    pub text: Option<String>,
}

impl Targets {
    /// Whether nothing would change.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.styles.is_empty() && self.text.is_none()
    }
}

/// A timed move of one node toward its targets.
pub struct Transition {
    pub node: NodeId,
    pub delay: Duration,
    pub duration: Duration,
    /// `None` lets the scheduler use its default easing.
    pub ease: Option<Easing>,
    pub targets: Targets,
    /// Run once the transition completes. Interrupted transitions never run it.
    pub on_end: Option<EndHook>,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("node", &self.node)
            .field("delay", &self.delay)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("targets", &self.targets)
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Animation scheduling with latest-wins semantics.
pub trait Scheduler {
    /// Start `transition`, replacing any transition already running on its node.
    fn schedule(&mut self, transition: Transition);

    /// Cancel the transition running on `node`, without running its end hook.
    fn interrupt(&mut self, node: NodeId);
}
