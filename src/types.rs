//! Core types shared by descriptors, the reconciler and hosts.
//!
//! Live nodes are NOT objects owned by this crate. They are opaque indices
//! handed out by a host (see [`crate::host::Scene`]):
//!
//! ```text
//! NodeId(0): svg   (root, no binding)
//! NodeId(1): g     (parent=0, binding={tag: g, key: Index(0)})
//! NodeId(2): rect  (parent=1, binding={tag: rect, key: Key("a")})
//! ```

use std::fmt;

// =============================================================================
// NodeId
// =============================================================================

/// Handle to a live node inside a host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Raw index of the node inside its host.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

// =============================================================================
// Value - a resolved primitive
// =============================================================================

/// A concrete attribute, style or timing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numeric value (attributes stringify it without a trailing `.0`).
    Number(f64),
    /// Text value, passed through as-is.
    Text(String),
    /// Boolean value, stringified as `true` / `false`.
    Bool(bool),
}

impl Value {
    /// Numeric view of the value.
    ///
    /// Text is parsed so that `"250"` works as a duration.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // f64 Display already prints 5.0 as "5" and 0.5 as "0.5"
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

// =============================================================================
// Lifecycle State
// =============================================================================

/// Which value variant and animation path applies to a node.
///
/// States are never stored on nodes; they are threaded through resolution
/// and application calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Initial values at creation, applied without animation.
    Start,
    /// First animated transition after creation.
    Enter,
    /// Animated transition when an existing node is matched again.
    Update,
    /// Animated transition before removal.
    Exit,
}

impl LifecycleState {
    /// All states in lifecycle order.
    pub const ALL: [LifecycleState; 4] = [
        LifecycleState::Start,
        LifecycleState::Enter,
        LifecycleState::Update,
        LifecycleState::Exit,
    ];

    /// Lower-case state name.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Start => "start",
            LifecycleState::Enter => "enter",
            LifecycleState::Update => "update",
            LifecycleState::Exit => "exit",
        }
    }

    /// Parse a state name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "enter" => Some(Self::Enter),
            "update" => Some(Self::Update),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Namespace
// =============================================================================

/// Namespace a node is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    /// Scalable vector graphics (the scene graph's own namespace).
    #[default]
    Svg,
    /// HTML markup.
    Xhtml,
}

impl Namespace {
    /// Namespace URI as used by `createElementNS`.
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::Xhtml => "http://www.w3.org/1999/xhtml",
        }
    }

    /// Short prefix name.
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Svg => "svg",
            Namespace::Xhtml => "xhtml",
        }
    }
}

// =============================================================================
// Binding Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Per-node reconciliation flags stored with a binding.
    ///
    /// Combine with bitwise OR: `BindingFlags::EXITING | BindingFlags::LISTENING`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BindingFlags: u8 {
        const NONE = 0;
        /// An exit transition has been scheduled; the node is on its way out.
        const EXITING = 1 << 0;
        /// At least one `on<Name>` listener is attached to the node.
        const LISTENING = 1 << 1;
    }
}

// =============================================================================
// Event
// =============================================================================

/// An event delivered to a node listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name, lower-case (`click`, `mouseover`, ...).
    pub name: String,
    /// Node the event was dispatched to.
    pub target: NodeId,
    /// Optional pointer position for pointer events.
    pub position: Option<(f64, f64)>,
}

impl Event {
    /// Create an event without a position.
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            position: None,
        }
    }

    /// Create a click event at the given position.
    pub fn click(target: NodeId, x: f64, y: f64) -> Self {
        Self {
            name: "click".to_string(),
            target,
            position: Some((x, y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting_matches_dom() {
        assert_eq!(Value::from(5).to_string(), "5");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::from(-12.25).to_string(), "-12.25");
    }

    #[test]
    fn test_text_as_number() {
        assert_eq!(Value::from("250").as_number(), Some(250.0));
        assert_eq!(Value::from("red").as_number(), None);
        assert_eq!(Value::from(true).as_number(), None);
    }

    #[test]
    fn test_state_names_roundtrip() {
        for state in LifecycleState::ALL {
            assert_eq!(LifecycleState::parse(state.as_str()), Some(state));
        }
        assert_eq!(LifecycleState::parse("idle"), None);
    }

    #[test]
    fn test_flags_combine() {
        let flags = BindingFlags::EXITING | BindingFlags::LISTENING;
        assert!(flags.contains(BindingFlags::EXITING));
        assert!(!BindingFlags::default().contains(BindingFlags::EXITING));
    }
}
