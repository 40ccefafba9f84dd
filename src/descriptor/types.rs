//! Field value types - constants, signals, getters and per-state maps.
//!
//! Every attribute, style, duration and delay field of a descriptor is a
//! [`FieldValue`]. Like component props, a field can be:
//! - Static: `x: 5`
//! - Signal: `x: my_signal` (read each time the field is resolved)
//! - Getter: `x: |datum, index, node| ...`
//! - Per-state: `width: { enter: 100, exit: 0 }`

use std::fmt;
use std::rc::Rc;

use spark_signals::Signal;

use super::ElementDescriptor;
use crate::host::Scene;
use crate::types::{Event, LifecycleState, NodeId, Value};

// =============================================================================
// Callback Types
// =============================================================================

/// Computes a field value from `(datum, index, node)`.
pub type ValueGetter = Rc<dyn Fn(&ElementDescriptor, usize, NodeId) -> Value>;

/// Listener for an `on<Name>` field, called with `(event, datum, index)`.
pub type EventHandler = Rc<dyn Fn(&Event, &ElementDescriptor, usize)>;

/// Escape hatch invoked once when a node enters, for imperative interop.
pub type CallHook = Rc<dyn Fn(&mut dyn Scene, NodeId)>;

// =============================================================================
// Easing
// =============================================================================

/// Easing function mapping linear progress `t` in `[0, 1]` to eased progress.
#[derive(Clone)]
pub struct Easing(Rc<dyn Fn(f64) -> f64>);

impl Easing {
    /// Wrap a closure.
    pub fn new(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Evaluate the easing at `t`.
    pub fn apply(&self, t: f64) -> f64 {
        (self.0)(t)
    }
}

impl From<fn(f64) -> f64> for Easing {
    fn from(f: fn(f64) -> f64) -> Self {
        Self(Rc::new(f))
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Easing(..)")
    }
}

// =============================================================================
// PerState - lifecycle variant map
// =============================================================================

/// A value per lifecycle state.
///
/// Missing entries fall back according to the resolver rules
/// (`start` → `exit`, `update` → `enter`).
#[derive(Clone)]
pub struct PerState<T> {
    pub start: Option<T>,
    pub enter: Option<T>,
    pub update: Option<T>,
    pub exit: Option<T>,
}

impl<T> PerState<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            start: None,
            enter: None,
            update: None,
            exit: None,
        }
    }

    /// Set the `start` entry.
    pub fn start(mut self, value: impl Into<T>) -> Self {
        self.start = Some(value.into());
        self
    }

    /// Set the `enter` entry.
    pub fn enter(mut self, value: impl Into<T>) -> Self {
        self.enter = Some(value.into());
        self
    }

    /// Set the `update` entry.
    pub fn update(mut self, value: impl Into<T>) -> Self {
        self.update = Some(value.into());
        self
    }

    /// Set the `exit` entry.
    pub fn exit(mut self, value: impl Into<T>) -> Self {
        self.exit = Some(value.into());
        self
    }

    /// Raw entry for `state`, without fallback.
    pub fn get(&self, state: LifecycleState) -> Option<&T> {
        match state {
            LifecycleState::Start => self.start.as_ref(),
            LifecycleState::Enter => self.enter.as_ref(),
            LifecycleState::Update => self.update.as_ref(),
            LifecycleState::Exit => self.exit.as_ref(),
        }
    }
}

impl<T> Default for PerState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for PerState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for state in LifecycleState::ALL {
            if let Some(value) = self.get(state) {
                map.entry(&state.as_str(), value);
            }
        }
        map.finish()
    }
}

/// Per-state map of field values, e.g. `StateValues::new().enter(100).exit(0)`.
pub type StateValues = PerState<FieldValue>;

// =============================================================================
// FieldValue
// =============================================================================

/// Raw value of an attribute, style or timing field.
#[derive(Clone)]
pub enum FieldValue {
    /// Constant value.
    Static(Value),
    /// Reactive signal, read every time the field is resolved.
    Signal(Signal<Value>),
    /// Computed from `(datum, index, node)` when applied.
    Getter(ValueGetter),
    /// Different value per lifecycle state.
    PerState(Box<PerState<FieldValue>>),
}

impl FieldValue {
    /// Build a getter field.
    pub fn getter(f: impl Fn(&ElementDescriptor, usize, NodeId) -> Value + 'static) -> Self {
        FieldValue::Getter(Rc::new(f))
    }

    /// Whether this is a per-state map.
    pub fn is_per_state(&self) -> bool {
        matches!(self, FieldValue::PerState(_))
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Static(v) => write!(f, "Static({:?})", v),
            FieldValue::Signal(_) => f.write_str("Signal(..)"),
            FieldValue::Getter(_) => f.write_str("Getter(..)"),
            FieldValue::PerState(map) => write!(f, "PerState({:?})", map),
        }
    }
}

macro_rules! field_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Static(Value::from(value))
                }
            }
        )*
    };
}

field_value_from!(f64, f32, i32, u32, usize, bool, &str, String);

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Static(value)
    }
}

impl From<Signal<Value>> for FieldValue {
    fn from(signal: Signal<Value>) -> Self {
        FieldValue::Signal(signal)
    }
}

impl From<PerState<FieldValue>> for FieldValue {
    fn from(map: PerState<FieldValue>) -> Self {
        FieldValue::PerState(Box::new(map))
    }
}

// =============================================================================
// EaseValue
// =============================================================================

/// Easing field: one function for every state, or one per state.
#[derive(Clone, Debug)]
pub enum EaseValue {
    Fixed(Easing),
    PerState(PerState<Easing>),
}

impl From<Easing> for EaseValue {
    fn from(easing: Easing) -> Self {
        EaseValue::Fixed(easing)
    }
}

impl From<fn(f64) -> f64> for EaseValue {
    fn from(f: fn(f64) -> f64) -> Self {
        EaseValue::Fixed(Easing::from(f))
    }
}

impl From<PerState<Easing>> for EaseValue {
    fn from(map: PerState<Easing>) -> Self {
        EaseValue::PerState(map)
    }
}
