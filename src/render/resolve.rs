//! Value resolution - picking the value that applies to a lifecycle state.
//!
//! Fallback rules for per-state maps:
//! - `start` missing → `exit` (an element starts the way it leaves)
//! - `update` missing → `enter` (updates re-assert the enter target)
//! - `enter` / `exit` missing → unset
//!
//! Unset means "do not touch this attribute".

use crate::descriptor::{EaseValue, Easing, ElementDescriptor, FieldValue, PerState};
use crate::types::{LifecycleState, NodeId, Value};

/// Pick the entry of `map` for `state`, applying the fallback rules.
pub fn resolve_state<T>(map: &PerState<T>, state: LifecycleState) -> Option<&T> {
    match (state, map.get(state)) {
        (_, Some(value)) => Some(value),
        (LifecycleState::Start, None) => map.exit.as_ref(),
        (LifecycleState::Update, None) => map.enter.as_ref(),
        (LifecycleState::Enter | LifecycleState::Exit, None) => None,
    }
}

/// Resolve a field for `state`.
///
/// Anything that is not a per-state map is returned unchanged; getters are
/// not invoked here.
pub fn resolve(field: &FieldValue, state: LifecycleState) -> Option<&FieldValue> {
    match field {
        FieldValue::PerState(map) => resolve_state(map, state),
        other => Some(other),
    }
}

/// Resolve an easing field for `state`.
pub fn resolve_ease(ease: &EaseValue, state: LifecycleState) -> Option<&Easing> {
    match ease {
        EaseValue::Fixed(easing) => Some(easing),
        EaseValue::PerState(map) => resolve_state(map, state),
    }
}

/// Resolve a field for `state` and turn it into a concrete value.
///
/// Signals are read, getters are invoked with `(datum, index, node)`.
pub fn evaluate(
    field: &FieldValue,
    state: LifecycleState,
    datum: &ElementDescriptor,
    index: usize,
    node: NodeId,
) -> Option<Value> {
    match resolve(field, state)? {
        FieldValue::Static(value) => Some(value.clone()),
        FieldValue::Signal(signal) => Some(signal.get()),
        FieldValue::Getter(getter) => Some(getter(datum, index, node)),
        // A map nested inside a map entry resolves again for the same state.
        nested @ FieldValue::PerState(_) => evaluate(nested, state, datum, index, node),
    }
}

/// Evaluate a timing field (milliseconds) for `state`.
///
/// Non-numeric and non-finite values count as unset; negative values clamp
/// to zero.
pub fn evaluate_millis(
    field: Option<&FieldValue>,
    state: LifecycleState,
    datum: &ElementDescriptor,
    index: usize,
    node: NodeId,
) -> Option<f64> {
    let value = evaluate(field?, state, datum, index, node)?;
    let millis = value.as_number()?;
    if !millis.is_finite() {
        return None;
    }
    Some(millis.max(0.0))
}
