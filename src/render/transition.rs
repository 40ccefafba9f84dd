//! Transition orchestration for the enter, update and exit states.
//!
//! Timing comes from the descriptor's `duration`, `delay` and `ease` fields,
//! resolved for the state like any other field. Enter and update without any
//! timing are applied on the spot; everything else becomes a [`Transition`]
//! plan for the host scheduler.
//!
//! Exit plans carry an end hook that detaches the node. That hook is the only
//! way the renderer removes a node that is leaving normally.

use std::time::Duration;

use crate::descriptor::ElementDescriptor;
use crate::host::{EndHook, Scene, Scheduler, Transition};
use crate::types::{LifecycleState, NodeId};

use super::apply::{targets, write_targets};
use super::resolve::{evaluate_millis, resolve_ease};

/// How a state change was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Values were written immediately.
    Applied,
    /// A plan was handed to the scheduler.
    Scheduled,
}

/// Durations past what `Duration` holds saturate.
fn millis(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

/// Hook that detaches a node once its exit transition completes.
pub fn detach_on_end() -> EndHook {
    Box::new(|scene: &mut dyn Scene, node: NodeId| {
        if !scene.contains(node) {
            return;
        }
        match scene.remove(node) {
            Ok(()) => tracing::trace!(%node, "exited node detached"),
            Err(err) => tracing::warn!(%node, error = %err, "exited node not detached"),
        }
    })
}

/// Move `node` to the values of `datum` for `state`.
///
/// `Start` values are never routed here; use [`super::apply::apply`].
pub fn transition(
    scene: &mut dyn Scene,
    scheduler: &mut dyn Scheduler,
    node: NodeId,
    datum: &ElementDescriptor,
    index: usize,
    state: LifecycleState,
    event_prefix: &str,
) -> Outcome {
    debug_assert!(state != LifecycleState::Start, "start values are applied directly");

    let duration = evaluate_millis(datum.duration.as_ref(), state, datum, index, node);
    let delay = evaluate_millis(datum.delay.as_ref(), state, datum, index, node);
    let targets = targets(datum, index, node, state, event_prefix);

    if state != LifecycleState::Exit && duration.is_none() && delay.is_none() {
        scheduler.interrupt(node);
        write_targets(scene, node, &targets);
        tracing::trace!(%node, %state, "applied without transition");
        return Outcome::Applied;
    }

    let ease = datum
        .ease
        .as_ref()
        .and_then(|ease| resolve_ease(ease, state))
        .cloned();

    let on_end = (state == LifecycleState::Exit).then(detach_on_end);

    let plan = Transition {
        node,
        delay: millis(delay.unwrap_or(0.0)),
        duration: millis(duration.unwrap_or(0.0)),
        ease,
        targets,
        on_end,
    };
    tracing::trace!(%node, %state, delay = ?plan.delay, duration = ?plan.duration, "transition scheduled");
    scheduler.schedule(plan);
    Outcome::Scheduled
}
