//! Timeline - a manual-clock [`Scheduler`].
//!
//! Nothing moves until the owner advances the clock:
//!
//! ```ignore
//! let mut timeline = Timeline::new();
//! render(&mut scene, &mut timeline, "svg", &forest);
//! timeline.advance(&mut scene, Duration::from_millis(150)); // halfway
//! timeline.settle(&mut scene);                              // everything done
//! ```
//!
//! Per node at most one transition runs. Scheduling a new one replaces the
//! old one without running its end hook.

use std::time::Duration;

use crate::descriptor::Easing;
use crate::host::{EndHook, Scene, Scheduler, Targets, Transition};
use crate::types::NodeId;

use super::ease;

// =============================================================================
// Running Transition
// =============================================================================

/// Values a transition interpolates from, captured when it starts.
struct Origin {
    attributes: Vec<Option<String>>,
    styles: Vec<Option<String>>,
}

struct Running {
    node: NodeId,
    start: Duration,
    duration: Duration,
    ease: Option<Easing>,
    targets: Targets,
    on_end: Option<EndHook>,
    origin: Option<Origin>,
}

impl Running {
    fn end(&self) -> Duration {
        self.start.saturating_add(self.duration)
    }

    fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() || now >= self.end() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }
}

/// Interpolated value between `from` and `to` at eased progress `k`.
///
/// Numbers are interpolated; anything else snaps to `to`.
fn interpolate(from: Option<&str>, to: &str, k: f64) -> String {
    let numbers = from
        .and_then(|f| f.trim().parse::<f64>().ok())
        .zip(to.trim().parse::<f64>().ok());
    match numbers {
        Some((a, b)) => (a + (b - a) * k).to_string(),
        None => to.to_string(),
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// Manual-clock transition scheduler.
pub struct Timeline {
    now: Duration,
    /// In scheduling order; end hooks of transitions finishing on the same
    /// tick run in this order.
    active: Vec<Running>,
    default_ease: Easing,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// Timeline at time zero with cubic in-out as the default easing.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            active: Vec::new(),
            default_ease: Easing::new(ease::cubic_in_out),
        }
    }

    /// Use `ease` for transitions that do not name an easing.
    pub fn with_default_ease(mut self, ease: Easing) -> Self {
        self.default_ease = ease;
        self
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether a transition is scheduled or running for `node`.
    pub fn is_animating(&self, node: NodeId) -> bool {
        self.active.iter().any(|r| r.node == node)
    }

    /// Move the clock forward by `dt` and apply the frame.
    pub fn advance(&mut self, scene: &mut dyn Scene, dt: Duration) {
        self.now = self.now.saturating_add(dt);
        self.tick(scene);
    }

    /// Move the clock to `time` (never backwards) and apply the frame.
    pub fn tick_to(&mut self, scene: &mut dyn Scene, time: Duration) {
        self.now = self.now.max(time);
        self.tick(scene);
    }

    /// Run until every transition has finished.
    pub fn settle(&mut self, scene: &mut dyn Scene) {
        loop {
            let Some(end) = self.active.iter().map(Running::end).max() else {
                break;
            };
            self.tick_to(scene, end);
        }
    }

    /// Apply the frame for the current time.
    pub fn tick(&mut self, scene: &mut dyn Scene) {
        self.prune(scene);

        let now = self.now;
        let mut finished = Vec::new();
        for (i, running) in self.active.iter_mut().enumerate() {
            if now < running.start {
                continue;
            }
            if running.origin.is_none() {
                let origin = begin(scene, running);
                running.origin = Some(origin);
            }
            let t = running.progress(now);
            if t >= 1.0 {
                write_final(scene, running);
                finished.push(i);
                continue;
            }
            let k = running
                .ease
                .as_ref()
                .unwrap_or(&self.default_ease)
                .apply(t);
            write_frame(scene, running, k);
        }

        let mut done = Vec::with_capacity(finished.len());
        for i in finished.into_iter().rev() {
            done.push(self.active.remove(i));
        }
        for running in done.into_iter().rev() {
            tracing::trace!(node = %running.node, "transition finished");
            if let Some(on_end) = running.on_end {
                on_end(scene, running.node);
            }
        }

        // End hooks may have detached nodes other transitions still target
        self.prune(scene);
    }

    fn prune(&mut self, scene: &dyn Scene) {
        self.active.retain(|running| {
            let alive = scene.contains(running.node);
            if !alive {
                tracing::trace!(node = %running.node, "transition dropped for detached node");
            }
            alive
        });
    }
}

/// Capture origin values and set the text target.
fn begin(scene: &mut dyn Scene, running: &Running) -> Origin {
    let node = running.node;
    if let Some(text) = &running.targets.text {
        if let Err(err) = scene.set_text(node, text) {
            tracing::warn!(%node, error = %err, "transition text not applied");
        }
    }
    Origin {
        attributes: running
            .targets
            .attributes
            .iter()
            .map(|(name, _)| scene.attribute(node, name))
            .collect(),
        styles: running
            .targets
            .styles
            .iter()
            .map(|(name, _)| scene.style(node, name))
            .collect(),
    }
}

fn write_frame(scene: &mut dyn Scene, running: &Running, k: f64) {
    let node = running.node;
    let Some(origin) = &running.origin else {
        return;
    };
    for ((name, to), from) in running.targets.attributes.iter().zip(&origin.attributes) {
        let value = interpolate(from.as_deref(), to, k);
        if let Err(err) = scene.set_attribute(node, name, Some(&value)) {
            tracing::warn!(%node, attribute = %name, error = %err, "transition frame not applied");
        }
    }
    for ((name, to), from) in running.targets.styles.iter().zip(&origin.styles) {
        let value = interpolate(from.as_deref(), to, k);
        if let Err(err) = scene.set_style(node, name, Some(&value)) {
            tracing::warn!(%node, style = %name, error = %err, "transition frame not applied");
        }
    }
}

fn write_final(scene: &mut dyn Scene, running: &Running) {
    let node = running.node;
    for (name, value) in &running.targets.attributes {
        if let Err(err) = scene.set_attribute(node, name, Some(value)) {
            tracing::warn!(%node, attribute = %name, error = %err, "transition target not applied");
        }
    }
    for (name, value) in &running.targets.styles {
        if let Err(err) = scene.set_style(node, name, Some(value)) {
            tracing::warn!(%node, style = %name, error = %err, "transition target not applied");
        }
    }
}

impl Scheduler for Timeline {
    fn schedule(&mut self, transition: Transition) {
        self.interrupt(transition.node);
        self.active.push(Running {
            node: transition.node,
            start: self.now.saturating_add(transition.delay),
            duration: transition.duration,
            ease: transition.ease,
            targets: transition.targets,
            on_end: transition.on_end,
            origin: None,
        });
    }

    fn interrupt(&mut self, node: NodeId) {
        self.active.retain(|running| running.node != node);
    }
}
