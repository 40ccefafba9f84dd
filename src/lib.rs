//! # spark-render
//!
//! Declarative keyed rendering with lifecycle transitions for SVG/HTML scene
//! trees.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals): any
//! field can be a signal that is read when the tree is rendered.
//!
//! ## Architecture
//!
//! A render takes a forest of [`ElementDescriptor`]s and reconciles it
//! against the live children of an anchor node:
//! ```text
//! Descriptor forest → keyed matching → enter / update / exit
//!                                       ↓        ↓        ↓
//!                           start values  update    exit cascade
//!                           + enter       transition (descendants first)
//!                           transition               → detach on end
//! ```
//!
//! Every value can differ per lifecycle state (`start`, `enter`, `update`,
//! `exit`); missing `start` values fall back to `exit`, missing `update`
//! values to `enter`.
//!
//! Live nodes and animation belong to a host behind two traits,
//! [`host::Scene`] and [`host::Scheduler`]. The crate ships a headless host:
//! [`engine::Scene`] (in-memory tree) and [`animate::Timeline`] (manual clock).
//!
//! ## Modules
//!
//! - [`types`] - Core types (NodeId, Value, LifecycleState, Namespace, Event)
//! - [`descriptor`] - ElementDescriptor, FieldValue, PerState
//! - [`host`] - Scene and Scheduler traits, Binding, Transition plans
//! - [`render`] - Resolution, application, events, transitions, reconciliation
//! - [`engine`] - Headless scene graph
//! - [`animate`] - Timeline scheduler and easing curves
//! - [`error`] - Host errors

pub mod animate;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod host;
pub mod render;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use descriptor::{
    CallHook, EaseValue, Easing, ElementDescriptor, EventHandler, FieldValue, Forest, PerState,
    StateValues, ValueGetter, forest, sparse_forest,
};

pub use error::{HostError, HostResult};

pub use host::{Binding, Listener, MatchKey, Scheduler, Targets, Transition};

pub use render::{Anchor, RenderConfig, Renderer, Selection, reconcile, render};
