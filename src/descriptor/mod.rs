//! Descriptors - the declarative input to a render.
//!
//! This module provides:
//! - [`ElementDescriptor`] - one desired element and its children
//! - [`FieldValue`] - static, signal, getter or per-state field values
//! - [`PerState`] - lifecycle variant maps
//!
//! # Reactivity
//!
//! Fields can be:
//! - Static values: `.attr("x", 5)`
//! - Signals: `.attr("x", my_signal)` (read on every render)
//! - Getters: `.attr("x", FieldValue::getter(|d, i, node| ...))`
//! - Per-state: `.attr("width", StateValues::new().enter(100).exit(0))`

mod element;
mod types;

pub use element::*;
pub use types::*;
