//! Headless engine - an in-memory scene graph implementing [`crate::host::Scene`].
//!
//! The engine manages:
//! - Registry: index allocation with a free pool
//! - Scene: element tree, attributes, styles, content, listeners, bindings
//! - Selector: compound selector parsing for `select`
//!
//! # Architecture
//!
//! Nodes are NOT objects handed to callers. They are indices into an arena:
//!
//! ```text
//! Index 0: svg  (parent=None, children=[1])
//! Index 1: g    (parent=0,    children=[2], binding={key: Index(0)})
//! Index 2: rect (parent=1,    attributes=[width=100], binding={key: "a"})
//! ```
//!
//! A released index goes back to the pool and is handed out again by the
//! next `create_element`.

mod registry;
mod scene;
mod selector;

pub use registry::Registry;
pub use scene::Scene;
pub use selector::Selector;
