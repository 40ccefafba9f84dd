//! Animation - the headless transition scheduler and easing curves.
//!
//! - [`Timeline`]: manual-clock [`crate::host::Scheduler`], latest wins per node
//! - [`ease`]: easing curves (`linear`, `quad_in_out`, `cubic_in_out`, `cubic_out`)

pub mod ease;
mod timeline;

pub use timeline::Timeline;
