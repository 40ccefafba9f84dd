//! Host error type.
//!
//! The reconciler itself never fails: it logs host errors and keeps going.
//! Hosts report failures of individual mutations through [`HostError`].

use thiserror::Error;

use crate::types::NodeId;

/// Failure of a single host operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The node handle does not refer to a live node.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Tag, attribute, style or event name the host cannot accept.
    #[error("invalid name {0:?}")]
    InvalidName(String),

    /// The node is alive but not attached where the operation requires it.
    #[error("node {0} is not attached to a parent")]
    Detached(NodeId),

    /// Inserting `child` under `parent` would create a cycle.
    #[error("cannot insert {child} under {parent}")]
    HierarchyRequest {
        /// Would-be parent.
        parent: NodeId,
        /// Would-be child.
        child: NodeId,
    },
}

/// Result alias for host operations.
pub type HostResult<T> = Result<T, HostError>;
