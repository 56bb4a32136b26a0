//! Error taxonomy shared by the tree, the engines and the workspace.

use crate::tree::NodeId;
use crate::workspace::BufferId;
use thiserror::Error;

/// Errors produced by tree primitives and command execution.
///
/// Only [`OutlineError::NodeNotFound`] and [`OutlineError::BufferNotFound`] escape a keyboard
/// command: every other boundary condition is turned into a silent no-op by the engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    /// The node is a forest root and has no parent.
    #[error("node {0} has no parent")]
    NoParent(NodeId),

    /// A stale node identity was referenced (selection and tree are out of sync).
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The relocation would make `node` an ancestor of itself.
    #[error("moving node {node} under {parent} would create a cycle")]
    CycleRejected {
        /// Node that was being moved.
        node: NodeId,
        /// Requested new parent.
        parent: NodeId,
    },

    /// The sibling used as an insertion anchor is not a child of the target parent, or is
    /// part of the set being moved.
    #[error("invalid insertion anchor {0}")]
    InvalidAnchor(NodeId),

    /// The nodes of a block selection do not share a parent.
    #[error("nodes {0} and {1} are not siblings")]
    NotSiblings(NodeId, NodeId),

    /// A block selection (or a batch move) was given no nodes.
    #[error("empty node set")]
    EmptySelection,

    /// A text offset lies beyond the end of the block's text.
    #[error("offset {offset} is out of bounds for node {node} (length {len})")]
    InvalidOffset {
        /// Node owning the text.
        node: NodeId,
        /// Requested char offset.
        offset: usize,
        /// Text length in chars.
        len: usize,
    },

    /// The node already has a parent and cannot be attached again.
    #[error("node {0} is already attached")]
    AlreadyAttached(NodeId),

    /// A buffer id was not found in the workspace.
    #[error("buffer {0:?} not found")]
    BufferNotFound(BufferId),
}

/// Convenience alias used throughout the crate.
pub type OutlineResult<T> = Result<T, OutlineError>;
