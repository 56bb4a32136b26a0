//! Buffer State Interface
//!
//! Structured, read-only views of a buffer for the render/focus layer, plus the change records
//! delivered to subscribers.
//!
//! # Example
//!
//! ```rust
//! use outliner_core::{FocusMode, StateChangeType, Workspace};
//! use std::sync::{Arc, Mutex};
//!
//! let mut workspace = Workspace::new();
//! let buffer = workspace.open_buffer("Notes");
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! workspace
//!     .subscribe(buffer, move |change| sink.lock().unwrap().push(change.change_type))
//!     .unwrap();
//!
//! let root = workspace.buffer_state(buffer).unwrap().root;
//! workspace.insert_block(root, outliner_core::InsertPosition::Append, "First").unwrap();
//!
//! assert_eq!(workspace.buffer_state(buffer).unwrap().mode, FocusMode::None);
//! assert!(seen.lock().unwrap().contains(&StateChangeType::TreeModified));
//! ```

use crate::selection::{FocusMode, FocusState};
use crate::tree::NodeId;

/// A block as rendered: identity, depth below the buffer root and fold flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    /// Block identity.
    pub node: NodeId,
    /// Depth below the buffer root (top-level blocks are 0).
    pub depth: usize,
    /// Whether the block has children.
    pub has_children: bool,
    /// Fold flag (only meaningful with children).
    pub expanded: bool,
}

/// Snapshot of one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferState {
    /// Root assignment.
    pub root: NodeId,
    /// Focus mode.
    pub mode: FocusMode,
    /// Full focus state (target description for the render layer).
    pub focus: FocusState,
    /// Most recently focused block.
    pub last_focused_block: Option<NodeId>,
    /// Number of rendered blocks.
    pub visible_block_count: usize,
    /// Number of collapsed flags held by the buffer.
    pub collapsed_count: usize,
    /// Buffer version (incremented with every change notification).
    pub version: u64,
}

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChangeType {
    /// Blocks were inserted, moved or deleted.
    TreeModified,
    /// Block text changed.
    TextModified,
    /// Focus or selection changed.
    FocusChanged,
    /// Fold flags changed.
    FoldingChanged,
    /// The buffer was re-rooted (drill in/out).
    RootChanged,
}

/// State change record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
}

impl StateChange {
    /// Create a new state change record.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
        }
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;
