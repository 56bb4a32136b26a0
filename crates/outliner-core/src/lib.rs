#![warn(missing_docs)]
//! Outliner Core - Headless Keyboard-Driven Outline Editor Kernel
//!
//! # Overview
//!
//! `outliner-core` is a headless outliner kernel: an ordered forest of text-bearing blocks,
//! opened in any number of buffers and edited entirely through keyboard commands.
//! It does not render anything; the upper layer reads [`BufferState`] and the visible rows of a
//! buffer and owns scrolling and real input focus.
//!
//! # Core Features
//!
//! - **Block Tree**: ordered forest with batch, cycle-checked, atomic moves
//! - **Two Interaction Modes**: a text caret inside one block, or a run of selected sibling
//!   blocks
//! - **Goal-Column Navigation**: vertical motion across soft-wrapped lines and blocks keeps the
//!   remembered cell column
//! - **Progressive Folding**: collapse deepest-expanded-first, expand shallowest-collapsed-first
//! - **Structural Editing**: swap, cross-parent moves, indent/outdent, merge-on-delete that never
//!   orphans children, split-on-enter
//! - **State Tracking**: per-buffer version numbers and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Workspace (buffers, keys, notifications)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Command Dispatcher                         │  ← One command, one transaction
//! ├─────────────────────────────────────────────┤
//! │  Navigation / Structure / Edit Engines      │  ← Focus targets, relocation
//! ├─────────────────────────────────────────────┤
//! │  Selection Model + Fold State               │  ← Per-buffer state
//! ├─────────────────────────────────────────────┤
//! │  Block Layout (Soft Wrapping)               │  ← Goal-column geometry
//! ├─────────────────────────────────────────────┤
//! │  Node Tree + Text Store                     │  ← Shared document
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use outliner_core::{
//!     FocusState, InsertPosition, Key, KeyChord, Modifiers, TextSelection, Workspace,
//! };
//!
//! let mut workspace = Workspace::new();
//! let buffer = workspace.open_buffer("Groceries");
//! let root = workspace.buffer_state(buffer).unwrap().root;
//! let milk = workspace.insert_block(root, InsertPosition::Append, "Milk").unwrap();
//! let eggs = workspace.insert_block(root, InsertPosition::Append, "Eggs").unwrap();
//!
//! // ArrowDown with nothing focused selects the first block.
//! workspace.handle_key(buffer, KeyChord::plain(Key::Arrow(outliner_core::Direction::Down))).unwrap();
//!
//! // Tab on the first block is a no-op: there is no previous sibling to indent under.
//! workspace.handle_key(buffer, KeyChord::plain(Key::Tab)).unwrap();
//! assert_eq!(workspace.tree().children(root).unwrap(), &[milk, eggs]);
//!
//! // Enter edits the selected block with the caret at its end.
//! workspace.handle_key(buffer, KeyChord::plain(Key::Enter)).unwrap();
//! assert_eq!(
//!     workspace.buffer_state(buffer).unwrap().focus,
//!     FocusState::Text(TextSelection::caret(milk, 4))
//! );
//!
//! // Shift+Alt+Mod+ArrowDown moves the block to the end of its siblings.
//! let to_bottom = Modifiers::SHIFT | Modifiers::ALT | Modifiers::MOD;
//! workspace
//!     .handle_key(buffer, KeyChord::new(Key::Arrow(outliner_core::Direction::Down), to_bottom))
//!     .unwrap();
//! assert_eq!(workspace.tree().children(root).unwrap(), &[eggs, milk]);
//! ```
//!
//! # Module Description
//!
//! - [`tree`] - Node forest storage and primitive mutation
//! - [`text`] - Text collaborator contract and the in-memory store
//! - [`layout`] - Soft-wrap layout of one block's text
//! - [`fold`] - Per-buffer fold flags and progressive folding
//! - [`selection`] - Focus state: none, title, text, blocks
//! - [`navigation`] - Directional focus motion
//! - [`structure`] - Block relocation
//! - [`edit`] - Text input, split and merge, deletion, clipboard
//! - [`keys`] - Key chords and their resolution
//! - [`commands`] - Unified command interface
//! - [`workspace`] - Document, buffers and notifications
//! - [`state`] - State query interface
//!
//! # Unicode Support
//!
//! - Offsets are `char` counts; caret motion steps over whole grapheme clusters
//! - Proper handling of CJK double-width characters and tabs in goal columns

pub mod buffer;
pub mod commands;
pub mod config;
pub mod edit;
pub mod error;
pub mod fold;
pub mod keys;
pub mod layout;
pub mod navigation;
pub mod selection;
pub mod state;
pub mod structure;
pub mod text;
pub mod tree;
pub mod workspace;

pub use buffer::{Buffer, Session};
pub use commands::{
    ClipboardCommand, Command, CommandResult, CursorCommand, Direction, EditCommand,
    FoldCommand, StructureCommand, VerticalDirection,
};
pub use config::{ConfigError, OutlinerConfig};
pub use error::{OutlineError, OutlineResult};
pub use fold::FoldState;
pub use keys::{Key, KeyChord, Modifiers};
pub use layout::{Affinity, BlockLayout, LayoutOptions, WrapMode};
pub use selection::{BlockSelection, FocusMode, FocusState, GoalLine, TextSelection};
pub use state::{BufferState, StateChange, StateChangeCallback, StateChangeType, VisibleRow};
pub use text::{MemoryTextStore, TextStore};
pub use tree::{InsertPosition, NodeId, NodeTree};
pub use workspace::{BufferId, Workspace};
