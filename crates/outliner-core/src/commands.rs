//! Command Interface Layer
//!
//! Provides a unified command interface for convenient frontend integration.
//!
//! # Overview
//!
//! Every keyboard combination resolves (see [`crate::keys`]) to one [`Command`]. Commands are
//! grouped by the engine that runs them:
//!
//! - **Cursor**: directional focus motion, mode switches, drill in/out
//! - **Fold**: progressive and single-block folding
//! - **Structure**: swap, move-to-extreme, indent and outdent of blocks
//! - **Edit**: text input, split, merge-on-delete, block deletion
//! - **Clipboard**: copy and cut as a text blob
//!
//! A command runs against one [`Session`] and either fully applies or leaves everything as it
//! was. Boundary conditions (first sibling, root level, merges that would orphan children) are
//! not errors: they yield [`CommandResult::Unchanged`].
//!
//! # Example
//!
//! ```rust
//! use outliner_core::{Command, CommandResult, CursorCommand, Direction, InsertPosition, Workspace};
//!
//! let mut workspace = Workspace::new();
//! let buffer = workspace.open_buffer("Notes");
//! let root = workspace.buffer_state(buffer).unwrap().root;
//! workspace.insert_block(root, InsertPosition::Append, "First").unwrap();
//!
//! let result = workspace
//!     .execute(buffer, Command::Cursor(CursorCommand::Move(Direction::Down)))
//!     .unwrap();
//! assert_eq!(result, CommandResult::Applied);
//! ```

use crate::buffer::Session;
use crate::edit;
use crate::error::OutlineResult;
use crate::navigation;
use crate::selection::FocusState;
use crate::structure;
use crate::tree::NodeId;

/// Arrow direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
}

/// Vertical-only direction (swaps and moves to the extremes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalDirection {
    /// Toward the first sibling.
    Up,
    /// Toward the last sibling.
    Down,
}

/// Focus and selection commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorCommand {
    /// Plain arrow: move the caret or the block focus.
    Move(Direction),
    /// Shift+arrow: extend the text range or the block range.
    Extend(Direction),
    /// Leave text editing and select the current block.
    SelectBlock,
    /// Clear the focus entirely.
    ClearFocus,
    /// Start editing the focused block, caret at text end.
    EditBlock,
    /// Select the whole block text, then all sibling blocks.
    SelectAll,
    /// Re-root the buffer at the focused block.
    DrillIn,
    /// Re-root the buffer at the current root's parent.
    DrillOut,
    /// Host-driven focus change (e.g. a click); validated and auto-expanded.
    SetFocus(FocusState),
}

/// Folding commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldCommand {
    /// Collapse the deepest expanded level under each target.
    CollapseOneLevel,
    /// Expand the shallowest collapsed level under each target.
    ExpandOneLevel,
    /// Collapse each target block.
    Collapse,
    /// Expand each target block.
    Expand,
    /// Toggle each target block.
    Toggle,
    /// Collapse each target and all of its descendants.
    CollapseAll,
    /// Expand each target and all of its descendants.
    ExpandAll,
}

/// Block relocation commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureCommand {
    /// Exchange with the adjacent sibling, crossing the parent boundary at the edges.
    Swap(VerticalDirection),
    /// Move to the first / last position among the siblings.
    MoveToExtreme(VerticalDirection),
    /// Become the last children of the previous sibling.
    Indent,
    /// Become siblings right after the parent.
    Outdent,
    /// Become siblings right after the top-level ancestor.
    OutdentToTop,
}

/// Text and block editing commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert (or replace the selection with) typed text.
    InsertText(String),
    /// Split the block at the caret (Enter).
    Split,
    /// Delete backward; merges into the previous sibling at offset 0.
    Backspace,
    /// Delete forward; merges the next block in at text end.
    DeleteForward,
    /// Delete the focused block(s) together with all descendants.
    ForceDelete,
}

/// Clipboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardCommand {
    /// Produce the clipboard text.
    Copy,
    /// Produce the clipboard text and remove the source.
    Cut,
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Focus and selection commands
    Cursor(CursorCommand),
    /// Folding commands
    Fold(FoldCommand),
    /// Block relocation commands
    Structure(StructureCommand),
    /// Text and block editing commands
    Edit(EditCommand),
    /// Clipboard commands
    Clipboard(ClipboardCommand),
}

impl Command {
    /// Whether the command can touch the node tree. Focus and fold commands only change the
    /// buffer.
    pub fn may_edit_tree(&self) -> bool {
        !matches!(
            self,
            Command::Cursor(_) | Command::Fold(_) | Command::Clipboard(ClipboardCommand::Copy)
        )
    }
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// State changed.
    Applied,
    /// Silent no-op: nothing was mutated.
    Unchanged,
    /// Nothing moved; the render layer should scroll the buffer to the top.
    ScrollToTop,
    /// Clipboard text produced by copy/cut.
    Clipboard(String),
}

impl CommandResult {
    pub(crate) fn from_changed(changed: bool) -> Self {
        if changed {
            CommandResult::Applied
        } else {
            CommandResult::Unchanged
        }
    }
}

/// Run one command against a session.
pub fn execute(session: &mut Session<'_>, command: Command) -> OutlineResult<CommandResult> {
    tracing::debug!(?command, mode = ?session.buffer.mode(), "execute");
    match command {
        Command::Cursor(cursor) => execute_cursor(session, cursor),
        Command::Fold(fold) => execute_fold(session, fold),
        Command::Structure(structure) => structure::apply(session, structure),
        Command::Edit(edit) => execute_edit(session, edit),
        Command::Clipboard(ClipboardCommand::Copy) => edit::copy(session),
        Command::Clipboard(ClipboardCommand::Cut) => edit::cut(session),
    }
}

fn execute_cursor(
    session: &mut Session<'_>,
    command: CursorCommand,
) -> OutlineResult<CommandResult> {
    match command {
        CursorCommand::Move(direction) => navigation::move_focus(session, direction),
        CursorCommand::Extend(direction) => navigation::extend_focus(session, direction),
        CursorCommand::SelectBlock => navigation::select_current_block(session),
        CursorCommand::ClearFocus => navigation::clear_focus(session),
        CursorCommand::EditBlock => navigation::edit_block(session),
        CursorCommand::SelectAll => navigation::select_all(session),
        CursorCommand::DrillIn => navigation::drill_in(session),
        CursorCommand::DrillOut => navigation::drill_out(session),
        CursorCommand::SetFocus(focus) => navigation::set_focus(session, focus),
    }
}

fn execute_edit(session: &mut Session<'_>, command: EditCommand) -> OutlineResult<CommandResult> {
    match command {
        EditCommand::InsertText(text) => edit::insert_text(session, &text),
        EditCommand::Split => edit::split(session),
        EditCommand::Backspace => edit::backspace(session),
        EditCommand::DeleteForward => edit::delete_forward(session),
        EditCommand::ForceDelete => edit::force_delete(session),
    }
}

/// Blocks a fold command applies to: the focused block(s), or every top-level block when
/// nothing (or only the title) is focused.
fn fold_targets(session: &Session<'_>) -> OutlineResult<Vec<NodeId>> {
    Ok(match session.buffer.focus() {
        FocusState::None | FocusState::Title { .. } => {
            session.tree.children(session.root())?.to_vec()
        }
        FocusState::Text(selection) => vec![selection.node],
        FocusState::Blocks(selection) => selection.nodes().to_vec(),
    })
}

fn execute_fold(session: &mut Session<'_>, command: FoldCommand) -> OutlineResult<CommandResult> {
    let targets = fold_targets(session)?;
    let tree = &*session.tree;
    let fold = session.buffer.fold_mut();

    let mut changed = false;
    for target in targets {
        changed |= match command {
            FoldCommand::CollapseOneLevel => fold.collapse_one_level(tree, target)?,
            FoldCommand::ExpandOneLevel => fold.expand_one_level(tree, target)?,
            FoldCommand::Collapse => fold.collapse_block(tree, target),
            FoldCommand::Expand => fold.expand_block(tree, target),
            FoldCommand::Toggle => fold.toggle(tree, target),
            FoldCommand::CollapseAll => fold.collapse_all(tree, target)?,
            FoldCommand::ExpandAll => fold.expand_all(tree, target)?,
        };
    }

    tracing::trace!(?command, changed, "fold");
    Ok(CommandResult::from_changed(changed))
}
