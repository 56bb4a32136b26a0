//! Structural Edit Engine: text input, split and merge, block deletion, clipboard.
//!
//! Tree mutations run before any text write, so a command that fails half way has only touched
//! state the executor snapshots and restores.

use crate::buffer::Session;
use crate::commands::CommandResult;
use crate::error::OutlineResult;
use crate::selection::{BlockSelection, FocusState, TextSelection};
use crate::text::{
    byte_index, char_range, next_grapheme_offset, previous_grapheme_offset, remove_char_range,
    split_at_char,
};
use crate::tree::{InsertPosition, NodeId};

/// Replace the text range `start..end` of `node` with `insert`; returns the offset after the
/// inserted text.
fn replace_range(
    session: &mut Session<'_>,
    node: NodeId,
    start: usize,
    end: usize,
    insert: &str,
) -> usize {
    let mut text = remove_char_range(&session.text.text(node), start, end);
    let start = start.min(end);
    text.insert_str(byte_index(&text, start), insert);
    session.text.set_text(node, text);
    start + insert.chars().count()
}

/// Typed text replaces the selection or goes in at the caret.
pub fn insert_text(session: &mut Session<'_>, input: &str) -> OutlineResult<CommandResult> {
    if input.is_empty() {
        return Ok(CommandResult::Unchanged);
    }
    match session.buffer.focus().clone() {
        FocusState::Text(selection) => {
            let node = selection.node;
            let offset = replace_range(session, node, selection.start(), selection.end(), input);
            session.focus(FocusState::Text(TextSelection::caret(node, offset)))?;
        }
        FocusState::Title { offset } => {
            let root = session.root();
            let offset = replace_range(session, root, offset, offset, input);
            session.focus(FocusState::Title { offset })?;
        }
        FocusState::None | FocusState::Blocks(_) => return Ok(CommandResult::Unchanged),
    }
    Ok(CommandResult::Applied)
}

/// Remove `start..end` from the caret block and leave a collapsed caret at `start`.
fn delete_text_range(
    session: &mut Session<'_>,
    node: NodeId,
    start: usize,
    end: usize,
) -> OutlineResult<CommandResult> {
    replace_range(session, node, start, end, "");
    session.focus(FocusState::Text(TextSelection::caret(node, start.min(end))))?;
    Ok(CommandResult::Applied)
}

/// Backspace.
pub fn backspace(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    match session.buffer.focus().clone() {
        FocusState::Text(selection) if !selection.is_collapsed() => {
            delete_text_range(session, selection.node, selection.start(), selection.end())
        }
        FocusState::Text(selection) if selection.focus > 0 => {
            let text = session.text.text(selection.node);
            let start = previous_grapheme_offset(&text, selection.focus);
            delete_text_range(session, selection.node, start, selection.focus)
        }
        FocusState::Text(selection) => merge_backward(session, selection.node),
        FocusState::Title { offset } if offset > 0 => {
            let root = session.root();
            let title = session.text.text(root);
            let start = previous_grapheme_offset(&title, offset);
            replace_range(session, root, start, offset, "");
            session.focus(FocusState::Title { offset: start })?;
            Ok(CommandResult::Applied)
        }
        FocusState::Blocks(selection) => delete_blocks(session, &selection, false),
        FocusState::Title { .. } | FocusState::None => Ok(CommandResult::Unchanged),
    }
}

/// Delete.
pub fn delete_forward(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    match session.buffer.focus().clone() {
        FocusState::Text(selection) if !selection.is_collapsed() => {
            delete_text_range(session, selection.node, selection.start(), selection.end())
        }
        FocusState::Text(selection) => {
            let text = session.text.text(selection.node);
            let end = next_grapheme_offset(&text, selection.focus);
            if end > selection.focus {
                delete_text_range(session, selection.node, selection.focus, end)
            } else {
                merge_forward(session, selection.node, selection.focus)
            }
        }
        FocusState::Title { offset } => {
            let root = session.root();
            let title = session.text.text(root);
            let end = next_grapheme_offset(&title, offset);
            if end == offset {
                return Ok(CommandResult::Unchanged);
            }
            replace_range(session, root, offset, end, "");
            session.focus(FocusState::Title { offset })?;
            Ok(CommandResult::Applied)
        }
        FocusState::Blocks(selection) => delete_blocks(session, &selection, false),
        FocusState::None => Ok(CommandResult::Unchanged),
    }
}

/// Backspace at offset 0: fold the block into its previous sibling.
///
/// Never crosses into the parent and never runs when the block has children.
pub fn merge_backward(session: &mut Session<'_>, node: NodeId) -> OutlineResult<CommandResult> {
    let Some(previous) = session.tree.previous_sibling(node)? else {
        return Ok(CommandResult::Unchanged);
    };
    if session.tree.has_children(node) {
        return Ok(CommandResult::Unchanged);
    }

    let mut merged = session.text.text(previous);
    let offset = merged.chars().count();
    merged.push_str(&session.text.text(node));

    session.delete_block(node, false)?;
    session.text.set_text(previous, merged);
    session.focus(FocusState::Text(TextSelection::caret(previous, offset)))?;
    tracing::debug!(%node, into = %previous, "merged backward");
    Ok(CommandResult::Applied)
}

/// Delete at text end: pull the next block's text in.
///
/// The next block is the first child when `node` shows its children, otherwise the next
/// sibling. Nothing happens when that block has children of its own.
pub fn merge_forward(
    session: &mut Session<'_>,
    node: NodeId,
    offset: usize,
) -> OutlineResult<CommandResult> {
    let target = if session.buffer.fold().shows_children(session.tree, node) {
        session.tree.first_child(node)?
    } else {
        session.tree.next_sibling(node)?
    };
    let Some(target) = target else {
        return Ok(CommandResult::Unchanged);
    };
    if session.tree.has_children(target) {
        return Ok(CommandResult::Unchanged);
    }

    let mut merged = session.text.text(node);
    merged.push_str(&session.text.text(target));

    session.delete_block(target, false)?;
    session.text.set_text(node, merged);
    session.focus(FocusState::Text(TextSelection::caret(node, offset)))?;
    tracing::debug!(%node, from = %target, "merged forward");
    Ok(CommandResult::Applied)
}

/// Enter: split the caret block in two (or add a first child from the title).
pub fn split(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    match session.buffer.focus().clone() {
        FocusState::Text(selection) => split_block(session, &selection),
        FocusState::Title { .. } => {
            let root = session.root();
            let child = session.tree.insert_node(root, InsertPosition::Prepend, None)?;
            session.focus(FocusState::Text(TextSelection::caret(child, 0)))?;
            Ok(CommandResult::Applied)
        }
        FocusState::Blocks(_) => crate::navigation::edit_block(session),
        FocusState::None => Ok(CommandResult::Unchanged),
    }
}

fn split_block(session: &mut Session<'_>, selection: &TextSelection) -> OutlineResult<CommandResult> {
    let node = selection.node;
    let caret = selection.start();
    let text = remove_char_range(&session.text.text(node), caret, selection.end());
    let parent = session.tree.parent(node)?;
    let (before, after) = split_at_char(&text, caret);

    if before.is_empty() && !after.is_empty() {
        session
            .tree
            .insert_node(parent, InsertPosition::Before(node), None)?;
        session.text.set_text(node, text);
        session.focus(FocusState::Text(TextSelection::caret(node, 0)))?;
    } else {
        let sibling = session
            .tree
            .insert_node(parent, InsertPosition::After(node), None)?;
        let (before, after) = (before.to_string(), after.to_string());
        session.text.set_text(node, before);
        session.text.set_text(sibling, after);
        session.focus(FocusState::Text(TextSelection::caret(sibling, 0)))?;
    }
    Ok(CommandResult::Applied)
}

/// Shift+Backspace / Shift+Delete: remove the focused block(s) with every descendant.
pub fn force_delete(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    match session.buffer.focus().clone() {
        FocusState::Text(selection) => delete_caret_block(session, selection.node),
        FocusState::Blocks(selection) => delete_blocks(session, &selection, true),
        FocusState::Title { .. } | FocusState::None => Ok(CommandResult::Unchanged),
    }
}

/// Delete the caret block and its subtree; the caret goes to the end of the previous visible
/// block, else the start of the next one, else the title.
fn delete_caret_block(session: &mut Session<'_>, node: NodeId) -> OutlineResult<CommandResult> {
    let root = session.root();
    let previous = session.previous_visible(node)?;
    let next = session
        .tree
        .next_in_order(node, root, |id| {
            id != node && (id == root || session.buffer.fold().is_expanded(id))
        })?;

    session.delete_block(node, true)?;

    let focus = match (previous, next) {
        (Some(previous), _) => {
            FocusState::Text(TextSelection::caret(previous, session.text.len(previous)))
        }
        (None, Some(next)) => FocusState::Text(TextSelection::caret(next, 0)),
        (None, None) => FocusState::Title {
            offset: session.text.len(root),
        },
    };
    session.focus(focus)?;
    tracing::debug!(%node, "deleted block");
    Ok(CommandResult::Applied)
}

/// Delete the selected blocks, lifting their children into place unless `cascade`.
///
/// Focus then lands on the block now preceding the gap, else the block now occupying it, else
/// the parent (below the buffer root), else nothing.
pub fn delete_blocks(
    session: &mut Session<'_>,
    selection: &BlockSelection,
    cascade: bool,
) -> OutlineResult<CommandResult> {
    let first = selection.first();
    let parent = session.tree.parent(first)?;
    let index = session.tree.index_in_parent(first)?;

    for &node in selection.nodes() {
        session.delete_block(node, cascade)?;
    }

    let siblings = session.tree.children(parent)?;
    let target = if index > 0 {
        siblings.get(index - 1).copied()
    } else {
        siblings.first().copied()
    }
    .or_else(|| (parent != session.root()).then_some(parent));

    match target {
        Some(node) => session.focus(FocusState::Blocks(BlockSelection::single(node)))?,
        None => session.buffer.clear_focus(),
    }
    tracing::debug!(count = selection.len(), cascade, "deleted blocks");
    Ok(CommandResult::Applied)
}

/// Text blob of the given blocks and all their descendants in document order.
pub fn blocks_blob(session: &Session<'_>, nodes: &[NodeId]) -> OutlineResult<String> {
    let mut parts = Vec::new();
    for &node in nodes {
        parts.push(session.text.text(node));
        for descendant in session.tree.descendants(node)? {
            parts.push(session.text.text(descendant));
        }
    }
    Ok(parts.join(&session.config.paragraph_separator))
}

/// Mod+C.
pub fn copy(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    let blob = match session.buffer.focus() {
        FocusState::None => return Ok(CommandResult::Unchanged),
        FocusState::Title { .. } => session.text.text(session.root()),
        FocusState::Text(selection) if selection.is_collapsed() => {
            session.text.text(selection.node)
        }
        FocusState::Text(selection) => {
            char_range(&session.text.text(selection.node), selection.start(), selection.end())
                .to_string()
        }
        FocusState::Blocks(selection) => blocks_blob(session, selection.nodes())?,
    };
    Ok(CommandResult::Clipboard(blob))
}

/// Mod+X: copy, then remove what was copied.
pub fn cut(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    match session.buffer.focus().clone() {
        FocusState::None | FocusState::Title { .. } => Ok(CommandResult::Unchanged),
        FocusState::Text(selection) if !selection.is_collapsed() => {
            let blob = char_range(
                &session.text.text(selection.node),
                selection.start(),
                selection.end(),
            )
            .to_string();
            delete_text_range(session, selection.node, selection.start(), selection.end())?;
            Ok(CommandResult::Clipboard(blob))
        }
        FocusState::Text(selection) => {
            let blob = blocks_blob(session, &[selection.node])?;
            delete_caret_block(session, selection.node)?;
            Ok(CommandResult::Clipboard(blob))
        }
        FocusState::Blocks(selection) => {
            let blob = blocks_blob(session, selection.nodes())?;
            delete_blocks(session, &selection, true)?;
            Ok(CommandResult::Clipboard(blob))
        }
    }
}
