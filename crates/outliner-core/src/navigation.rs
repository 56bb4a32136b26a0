//! Navigation Engine
//!
//! Maps directional commands to the next focus target of a buffer. Block focus moves among
//! siblings and along the parent/child axis; text carets move by grapheme horizontally and by
//! visual line vertically, crossing into neighbouring blocks in visible order. Vertical motion
//! keeps a goal column so the caret returns to the same cell column after passing shorter
//! lines.

use crate::buffer::Session;
use crate::commands::{CommandResult, Direction};
use crate::error::{OutlineError, OutlineResult};
use crate::layout::Affinity;
use crate::selection::{BlockSelection, FocusState, GoalLine, TextSelection};
use crate::text::{next_grapheme_offset, previous_grapheme_offset};
use crate::tree::NodeId;

/// Plain arrow.
pub fn move_focus(session: &mut Session<'_>, direction: Direction) -> OutlineResult<CommandResult> {
    match session.buffer.focus().clone() {
        FocusState::None => activate(session, direction),
        FocusState::Title { offset } => move_in_title(session, offset, direction),
        FocusState::Text(selection) => move_in_text(session, selection, direction),
        FocusState::Blocks(selection) => move_blocks(session, selection, direction),
    }
}

/// Shift+arrow.
pub fn extend_focus(
    session: &mut Session<'_>,
    direction: Direction,
) -> OutlineResult<CommandResult> {
    match session.buffer.focus().clone() {
        FocusState::None | FocusState::Title { .. } => Ok(CommandResult::Unchanged),
        FocusState::Text(selection) => extend_text(session, selection, direction),
        FocusState::Blocks(selection) => extend_blocks(session, selection, direction),
    }
}

/// First focus of an unfocused buffer: the first (Down) or last (Up) top-level block, or the
/// title when the buffer is empty.
fn activate(session: &mut Session<'_>, direction: Direction) -> OutlineResult<CommandResult> {
    let root = session.root();
    let children = session.tree.children(root)?;
    let target = match direction {
        Direction::Down => children.first().copied(),
        Direction::Up => children.last().copied(),
        Direction::Left | Direction::Right => return Ok(CommandResult::Unchanged),
    };
    match target {
        Some(node) => session.focus(FocusState::Blocks(BlockSelection::single(node)))?,
        None => {
            let offset = session.text.len(root);
            session.focus(FocusState::Title { offset })?;
        }
    }
    Ok(CommandResult::Applied)
}

fn move_in_title(
    session: &mut Session<'_>,
    offset: usize,
    direction: Direction,
) -> OutlineResult<CommandResult> {
    let root = session.root();
    let title = session.text.text(root);
    let len = title.chars().count();
    match direction {
        Direction::Up => Ok(CommandResult::Unchanged),
        Direction::Left if offset == 0 => Ok(CommandResult::Unchanged),
        Direction::Left => {
            let offset = previous_grapheme_offset(&title, offset);
            session.focus(FocusState::Title { offset })?;
            Ok(CommandResult::Applied)
        }
        Direction::Right if offset < len => {
            let offset = next_grapheme_offset(&title, offset);
            session.focus(FocusState::Title { offset })?;
            Ok(CommandResult::Applied)
        }
        Direction::Right => match session.tree.first_child(root)? {
            Some(child) => {
                session.focus(FocusState::Text(TextSelection::caret(child, 0)))?;
                Ok(CommandResult::Applied)
            }
            None => Ok(CommandResult::Unchanged),
        },
        Direction::Down => {
            let Some(child) = session.tree.first_child(root)? else {
                return Ok(CommandResult::Unchanged);
            };
            let layout = session.layout(root);
            let line = layout.line_of(offset, Default::default());
            let goal_x = layout.x_of(offset, line);
            enter_block(session, child, goal_x, GoalLine::First)?;
            Ok(CommandResult::Applied)
        }
    }
}

/// Put the caret into `node` at `goal_x` on its first or last visual line.
fn enter_block(
    session: &mut Session<'_>,
    node: NodeId,
    goal_x: usize,
    goal_line: GoalLine,
) -> OutlineResult<()> {
    let layout = session.layout(node);
    let line = match goal_line {
        GoalLine::First => 0,
        GoalLine::Last => layout.last_line(),
    };
    let offset = layout.offset_at_x(line, goal_x);
    let selection = TextSelection::caret(node, offset)
        .with_goal(Some(goal_x), Some(goal_line))
        .with_affinity(layout.affinity_for(offset, line));
    session.focus(FocusState::Text(selection))
}

/// Caret at the end of the previous visible block, or at the end of the title.
fn caret_before(session: &mut Session<'_>, node: NodeId) -> OutlineResult<()> {
    match session.previous_visible(node)? {
        Some(previous) => {
            let offset = session.text.len(previous);
            session.focus(FocusState::Text(TextSelection::caret(previous, offset)))
        }
        None => {
            let offset = session.text.len(session.root());
            session.focus(FocusState::Title { offset })
        }
    }
}

fn move_in_text(
    session: &mut Session<'_>,
    selection: TextSelection,
    direction: Direction,
) -> OutlineResult<CommandResult> {
    let node = selection.node;
    match direction {
        Direction::Left => {
            if !selection.is_collapsed() {
                let caret = TextSelection::caret(node, selection.start());
                session.focus(FocusState::Text(caret))?;
            } else if selection.focus > 0 {
                let text = session.text.text(node);
                let offset = previous_grapheme_offset(&text, selection.focus);
                session.focus(FocusState::Text(TextSelection::caret(node, offset)))?;
            } else {
                caret_before(session, node)?;
            }
            Ok(CommandResult::Applied)
        }
        Direction::Right => {
            let text = session.text.text(node);
            let len = text.chars().count();
            if !selection.is_collapsed() {
                let caret = TextSelection::caret(node, selection.end());
                session.focus(FocusState::Text(caret))?;
            } else if selection.focus < len {
                let offset = next_grapheme_offset(&text, selection.focus);
                session.focus(FocusState::Text(TextSelection::caret(node, offset)))?;
            } else {
                match session.next_visible(node)? {
                    Some(next) => {
                        session.focus(FocusState::Text(TextSelection::caret(next, 0)))?;
                    }
                    None => return Ok(CommandResult::Unchanged),
                }
            }
            Ok(CommandResult::Applied)
        }
        Direction::Up | Direction::Down => move_vertically(session, selection, direction),
    }
}

fn move_vertically(
    session: &mut Session<'_>,
    selection: TextSelection,
    direction: Direction,
) -> OutlineResult<CommandResult> {
    let node = selection.node;
    let layout = session.layout(node);
    let line = layout.line_of(selection.focus, selection.affinity);
    let goal_x = selection
        .goal_x
        .unwrap_or_else(|| layout.x_of(selection.focus, line));

    if direction == Direction::Up {
        if line > 0 {
            let target = line - 1;
            let offset = layout.offset_at_x(target, goal_x);
            let caret = TextSelection::caret(node, offset)
                .with_goal(Some(goal_x), None)
                .with_affinity(layout.affinity_for(offset, target));
            session.focus(FocusState::Text(caret))?;
            return Ok(CommandResult::Applied);
        }
        match session.previous_visible(node)? {
            Some(previous) => enter_block(session, previous, goal_x, GoalLine::Last)?,
            None => {
                let title = session.layout(session.root());
                let offset = title.offset_at_x(title.last_line(), goal_x);
                session.focus(FocusState::Title { offset })?;
            }
        }
        return Ok(CommandResult::Applied);
    }

    if line < layout.last_line() {
        let target = line + 1;
        let offset = layout.offset_at_x(target, goal_x);
        let caret = TextSelection::caret(node, offset)
            .with_goal(Some(goal_x), None)
            .with_affinity(layout.affinity_for(offset, target));
        session.focus(FocusState::Text(caret))?;
        return Ok(CommandResult::Applied);
    }
    match session.next_visible(node)? {
        Some(next) => enter_block(session, next, goal_x, GoalLine::First)?,
        None => {
            let len = layout.char_count();
            if selection.is_collapsed() && selection.focus == len {
                return Ok(CommandResult::Unchanged);
            }
            session.focus(FocusState::Text(TextSelection::caret(node, len)))?;
        }
    }
    Ok(CommandResult::Applied)
}

fn move_blocks(
    session: &mut Session<'_>,
    selection: BlockSelection,
    direction: Direction,
) -> OutlineResult<CommandResult> {
    let focus = selection.focus();
    let target = match direction {
        Direction::Up if selection.len() > 1 => Some(selection.first()),
        Direction::Down if selection.len() > 1 => Some(selection.last()),
        Direction::Up => {
            if session.tree.index_in_parent(focus)? == 0 {
                return Ok(CommandResult::ScrollToTop);
            }
            session.tree.previous_sibling(focus)?
        }
        Direction::Down => session.tree.next_sibling(focus)?,
        Direction::Left => {
            let parent = session.tree.parent(focus)?;
            (parent != session.root()).then_some(parent)
        }
        Direction::Right => session.tree.first_child(focus)?,
    };
    match target {
        Some(node) => {
            session.focus(FocusState::Blocks(BlockSelection::single(node)))?;
            Ok(CommandResult::Applied)
        }
        None => Ok(CommandResult::Unchanged),
    }
}

fn extend_text(
    session: &mut Session<'_>,
    selection: TextSelection,
    direction: Direction,
) -> OutlineResult<CommandResult> {
    let node = selection.node;
    let text = session.text.text(node);
    let len = text.chars().count();
    let anchor = selection.anchor;

    // Vertical arms name the visual line they landed on; a wrap-boundary offset must stay there.
    let (focus, goal_x, target_line) = match direction {
        Direction::Left if selection.focus == 0 => return Ok(CommandResult::Unchanged),
        Direction::Left => (previous_grapheme_offset(&text, selection.focus), None, None),
        Direction::Right if selection.focus >= len => return Ok(CommandResult::Unchanged),
        Direction::Right => (next_grapheme_offset(&text, selection.focus), None, None),
        Direction::Up | Direction::Down => {
            let layout = session.layout(node);
            let line = layout.line_of(selection.focus, selection.affinity);
            let goal_x = selection
                .goal_x
                .unwrap_or_else(|| layout.x_of(selection.focus, line));
            let up = direction == Direction::Up;
            if up && line > 0 {
                let target = line - 1;
                (layout.offset_at_x(target, goal_x), Some(goal_x), Some(target))
            } else if !up && line < layout.last_line() {
                let target = line + 1;
                (layout.offset_at_x(target, goal_x), Some(goal_x), Some(target))
            } else if up && selection.focus > 0 {
                (0, Some(goal_x), Some(0))
            } else if !up && selection.focus < len {
                (len, Some(goal_x), Some(layout.last_line()))
            } else {
                return extend_into_blocks(session, node, up);
            }
        }
    };

    let layout = session.layout(node);
    let line = target_line.unwrap_or_else(|| layout.line_of(focus, Affinity::default()));
    let affinity = layout.affinity_for(focus, line);
    let extended = TextSelection::range(node, anchor, focus)
        .with_goal(goal_x, None)
        .with_affinity(affinity);
    session.focus(FocusState::Text(extended))?;
    Ok(CommandResult::Applied)
}

/// Shift+Up/Down pressed at the block edge: leave the text and select blocks, anchored at the
/// current block and extended one sibling when there is one.
fn extend_into_blocks(
    session: &mut Session<'_>,
    node: NodeId,
    up: bool,
) -> OutlineResult<CommandResult> {
    let neighbour = if up {
        session.tree.previous_sibling(node)?
    } else {
        session.tree.next_sibling(node)?
    };
    let selection = match neighbour {
        Some(sibling) => BlockSelection::range(session.tree, node, sibling)?,
        None => BlockSelection::single(node),
    };
    session.focus(FocusState::Blocks(selection))?;
    Ok(CommandResult::Applied)
}

fn extend_blocks(
    session: &mut Session<'_>,
    selection: BlockSelection,
    direction: Direction,
) -> OutlineResult<CommandResult> {
    let focus = selection.focus();
    let target = match direction {
        Direction::Up => session.tree.previous_sibling(focus)?,
        Direction::Down => session.tree.next_sibling(focus)?,
        Direction::Left | Direction::Right => None,
    };
    let Some(target) = target else {
        return Ok(CommandResult::Unchanged);
    };
    let extended = BlockSelection::range(session.tree, selection.anchor(), target)?;
    session.focus(FocusState::Blocks(extended))?;
    Ok(CommandResult::Applied)
}

/// Escape while editing text: select the block holding the caret.
pub fn select_current_block(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    let FocusState::Text(selection) = session.buffer.focus() else {
        return Ok(CommandResult::Unchanged);
    };
    let node = selection.node;
    session.focus(FocusState::Blocks(BlockSelection::single(node)))?;
    Ok(CommandResult::Applied)
}

/// Escape with blocks or the title focused.
pub fn clear_focus(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    if *session.buffer.focus() == FocusState::None {
        return Ok(CommandResult::Unchanged);
    }
    session.buffer.clear_focus();
    Ok(CommandResult::Applied)
}

/// Enter on a block selection: edit the focused block with the caret at its end.
pub fn edit_block(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    let FocusState::Blocks(selection) = session.buffer.focus() else {
        return Ok(CommandResult::Unchanged);
    };
    let node = selection.focus();
    let offset = session.text.len(node);
    session.focus(FocusState::Text(TextSelection::caret(node, offset)))?;
    Ok(CommandResult::Applied)
}

/// Mod+A: the whole block text first, then every sibling block.
pub fn select_all(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    let group_member = match session.buffer.focus().clone() {
        FocusState::Title { .. } => return Ok(CommandResult::Unchanged),
        FocusState::None => match session.tree.first_child(session.root())? {
            Some(first) => first,
            None => return Ok(CommandResult::Unchanged),
        },
        FocusState::Text(selection) => {
            let len = session.text.len(selection.node);
            if selection.start() != 0 || selection.end() != len {
                let all = TextSelection::range(selection.node, 0, len);
                session.focus(FocusState::Text(all))?;
                return Ok(CommandResult::Applied);
            }
            selection.node
        }
        FocusState::Blocks(selection) => {
            if selection.len() == session.tree.siblings(selection.focus())?.len() {
                return Ok(CommandResult::Unchanged);
            }
            selection.focus()
        }
    };

    let siblings = session.tree.siblings(group_member)?;
    let (first, last) = (siblings[0], siblings[siblings.len() - 1]);
    let all = BlockSelection::range(session.tree, first, last)?;
    session.focus(FocusState::Blocks(all))?;
    Ok(CommandResult::Applied)
}

/// Re-root the buffer at the focused block.
pub fn drill_in(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    let Some(target) = session.buffer.focus().focus_node() else {
        return Ok(CommandResult::Unchanged);
    };
    session.buffer.set_root(target);
    match session.tree.first_child(target)? {
        Some(child) => session.focus(FocusState::Blocks(BlockSelection::single(child)))?,
        None => {
            let offset = session.text.len(target);
            session.focus(FocusState::Title { offset })?;
        }
    }
    tracing::debug!(root = %target, "drilled in");
    Ok(CommandResult::Applied)
}

/// Re-root the buffer at the parent of its root, selecting the former root.
pub fn drill_out(session: &mut Session<'_>) -> OutlineResult<CommandResult> {
    let old_root = session.root();
    let parent = match session.tree.parent(old_root) {
        Ok(parent) => parent,
        Err(OutlineError::NoParent(_)) => return Ok(CommandResult::Unchanged),
        Err(err) => return Err(err),
    };
    session.buffer.set_root(parent);
    session.focus(FocusState::Blocks(BlockSelection::single(old_root)))?;
    tracing::debug!(root = %parent, "drilled out");
    Ok(CommandResult::Applied)
}

/// Host-driven focus change, validated against the current tree and text.
pub fn set_focus(session: &mut Session<'_>, focus: FocusState) -> OutlineResult<CommandResult> {
    let focus = match focus {
        FocusState::Title { offset } => {
            let len = session.text.len(session.root());
            check_offset(session.root(), offset, len)?;
            FocusState::Title { offset }
        }
        FocusState::Text(selection) => {
            if !session.tree.contains(selection.node) {
                return Err(OutlineError::NodeNotFound(selection.node));
            }
            let len = session.text.len(selection.node);
            check_offset(selection.node, selection.anchor, len)?;
            check_offset(selection.node, selection.focus, len)?;
            FocusState::Text(selection)
        }
        FocusState::Blocks(selection) => FocusState::Blocks(selection.refreshed(session.tree)?),
        FocusState::None => {
            session.buffer.clear_focus();
            return Ok(CommandResult::Applied);
        }
    };
    session.focus(focus)?;
    Ok(CommandResult::Applied)
}

fn check_offset(node: NodeId, offset: usize, len: usize) -> OutlineResult<()> {
    if offset > len {
        return Err(OutlineError::InvalidOffset { node, offset, len });
    }
    Ok(())
}
