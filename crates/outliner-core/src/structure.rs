//! Structural Edit Engine: block relocation.
//!
//! Every relocation goes through the batch [`NodeTree::move_nodes`] primitive, so a run of
//! selected siblings moves as one unit and keeps its order. After the move the focus is
//! rewritten with the same identities, which auto-expands any collapsed block the run landed
//! under.
//!
//! [`NodeTree::move_nodes`]: crate::tree::NodeTree::move_nodes

use crate::buffer::Session;
use crate::commands::{CommandResult, StructureCommand, VerticalDirection};
use crate::error::OutlineResult;
use crate::selection::FocusState;
use crate::tree::{InsertPosition, NodeId};

/// Run a relocation command on the focused block(s).
pub fn apply(session: &mut Session<'_>, command: StructureCommand) -> OutlineResult<CommandResult> {
    let focus = session.buffer.focus().clone();
    let ids = match &focus {
        FocusState::None | FocusState::Title { .. } => return Ok(CommandResult::Unchanged),
        FocusState::Text(selection) => vec![selection.node],
        FocusState::Blocks(selection) => selection.nodes().to_vec(),
    };

    let moved = match command {
        StructureCommand::Swap(direction) => swap(session, &ids, direction)?,
        StructureCommand::MoveToExtreme(direction) => move_to_extreme(session, &ids, direction)?,
        StructureCommand::Indent => indent(session, &ids)?,
        StructureCommand::Outdent => outdent(session, &ids)?,
        StructureCommand::OutdentToTop => outdent_to_top(session, &ids)?,
    };
    if !moved {
        return Ok(CommandResult::Unchanged);
    }

    let refocus = match focus {
        FocusState::Blocks(selection) => FocusState::Blocks(selection.refreshed(session.tree)?),
        other => other,
    };
    session.focus(refocus)?;
    tracing::debug!(?command, count = ids.len(), "moved blocks");
    Ok(CommandResult::Applied)
}

fn first_and_last(ids: &[NodeId]) -> (NodeId, NodeId) {
    (ids[0], ids[ids.len() - 1])
}

/// Exchange the run with its neighbour; at the edge of the sibling group, cross into the
/// parent's neighbour or step out next to the parent.
pub fn swap(
    session: &mut Session<'_>,
    ids: &[NodeId],
    direction: VerticalDirection,
) -> OutlineResult<bool> {
    let (first, last) = first_and_last(ids);
    let parent = session.tree.parent(first)?;
    let root = session.root();

    match direction {
        VerticalDirection::Up => {
            if let Some(previous) = session.tree.previous_sibling(first)? {
                session
                    .tree
                    .move_nodes(ids, parent, InsertPosition::Before(previous))?;
            } else if parent == root {
                return Ok(false);
            } else if let Some(aunt) = session.tree.previous_sibling(parent)? {
                session.tree.move_nodes(ids, aunt, InsertPosition::Append)?;
            } else {
                let grandparent = session.tree.parent(parent)?;
                session
                    .tree
                    .move_nodes(ids, grandparent, InsertPosition::Before(parent))?;
            }
        }
        VerticalDirection::Down => {
            if let Some(next) = session.tree.next_sibling(last)? {
                session
                    .tree
                    .move_nodes(ids, parent, InsertPosition::After(next))?;
            } else if parent == root {
                return Ok(false);
            } else if let Some(uncle) = session.tree.next_sibling(parent)? {
                session.tree.move_nodes(ids, uncle, InsertPosition::Prepend)?;
            } else {
                let grandparent = session.tree.parent(parent)?;
                session
                    .tree
                    .move_nodes(ids, grandparent, InsertPosition::After(parent))?;
            }
        }
    }
    Ok(true)
}

/// Move the run to the first or last position among its siblings.
pub fn move_to_extreme(
    session: &mut Session<'_>,
    ids: &[NodeId],
    direction: VerticalDirection,
) -> OutlineResult<bool> {
    let (first, last) = first_and_last(ids);
    let parent = session.tree.parent(first)?;
    let position = match direction {
        VerticalDirection::Up if session.tree.previous_sibling(first)?.is_none() => {
            return Ok(false);
        }
        VerticalDirection::Down if session.tree.next_sibling(last)?.is_none() => {
            return Ok(false);
        }
        VerticalDirection::Up => InsertPosition::Prepend,
        VerticalDirection::Down => InsertPosition::Append,
    };
    session.tree.move_nodes(ids, parent, position)?;
    Ok(true)
}

/// Make the run the last children of the preceding sibling.
pub fn indent(session: &mut Session<'_>, ids: &[NodeId]) -> OutlineResult<bool> {
    let (first, _) = first_and_last(ids);
    let Some(previous) = session.tree.previous_sibling(first)? else {
        return Ok(false);
    };
    session
        .tree
        .move_nodes(ids, previous, InsertPosition::Append)?;
    Ok(true)
}

/// Make the run siblings placed right after its parent.
pub fn outdent(session: &mut Session<'_>, ids: &[NodeId]) -> OutlineResult<bool> {
    let (first, _) = first_and_last(ids);
    let parent = session.tree.parent(first)?;
    if parent == session.root() {
        return Ok(false);
    }
    let grandparent = session.tree.parent(parent)?;
    session
        .tree
        .move_nodes(ids, grandparent, InsertPosition::After(parent))?;
    Ok(true)
}

/// Make the run top-level blocks placed right after their top-level ancestor.
pub fn outdent_to_top(session: &mut Session<'_>, ids: &[NodeId]) -> OutlineResult<bool> {
    let (first, _) = first_and_last(ids);
    let root = session.root();
    if session.tree.parent(first)? == root {
        return Ok(false);
    }
    let ancestors = session.tree.ancestors(first)?;
    let Some(top) = ancestors
        .iter()
        .position(|&ancestor| ancestor == root)
        .and_then(|index| index.checked_sub(1))
        .map(|index| ancestors[index])
    else {
        return Ok(false);
    };
    session
        .tree
        .move_nodes(ids, root, InsertPosition::After(top))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::config::OutlinerConfig;
    use crate::selection::BlockSelection;
    use crate::text::MemoryTextStore;
    use crate::tree::NodeTree;

    /// root
    /// ├── a
    /// │   ├── a1
    /// │   └── a2
    /// └── b
    ///     └── b1
    fn sample() -> (NodeTree, NodeId, [NodeId; 5]) {
        let mut tree = NodeTree::new();
        let root = tree.create_root();
        let a = tree.insert_node(root, InsertPosition::Append, None).unwrap();
        let a1 = tree.insert_node(a, InsertPosition::Append, None).unwrap();
        let a2 = tree.insert_node(a, InsertPosition::Append, None).unwrap();
        let b = tree.insert_node(root, InsertPosition::Append, None).unwrap();
        let b1 = tree.insert_node(b, InsertPosition::Append, None).unwrap();
        (tree, root, [a, a1, a2, b, b1])
    }

    fn run(
        tree: &mut NodeTree,
        root: NodeId,
        selected: &[NodeId],
        command: StructureCommand,
    ) -> (CommandResult, Buffer) {
        let mut text = MemoryTextStore::new();
        let config = OutlinerConfig::default();
        let mut buffer = Buffer::new(root);
        let selection = BlockSelection::from_nodes(tree, selected).unwrap();
        buffer
            .set_focus(tree, FocusState::Blocks(selection))
            .unwrap();
        let mut session = Session::new(tree, &mut text, &mut buffer, &config);
        let result = apply(&mut session, command).unwrap();
        (result, buffer)
    }

    #[test]
    fn test_swap_within_siblings() {
        let (mut tree, root, [a, _, _, b, _]) = sample();
        let (result, _) = run(
            &mut tree,
            root,
            &[b],
            StructureCommand::Swap(VerticalDirection::Up),
        );
        assert_eq!(result, CommandResult::Applied);
        assert_eq!(tree.children(root).unwrap(), &[b, a]);
    }

    #[test]
    fn test_swap_up_crosses_into_aunt() {
        let (mut tree, root, [a, a1, a2, b, b1]) = sample();
        run(
            &mut tree,
            root,
            &[b1],
            StructureCommand::Swap(VerticalDirection::Up),
        );
        assert_eq!(tree.children(a).unwrap(), &[a1, a2, b1]);
        assert!(tree.children(b).unwrap().is_empty());
        assert_eq!(tree.children(root).unwrap(), &[a, b]);
    }

    #[test]
    fn test_swap_down_crosses_into_uncle() {
        let (mut tree, root, [a, a1, a2, b, b1]) = sample();
        run(
            &mut tree,
            root,
            &[a2],
            StructureCommand::Swap(VerticalDirection::Down),
        );
        assert_eq!(tree.children(a).unwrap(), &[a1]);
        assert_eq!(tree.children(b).unwrap(), &[a2, b1]);
    }

    #[test]
    fn test_swap_up_without_aunt_steps_before_parent() {
        let (mut tree, root, [a, a1, a2, b, _]) = sample();
        run(
            &mut tree,
            root,
            &[a1],
            StructureCommand::Swap(VerticalDirection::Up),
        );
        assert_eq!(tree.children(root).unwrap(), &[a1, a, b]);
        assert_eq!(tree.children(a).unwrap(), &[a2]);
    }

    #[test]
    fn test_swap_at_root_level_edge_is_noop() {
        let (mut tree, root, [a, ..]) = sample();
        let version = tree.version();
        let (result, _) = run(
            &mut tree,
            root,
            &[a],
            StructureCommand::Swap(VerticalDirection::Up),
        );
        assert_eq!(result, CommandResult::Unchanged);
        assert_eq!(tree.version(), version);
    }

    #[test]
    fn test_indent_into_collapsed_sibling_expands_it() {
        let (mut tree, root, [a, a1, a2, b, _]) = sample();
        let mut text = MemoryTextStore::new();
        let config = OutlinerConfig::default();
        let mut buffer = Buffer::new(root);
        buffer.fold_mut().set_expanded(a, false);
        buffer
            .set_focus(&tree, FocusState::Blocks(BlockSelection::single(b)))
            .unwrap();
        let mut session = Session::new(&mut tree, &mut text, &mut buffer, &config);
        apply(&mut session, StructureCommand::Indent).unwrap();

        assert_eq!(tree.children(a).unwrap(), &[a1, a2, b]);
        assert!(buffer.fold().is_expanded(a));
        assert!(buffer.is_visible(&tree, b));
    }

    #[test]
    fn test_outdent_to_top_from_depth_two() {
        let (mut tree, root, [a, a1, _, b, _]) = sample();
        let deep = tree.insert_node(a1, InsertPosition::Append, None).unwrap();
        run(&mut tree, root, &[deep], StructureCommand::OutdentToTop);
        assert_eq!(tree.children(root).unwrap(), &[a, deep, b]);
        assert!(tree.is_well_formed());
    }

    #[test]
    fn test_move_run_to_extreme_keeps_order() {
        let mut tree = NodeTree::new();
        let root = tree.create_root();
        let ids: Vec<_> = (0..4)
            .map(|_| tree.insert_node(root, InsertPosition::Append, None).unwrap())
            .collect();
        let (_, buffer) = run(
            &mut tree,
            root,
            &[ids[2], ids[3]],
            StructureCommand::MoveToExtreme(VerticalDirection::Up),
        );
        assert_eq!(
            tree.children(root).unwrap(),
            &[ids[2], ids[3], ids[0], ids[1]]
        );
        let FocusState::Blocks(selection) = buffer.focus() else {
            panic!("expected block selection");
        };
        assert_eq!(selection.nodes(), &[ids[2], ids[3]]);
    }
}
