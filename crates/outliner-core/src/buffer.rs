//! Buffers and the per-command session.
//!
//! A [`Buffer`] is one open view of the outline: a root assignment, a focus state, a fold state
//! and the remembered last focused block. The engines never look anything up implicitly; every
//! call receives a [`Session`] naming the tree, the text store, the buffer and the config it
//! operates on.

use crate::config::OutlinerConfig;
use crate::error::{OutlineError, OutlineResult};
use crate::fold::FoldState;
use crate::layout::BlockLayout;
use crate::selection::{FocusMode, FocusState};
use crate::state::VisibleRow;
use crate::text::TextStore;
use crate::tree::{NodeId, NodeTree};

/// One open document view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    root: NodeId,
    focus: FocusState,
    last_focused_block: Option<NodeId>,
    fold: FoldState,
}

impl Buffer {
    /// Open a buffer rooted at `root` with nothing focused.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            focus: FocusState::None,
            last_focused_block: None,
            fold: FoldState::new(),
        }
    }

    /// Current root assignment.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current focus state.
    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    /// Current focus mode.
    pub fn mode(&self) -> FocusMode {
        self.focus.mode()
    }

    /// Most recently focused block; survives clearing the focus.
    pub fn last_focused_block(&self) -> Option<NodeId> {
        self.last_focused_block
    }

    /// Fold flags of this buffer.
    pub fn fold(&self) -> &FoldState {
        &self.fold
    }

    /// Mutable fold flags of this buffer.
    pub fn fold_mut(&mut self) -> &mut FoldState {
        &mut self.fold
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Replace the focus wholesale.
    ///
    /// Every block the new state names must exist under the buffer root; the collapsed
    /// ancestors between the root and each named block are expanded. Returns the expanded
    /// nodes. Clearing the focus (or focusing the title) expands nothing.
    pub fn set_focus(&mut self, tree: &NodeTree, focus: FocusState) -> OutlineResult<Vec<NodeId>> {
        let nodes = focus.nodes();
        for &node in &nodes {
            if node == self.root || !tree.is_within(self.root, node) {
                return Err(OutlineError::NodeNotFound(node));
            }
        }

        let mut expanded = Vec::new();
        for &node in &nodes {
            expanded.extend(self.fold.expand_ancestors(tree, self.root, node)?);
        }

        if let Some(node) = focus.focus_node() {
            self.last_focused_block = Some(node);
        }
        self.focus = focus;
        Ok(expanded)
    }

    /// Clear the focus, remembering the block that held it.
    pub fn clear_focus(&mut self) {
        if let Some(node) = self.focus.focus_node() {
            self.last_focused_block = Some(node);
        }
        self.focus = FocusState::None;
    }

    /// Whether `node` is currently rendered (all ancestors below the root expanded).
    pub fn is_visible(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree.is_within(self.root, node) && self.fold.is_visible(tree, self.root, node)
    }

    /// Blocks currently rendered, in visible order, with their depth below the root.
    pub fn visible_rows(&self, tree: &NodeTree) -> OutlineResult<Vec<VisibleRow>> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = tree
            .children(self.root)?
            .iter()
            .rev()
            .map(|&id| (id, 0))
            .collect();
        while let Some((node, depth)) = stack.pop() {
            let has_children = tree.has_children(node);
            let expanded = self.fold.is_expanded(node);
            rows.push(VisibleRow {
                node,
                depth,
                has_children,
                expanded,
            });
            if has_children && expanded {
                stack.extend(tree.children(node)?.iter().rev().map(|&id| (id, depth + 1)));
            }
        }
        Ok(rows)
    }

    /// Drop state that refers to deleted nodes. Returns `true` if the focus had to be cleared.
    pub(crate) fn forget_nodes(&mut self, removed: &[NodeId]) -> bool {
        self.fold.forget(removed.iter().copied());
        if self
            .last_focused_block
            .is_some_and(|node| removed.contains(&node))
        {
            self.last_focused_block = None;
        }
        let stale = self.focus.nodes().iter().any(|node| removed.contains(node));
        if stale {
            self.focus = FocusState::None;
        }
        stale
    }
}

/// Explicit context handed to every engine call: one command, one buffer.
pub struct Session<'a> {
    /// The shared node tree.
    pub tree: &'a mut NodeTree,
    /// The text collaborator.
    pub text: &'a mut dyn TextStore,
    /// The buffer the command targets.
    pub buffer: &'a mut Buffer,
    /// Workspace settings.
    pub config: &'a OutlinerConfig,
    removed: Vec<NodeId>,
}

impl<'a> Session<'a> {
    /// Bundle the collaborators of one command.
    pub fn new(
        tree: &'a mut NodeTree,
        text: &'a mut dyn TextStore,
        buffer: &'a mut Buffer,
        config: &'a OutlinerConfig,
    ) -> Self {
        Self {
            tree,
            text,
            buffer,
            config,
            removed: Vec::new(),
        }
    }

    /// Buffer root.
    pub fn root(&self) -> NodeId {
        self.buffer.root()
    }

    /// Replace the buffer focus (auto-expanding ancestors of the named blocks).
    pub fn focus(&mut self, focus: FocusState) -> OutlineResult<()> {
        self.buffer.set_focus(self.tree, focus)?;
        Ok(())
    }

    /// Layout of a block's text under the current config.
    pub fn layout(&self, node: NodeId) -> BlockLayout {
        BlockLayout::new(&self.text.text(node), self.config.layout_options())
    }

    /// Whether the walk in visible order may enter `node`'s children.
    fn shows_children(&self, node: NodeId) -> bool {
        node == self.buffer.root() || self.buffer.fold().is_expanded(node)
    }

    /// Previous block in visible order (skipping collapsed subtrees).
    pub fn previous_visible(&self, node: NodeId) -> OutlineResult<Option<NodeId>> {
        self.tree
            .previous_in_order(node, self.root(), |id| self.shows_children(id))
    }

    /// Next block in visible order (skipping collapsed subtrees).
    pub fn next_visible(&self, node: NodeId) -> OutlineResult<Option<NodeId>> {
        self.tree
            .next_in_order(node, self.root(), |id| self.shows_children(id))
    }

    /// Delete a block (with its subtree when `cascade`) and drop its fold flags.
    ///
    /// The text of removed blocks stays readable until the command commits; the caller drops
    /// it through [`Session::commit_removals`].
    pub fn delete_block(&mut self, node: NodeId, cascade: bool) -> OutlineResult<()> {
        let removed = self.tree.delete_node(node, cascade)?;
        self.buffer.forget_nodes(&removed);
        self.removed.extend(removed);
        Ok(())
    }

    /// Nodes deleted so far by this command.
    pub fn removed(&self) -> &[NodeId] {
        &self.removed
    }

    /// Drop the text of every block removed so far and hand back their ids.
    pub fn commit_removals(&mut self) -> Vec<NodeId> {
        let removed = std::mem::take(&mut self.removed);
        for &id in &removed {
            self.text.delete_text(id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{BlockSelection, TextSelection};
    use crate::tree::InsertPosition;

    #[test]
    fn test_set_focus_expands_ancestors_and_remembers_block() {
        let mut tree = NodeTree::new();
        let root = tree.create_root();
        let a = tree.insert_node(root, InsertPosition::Append, None).unwrap();
        let b = tree.insert_node(a, InsertPosition::Append, None).unwrap();
        let mut buffer = Buffer::new(root);
        buffer.fold_mut().set_expanded(a, false);
        assert!(!buffer.is_visible(&tree, b));

        let expanded = buffer
            .set_focus(&tree, FocusState::Text(TextSelection::caret(b, 0)))
            .unwrap();
        assert_eq!(expanded, vec![a]);
        assert!(buffer.is_visible(&tree, b));

        buffer.clear_focus();
        assert_eq!(buffer.focus(), &FocusState::None);
        assert_eq!(buffer.last_focused_block(), Some(b));
    }

    #[test]
    fn test_set_focus_rejects_nodes_outside_root() {
        let mut tree = NodeTree::new();
        let root = tree.create_root();
        let other = tree.create_root();
        let mut buffer = Buffer::new(root);
        assert_eq!(
            buffer.set_focus(&tree, FocusState::Blocks(BlockSelection::single(other))),
            Err(OutlineError::NodeNotFound(other))
        );
        assert_eq!(buffer.focus(), &FocusState::None);
    }

    #[test]
    fn test_visible_rows_skip_collapsed_children() {
        let mut tree = NodeTree::new();
        let root = tree.create_root();
        let a = tree.insert_node(root, InsertPosition::Append, None).unwrap();
        let a1 = tree.insert_node(a, InsertPosition::Append, None).unwrap();
        let b = tree.insert_node(root, InsertPosition::Append, None).unwrap();
        let mut buffer = Buffer::new(root);

        let rows: Vec<_> = buffer
            .visible_rows(&tree)
            .unwrap()
            .into_iter()
            .map(|row| (row.node, row.depth))
            .collect();
        assert_eq!(rows, vec![(a, 0), (a1, 1), (b, 0)]);

        buffer.fold_mut().set_expanded(a, false);
        let rows = buffer.visible_rows(&tree).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].expanded);
    }
}
