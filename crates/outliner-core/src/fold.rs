//! Fold State
//!
//! Per-buffer expanded/collapsed flags plus the progressive fold algorithms.
//!
//! A flag only means something for a node with children; childless nodes never report a fold
//! change. Flags are created lazily (absent means expanded) and dropped when their node is
//! deleted.
//!
//! # Progressive folding
//!
//! - [`FoldState::collapse_one_level`] folds the deepest expanded subtrees first, so repeated
//!   presses walk from the leaves toward the target.
//! - [`FoldState::expand_one_level`] unfolds the shallowest collapsed subtrees first, so
//!   repeated presses drill downward from the target.

use crate::error::OutlineResult;
use crate::tree::{NodeId, NodeTree};
use std::collections::HashSet;

/// Collapsed-node set for one buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldState {
    collapsed: HashSet<NodeId>,
}

impl FoldState {
    /// Create a fold state where everything is expanded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw flag: `true` unless the node was explicitly collapsed.
    pub fn is_expanded(&self, id: NodeId) -> bool {
        !self.collapsed.contains(&id)
    }

    /// Whether the node has children that are currently hidden.
    pub fn is_collapsed(&self, tree: &NodeTree, id: NodeId) -> bool {
        tree.has_children(id) && !self.is_expanded(id)
    }

    /// Whether the node's children are currently shown.
    pub fn shows_children(&self, tree: &NodeTree, id: NodeId) -> bool {
        tree.has_children(id) && self.is_expanded(id)
    }

    /// Number of nodes carrying a collapsed flag.
    pub fn collapsed_count(&self) -> usize {
        self.collapsed.len()
    }

    /// Set the flag directly (no child check).
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        if expanded {
            self.collapsed.remove(&id);
        } else {
            self.collapsed.insert(id);
        }
    }

    /// Collapse a single block; returns whether anything changed.
    pub fn collapse_block(&mut self, tree: &NodeTree, id: NodeId) -> bool {
        if self.shows_children(tree, id) {
            self.collapsed.insert(id);
            true
        } else {
            false
        }
    }

    /// Expand a single block; returns whether anything changed.
    pub fn expand_block(&mut self, tree: &NodeTree, id: NodeId) -> bool {
        if self.is_collapsed(tree, id) {
            self.collapsed.remove(&id);
            true
        } else {
            false
        }
    }

    /// Toggle a single block; childless nodes are left alone.
    pub fn toggle(&mut self, tree: &NodeTree, id: NodeId) -> bool {
        self.collapse_block(tree, id) || self.expand_block(tree, id)
    }

    /// Collapse one hierarchy level under (and possibly including) `id`.
    ///
    /// Children are processed first; if any of them changed, `id` itself stays as it is.
    pub fn collapse_one_level(&mut self, tree: &NodeTree, id: NodeId) -> OutlineResult<bool> {
        if !self.shows_children(tree, id) {
            return Ok(false);
        }

        let mut changed = false;
        for &child in tree.children(id)? {
            changed |= self.collapse_one_level(tree, child)?;
        }
        if changed {
            return Ok(true);
        }

        self.collapsed.insert(id);
        Ok(true)
    }

    /// Expand one hierarchy level at (or below) `id`.
    ///
    /// A collapsed `id` is expanded and nothing else happens; otherwise each child subtree
    /// expands its own shallowest collapsed node. "Shallowest" is per branch, mirroring
    /// [`collapse_one_level`](Self::collapse_one_level): sibling branches collapsed at
    /// different depths all open on the same press.
    pub fn expand_one_level(&mut self, tree: &NodeTree, id: NodeId) -> OutlineResult<bool> {
        if !tree.has_children(id) {
            return Ok(false);
        }
        if self.expand_block(tree, id) {
            return Ok(true);
        }

        let mut changed = false;
        for &child in tree.children(id)? {
            changed |= self.expand_one_level(tree, child)?;
        }
        Ok(changed)
    }

    /// Collapse `id` and every descendant that has children.
    pub fn collapse_all(&mut self, tree: &NodeTree, id: NodeId) -> OutlineResult<bool> {
        let mut changed = self.collapse_block(tree, id);
        for node in tree.descendants(id)? {
            changed |= self.collapse_block(tree, node);
        }
        Ok(changed)
    }

    /// Expand `id` and every descendant.
    pub fn expand_all(&mut self, tree: &NodeTree, id: NodeId) -> OutlineResult<bool> {
        let mut changed = self.expand_block(tree, id);
        for node in tree.descendants(id)? {
            changed |= self.expand_block(tree, node);
        }
        Ok(changed)
    }

    /// Expand every collapsed ancestor strictly between `root` and `target`.
    ///
    /// Returns exactly the nodes that were expanded, nearest first. `root` and `target` are
    /// never touched.
    pub fn expand_ancestors(
        &mut self,
        tree: &NodeTree,
        root: NodeId,
        target: NodeId,
    ) -> OutlineResult<Vec<NodeId>> {
        let mut expanded = Vec::new();
        if target == root {
            return Ok(expanded);
        }
        for ancestor in tree.ancestors(target)? {
            if ancestor == root {
                break;
            }
            if self.expand_block(tree, ancestor) {
                expanded.push(ancestor);
            }
        }
        if !expanded.is_empty() {
            tracing::trace!(node = %target, count = expanded.len(), "auto-expanded ancestors");
        }
        Ok(expanded)
    }

    /// Whether every ancestor strictly between `root` and `node` shows its children.
    pub fn is_visible(&self, tree: &NodeTree, root: NodeId, node: NodeId) -> bool {
        if node == root {
            return true;
        }
        let Ok(ancestors) = tree.ancestors(node) else {
            return false;
        };
        for ancestor in ancestors {
            if ancestor == root {
                return true;
            }
            if !self.is_expanded(ancestor) {
                return false;
            }
        }
        false
    }

    /// Drop flags of deleted nodes.
    pub fn forget<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        for id in ids {
            self.collapsed.remove(&id);
        }
    }
}
