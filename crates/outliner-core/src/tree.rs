//! Node Tree
//!
//! Ordered forest storage for outline blocks and the primitive mutations everything else is
//! built on.
//!
//! # Overview
//!
//! Every node has at most one parent and an ordered list of children; the position inside
//! that list is the only ranking signal. Nodes without a parent are forest roots (a buffer's
//! synthetic root is one of them). Text is not stored here: the [`crate::text::TextStore`]
//! collaborator owns it, keyed by [`NodeId`].
//!
//! Mutations are all-or-nothing: every argument is validated before anything is touched, so a
//! rejected [`NodeTree::move_nodes`] leaves the tree exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use outliner_core::{InsertPosition, NodeTree};
//!
//! let mut tree = NodeTree::new();
//! let root = tree.create_root();
//! let a = tree.insert_node(root, InsertPosition::Append, None).unwrap();
//! let b = tree.insert_node(root, InsertPosition::Append, None).unwrap();
//!
//! tree.move_nodes(&[b], root, InsertPosition::Before(a)).unwrap();
//! assert_eq!(tree.children(root).unwrap(), &[b, a]);
//! ```

use crate::error::{OutlineError, OutlineResult};
use std::collections::HashMap;
use std::fmt;

/// Opaque identifier of a node in a [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Build an id from its raw numeric value (host-provided identities).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a node (or a batch of nodes) lands inside its new parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Immediately before the given sibling.
    Before(NodeId),
    /// Immediately after the given sibling.
    After(NodeId),
    /// As the first children.
    Prepend,
    /// As the last children.
    Append,
    /// At a child index (clamped to the child count).
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NodeEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Ordered forest of outline nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: HashMap<NodeId, NodeEntry>,
    next_id: u64,
    /// Bumped by every successful mutation.
    version: u64,
}

impl PartialEq for NodeTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for NodeTree {}

impl NodeTree {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the forest has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Mutation counter (incremented after each successful mutation).
    pub fn version(&self) -> u64 {
        self.version
    }

    fn entry(&self, id: NodeId) -> OutlineResult<&NodeEntry> {
        self.nodes.get(&id).ok_or(OutlineError::NodeNotFound(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> OutlineResult<&mut NodeEntry> {
        self.nodes.get_mut(&id).ok_or(OutlineError::NodeNotFound(id))
    }

    fn allocate_id(&mut self) -> NodeId {
        loop {
            self.next_id = self.next_id.saturating_add(1);
            let id = NodeId(self.next_id);
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    fn bump(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    /// Create a new parentless node (a forest root).
    pub fn create_root(&mut self) -> NodeId {
        let id = self.allocate_id();
        self.nodes.insert(id, NodeEntry::default());
        self.bump();
        id
    }

    /// Parent of `id`; fails with [`OutlineError::NoParent`] for a forest root.
    pub fn parent(&self, id: NodeId) -> OutlineResult<NodeId> {
        self.entry(id)?.parent.ok_or(OutlineError::NoParent(id))
    }

    /// Ordered children of `id`.
    pub fn children(&self, id: NodeId) -> OutlineResult<&[NodeId]> {
        Ok(&self.entry(id)?.children)
    }

    /// Whether `id` exists and has at least one child.
    pub fn has_children(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|entry| !entry.children.is_empty())
    }

    /// First child of `id`, if any.
    pub fn first_child(&self, id: NodeId) -> OutlineResult<Option<NodeId>> {
        Ok(self.entry(id)?.children.first().copied())
    }

    /// Last child of `id`, if any.
    pub fn last_child(&self, id: NodeId) -> OutlineResult<Option<NodeId>> {
        Ok(self.entry(id)?.children.last().copied())
    }

    /// The sibling group `id` belongs to (its parent's children).
    pub fn siblings(&self, id: NodeId) -> OutlineResult<&[NodeId]> {
        let parent = self.parent(id)?;
        self.children(parent)
    }

    /// Position of `id` among its siblings.
    pub fn index_in_parent(&self, id: NodeId) -> OutlineResult<usize> {
        let siblings = self.siblings(id)?;
        siblings
            .iter()
            .position(|&sibling| sibling == id)
            .ok_or(OutlineError::NodeNotFound(id))
    }

    /// Sibling immediately before `id` (`None` for the first child or a forest root).
    pub fn previous_sibling(&self, id: NodeId) -> OutlineResult<Option<NodeId>> {
        match self.index_in_parent(id) {
            Ok(0) => Ok(None),
            Ok(index) => Ok(self.siblings(id)?.get(index - 1).copied()),
            Err(OutlineError::NoParent(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Sibling immediately after `id` (`None` for the last child or a forest root).
    pub fn next_sibling(&self, id: NodeId) -> OutlineResult<Option<NodeId>> {
        match self.index_in_parent(id) {
            Ok(index) => Ok(self.siblings(id)?.get(index + 1).copied()),
            Err(OutlineError::NoParent(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> OutlineResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut current = self.entry(id)?.parent;
        while let Some(parent) = current {
            out.push(parent);
            current = self.entry(parent)?.parent;
        }
        Ok(out)
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(&node).and_then(|entry| entry.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.nodes.get(&parent).and_then(|entry| entry.parent);
        }
        false
    }

    /// Whether `node` is `scope` itself or one of its descendants.
    pub fn is_within(&self, scope: NodeId, node: NodeId) -> bool {
        self.contains(node) && (scope == node || self.is_ancestor(scope, node))
    }

    /// Number of edges between `root` and `node` (`None` if `node` is not under `root`).
    pub fn depth_below(&self, root: NodeId, node: NodeId) -> Option<usize> {
        if !self.contains(node) {
            return None;
        }
        let mut depth = 0usize;
        let mut current = node;
        while current != root {
            current = self.nodes.get(&current)?.parent?;
            depth += 1;
        }
        Some(depth)
    }

    /// All descendants of `id` in pre-order (parent before children, sibling order).
    pub fn descendants(&self, id: NodeId) -> OutlineResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.entry(id)?.children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.entry(node)?.children.iter().rev().copied());
        }
        Ok(out)
    }

    fn resolve_index(
        &self,
        children: &[NodeId],
        position: InsertPosition,
    ) -> OutlineResult<usize> {
        let find = |anchor: NodeId| {
            children
                .iter()
                .position(|&child| child == anchor)
                .ok_or(OutlineError::InvalidAnchor(anchor))
        };
        match position {
            InsertPosition::Before(anchor) => find(anchor),
            InsertPosition::After(anchor) => find(anchor).map(|index| index + 1),
            InsertPosition::Prepend => Ok(0),
            InsertPosition::Append => Ok(children.len()),
            InsertPosition::Index(index) => Ok(index.min(children.len())),
        }
    }

    /// Insert a node under `parent`.
    ///
    /// - `existing: None` allocates a fresh node.
    /// - `existing: Some(id)` for an unknown id creates a node with exactly that identity.
    /// - `existing: Some(id)` for a known id re-attaches it; it must be parentless and must not
    ///   be an ancestor of `parent`.
    pub fn insert_node(
        &mut self,
        parent: NodeId,
        position: InsertPosition,
        existing: Option<NodeId>,
    ) -> OutlineResult<NodeId> {
        let index = self.resolve_index(self.children(parent)?, position)?;

        let id = match existing {
            Some(id) if self.contains(id) => {
                if self.entry(id)?.parent.is_some() {
                    return Err(OutlineError::AlreadyAttached(id));
                }
                if id == parent || self.is_ancestor(id, parent) {
                    return Err(OutlineError::CycleRejected { node: id, parent });
                }
                id
            }
            Some(id) => {
                self.next_id = self.next_id.max(id.get());
                self.nodes.insert(id, NodeEntry::default());
                id
            }
            None => {
                let id = self.allocate_id();
                self.nodes.insert(id, NodeEntry::default());
                id
            }
        };

        self.entry_mut(id)?.parent = Some(parent);
        self.entry_mut(parent)?.children.insert(index, id);
        self.bump();
        Ok(id)
    }

    /// Move a batch of nodes under `new_parent`, keeping their relative order.
    ///
    /// The batch is inserted as one contiguous run at `position`. Nothing moves unless every
    /// node exists, none of them is `new_parent` or one of its ancestors, and the anchor
    /// sibling (if any) is a child of `new_parent` outside the batch.
    pub fn move_nodes(
        &mut self,
        ids: &[NodeId],
        new_parent: NodeId,
        position: InsertPosition,
    ) -> OutlineResult<()> {
        if ids.is_empty() {
            return Err(OutlineError::EmptySelection);
        }
        self.entry(new_parent)?;

        let mut batch: Vec<NodeId> = Vec::with_capacity(ids.len());
        for &id in ids {
            self.entry(id)?;
            if id == new_parent || self.is_ancestor(id, new_parent) {
                return Err(OutlineError::CycleRejected {
                    node: id,
                    parent: new_parent,
                });
            }
            if !batch.contains(&id) {
                batch.push(id);
            }
        }

        if let InsertPosition::Before(anchor) | InsertPosition::After(anchor) = position {
            if batch.contains(&anchor) || self.entry(anchor)?.parent != Some(new_parent) {
                return Err(OutlineError::InvalidAnchor(anchor));
            }
        }

        for &id in &batch {
            if let Some(old_parent) = self.entry(id)?.parent {
                self.entry_mut(old_parent)?
                    .children
                    .retain(|&child| child != id);
            }
        }

        let index = self.resolve_index(self.children(new_parent)?, position)?;
        let children = &mut self.entry_mut(new_parent)?.children;
        children.splice(index..index, batch.iter().copied());
        for &id in &batch {
            self.entry_mut(id)?.parent = Some(new_parent);
        }

        self.bump();
        Ok(())
    }

    /// Delete a node.
    ///
    /// With `cascade` the whole subtree is removed; otherwise the node's children take its
    /// place in the parent (or become forest roots if the node had no parent).
    /// Returns every removed id so callers can drop associated text and fold state.
    pub fn delete_node(&mut self, id: NodeId, cascade: bool) -> OutlineResult<Vec<NodeId>> {
        let entry = self.entry(id)?.clone();

        let mut removed = vec![id];
        if cascade {
            removed.extend(self.descendants(id)?);
        }

        if let Some(parent) = entry.parent {
            let siblings = &mut self.entry_mut(parent)?.children;
            let index = siblings
                .iter()
                .position(|&child| child == id)
                .ok_or(OutlineError::NodeNotFound(id))?;
            if cascade {
                siblings.remove(index);
            } else {
                siblings.splice(index..=index, entry.children.iter().copied());
            }
        }

        if !cascade {
            for &child in &entry.children {
                self.entry_mut(child)?.parent = entry.parent;
            }
        }

        for node in &removed {
            self.nodes.remove(node);
        }

        self.bump();
        Ok(removed)
    }

    /// Last node reached by repeatedly descending into the last child, as long as `descend`
    /// allows entering a node.
    pub fn last_descendant<F>(&self, id: NodeId, descend: F) -> OutlineResult<NodeId>
    where
        F: Fn(NodeId) -> bool,
    {
        let mut current = id;
        while descend(current) {
            match self.last_child(current)? {
                Some(child) => current = child,
                None => break,
            }
        }
        Ok(current)
    }

    /// Previous node in pre-order under `scope`, entering only nodes for which `descend`
    /// returns `true`. `scope` itself is never returned.
    pub fn previous_in_order<F>(
        &self,
        id: NodeId,
        scope: NodeId,
        descend: F,
    ) -> OutlineResult<Option<NodeId>>
    where
        F: Fn(NodeId) -> bool,
    {
        if id == scope {
            return Ok(None);
        }
        let Some(parent) = self.entry(id)?.parent else {
            return Ok(None);
        };
        match self.previous_sibling(id)? {
            Some(sibling) => Ok(Some(self.last_descendant(sibling, descend)?)),
            None if parent == scope => Ok(None),
            None => Ok(Some(parent)),
        }
    }

    /// Next node in pre-order under `scope`, entering only nodes for which `descend` returns
    /// `true`.
    pub fn next_in_order<F>(
        &self,
        id: NodeId,
        scope: NodeId,
        descend: F,
    ) -> OutlineResult<Option<NodeId>>
    where
        F: Fn(NodeId) -> bool,
    {
        if descend(id) {
            if let Some(child) = self.first_child(id)? {
                return Ok(Some(child));
            }
        }

        let mut current = id;
        loop {
            if current == scope {
                return Ok(None);
            }
            if let Some(sibling) = self.next_sibling(current)? {
                return Ok(Some(sibling));
            }
            match self.entry(current)?.parent {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }

    /// Previous node in document order (fold state ignored).
    pub fn previous_in_document_order(
        &self,
        id: NodeId,
        scope: NodeId,
    ) -> OutlineResult<Option<NodeId>> {
        self.previous_in_order(id, scope, |_| true)
    }

    /// Next node in document order (fold state ignored).
    pub fn next_in_document_order(
        &self,
        id: NodeId,
        scope: NodeId,
    ) -> OutlineResult<Option<NodeId>> {
        self.next_in_order(id, scope, |_| true)
    }

    /// Check the forest invariants: parent/child links agree, no cycles.
    pub fn is_well_formed(&self) -> bool {
        for (&id, entry) in &self.nodes {
            if let Some(parent) = entry.parent {
                let Some(parent_entry) = self.nodes.get(&parent) else {
                    return false;
                };
                if parent_entry.children.iter().filter(|&&c| c == id).count() != 1 {
                    return false;
                }
            }
            for child in &entry.children {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(id) {
                    return false;
                }
            }
            // A cycle would keep the walk going past the node count.
            let mut steps = 0usize;
            let mut current = entry.parent;
            while let Some(parent) = current {
                if parent == id || steps > self.nodes.len() {
                    return false;
                }
                steps += 1;
                current = self.nodes.get(&parent).and_then(|e| e.parent);
            }
        }
        true
    }
}
