//! Selection Model
//!
//! A buffer is always in exactly one focus mode, modelled as the tagged union [`FocusState`]:
//!
//! - nothing focused,
//! - the buffer title (the root block's text),
//! - a text selection inside one block,
//! - a block selection: a contiguous run of sibling blocks.
//!
//! Illegal combinations (a block selection carrying a goal column, a text caret alongside a
//! block range) cannot be expressed.

use crate::error::{OutlineError, OutlineResult};
use crate::layout::Affinity;
use crate::tree::{NodeId, NodeTree};

/// Line a vertical motion lands on when it enters a new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalLine {
    /// The first visual line (moving down).
    First,
    /// The last visual line (moving up).
    Last,
}

/// Caret or text range inside a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSelection {
    /// Block owning the caret.
    pub node: NodeId,
    /// Fixed end (char offset).
    pub anchor: usize,
    /// Moving end (char offset).
    pub focus: usize,
    /// Remembered cell column for vertical motion.
    pub goal_x: Option<usize>,
    /// Line targeted by the vertical motion that produced this selection.
    pub goal_line: Option<GoalLine>,
    /// Wrap-boundary association of the focus end.
    pub affinity: Affinity,
}

impl TextSelection {
    /// Collapsed caret at `offset`.
    pub fn caret(node: NodeId, offset: usize) -> Self {
        Self::range(node, offset, offset)
    }

    /// Range from `anchor` to `focus`.
    pub fn range(node: NodeId, anchor: usize, focus: usize) -> Self {
        Self {
            node,
            anchor,
            focus,
            goal_x: None,
            goal_line: None,
            affinity: Affinity::default(),
        }
    }

    /// Attach a goal column and line.
    pub fn with_goal(mut self, goal_x: Option<usize>, goal_line: Option<GoalLine>) -> Self {
        self.goal_x = goal_x;
        self.goal_line = goal_line;
        self
    }

    /// Attach a wrap-boundary affinity.
    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }

    /// Whether anchor and focus coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Lower end of the range.
    pub fn start(&self) -> usize {
        self.anchor.min(self.focus)
    }

    /// Upper end of the range.
    pub fn end(&self) -> usize {
        self.anchor.max(self.focus)
    }
}

/// Contiguous run of sibling blocks with a fixed `anchor` and a moving `focus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSelection {
    nodes: Vec<NodeId>,
    anchor: NodeId,
    focus: NodeId,
}

impl BlockSelection {
    /// Select a single block.
    pub fn single(id: NodeId) -> Self {
        Self {
            nodes: vec![id],
            anchor: id,
            focus: id,
        }
    }

    /// Select every sibling between `anchor` and `focus` (inclusive, either direction).
    pub fn range(tree: &NodeTree, anchor: NodeId, focus: NodeId) -> OutlineResult<Self> {
        if anchor == focus {
            tree.children(anchor)?;
            return Ok(Self::single(anchor));
        }
        if tree.parent(anchor)? != tree.parent(focus)? {
            return Err(OutlineError::NotSiblings(anchor, focus));
        }
        let siblings = tree.siblings(anchor)?;
        let a = tree.index_in_parent(anchor)?;
        let f = tree.index_in_parent(focus)?;
        let (lo, hi) = (a.min(f), a.max(f));
        Ok(Self {
            nodes: siblings[lo..=hi].to_vec(),
            anchor,
            focus,
        })
    }

    /// Select an arbitrary set of blocks that must form a contiguous sibling run.
    ///
    /// The run is reordered into sibling order; anchor and focus become its first and last
    /// members.
    pub fn from_nodes(tree: &NodeTree, nodes: &[NodeId]) -> OutlineResult<Self> {
        let (&first, rest) = nodes.split_first().ok_or(OutlineError::EmptySelection)?;
        if rest.is_empty() {
            tree.children(first)?;
            return Ok(Self::single(first));
        }
        let parent = tree.parent(first)?;
        let mut indices = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if tree.parent(node)? != parent {
                return Err(OutlineError::NotSiblings(first, node));
            }
            indices.push(tree.index_in_parent(node)?);
        }
        indices.sort_unstable();
        indices.dedup();
        let (lo, hi) = (indices[0], indices[indices.len() - 1]);
        if hi - lo + 1 != indices.len() {
            return Err(OutlineError::NotSiblings(first, nodes[nodes.len() - 1]));
        }
        let siblings = tree.children(parent)?;
        Self::range(tree, siblings[lo], siblings[hi])
    }

    /// Selected blocks in sibling order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Fixed end.
    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    /// Moving end.
    pub fn focus(&self) -> NodeId {
        self.focus
    }

    /// First block in sibling order.
    pub fn first(&self) -> NodeId {
        self.nodes[0]
    }

    /// Last block in sibling order.
    pub fn last(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of selected blocks.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a block selection holds at least one block.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Re-derive the run from the current tree after the members moved together.
    pub fn refreshed(&self, tree: &NodeTree) -> OutlineResult<Self> {
        let mut refreshed = Self::from_nodes(tree, &self.nodes)?;
        refreshed.anchor = self.anchor;
        refreshed.focus = self.focus;
        Ok(refreshed)
    }
}

/// Discriminant of [`FocusState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusMode {
    /// Nothing focused.
    None,
    /// Buffer title focused.
    Title,
    /// Text caret inside a block.
    Text,
    /// Whole blocks selected.
    Blocks,
}

/// The single focus state of a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    /// Nothing focused.
    #[default]
    None,
    /// Caret in the buffer title.
    Title {
        /// Caret offset in the title text.
        offset: usize,
    },
    /// Caret or range inside one block.
    Text(TextSelection),
    /// Contiguous sibling blocks.
    Blocks(BlockSelection),
}

impl FocusState {
    /// Current mode.
    pub fn mode(&self) -> FocusMode {
        match self {
            FocusState::None => FocusMode::None,
            FocusState::Title { .. } => FocusMode::Title,
            FocusState::Text(_) => FocusMode::Text,
            FocusState::Blocks(_) => FocusMode::Blocks,
        }
    }

    /// Blocks named by this state (targets of the visibility invariant).
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            FocusState::None | FocusState::Title { .. } => Vec::new(),
            FocusState::Text(selection) => vec![selection.node],
            FocusState::Blocks(selection) => selection.nodes().to_vec(),
        }
    }

    /// The block holding focus: the caret block or the block selection's moving end.
    pub fn focus_node(&self) -> Option<NodeId> {
        match self {
            FocusState::None | FocusState::Title { .. } => None,
            FocusState::Text(selection) => Some(selection.node),
            FocusState::Blocks(selection) => Some(selection.focus()),
        }
    }
}
