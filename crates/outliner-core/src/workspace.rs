//! Workspace and multi-buffer model.
//!
//! A [`Workspace`] owns one outline document (the node tree plus its text store) and any number
//! of open buffers onto it. Each buffer has its own root assignment, focus and fold flags; the
//! tree and the text are shared.
//!
//! Commands execute **against a specific buffer** as one transaction: the tree and the buffer
//! are snapshotted first and restored if the command fails. After a successful command every
//! subscriber of the target buffer receives one [`StateChange`] per kind of change, and the
//! other buffers are repaired (stale focus cleared, buffers whose root was deleted closed) and
//! notified.

use crate::buffer::{Buffer, Session};
use crate::commands::{self, Command, CommandResult};
use crate::config::{ConfigError, OutlinerConfig};
use crate::error::{OutlineError, OutlineResult};
use crate::keys::{self, KeyChord};
use crate::selection::FocusState;
use crate::state::{BufferState, StateChange, StateChangeCallback, StateChangeType, VisibleRow};
use crate::text::{MemoryTextStore, TextStore};
use crate::tree::{InsertPosition, NodeId, NodeTree};
use std::collections::BTreeMap;

/// Opaque identifier for an open buffer in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(u64);

impl BufferId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

struct BufferEntry {
    buffer: Buffer,
    version: u64,
    callbacks: Vec<StateChangeCallback>,
}

impl BufferEntry {
    fn new(root: NodeId) -> Self {
        Self {
            buffer: Buffer::new(root),
            version: 0,
            callbacks: Vec::new(),
        }
    }

    fn notify(&mut self, change_type: StateChangeType) {
        let old_version = self.version;
        self.version = self.version.saturating_add(1);

        let change = StateChange::new(change_type, old_version, self.version);
        for cb in &mut self.callbacks {
            cb(&change);
        }
    }
}

/// Kinds of change observed across one command, in notification order.
#[derive(Debug, Default, Clone, Copy)]
struct Changes {
    tree: bool,
    text: bool,
    root: bool,
    folding: bool,
    focus: bool,
}

impl Changes {
    fn types(self) -> impl Iterator<Item = StateChangeType> {
        [
            (self.tree, StateChangeType::TreeModified),
            (self.text, StateChangeType::TextModified),
            (self.root, StateChangeType::RootChanged),
            (self.folding, StateChangeType::FoldingChanged),
            (self.focus, StateChangeType::FocusChanged),
        ]
        .into_iter()
        .filter_map(|(changed, change_type)| changed.then_some(change_type))
    }
}

/// One outline document and its open buffers.
pub struct Workspace<S: TextStore = MemoryTextStore> {
    tree: NodeTree,
    text: S,
    config: OutlinerConfig,
    next_buffer_id: u64,
    buffers: BTreeMap<BufferId, BufferEntry>,
}

impl<S: TextStore> std::fmt::Debug for Workspace<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("node_count", &self.tree.len())
            .field("buffer_count", &self.buffers.len())
            .field("tree_version", &self.tree.version())
            .field("text_revision", &self.text.revision())
            .finish()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::with_config(OutlinerConfig::default())
    }
}

impl Workspace {
    /// Create an empty workspace backed by a [`MemoryTextStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty in-memory workspace with the given settings.
    pub fn with_config(config: OutlinerConfig) -> Self {
        Self::with_text_store(MemoryTextStore::new(), config)
    }
}

impl<S: TextStore> Workspace<S> {
    /// Create an empty workspace over a host-provided text store.
    pub fn with_text_store(text: S, config: OutlinerConfig) -> Self {
        Self {
            tree: NodeTree::new(),
            text,
            config,
            next_buffer_id: 1,
            buffers: BTreeMap::new(),
        }
    }

    /// Returns the number of open buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Returns `true` if there are no open buffers.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Ids of the open buffers, in opening order.
    pub fn buffer_ids(&self) -> impl Iterator<Item = BufferId> + '_ {
        self.buffers.keys().copied()
    }

    /// The shared node tree.
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// The shared text store.
    pub fn text_store(&self) -> &S {
        &self.text
    }

    /// Text of a block.
    pub fn text(&self, node: NodeId) -> OutlineResult<String> {
        if !self.tree.contains(node) {
            return Err(OutlineError::NodeNotFound(node));
        }
        Ok(self.text.text(node))
    }

    /// Current settings.
    pub fn config(&self) -> &OutlinerConfig {
        &self.config
    }

    /// Replace the settings. Wrap changes affect the next layout-dependent command.
    pub fn set_config(&mut self, config: OutlinerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    fn entry(&self, id: BufferId) -> OutlineResult<&BufferEntry> {
        self.buffers.get(&id).ok_or(OutlineError::BufferNotFound(id))
    }

    fn entry_mut(&mut self, id: BufferId) -> OutlineResult<&mut BufferEntry> {
        self.buffers
            .get_mut(&id)
            .ok_or(OutlineError::BufferNotFound(id))
    }

    fn insert_buffer(&mut self, root: NodeId) -> BufferId {
        let id = BufferId(self.next_buffer_id);
        self.next_buffer_id = self.next_buffer_id.saturating_add(1);
        self.buffers.insert(id, BufferEntry::new(root));
        tracing::debug!(buffer = id.get(), %root, "opened buffer");
        id
    }

    /// Create a new document root titled `title` and open a buffer on it.
    pub fn open_buffer(&mut self, title: &str) -> BufferId {
        let root = self.tree.create_root();
        if !title.is_empty() {
            self.text.set_text(root, title.to_string());
        }
        self.insert_buffer(root)
    }

    /// Open another buffer rooted at an existing node.
    pub fn open_buffer_at(&mut self, root: NodeId) -> OutlineResult<BufferId> {
        if !self.tree.contains(root) {
            return Err(OutlineError::NodeNotFound(root));
        }
        Ok(self.insert_buffer(root))
    }

    /// Close a buffer. The document is left untouched.
    pub fn close_buffer(&mut self, id: BufferId) -> OutlineResult<()> {
        self.buffers
            .remove(&id)
            .map(|_| ())
            .ok_or(OutlineError::BufferNotFound(id))
    }

    /// Read access to a buffer.
    pub fn buffer(&self, id: BufferId) -> OutlineResult<&Buffer> {
        Ok(&self.entry(id)?.buffer)
    }

    /// Subscribe to changes of a buffer.
    pub fn subscribe<F>(&mut self, id: BufferId, callback: F) -> OutlineResult<()>
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.entry_mut(id)?.callbacks.push(Box::new(callback));
        Ok(())
    }

    /// Snapshot of a buffer for the render layer.
    pub fn buffer_state(&self, id: BufferId) -> OutlineResult<BufferState> {
        let entry = self.entry(id)?;
        let buffer = &entry.buffer;
        Ok(BufferState {
            root: buffer.root(),
            mode: buffer.mode(),
            focus: buffer.focus().clone(),
            last_focused_block: buffer.last_focused_block(),
            visible_block_count: buffer.visible_rows(&self.tree)?.len(),
            collapsed_count: buffer.fold().collapsed_count(),
            version: entry.version,
        })
    }

    /// Rendered blocks of a buffer in visible order.
    pub fn visible_rows(&self, id: BufferId) -> OutlineResult<Vec<VisibleRow>> {
        self.entry(id)?.buffer.visible_rows(&self.tree)
    }

    /// Host-side insertion of a block with initial text (document loading, tests).
    ///
    /// Buffers whose root contains `parent` receive [`StateChangeType::TreeModified`].
    pub fn insert_block(
        &mut self,
        parent: NodeId,
        position: InsertPosition,
        text: &str,
    ) -> OutlineResult<NodeId> {
        let node = self.tree.insert_node(parent, position, None)?;
        if !text.is_empty() {
            self.text.set_text(node, text.to_string());
        }
        for entry in self.buffers.values_mut() {
            if self.tree.is_within(entry.buffer.root(), parent) {
                entry.notify(StateChangeType::TreeModified);
            }
        }
        Ok(node)
    }

    /// Host-side replacement of a block's text (e.g. a remote edit arriving through the text
    /// collaborator). Carets beyond the new end are clamped.
    pub fn set_block_text(&mut self, node: NodeId, text: &str) -> OutlineResult<()> {
        if !self.tree.contains(node) {
            return Err(OutlineError::NodeNotFound(node));
        }
        self.text.set_text(node, text.to_string());
        let changes = Changes {
            text: true,
            ..Changes::default()
        };
        self.repair_buffers(None, &[], changes);
        Ok(())
    }

    /// Resolve a key chord for the buffer's current mode and execute it.
    ///
    /// Unbound chords are silent no-ops.
    pub fn handle_key(&mut self, id: BufferId, chord: KeyChord) -> OutlineResult<CommandResult> {
        let mode = self.entry(id)?.buffer.mode();
        match keys::resolve(chord, mode) {
            Some(command) => self.execute(id, command),
            None => {
                tracing::trace!(%chord, ?mode, "unbound key chord");
                Ok(CommandResult::Unchanged)
            }
        }
    }

    /// Execute a command against a specific buffer.
    pub fn execute(&mut self, id: BufferId, command: Command) -> OutlineResult<CommandResult> {
        let Some(entry) = self.buffers.get_mut(&id) else {
            return Err(OutlineError::BufferNotFound(id));
        };

        let tree_version = self.tree.version();
        let tree_before = command.may_edit_tree().then(|| self.tree.clone());
        let buffer_before = entry.buffer.clone();
        let text_revision = self.text.revision();

        let mut session = Session::new(
            &mut self.tree,
            &mut self.text,
            &mut entry.buffer,
            &self.config,
        );
        let result = match commands::execute(&mut session, command) {
            Ok(result) => result,
            Err(err) => {
                drop(session);
                tracing::debug!(buffer = id.get(), %err, "command failed, rolling back");
                if let Some(tree) = tree_before {
                    self.tree = tree;
                }
                entry.buffer = buffer_before;
                return Err(err);
            }
        };
        let removed = session.commit_removals();

        let changes = Changes {
            tree: self.tree.version() != tree_version
                && tree_before.as_ref().is_none_or(|before| self.tree != *before),
            text: self.text.revision() != text_revision,
            root: entry.buffer.root() != buffer_before.root(),
            folding: entry.buffer.fold() != buffer_before.fold(),
            focus: entry.buffer.focus() != buffer_before.focus(),
        };
        for change_type in changes.types() {
            entry.notify(change_type);
        }

        if changes.tree || changes.text {
            self.repair_buffers(Some(id), &removed, changes);
        }
        Ok(result)
    }

    /// Bring every buffer except `origin` back in line with the shared document and forward
    /// the document-level changes to it.
    fn repair_buffers(&mut self, origin: Option<BufferId>, removed: &[NodeId], changes: Changes) {
        let mut orphaned = Vec::new();
        for (&id, entry) in self.buffers.iter_mut() {
            if Some(id) == origin {
                continue;
            }
            if removed.contains(&entry.buffer.root()) {
                orphaned.push(id);
                continue;
            }

            let mut local = Changes {
                tree: changes.tree,
                text: changes.text,
                ..Changes::default()
            };
            if entry.buffer.forget_nodes(removed) {
                tracing::warn!(buffer = id.get(), "focused block deleted by another buffer");
                local.focus = true;
            }
            let (focus, folding) = repair_focus(&mut entry.buffer, &self.tree, &self.text);
            local.focus |= focus;
            local.folding |= folding;

            for change_type in local.types() {
                entry.notify(change_type);
            }
        }

        for id in orphaned {
            tracing::warn!(buffer = id.get(), "closing buffer whose root was deleted");
            self.buffers.remove(&id);
        }
    }
}

/// Re-validate a buffer focus against the current tree and text: clamp text offsets, re-derive
/// block runs, and re-expand ancestors hidden by moves. Returns (focus changed, fold changed).
fn repair_focus<S: TextStore>(buffer: &mut Buffer, tree: &NodeTree, text: &S) -> (bool, bool) {
    let focus = buffer.focus().clone();
    let repaired = match &focus {
        FocusState::None => return (false, false),
        FocusState::Title { offset } => FocusState::Title {
            offset: (*offset).min(text.len(buffer.root())),
        },
        FocusState::Text(selection) => {
            let len = text.len(selection.node);
            let mut clamped = selection.clone();
            clamped.anchor = clamped.anchor.min(len);
            clamped.focus = clamped.focus.min(len);
            FocusState::Text(clamped)
        }
        FocusState::Blocks(selection) => match selection.refreshed(tree) {
            Ok(refreshed) => FocusState::Blocks(refreshed),
            Err(_) => {
                buffer.clear_focus();
                return (true, false);
            }
        },
    };

    match buffer.set_focus(tree, repaired.clone()) {
        Ok(expanded) => (repaired != focus, !expanded.is_empty()),
        Err(err) => {
            tracing::warn!(%err, "clearing focus moved out of the buffer");
            buffer.clear_focus();
            (true, false)
        }
    }
}
