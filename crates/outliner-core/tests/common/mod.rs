//! Shared helpers for the integration tests.

#![allow(dead_code)]

use outliner_core::{
    BufferId, Command, CommandResult, CursorCommand, Direction, FocusState, InsertPosition, Key,
    KeyChord, Modifiers, NodeId, Workspace,
};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary (`RUST_LOG` controls the filter).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// An outline built from `(depth, text)` rows in document order.
pub struct Outline {
    pub workspace: Workspace,
    pub buffer: BufferId,
    pub root: NodeId,
    pub ids: Vec<NodeId>,
}

impl Outline {
    pub fn new(rows: &[(usize, &str)]) -> Self {
        init_tracing();
        let mut workspace = Workspace::new();
        let buffer = workspace.open_buffer("Title");
        let root = workspace.buffer_state(buffer).unwrap().root;

        let mut stack: Vec<NodeId> = vec![root];
        let mut ids = Vec::with_capacity(rows.len());
        for &(depth, text) in rows {
            stack.truncate(depth + 1);
            let parent = *stack.last().unwrap();
            let id = workspace
                .insert_block(parent, InsertPosition::Append, text)
                .unwrap();
            stack.push(id);
            ids.push(id);
        }

        Self {
            workspace,
            buffer,
            root,
            ids,
        }
    }

    pub fn key(&mut self, key: Key, modifiers: Modifiers) -> CommandResult {
        self.workspace
            .handle_key(self.buffer, KeyChord::new(key, modifiers))
            .unwrap()
    }

    pub fn press(&mut self, key: Key) -> CommandResult {
        self.key(key, Modifiers::NONE)
    }

    pub fn arrow(&mut self, direction: Direction, modifiers: Modifiers) -> CommandResult {
        self.key(Key::Arrow(direction), modifiers)
    }

    pub fn focus(&mut self, focus: FocusState) {
        self.workspace
            .execute(
                self.buffer,
                Command::Cursor(CursorCommand::SetFocus(focus)),
            )
            .unwrap();
    }

    pub fn state_focus(&self) -> FocusState {
        self.workspace.buffer_state(self.buffer).unwrap().focus
    }

    pub fn text(&self, node: NodeId) -> String {
        self.workspace.text(node).unwrap()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.workspace.tree().children(node).unwrap().to_vec()
    }

    pub fn child_texts(&self, node: NodeId) -> Vec<String> {
        self.children(node)
            .into_iter()
            .map(|id| self.text(id))
            .collect()
    }

    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.workspace
            .buffer(self.buffer)
            .unwrap()
            .fold()
            .is_expanded(node)
    }

    /// Collapse one block through the command surface, leaving nothing focused.
    pub fn collapse(&mut self, node: NodeId) {
        self.workspace
            .execute(
                self.buffer,
                Command::Cursor(CursorCommand::SetFocus(FocusState::Blocks(
                    outliner_core::BlockSelection::single(node),
                ))),
            )
            .unwrap();
        self.workspace
            .execute(
                self.buffer,
                Command::Fold(outliner_core::FoldCommand::Collapse),
            )
            .unwrap();
        self.workspace
            .execute(self.buffer, Command::Cursor(CursorCommand::ClearFocus))
            .unwrap();
    }
}
