mod common;

use outliner_core::{
    BlockSelection, Command, ConfigError, CursorCommand, Direction, EditCommand, FocusState,
    FoldCommand, InsertPosition, Key, KeyChord, Modifiers, NodeId, OutlinerConfig,
    StateChangeType, TextSelection, Workspace,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

/// root
/// ├── a
/// │   ├── a1
/// │   │   └── deep
/// │   └── a2
/// └── b
struct Doc {
    workspace: Workspace,
    outer: outliner_core::BufferId,
    root: NodeId,
    a: NodeId,
    a1: NodeId,
    a2: NodeId,
    b: NodeId,
}

fn doc() -> Doc {
    common::init_tracing();
    let mut workspace = Workspace::new();
    let outer = workspace.open_buffer("Doc");
    let root = workspace.buffer_state(outer).unwrap().root;
    let a = workspace.insert_block(root, InsertPosition::Append, "a").unwrap();
    let a1 = workspace.insert_block(a, InsertPosition::Append, "a1").unwrap();
    workspace
        .insert_block(a1, InsertPosition::Append, "deep")
        .unwrap();
    let a2 = workspace.insert_block(a, InsertPosition::Append, "a2").unwrap();
    let b = workspace.insert_block(root, InsertPosition::Append, "b").unwrap();
    Doc {
        workspace,
        outer,
        root,
        a,
        a1,
        a2,
        b,
    }
}

fn record(
    workspace: &mut Workspace,
    buffer: outliner_core::BufferId,
) -> Arc<Mutex<Vec<StateChangeType>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    workspace
        .subscribe(buffer, move |change| sink.lock().unwrap().push(change.change_type))
        .unwrap();
    seen
}

fn select(workspace: &mut Workspace, buffer: outliner_core::BufferId, node: NodeId) {
    workspace
        .execute(
            buffer,
            Command::Cursor(CursorCommand::SetFocus(FocusState::Blocks(
                BlockSelection::single(node),
            ))),
        )
        .unwrap();
}

#[test]
fn test_workspace_open_and_close_buffers() {
    let Doc {
        mut workspace,
        outer,
        a,
        ..
    } = doc();
    assert_eq!(workspace.len(), 1);

    let inner = workspace.open_buffer_at(a).unwrap();
    assert_eq!(workspace.len(), 2);
    assert_eq!(workspace.buffer_ids().collect::<Vec<_>>(), vec![outer, inner]);
    assert_eq!(workspace.buffer_state(inner).unwrap().root, a);
    assert_eq!(workspace.visible_rows(inner).unwrap().len(), 3);

    workspace.close_buffer(inner).unwrap();
    assert_eq!(workspace.len(), 1);
    assert!(workspace.close_buffer(inner).is_err());
    assert!(workspace.text(a).is_ok(), "closing a buffer keeps the document");
}

#[test]
fn test_fold_flags_are_per_buffer() {
    let Doc {
        mut workspace,
        outer,
        a,
        a1,
        ..
    } = doc();
    let inner = workspace.open_buffer_at(a).unwrap();

    select(&mut workspace, inner, a1);
    workspace
        .execute(inner, Command::Fold(FoldCommand::Collapse))
        .unwrap();

    assert!(!workspace.buffer(inner).unwrap().fold().is_expanded(a1));
    assert!(workspace.buffer(outer).unwrap().fold().is_expanded(a1));
    assert_eq!(workspace.visible_rows(outer).unwrap().len(), 5);
    assert_eq!(workspace.visible_rows(inner).unwrap().len(), 2);
}

#[test]
fn test_edit_in_one_buffer_notifies_the_other() {
    let Doc {
        mut workspace,
        outer,
        a,
        a2,
        ..
    } = doc();
    let inner = workspace.open_buffer_at(a).unwrap();
    let outer_seen = record(&mut workspace, outer);

    workspace
        .execute(
            inner,
            Command::Cursor(CursorCommand::SetFocus(FocusState::Text(
                TextSelection::caret(a2, 2),
            ))),
        )
        .unwrap();
    workspace
        .handle_key(inner, KeyChord::plain(Key::Char('!')))
        .unwrap();

    assert_eq!(workspace.text(a2).unwrap(), "a2!");
    assert_eq!(
        *outer_seen.lock().unwrap(),
        vec![StateChangeType::TextModified]
    );
}

#[test]
fn test_block_moved_out_of_buffer_root_clears_its_focus() {
    let Doc {
        mut workspace,
        outer,
        root,
        a,
        a2,
        b,
        ..
    } = doc();
    let inner = workspace.open_buffer_at(a).unwrap();
    select(&mut workspace, inner, a2);
    select(&mut workspace, outer, a2);
    let inner_seen = record(&mut workspace, inner);

    workspace
        .handle_key(
            outer,
            KeyChord::new(Key::Arrow(Direction::Left), Modifiers::ALT | Modifiers::MOD),
        )
        .unwrap();

    assert_eq!(workspace.tree().children(root).unwrap(), &[a, a2, b]);
    assert_eq!(workspace.buffer_state(inner).unwrap().focus, FocusState::None);
    assert_eq!(
        *inner_seen.lock().unwrap(),
        vec![StateChangeType::TreeModified, StateChangeType::FocusChanged]
    );
}

#[test]
fn test_move_elsewhere_reexpands_ancestors_of_other_buffers_focus() {
    let Doc {
        mut workspace,
        outer,
        a,
        a1,
        a2,
        ..
    } = doc();
    let inner = workspace.open_buffer_at(a).unwrap();

    // Collapse a1 in the inner buffer only, then let the outer buffer indent a2 under it.
    select(&mut workspace, inner, a1);
    workspace
        .execute(inner, Command::Fold(FoldCommand::Collapse))
        .unwrap();
    select(&mut workspace, inner, a2);
    select(&mut workspace, outer, a2);
    workspace
        .handle_key(outer, KeyChord::plain(Key::Tab))
        .unwrap();

    assert_eq!(workspace.tree().parent(a2).unwrap(), a1);
    let inner_buffer = workspace.buffer(inner).unwrap();
    assert!(inner_buffer.fold().is_expanded(a1));
    assert!(inner_buffer.is_visible(workspace.tree(), a2));
}

#[test]
fn test_host_text_replacement_clamps_carets() {
    let Doc {
        mut workspace,
        outer,
        b,
        ..
    } = doc();
    workspace.set_block_text(b, "hello").unwrap();
    workspace
        .execute(
            outer,
            Command::Cursor(CursorCommand::SetFocus(FocusState::Text(
                TextSelection::range(b, 1, 5),
            ))),
        )
        .unwrap();

    workspace.set_block_text(b, "hi").unwrap();
    assert_eq!(
        workspace.buffer_state(outer).unwrap().focus,
        FocusState::Text(TextSelection::range(b, 1, 2))
    );
}

#[test]
fn test_drill_in_and_out_report_root_changes() {
    let Doc {
        mut workspace,
        outer,
        root,
        a,
        a1,
        ..
    } = doc();
    select(&mut workspace, outer, a);
    let seen = record(&mut workspace, outer);

    workspace
        .execute(outer, Command::Cursor(CursorCommand::DrillIn))
        .unwrap();
    let state = workspace.buffer_state(outer).unwrap();
    assert_eq!(state.root, a);
    assert_eq!(state.focus, FocusState::Blocks(BlockSelection::single(a1)));

    workspace
        .execute(outer, Command::Cursor(CursorCommand::DrillOut))
        .unwrap();
    let state = workspace.buffer_state(outer).unwrap();
    assert_eq!(state.root, root);
    assert_eq!(state.focus, FocusState::Blocks(BlockSelection::single(a)));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            StateChangeType::RootChanged,
            StateChangeType::FocusChanged,
            StateChangeType::RootChanged,
            StateChangeType::FocusChanged,
        ]
    );
}

#[test]
fn test_failed_command_leaves_document_untouched() {
    let Doc {
        mut workspace,
        outer,
        b,
        ..
    } = doc();
    let tree = workspace.tree().clone();
    let err = workspace.execute(
        outer,
        Command::Cursor(CursorCommand::SetFocus(FocusState::Text(
            TextSelection::caret(b, 99),
        ))),
    );
    assert!(err.is_err());
    assert_eq!(workspace.tree(), &tree);

    // Typing with nothing focused is a no-op, not an error.
    assert_eq!(
        workspace.execute(outer, Command::Edit(EditCommand::InsertText("x".into()))),
        Ok(outliner_core::CommandResult::Unchanged)
    );
}

#[test]
fn test_navigation_and_folding_leave_tree_version_alone() {
    let Doc {
        mut workspace,
        outer,
        a,
        ..
    } = doc();
    let version = workspace.tree().version();
    let seen = record(&mut workspace, outer);

    workspace
        .handle_key(outer, KeyChord::plain(Key::Arrow(Direction::Down)))
        .unwrap();
    workspace
        .handle_key(outer, KeyChord::plain(Key::Space))
        .unwrap();
    assert_eq!(workspace.tree().version(), version);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![StateChangeType::FocusChanged, StateChangeType::FoldingChanged]
    );
    assert!(!workspace.buffer(outer).unwrap().fold().is_expanded(a));

    assert!(!Command::Fold(FoldCommand::Toggle).may_edit_tree());
    assert!(!Command::Cursor(CursorCommand::DrillIn).may_edit_tree());
    assert!(Command::Edit(EditCommand::Split).may_edit_tree());
}

#[test]
fn test_config_from_json_and_validation() {
    let config =
        OutlinerConfig::from_json_str(r#"{ "wrap_width": 8, "wrap_mode": "word" }"#).unwrap();
    assert_eq!(config.wrap_width, 8);
    assert_eq!(config.tab_width, 4);

    let mut workspace = Workspace::with_config(config.clone());
    assert_eq!(workspace.config(), &config);

    let zero_tab = OutlinerConfig {
        tab_width: 0,
        ..OutlinerConfig::default()
    };
    assert!(matches!(
        workspace.set_config(zero_tab),
        Err(ConfigError::ZeroTabWidth)
    ));
    assert_eq!(workspace.config(), &config);
}
