mod common;

use common::Outline;
use outliner_core::{
    BlockSelection, CommandResult, Direction, FocusState, Key, Modifiers, TextSelection,
};
use pretty_assertions::assert_eq;

#[test]
fn test_indent_outdent_round_trip() {
    let mut outline = Outline::new(&[(0, "a"), (0, "b"), (0, "c")]);
    let [a, b, c] = outline.ids[..] else {
        panic!("unexpected outline");
    };
    outline.focus(FocusState::Blocks(BlockSelection::single(b)));

    outline.press(Key::Tab);
    assert_eq!(outline.children(outline.root), vec![a, c]);
    assert_eq!(outline.children(a), vec![b]);

    outline.key(Key::Tab, Modifiers::SHIFT);
    assert_eq!(outline.children(outline.root), vec![a, b, c]);
    assert!(outline.children(a).is_empty());
    assert_eq!(
        outline.state_focus(),
        FocusState::Blocks(BlockSelection::single(b))
    );
}

#[test]
fn test_indent_and_outdent_noops_at_edges() {
    let mut outline = Outline::new(&[(0, "a"), (0, "b")]);
    let a = outline.ids[0];
    outline.focus(FocusState::Blocks(BlockSelection::single(a)));

    assert_eq!(outline.press(Key::Tab), CommandResult::Unchanged);
    assert_eq!(
        outline.key(Key::Tab, Modifiers::SHIFT),
        CommandResult::Unchanged
    );
    assert_eq!(
        outline.arrow(Direction::Left, Modifiers::ALT | Modifiers::MOD),
        CommandResult::Unchanged
    );
}

#[test]
fn test_text_caret_survives_indent() {
    let mut outline = Outline::new(&[(0, "a"), (0, "bcd")]);
    let [a, b] = outline.ids[..] else {
        panic!("unexpected outline");
    };
    outline.focus(FocusState::Text(TextSelection::caret(b, 2)));

    outline.arrow(Direction::Right, Modifiers::ALT | Modifiers::MOD);
    assert_eq!(outline.children(a), vec![b]);
    assert_eq!(
        outline.state_focus(),
        FocusState::Text(TextSelection::caret(b, 2))
    );
}

#[test]
fn test_swap_range_down_across_parent_boundary() {
    let mut outline = Outline::new(&[
        (0, "p"),
        (1, "x"),
        (1, "y"),
        (1, "z"),
        (0, "q"),
        (1, "q1"),
    ]);
    let [p, x, y, z, q, q1] = outline.ids[..] else {
        panic!("unexpected outline");
    };
    outline.focus(FocusState::Blocks(
        BlockSelection::range(outline.workspace.tree(), y, z).unwrap(),
    ));

    outline.arrow(Direction::Down, Modifiers::ALT | Modifiers::MOD);
    assert_eq!(outline.children(p), vec![x]);
    assert_eq!(outline.children(q), vec![y, z, q1]);

    let FocusState::Blocks(selection) = outline.state_focus() else {
        panic!("expected block selection");
    };
    assert_eq!(selection.nodes(), &[y, z]);
    assert!(outline.workspace.tree().is_well_formed());
}

#[test]
fn test_swap_down_without_uncle_steps_after_parent() {
    let mut outline = Outline::new(&[(0, "p"), (1, "x"), (1, "y")]);
    let [p, x, y] = outline.ids[..] else {
        panic!("unexpected outline");
    };
    outline.focus(FocusState::Blocks(BlockSelection::single(y)));

    outline.arrow(Direction::Down, Modifiers::ALT | Modifiers::MOD);
    assert_eq!(outline.children(outline.root), vec![p, y]);
    assert_eq!(outline.children(p), vec![x]);
}

#[test]
fn test_outdent_to_top_and_unbound_right() {
    let mut outline = Outline::new(&[(0, "a"), (1, "b"), (2, "c"), (0, "d")]);
    let [a, b, c, d] = outline.ids[..] else {
        panic!("unexpected outline");
    };
    let all = Modifiers::SHIFT | Modifiers::ALT | Modifiers::MOD;
    outline.focus(FocusState::Blocks(BlockSelection::single(c)));

    assert_eq!(outline.arrow(Direction::Right, all), CommandResult::Unchanged);
    outline.arrow(Direction::Left, all);
    assert_eq!(outline.children(outline.root), vec![a, c, d]);
    assert!(outline.children(b).is_empty());
}

#[test]
fn test_nothing_focused_folds_every_top_level_block() {
    let mut outline = Outline::new(&[(0, "a"), (1, "a1"), (0, "b"), (1, "b1"), (0, "c")]);
    let [a, _, b, _, c] = outline.ids[..] else {
        panic!("unexpected outline");
    };

    outline.arrow(Direction::Left, Modifiers::MOD);
    assert!(!outline.is_expanded(a));
    assert!(!outline.is_expanded(b));
    assert!(outline.is_expanded(c), "childless blocks never fold");
    assert_eq!(outline.workspace.visible_rows(outline.buffer).unwrap().len(), 3);

    outline.arrow(Direction::Down, Modifiers::MOD);
    assert!(outline.is_expanded(a));
    assert!(outline.is_expanded(b));
}

#[test]
fn test_fold_idempotence() {
    let mut outline = Outline::new(&[(0, "a"), (1, "a1")]);
    let a = outline.ids[0];
    outline.focus(FocusState::Blocks(BlockSelection::single(a)));

    assert_eq!(
        outline.arrow(Direction::Right, Modifiers::MOD),
        CommandResult::Unchanged
    );
    outline.arrow(Direction::Left, Modifiers::MOD);
    assert_eq!(
        outline.arrow(Direction::Left, Modifiers::MOD),
        CommandResult::Unchanged
    );
}

#[test]
fn test_expand_one_level_drills_down_a_collapsed_chain() {
    let mut outline = Outline::new(&[(0, "a"), (1, "b"), (2, "c"), (3, "d")]);
    let [a, b, c, _] = outline.ids[..] else {
        panic!("unexpected outline");
    };
    outline.collapse(c);
    outline.collapse(b);
    outline.collapse(a);
    outline.focus(FocusState::Blocks(BlockSelection::single(a)));

    outline.arrow(Direction::Down, Modifiers::MOD);
    assert_eq!(
        (outline.is_expanded(a), outline.is_expanded(b), outline.is_expanded(c)),
        (true, false, false)
    );
    outline.arrow(Direction::Down, Modifiers::MOD);
    assert_eq!(
        (outline.is_expanded(a), outline.is_expanded(b), outline.is_expanded(c)),
        (true, true, false)
    );
    outline.arrow(Direction::Down, Modifiers::MOD);
    assert!(outline.is_expanded(c));
    assert_eq!(
        outline.arrow(Direction::Down, Modifiers::MOD),
        CommandResult::Unchanged
    );
}

#[test]
fn test_space_toggles_fold_in_block_mode_and_types_in_text_mode() {
    let mut outline = Outline::new(&[(0, "ab"), (1, "child")]);
    let ab = outline.ids[0];
    outline.focus(FocusState::Blocks(BlockSelection::single(ab)));

    outline.press(Key::Space);
    assert!(!outline.is_expanded(ab));
    outline.press(Key::Space);
    assert!(outline.is_expanded(ab));

    outline.focus(FocusState::Text(TextSelection::caret(ab, 1)));
    outline.press(Key::Space);
    assert_eq!(outline.text(ab), "a b");
}

#[test]
fn test_typing_replaces_selection() {
    let mut outline = Outline::new(&[(0, "hello")]);
    let node = outline.ids[0];
    outline.focus(FocusState::Text(TextSelection::range(node, 1, 4)));

    outline.key(Key::Char('E'), Modifiers::SHIFT);
    assert_eq!(outline.text(node), "hEo");
    assert_eq!(
        outline.state_focus(),
        FocusState::Text(TextSelection::caret(node, 2))
    );
}

#[test]
fn test_block_delete_lifts_children_and_shift_delete_cascades() {
    let mut outline = Outline::new(&[(0, "a"), (0, "b"), (1, "b1"), (0, "c"), (1, "c1")]);
    let [a, b, b1, c, c1] = outline.ids[..] else {
        panic!("unexpected outline");
    };

    outline.focus(FocusState::Blocks(BlockSelection::single(b)));
    outline.press(Key::Delete);
    assert_eq!(outline.children(outline.root), vec![a, b1, c]);
    assert_eq!(
        outline.state_focus(),
        FocusState::Blocks(BlockSelection::single(a))
    );

    outline.focus(FocusState::Blocks(BlockSelection::single(c)));
    outline.key(Key::Backspace, Modifiers::SHIFT);
    assert_eq!(outline.children(outline.root), vec![a, b1]);
    assert!(!outline.workspace.tree().contains(c1));
}

#[test]
fn test_deleting_only_child_focuses_parent() {
    let mut outline = Outline::new(&[(0, "parent"), (1, "only")]);
    let [parent, only] = outline.ids[..] else {
        panic!("unexpected outline");
    };
    outline.focus(FocusState::Blocks(BlockSelection::single(only)));

    outline.press(Key::Backspace);
    assert_eq!(
        outline.state_focus(),
        FocusState::Blocks(BlockSelection::single(parent))
    );

    outline.press(Key::Backspace);
    assert_eq!(outline.state_focus(), FocusState::None);
    assert!(outline.children(outline.root).is_empty());
}

#[test]
fn test_clipboard_copy_and_cut() {
    let mut outline = Outline::new(&[(0, "a"), (1, "a1"), (0, "b")]);
    let [a, _, b] = outline.ids[..] else {
        panic!("unexpected outline");
    };

    outline.focus(FocusState::Blocks(BlockSelection::single(a)));
    assert_eq!(
        outline.key(Key::Char('c'), Modifiers::MOD),
        CommandResult::Clipboard("a\n\na1".to_string())
    );

    outline.focus(FocusState::Text(TextSelection::range(b, 0, 1)));
    assert_eq!(
        outline.key(Key::Char('x'), Modifiers::MOD),
        CommandResult::Clipboard("b".to_string())
    );
    assert_eq!(outline.text(b), "");

    outline.focus(FocusState::Blocks(BlockSelection::single(a)));
    outline.key(Key::Char('x'), Modifiers::MOD);
    assert_eq!(outline.children(outline.root), vec![b]);
}
