//! Keyboard session example
//!
//! Builds a small outline and drives it with key chords, printing the visible rows and the
//! focus after each step.

use outliner_core::{
    BufferId, Direction, FocusState, InsertPosition, Key, KeyChord, Modifiers, Workspace,
};
use std::sync::{Arc, Mutex};

fn print_outline(workspace: &Workspace, buffer: BufferId) {
    let state = workspace.buffer_state(buffer).unwrap();
    println!("  # {}", workspace.text(state.root).unwrap());
    for row in workspace.visible_rows(buffer).unwrap() {
        let marker = match &state.focus {
            FocusState::Blocks(selection) if selection.contains(row.node) => ">",
            FocusState::Text(selection) if selection.node == row.node => "|",
            _ => " ",
        };
        let bullet = match (row.has_children, row.expanded) {
            (true, false) => "+",
            (true, true) => "-",
            (false, _) => "*",
        };
        println!(
            "  {marker} {}{bullet} {}",
            "  ".repeat(row.depth),
            workspace.text(row.node).unwrap()
        );
    }
    println!("  focus: {:?}\n", state.focus);
}

fn main() {
    println!("=== Outliner keyboard session ===\n");

    let mut workspace = Workspace::new();
    let buffer = workspace.open_buffer("Trip");
    let root = workspace.buffer_state(buffer).unwrap().root;
    let packing = workspace
        .insert_block(root, InsertPosition::Append, "Packing")
        .unwrap();
    for item in ["Passport", "Charger", "Socks"] {
        workspace
            .insert_block(packing, InsertPosition::Append, item)
            .unwrap();
    }
    workspace
        .insert_block(root, InsertPosition::Append, "Book hotel")
        .unwrap();

    let changes = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&changes);
    workspace
        .subscribe(buffer, move |change| {
            *counter.lock().unwrap() += 1;
            println!(
                "  change: {:?} (version {} -> {})",
                change.change_type, change.old_version, change.new_version
            );
        })
        .unwrap();

    let steps = [
        ("ArrowDown selects the first block", KeyChord::plain(Key::Arrow(Direction::Down))),
        ("ArrowRight steps into the children", KeyChord::plain(Key::Arrow(Direction::Right))),
        ("ArrowDown moves to the next sibling", KeyChord::plain(Key::Arrow(Direction::Down))),
        (
            "Alt+Mod+ArrowUp swaps it upward",
            KeyChord::new(Key::Arrow(Direction::Up), Modifiers::ALT | Modifiers::MOD),
        ),
        ("Enter edits the block", KeyChord::plain(Key::Enter)),
        ("Typing appends text", KeyChord::plain(Key::Char('s'))),
        ("Escape selects the block again", KeyChord::plain(Key::Escape)),
        (
            "Mod+ArrowUp collapses one level",
            KeyChord::new(Key::Arrow(Direction::Up), Modifiers::MOD),
        ),
        ("ArrowLeft goes to the parent", KeyChord::plain(Key::Arrow(Direction::Left))),
        ("Space folds it", KeyChord::plain(Key::Space)),
    ];

    for (index, (label, chord)) in steps.into_iter().enumerate() {
        println!("{}. {label} [{chord}]", index + 1);
        let result = workspace.handle_key(buffer, chord).unwrap();
        println!("  result: {result:?}");
        print_outline(&workspace, buffer);
    }

    println!("Total change notifications: {}", changes.lock().unwrap());
}
