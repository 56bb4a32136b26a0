//! Key chords and their resolution into commands.
//!
//! Hosts translate platform key events into a [`KeyChord`]: a logical [`Key`] plus a
//! [`Modifiers`] bitfield. `MOD` is the platform command key (Cmd on macOS, Ctrl elsewhere);
//! the host performs that normalization. [`resolve`] maps a chord to a [`Command`] depending on
//! the buffer's current [`FocusMode`]; unbound chords resolve to `None`.

use crate::commands::{
    ClipboardCommand, Command, CursorCommand, Direction, EditCommand, FoldCommand,
    StructureCommand, VerticalDirection,
};
use crate::selection::FocusMode;
use std::fmt;

/// Modifier keys as a bitfield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No modifier held.
    pub const NONE: Modifiers = Modifiers(0);
    /// Shift.
    pub const SHIFT: Modifiers = Modifiers(0b001);
    /// Alt / Option.
    pub const ALT: Modifiers = Modifiers(0b010);
    /// Platform command key (Cmd on macOS, Ctrl elsewhere).
    pub const MOD: Modifiers = Modifiers(0b100);

    /// Check if shift is held
    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & Self::SHIFT.0 != 0
    }

    /// Check if alt is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & Self::ALT.0 != 0
    }

    /// Check if the command key is held
    #[inline]
    pub const fn command(self) -> bool {
        self.0 & Self::MOD.0 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.shift() {
            parts.push("Shift");
        }
        if self.alt() {
            parts.push("Alt");
        }
        if self.command() {
            parts.push("Mod");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// Logical key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow key.
    Arrow(Direction),
    /// Enter / Return.
    Enter,
    /// Space bar.
    Space,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// A printable character (already shifted by the host).
    Char(char),
}

/// A key together with the modifiers held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// Key pressed.
    pub key: Key,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl KeyChord {
    /// Chord with explicit modifiers.
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Key without modifiers.
    pub const fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            write!(f, "{}+", self.modifiers)?;
        }
        match self.key {
            Key::Arrow(direction) => write!(f, "Arrow{direction:?}"),
            Key::Char(ch) => write!(f, "{ch}"),
            other => write!(f, "{other:?}"),
        }
    }
}

fn vertical(direction: Direction) -> Option<VerticalDirection> {
    match direction {
        Direction::Up => Some(VerticalDirection::Up),
        Direction::Down => Some(VerticalDirection::Down),
        Direction::Left | Direction::Right => None,
    }
}

fn resolve_arrow(direction: Direction, modifiers: Modifiers) -> Option<Command> {
    let chord = (modifiers.shift(), modifiers.alt(), modifiers.command());
    let command = match chord {
        (false, false, false) => Command::Cursor(CursorCommand::Move(direction)),
        (true, false, false) => Command::Cursor(CursorCommand::Extend(direction)),
        (false, false, true) => Command::Fold(match direction {
            Direction::Up => FoldCommand::CollapseOneLevel,
            Direction::Down => FoldCommand::ExpandOneLevel,
            Direction::Left => FoldCommand::Collapse,
            Direction::Right => FoldCommand::Expand,
        }),
        (true, false, true) => Command::Cursor(match direction {
            Direction::Down | Direction::Right => CursorCommand::DrillIn,
            Direction::Up | Direction::Left => CursorCommand::DrillOut,
        }),
        (false, true, true) => Command::Structure(match direction {
            Direction::Left => StructureCommand::Outdent,
            Direction::Right => StructureCommand::Indent,
            Direction::Up | Direction::Down => StructureCommand::Swap(vertical(direction)?),
        }),
        (true, true, true) => Command::Structure(match direction {
            Direction::Left => StructureCommand::OutdentToTop,
            Direction::Right => return None,
            Direction::Up | Direction::Down => {
                StructureCommand::MoveToExtreme(vertical(direction)?)
            }
        }),
        _ => return None,
    };
    Some(command)
}

/// Resolve a chord for a buffer in `mode`.
pub fn resolve(chord: KeyChord, mode: FocusMode) -> Option<Command> {
    let modifiers = chord.modifiers;
    let plain = modifiers.is_empty();
    let shift_only = modifiers == Modifiers::SHIFT;
    let editing = matches!(mode, FocusMode::Text | FocusMode::Title);

    match chord.key {
        Key::Arrow(direction) => resolve_arrow(direction, modifiers),
        Key::Tab if plain => Some(Command::Structure(StructureCommand::Indent)),
        Key::Tab if shift_only => Some(Command::Structure(StructureCommand::Outdent)),
        Key::Enter if plain => Some(match mode {
            FocusMode::Blocks => Command::Cursor(CursorCommand::EditBlock),
            _ => Command::Edit(EditCommand::Split),
        }),
        Key::Space if plain || shift_only => match mode {
            FocusMode::Blocks => Some(Command::Fold(FoldCommand::Toggle)),
            FocusMode::Text | FocusMode::Title => {
                Some(Command::Edit(EditCommand::InsertText(" ".to_string())))
            }
            FocusMode::None => None,
        },
        Key::Backspace if plain => Some(Command::Edit(EditCommand::Backspace)),
        Key::Delete if plain => Some(Command::Edit(EditCommand::DeleteForward)),
        Key::Backspace | Key::Delete if shift_only => {
            Some(Command::Edit(EditCommand::ForceDelete))
        }
        Key::Escape if plain => match mode {
            FocusMode::Text => Some(Command::Cursor(CursorCommand::SelectBlock)),
            FocusMode::Blocks | FocusMode::Title => Some(Command::Cursor(CursorCommand::ClearFocus)),
            FocusMode::None => None,
        },
        Key::Char(ch) if modifiers == Modifiers::MOD => match ch.to_ascii_lowercase() {
            'a' => Some(Command::Cursor(CursorCommand::SelectAll)),
            'c' => Some(Command::Clipboard(ClipboardCommand::Copy)),
            'x' => Some(Command::Clipboard(ClipboardCommand::Cut)),
            _ => None,
        },
        Key::Char(ch) if (plain || shift_only) && editing => {
            Some(Command::Edit(EditCommand::InsertText(ch.to_string())))
        }
        _ => None,
    }
}
