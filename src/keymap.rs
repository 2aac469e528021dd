//! Keyboard commands and the chord → command dispatch table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use egui::{Key, Modifiers};

use crate::error::ConfigError;

/// Everything the layer can be told to do from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    EditSelected,
    AddNext,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    FontSizeDown,
    FontSizeUp,
    RotateCcw,
    RotateCw,
    DeleteSelected,
    SelectAll,
    Undo,
    Redo,
    Save,
}

impl Command {
    pub const ALL: [Command; 15] = [
        Command::EditSelected,
        Command::AddNext,
        Command::MoveLeft,
        Command::MoveRight,
        Command::MoveUp,
        Command::MoveDown,
        Command::FontSizeDown,
        Command::FontSizeUp,
        Command::RotateCcw,
        Command::RotateCw,
        Command::DeleteSelected,
        Command::SelectAll,
        Command::Undo,
        Command::Redo,
        Command::Save,
    ];

    /// Name used in config files.
    pub fn name(self) -> &'static str {
        match self {
            Command::EditSelected => "edit_selected",
            Command::AddNext => "add_next",
            Command::MoveLeft => "move_left",
            Command::MoveRight => "move_right",
            Command::MoveUp => "move_up",
            Command::MoveDown => "move_down",
            Command::FontSizeDown => "font_size_down",
            Command::FontSizeUp => "font_size_up",
            Command::RotateCcw => "rotate_ccw",
            Command::RotateCw => "rotate_cw",
            Command::DeleteSelected => "delete_selected",
            Command::SelectAll => "select_all",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Save => "save",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn default_key(self) -> &'static str {
        match self {
            Command::EditSelected => "F2",
            Command::AddNext => "Enter",
            Command::MoveLeft => "Left",
            Command::MoveRight => "Right",
            Command::MoveUp => "Up",
            Command::MoveDown => "Down",
            Command::FontSizeDown => "Control-Shift-<",
            Command::FontSizeUp => "Control-Shift->",
            Command::RotateCcw => "Control-[",
            Command::RotateCw => "Control-]",
            Command::DeleteSelected => "Delete",
            Command::SelectAll => "Control-A",
            Command::Undo => "Control-Z",
            Command::Redo => "Control-Shift-Z",
            Command::Save => "Control-S",
        }
    }
}

/// A key plus the modifiers held with it. `command` is Ctrl, or Cmd on macOS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub command: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            command: false,
            shift: false,
            alt: false,
        }
    }

    pub fn from_event(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            command: modifiers.command || modifiers.ctrl,
            shift: modifiers.shift,
            alt: modifiers.alt,
        }
    }
}

/// Key names accepted besides egui's own, with the shift they imply.
fn key_from_name(name: &str) -> Option<(Key, bool)> {
    let key = match name {
        "<" => return Some((Key::Comma, true)),
        ">" => return Some((Key::Period, true)),
        "Left" => Key::ArrowLeft,
        "Right" => Key::ArrowRight,
        "Up" => Key::ArrowUp,
        "Down" => Key::ArrowDown,
        "Return" => Key::Enter,
        "Esc" => Key::Escape,
        "Del" => Key::Delete,
        "[" => Key::OpenBracket,
        "]" => Key::CloseBracket,
        "-" => Key::Minus,
        _ if name.chars().count() == 1 => {
            return Key::from_name(&name.to_uppercase()).map(|k| (k, false));
        }
        _ => return Key::from_name(name).map(|k| (k, false)),
    };
    Some((key, false))
}

impl FromStr for KeyChord {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidKey(s.to_string());
        let (mods, key) = if s == "-" {
            ("", "-")
        } else if let Some(rest) = s.strip_suffix("--") {
            (rest, "-")
        } else {
            s.rsplit_once('-').unwrap_or(("", s))
        };
        if key.is_empty() {
            return Err(invalid());
        }

        let (key, implied_shift) = key_from_name(key).ok_or_else(invalid)?;
        let mut chord = KeyChord::new(key);
        chord.shift = implied_shift;
        for part in mods.split('-').filter(|p| !p.is_empty()) {
            match part {
                "Control" | "Ctrl" | "Command" | "Cmd" => chord.command = true,
                "Shift" => chord.shift = true,
                "Alt" | "Option" => chord.alt = true,
                _ => return Err(invalid()),
            }
        }
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.command {
            f.write_str("Control-")?;
        }
        let key = match (self.key, self.shift) {
            (Key::Comma, true) => "<",
            (Key::Period, true) => ">",
            (key, shift) => {
                if shift {
                    f.write_str("Shift-")?;
                }
                match key {
                    Key::ArrowLeft => "Left",
                    Key::ArrowRight => "Right",
                    Key::ArrowUp => "Up",
                    Key::ArrowDown => "Down",
                    Key::OpenBracket => "[",
                    Key::CloseBracket => "]",
                    other => other.name(),
                }
            }
        };
        if self.alt {
            f.write_str("Alt-")?;
        }
        f.write_str(key)
    }
}

/// Chord → command table consulted by the input loop.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<KeyChord, Command>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut bindings = HashMap::new();
        for command in Command::ALL {
            if let Ok(chord) = command.default_key().parse::<KeyChord>() {
                bindings.insert(chord, command);
            }
        }
        Self { bindings }
    }
}

impl Keymap {
    /// Defaults with the given `command name → key string` overrides applied.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut keymap = Self::default();
        for (name, key) in overrides {
            let command = Command::from_name(name)
                .ok_or_else(|| ConfigError::UnknownCommand(name.clone()))?;
            keymap.bind(key.parse()?, command);
        }
        Ok(keymap)
    }

    /// Binds `chord` to `command`, dropping the command's previous chord.
    pub fn bind(&mut self, chord: KeyChord, command: Command) {
        self.bindings.retain(|_, c| *c != command);
        self.bindings.insert(chord, command);
    }

    pub fn lookup(&self, key: Key, modifiers: Modifiers) -> Option<Command> {
        self.bindings
            .get(&KeyChord::from_event(key, modifiers))
            .copied()
    }

    pub fn chord_for(&self, command: Command) -> Option<KeyChord> {
        self.bindings
            .iter()
            .find(|(_, c)| **c == command)
            .map(|(chord, _)| *chord)
    }
}
