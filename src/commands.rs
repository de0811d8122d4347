//! Every user-triggerable action and the keyboard chords bound to it.
//!
//! Menus, shortcuts and dialog buttons all produce a [`Command`]; the window
//! runs it in one place.

use eframe::egui::{Key, KeyboardShortcut, Modifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    NewWindow,
    Open,
    Save,
    SaveAs,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    Find,
    Replace,
    FindNext,
    ReplaceNext,
    ReplaceAll,
    Bold,
    Italic,
    TextColor,
    LineNumberColor,
    ToggleLineNumbers,
    ToggleWordWrap,
    FontSettings,
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::NewWindow => "New Window",
            Command::Open => "Open",
            Command::Save => "Save",
            Command::SaveAs => "Save As",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Cut => "Cut",
            Command::Copy => "Copy",
            Command::Paste => "Paste",
            Command::Find => "Find",
            Command::Replace => "Replace",
            Command::FindNext => "Find",
            Command::ReplaceNext => "Replace",
            Command::ReplaceAll => "Replace All",
            Command::Bold => "Bold",
            Command::Italic => "Italic",
            Command::TextColor => "Text Color",
            Command::LineNumberColor => "Line Number Color",
            Command::ToggleLineNumbers => "Show Line Numbers",
            Command::ToggleWordWrap => "Word Wrap",
            Command::FontSettings => "Settings",
        }
    }

    pub fn shortcut(&self) -> Option<KeyboardShortcut> {
        SHORTCUTS
            .iter()
            .find(|(_, cmd)| cmd == self)
            .map(|(shortcut, _)| *shortcut)
    }

    /// Human-readable chord for menus, e.g. "Ctrl+Shift+S".
    pub fn shortcut_text(&self) -> String {
        self.shortcut()
            .map(|s| format_shortcut(&s))
            .unwrap_or_default()
    }

    /// Cut/copy/paste keys are left to the text widget, which already
    /// handles them; the chord is still shown in the menu.
    pub fn handled_by_widget(&self) -> bool {
        matches!(self, Command::Cut | Command::Copy | Command::Paste)
    }

    /// Commands that act on the document's text or history. Their chords
    /// belong to whichever text field has focus.
    pub fn edits_document(&self) -> bool {
        matches!(
            self,
            Command::Undo | Command::Redo | Command::Bold | Command::Italic
        )
    }
}

const fn chord(modifiers: Modifiers, key: Key) -> KeyboardShortcut {
    KeyboardShortcut::new(modifiers, key)
}

const CTRL_SHIFT: Modifiers = Modifiers {
    alt: false,
    ctrl: false,
    shift: true,
    mac_cmd: false,
    command: true,
};

/// Chord table. A chord whose modifiers are a superset of another's must come
/// first: Ctrl+S also matches when Shift is held.
pub const SHORTCUTS: &[(KeyboardShortcut, Command)] = &[
    (chord(CTRL_SHIFT, Key::S), Command::SaveAs),
    (chord(Modifiers::COMMAND, Key::N), Command::NewWindow),
    (chord(Modifiers::COMMAND, Key::O), Command::Open),
    (chord(Modifiers::COMMAND, Key::S), Command::Save),
    (chord(Modifiers::COMMAND, Key::Y), Command::Redo),
    // The text widget treats this as redo too; keep it on our history.
    (chord(CTRL_SHIFT, Key::Z), Command::Redo),
    (chord(Modifiers::COMMAND, Key::Z), Command::Undo),
    (chord(Modifiers::COMMAND, Key::X), Command::Cut),
    (chord(Modifiers::COMMAND, Key::C), Command::Copy),
    (chord(Modifiers::COMMAND, Key::V), Command::Paste),
    (chord(Modifiers::COMMAND, Key::F), Command::Find),
    (chord(Modifiers::COMMAND, Key::H), Command::Replace),
    (chord(Modifiers::COMMAND, Key::B), Command::Bold),
    (chord(Modifiers::COMMAND, Key::I), Command::Italic),
];

fn format_shortcut(shortcut: &KeyboardShortcut) -> String {
    let mut parts = Vec::new();
    if shortcut.modifiers.command || shortcut.modifiers.ctrl {
        parts.push("Ctrl");
    }
    if shortcut.modifiers.alt {
        parts.push("Alt");
    }
    if shortcut.modifiers.shift {
        parts.push("Shift");
    }
    parts.push(shortcut.logical_key.name());
    parts.join("+")
}
