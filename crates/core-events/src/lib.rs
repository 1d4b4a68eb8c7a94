//! Key model shared by the keymap registry and the command dispatcher.
//!
//! A [`KeyEvent`] is one discrete key press: a logical key code plus the
//! modifier flags held while it was pressed. Equality, ordering and hashing are
//! structural so key presses can be used directly as map keys and compared
//! inside key sequences.
//!
//! Key presses render to (and parse from) the familiar angle-bracket notation
//! (`d`, `<Esc>`, `<C-d>`, `<lt>`); see [`parse_keys`].

use std::fmt;

mod notation;

pub use notation::{KeyParseError, parse_keys};

/// Logical key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

/// One key press (code + modifiers). Immutable value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Unmodified character key.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    /// Unmodified non-character key.
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub const fn esc() -> Self {
        Self::plain(KeyCode::Esc)
    }

    pub fn with_mods(self, mods: KeyModifiers) -> Self {
        Self {
            code: self.code,
            mods: self.mods | mods,
        }
    }

    /// Character produced by this key when no CTRL/ALT chord is held.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) => {
                Some(c)
            }
            _ => None,
        }
    }

    /// Decimal digit value of a printable digit key.
    pub fn digit(&self) -> Option<u32> {
        self.printable().and_then(|c| c.to_digit(10))
    }

    fn needs_brackets(&self) -> bool {
        !self.mods.is_empty() || !matches!(self.code, KeyCode::Char(c) if c != '<' && c != ' ')
    }
}

fn write_code(code: KeyCode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match code {
        KeyCode::Char('<') => f.write_str("lt"),
        KeyCode::Char(' ') => f.write_str("Space"),
        KeyCode::Char(c) => write!(f, "{c}"),
        KeyCode::Enter => f.write_str("CR"),
        KeyCode::Esc => f.write_str("Esc"),
        KeyCode::Backspace => f.write_str("BS"),
        KeyCode::Tab => f.write_str("Tab"),
        KeyCode::Up => f.write_str("Up"),
        KeyCode::Down => f.write_str("Down"),
        KeyCode::Left => f.write_str("Left"),
        KeyCode::Right => f.write_str("Right"),
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.needs_brackets() {
            return write_code(self.code, f);
        }
        f.write_str("<")?;
        if self.mods.contains(KeyModifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("A-")?;
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            f.write_str("S-")?;
        }
        write_code(self.code, f)?;
        f.write_str(">")
    }
}
