//! Terminal key input.

use anyhow::Result;
use core_events::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Map a crossterm key press into a dispatcher key.
///
/// Returns `None` for releases and for keys the dispatcher has no name for
/// (function keys, media keys, lone modifiers).
pub fn map_key_event(event: &CKeyEvent) -> Option<KeyEvent> {
    if event.kind == CKeyEventKind::Release {
        return None;
    }
    let code = map_key_code(&event.code)?;
    let mut mods = map_mods(event.modifiers);
    // Shifted characters already arrive upper-cased.
    if matches!(code, KeyCode::Char(_)) {
        mods.remove(KeyModifiers::SHIFT);
    }
    Some(KeyEvent::new(code, mods))
}

fn map_key_code(code: &CKeyCode) -> Option<KeyCode> {
    let mapped = match code {
        CKeyCode::Char(c) => KeyCode::Char(*c),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Tab | CKeyCode::BackTab => KeyCode::Tab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        _ => return None,
    };
    Some(mapped)
}

fn map_mods(m: CKeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CKeyModifiers::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CKeyModifiers::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CKeyModifiers::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}

/// Raw terminal mode for the lifetime of the guard.
pub struct RawModeGuard(());

impl RawModeGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState as CKeyEventState;

    fn key_event(code: CKeyCode, modifiers: CKeyModifiers, kind: CKeyEventKind) -> CKeyEvent {
        CKeyEvent {
            code,
            modifiers,
            kind,
            state: CKeyEventState::empty(),
        }
    }

    #[test]
    fn maps_basic_char() {
        let ev = key_event(
            CKeyCode::Char('a'),
            CKeyModifiers::NONE,
            CKeyEventKind::Press,
        );
        assert_eq!(map_key_event(&ev), Some(KeyEvent::char('a')));
    }

    #[test]
    fn shift_is_folded_into_characters_only() {
        let ev = key_event(
            CKeyCode::Char('D'),
            CKeyModifiers::SHIFT,
            CKeyEventKind::Press,
        );
        assert_eq!(map_key_event(&ev), Some(KeyEvent::char('D')));

        let ev = key_event(CKeyCode::Tab, CKeyModifiers::SHIFT, CKeyEventKind::Press);
        assert_eq!(
            map_key_event(&ev),
            Some(KeyEvent::plain(KeyCode::Tab).with_mods(KeyModifiers::SHIFT))
        );
    }

    #[test]
    fn shifted_terminal_keys_match_shift_notation() {
        let ev = key_event(
            CKeyCode::Char('X'),
            CKeyModifiers::SHIFT,
            CKeyEventKind::Press,
        );
        let notation = core_events::parse_keys("<S-x>").expect("valid notation");
        assert_eq!(map_key_event(&ev), notation.first().copied());
    }

    #[test]
    fn maps_control_chord() {
        let ev = key_event(
            CKeyCode::Char('v'),
            CKeyModifiers::CONTROL,
            CKeyEventKind::Press,
        );
        let key = map_key_event(&ev).expect("ctrl-v should map");
        assert_eq!(key.to_string(), "<C-v>");
    }

    #[test]
    fn releases_and_unsupported_keys_are_dropped() {
        let ev = key_event(CKeyCode::Esc, CKeyModifiers::NONE, CKeyEventKind::Release);
        assert!(map_key_event(&ev).is_none());
        let ev = key_event(CKeyCode::F(5), CKeyModifiers::NONE, CKeyEventKind::Press);
        assert!(map_key_event(&ev).is_none());
        let ev = key_event(
            CKeyCode::CapsLock,
            CKeyModifiers::NONE,
            CKeyEventKind::Press,
        );
        assert!(map_key_event(&ev).is_none());
    }
}
