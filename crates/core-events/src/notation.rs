//! Angle-bracket key notation (`3"add<Esc>`, `<C-d>`, `<lt>`).
//!
//! Plain characters stand for themselves. Anything between `<` and `>` is a
//! named key or a single character, optionally preceded by `C-`, `A-`/`M-`
//! or `S-` modifier prefixes. A literal `<` must be written `<lt>`. `S-` on a
//! character folds into the character itself (`<S-x>` is `X`), matching how
//! terminals deliver shifted characters.

use crate::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("unterminated key notation starting at byte {0}")]
    Unterminated(usize),
    #[error("unknown key name `{0}`")]
    UnknownKey(String),
    #[error("unknown modifier `{modifier}` in `<{notation}>`")]
    UnknownModifier { modifier: char, notation: String },
}

/// Parse a key script into individual key presses.
pub fn parse_keys(input: &str) -> Result<Vec<KeyEvent>, KeyParseError> {
    let mut keys = Vec::new();
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c != '<' {
            keys.push(KeyEvent::char(c));
            continue;
        }
        let tail = &input[idx + 1..];
        let Some(end) = tail.find('>') else {
            return Err(KeyParseError::Unterminated(idx));
        };
        keys.push(parse_bracketed(&tail[..end])?);
        // Skip the bracket body and the closing '>'.
        let close = idx + 1 + end;
        for (i, _) in chars.by_ref() {
            if i == close {
                break;
            }
        }
    }
    Ok(keys)
}

fn parse_bracketed(body: &str) -> Result<KeyEvent, KeyParseError> {
    let mut mods = KeyModifiers::empty();
    let mut name = body;
    // `X-` prefixes; a trailing `-` is the key itself (`<C-->`).
    while name.len() > 2 && name.as_bytes()[1] == b'-' {
        let flag = match name.as_bytes()[0].to_ascii_uppercase() {
            b'C' => KeyModifiers::CTRL,
            b'A' | b'M' => KeyModifiers::ALT,
            b'S' => KeyModifiers::SHIFT,
            other => {
                return Err(KeyParseError::UnknownModifier {
                    modifier: other as char,
                    notation: body.to_string(),
                });
            }
        };
        mods |= flag;
        name = &name[2..];
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "lt" => KeyCode::Char('<'),
        "space" => KeyCode::Char(' '),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        _ => {
            let mut it = name.chars();
            match (it.next(), it.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(KeyParseError::UnknownKey(name.to_string())),
            }
        }
    };
    // Shifted characters are the character they produce: `<S-x>` is `X`.
    if let KeyCode::Char(c) = code
        && mods.contains(KeyModifiers::SHIFT)
    {
        let mut upper = c.to_uppercase();
        let produced = match (upper.next(), upper.next()) {
            (Some(u), None) => u,
            _ => c,
        };
        return Ok(KeyEvent::new(
            KeyCode::Char(produced),
            mods - KeyModifiers::SHIFT,
        ));
    }
    Ok(KeyEvent::new(code, mods))
}
