//! Register selection.
//!
//! The dispatcher never stores register contents; it only asks the register
//! store whether a typed name designates a slot and carries the answer into
//! the execution record.

use std::fmt;

/// Name of a register slot. Defaults to the unnamed register (`"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterName(char);

impl RegisterName {
    pub const UNNAMED: Self = Self('"');

    pub const fn new(name: char) -> Self {
        Self(name)
    }

    pub fn as_char(self) -> char {
        self.0
    }

    pub fn is_unnamed(self) -> bool {
        self == Self::UNNAMED
    }
}

impl Default for RegisterName {
    fn default() -> Self {
        Self::UNNAMED
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}", self.0)
    }
}

/// Register-storage collaborator.
pub trait RegisterStore {
    /// Resolve the slot named by `name`, or `None` when no such slot exists.
    fn resolve(&self, name: char) -> Option<RegisterName>;
}

/// Vim's register namespace: named `a-z` (uppercase appends), numbered
/// `0-9`, and the special registers.
#[derive(Debug, Clone, Copy, Default)]
pub struct VimRegisters;

impl RegisterStore for VimRegisters {
    fn resolve(&self, name: char) -> Option<RegisterName> {
        let valid = name.is_ascii_alphanumeric()
            || matches!(
                name,
                '"' | '-' | '*' | '+' | '_' | '/' | ':' | '.' | '%' | '#' | '='
            );
        valid.then_some(RegisterName::new(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vim_namespace() {
        let regs = VimRegisters;
        for c in ['a', 'Z', '0', '9', '"', '+', '_'] {
            assert_eq!(regs.resolve(c), Some(RegisterName::new(c)), "{c}");
        }
        for c in ['!', ' ', 'é', '\t'] {
            assert_eq!(regs.resolve(c), None, "{c:?}");
        }
    }

    #[test]
    fn default_is_unnamed() {
        assert!(RegisterName::default().is_unnamed());
        assert_eq!(RegisterName::new('a').to_string(), "\"a");
    }
}
