use core_events::{KeyEvent, KeyParseError, parse_keys};
use smallvec::SmallVec;
use std::{fmt, str::FromStr};

/// Ordered sequence of key presses.
///
/// Serves both as the registration name of a command and as the accumulated
/// input of an in-progress resolution. Ordering is lexicographic over keys,
/// which keeps every binding sharing a prefix contiguous in an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySequence(SmallVec<[KeyEvent; 4]>);

impl KeySequence {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Parse from key notation (`"g~"`, `"<C-w>j"`).
    pub fn parse(notation: &str) -> Result<Self, KeyParseError> {
        parse_keys(notation).map(Self::from_iter)
    }

    pub fn keys(&self) -> &[KeyEvent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&KeyEvent> {
        self.0.last()
    }

    pub fn push(&mut self, key: KeyEvent) {
        self.0.push(key);
    }

    pub fn pop(&mut self) -> Option<KeyEvent> {
        self.0.pop()
    }

    /// Copy of this sequence with `key` appended.
    pub fn appended(&self, key: KeyEvent) -> Self {
        let mut next = self.clone();
        next.push(key);
        next
    }

    /// The sequence one key shorter, or `None` when empty.
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self::from(head))
    }

    /// `true` when `other` starts with every key of `self` (equal counts).
    pub fn is_prefix_of(&self, other: &KeySequence) -> bool {
        other.0.starts_with(&self.0)
    }

    /// `true` when `other` starts with `self` and is strictly longer.
    pub fn is_strict_prefix_of(&self, other: &KeySequence) -> bool {
        other.len() > self.len() && self.is_prefix_of(other)
    }
}

impl From<&[KeyEvent]> for KeySequence {
    fn from(keys: &[KeyEvent]) -> Self {
        Self(SmallVec::from_slice(keys))
    }
}

impl FromIterator<KeyEvent> for KeySequence {
    fn from_iter<I: IntoIterator<Item = KeyEvent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for KeySequence {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
