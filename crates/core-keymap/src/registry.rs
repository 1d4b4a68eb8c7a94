use crate::KeySequence;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Anything registered under a key sequence.
pub trait Binding {
    fn binding(&self) -> &KeySequence;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a command is already bound to `{0}`")]
    DuplicateBinding(KeySequence),
    #[error("cannot bind a command to an empty key sequence")]
    EmptyBinding,
}

/// Mapping from key sequence to command.
///
/// Backed by an ordered map: every binding that extends a given sequence sits
/// in one contiguous run starting at that sequence, so prefix queries are a
/// range scan rather than a full walk.
#[derive(Debug)]
pub struct CommandRegistry<T> {
    commands: BTreeMap<KeySequence, T>,
}

impl<T> Default for CommandRegistry<T> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }
}

impl<T: Binding> CommandRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `command`. Fails without modifying the registry when its
    /// sequence is empty or already bound.
    pub fn add(&mut self, command: T) -> Result<(), RegistryError> {
        let keys = command.binding().clone();
        if keys.is_empty() {
            return Err(RegistryError::EmptyBinding);
        }
        if self.commands.contains_key(&keys) {
            debug!(target: "input.map", binding = %keys, "duplicate_binding_rejected");
            return Err(RegistryError::DuplicateBinding(keys));
        }
        debug!(target: "input.map", binding = %keys, "binding_added");
        self.commands.insert(keys, command);
        Ok(())
    }

    /// Remove the command bound to `keys`; absent bindings are ignored.
    pub fn remove(&mut self, keys: &KeySequence) -> Option<T> {
        let removed = self.commands.remove(keys);
        if removed.is_some() {
            debug!(target: "input.map", binding = %keys, "binding_removed");
        }
        removed
    }

    pub fn get(&self, keys: &KeySequence) -> Option<&T> {
        let found = self.commands.get(keys);
        trace!(target: "input.map", keys = %keys, hit = found.is_some(), "exact_lookup");
        found
    }

    pub fn contains(&self, keys: &KeySequence) -> bool {
        self.commands.contains_key(keys)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in binding order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.commands.values()
    }

    /// Every command whose binding starts with `keys` (the exact binding
    /// included when present): everything `keys` could still grow into.
    pub fn prefix_matches(&self, keys: &KeySequence) -> Vec<&T> {
        let matches: Vec<&T> = self
            .commands
            .range::<KeySequence, _>(keys..)
            .take_while(|(bound, _)| keys.is_prefix_of(bound))
            .map(|(_, command)| command)
            .collect();
        trace!(target: "input.map", keys = %keys, matches = matches.len(), "prefix_scan");
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Named {
        keys: KeySequence,
        name: &'static str,
    }

    impl Binding for Named {
        fn binding(&self) -> &KeySequence {
            &self.keys
        }
    }

    fn named(keys: &str, name: &'static str) -> Named {
        Named {
            keys: KeySequence::parse(keys).unwrap(),
            name,
        }
    }

    fn seq(s: &str) -> KeySequence {
        KeySequence::parse(s).unwrap()
    }

    fn names(found: Vec<&Named>) -> Vec<&'static str> {
        found.into_iter().map(|n| n.name).collect()
    }

    fn sample() -> CommandRegistry<Named> {
        let mut reg = CommandRegistry::new();
        for (keys, name) in [
            ("d", "delete"),
            ("dd", "delete_line"),
            ("dw", "delete_word"),
            ("x", "delete_char"),
            ("g~", "toggle_case"),
            ("g~g~", "toggle_case_line"),
            ("gu", "lower_case"),
        ] {
            reg.add(named(keys, name)).unwrap();
        }
        reg
    }

    #[test]
    fn duplicate_add_keeps_existing_binding() {
        let mut reg = sample();
        let err = reg.add(named("dd", "impostor")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateBinding(seq("dd")));
        assert_eq!(reg.get(&seq("dd")).unwrap().name, "delete_line");
        assert_eq!(reg.len(), 7);
    }

    #[test]
    fn empty_binding_rejected() {
        let mut reg = CommandRegistry::new();
        assert_eq!(
            reg.add(named("", "nothing")),
            Err(RegistryError::EmptyBinding)
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut reg = sample();
        assert!(reg.remove(&seq("zz")).is_none());
        assert_eq!(reg.len(), 7);
        assert_eq!(reg.remove(&seq("x")).unwrap().name, "delete_char");
        assert!(!reg.contains(&seq("x")));
    }

    #[test]
    fn prefix_matches_include_exact_and_extensions() {
        let reg = sample();
        assert_eq!(
            names(reg.prefix_matches(&seq("d"))),
            vec!["delete", "delete_line", "delete_word"]
        );
        assert_eq!(
            names(reg.prefix_matches(&seq("g"))),
            vec!["lower_case", "toggle_case", "toggle_case_line"]
        );
        assert_eq!(
            names(reg.prefix_matches(&seq("g~"))),
            vec!["toggle_case", "toggle_case_line"]
        );
        assert!(reg.prefix_matches(&seq("q")).is_empty());
        assert!(reg.prefix_matches(&seq("dx")).is_empty());
    }

    #[test]
    fn iter_is_binding_ordered() {
        let reg = sample();
        let order: Vec<String> = reg.iter().map(|n| n.keys.to_string()).collect();
        assert_eq!(order, vec!["d", "dd", "dw", "gu", "g~", "g~g~", "x"]);
    }

    proptest! {
        #[test]
        fn prefix_scan_matches_brute_force(
            bindings in prop::collection::btree_set("[abg~]{1,4}", 1..24),
            probe in "[abg~]{0,3}",
        ) {
            let mut reg = CommandRegistry::new();
            for b in &bindings {
                reg.add(Named { keys: seq(b), name: "p" }).unwrap();
            }
            let probe = seq(&probe);
            let scanned: Vec<KeySequence> =
                reg.prefix_matches(&probe).into_iter().map(|n| n.keys.clone()).collect();
            let mut brute: Vec<KeySequence> = bindings
                .iter()
                .map(|b| seq(b))
                .filter(|b| probe.is_prefix_of(b))
                .collect();
            brute.sort();
            prop_assert_eq!(scanned, brute);
        }
    }
}
