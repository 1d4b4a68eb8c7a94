//! Externally visible position of the resolver.

use crate::capture::KeyRemapMode;
use crate::command::Command;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    /// Idle.
    #[default]
    NoInput,
    /// Mid count, register or command name; nothing matched yet.
    NotEnoughInput,
    /// A motion command matched exactly but longer bindings share its keys.
    NotEnoughMatchingPrefix {
        pending: Command,
        competitors: Vec<Command>,
    },
    /// Inside a motion or open-ended continuation.
    NotFinishedWithCommand {
        command: Command,
        remap: Option<KeyRemapMode>,
    },
}

impl Phase {
    pub fn needs_more_input(&self) -> bool {
        !matches!(self, Phase::NoInput)
    }

    /// Whether the cancel key aborts resolution. Only a running continuation
    /// whose command consumes cancel itself keeps the key.
    pub fn cancel_aborts(&self) -> bool {
        !matches!(self, Phase::NotFinishedWithCommand { command, .. } if command.handles_cancel())
    }

    pub fn remap_mode(&self) -> Option<KeyRemapMode> {
        match self {
            Phase::NotFinishedWithCommand { remap, .. } => *remap,
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::NoInput => "no_input",
            Phase::NotEnoughInput => "not_enough_input",
            Phase::NotEnoughMatchingPrefix { .. } => "not_enough_matching_prefix",
            Phase::NotFinishedWithCommand { .. } => "not_finished_with_command",
        }
    }
}
