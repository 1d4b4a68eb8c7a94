use crate::capture::ResolvedMotion;
use crate::command::{Command, ModeTransition, Repeat};
use crate::register::RegisterName;
use crate::span::VisualSpan;
use core_events::KeyEvent;

/// What a successful resolution ran, with every decoration it resolved.
///
/// Detached from the dispatcher: observers and callers may keep it.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub command: Command,
    pub count: Option<u32>,
    pub register: RegisterName,
    pub motion: Option<ResolvedMotion>,
    pub span: Option<VisualSpan>,
    pub repeat: Option<Repeat>,
    /// Keys that produced the command, oldest first. Only the newest
    /// `history_limit` keys are kept, so long inputs are truncated at the front.
    pub keys: Vec<KeyEvent>,
}

/// Caller-facing outcome of one [`feed`](super::Dispatcher::feed).
#[derive(Debug, Clone)]
pub enum FeedResult {
    NeedMoreInput,
    CommandCancelled,
    NoMatchingCommand,
    NestedRunDetected,
    CommandRan {
        record: CommandRecord,
        transition: ModeTransition,
    },
    CommandErrored {
        record: CommandRecord,
        message: String,
    },
}

impl FeedResult {
    pub fn record(&self) -> Option<&CommandRecord> {
        match self {
            FeedResult::CommandRan { record, .. } | FeedResult::CommandErrored { record, .. } => {
                Some(record)
            }
            _ => None,
        }
    }

    /// `true` when the resolution attempt ended (session was reset).
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            FeedResult::NeedMoreInput | FeedResult::NestedRunDetected
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedResult::NeedMoreInput => "need_more_input",
            FeedResult::CommandCancelled => "cancelled",
            FeedResult::NoMatchingCommand => "no_match",
            FeedResult::NestedRunDetected => "nested_run",
            FeedResult::CommandRan { .. } => "ran",
            FeedResult::CommandErrored { .. } => "errored",
        }
    }
}
