use super::CommandRecord;
use crate::command::CommandResult;

/// Notified once per successful resolution, after the session was reset.
pub trait CommandObserver {
    fn on_command(&self, record: &CommandRecord, result: &CommandResult);
}

impl<F> CommandObserver for F
where
    F: Fn(&CommandRecord, &CommandResult),
{
    fn on_command(&self, record: &CommandRecord, result: &CommandResult) {
        self(record, result)
    }
}

/// Handle returned by [`subscribe`](super::Dispatcher::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(super) u64);
