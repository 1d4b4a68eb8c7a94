//! Top-level key entry point.
//!
//! [`Dispatcher::feed`] first honours the cancel key, then wraps the key
//! delivery in a run session. Any other key fed from inside a handler is
//! rejected with [`FeedResult::NestedRunDetected`]. The session is taken out
//! of the dispatcher for the duration of the step and only put back when more
//! input is needed, and observers run once the run flag has been cleared. The
//! run flag is cleared by a drop guard, so a panicking handler cannot leave
//! the dispatcher wedged.
//!
//! All methods take `&self`: handlers typically hold an `Rc<Dispatcher>` and
//! may call back into it (queries, registry edits between runs, a nested
//! cancel, or a nested `feed` that is then rejected).

use crate::capture::KeyRemapMode;
use crate::collab::Collaborators;
use crate::command::{Command, CommandResult, Repeat};
use crate::phase::Phase;
use crate::resolver::{self, Env, Outcome, Session};
use crate::settings::DispatcherSettings;
use core_events::KeyEvent;
use core_keymap::{CommandRegistry, KeySequence, RegistryError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

mod observer;
mod record;

pub use observer::{CommandObserver, ObserverId};
pub use record::{CommandRecord, FeedResult};

/// Clears the run flag on every exit path.
struct RunGuard<'a>(&'a Cell<bool>);

impl<'a> RunGuard<'a> {
    /// `None` when a run is already in progress.
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct Dispatcher {
    registry: RefCell<CommandRegistry<Command>>,
    collab: Collaborators,
    settings: DispatcherSettings,
    session: RefCell<Session>,
    running: Cell<bool>,
    observers: RefCell<Vec<(ObserverId, Rc<dyn CommandObserver>)>>,
    next_observer: Cell<u64>,
    last_repeat: RefCell<Option<Repeat>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatcherSettings::default(), Collaborators::default())
    }
}

impl Dispatcher {
    pub fn new(settings: DispatcherSettings, collab: Collaborators) -> Self {
        Self {
            registry: RefCell::new(CommandRegistry::new()),
            collab,
            settings,
            session: RefCell::new(Session::default()),
            running: Cell::new(false),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
            last_repeat: RefCell::new(None),
        }
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collab
    }

    // --- registry -------------------------------------------------------

    pub fn add(&self, command: Command) -> Result<(), RegistryError> {
        self.registry.borrow_mut().add(command)
    }

    /// Unbind `keys`; unknown sequences are ignored.
    pub fn remove(&self, keys: &KeySequence) -> Option<Command> {
        self.registry.borrow_mut().remove(keys)
    }

    pub fn contains(&self, keys: &KeySequence) -> bool {
        self.registry.borrow().contains(keys)
    }

    /// Registered commands in binding order.
    pub fn commands(&self) -> Vec<Command> {
        self.registry.borrow().iter().cloned().collect()
    }

    // --- session queries ------------------------------------------------

    /// Discard any partially typed input. A run in progress keeps its own
    /// session and is unaffected.
    pub fn reset_state(&self) {
        *self.session.borrow_mut() = Session::default();
    }

    pub fn is_waiting_for_more_input(&self) -> bool {
        self.session.borrow().phase.needs_more_input()
    }

    pub fn current_phase(&self) -> Phase {
        self.session.borrow().phase.clone()
    }

    /// Remap table for the next raw key; only set inside a continuation.
    pub fn active_key_remap_mode(&self) -> Option<KeyRemapMode> {
        self.session.borrow().phase.remap_mode()
    }

    /// Keys of the attempt in progress, oldest first.
    pub fn pending_keys(&self) -> Vec<KeyEvent> {
        self.session.borrow().keys()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    // --- observers and repeat ------------------------------------------

    pub fn subscribe(&self, observer: impl CommandObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(other, _)| *other != id);
        observers.len() != before
    }

    /// Replay descriptor of the most recent completed repeatable command.
    pub fn last_repeat(&self) -> Option<Repeat> {
        self.last_repeat.borrow().clone()
    }

    /// Replay the most recent repeatable command, `count` replacing the
    /// captured count. `None` when nothing is repeatable or a run is in
    /// progress.
    pub fn repeat_last(&self, count: Option<u32>) -> Option<CommandResult> {
        let repeat = self.last_repeat()?;
        let Some(_guard) = RunGuard::enter(&self.running) else {
            warn!(target: "input.dispatch", "nested_repeat_detected");
            return None;
        };
        debug!(target: "input.dispatch", ?count, "repeat_last");
        Some(repeat.replay(count))
    }

    // --- feeding --------------------------------------------------------

    pub fn feed(&self, key: KeyEvent) -> FeedResult {
        // A run in progress owns its session; a nested cancel only clears the
        // stored idle one.
        if key == self.settings.cancel_key && self.session.borrow().phase.cancel_aborts() {
            self.reset_state();
            debug!(target: "input.dispatch", nested = self.is_running(), "cancelled_by_key");
            return FeedResult::CommandCancelled;
        }

        let Some(guard) = RunGuard::enter(&self.running) else {
            warn!(target: "input.dispatch", key = %key, "nested_run_detected");
            return FeedResult::NestedRunDetected;
        };

        let mut session = self.session.take();
        session.record_key(key, self.settings.history_limit);
        let env = Env {
            registry: &self.registry,
            collab: &self.collab,
            settings: &self.settings,
        };
        let outcome = resolver::step(&env, session, key);
        drop(guard);

        let result = match outcome {
            Outcome::NeedMore(session) => {
                *self.session.borrow_mut() = session;
                FeedResult::NeedMoreInput
            }
            Outcome::Cancelled => FeedResult::CommandCancelled,
            Outcome::NoMatch => FeedResult::NoMatchingCommand,
            Outcome::Ran { record, result } => self.finish(record, result),
        };
        debug!(target: "input.dispatch", key = %key, outcome = result.label(), "fed");
        result
    }

    /// Feed every key in order, collecting each result.
    pub fn feed_all(&self, keys: impl IntoIterator<Item = KeyEvent>) -> Vec<FeedResult> {
        keys.into_iter().map(|key| self.feed(key)).collect()
    }

    fn finish(&self, record: CommandRecord, result: CommandResult) -> FeedResult {
        if let (CommandResult::Completed(_), Some(repeat)) = (&result, &record.repeat) {
            *self.last_repeat.borrow_mut() = Some(repeat.clone());
        }
        debug!(
            target: "input.dispatch",
            command = record.command.name(),
            count = ?record.count,
            register = %record.register,
            "command_ran"
        );

        let observers: Vec<Rc<dyn CommandObserver>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer.on_command(&record, &result);
        }

        match result {
            CommandResult::Completed(transition) => FeedResult::CommandRan { record, transition },
            CommandResult::Errored(message) => FeedResult::CommandErrored { record, message },
        }
    }
}
