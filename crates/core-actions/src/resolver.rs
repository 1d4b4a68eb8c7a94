//! Resolver state machine.
//!
//! A [`Session`] is the entire state of one resolution attempt: the
//! decorations typed so far, the raw keys, the exposed [`Phase`] and the
//! [`Step`] that interprets the next key. [`step`] consumes the session by
//! value and returns either the successor session or a terminal outcome, so
//! no partially updated session is ever observable.
//!
//! Layering of the steps:
//!
//! ```text
//! CountAndRegister ─┬─ register prefix ─> Register ──┐
//!        ^          ├─ 1-9 ─────────────> Count ─────┤ (terminating key is
//!        └──────────┼────────────────────────────────┘  reinterpreted)
//!                   └─ anything else ───> Command ─┬─> run
//!                                                   ├─> Motion    (motion capture)
//!                                                   └─> LongInput (command's own capture)
//! ```

use crate::capture::{CaptureStep, InputCapture, MotionCapture, MotionStatus};
use crate::collab::Collaborators;
use crate::command::{Command, CommandContext, CommandKind, CommandResult, MotionHandler};
use crate::dispatcher::CommandRecord;
use crate::phase::Phase;
use crate::register::RegisterName;
use crate::settings::DispatcherSettings;
use crate::span::VisualSpan;
use core_events::KeyEvent;
use core_keymap::{Binding, CommandRegistry, KeySequence};
use std::cell::RefCell;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

#[derive(Default)]
pub(crate) struct Session {
    pub(crate) register: RegisterName,
    pub(crate) count: Option<u32>,
    pub(crate) sequence: KeySequence,
    /// Raw keys, newest first.
    pub(crate) history: VecDeque<KeyEvent>,
    pub(crate) phase: Phase,
    step: Step,
}

#[derive(Default)]
enum Step {
    #[default]
    CountAndRegister,
    Count {
        run: u32,
    },
    Register,
    Command,
    Motion {
        command: Command,
        handler: MotionHandler,
        capture: Box<dyn MotionCapture>,
    },
    LongInput {
        command: Command,
        capture: Box<dyn InputCapture>,
        span: Option<VisualSpan>,
    },
}

impl Step {
    fn label(&self) -> &'static str {
        match self {
            Step::CountAndRegister => "count_and_register",
            Step::Count { .. } => "count",
            Step::Register => "register",
            Step::Command => "command",
            Step::Motion { .. } => "motion",
            Step::LongInput { .. } => "long_input",
        }
    }
}

impl Session {
    pub(crate) fn record_key(&mut self, key: KeyEvent, limit: usize) {
        self.history.push_front(key);
        self.history.truncate(limit);
    }

    /// Keys of this attempt, oldest first.
    pub(crate) fn keys(&self) -> Vec<KeyEvent> {
        self.history.iter().rev().copied().collect()
    }

    fn context(&self) -> CommandContext {
        CommandContext {
            count: self.count,
            register: self.register,
        }
    }

    fn record(&self, command: Command) -> CommandRecord {
        CommandRecord {
            command,
            count: self.count,
            register: self.register,
            motion: None,
            span: None,
            repeat: None,
            keys: self.keys(),
        }
    }

    fn need_more(mut self, phase: Phase, step: Step) -> Outcome {
        trace!(target: "input.resolve", step = step.label(), phase = phase.label(), "need_more");
        self.phase = phase;
        self.step = step;
        Outcome::NeedMore(self)
    }
}

pub(crate) enum Outcome {
    NeedMore(Session),
    Cancelled,
    NoMatch,
    Ran {
        record: CommandRecord,
        result: CommandResult,
    },
}

/// Borrowed dispatcher context for one step. The registry is only borrowed
/// for lookups, never across a handler call.
pub(crate) struct Env<'a> {
    pub(crate) registry: &'a RefCell<CommandRegistry<Command>>,
    pub(crate) collab: &'a Collaborators,
    pub(crate) settings: &'a DispatcherSettings,
}

/// Interpret `key` with the session's current step.
pub(crate) fn step(env: &Env<'_>, mut session: Session, key: KeyEvent) -> Outcome {
    match std::mem::take(&mut session.step) {
        Step::CountAndRegister => check_count_and_register(env, session, key),
        Step::Count { run } => wait_for_count(env, session, run, key),
        Step::Register => wait_for_register(env, session, key),
        Step::Command => wait_for_command(env, session, key),
        Step::Motion {
            command,
            handler,
            capture,
        } => wait_for_motion(env, session, command, handler, capture, key),
        Step::LongInput {
            command,
            capture,
            span,
        } => wait_for_long_input(session, command, capture, span, key),
    }
}

fn check_count_and_register(env: &Env<'_>, session: Session, key: KeyEvent) -> Outcome {
    if key == env.settings.register_prefix {
        return session.need_more(Phase::NotEnoughInput, Step::Register);
    }
    match key.digit() {
        Some(digit) if digit != 0 => session.need_more(
            Phase::NotEnoughInput,
            Step::Count {
                run: digit.min(env.settings.max_count),
            },
        ),
        _ => wait_for_command(env, session, key),
    }
}

fn wait_for_count(env: &Env<'_>, mut session: Session, run: u32, key: KeyEvent) -> Outcome {
    let max = env.settings.max_count;
    if let Some(digit) = key.digit() {
        let run = run.saturating_mul(10).saturating_add(digit).min(max);
        return session.need_more(Phase::NotEnoughInput, Step::Count { run });
    }
    // A second count (`2"a3x`) multiplies the first.
    let count = session
        .count
        .map_or(run, |prev| prev.saturating_mul(run))
        .min(max);
    debug!(target: "input.resolve", count, "count_set");
    session.count = Some(count);
    check_count_and_register(env, session, key)
}

fn wait_for_register(env: &Env<'_>, mut session: Session, key: KeyEvent) -> Outcome {
    let Some(register) = key
        .printable()
        .and_then(|name| env.collab.registers.resolve(name))
    else {
        debug!(target: "input.resolve", key = %key, "invalid_register");
        return Outcome::NoMatch;
    };
    debug!(target: "input.resolve", register = %register, "register_set");
    session.register = register;
    session.need_more(Phase::NotEnoughInput, Step::CountAndRegister)
}

fn wait_for_command(env: &Env<'_>, mut session: Session, key: KeyEvent) -> Outcome {
    session.sequence.push(key);
    session.phase = Phase::NotEnoughInput;

    let exact = env.registry.borrow().get(&session.sequence).cloned();
    if let Some(command) = exact {
        return dispatch(env, session, command);
    }

    let ambiguous = !env
        .registry
        .borrow()
        .prefix_matches(&session.sequence)
        .is_empty();
    if ambiguous {
        return session.need_more(Phase::NotEnoughInput, Step::Command);
    }

    // One key of lookback: a motion command whose name prefixed a longer
    // binding takes this key as the start of its motion.
    let fallback = session.sequence.parent().and_then(|parent| {
        let registry = env.registry.borrow();
        let command = registry.get(&parent)?;
        match command.kind() {
            CommandKind::Motion(handler) => Some((command.clone(), handler.clone())),
            _ => None,
        }
    });
    let Some((command, handler)) = fallback else {
        debug!(target: "input.resolve", keys = %session.sequence, "no_match");
        return Outcome::NoMatch;
    };
    debug!(target: "input.resolve", command = command.name(), key = %key, "motion_fallback");
    session.sequence.pop();
    let capture = env.collab.motions.begin(session.count);
    session.phase = Phase::NotFinishedWithCommand {
        command: command.clone(),
        remap: command.initial_remap(),
    };
    wait_for_motion(env, session, command, handler, capture, key)
}

fn dispatch(env: &Env<'_>, session: Session, command: Command) -> Outcome {
    debug!(
        target: "input.resolve",
        command = command.name(),
        kind = command.kind().label(),
        "exact_match"
    );
    match command.kind().clone() {
        CommandKind::Simple(handler) => {
            let result = handler(session.count, session.register);
            Outcome::Ran {
                record: session.record(command),
                result,
            }
        }
        CommandKind::Extended(handler) => {
            let executed = handler(&session.context());
            let mut record = session.record(command);
            record.repeat = Some(executed.repeat);
            Outcome::Ran {
                record,
                result: executed.result,
            }
        }
        CommandKind::Visual(handler) => {
            let Some(span) = current_span(env, &command) else {
                return Outcome::NoMatch;
            };
            let executed = handler(&session.context(), &span);
            let mut record = session.record(command);
            record.span = Some(span);
            record.repeat = Some(executed.repeat);
            Outcome::Ran {
                record,
                result: executed.result,
            }
        }
        CommandKind::Motion(handler) => {
            let competitors: Vec<Command> = env
                .registry
                .borrow()
                .prefix_matches(&session.sequence)
                .into_iter()
                .filter(|other| other.binding() != command.binding())
                .cloned()
                .collect();
            if !competitors.is_empty() {
                debug!(
                    target: "input.resolve",
                    command = command.name(),
                    competitors = competitors.len(),
                    "motion_deferred"
                );
                let phase = Phase::NotEnoughMatchingPrefix {
                    pending: command,
                    competitors,
                };
                return session.need_more(phase, Step::Command);
            }
            let capture = env.collab.motions.begin(session.count);
            let phase = Phase::NotFinishedWithCommand {
                command: command.clone(),
                remap: command.initial_remap(),
            };
            session.need_more(
                phase,
                Step::Motion {
                    command,
                    handler,
                    capture,
                },
            )
        }
        CommandKind::OpenEnded(start) => {
            let capture = start(&session.context());
            start_long_input(session, command, capture, None)
        }
        CommandKind::OpenEndedVisual(start) => {
            let Some(span) = current_span(env, &command) else {
                return Outcome::NoMatch;
            };
            let capture = start(&session.context(), &span);
            start_long_input(session, command, capture, Some(span))
        }
    }
}

fn current_span(env: &Env<'_>, command: &Command) -> Option<VisualSpan> {
    let span = env
        .collab
        .selection
        .current_selection()
        .and_then(VisualSpan::from_report);
    if span.is_none() {
        debug!(target: "input.resolve", command = command.name(), "no_selection");
    }
    span
}

fn wait_for_motion(
    env: &Env<'_>,
    session: Session,
    command: Command,
    handler: MotionHandler,
    capture: Box<dyn MotionCapture>,
    key: KeyEvent,
) -> Outcome {
    match capture.feed(&key) {
        MotionStatus::Complete(motion) => {
            debug!(target: "input.resolve", command = command.name(), ?motion, "motion_complete");
            let result = handler(session.count, session.register, &motion);
            let mut record = session.record(command);
            record.motion = Some(motion);
            Outcome::Ran { record, result }
        }
        MotionStatus::NeedMoreInput { next, remap } => {
            let phase = Phase::NotFinishedWithCommand {
                command: command.clone(),
                remap,
            };
            session.need_more(
                phase,
                Step::Motion {
                    command,
                    handler,
                    capture: next,
                },
            )
        }
        MotionStatus::Error(message) => {
            warn!(target: "input.dispatch", command = command.name(), %message, "motion_failed");
            env.collab.status.report_error(&message);
            Outcome::Cancelled
        }
        MotionStatus::Cancelled => {
            debug!(target: "input.resolve", command = command.name(), "motion_cancelled");
            Outcome::Cancelled
        }
    }
}

fn start_long_input(
    session: Session,
    command: Command,
    capture: Box<dyn InputCapture>,
    span: Option<VisualSpan>,
) -> Outcome {
    let phase = Phase::NotFinishedWithCommand {
        command: command.clone(),
        remap: command.initial_remap(),
    };
    session.need_more(
        phase,
        Step::LongInput {
            command,
            capture,
            span,
        },
    )
}

fn wait_for_long_input(
    session: Session,
    command: Command,
    capture: Box<dyn InputCapture>,
    span: Option<VisualSpan>,
    key: KeyEvent,
) -> Outcome {
    match capture.feed(&key, span.as_ref()) {
        CaptureStep::Finished(result) => {
            let mut record = session.record(command);
            record.span = span;
            Outcome::Ran { record, result }
        }
        CaptureStep::NeedMoreInput { next, remap } => {
            let phase = Phase::NotFinishedWithCommand {
                command: command.clone(),
                remap,
            };
            session.need_more(
                phase,
                Step::LongInput {
                    command,
                    capture: next,
                    span,
                },
            )
        }
        CaptureStep::Cancelled => {
            debug!(target: "input.resolve", command = command.name(), "long_input_cancelled");
            Outcome::Cancelled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry(commands: Vec<Command>) -> RefCell<CommandRegistry<Command>> {
        let mut registry = CommandRegistry::new();
        for command in commands {
            registry.add(command).unwrap();
        }
        RefCell::new(registry)
    }

    fn run(env: &Env<'_>, keys: &str) -> Outcome {
        let mut session = Session::default();
        for key in core_events::parse_keys(keys).unwrap() {
            session.record_key(key, env.settings.history_limit);
            match step(env, session, key) {
                Outcome::NeedMore(next) => session = next,
                other => return other,
            }
        }
        Outcome::NeedMore(session)
    }

    fn simple(binding: &str) -> Command {
        Command::simple(KeySequence::parse(binding).unwrap(), binding, |_, _| {
            CommandResult::done()
        })
    }

    #[test]
    fn count_saturates_at_configured_limit() {
        let registry = registry(vec![simple("x")]);
        let collab = Collaborators::default();
        let settings = DispatcherSettings {
            max_count: 500,
            ..DispatcherSettings::default()
        };
        let env = Env {
            registry: &registry,
            collab: &collab,
            settings: &settings,
        };
        let Outcome::Ran { record, .. } = run(&env, "99999x") else {
            panic!("expected x to run");
        };
        assert_eq!(record.count, Some(500));

        let Outcome::Ran { record, .. } = run(&env, "30\"a30x") else {
            panic!("expected x to run");
        };
        assert_eq!(record.count, Some(500));
        assert_eq!(record.register, RegisterName::new('a'));
    }

    #[test]
    fn history_is_bounded_and_reported_oldest_first() {
        let registry = registry(vec![simple("x")]);
        let collab = Collaborators::default();
        let settings = DispatcherSettings {
            history_limit: 3,
            ..DispatcherSettings::default()
        };
        let env = Env {
            registry: &registry,
            collab: &collab,
            settings: &settings,
        };
        let Outcome::Ran { record, .. } = run(&env, "1234x") else {
            panic!("expected x to run");
        };
        assert_eq!(record.keys, core_events::parse_keys("34x").unwrap());
        assert_eq!(record.count, Some(1234));
    }

    #[test]
    fn zero_is_a_command_key_outside_a_count() {
        let registry = registry(vec![simple("0")]);
        let collab = Collaborators::default();
        let settings = DispatcherSettings::default();
        let env = Env {
            registry: &registry,
            collab: &collab,
            settings: &settings,
        };
        let Outcome::Ran { record, .. } = run(&env, "0") else {
            panic!("expected 0 to run");
        };
        assert_eq!(record.count, None);
        assert!(matches!(run(&env, "10x"), Outcome::NoMatch));
        assert!(matches!(run(&env, "10"), Outcome::NeedMore(_)));
    }
}
