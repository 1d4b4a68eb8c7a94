#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::{
    Collaborators, Command, CommandRecord, CommandResult, Dispatcher, DispatcherSettings,
    FeedResult, KeyEvent, KeyRemapMode, KeySequence, MotionCapture, MotionResolver, MotionStatus,
    Position, ResolvedMotion, SelectionReport, SelectionSource, StatusSink, TextRange, VisualKind,
};
use core_events::parse_keys;
use std::cell::RefCell;
use std::rc::Rc;

pub fn keys(notation: &str) -> Vec<KeyEvent> {
    parse_keys(notation).expect("valid key notation")
}

pub fn key(notation: &str) -> KeyEvent {
    let parsed = keys(notation);
    assert_eq!(parsed.len(), 1, "expected a single key in {notation:?}");
    parsed[0]
}

pub fn seq(notation: &str) -> KeySequence {
    KeySequence::parse(notation).expect("valid key notation")
}

pub fn range(a: (usize, usize), b: (usize, usize)) -> TextRange {
    TextRange::new(Position::new(a.0, a.1), Position::new(b.0, b.1))
}

/// Motion resolver with a fixed vocabulary:
/// `w` (count * 5 columns), `j` (count lines, linewise), digits (motion
/// count), `i`/`a` + `w` (text object), cancel on `<Esc>`, error otherwise.
#[derive(Default)]
pub struct ScriptedMotions {
    /// Count passed to every `begin`.
    pub begun: RefCell<Vec<Option<u32>>>,
    /// Every key the captures were fed.
    pub seen: Rc<RefCell<Vec<KeyEvent>>>,
}

impl MotionResolver for ScriptedMotions {
    fn begin(&self, count: Option<u32>) -> Box<dyn MotionCapture> {
        self.begun.borrow_mut().push(count);
        motion_capture(count.unwrap_or(1), self.seen.clone())
    }
}

fn motion_capture(count: u32, seen: Rc<RefCell<Vec<KeyEvent>>>) -> Box<dyn MotionCapture> {
    Box::new(move |key: &KeyEvent| {
        seen.borrow_mut().push(*key);
        let count = count as usize;
        match key.printable() {
            Some('w') => MotionStatus::Complete(ResolvedMotion::charwise(range(
                (0, 0),
                (0, count * 5),
            ))),
            Some('j') => MotionStatus::Complete(ResolvedMotion::linewise(range((0, 0), (count, 0)))),
            Some(digit @ '1'..='9') => {
                let inner = digit.to_digit(10).unwrap_or(1);
                MotionStatus::NeedMoreInput {
                    next: motion_capture(count as u32 * inner, seen.clone()),
                    remap: Some(KeyRemapMode::OperatorPending),
                }
            }
            Some('i') | Some('a') => {
                let seen = seen.clone();
                MotionStatus::need_more(
                    move |key: &KeyEvent| {
                        seen.borrow_mut().push(*key);
                        match key.printable() {
                            Some('w') => {
                                MotionStatus::Complete(ResolvedMotion::charwise(range((0, 2), (0, 6))))
                            }
                            _ => MotionStatus::Error(format!("unknown text object {key}")),
                        }
                    },
                    Some(KeyRemapMode::OperatorPending),
                )
            }
            _ if *key == KeyEvent::esc() => MotionStatus::Cancelled,
            _ => MotionStatus::Error(format!("unknown motion {key}")),
        }
    })
}

/// Selection collaborator whose report the test sets directly.
#[derive(Default)]
pub struct Selection(RefCell<Option<SelectionReport>>);

impl Selection {
    pub fn set(&self, kind: VisualKind, ranges: Vec<TextRange>) {
        *self.0.borrow_mut() = Some(SelectionReport::new(kind, ranges));
    }

    pub fn set_raw(&self, report: SelectionReport) {
        *self.0.borrow_mut() = Some(report);
    }

    pub fn clear(&self) {
        *self.0.borrow_mut() = None;
    }
}

impl SelectionSource for Selection {
    fn current_selection(&self) -> Option<SelectionReport> {
        self.0.borrow().clone()
    }
}

#[derive(Default)]
pub struct RecordingStatus(pub RefCell<Vec<String>>);

impl StatusSink for RecordingStatus {
    fn report_error(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

pub struct Harness {
    pub dispatcher: Rc<Dispatcher>,
    pub motions: Rc<ScriptedMotions>,
    pub selection: Rc<Selection>,
    pub status: Rc<RecordingStatus>,
    /// One line per handler invocation: `name count=.. reg=..`.
    pub log: Rc<RefCell<Vec<String>>>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::with_settings(DispatcherSettings::default())
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: DispatcherSettings) -> Self {
        let motions = Rc::new(ScriptedMotions::default());
        let selection = Rc::new(Selection::default());
        let status = Rc::new(RecordingStatus::default());
        let collab = Collaborators::default()
            .with_motions(motions.clone())
            .with_selection(selection.clone())
            .with_status(status.clone());
        Self {
            dispatcher: Rc::new(Dispatcher::new(settings, collab)),
            motions,
            selection,
            status,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn add(&self, command: Command) {
        self.dispatcher.add(command).expect("unique binding");
    }

    /// Register a simple command named after its binding.
    pub fn simple(&self, binding: &str) {
        let log = self.log.clone();
        let name = binding.to_string();
        self.add(Command::simple(seq(binding), binding, move |count, register| {
            log.borrow_mut()
                .push(format!("{name} count={count:?} reg={}", register.as_char()));
            CommandResult::done()
        }));
    }

    /// Register a motion command named after its binding.
    pub fn motion(&self, binding: &str) {
        self.add(self.motion_command(binding));
    }

    pub fn motion_command(&self, binding: &str) -> Command {
        let log = self.log.clone();
        let name = binding.to_string();
        Command::motion(seq(binding), binding, move |count, register, motion| {
            log.borrow_mut().push(format!(
                "{name} count={count:?} reg={} end={:?}",
                register.as_char(),
                motion.range.end
            ));
            CommandResult::done()
        })
    }

    pub fn feed(&self, notation: &str) -> Vec<FeedResult> {
        self.dispatcher.feed_all(keys(notation))
    }

    /// Feed every key, returning the result of the last one.
    pub fn feed_last(&self, notation: &str) -> FeedResult {
        self.feed(notation)
            .pop()
            .expect("at least one key in notation")
    }

    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

/// Record of a `CommandRan` result; panics on anything else.
pub fn ran(result: &FeedResult) -> &CommandRecord {
    match result {
        FeedResult::CommandRan { record, .. } => record,
        other => panic!("expected CommandRan, got {other:?}"),
    }
}

pub fn is_need_more(result: &FeedResult) -> bool {
    matches!(result, FeedResult::NeedMoreInput)
}
