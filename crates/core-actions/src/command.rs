//! Command shapes.
//!
//! A [`Command`] couples a key binding with one of six handler shapes
//! ([`CommandKind`]). Handlers are reference counted so commands clone
//! cheaply into the dispatcher's phase and into execution records.

use crate::capture::{InputCapture, KeyRemapMode, ResolvedMotion};
use crate::register::RegisterName;
use crate::span::{VisualKind, VisualSpan};
use core_keymap::{Binding, KeySequence};
use std::fmt;
use std::rc::Rc;

pub type SimpleHandler = Rc<dyn Fn(Option<u32>, RegisterName) -> CommandResult>;
pub type MotionHandler = Rc<dyn Fn(Option<u32>, RegisterName, &ResolvedMotion) -> CommandResult>;
pub type ContextHandler = Rc<dyn Fn(&CommandContext) -> Executed>;
pub type VisualHandler = Rc<dyn Fn(&CommandContext, &VisualSpan) -> Executed>;
pub type CaptureStart = Rc<dyn Fn(&CommandContext) -> Box<dyn InputCapture>>;
pub type VisualCaptureStart = Rc<dyn Fn(&CommandContext, &VisualSpan) -> Box<dyn InputCapture>>;

/// How a binding is fulfilled once its keys have been typed.
#[derive(Clone)]
pub enum CommandKind {
    /// Runs immediately with count and register.
    Simple(SimpleHandler),
    /// Needs a following motion, resolved by the motion collaborator.
    Motion(MotionHandler),
    /// Runs with a structured context and yields a replayable descriptor.
    Extended(ContextHandler),
    /// Like `Extended`, plus the active visual span.
    Visual(VisualHandler),
    /// Consumes an open-ended run of further keys through its own capture.
    OpenEnded(CaptureStart),
    /// Like `OpenEnded`, with the visual span captured once at start.
    OpenEndedVisual(VisualCaptureStart),
}

impl CommandKind {
    pub fn label(&self) -> &'static str {
        match self {
            CommandKind::Simple(_) => "simple",
            CommandKind::Motion(_) => "motion",
            CommandKind::Extended(_) => "extended",
            CommandKind::Visual(_) => "visual",
            CommandKind::OpenEnded(_) => "open_ended",
            CommandKind::OpenEndedVisual(_) => "open_ended_visual",
        }
    }
}

/// A registered binding plus its execution behavior.
#[derive(Clone)]
pub struct Command {
    binding: KeySequence,
    name: String,
    handles_cancel: bool,
    remap: Option<KeyRemapMode>,
    kind: CommandKind,
}

impl Command {
    fn with_kind(binding: KeySequence, name: impl Into<String>, kind: CommandKind) -> Self {
        let remap = match kind {
            CommandKind::Motion(_) => Some(KeyRemapMode::OperatorPending),
            _ => None,
        };
        Self {
            binding,
            name: name.into(),
            handles_cancel: false,
            remap,
            kind,
        }
    }

    pub fn simple(
        binding: KeySequence,
        name: impl Into<String>,
        handler: impl Fn(Option<u32>, RegisterName) -> CommandResult + 'static,
    ) -> Self {
        Self::with_kind(binding, name, CommandKind::Simple(Rc::new(handler)))
    }

    pub fn motion(
        binding: KeySequence,
        name: impl Into<String>,
        handler: impl Fn(Option<u32>, RegisterName, &ResolvedMotion) -> CommandResult + 'static,
    ) -> Self {
        Self::with_kind(binding, name, CommandKind::Motion(Rc::new(handler)))
    }

    pub fn extended(
        binding: KeySequence,
        name: impl Into<String>,
        handler: impl Fn(&CommandContext) -> Executed + 'static,
    ) -> Self {
        Self::with_kind(binding, name, CommandKind::Extended(Rc::new(handler)))
    }

    pub fn visual(
        binding: KeySequence,
        name: impl Into<String>,
        handler: impl Fn(&CommandContext, &VisualSpan) -> Executed + 'static,
    ) -> Self {
        Self::with_kind(binding, name, CommandKind::Visual(Rc::new(handler)))
    }

    pub fn open_ended(
        binding: KeySequence,
        name: impl Into<String>,
        start: impl Fn(&CommandContext) -> Box<dyn InputCapture> + 'static,
    ) -> Self {
        Self::with_kind(binding, name, CommandKind::OpenEnded(Rc::new(start)))
    }

    pub fn open_ended_visual(
        binding: KeySequence,
        name: impl Into<String>,
        start: impl Fn(&CommandContext, &VisualSpan) -> Box<dyn InputCapture> + 'static,
    ) -> Self {
        Self::with_kind(binding, name, CommandKind::OpenEndedVisual(Rc::new(start)))
    }

    /// The command consumes the cancel key itself while its continuation runs.
    pub fn handling_cancel(mut self) -> Self {
        self.handles_cancel = true;
        self
    }

    /// Remap table to report while the continuation waits for its first key.
    pub fn with_remap(mut self, remap: KeyRemapMode) -> Self {
        self.remap = Some(remap);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handles_cancel(&self) -> bool {
        self.handles_cancel
    }

    pub fn initial_remap(&self) -> Option<KeyRemapMode> {
        self.remap
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn is_motion(&self) -> bool {
        matches!(self.kind, CommandKind::Motion(_))
    }
}

impl Binding for Command {
    fn binding(&self) -> &KeySequence {
        &self.binding
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("binding", &self.binding.to_string())
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("handles_cancel", &self.handles_cancel)
            .finish()
    }
}

/// Commands are identified by their binding; handlers are not compared.
impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.binding == other.binding
            && self.name == other.name
            && self.kind.label() == other.kind.label()
            && self.handles_cancel == other.handles_cancel
    }
}

/// Decorations resolved before a context-taking handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandContext {
    pub count: Option<u32>,
    pub register: RegisterName,
}

impl CommandContext {
    pub fn count_or(&self, default: u32) -> u32 {
        self.count.unwrap_or(default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Normal,
    Insert,
    Replace,
    Visual(VisualKind),
    CommandLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModeTransition {
    #[default]
    Stay,
    Enter(Mode),
}

/// What a handler reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Completed(ModeTransition),
    Errored(String),
}

impl CommandResult {
    pub fn done() -> Self {
        CommandResult::Completed(ModeTransition::Stay)
    }

    pub fn enter(mode: Mode) -> Self {
        CommandResult::Completed(ModeTransition::Enter(mode))
    }

    pub fn error(message: impl Into<String>) -> Self {
        CommandResult::Errored(message.into())
    }
}

/// Replayable form of a completed command (dot-repeat).
#[derive(Clone)]
pub struct Repeat {
    context: CommandContext,
    replay: Rc<dyn Fn(&CommandContext) -> CommandResult>,
}

impl Repeat {
    pub fn new(
        context: CommandContext,
        replay: impl Fn(&CommandContext) -> CommandResult + 'static,
    ) -> Self {
        Self {
            context,
            replay: Rc::new(replay),
        }
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Run again with the captured context. A supplied count replaces the
    /// captured one; the register is always the captured one.
    pub fn replay(&self, count: Option<u32>) -> CommandResult {
        let mut context = self.context;
        if count.is_some() {
            context.count = count;
        }
        (self.replay)(&context)
    }
}

impl fmt::Debug for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repeat")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Result of an `Extended` or `Visual` handler.
#[derive(Debug, Clone)]
pub struct Executed {
    pub result: CommandResult,
    pub repeat: Repeat,
}

impl Executed {
    pub fn new(result: CommandResult, repeat: Repeat) -> Self {
        Self { result, repeat }
    }
}
