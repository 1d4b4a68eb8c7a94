//! Continuations that consume keys after a command name has been matched.
//!
//! Motion commands hand keys to a [`MotionCapture`] obtained from the motion
//! collaborator; open-ended commands hand keys to their own [`InputCapture`].
//! Both are consumed by value on every key and either finish or return the
//! capture that should see the next key, so "what to do next" is always data
//! owned by the dispatcher's session.
//!
//! Plain closures implement both traits, which keeps one-shot captures (find
//! a character, pick a text object) short to write.

use crate::command::CommandResult;
use crate::span::{TextRange, VisualSpan};
use core_events::KeyEvent;
use std::fmt;

/// Remapping table the host should consult before delivering raw keys while
/// a continuation is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRemapMode {
    OperatorPending,
    Insert,
    CommandLine,
    /// Literal character arguments (`f`, `r`): language mappings only.
    Language,
}

/// Concrete buffer range a motion resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMotion {
    pub range: TextRange,
    pub linewise: bool,
    pub inclusive: bool,
}

impl ResolvedMotion {
    pub fn charwise(range: TextRange) -> Self {
        Self {
            range,
            linewise: false,
            inclusive: false,
        }
    }

    pub fn linewise(range: TextRange) -> Self {
        Self {
            range,
            linewise: true,
            inclusive: false,
        }
    }
}

pub enum MotionStatus {
    Complete(ResolvedMotion),
    NeedMoreInput {
        next: Box<dyn MotionCapture>,
        remap: Option<KeyRemapMode>,
    },
    Error(String),
    Cancelled,
}

impl MotionStatus {
    pub fn need_more(next: impl MotionCapture + 'static, remap: Option<KeyRemapMode>) -> Self {
        MotionStatus::NeedMoreInput {
            next: Box::new(next),
            remap,
        }
    }
}

impl fmt::Debug for MotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionStatus::Complete(m) => f.debug_tuple("Complete").field(m).finish(),
            MotionStatus::NeedMoreInput { remap, .. } => f
                .debug_struct("NeedMoreInput")
                .field("remap", remap)
                .finish_non_exhaustive(),
            MotionStatus::Error(msg) => f.debug_tuple("Error").field(msg).finish(),
            MotionStatus::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// One step of motion parsing.
pub trait MotionCapture {
    fn feed(self: Box<Self>, key: &KeyEvent) -> MotionStatus;
}

impl<F> MotionCapture for F
where
    F: FnOnce(&KeyEvent) -> MotionStatus,
{
    fn feed(self: Box<Self>, key: &KeyEvent) -> MotionStatus {
        (*self)(key)
    }
}

/// Motion-resolution collaborator.
pub trait MotionResolver {
    /// Start capturing a motion; the capture receives the key after the
    /// command name. `count` is the count typed before the command.
    fn begin(&self, count: Option<u32>) -> Box<dyn MotionCapture>;
}

pub enum CaptureStep {
    Finished(CommandResult),
    NeedMoreInput {
        next: Box<dyn InputCapture>,
        remap: Option<KeyRemapMode>,
    },
    Cancelled,
}

impl CaptureStep {
    pub fn need_more(next: impl InputCapture + 'static, remap: Option<KeyRemapMode>) -> Self {
        CaptureStep::NeedMoreInput {
            next: Box::new(next),
            remap,
        }
    }
}

impl fmt::Debug for CaptureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStep::Finished(r) => f.debug_tuple("Finished").field(r).finish(),
            CaptureStep::NeedMoreInput { remap, .. } => f
                .debug_struct("NeedMoreInput")
                .field("remap", remap)
                .finish_non_exhaustive(),
            CaptureStep::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// One step of an open-ended command's own key parsing. `span` is the visual
/// span captured when the command started (visual variants only).
pub trait InputCapture {
    fn feed(self: Box<Self>, key: &KeyEvent, span: Option<&VisualSpan>) -> CaptureStep;
}

impl<F> InputCapture for F
where
    F: FnOnce(&KeyEvent, Option<&VisualSpan>) -> CaptureStep,
{
    fn feed(self: Box<Self>, key: &KeyEvent, span: Option<&VisualSpan>) -> CaptureStep {
        (*self)(key, span)
    }
}
