//! core-actions: incremental command resolution for modal key input.
//!
//! Keys arrive one at a time through [`Dispatcher::feed`]. The dispatcher
//! accumulates an optional repeat count and register selection, grows the
//! typed key sequence until it names exactly one registered [`Command`], and
//! then either runs that command or hands subsequent keys to the command's
//! continuation (a motion capture or an open-ended input capture).
//!
//! What a command *does* is outside this crate: handlers are supplied already
//! bound to their editing logic, and the buffer selection, register storage,
//! motion resolution and status display are reached through the traits in
//! [`collab`] and [`capture`].

pub mod capture;
pub mod collab;
pub mod command;
pub mod dispatcher;
pub mod phase;
pub mod register;
mod resolver;
pub mod settings;
pub mod span;

pub use capture::{
    CaptureStep, InputCapture, KeyRemapMode, MotionCapture, MotionResolver, MotionStatus,
    ResolvedMotion,
};
pub use collab::{Collaborators, LogStatus, NoMotions, NoSelection, SelectionSource, StatusSink};
pub use command::{
    Command, CommandContext, CommandKind, CommandResult, Executed, Mode, ModeTransition, Repeat,
};
pub use dispatcher::{CommandObserver, CommandRecord, Dispatcher, FeedResult, ObserverId};
pub use phase::Phase;
pub use register::{RegisterName, RegisterStore, VimRegisters};
pub use settings::DispatcherSettings;
pub use span::{Position, SelectionReport, TextRange, VisualKind, VisualSpan};

pub use core_events::{KeyCode, KeyEvent, KeyModifiers};
pub use core_keymap::{KeySequence, RegistryError};
