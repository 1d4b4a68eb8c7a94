//! Collaborator seams.
//!
//! Everything the dispatcher consults but does not own: the buffer selection,
//! register storage, motion resolution and status display. Each is a trait
//! object behind an `Rc` so hosts can keep their own handle to the same
//! instance.

use crate::capture::{MotionCapture, MotionResolver, MotionStatus};
use crate::register::{RegisterStore, VimRegisters};
use crate::span::SelectionReport;
use core_events::KeyEvent;
use std::rc::Rc;
use tracing::warn;

/// Buffer-selection collaborator.
pub trait SelectionSource {
    /// Current selection, or `None` when no selection is active.
    fn current_selection(&self) -> Option<SelectionReport>;
}

/// Status / error display collaborator.
pub trait StatusSink {
    fn report_error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelection;

impl SelectionSource for NoSelection {
    fn current_selection(&self) -> Option<SelectionReport> {
        None
    }
}

/// Routes status errors into the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn report_error(&self, message: &str) {
        warn!(target: "input.dispatch", message, "status_error");
    }
}

/// Motion resolver for hosts without motions: every motion fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMotions;

impl MotionResolver for NoMotions {
    fn begin(&self, _count: Option<u32>) -> Box<dyn MotionCapture> {
        Box::new(|key: &KeyEvent| MotionStatus::Error(format!("no motion bound to {key}")))
    }
}

#[derive(Clone)]
pub struct Collaborators {
    pub selection: Rc<dyn SelectionSource>,
    pub registers: Rc<dyn RegisterStore>,
    pub motions: Rc<dyn MotionResolver>,
    pub status: Rc<dyn StatusSink>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            selection: Rc::new(NoSelection),
            registers: Rc::new(VimRegisters),
            motions: Rc::new(NoMotions),
            status: Rc::new(LogStatus),
        }
    }
}

impl Collaborators {
    pub fn with_selection(mut self, selection: Rc<dyn SelectionSource>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_registers(mut self, registers: Rc<dyn RegisterStore>) -> Self {
        self.registers = registers;
        self
    }

    pub fn with_motions(mut self, motions: Rc<dyn MotionResolver>) -> Self {
        self.motions = motions;
        self
    }

    pub fn with_status(mut self, status: Rc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }
}
