//! Notifications the manager reacts to.

use taskfilter_core::TaskNumber;

/// A change to a task field that built-in predicates or queries may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    /// Completion percentage changed.
    ProgressChanged(TaskNumber),
    /// Start or end date changed.
    ScheduleChanged(TaskNumber),
}

impl TaskEvent {
    /// Task the event is about.
    #[must_use]
    pub const fn task(&self) -> TaskNumber {
        match *self {
            Self::ProgressChanged(number) | Self::ScheduleChanged(number) => number,
        }
    }
}

/// Undo manager notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoEvent {
    /// A new undoable edit was recorded.
    EditHappened {
        /// Presentation name of the edit.
        name: String,
    },
    /// An undo or redo finished.
    UndoOrRedo,
    /// The undo history was discarded.
    Reset,
}
