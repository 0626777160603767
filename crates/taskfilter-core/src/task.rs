use serde::{Deserialize, Serialize};
use time::Date;

use crate::id::TaskNumber;

/// Completion percentage that marks a task as finished.
pub const COMPLETE: u8 = 100;

/// The fields of a project task that filters look at.
///
/// `end` is the last working day of the task (inclusive). Missing dates mean the
/// task is never due and never in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Project-wide task number.
    pub number: TaskNumber,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Completion percentage, `0..=100`.
    #[serde(default)]
    pub completion: u8,
    /// First day of the task.
    #[serde(default)]
    pub start: Option<Date>,
    /// Last day of the task.
    #[serde(default)]
    pub end: Option<Date>,
}

impl Task {
    /// Create a task with no progress and no schedule.
    pub fn new(number: impl Into<TaskNumber>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            completion: 0,
            start: None,
            end: None,
        }
    }

    /// Set the completion percentage (values above 100 are clamped).
    #[must_use]
    pub fn with_completion(mut self, completion: u8) -> Self {
        self.completion = completion.min(COMPLETE);
        self
    }

    /// Set the schedule.
    #[must_use]
    pub const fn with_schedule(mut self, start: Date, end: Date) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Whether the task reached 100%.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completion >= COMPLETE
    }

    /// Whether the last day of the task is `today`.
    #[must_use]
    pub fn ends_on(&self, today: Date) -> bool {
        self.end == Some(today)
    }

    /// Whether the task ended before `today`.
    #[must_use]
    pub fn ends_before(&self, today: Date) -> bool {
        self.end.is_some_and(|end| end < today)
    }

    /// Whether `today` lies within `[start, end]`.
    #[must_use]
    pub fn runs_on(&self, today: Date) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= today && today <= end,
            _ => false,
        }
    }
}
