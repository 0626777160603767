//! Built-in filter predicates that need nothing beyond the task itself.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::task::Task;

/// Stateless visibility predicate of a built-in filter.
///
/// Every predicate answers "is the child visible?" and treats a missing child as visible,
/// since the first call of a traversal may stand for the root placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltInPredicate {
    /// Shows everything (the void filter).
    All,
    /// Hides finished tasks.
    Completed,
    /// Shows unfinished tasks whose last day is today.
    DueToday,
    /// Shows unfinished tasks whose last day has passed.
    Overdue,
    /// Shows unfinished tasks running today.
    InProgressToday,
}

impl BuiltInPredicate {
    /// The four user-selectable predicates, in menu order.
    pub const SELECTABLE: [Self; 4] = [
        Self::Completed,
        Self::DueToday,
        Self::Overdue,
        Self::InProgressToday,
    ];

    /// Option key that persists the toggle, doubling as the filter title.
    #[must_use]
    pub const fn option_name(self) -> &'static str {
        match self {
            Self::All => "filter.void",
            Self::Completed => "filter.completedTasks",
            Self::DueToday => "filter.dueTodayTasks",
            Self::Overdue => "filter.overdueTasks",
            Self::InProgressToday => "filter.inProgressTodayTasks",
        }
    }

    /// Resolve a predicate from its option name.
    #[must_use]
    pub fn from_option_name(name: &str) -> Option<Self> {
        [Self::All]
            .into_iter()
            .chain(Self::SELECTABLE)
            .find(|predicate| predicate.option_name() == name)
    }

    /// Evaluate the predicate for `child` relative to `today`.
    #[must_use]
    pub fn evaluate(self, child: Option<&Task>, today: Date) -> bool {
        let Some(task) = child else {
            return true;
        };
        match self {
            Self::All => true,
            Self::Completed => !task.is_complete(),
            Self::DueToday => !task.is_complete() && task.ends_on(today),
            Self::Overdue => !task.is_complete() && task.ends_before(today),
            Self::InProgressToday => !task.is_complete() && task.runs_on(today),
        }
    }
}
