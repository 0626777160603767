//! Filter definitions shared by built-in and query-backed filters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::id::TaskNumber;
use crate::predicate::BuiltInPredicate;
use crate::task::Task;

/// How a filter decides visibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Pure in-memory predicate.
    BuiltIn(BuiltInPredicate),
    /// Query expression evaluated by the external store; visibility comes from cached matches.
    Custom {
        /// Query text handed to the store as-is.
        #[serde(default)]
        expression: Option<String>,
    },
}

/// Inputs shared by every evaluation of one traversal.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// "Today", computed once per traversal.
    pub today: Date,
    /// Task numbers matched by the last query of the active custom filter.
    pub matches: &'a HashSet<TaskNumber>,
}

/// A named unit of filtering logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Unique key, also shown in menus.
    pub title: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Whether the filter is switched on in persisted state.
    #[serde(default)]
    pub enabled: bool,
    /// Evaluation strategy.
    pub kind: FilterKind,
}

impl TaskFilter {
    /// The filter that shows every task.
    #[must_use]
    pub fn void() -> Self {
        Self::builtin(BuiltInPredicate::All)
    }

    /// Filter wrapping a built-in predicate; the title is the predicate's option name.
    #[must_use]
    pub fn builtin(predicate: BuiltInPredicate) -> Self {
        Self {
            title: predicate.option_name().to_owned(),
            description: String::new(),
            enabled: false,
            kind: FilterKind::BuiltIn(predicate),
        }
    }

    /// Query-backed filter.
    pub fn custom(
        title: impl Into<String>,
        description: impl Into<String>,
        expression: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            enabled: false,
            kind: FilterKind::Custom { expression },
        }
    }

    /// Whether the filter is evaluated in memory.
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        matches!(self.kind, FilterKind::BuiltIn(_))
    }

    /// Whether this is the show-everything filter.
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self.kind, FilterKind::BuiltIn(BuiltInPredicate::All))
    }

    /// Built-in predicate, if any.
    #[must_use]
    pub const fn predicate(&self) -> Option<BuiltInPredicate> {
        match self.kind {
            FilterKind::BuiltIn(predicate) => Some(predicate),
            FilterKind::Custom { .. } => None,
        }
    }

    /// Query expression of a custom filter.
    #[must_use]
    pub fn expression(&self) -> Option<&str> {
        match &self.kind {
            FilterKind::Custom { expression } => expression.as_deref(),
            FilterKind::BuiltIn(_) => None,
        }
    }

    /// Decide whether `child` is visible under `parent`.
    ///
    /// Custom filters only consult `ctx.matches`, so their answers are as fresh as the
    /// last refresh of that set.
    #[must_use]
    pub fn evaluate(&self, _parent: &Task, child: Option<&Task>, ctx: &EvalContext<'_>) -> bool {
        match &self.kind {
            FilterKind::BuiltIn(predicate) => predicate.evaluate(child, ctx.today),
            FilterKind::Custom { .. } => {
                child.is_none_or(|task| ctx.matches.contains(&task.number))
            }
        }
    }
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self::void()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn ctx(matches: &HashSet<TaskNumber>) -> EvalContext<'_> {
        EvalContext {
            today: date!(2024 - 06 - 10),
            matches,
        }
    }

    #[test]
    fn void_filter_is_builtin_and_shows_everything() {
        let void = TaskFilter::void();
        let empty = HashSet::new();
        let root = Task::new(0, "root");
        let done = Task::new(1, "done").with_completion(100);
        assert!(void.is_builtin());
        assert!(void.is_void());
        assert!(void.evaluate(&root, Some(&done), &ctx(&empty)));
        assert_eq!(TaskFilter::default(), void);
    }

    #[test]
    fn custom_filter_consults_matches() {
        let matches: HashSet<TaskNumber> = [2, 5, 9].into_iter().map(TaskNumber).collect();
        let filter = TaskFilter::custom("high", "", Some("priority > 3".into()));
        let root = Task::new(0, "root");

        for number in [2, 5, 9] {
            assert!(filter.evaluate(&root, Some(&Task::new(number, "hit")), &ctx(&matches)));
        }
        for number in [1, 3, 10] {
            assert!(!filter.evaluate(&root, Some(&Task::new(number, "miss")), &ctx(&matches)));
        }
        assert!(filter.evaluate(&root, None, &ctx(&matches)));
        assert!(!filter.is_builtin());
        assert_eq!(filter.expression(), Some("priority > 3"));
    }

    #[test]
    fn builtin_title_is_option_name() {
        let filter = TaskFilter::builtin(BuiltInPredicate::Overdue);
        assert_eq!(filter.title, "filter.overdueTasks");
        assert_eq!(filter.predicate(), Some(BuiltInPredicate::Overdue));
        assert_eq!(filter.expression(), None);
    }

    #[test]
    fn serializes_kind_as_tagged_variant() {
        let filter = TaskFilter::custom("late", "late work", Some("end < today".into()));
        let json = serde_json::to_value(&filter).unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(json["kind"]["custom"]["expression"], "end < today");

        let builtin = serde_json::to_value(TaskFilter::builtin(BuiltInPredicate::DueToday))
            .unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(builtin["kind"]["built_in"], "due_today");
    }
}
