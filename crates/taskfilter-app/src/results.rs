//! Cached matches of the active custom filter.

use std::collections::HashSet;

use taskfilter_core::TaskNumber;
use time::OffsetDateTime;

/// Task numbers matched by the last query of the active custom filter.
///
/// The set is replaced wholesale on every refresh and never patched.
#[derive(Debug, Default, Clone)]
pub struct CustomFilterResults {
    matches: HashSet<TaskNumber>,
    refreshed_at: Option<OffsetDateTime>,
}

impl CustomFilterResults {
    /// Forget every match and the time of the last refresh.
    pub fn clear(&mut self) {
        self.matches.clear();
        self.refreshed_at = None;
    }

    /// Install the outcome of a successful query.
    pub fn replace(&mut self, matches: HashSet<TaskNumber>) {
        self.matches = matches;
        self.refreshed_at = Some(OffsetDateTime::now_utc());
    }

    /// Whether `number` matched.
    #[must_use]
    pub fn contains(&self, number: TaskNumber) -> bool {
        self.matches.contains(&number)
    }

    /// The whole match set.
    #[must_use]
    pub const fn matches(&self) -> &HashSet<TaskNumber> {
        &self.matches
    }

    /// Number of matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether nothing matched (or no query ran).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// When the last successful query finished.
    #[must_use]
    pub const fn refreshed_at(&self) -> Option<OffsetDateTime> {
        self.refreshed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_swaps_whole_set() {
        let mut results = CustomFilterResults::default();
        assert!(results.refreshed_at().is_none());

        results.replace([1, 2].into_iter().map(TaskNumber).collect());
        results.replace([3].into_iter().map(TaskNumber).collect());
        assert_eq!(results.len(), 1);
        assert!(results.contains(TaskNumber(3)));
        assert!(!results.contains(TaskNumber(1)));
        assert!(results.refreshed_at().is_some());

        results.clear();
        assert!(results.is_empty());
        assert!(results.refreshed_at().is_none());
    }
}
