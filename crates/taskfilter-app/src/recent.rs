//! Most-recently-activated filters.

use std::collections::VecDeque;

use taskfilter_core::TaskFilter;

/// Maximum number of entries kept in the recency list.
pub const RECENT_FILTER_LIST_SIZE: usize = 5;

/// Bounded MRU list of filter titles, most recent first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentFilters {
    titles: VecDeque<String>,
}

impl RecentFilters {
    /// Seed the list in the given order (first = most recent).
    pub fn seeded<'a>(filters: impl IntoIterator<Item = &'a TaskFilter>) -> Self {
        let mut recent = Self::default();
        for filter in filters {
            if !recent.contains(&filter.title) {
                recent.titles.push_back(filter.title.clone());
            }
        }
        recent.titles.truncate(RECENT_FILTER_LIST_SIZE);
        recent
    }

    /// Move `title` to the front, trimming the oldest entries past the limit.
    pub fn touch(&mut self, title: &str) {
        self.remove(title);
        self.titles.push_front(title.to_owned());
        self.titles.truncate(RECENT_FILTER_LIST_SIZE);
    }

    /// Drop `title` from the list.
    pub fn remove(&mut self, title: &str) -> bool {
        let Some(idx) = self.position(title) else {
            return false;
        };
        self.titles.remove(idx);
        true
    }

    /// Keep only the titles for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.titles.retain(|title| keep(title));
    }

    /// Replace `old` with `new` in place.
    pub fn rename(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }
        self.remove(new);
        if let Some(idx) = self.position(old)
            && let Some(slot) = self.titles.get_mut(idx)
        {
            new.clone_into(slot);
        }
    }

    /// Index of `title`, 0 being the most recent.
    #[must_use]
    pub fn position(&self, title: &str) -> Option<usize> {
        self.titles.iter().position(|entry| entry == title)
    }

    /// Whether `title` is listed.
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.position(title).is_some()
    }

    /// Titles, most recent first.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
