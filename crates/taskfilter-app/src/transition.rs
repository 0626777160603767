//! Active-filter state machine with side effects returned as data.

use taskfilter_core::TaskFilter;

use crate::recent::RecentFilters;

/// Side effect requested by a transition, executed in order by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Drop cached custom filter matches (built-in filters never read them).
    ClearCache,
    /// Re-run the active custom filter's query and rebuild the cache.
    RefreshCache,
    /// Tell filter-changed listeners about the new active filter.
    NotifyListeners,
    /// Ask the consuming view to re-evaluate visibility.
    SyncRender,
}

/// Active filter plus recency list.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Filter currently applied.
    pub active: TaskFilter,
    /// Recently activated filters.
    pub recent: RecentFilters,
}

impl FilterState {
    /// Start with the void filter and a seeded recency list.
    #[must_use]
    pub fn new(recent: RecentFilters) -> Self {
        Self {
            active: TaskFilter::void(),
            recent,
        }
    }
}

/// Make `filter` active.
///
/// Non-void filters move to the front of the recency list. Custom filters request a
/// cache refresh before listeners hear about the change.
#[must_use]
pub fn transition(mut state: FilterState, filter: TaskFilter) -> (FilterState, Vec<Effect>) {
    if !filter.is_void() {
        state.recent.touch(&filter.title);
    }
    let cache = if filter.is_builtin() {
        Effect::ClearCache
    } else {
        Effect::RefreshCache
    };
    state.active = filter;
    (state, vec![cache, Effect::NotifyListeners, Effect::SyncRender])
}
