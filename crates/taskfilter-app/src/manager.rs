//! Active filter orchestration.

use std::collections::HashSet;

use taskfilter_bridge::{QueryBridge, SimpleSelect};
use taskfilter_core::{
    BuiltInPredicate, Clock, EvalContext, SystemClock, Task, TaskFilter, TaskTree, Visibility,
};
use time::Date;
use tracing::{debug, trace};

use crate::error::{FilterResult, RegistryError};
use crate::events::{TaskEvent, UndoEvent};
use crate::listeners::{FilterListeners, ListenerId};
use crate::options::OptionChange;
use crate::recent::RecentFilters;
use crate::registry::FilterRegistry;
use crate::results::CustomFilterResults;
use crate::transition::{Effect, FilterState, transition};

/// Callback asking the consuming view to re-evaluate visibility.
pub type RenderSync = Box<dyn FnMut() + Send>;

/// Owns the active filter, the catalog and the custom filter result cache.
///
/// Every operation that runs a query blocks until the bridge answers, and listeners
/// only hear about a change once the cache reflects it.
pub struct FilterManager<B> {
    bridge: B,
    clock: Box<dyn Clock>,
    registry: FilterRegistry,
    state: FilterState,
    results: CustomFilterResults,
    listeners: FilterListeners,
    render_sync: RenderSync,
    visibility: Visibility,
}

impl<B: QueryBridge> FilterManager<B> {
    /// Create a manager with the built-ins seeding the recency list.
    ///
    /// The last built-in whose persisted toggle is on starts active; otherwise the
    /// void filter does.
    #[must_use]
    pub fn new(bridge: B, registry: FilterRegistry) -> Self {
        let mut state = FilterState::new(RecentFilters::seeded(registry.builtins()));
        if let Some(filter) = registry.enabled_builtin() {
            // Built-in targets only clear the cache, which starts empty anyway.
            (state, _) = transition(state, filter.clone());
        }
        Self {
            bridge,
            clock: Box::new(SystemClock),
            registry,
            state,
            results: CustomFilterResults::default(),
            listeners: FilterListeners::default(),
            render_sync: Box::new(|| {}),
            visibility: Visibility::default(),
        }
    }

    /// Replace the source of "today".
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Install the render-sync callback (a no-op until set).
    pub fn set_render_sync(&mut self, sync: impl FnMut() + Send + 'static) {
        self.render_sync = Box::new(sync);
    }

    /// Register a filter-changed listener.
    pub fn add_listener(
        &mut self,
        listener: impl FnMut(&TaskFilter) + Send + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    /// Remove a filter-changed listener.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Stored recency list; every title resolves through [`recent_filters`](Self::recent_filters).
    #[must_use]
    pub const fn recency(&self) -> &RecentFilters {
        &self.state.recent
    }

    /// Filter currently applied.
    #[must_use]
    pub const fn active_filter(&self) -> &TaskFilter {
        &self.state.active
    }

    /// Recently activated filters, most recent first.
    #[must_use]
    pub fn recent_filters(&self) -> Vec<TaskFilter> {
        self.state
            .recent
            .titles()
            .filter_map(|title| {
                self.registry.find(title).cloned().or_else(|| {
                    (title == self.state.active.title).then(|| self.state.active.clone())
                })
            })
            .collect()
    }

    /// Every filter in the catalog, built-ins first.
    pub fn filters(&self) -> impl Iterator<Item = &TaskFilter> {
        self.registry.filters()
    }

    /// The filter catalog.
    #[must_use]
    pub const fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Matches of the last custom filter query.
    #[must_use]
    pub const fn results(&self) -> &CustomFilterResults {
        &self.results
    }

    /// Blank custom filter for the user to fill in.
    #[must_use]
    pub fn create_custom_filter(&self) -> TaskFilter {
        FilterRegistry::create_custom_filter()
    }

    /// Today according to the manager's clock.
    #[must_use]
    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Apply the active filter to one parent/child edge.
    #[must_use]
    pub fn evaluate(&self, parent: &Task, child: Option<&Task>) -> bool {
        let ctx = EvalContext {
            today: self.today(),
            matches: self.results.matches(),
        };
        self.state.active.evaluate(parent, child, &ctx)
    }

    /// Recompute which tasks of `tree` the active filter shows.
    pub fn rebuild_visibility(&mut self, tree: &TaskTree) -> &Visibility {
        let ctx = EvalContext {
            today: self.clock.today(),
            matches: self.results.matches(),
        };
        self.visibility.rebuild(tree, &self.state.active, &ctx);
        &self.visibility
    }

    /// Outcome of the last [`rebuild_visibility`](Self::rebuild_visibility).
    #[must_use]
    pub const fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Tasks hidden by the last visibility rebuild.
    #[must_use]
    pub const fn hidden_task_count(&self) -> usize {
        self.visibility.hidden_count()
    }

    /// Make `filter` the active filter.
    ///
    /// # Errors
    /// Propagates query failures; the cache is then empty and listeners are not notified.
    pub fn set_active_filter(&mut self, filter: TaskFilter) -> FilterResult<()> {
        debug!(title = %filter.title, builtin = filter.is_builtin(), "activate filter");
        let (state, effects) = transition(std::mem::take(&mut self.state), filter);
        self.state = state;
        self.prune_recent();
        for effect in effects {
            match effect {
                Effect::ClearCache => self.results.clear(),
                Effect::RefreshCache => self.rebuild_results()?,
                Effect::NotifyListeners => self.listeners.notify(&self.state.active),
                Effect::SyncRender => (self.render_sync)(),
            }
        }
        Ok(())
    }

    /// Activate a catalog filter by title (the void filter answers to `filter.void`).
    ///
    /// # Errors
    /// Fails when no filter has the title, or when the query fails.
    pub fn activate(&mut self, title: &str) -> FilterResult<()> {
        let filter = if title == BuiltInPredicate::All.option_name() {
            TaskFilter::void()
        } else {
            self.registry
                .find(title)
                .cloned()
                .ok_or_else(|| RegistryError::NotFound(title.to_owned()))?
        };
        self.set_active_filter(filter)
    }

    /// Re-run the active custom filter's query, rebuild the cache and sync the view.
    ///
    /// With a built-in filter active the cache is only cleared.
    ///
    /// # Errors
    /// Propagates query failures, leaving the cache empty.
    pub fn refresh(&mut self) -> FilterResult<()> {
        self.rebuild_results()?;
        (self.render_sync)();
        Ok(())
    }

    /// React to a task change.
    ///
    /// # Errors
    /// Propagates query failures of the triggered refresh.
    pub fn handle_task_event(&mut self, event: &TaskEvent) -> FilterResult<()> {
        trace!(task = %event.task(), ?event, "task event");
        if self.state.active.is_void() {
            return Ok(());
        }
        if self.state.active.is_builtin() {
            (self.render_sync)();
            return Ok(());
        }
        self.refresh()
    }

    /// React to undo manager activity.
    ///
    /// # Errors
    /// Propagates query failures of the triggered refresh.
    pub fn handle_undo_event(&mut self, event: &UndoEvent) -> FilterResult<()> {
        match event {
            UndoEvent::EditHappened { .. } | UndoEvent::UndoOrRedo => {
                trace!(?event, "undo event");
                self.refresh()
            }
            UndoEvent::Reset => Ok(()),
        }
    }

    /// Replace the custom filters with `filters` and activate the last enabled entry.
    ///
    /// An active custom filter that did not survive the import falls back to the void
    /// filter; one that survived with a different definition is re-queried.
    ///
    /// # Errors
    /// Propagates query failures of the activation.
    pub fn import_filters(&mut self, filters: Vec<TaskFilter>) -> FilterResult<()> {
        let enabled = self.registry.import(filters);
        self.prune_recent();
        if let Some(filter) = enabled {
            return self.set_active_filter(filter);
        }
        if self.state.active.is_builtin() {
            return Ok(());
        }
        match self.registry.find(&self.state.active.title).cloned() {
            None => self.set_active_filter(TaskFilter::void()),
            Some(current) if current.kind != self.state.active.kind => {
                self.state.active = current;
                self.rebuild_results()?;
                self.listeners.notify(&self.state.active);
                (self.render_sync)();
                Ok(())
            }
            Some(current) => {
                self.state.active = current;
                Ok(())
            }
        }
    }

    /// Custom filters with `enabled` set only on the active one.
    #[must_use]
    pub fn export_filters(&self) -> Vec<TaskFilter> {
        self.registry.export(&self.state.active.title)
    }

    /// Add a custom filter to the catalog.
    ///
    /// # Errors
    /// Fails when the catalog rejects the filter.
    pub fn add_custom_filter(&mut self, filter: TaskFilter) -> FilterResult<()> {
        self.registry.add_custom(filter)?;
        Ok(())
    }

    /// Edit a custom filter; editing the active filter re-runs its query.
    ///
    /// # Errors
    /// Fails when the edit is rejected or the refresh fails.
    pub fn update_custom_filter(
        &mut self,
        title: &str,
        edit: impl FnOnce(&mut TaskFilter),
    ) -> FilterResult<TaskFilter> {
        let updated = self.registry.update_custom(title, edit)?.clone();
        self.state.recent.rename(title, &updated.title);
        if self.state.active.title == title && !self.state.active.is_builtin() {
            self.state.active = updated.clone();
            self.rebuild_results()?;
            self.listeners.notify(&self.state.active);
            (self.render_sync)();
        }
        Ok(updated)
    }

    /// Delete a custom filter; deleting the active filter activates the void filter.
    ///
    /// # Errors
    /// Fails when no custom filter has the title.
    pub fn remove_custom_filter(&mut self, title: &str) -> FilterResult<TaskFilter> {
        let removed = self.registry.remove_custom(title)?;
        self.state.recent.remove(title);
        if self.state.active.title == title {
            self.set_active_filter(TaskFilter::void())?;
        }
        Ok(removed)
    }

    /// Set a persisted built-in option, mirroring it into the filter.
    pub fn set_option(&mut self, predicate: BuiltInPredicate, value: bool) -> Option<OptionChange> {
        let change = self.registry.set_option(predicate, value)?;
        self.sync_active_flag(change);
        Some(change)
    }

    /// Toggle a built-in filter, mirroring it into the persisted option.
    pub fn set_builtin_enabled(
        &mut self,
        predicate: BuiltInPredicate,
        value: bool,
    ) -> Option<OptionChange> {
        let change = self.registry.set_builtin_enabled(predicate, value)?;
        self.sync_active_flag(change);
        Some(change)
    }

    fn prune_recent(&mut self) {
        let Self { registry, state, .. } = self;
        let active = &state.active.title;
        state
            .recent
            .retain(|title| title == active || registry.find(title).is_some());
    }

    fn sync_active_flag(&mut self, change: OptionChange) {
        if self.state.active.predicate() == Some(change.predicate) {
            self.state.active.enabled = change.new;
        }
    }

    fn rebuild_results(&mut self) -> FilterResult<()> {
        self.results.clear();
        if self.state.active.is_builtin() {
            return Ok(());
        }

        debug!(title = %self.state.active.title, ">>> refresh custom filter results");
        let select = SimpleSelect::task_numbers(self.state.active.expression());
        let mut matches = HashSet::new();
        self.bridge.map_tasks(&select, &mut |number, _| {
            trace!(%number, "matched");
            matches.insert(number);
        })?;
        debug!(count = matches.len(), "<<< refresh custom filter results");
        self.results.replace(matches);
        Ok(())
    }
}

impl<B> std::fmt::Debug for FilterManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterManager")
            .field("active", &self.state.active.title)
            .field("matches", &self.results.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
