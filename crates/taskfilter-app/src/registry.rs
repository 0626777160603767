//! Catalog of built-in and custom filters.

use std::collections::HashSet;

use taskfilter_core::{BuiltInPredicate, TaskFilter};
use tracing::warn;

use crate::error::RegistryError;
use crate::options::{ChangeOrigin, FilterOptions, OptionChange};

/// Built-in filters (fixed, created once) followed by user-owned custom filters.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    builtins: Vec<TaskFilter>,
    custom: Vec<TaskFilter>,
    options: FilterOptions,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new(FilterOptions::default())
    }
}

impl FilterRegistry {
    /// Create the catalog, taking built-in enabled flags from `options`.
    #[must_use]
    pub fn new(options: FilterOptions) -> Self {
        let builtins = BuiltInPredicate::SELECTABLE
            .into_iter()
            .map(|predicate| TaskFilter {
                enabled: options.get(predicate),
                ..TaskFilter::builtin(predicate)
            })
            .collect();
        Self {
            builtins,
            custom: Vec::new(),
            options,
        }
    }

    /// Blank custom filter for the user to fill in.
    #[must_use]
    pub fn create_custom_filter() -> TaskFilter {
        TaskFilter::custom(String::new(), String::new(), None)
    }

    /// The four built-in filters in menu order.
    #[must_use]
    pub fn builtins(&self) -> &[TaskFilter] {
        &self.builtins
    }

    /// Custom filters in insertion order.
    #[must_use]
    pub fn custom(&self) -> &[TaskFilter] {
        &self.custom
    }

    /// Every filter: built-ins first, then custom filters.
    pub fn filters(&self) -> impl Iterator<Item = &TaskFilter> {
        self.builtins.iter().chain(&self.custom)
    }

    /// Look a filter up by title.
    #[must_use]
    pub fn find(&self, title: &str) -> Option<&TaskFilter> {
        self.filters().find(|filter| filter.title == title)
    }

    /// The singleton filter of a built-in predicate (`None` for the void predicate).
    #[must_use]
    pub fn builtin(&self, predicate: BuiltInPredicate) -> Option<&TaskFilter> {
        self.builtins
            .iter()
            .find(|filter| filter.predicate() == Some(predicate))
    }

    /// Persisted built-in options.
    #[must_use]
    pub const fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Append a custom filter.
    ///
    /// # Errors
    /// Rejects built-in filters, empty titles and titles already in use.
    pub fn add_custom(&mut self, filter: TaskFilter) -> Result<(), RegistryError> {
        self.validate(&filter, None)?;
        self.custom.push(filter);
        Ok(())
    }

    /// Remove a custom filter by title.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if no custom filter has the title.
    pub fn remove_custom(&mut self, title: &str) -> Result<TaskFilter, RegistryError> {
        let idx = self.custom_index(title)?;
        Ok(self.custom.remove(idx))
    }

    /// Edit a custom filter in place; the edit is rolled back if it breaks catalog rules.
    ///
    /// # Errors
    /// Returns an error when the filter does not exist or the edited filter is invalid.
    pub fn update_custom(
        &mut self,
        title: &str,
        edit: impl FnOnce(&mut TaskFilter),
    ) -> Result<&TaskFilter, RegistryError> {
        let idx = self.custom_index(title)?;
        let mut edited = self.custom[idx].clone();
        edit(&mut edited);
        self.validate(&edited, Some(idx))?;
        self.custom[idx] = edited;
        Ok(&self.custom[idx])
    }

    /// Last built-in filter whose persisted toggle is on.
    #[must_use]
    pub fn enabled_builtin(&self) -> Option<&TaskFilter> {
        self.builtins.iter().rfind(|filter| filter.enabled)
    }

    /// Replace every custom filter with the non-built-in entries of `filters`.
    ///
    /// Returns the filter that should become active: the *last* enabled entry in
    /// list order, with built-ins whose persisted toggle is on counted before the
    /// imported entries. Enabled built-in entries resolve to this catalog's
    /// singletons; entries dropped as duplicates never win.
    pub fn import(&mut self, filters: Vec<TaskFilter>) -> Option<TaskFilter> {
        let mut enabled = Vec::new();
        let mut seen = HashSet::new();
        self.custom.clear();

        for filter in filters {
            if filter.is_builtin() {
                if filter.enabled {
                    enabled.push(self.resolve_imported(&filter));
                }
                continue;
            }
            if !seen.insert(filter.title.clone())
                || self.builtins.iter().any(|b| b.title == filter.title)
            {
                warn!(title = %filter.title, "skipping imported filter with duplicate title");
                continue;
            }
            if filter.enabled {
                enabled.push(filter.clone());
            }
            self.custom.push(filter);
        }

        if enabled.len() > 1 {
            warn!(
                count = enabled.len(),
                "imported filter set enables several filters; the last one wins"
            );
        }
        enabled
            .pop()
            .or_else(|| self.enabled_builtin().cloned())
    }

    /// Custom filters for persistence, `enabled` set only on `active_title`.
    #[must_use]
    pub fn export(&self, active_title: &str) -> Vec<TaskFilter> {
        self.custom
            .iter()
            .map(|filter| TaskFilter {
                enabled: filter.title == active_title,
                ..filter.clone()
            })
            .collect()
    }

    /// Set a persisted option and mirror it into the built-in filter.
    pub fn set_option(&mut self, predicate: BuiltInPredicate, value: bool) -> Option<OptionChange> {
        let change = self.options.set(predicate, value, ChangeOrigin::Option)?;
        self.mirror(change);
        Some(change)
    }

    /// Toggle a built-in filter and mirror it into the persisted option.
    pub fn set_builtin_enabled(
        &mut self,
        predicate: BuiltInPredicate,
        value: bool,
    ) -> Option<OptionChange> {
        let filter = self
            .builtins
            .iter_mut()
            .find(|filter| filter.predicate() == Some(predicate))?;
        if filter.enabled == value {
            return None;
        }
        let old = std::mem::replace(&mut filter.enabled, value);
        let change = OptionChange {
            predicate,
            old,
            new: value,
            origin: ChangeOrigin::Filter,
        };
        self.mirror(change);
        Some(change)
    }

    /// Apply `change` to the side it did not come from.
    fn mirror(&mut self, change: OptionChange) {
        match change.origin {
            ChangeOrigin::Option => {
                if let Some(filter) = self
                    .builtins
                    .iter_mut()
                    .find(|filter| filter.predicate() == Some(change.predicate))
                {
                    filter.enabled = change.new;
                }
            }
            ChangeOrigin::Filter => {
                self.options.set(change.predicate, change.new, ChangeOrigin::Filter);
            }
        }
    }

    fn resolve_imported(&self, filter: &TaskFilter) -> TaskFilter {
        match filter.predicate() {
            Some(BuiltInPredicate::All) => TaskFilter::void(),
            Some(predicate) => self
                .builtin(predicate)
                .cloned()
                .unwrap_or_else(|| TaskFilter::builtin(predicate)),
            None => filter.clone(),
        }
    }

    fn custom_index(&self, title: &str) -> Result<usize, RegistryError> {
        if self.builtins.iter().any(|filter| filter.title == title) {
            return Err(RegistryError::BuiltIn(title.to_owned()));
        }
        self.custom
            .iter()
            .position(|filter| filter.title == title)
            .ok_or_else(|| RegistryError::NotFound(title.to_owned()))
    }

    fn validate(&self, filter: &TaskFilter, replacing: Option<usize>) -> Result<(), RegistryError> {
        if filter.is_builtin() {
            return Err(RegistryError::BuiltIn(filter.title.clone()));
        }
        if filter.title.trim().is_empty() {
            return Err(RegistryError::EmptyTitle);
        }
        let clash = self.builtins.iter().any(|b| b.title == filter.title)
            || self
                .custom
                .iter()
                .enumerate()
                .any(|(idx, c)| Some(idx) != replacing && c.title == filter.title);
        if clash {
            return Err(RegistryError::DuplicateTitle(filter.title.clone()));
        }
        Ok(())
    }
}
