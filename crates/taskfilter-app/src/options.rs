//! Persisted on/off options of the built-in filters.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use taskfilter_core::BuiltInPredicate;

/// Which side of the option/filter mirror a change started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The persisted option was set.
    Option,
    /// The filter's enabled flag was set.
    Filter,
}

/// A value change of one built-in option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionChange {
    /// Predicate whose toggle changed.
    pub predicate: BuiltInPredicate,
    /// Previous value.
    pub old: bool,
    /// New value.
    pub new: bool,
    /// Side the change started from.
    pub origin: ChangeOrigin,
}

impl OptionChange {
    /// Option key of the changed toggle.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.predicate.option_name()
    }
}

/// Named boolean options, one per selectable built-in filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    values: BTreeMap<&'static str, bool>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            values: BuiltInPredicate::SELECTABLE
                .into_iter()
                .map(|predicate| (predicate.option_name(), false))
                .collect(),
        }
    }
}

impl FilterOptions {
    /// Current value of the toggle for `predicate` (`false` for the void predicate).
    #[must_use]
    pub fn get(&self, predicate: BuiltInPredicate) -> bool {
        self.values
            .get(predicate.option_name())
            .copied()
            .unwrap_or(false)
    }

    /// Option names with their values, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }

    /// Set a toggle, reporting the change only when the value differs.
    pub fn set(
        &mut self,
        predicate: BuiltInPredicate,
        value: bool,
        origin: ChangeOrigin,
    ) -> Option<OptionChange> {
        let slot = self.values.get_mut(predicate.option_name())?;
        if *slot == value {
            return None;
        }
        let old = std::mem::replace(slot, value);
        Some(OptionChange {
            predicate,
            old,
            new: value,
            origin,
        })
    }

    /// Parse options from TOML; unknown keys and non-boolean values are ignored.
    ///
    /// # Errors
    /// Returns an error when the text is not valid TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(contents).context("failed to parse options")?;
        let mut options = Self::default();
        for predicate in BuiltInPredicate::SELECTABLE {
            if let Some(value) = table
                .get(predicate.option_name())
                .and_then(toml::Value::as_bool)
            {
                options.set(predicate, value, ChangeOrigin::Option);
            }
        }
        Ok(options)
    }

    /// Render options as TOML.
    ///
    /// # Errors
    /// Returns an error when serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        let table: toml::Table = self
            .iter()
            .map(|(name, value)| (name.to_owned(), toml::Value::Boolean(value)))
            .collect();
        toml::to_string(&table).context("failed to serialize options")
    }

    /// Load options from `path`; a missing file yields defaults.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Write options to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_all_off() {
        let options = FilterOptions::default();
        assert_eq!(options.iter().count(), 4);
        assert!(options.iter().all(|(_, value)| !value));
        assert!(!options.get(BuiltInPredicate::All));
    }

    #[test]
    fn set_reports_only_real_changes() {
        let mut options = FilterOptions::default();
        let change = options.set(BuiltInPredicate::Overdue, true, ChangeOrigin::Option);
        assert_eq!(
            change,
            Some(OptionChange {
                predicate: BuiltInPredicate::Overdue,
                old: false,
                new: true,
                origin: ChangeOrigin::Option,
            })
        );
        assert_eq!(change.map(|c| c.name()), Some("filter.overdueTasks"));
        assert!(options.set(BuiltInPredicate::Overdue, true, ChangeOrigin::Option).is_none());
        assert!(options.set(BuiltInPredicate::All, true, ChangeOrigin::Option).is_none());
    }

    #[test]
    fn parses_quoted_keys_and_ignores_noise() -> Result<()> {
        let options = FilterOptions::from_toml_str(
            "\"filter.completedTasks\" = true\n\"filter.overdueTasks\" = \"yes\"\nunrelated = 3\n",
        )?;
        assert!(options.get(BuiltInPredicate::Completed));
        assert!(!options.get(BuiltInPredicate::Overdue));
        Ok(())
    }

    #[test]
    fn save_then_load_restores_values() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("options.toml");
        let mut options = FilterOptions::default();
        options.set(BuiltInPredicate::DueToday, true, ChangeOrigin::Filter);
        options.save(&path)?;

        let loaded = FilterOptions::load(&path)?;
        assert_eq!(loaded, options);
        Ok(())
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let loaded = FilterOptions::load(dir.path().join("absent.toml"))?;
        assert_eq!(loaded, FilterOptions::default());
        Ok(())
    }
}
