//! JSON persistence of filter sets.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use taskfilter_core::TaskFilter;

/// Format version written by [`save_filter_set`].
pub const FILTER_SET_VERSION: u32 = 1;

/// On-disk shape of a filter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSetDocument {
    /// Format version.
    pub version: u32,
    /// Filters in list order; the enabled entry is the one that was active.
    #[serde(default)]
    pub filters: Vec<TaskFilter>,
}

impl FilterSetDocument {
    /// Wrap `filters` in the current format version.
    #[must_use]
    pub const fn new(filters: Vec<TaskFilter>) -> Self {
        Self {
            version: FILTER_SET_VERSION,
            filters,
        }
    }
}

/// Read a filter set; a missing file is an empty set.
///
/// # Errors
/// Returns an error when the file cannot be read or parsed, or uses an unknown version.
pub fn load_filter_set(path: &Path) -> Result<Vec<TaskFilter>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document: FilterSetDocument = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    if document.version != FILTER_SET_VERSION {
        bail!(
            "unsupported filter set version {} in {}",
            document.version,
            path.display()
        );
    }
    Ok(document.filters)
}

/// Write a filter set as pretty-printed JSON, creating parent directories.
///
/// # Errors
/// Returns an error when the file cannot be written.
pub fn save_filter_set(path: &Path, filters: &[TaskFilter]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let document = FilterSetDocument::new(filters.to_vec());
    let json = serde_json::to_string_pretty(&document).context("failed to serialize filters")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskfilter_core::BuiltInPredicate;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_empty_set() -> Result<()> {
        let dir = tempdir()?;
        assert!(load_filter_set(&dir.path().join("none.json"))?.is_empty());
        Ok(())
    }

    #[test]
    fn saved_set_loads_back() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/filters.json");
        let filters = vec![
            TaskFilter {
                enabled: true,
                ..TaskFilter::custom("late", "late work", Some("end < today".into()))
            },
            TaskFilter::builtin(BuiltInPredicate::Overdue),
        ];

        save_filter_set(&path, &filters)?;
        assert_eq!(load_filter_set(&path)?, filters);
        Ok(())
    }

    #[test]
    fn document_uses_tagged_kinds() -> Result<()> {
        let json = r#"{
            "version": 1,
            "filters": [
                {"title": "a", "kind": {"custom": {"expression": "x = 1"}}},
                {"title": "filter.completedTasks", "enabled": true, "kind": {"built_in": "completed"}}
            ]
        }"#;
        let document: FilterSetDocument = serde_json::from_str(json)?;
        assert_eq!(document.filters[0].expression(), Some("x = 1"));
        assert_eq!(
            document.filters[1].predicate(),
            Some(BuiltInPredicate::Completed)
        );
        assert!(document.filters[1].enabled);
        Ok(())
    }

    #[test]
    fn unknown_version_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("filters.json");
        fs::write(&path, r#"{"version": 7, "filters": []}"#)?;

        let Err(err) = load_filter_set(&path) else {
            panic!("version 7 should error");
        };
        assert!(err.to_string().contains("unsupported filter set version 7"));
        Ok(())
    }
}
