//! Filter orchestration for task trees.
//!
//! This crate owns the filter catalog, the active filter state machine, the custom
//! filter result cache, persisted options and project configuration shared by
//! the CLI and any embedding view.

pub mod config;
pub mod error;
pub mod events;
pub mod listeners;
pub mod manager;
pub mod options;
pub mod persist;
pub mod recent;
pub mod registry;
pub mod results;
pub mod shared;
pub mod transition;

// Re-exports for convenience
pub use config::{ProjectConfig, StorageConfig};
pub use error::{FilterError, FilterResult, RegistryError};
pub use events::{TaskEvent, UndoEvent};
pub use listeners::{FilterChangedListener, FilterListeners, ListenerId};
pub use manager::{FilterManager, RenderSync};
pub use options::{ChangeOrigin, FilterOptions, OptionChange};
pub use persist::{FILTER_SET_VERSION, FilterSetDocument, load_filter_set, save_filter_set};
pub use recent::{RECENT_FILTER_LIST_SIZE, RecentFilters};
pub use registry::FilterRegistry;
pub use results::CustomFilterResults;
pub use shared::SharedFilterManager;
pub use transition::{Effect, FilterState, transition};
