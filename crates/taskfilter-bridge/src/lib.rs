//! Query bridge between task filters and the store holding task data
//!
//! Custom filters hand their expression to a [`QueryBridge`], which streams back
//! the numbers of every task satisfying it. The store and its query language are
//! opaque to this crate; [`CommandBridge`] delegates to an external program.

mod config;
mod error;
mod executor;
mod types;

pub use config::BridgeConfig;
pub use error::{QueryError, Result};
pub use executor::CommandBridge;
pub use types::{ColumnType, ColumnValue, QueryRow, SimpleSelect, UnknownColumnType};

use std::sync::Arc;
use taskfilter_core::TaskNumber;

/// Narrow interface to the store that evaluates filter expressions
pub trait QueryBridge {
    /// Run `select` and feed every matching row to `consumer`
    ///
    /// Rows are delivered in store order. The expression is passed through
    /// without validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable, the expression is malformed,
    /// or the store does not answer in time.
    fn map_tasks(
        &self,
        select: &SimpleSelect,
        consumer: &mut dyn FnMut(TaskNumber, ColumnValue),
    ) -> Result<()>;
}

impl<B: QueryBridge + ?Sized> QueryBridge for &B {
    fn map_tasks(
        &self,
        select: &SimpleSelect,
        consumer: &mut dyn FnMut(TaskNumber, ColumnValue),
    ) -> Result<()> {
        (**self).map_tasks(select, consumer)
    }
}

impl<B: QueryBridge + ?Sized> QueryBridge for Box<B> {
    fn map_tasks(
        &self,
        select: &SimpleSelect,
        consumer: &mut dyn FnMut(TaskNumber, ColumnValue),
    ) -> Result<()> {
        (**self).map_tasks(select, consumer)
    }
}

impl<B: QueryBridge + ?Sized> QueryBridge for Arc<B> {
    fn map_tasks(
        &self,
        select: &SimpleSelect,
        consumer: &mut dyn FnMut(TaskNumber, ColumnValue),
    ) -> Result<()> {
        (**self).map_tasks(select, consumer)
    }
}
