//! Async access to a [`FilterManager`] shared between callers.

use std::sync::Arc;
use std::time::Duration;

use taskfilter_bridge::QueryBridge;
use taskfilter_core::TaskFilter;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{FilterError, FilterResult};
use crate::events::{TaskEvent, UndoEvent};
use crate::manager::FilterManager;

/// Serializes every transition and catalog change behind one async mutex.
///
/// Blocking bridge work runs on the blocking pool while the lock is held, so a
/// concurrent import can never interleave with a refresh in progress.
pub struct SharedFilterManager<B> {
    inner: Arc<Mutex<FilterManager<B>>>,
    timeout: Option<Duration>,
}

impl<B> Clone for SharedFilterManager<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
        }
    }
}

impl<B> SharedFilterManager<B>
where
    B: QueryBridge + Send + 'static,
{
    /// Wrap a manager without a deadline.
    #[must_use]
    pub fn new(manager: FilterManager<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
            timeout: None,
        }
    }

    /// Give up waiting on operations after `timeout`.
    ///
    /// The work itself is not cancelled; it finishes in the background and
    /// keeps the lock until then.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Direct access for reads and non-blocking edits.
    pub async fn lock(&self) -> MutexGuard<'_, FilterManager<B>> {
        self.inner.lock().await
    }

    /// Run `op` against the manager on the blocking pool.
    ///
    /// # Errors
    /// Returns the operation's error, [`FilterError::Timeout`] when the deadline passes
    /// first, or [`FilterError::Join`] when the worker panics.
    pub async fn run<T, F>(&self, op: F) -> FilterResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut FilterManager<B>) -> FilterResult<T> + Send + 'static,
    {
        let mut guard = Arc::clone(&self.inner).lock_owned().await;
        let task = tokio::task::spawn_blocking(move || op(&mut *guard));
        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| FilterError::Timeout {
                    millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })?,
            None => task.await,
        };
        joined.map_err(|err| FilterError::Join(err.to_string()))?
    }

    /// See [`FilterManager::set_active_filter`].
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub async fn set_active_filter(&self, filter: TaskFilter) -> FilterResult<()> {
        self.run(move |manager| manager.set_active_filter(filter)).await
    }

    /// See [`FilterManager::activate`].
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub async fn activate(&self, title: impl Into<String>) -> FilterResult<()> {
        let title = title.into();
        self.run(move |manager| manager.activate(&title)).await
    }

    /// See [`FilterManager::refresh`].
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub async fn refresh(&self) -> FilterResult<()> {
        self.run(FilterManager::refresh).await
    }

    /// See [`FilterManager::handle_task_event`].
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub async fn handle_task_event(&self, event: TaskEvent) -> FilterResult<()> {
        self.run(move |manager| manager.handle_task_event(&event)).await
    }

    /// See [`FilterManager::handle_undo_event`].
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub async fn handle_undo_event(&self, event: UndoEvent) -> FilterResult<()> {
        self.run(move |manager| manager.handle_undo_event(&event)).await
    }

    /// See [`FilterManager::import_filters`].
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub async fn import_filters(&self, filters: Vec<TaskFilter>) -> FilterResult<()> {
        self.run(move |manager| manager.import_filters(filters)).await
    }
}
