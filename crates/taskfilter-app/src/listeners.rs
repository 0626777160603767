//! Filter-changed subscribers.

use std::fmt;

use taskfilter_core::TaskFilter;

/// Callback invoked with the new active filter.
pub type FilterChangedListener = Box<dyn FnMut(&TaskFilter) + Send>;

/// Handle returned by [`FilterListeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Subscribers notified synchronously, in registration order.
#[derive(Default)]
pub struct FilterListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, FilterChangedListener)>,
}

impl FilterListeners {
    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&TaskFilter) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(entry, _)| *entry != id);
        self.listeners.len() != before
    }

    /// Deliver `filter` to every listener.
    pub fn notify(&mut self, filter: &TaskFilter) {
        for (_, listener) in &mut self.listeners {
            listener(filter);
        }
    }

    /// Number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether nobody listens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for FilterListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}
