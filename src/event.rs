//! Change notification for columns and tables.
//!
//! Listeners are plain closures kept in an explicit observer list and are
//! invoked synchronously, on the writer's call stack, before the mutating
//! call returns. A listener only ever sees `&Event`: the column or table that
//! fired it is mutably borrowed for the whole dispatch, so a listener cannot
//! re-enter a mutating call on it. Listeners that need to react with further
//! writes should queue the events (see [`EventLog`]) and apply them after the
//! triggering call has returned.

use crate::value::Value;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Handle returned on listener registration, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A cell of a column changed value.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnEvent {
    /// Row whose value changed.
    pub row: usize,
    /// Value held by the cell before the change.
    pub previous: Value,
}

/// Structural or value change on a table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// A row became valid, either appended or reusing a deleted slot.
    Inserted { row: usize },
    /// A row was deleted. Fired before the row's tuple is retired.
    Deleted { row: usize },
    /// A cell changed value.
    Updated {
        column: usize,
        field: String,
        row: usize,
        previous: Value,
    },
}

impl TableEvent {
    pub fn row(&self) -> usize {
        match self {
            TableEvent::Inserted { row }
            | TableEvent::Deleted { row }
            | TableEvent::Updated { row, .. } => *row,
        }
    }
}

type Callback<E> = Box<dyn FnMut(&E) + Send + Sync>;

/// Ordered list of listeners for events of type `E`.
pub struct Listeners<E> {
    next_id: u64,
    entries: Vec<(ListenerId, Callback<E>)>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register a listener. Listeners fire in registration order.
    pub fn add<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        log::trace!("registered listener {:?}", id);
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn fire(&mut self, event: &E) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// Shared queue of events, fed by a listener obtained from [`EventLog::listener`].
///
/// Useful for deferring reactions until after the mutating call returns, and
/// for observing notifications in tests.
#[derive(Debug)]
pub struct EventLog<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E: Clone + Send + 'static> EventLog<E> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A listener closure that appends every event it receives to this log.
    pub fn listener(&self) -> impl FnMut(&E) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |event: &E| events.lock().push(event.clone())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of the recorded events, oldest first.
    pub fn snapshot(&self) -> Vec<E> {
        self.events.lock().clone()
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain(&self) -> Vec<E> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl<E: Clone + Send + 'static> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventLog<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}
