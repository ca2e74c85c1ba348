//! Per-ISBN write serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Keyed lock table: writers for the same ISBN queue, other ISBNs proceed.
///
/// Entries are created on first use and removed when the last holder or
/// waiter releases them.
#[derive(Debug, Default)]
pub struct IsbnLocks {
    /// Arc lets the shard lock drop before awaiting the inner mutex.
    entries: DashMap<String, Arc<Mutex<()>>>,
}

impl IsbnLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `isbn`.
    pub async fn lock(&self, isbn: &str) -> IsbnGuard<'_> {
        let mutex = Arc::clone(
            self.entries
                .entry(isbn.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let guard = mutex.lock_owned().await;
        debug!(isbn, "acquired isbn write lock");
        IsbnGuard {
            locks: self,
            isbn: isbn.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of ISBNs currently held or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no ISBN is locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Holds an ISBN lock until dropped.
#[derive(Debug)]
pub struct IsbnGuard<'a> {
    locks: &'a IsbnLocks,
    isbn: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IsbnGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the table's own reference left means nobody is waiting.
        self.locks
            .entries
            .remove_if(&self.isbn, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
