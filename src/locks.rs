//! Per-record mutual exclusion for read-modify-write sequences.
//!
//! Every lifecycle mutation reads current membership, decides eligibility,
//! and writes back; the registry hands out one async mutex per record id so
//! those sequences serialize. Lock order is total: game lock first, then
//! (when the group cap is checked) the user lock; pairwise acquisition goes
//! in ascending id order.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Keyed registry of `Arc<Mutex<()>>` entries
pub struct LockRegistry {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for one record id, creating it on first use
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Acquire two record locks in ascending id order, so concurrent pair
    /// acquisitions cannot deadlock
    pub async fn acquire_pair(&self, a: Uuid, b: Uuid) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b);
        if a < b {
            let first = self.acquire(a).await;
            let second = self.acquire(b).await;
            (first, second)
        } else {
            let first = self.acquire(b).await;
            let second = self.acquire(a).await;
            (second, first)
        }
    }

    /// Drop the entry for a deleted record
    pub fn discard(&self, id: Uuid) {
        self.locks.remove(&id);
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
