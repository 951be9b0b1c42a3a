use core::future::Future;

use crate::{Result, WORKER_ID_BOUND};

/// A shared, atomically incremented counter from which generators derive
/// their worker id.
///
/// Implementations back one counter per generator cohort (a named row or
/// document) and must make the increment-and-read a single atomic operation
/// of the underlying store, so that concurrent callers, in this process or
/// in others, never observe the same count.
pub trait WorkerIdStore {
    /// Atomically increments the cohort counter and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`](crate::Error::Internal) if the store is
    /// unreachable or the update fails.
    fn increment(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Increments the counter and reduces the result to a bounded worker id.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`WorkerIdStore::increment`].
    fn acquire(&self) -> impl Future<Output = Result<u16>> + Send
    where
        Self: Sync,
    {
        async move {
            let count = self.increment().await?;
            Ok(bounded_worker_id(count))
        }
    }
}

/// Reduces a raw counter value to the worker id field's range.
#[allow(clippy::cast_possible_truncation)]
pub const fn bounded_worker_id(count: u64) -> u16 {
    (count % WORKER_ID_BOUND) as u16
}

/// A generator's claim on a worker slot.
///
/// Leases are never released; they simply stop being used once
/// [`WorkerLease::expires_at`] passes and the generator re-increments the
/// shared counter. Two processes can end up under the same worker id when
/// the counter wraps around [`WORKER_ID_BOUND`] while both are live. The
/// sequence and random fields keep an exact collision unlikely, not
/// impossible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkerLease {
    worker_id: u16,
    acquired_at: u64,
    expires_at: u64,
}

impl WorkerLease {
    /// Creates a lease acquired at `acquired_at` (seconds since the
    /// generator's epoch) and valid for `ttl_secs`.
    pub const fn new(worker_id: u16, acquired_at: u64, ttl_secs: u64) -> Self {
        Self {
            worker_id,
            acquired_at,
            expires_at: acquired_at.saturating_add(ttl_secs),
        }
    }

    pub const fn worker_id(&self) -> u16 {
        self.worker_id
    }

    pub const fn acquired_at(&self) -> u64 {
        self.acquired_at
    }

    pub const fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Returns `true` while `now` is before the expiry second.
    pub const fn is_live(&self, now: u64) -> bool {
        now < self.expires_at
    }
}
