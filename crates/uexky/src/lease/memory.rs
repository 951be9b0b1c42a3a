use core::future::{Future, ready};
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{Result, WorkerIdStore};

/// An in-process [`WorkerIdStore`].
///
/// Clones share the same counter, which makes this store suitable for tests
/// and for running several generators inside one process. It provides no
/// uniqueness across processes.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkerIdStore {
    count: Arc<AtomicU64>,
}

impl MemoryWorkerIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose next increment returns `count + 1`.
    pub fn with_count(count: u64) -> Self {
        Self {
            count: Arc::new(AtomicU64::new(count)),
        }
    }

    /// Current counter value.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }
}

impl WorkerIdStore for MemoryWorkerIdStore {
    fn increment(&self) -> impl Future<Output = Result<u64>> + Send {
        ready(Ok(self.count.fetch_add(1, Ordering::AcqRel).wrapping_add(1)))
    }
}
