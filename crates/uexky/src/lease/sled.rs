use core::future::Future;

use crate::{Error, Result, WorkerIdStore};

/// A [`WorkerIdStore`] persisted in a [`sled`] tree.
///
/// Each cohort owns one key in the `worker_id` tree holding a big-endian
/// `u64`. The increment is a single `update_and_fetch`, and the tree is
/// flushed before the new value is handed out, so a restarted process never
/// sees a count it already used.
#[derive(Clone, Debug)]
pub struct SledWorkerIdStore {
    tree: sled::Tree,
    key: Vec<u8>,
}

impl SledWorkerIdStore {
    /// Name of the tree holding every cohort counter.
    pub const TREE: &'static str = "worker_id";

    /// Opens the counter for `cohort` in `db`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Params`] for an empty cohort name, or
    /// [`Error::Internal`] if the tree cannot be opened.
    pub fn open(db: &sled::Db, cohort: &str) -> Result<Self> {
        if cohort.is_empty() {
            return Err(Error::params("worker cohort name must not be empty"));
        }
        Ok(Self {
            tree: db.open_tree(Self::TREE)?,
            key: cohort.as_bytes().to_vec(),
        })
    }

    /// Current counter value, `0` if the cohort has never acquired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] on storage failure.
    pub fn count(&self) -> Result<u64> {
        Ok(self.tree.get(&self.key)?.as_deref().map_or(0, decode_count))
    }
}

fn decode_count(bytes: &[u8]) -> u64 {
    <[u8; 8]>::try_from(bytes).map_or(0, u64::from_be_bytes)
}

impl WorkerIdStore for SledWorkerIdStore {
    fn increment(&self) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let updated = self.tree.update_and_fetch(&self.key, |old| {
                let next = old.map_or(0, decode_count).wrapping_add(1);
                Some(next.to_be_bytes().to_vec())
            })?;
            self.tree.flush_async().await?;

            #[cfg(feature = "tracing")]
            tracing::debug!(cohort = ?String::from_utf8_lossy(&self.key), "worker id counter incremented");

            updated
                .as_deref()
                .map(decode_count)
                .ok_or_else(|| Error::internal("worker id counter missing after update"))
        }
    }
}
