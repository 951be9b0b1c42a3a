use core::future::{Future, ready};
use core::ops::Bound;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{Order, Result, Scan, SliceSource};

/// An ordered in-memory [`SliceSource`].
///
/// Clones share the same rows. The filter is any `Fn(&V) -> bool`, applied
/// during the scan so that the limit counts matching rows only.
#[derive(Debug)]
pub struct MemoryStore<K, V> {
    rows: Arc<RwLock<BTreeMap<K, V>>>,
}

impl<K, V> Clone for MemoryStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<K, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<K: Ord, V> MemoryStore<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row, returning the one previously stored under `key`.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.rows.write().insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.rows.write().remove(key)
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.rows.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl<K, V, P> SliceSource<P> for MemoryStore<K, V>
where
    K: Ord + Clone + Send,
    V: Clone + Send,
    P: Fn(&V) -> bool,
{
    type Key = K;
    type Row = V;

    fn scan(&self, filter: &P, scan: Scan<K>) -> impl Future<Output = Result<Vec<(K, V)>>> + Send {
        let rows = self.rows.read();
        let beyond = scan.start_after.as_ref().map_or(Bound::Unbounded, Bound::Excluded);
        let matched = match scan.order {
            Order::Asc => take_matching(rows.range::<K, _>((beyond, Bound::Unbounded)), filter, scan.limit),
            Order::Desc => {
                take_matching(rows.range::<K, _>((Bound::Unbounded, beyond)).rev(), filter, scan.limit)
            }
        };
        ready(Ok(matched))
    }
}

fn take_matching<'a, K, V, P>(
    rows: impl Iterator<Item = (&'a K, &'a V)>,
    filter: &P,
    limit: usize,
) -> Vec<(K, V)>
where
    K: Clone + 'a,
    V: Clone + 'a,
    P: Fn(&V) -> bool,
{
    rows.filter(|(_, value)| filter(value))
        .take(limit)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
