use core::future::{Future, ready};
use core::marker::PhantomData;
use core::ops::Bound;
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Order, Result, Scan, SliceSource, Uid};

/// A [`SliceSource`] of JSON records in a [`sled`] tree, keyed by [`Uid`].
///
/// Keys are stored as big-endian storage integers, so the tree's byte order
/// is the identifiers' numeric order.
#[derive(Debug)]
pub struct SledRecordStore<V> {
    tree: sled::Tree,
    _record: PhantomData<fn() -> V>,
}

impl<V> Clone for SledRecordStore<V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            _record: PhantomData,
        }
    }
}

impl<V> SledRecordStore<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Opens (or creates) the tree `name` in `db`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the tree cannot be opened.
    pub fn open(db: &sled::Db, name: &str) -> Result<Self> {
        Ok(Self {
            tree: db.open_tree(name)?,
            _record: PhantomData,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::Internal`] on storage or encoding failure.
    pub fn insert(&self, id: Uid, record: &V) -> Result<()> {
        self.tree
            .insert(id.to_raw().to_be_bytes(), serde_json::to_vec(record)?)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::Internal`] on storage or decoding failure.
    pub fn get(&self, id: Uid) -> Result<Option<V>> {
        self.tree
            .get(id.to_raw().to_be_bytes())?
            .map(|value| serde_json::from_slice(&value).map_err(Error::from))
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Flushes pending writes to disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the flush fails.
    pub async fn flush(&self) -> Result<()> {
        self.tree.flush_async().await?;
        Ok(())
    }

    fn scan_tree<P>(&self, filter: &P, scan: &Scan<Uid>) -> Result<Vec<(Uid, V)>>
    where
        P: Fn(&V) -> bool,
    {
        let beyond = scan
            .start_after
            .map_or(Bound::Unbounded, |id| Bound::Excluded(id.to_raw().to_be_bytes()));
        let range = match scan.order {
            Order::Asc => self.tree.range((beyond, Bound::Unbounded)),
            Order::Desc => self.tree.range((Bound::Unbounded, beyond)),
        };
        let entries: Box<dyn Iterator<Item = sled::Result<(sled::IVec, sled::IVec)>>> =
            match scan.order {
                Order::Asc => Box::new(range),
                Order::Desc => Box::new(range.rev()),
            };

        let mut rows = Vec::new();
        for entry in entries {
            if rows.len() >= scan.limit {
                break;
            }
            let (key, value) = entry?;
            let record: V = serde_json::from_slice(&value)?;
            if filter(&record) {
                rows.push((decode_key(&key)?, record));
            }
        }
        Ok(rows)
    }
}

fn decode_key(key: &[u8]) -> Result<Uid> {
    <[u8; 8]>::try_from(key)
        .ok()
        .and_then(|bytes| Uid::from_raw(u64::from_be_bytes(bytes)).ok())
        .ok_or_else(|| Error::internal(format!("corrupt record key {key:?}")))
}

impl<V, P> SliceSource<P> for SledRecordStore<V>
where
    V: Serialize + DeserializeOwned + Send,
    P: Fn(&V) -> bool,
{
    type Key = Uid;
    type Row = V;

    fn scan(&self, filter: &P, scan: Scan<Uid>) -> impl Future<Output = Result<Vec<(Uid, V)>>> + Send {
        ready(self.scan_tree(filter, &scan))
    }
}
