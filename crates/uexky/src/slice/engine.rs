#[cfg(feature = "tracing")]
use tracing::instrument;

use super::query::Anchor;
use crate::{CursorCodec, Order, Result, Scan, SliceQuery, SliceSource, UidCursor};

/// Per-call configuration of [`find_slice`].
#[derive(Clone, Debug)]
pub struct SliceOptions<F, C = UidCursor> {
    /// Base filter handed to the source with every scan.
    pub filter: F,
    /// Display order of the returned items: newest first when `true`.
    pub desc: bool,
    pub codec: C,
}

impl<F> SliceOptions<F> {
    /// Ascending pages over a [`Uid`](crate::Uid)-keyed source.
    pub const fn new(filter: F) -> Self {
        Self {
            filter,
            desc: false,
            codec: UidCursor,
        }
    }
}

impl<F, C> SliceOptions<F, C> {
    #[must_use]
    pub fn desc(mut self) -> Self {
        self.desc = true;
        self
    }

    pub fn with_codec<D>(self, codec: D) -> SliceOptions<F, D> {
        SliceOptions {
            filter: self.filter,
            desc: self.desc,
            codec,
        }
    }

    const fn display_order(&self) -> Order {
        if self.desc { Order::Desc } else { Order::Asc }
    }
}

/// Pagination metadata of a [`Slice`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(::serde::Serialize, ::serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SliceInfo {
    /// Cursor of the first item, empty when there are no items.
    pub first_cursor: String,
    /// Cursor of the last item, empty when there are no items.
    pub last_cursor: String,
    /// Whether more matching rows exist beyond the page in the requested
    /// direction.
    pub has_next: bool,
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(::serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Slice<T> {
    pub items: Vec<T>,
    pub slice_info: SliceInfo,
}

impl<T> Slice<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            slice_info: SliceInfo::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fetches one page of `source` around the query's cursor.
///
/// The source is scanned once, starting strictly beyond the cursor and
/// moving away from it, for `limit + 1` rows. The extra row only signals
/// [`SliceInfo::has_next`] and is never returned. Paging `after` a cursor
/// scans in display order; paging `before` one scans against it, and the
/// page is reversed before mapping so items always come back in display
/// order. Cursors are taken from the keys of the first and last item.
///
/// ```
/// # #[cfg(feature = "async-tokio")]
/// # tokio_test();
/// # #[cfg(feature = "async-tokio")]
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// use uexky::{MemoryStore, SliceOptions, SliceQuery, Uid, find_slice};
///
/// let store = MemoryStore::new();
/// for ts in 1..=5 {
///     let id = Uid::from_components(ts, 1, 0, 0).unwrap();
///     store.insert(id, ts);
/// }
///
/// let options = SliceOptions::new(|_: &u64| true).desc();
/// let page = find_slice(&SliceQuery::after("", 2), &store, &options, Ok)
///     .await
///     .unwrap();
/// assert_eq!(page.items, vec![5, 4]);
/// assert!(page.slice_info.has_next);
///
/// let next = SliceQuery::after(page.slice_info.last_cursor, 2);
/// let page = find_slice(&next, &store, &options, Ok).await.unwrap();
/// assert_eq!(page.items, vec![3, 2]);
/// # }
/// ```
///
/// # Errors
///
/// - [`Error::Params`](crate::Error::Params) if the query is invalid or its
///   cursor cannot be parsed. The source is not touched.
/// - Any error returned by the source scan or by `make`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip_all, fields(limit = query.limit, desc = options.desc))
)]
pub async fn find_slice<S, F, C, T, M>(
    query: &SliceQuery,
    source: &S,
    options: &SliceOptions<F, C>,
    make: M,
) -> Result<Slice<T>>
where
    S: SliceSource<F>,
    C: CursorCodec<Key = S::Key>,
    M: FnMut(S::Row) -> Result<T>,
{
    let (anchor, limit) = query.validate()?;
    let display_order = options.display_order();
    let (cursor, scan_order) = match anchor {
        Anchor::After(cursor) => (cursor, display_order),
        Anchor::Before(cursor) => (cursor, display_order.reverse()),
    };
    let start_after = match cursor {
        "" => None,
        cursor => Some(options.codec.parse(cursor)?),
    };

    let scan = Scan {
        start_after,
        order: scan_order,
        limit: limit.saturating_add(1),
    };
    let mut rows = source.scan(&options.filter, scan).await?;

    #[cfg(feature = "tracing")]
    tracing::trace!(fetched = rows.len(), ?scan_order, "slice scan finished");

    let has_next = rows.len() > limit;
    rows.truncate(limit);
    if scan_order != display_order {
        rows.reverse();
    }

    let slice_info = match (rows.first(), rows.last()) {
        (Some((first, _)), Some((last, _))) => SliceInfo {
            first_cursor: options.codec.to_cursor(first),
            last_cursor: options.codec.to_cursor(last),
            has_next,
        },
        _ => SliceInfo::default(),
    };
    let items = rows
        .into_iter()
        .map(|(_, row)| row)
        .map(make)
        .collect::<Result<Vec<_>>>()?;

    Ok(Slice { items, slice_info })
}
