use core::future::Future;

use crate::{Error, Result, Uid, UidInput};

/// Sort direction of a scan or of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub const fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// A bounded range scan over a source's sort key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scan<K> {
    /// Exclusive starting key. `None` scans from the edge of the ordering.
    pub start_after: Option<K>,
    pub order: Order,
    /// Maximum number of rows to return.
    pub limit: usize,
}

/// Ordered storage that the slice engine pages through.
///
/// `F` is the source's filter type, applied before the limit: a scan must
/// return at most `scan.limit` rows that match the filter, whose keys lie
/// strictly beyond `scan.start_after` in `scan.order`, sorted in
/// `scan.order`. Each call is expected to be one storage round trip.
pub trait SliceSource<F> {
    type Key;
    type Row;

    /// # Errors
    ///
    /// Storage failures are reported as [`Error::Internal`].
    fn scan(
        &self,
        filter: &F,
        scan: Scan<Self::Key>,
    ) -> impl Future<Output = Result<Vec<(Self::Key, Self::Row)>>> + Send;
}

/// Converts between opaque cursor strings and sort keys.
pub trait CursorCodec {
    type Key;

    /// Parses a non-empty cursor.
    ///
    /// # Errors
    ///
    /// Malformed cursors must be reported as [`Error::Params`].
    fn parse(&self, cursor: &str) -> Result<Self::Key>;

    fn to_cursor(&self, key: &Self::Key) -> String;
}

/// Cursors for sources keyed by [`Uid`], in display form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UidCursor;

impl CursorCodec for UidCursor {
    type Key = Uid;

    fn parse(&self, cursor: &str) -> Result<Uid> {
        Uid::parse(UidInput::Display(cursor))
            .map_err(|_| Error::params(format!("malformed cursor {cursor:?}")))
    }

    fn to_cursor(&self, key: &Uid) -> String {
        key.to_display()
    }
}
