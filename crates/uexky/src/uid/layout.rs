use core::{fmt, time::Duration};
use std::time::SystemTime;

use crate::{Error, Result, UEXKY_EPOCH};

/// Number of bits holding the timestamp (seconds since [`UEXKY_EPOCH`]).
pub const TIMESTAMP_BITS: u32 = 35;
/// Number of bits holding the worker id.
pub const WORKER_ID_BITS: u32 = 9;
/// Number of bits holding the per-second sequence.
pub const SEQUENCE_BITS: u32 = 10;
/// Number of bits holding per-ID randomness.
pub const RANDOM_BITS: u32 = 9;

const RANDOM_SHIFT: u32 = 0;
const SEQUENCE_SHIFT: u32 = RANDOM_SHIFT + RANDOM_BITS;
const WORKER_ID_SHIFT: u32 = SEQUENCE_SHIFT + SEQUENCE_BITS;
const TIMESTAMP_SHIFT: u32 = WORKER_ID_SHIFT + WORKER_ID_BITS;

const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;
const WORKER_ID_MASK: u64 = (1 << WORKER_ID_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const RANDOM_MASK: u64 = (1 << RANDOM_BITS) - 1;

/// Exclusive upper bound of the worker id field; leased counters are reduced
/// modulo this value.
pub const WORKER_ID_BOUND: u64 = WORKER_ID_MASK + 1;

/// A time-ordered identifier.
///
/// The storage form is a non-negative 63-bit integer (it always fits a signed
/// `BIGINT` column) laid out high-to-low as:
///
/// ```text
///  Bit Index:  62           28 27       19 18        9 8         0
///              +---------------+-----------+-----------+-----------+
///  Field:      | timestamp (35)| worker (9)| seq (10)  | random (9)|
///              +---------------+-----------+-----------+-----------+
/// ```
///
/// - **timestamp**: whole seconds since [`UEXKY_EPOCH`]
/// - **worker**: leased worker id, `0..512`
/// - **seq**: per-second, per-process counter, `0..1024`
/// - **random**: unpredictability bits, `0..512`
///
/// Ordering of `Uid` values is numeric, i.e. storage order. The display form
/// (see [`Uid::to_display`]) is deliberately *not* order-preserving.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid {
    id: u64,
}

impl Uid {
    /// Smallest storage integer accepted as an identifier. Anything below it
    /// would encode to fewer than four display symbols.
    pub const MIN_RAW: u64 = 1 << 18;
    /// Largest storage integer accepted as an identifier.
    pub const MAX_RAW: u64 = (1 << (TIMESTAMP_BITS + TIMESTAMP_SHIFT)) - 1;

    /// Builds an identifier from a storage integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] when `raw` is outside
    /// [`Uid::MIN_RAW`]`..=`[`Uid::MAX_RAW`].
    pub fn from_raw(raw: u64) -> Result<Self> {
        if (Self::MIN_RAW..=Self::MAX_RAW).contains(&raw) {
            Ok(Self { id: raw })
        } else {
            Err(Error::invalid_identifier(raw.to_string()))
        }
    }

    /// Builds an identifier from a relational `BIGINT` column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] for negative or out-of-range
    /// values.
    pub fn from_i64(raw: i64) -> Result<Self> {
        u64::try_from(raw)
            .map_err(|_| Error::invalid_identifier(raw.to_string()))
            .and_then(Self::from_raw)
    }

    /// Packs the four fields into an identifier. Each component is masked to
    /// its field width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] when the packed value is below
    /// [`Uid::MIN_RAW`] (only possible with a zero timestamp).
    pub fn from_components(timestamp: u64, worker_id: u16, sequence: u16, random: u16) -> Result<Self> {
        let raw = ((timestamp & TIMESTAMP_MASK) << TIMESTAMP_SHIFT)
            | ((u64::from(worker_id) & WORKER_ID_MASK) << WORKER_ID_SHIFT)
            | ((u64::from(sequence) & SEQUENCE_MASK) << SEQUENCE_SHIFT)
            | ((u64::from(random) & RANDOM_MASK) << RANDOM_SHIFT);
        Self::from_raw(raw)
    }

    /// Returns the storage integer.
    pub const fn to_raw(self) -> u64 {
        self.id
    }

    /// Returns the storage integer as a signed `BIGINT` value. Lossless, the
    /// top bit is never set.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_i64(self) -> i64 {
        self.id as i64
    }

    /// Seconds since [`UEXKY_EPOCH`].
    pub const fn timestamp(self) -> u64 {
        (self.id >> TIMESTAMP_SHIFT) & TIMESTAMP_MASK
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn worker_id(self) -> u16 {
        ((self.id >> WORKER_ID_SHIFT) & WORKER_ID_MASK) as u16
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn sequence(self) -> u16 {
        ((self.id >> SEQUENCE_SHIFT) & SEQUENCE_MASK) as u16
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn random(self) -> u16 {
        ((self.id >> RANDOM_SHIFT) & RANDOM_MASK) as u16
    }

    /// Wall-clock second at which the identifier was generated.
    pub fn created_at(self) -> SystemTime {
        SystemTime::UNIX_EPOCH + UEXKY_EPOCH + Duration::from_secs(self.timestamp())
    }

    pub const fn max_timestamp() -> u64 {
        TIMESTAMP_MASK
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_worker_id() -> u16 {
        WORKER_ID_MASK as u16
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_sequence() -> u16 {
        SEQUENCE_MASK as u16
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_random() -> u16 {
        RANDOM_MASK as u16
    }
}

impl fmt::Display for Uid {
    /// Writes the display form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uid")
            .field("storage", &self.id)
            .field("display", &self.to_display())
            .field("timestamp", &self.timestamp())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .field("random", &self.random())
            .finish()
    }
}

impl From<Uid> for u64 {
    fn from(uid: Uid) -> Self {
        uid.to_raw()
    }
}

impl From<Uid> for i64 {
    fn from(uid: Uid) -> Self {
        uid.to_i64()
    }
}

impl TryFrom<u64> for Uid {
    type Error = Error;

    fn try_from(raw: u64) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl TryFrom<i64> for Uid {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        Self::from_i64(raw)
    }
}
