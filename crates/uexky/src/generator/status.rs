use core::time::Duration;

use crate::Uid;

/// Outcome of a single, non-blocking generation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdGenStatus {
    /// An identifier was issued.
    Ready { id: Uid },
    /// No identifier can be issued before the given duration has elapsed,
    /// either because the current second's sequence space is exhausted or
    /// because the clock is behind the last issued timestamp.
    Pending { yield_for: Duration },
    /// The generator holds no live worker lease and must acquire one before
    /// it can issue identifiers.
    LeaseRequired,
}
