use core::time::Duration;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::time::{TimeSource, UEXKY_EPOCH};

/// A monotonic time source offset from a user-defined epoch.
///
/// The wall clock is read exactly once, at construction, to compute the
/// offset between the epoch and "now". Afterwards time advances with
/// [`Instant`], so NTP steps or manual clock changes never move the reported
/// time backwards.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`UEXKY_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(UEXKY_EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin.
    ///
    /// A system clock earlier than `epoch` is clamped to the epoch itself.
    ///
    /// # Example
    ///
    /// ```
    /// use uexky::{MonotonicClock, TimeSource, UEXKY_EPOCH};
    ///
    /// let clock = MonotonicClock::with_epoch(UEXKY_EPOCH);
    /// let before = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(2));
    /// assert!(clock.current_millis() >= before + 2);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Self {
        let system_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        let offset = system_now.saturating_sub(epoch).as_millis();

        Self {
            start: Instant::now(),
            epoch_offset: u64::try_from(offset).unwrap_or(u64::MAX),
        }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        let elapsed = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.epoch_offset.saturating_add(elapsed)
    }
}
