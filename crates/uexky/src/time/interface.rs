use core::time::Duration;

/// Epoch of every [`Uid`](crate::Uid) timestamp: Thursday, March 1, 2018
/// 00:00:00 UTC.
pub const UEXKY_EPOCH: Duration = Duration::from_secs(1_519_862_400);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in a real system clock, a monotonic
/// timer, or a mocked time source in tests.
///
/// The unit is **milliseconds** relative to the source's epoch. Generators
/// only keep second resolution, the extra precision is used to compute how
/// long to back off until the next second boundary.
///
/// # Example
///
/// ```
/// use uexky::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// assert_eq!(FixedTime.current_secs(), 1);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;

    /// Returns the current time in whole seconds since the configured epoch.
    fn current_secs(&self) -> u64 {
        self.current_millis() / 1000
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
