/// A trait for random sources that return random integers.
///
/// This abstraction allows you to plug in a real random source or a mocked
/// random source in tests.
///
/// # Example
/// ```
/// use uexky::RandSource;
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn rand(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedRand.rand(), 1234);
/// ```
pub trait RandSource {
    /// Returns a random integer.
    fn rand(&self) -> u64;

    /// Returns a random integer in `0..bound`, or `0` when `bound` is zero.
    fn rand_below(&self, bound: u64) -> u64 {
        if bound == 0 { 0 } else { self.rand() % bound }
    }
}
