use core::time::Duration;

/// Default epoch: Wednesday, January 1, 2020 00:00:00 UTC
///
/// Changing it shifts every timestamp field and breaks the ordering of keys
/// already stored, so it is fixed for the lifetime of a deployment.
pub const FLAKEKEY_EPOCH: Duration = Duration::from_millis(1_577_836_800_000);

/// A trait for time sources that return a wall-clock or monotonic timestamp.
///
/// The unit is **milliseconds** relative to the epoch the source was built
/// with. The generator never reads the system clock directly, which lets
/// tests drive it with a mocked source.
///
/// # Example
///
/// ```
/// use flakekey::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
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
