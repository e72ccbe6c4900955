use core::time::Duration;
use std::sync::Arc;

/// Snowflake epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const SNOWFLAKE_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Sonyflake epoch: Monday, September 1, 2014 00:00:00 UTC
pub const SONYFLAKE_EPOCH: Duration = Duration::from_millis(1_409_529_600_000);

/// A source of the current time, expressed in whole ticks since an epoch.
///
/// The tick length belongs to the implementation: a source feeding a
/// [`SnowflakeUid`] generator counts milliseconds, one feeding a
/// [`SonyflakeUid`] generator counts 10 ms units. Sources may go backwards;
/// generators detect that and refuse to emit.
///
/// # Example
///
/// ```
/// use flakeuid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_ticks(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_ticks(), 1234);
/// ```
///
/// [`SnowflakeUid`]: crate::SnowflakeUid
/// [`SonyflakeUid`]: crate::SonyflakeUid
pub trait TimeSource {
    /// Returns the number of ticks elapsed since the configured epoch.
    fn current_ticks(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_ticks(&self) -> u64 {
        (**self).current_ticks()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_ticks(&self) -> u64 {
        (**self).current_ticks()
    }
}
