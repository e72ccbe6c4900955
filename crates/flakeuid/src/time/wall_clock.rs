use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{Error, FlakeId, Result, TimeSource};

/// A wall-clock time source counting fixed-length ticks since an epoch.
///
/// Every read goes to `SystemTime::now()`, so NTP steps and manual clock
/// changes are visible to the generator, which is what lets it detect a
/// regression instead of silently reusing a tick. Reads taken before the
/// epoch saturate to tick 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    epoch: Duration,
    tick: Duration,
}

impl WallClock {
    /// Creates a clock counting `tick`-long units since `epoch` (a duration
    /// since 1970-01-01 UTC).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `tick` is zero or if `epoch` lies
    /// in the future.
    pub fn new(epoch: Duration, tick: Duration) -> Result<Self> {
        if tick.is_zero() {
            return Err(Error::config("tick length must be non-zero"));
        }
        let now = unix_now();
        if epoch > now {
            return Err(Error::config(format!(
                "epoch {}ms is ahead of the system clock ({}ms)",
                epoch.as_millis(),
                now.as_millis()
            )));
        }
        Ok(Self { epoch, tick })
    }

    /// Creates a clock whose tick matches the layout `ID`.
    ///
    /// # Errors
    ///
    /// See [`WallClock::new`].
    ///
    /// # Example
    ///
    /// ```
    /// use flakeuid::{SONYFLAKE_EPOCH, SonyflakeUid, TimeSource, WallClock};
    ///
    /// let clock = WallClock::for_layout::<SonyflakeUid>(SONYFLAKE_EPOCH).unwrap();
    /// assert!(clock.current_ticks() > 0);
    /// ```
    pub fn for_layout<ID: FlakeId>(epoch: Duration) -> Result<Self> {
        Self::new(epoch, ID::TICK)
    }

    pub fn epoch(&self) -> Duration {
        self.epoch
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }
}

impl TimeSource for WallClock {
    fn current_ticks(&self) -> u64 {
        let elapsed = unix_now().saturating_sub(self.epoch);
        u64::try_from(elapsed.as_nanos() / self.tick.as_nanos()).unwrap_or(u64::MAX)
    }
}

fn unix_now() -> Duration {
    // A system clock set before 1970 reads as the Unix epoch itself.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}
