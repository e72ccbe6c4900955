use core::{cmp::Ordering, time::Duration};
use std::time::Instant;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, FlakeGenerator, FlakeId, Poll, Result, SequenceState, TimeSource, validate_machine_id,
};

/// Default bound on how long [`LockFlakeGenerator::try_next_id`] waits for
/// the clock to leave an exhausted tick.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(1);

/// A lock-based flake ID generator for multi-threaded use.
///
/// The last emitted id doubles as the generator state: its timestamp is the
/// last tick and its sequence the last sequence. The state lives behind a
/// single [`parking_lot::Mutex`], and the clock is read while the lock is
/// held, so ids leave the generator in strictly increasing order no matter
/// how many threads share it.
///
/// ## Recommended When
/// - Several request handlers share one generator
/// - You need a hard error on clock regression rather than a retry
///
/// # Example
/// ```
/// use flakeuid::{LockFlakeGenerator, SONYFLAKE_EPOCH, SonyflakeUid, WallClock};
///
/// let clock = WallClock::for_layout::<SonyflakeUid>(SONYFLAKE_EPOCH).unwrap();
/// let generator = LockFlakeGenerator::<SonyflakeUid, _>::new(7, clock).unwrap();
///
/// let a = generator.try_next_id().unwrap();
/// let b = generator.try_next_id().unwrap();
/// assert!(a < b);
/// ```
pub struct LockFlakeGenerator<ID, T>
where
    ID: FlakeId,
    T: TimeSource,
{
    state: Mutex<ID>,
    time: T,
    max_wait: Duration,
}

impl<ID, T> LockFlakeGenerator<ID, T>
where
    ID: FlakeId,
    T: TimeSource,
{
    /// Creates a generator for `machine_id` with its state at tick zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` does not fit the
    /// layout; no generator is produced.
    pub fn new(machine_id: u64, time: T) -> Result<Self> {
        Self::from_components(0, machine_id, 0, time)
    }

    /// Creates a generator from explicit state.
    ///
    /// Useful for restoring a persisted last tick after a restart: the
    /// generator refuses to emit until the clock reaches `timestamp`, and
    /// the first id at exactly `timestamp` uses `sequence + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` does not fit, or
    /// [`Error::Configuration`] if `timestamp` or `sequence` exceed their
    /// fields.
    pub fn from_components(timestamp: u64, machine_id: u64, sequence: u64, time: T) -> Result<Self> {
        let machine_id = validate_machine_id::<ID>(machine_id)?;
        if timestamp > ID::max_timestamp() {
            return Err(Error::config(format!(
                "initial tick {timestamp} exceeds the layout's maximum {}",
                ID::max_timestamp()
            )));
        }
        if sequence > ID::max_sequence() {
            return Err(Error::config(format!(
                "initial sequence {sequence} exceeds the layout's maximum {}",
                ID::max_sequence()
            )));
        }
        Ok(Self {
            state: Mutex::new(ID::from_components(timestamp, machine_id, sequence)),
            time,
            max_wait: DEFAULT_MAX_WAIT,
        })
    }

    /// Bounds the overflow wait in [`Self::try_next_id`]. A zero bound turns
    /// an exhausted tick into an immediate
    /// [`Error::SequenceOverflowTimeout`].
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub fn machine_id(&self) -> u64 {
        self.state.lock().machine_id()
    }

    /// Returns the `(last_tick, sequence)` pair of the last emitted id.
    pub fn state(&self) -> SequenceState {
        SequenceState::of(&*self.state.lock())
    }

    /// Makes a single generation attempt.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: a new ID was emitted
    /// - `Ok(Poll::Pending { yield_for })`: the current tick is exhausted
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock is behind the last tick
    /// - [`Error::TimestampOverflow`] if the clock is past the layout's range
    ///
    /// Neither error changes the generator state.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        let mut id = self.state.lock();
        let now = self.time.current_ticks();
        Self::advance(&mut id, now)
    }

    /// Generates the next ID.
    ///
    /// When the sequence for the current tick is spent, the lock stays held
    /// while the clock is polled, so no other caller can slip an id in
    /// between. The wait gives up after [`Self::max_wait`].
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock is behind the last tick
    /// - [`Error::SequenceOverflowTimeout`] if the clock does not advance in
    ///   time
    /// - [`Error::TimestampOverflow`] if the clock is past the layout's range
    ///
    /// # Example
    /// ```
    /// use flakeuid::{FlakeId, LockFlakeGenerator, SNOWFLAKE_EPOCH, SnowflakeUid, WallClock};
    ///
    /// let clock = WallClock::for_layout::<SnowflakeUid>(SNOWFLAKE_EPOCH).unwrap();
    /// let generator = LockFlakeGenerator::<SnowflakeUid, _>::new(5, clock).unwrap();
    ///
    /// let id = generator.try_next_id().unwrap();
    /// assert_eq!(id.machine_id(), 5);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<ID> {
        let mut id = self.state.lock();
        let mut started: Option<Instant> = None;

        loop {
            let now = self.time.current_ticks();
            match Self::advance(&mut id, now)? {
                Poll::Ready { id: next } => return Ok(next),
                Poll::Pending { .. } => {
                    let waited = started.get_or_insert_with(Instant::now).elapsed();
                    if waited >= self.max_wait {
                        return Err(Self::cold_overflow_timeout(id.timestamp(), waited));
                    }
                    std::thread::yield_now();
                }
            }
        }
    }

    fn advance(id: &mut ID, now: u64) -> Result<Poll<ID>> {
        let last_tick = id.timestamp();
        match now.cmp(&last_tick) {
            Ordering::Equal => {
                if id.has_sequence_room() {
                    *id = id.increment_sequence();
                    Ok(Poll::Ready { id: *id })
                } else {
                    Ok(Poll::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => {
                if now > ID::max_timestamp() {
                    return Err(Self::cold_timestamp_overflow(now));
                }
                *id = id.rollover_to_timestamp(now);
                Ok(Poll::Ready { id: *id })
            }
            Ordering::Less => Err(Self::cold_clock_behind(now, last_tick)),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last_tick: u64) -> Error {
        let drift = last_tick - now;
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last_tick, drift, "clock moved backwards, refusing to emit");
        Error::ClockRegression {
            now,
            last_tick,
            drift,
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_overflow_timeout(tick: u64, waited: Duration) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(tick, ?waited, "sequence exhausted and clock did not advance");
        Error::SequenceOverflowTimeout { tick, waited }
    }

    #[cold]
    #[inline(never)]
    fn cold_timestamp_overflow(tick: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::error!(tick, "clock is past the layout's timestamp range");
        Error::TimestampOverflow {
            tick,
            max: ID::max_timestamp(),
        }
    }
}

impl<ID, T> FlakeGenerator<ID, T> for LockFlakeGenerator<ID, T>
where
    ID: FlakeId,
    T: TimeSource,
{
    fn new(machine_id: u64, time: T) -> Result<Self> {
        Self::new(machine_id, time)
    }

    fn try_poll_id(&self) -> Result<Poll<ID>> {
        self.try_poll_id()
    }

    fn try_next_id(&self) -> Result<ID> {
        self.try_next_id()
    }

    fn state(&self) -> SequenceState {
        self.state()
    }
}
