use core::time::Duration;
use std::sync::Arc;

use chrono::{DateTime, Utc};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Algorithm, Error, FlakeId, LockFlakeGenerator, Result, SequenceState, SnowflakeUid,
    SonyflakeUid, TimeSource, Uid, UidConfig, WallClock,
};

/// Anything that can mint the next identifier.
///
/// This is the one operation storage and API layers depend on. They hold a
/// shared handle to a source and never see the layout behind it.
pub trait UidSource {
    /// Produces a fresh identifier as a base-10 string.
    ///
    /// # Errors
    ///
    /// Propagates the generator's failure; no identifier is produced.
    fn next_identifier(&self) -> Result<String>;

    fn next_uid(&self) -> Result<Uid> {
        self.next_identifier().map(Uid::from)
    }
}

impl<S: UidSource + ?Sized> UidSource for &S {
    fn next_identifier(&self) -> Result<String> {
        (**self).next_identifier()
    }
}

impl<S: UidSource + ?Sized> UidSource for Arc<S> {
    fn next_identifier(&self) -> Result<String> {
        (**self).next_identifier()
    }
}

enum Active<T: TimeSource> {
    Snowflake(LockFlakeGenerator<SnowflakeUid, T>),
    Sonyflake(LockFlakeGenerator<SonyflakeUid, T>),
}

/// Owns the single generator a process runs with.
///
/// The algorithm is fixed when the facade is built and cannot be switched
/// afterwards. Share the facade with `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use flakeuid::{Algorithm, UidConfig, UidFacade, UidSource};
///
/// let config = UidConfig::builder()
///     .algorithm(Algorithm::Snowflake)
///     .epoch(Algorithm::Snowflake.default_epoch())
///     .machine_id(5)
///     .build();
/// let facade = Arc::new(UidFacade::from_config(&config).unwrap());
///
/// let id = facade.next_identifier().unwrap();
/// assert!(id.bytes().all(|b| b.is_ascii_digit()));
/// assert_eq!(facade.decompose_str(&id).unwrap().machine_id, 5);
/// ```
pub struct UidFacade<T: TimeSource = WallClock> {
    algorithm: Algorithm,
    epoch: Duration,
    active: Active<T>,
}

impl UidFacade<WallClock> {
    /// Builds a facade backed by the system wall clock.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if the algorithm, epoch, or machine id is
    ///   missing, or the epoch lies in the future
    /// - [`Error::InvalidMachineId`] if the machine id does not fit the
    ///   selected layout
    pub fn from_config(config: &UidConfig) -> Result<Self> {
        let (algorithm, epoch) = required(config)?;
        let clock = WallClock::new(epoch, algorithm.tick())?;
        Self::with_clock(config, clock)
    }
}

impl<T: TimeSource> UidFacade<T> {
    /// Builds a facade around an explicit time source. The source must count
    /// ticks of the configured algorithm since the configured epoch.
    ///
    /// # Errors
    ///
    /// Same as [`UidFacade::from_config`].
    pub fn with_clock(config: &UidConfig, clock: T) -> Result<Self> {
        let (algorithm, epoch) = required(config)?;
        let machine_id = config
            .machine_id
            .ok_or_else(|| Error::config("machine id is required"))?;

        let active = match algorithm {
            Algorithm::Snowflake => Active::Snowflake(build(config, machine_id, clock)?),
            Algorithm::Sonyflake => Active::Sonyflake(build(config, machine_id, clock)?),
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            %algorithm,
            machine_id,
            epoch_ms = epoch.as_millis() as u64,
            max_wait = ?config.max_wait,
            resume_tick = ?config.resume_tick,
            "uid generator ready"
        );

        Ok(Self {
            algorithm,
            epoch,
            active,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn epoch(&self) -> Duration {
        self.epoch
    }

    pub fn machine_id(&self) -> u64 {
        match &self.active {
            Active::Snowflake(g) => g.machine_id(),
            Active::Sonyflake(g) => g.machine_id(),
        }
    }

    /// `(last_tick, sequence)` of the last emitted id. A host that wants to
    /// survive restarts persists `last_tick` and feeds it back through
    /// [`UidConfig::resume_tick`].
    pub fn state(&self) -> SequenceState {
        match &self.active {
            Active::Snowflake(g) => g.state(),
            Active::Sonyflake(g) => g.state(),
        }
    }

    /// Produces the next id as its packed integer.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock is behind the last tick
    /// - [`Error::SequenceOverflowTimeout`] if the exhausted tick did not end
    ///   within the configured wait
    /// - [`Error::TimestampOverflow`] if the clock ran past the layout
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_raw(&self) -> Result<u64> {
        match &self.active {
            Active::Snowflake(g) => g.try_next_id().map(|id| id.to_raw()),
            Active::Sonyflake(g) => g.try_next_id().map(|id| id.to_raw()),
        }
    }

    /// Produces the next id as a base-10 string.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_raw`].
    pub fn next_identifier(&self) -> Result<String> {
        self.next_raw().map(|raw| raw.to_string())
    }

    pub fn next_uid(&self) -> Result<Uid> {
        self.next_identifier().map(Uid::from)
    }

    /// Splits a packed id into its fields under the active layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUid`] if the reserved high bit is set.
    pub fn decompose(&self, raw: u64) -> Result<Parts> {
        match self.algorithm {
            Algorithm::Snowflake => Parts::of(SnowflakeUid::from_raw(raw), self.epoch),
            Algorithm::Sonyflake => Parts::of(SonyflakeUid::from_raw(raw), self.epoch),
        }
    }

    /// Like [`Self::decompose`] but for the string form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUid`] if `uid` is not a valid decimal id.
    pub fn decompose_str(&self, uid: &str) -> Result<Parts> {
        self.decompose(Uid::from(uid).to_raw()?)
    }
}

impl<T: TimeSource> UidSource for UidFacade<T> {
    fn next_identifier(&self) -> Result<String> {
        Self::next_identifier(self)
    }
}

/// The fields of a decomposed identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parts {
    pub raw: u64,
    /// Ticks since the epoch.
    pub timestamp: u64,
    pub machine_id: u64,
    pub sequence: u64,
    /// Start of the id's tick as a duration since the Unix epoch.
    pub unix_time: Duration,
}

impl Parts {
    fn of<ID: FlakeId>(id: ID, epoch: Duration) -> Result<Self> {
        if !id.is_valid() {
            return Err(Error::InvalidUid(id.to_raw().to_string()));
        }
        let tick_ms = ID::TICK.as_millis() as u64;
        Ok(Self {
            raw: id.to_raw(),
            timestamp: id.timestamp(),
            machine_id: id.machine_id(),
            sequence: id.sequence(),
            unix_time: epoch + Duration::from_millis(id.timestamp() * tick_ms),
        })
    }

    /// The id's tick as a UTC datetime, if representable.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.unix_time.as_millis()).ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

fn required(config: &UidConfig) -> Result<(Algorithm, Duration)> {
    let algorithm = config
        .algorithm
        .ok_or_else(|| Error::config("algorithm selector is required"))?;
    let epoch = config
        .epoch
        .ok_or_else(|| Error::config("epoch is required"))?;
    Ok((algorithm, epoch))
}

fn build<ID, T>(config: &UidConfig, machine_id: u64, clock: T) -> Result<LockFlakeGenerator<ID, T>>
where
    ID: FlakeId,
    T: TimeSource,
{
    let generator = match config.resume_tick {
        // Ids may already exist anywhere in the resumed tick, so mark it spent.
        Some(tick) => LockFlakeGenerator::from_components(tick, machine_id, ID::max_sequence(), clock)?,
        None => LockFlakeGenerator::new(machine_id, clock)?,
    };
    Ok(generator.with_max_wait(config.max_wait))
}
