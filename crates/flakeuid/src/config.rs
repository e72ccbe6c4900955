//! Start-up configuration for [`UidFacade`].
//!
//! The settings are plain data: a host fills them from CLI flags, the
//! environment, or a config file, and hands them to the facade once. Missing
//! values are only reported when the facade is built, so a partially filled
//! config can be passed around and layered.
//!
//! [`UidFacade`]: crate::UidFacade

use core::{fmt, str::FromStr, time::Duration};

use chrono::DateTime;

use crate::{
    DEFAULT_MAX_WAIT, Error, FlakeId, Result, SNOWFLAKE_EPOCH, SONYFLAKE_EPOCH, SnowflakeUid,
    SonyflakeUid,
};

/// The id algorithm a process runs with. Chosen once at start-up.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// [`SnowflakeUid`]: 1 ms ticks, 10-bit machine id, 12-bit sequence.
    Snowflake,
    /// [`SonyflakeUid`]: 10 ms ticks, 16-bit machine id, 8-bit sequence.
    Sonyflake,
}

impl Algorithm {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Snowflake => "snowflake",
            Self::Sonyflake => "sonyflake",
        }
    }

    /// The epoch used when none is configured explicitly.
    pub const fn default_epoch(self) -> Duration {
        match self {
            Self::Snowflake => SNOWFLAKE_EPOCH,
            Self::Sonyflake => SONYFLAKE_EPOCH,
        }
    }

    pub const fn tick(self) -> Duration {
        match self {
            Self::Snowflake => SnowflakeUid::TICK,
            Self::Sonyflake => SonyflakeUid::TICK,
        }
    }

    pub fn max_machine_id(self) -> u64 {
        match self {
            Self::Snowflake => SnowflakeUid::max_machine_id(),
            Self::Sonyflake => SonyflakeUid::max_machine_id(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowflake" => Ok(Self::Snowflake),
            "sonyflake" => Ok(Self::Sonyflake),
            other => Err(Error::config(format!(
                "unknown algorithm {other:?}, expected `snowflake` or `sonyflake`"
            ))),
        }
    }
}

/// Settings for building a [`UidFacade`](crate::UidFacade).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UidConfig {
    /// Which layout to generate. Required.
    pub algorithm: Option<Algorithm>,
    /// Reference instant as a duration since the Unix epoch. Required.
    #[cfg_attr(feature = "serde", serde(with = "epoch_repr"))]
    pub epoch: Option<Duration>,
    /// Machine id embedded in every id. Required.
    pub machine_id: Option<u64>,
    /// Bound on the wait for the next tick once a tick's sequence is spent.
    #[cfg_attr(feature = "serde", serde(rename = "max_wait_ms", with = "millis"))]
    pub max_wait: Duration,
    /// Last tick persisted by a previous run. The generator will not emit
    /// ids until its clock is past this tick.
    pub resume_tick: Option<u64>,
}

impl Default for UidConfig {
    fn default() -> Self {
        Self {
            algorithm: None,
            epoch: None,
            machine_id: None,
            max_wait: DEFAULT_MAX_WAIT,
            resume_tick: None,
        }
    }
}

impl UidConfig {
    pub fn builder() -> UidConfigBuilder {
        UidConfigBuilder::default()
    }
}

/// Builder for [`UidConfig`].
///
/// # Example
///
/// ```
/// use flakeuid::{Algorithm, UidConfig, config::parse_epoch};
///
/// let config = UidConfig::builder()
///     .algorithm(Algorithm::Snowflake)
///     .epoch(parse_epoch("2020-01-01T00:00:00Z").unwrap())
///     .machine_id(5)
///     .build();
/// assert_eq!(config.machine_id, Some(5));
/// ```
#[derive(Clone, Debug, Default)]
pub struct UidConfigBuilder {
    config: UidConfig,
}

impl UidConfigBuilder {
    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = Some(algorithm);
        self
    }

    #[must_use]
    pub fn epoch(mut self, epoch: Duration) -> Self {
        self.config.epoch = Some(epoch);
        self
    }

    #[must_use]
    pub fn machine_id(mut self, machine_id: u64) -> Self {
        self.config.machine_id = Some(machine_id);
        self
    }

    #[must_use]
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.config.max_wait = max_wait;
        self
    }

    #[must_use]
    pub fn resume_tick(mut self, tick: u64) -> Self {
        self.config.resume_tick = Some(tick);
        self
    }

    pub fn build(self) -> UidConfig {
        self.config
    }
}

/// Parses an epoch given either as integer Unix milliseconds or as an RFC 3339
/// timestamp.
///
/// # Errors
///
/// Returns [`Error::Configuration`] for anything else, including instants
/// before 1970.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use flakeuid::config::parse_epoch;
///
/// let a = parse_epoch("2020-01-01T00:00:00Z").unwrap();
/// let b = parse_epoch("1577836800000").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a, Duration::from_millis(1_577_836_800_000));
/// ```
pub fn parse_epoch(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| Error::config(format!("invalid epoch {raw:?}: {e}")));
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| Error::config(format!("invalid epoch {raw:?}: {e}")))?;
    u64::try_from(parsed.timestamp_millis())
        .map(Duration::from_millis)
        .map_err(|_| Error::config(format!("epoch {raw:?} is before 1970-01-01")))
}

#[cfg(feature = "serde")]
mod epoch_repr {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(epoch: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match epoch {
            Some(epoch) => s.serialize_some(&(epoch.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Millis(ms)) => Ok(Some(Duration::from_millis(ms))),
            Some(Raw::Text(text)) => super::parse_epoch(&text).map(Some).map_err(D::Error::custom),
        }
    }
}

#[cfg(feature = "serde")]
mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
