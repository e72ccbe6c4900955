//! Errors surfaced by the generators and the facade.
//!
//! Every variant is returned to the immediate caller. Nothing is retried
//! inside the crate beyond the bounded in-tick wait performed by
//! [`LockFlakeGenerator::try_next_id`].
//!
//! ## Error Cases
//! - `ClockRegression`: the clock reported a tick older than the last one
//!   used. No id is emitted and the generator state is left untouched.
//! - `SequenceOverflowTimeout`: the sequence for the current tick was spent
//!   and the clock did not advance before the configured bound.
//! - `TimestampOverflow`: the clock is past what the layout's timestamp
//!   field can hold.
//! - `InvalidMachineId`: the machine id does not fit the layout.
//! - `Configuration`: a required setting was missing or malformed.
//! - `InvalidUid`: an identifier string is not a base-10 `u64`.
//!
//! [`LockFlakeGenerator::try_next_id`]: crate::generator::LockFlakeGenerator::try_next_id

use core::time::Duration;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeuid` can emit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The clock moved backwards relative to the last emitted tick.
    #[error("clock moved backwards by {drift} tick(s): now {now}, last tick {last_tick}")]
    ClockRegression {
        now: u64,
        last_tick: u64,
        /// `last_tick - now`, in the generator's tick unit.
        drift: u64,
    },

    /// The sequence for `tick` was exhausted and the clock did not advance
    /// within `waited`.
    #[error("sequence exhausted at tick {tick}; clock did not advance within {waited:?}")]
    SequenceOverflowTimeout { tick: u64, waited: Duration },

    /// The clock is beyond the largest timestamp the layout can encode.
    #[error("tick {tick} exceeds the layout's maximum timestamp {max}")]
    TimestampOverflow { tick: u64, max: u64 },

    /// The machine id does not fit in the layout's machine id field.
    #[error("machine id {machine_id} exceeds the layout's maximum {max}")]
    InvalidMachineId { machine_id: u64, max: u64 },

    /// A required setting was missing or could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The string is not a base-10 encoded 64-bit identifier.
    #[error("invalid identifier: {0:?}")]
    InvalidUid(String),
}

impl Error {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }
}
