use crate::{FlakeId, Poll, Result, SequenceState, TimeSource};

/// A minimal interface for generating flake IDs.
pub trait FlakeGenerator<ID, T>
where
    ID: FlakeId,
    T: TimeSource,
{
    /// Creates a new generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMachineId`] if `machine_id` does not fit the
    /// layout.
    ///
    /// [`Error::InvalidMachineId`]: crate::Error::InvalidMachineId
    fn new(machine_id: u64, time: T) -> Result<Self>
    where
        Self: Sized;

    /// Makes one generation attempt without waiting.
    ///
    /// # Errors
    ///
    /// Fails on clock regression or timestamp overflow.
    fn try_poll_id(&self) -> Result<Poll<ID>>;

    /// Generates the next ID, waiting for the next tick if the current one
    /// is exhausted.
    ///
    /// # Errors
    ///
    /// Fails on clock regression, timestamp overflow, or when the wait
    /// exceeds the generator's bound.
    fn try_next_id(&self) -> Result<ID>;

    /// Returns the current `(last_tick, sequence)` pair.
    fn state(&self) -> SequenceState;
}
