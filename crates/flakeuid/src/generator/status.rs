use crate::FlakeId;

/// The outcome of a single, non-blocking generation attempt.
///
/// - [`Poll::Ready`] carries a freshly generated id.
/// - [`Poll::Pending`] means the sequence for the current tick is spent;
///   retry once `yield_for` more ticks have elapsed.
///
/// # Example
///
/// ```
/// use flakeuid::{FlakeId, LockFlakeGenerator, Poll, SnowflakeUid, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_ticks(&self) -> u64 {
///         1
///     }
/// }
///
/// let generator = LockFlakeGenerator::<SnowflakeUid, _>::from_components(
///     1,
///     0,
///     SnowflakeUid::max_sequence(),
///     FixedTime,
/// )
/// .unwrap();
/// match generator.try_poll_id().unwrap() {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_for } => println!("Back off for {yield_for} tick(s)"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<ID: FlakeId> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: ID,
    },
    /// The sequence for the current tick is exhausted.
    Pending {
        /// Number of ticks to wait before trying again.
        yield_for: u64,
    },
}
