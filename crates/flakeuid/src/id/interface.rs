use core::{fmt, hash::Hash, time::Duration};

/// A packed 64-bit identifier made of a timestamp, a machine id and a
/// per-tick sequence.
///
/// The field order inside the integer is a property of the layout; callers
/// only ever go through the accessors below. Layouts are declared with
/// [`define_flake_id!`], which checks at compile time that the fields cover
/// all 64 bits.
///
/// # Example
///
/// ```
/// use flakeuid::{FlakeId, SnowflakeUid};
///
/// let id = SnowflakeUid::from_components(1000, 5, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.machine_id(), 5);
/// assert_eq!(id.sequence(), 1);
/// ```
///
/// [`define_flake_id!`]: crate::define_flake_id
pub trait FlakeId:
    Copy + Clone + fmt::Display + fmt::Debug + PartialOrd + Ord + PartialEq + Eq + Hash + Send + Sync
{
    /// Length of one timestamp tick.
    const TICK: Duration;

    /// Width of the timestamp field.
    const TIMESTAMP_BITS: u32;

    /// Width of the machine id field.
    const MACHINE_ID_BITS: u32;

    /// Width of the sequence field.
    const SEQUENCE_BITS: u32;

    /// Returns the timestamp portion of the ID, in ticks since the epoch.
    fn timestamp(&self) -> u64;

    /// Returns the machine ID portion of the ID.
    fn machine_id(&self) -> u64;

    /// Returns the sequence portion of the ID.
    fn sequence(&self) -> u64;

    /// Returns the maximum possible value for the timestamp field.
    fn max_timestamp() -> u64;

    /// Returns the maximum possible value for the machine_id field.
    fn max_machine_id() -> u64;

    /// Returns the maximum possible value for the sequence field.
    fn max_sequence() -> u64;

    /// Constructs a new ID from its components.
    fn from_components(timestamp: u64, machine_id: u64, sequence: u64) -> Self;

    /// Converts this type into its raw integer.
    fn to_raw(&self) -> u64;

    /// Converts a raw integer into this type without validation.
    fn from_raw(raw: u64) -> Self;

    /// Returns `true` if no reserved bit is set.
    fn is_valid(&self) -> bool;

    /// Returns true if the current sequence value can be incremented.
    fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::max_sequence()
    }

    /// Returns the next sequence value.
    fn next_sequence(&self) -> u64 {
        self.sequence() + 1
    }

    /// Returns a new ID with the sequence incremented.
    fn increment_sequence(&self) -> Self {
        Self::from_components(self.timestamp(), self.machine_id(), self.next_sequence())
    }

    /// Returns a new ID for a newer timestamp with sequence reset to zero.
    fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_components(ts, self.machine_id(), 0)
    }

    /// Returns the ID as a zero-padded 20-digit string, which sorts
    /// lexicographically in the same order as the integer.
    fn to_padded_string(&self) -> String {
        format!("{:020}", self.to_raw())
    }
}
