use crate::FlakeId;

/// Snapshot of a generator's mutable state: the tick of the last emitted id
/// and the sequence used within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceState {
    pub last_tick: u64,
    pub sequence: u64,
}

impl SequenceState {
    /// Reads the state encoded in the last emitted id.
    pub fn of<ID: FlakeId>(id: &ID) -> Self {
        Self {
            last_tick: id.timestamp(),
            sequence: id.sequence(),
        }
    }
}
