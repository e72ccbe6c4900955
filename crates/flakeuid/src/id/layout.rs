//! # Packed 64-bit layouts
//!
//! Both built-in layouts reserve the top bit so the value stays positive when
//! stored in a signed 64-bit column. They differ in tick length and in how
//! the remaining 22/24 low bits are split.
//!
//! ```text
//!  SnowflakeUid (1 ms ticks)
//!  Bit Index:  63           63 62            22 21             12 11             0
//!              +--------------+----------------+-----------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | machine ID (10) | sequence (12) |
//!              +--------------+----------------+-----------------+---------------+
//!
//!  SonyflakeUid (10 ms ticks)
//!  Bit Index:  63           63 62            24 23            16 15               0
//!              +--------------+----------------+---------------+-----------------+
//!  Field:      | reserved (1) | timestamp (39) | sequence (8)  | machine ID (16) |
//!              +--------------+----------------+---------------+-----------------+
//! ```

/// Declares a [`FlakeId`] layout over a `u64`.
///
/// Fields are packed from **MSB to LSB** in the order they are written: the
/// reserved bits, then the timestamp, then either `machine_id, sequence` or
/// `sequence, machine_id`. The widths must add up to 64, otherwise a
/// compile-time assertion fails.
///
/// ## Example
///
/// ```
/// use flakeuid::{FlakeId, define_flake_id};
///
/// define_flake_id!(
///     /// 2 ms ticks, 8 machines, 32 ids per tick
///     TinyId,
///     tick_millis: 2,
///     reserved: 1,
///     timestamp: 55,
///     machine_id: 3,
///     sequence: 5
/// );
///
/// let id = TinyId::from_components(7, 3, 31);
/// assert_eq!(id.to_raw(), (7 << 8) | (3 << 5) | 31);
/// ```
///
/// [`FlakeId`]: crate::FlakeId
#[macro_export]
macro_rules! define_flake_id {
    (
        @impl
        $(#[$meta:meta])*
        $name:ident,
        tick_millis: $tick_millis:expr,
        reserved: $reserved_bits:expr,
        timestamp: $timestamp_bits:expr,
        machine_id: $machine_id_bits:expr,
        sequence: $sequence_bits:expr,
        machine_id_shift: $machine_id_shift:expr,
        sequence_shift: $sequence_shift:expr
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            id: u64,
        }

        const _: () = {
            // Every bit must belong to exactly one field.
            assert!(
                $reserved_bits + $timestamp_bits + $machine_id_bits + $sequence_bits == u64::BITS,
                "flake layout must cover exactly 64 bits"
            );
        };

        impl $name {
            pub const RESERVED_BITS: u32 = $reserved_bits;
            pub const TIMESTAMP_BITS: u32 = $timestamp_bits;
            pub const MACHINE_ID_BITS: u32 = $machine_id_bits;
            pub const SEQUENCE_BITS: u32 = $sequence_bits;

            pub const SEQUENCE_SHIFT: u32 = $sequence_shift;
            pub const MACHINE_ID_SHIFT: u32 = $machine_id_shift;
            pub const TIMESTAMP_SHIFT: u32 = Self::MACHINE_ID_BITS + Self::SEQUENCE_BITS;
            pub const RESERVED_SHIFT: u32 = Self::TIMESTAMP_SHIFT + Self::TIMESTAMP_BITS;

            pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
            pub const MACHINE_ID_MASK: u64 = (1 << Self::MACHINE_ID_BITS) - 1;
            pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

            pub const fn from(timestamp: u64, machine_id: u64, sequence: u64) -> Self {
                let t = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
                let m = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
                let s = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
                Self { id: t | m | s }
            }

            /// Extracts the timestamp from the packed ID.
            pub const fn timestamp(&self) -> u64 {
                (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
            }

            /// Extracts the machine ID from the packed ID.
            pub const fn machine_id(&self) -> u64 {
                (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
            }

            /// Extracts the sequence number from the packed ID.
            pub const fn sequence(&self) -> u64 {
                (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
            }

            pub const fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            pub const fn max_machine_id() -> u64 {
                Self::MACHINE_ID_MASK
            }

            pub const fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }
        }

        impl $crate::FlakeId for $name {
            const TICK: core::time::Duration = core::time::Duration::from_millis($tick_millis);
            const TIMESTAMP_BITS: u32 = $timestamp_bits;
            const MACHINE_ID_BITS: u32 = $machine_id_bits;
            const SEQUENCE_BITS: u32 = $sequence_bits;

            fn timestamp(&self) -> u64 {
                self.timestamp()
            }

            fn machine_id(&self) -> u64 {
                self.machine_id()
            }

            fn sequence(&self) -> u64 {
                self.sequence()
            }

            fn max_timestamp() -> u64 {
                Self::TIMESTAMP_MASK
            }

            fn max_machine_id() -> u64 {
                Self::MACHINE_ID_MASK
            }

            fn max_sequence() -> u64 {
                Self::SEQUENCE_MASK
            }

            fn from_components(timestamp: u64, machine_id: u64, sequence: u64) -> Self {
                debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
                debug_assert!(machine_id <= Self::MACHINE_ID_MASK, "machine_id overflow");
                debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
                Self::from(timestamp, machine_id, sequence)
            }

            fn to_raw(&self) -> u64 {
                self.id
            }

            fn from_raw(raw: u64) -> Self {
                Self { id: raw }
            }

            fn is_valid(&self) -> bool {
                self.id.checked_shr(Self::RESERVED_SHIFT).unwrap_or(0) == 0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.id)
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let full = core::any::type_name::<Self>();
                let name = full.rsplit("::").next().unwrap_or(full);
                f.debug_struct(name)
                    .field("id", &format_args!("{} (0x{:016x})", self.id, self.id))
                    .field("timestamp", &self.timestamp())
                    .field("machine_id", &self.machine_id())
                    .field("sequence", &self.sequence())
                    .finish()
            }
        }
    };

    (
        $(#[$meta:meta])*
        $name:ident,
        tick_millis: $tick_millis:expr,
        reserved: $reserved_bits:expr,
        timestamp: $timestamp_bits:expr,
        machine_id: $machine_id_bits:expr,
        sequence: $sequence_bits:expr
    ) => {
        $crate::define_flake_id!(
            @impl
            $(#[$meta])*
            $name,
            tick_millis: $tick_millis,
            reserved: $reserved_bits,
            timestamp: $timestamp_bits,
            machine_id: $machine_id_bits,
            sequence: $sequence_bits,
            machine_id_shift: $sequence_bits,
            sequence_shift: 0
        );
    };

    (
        $(#[$meta:meta])*
        $name:ident,
        tick_millis: $tick_millis:expr,
        reserved: $reserved_bits:expr,
        timestamp: $timestamp_bits:expr,
        sequence: $sequence_bits:expr,
        machine_id: $machine_id_bits:expr
    ) => {
        $crate::define_flake_id!(
            @impl
            $(#[$meta])*
            $name,
            tick_millis: $tick_millis,
            reserved: $reserved_bits,
            timestamp: $timestamp_bits,
            machine_id: $machine_id_bits,
            sequence: $sequence_bits,
            machine_id_shift: 0,
            sequence_shift: $machine_id_bits
        );
    };
}

define_flake_id!(
    /// Snowflake-style identifier: 41-bit millisecond timestamp, 10-bit
    /// machine id, 12-bit sequence (4096 ids per millisecond per machine).
    ///
    /// Timestamps count from [`SNOWFLAKE_EPOCH`] unless configured otherwise.
    ///
    /// [`SNOWFLAKE_EPOCH`]: crate::SNOWFLAKE_EPOCH
    SnowflakeUid,
    tick_millis: 1,
    reserved: 1,
    timestamp: 41,
    machine_id: 10,
    sequence: 12
);

define_flake_id!(
    /// Sonyflake-style identifier: 39-bit timestamp in 10 ms ticks, 8-bit
    /// sequence, 16-bit machine id (256 ids per 10 ms per machine).
    ///
    /// Timestamps count from [`SONYFLAKE_EPOCH`] unless configured otherwise.
    ///
    /// [`SONYFLAKE_EPOCH`]: crate::SONYFLAKE_EPOCH
    SonyflakeUid,
    tick_millis: 10,
    reserved: 1,
    timestamp: 39,
    sequence: 8,
    machine_id: 16
);
