use core::time::Duration;
use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    thread::scope,
};

use crate::{
    Error, FlakeGenerator, FlakeId, LockFlakeGenerator, Poll, SNOWFLAKE_EPOCH, SONYFLAKE_EPOCH,
    SequenceState, SnowflakeUid, SonyflakeUid, TimeSource, WallClock,
};

struct MockTime {
    ticks: u64,
}

impl TimeSource for MockTime {
    fn current_ticks(&self) -> u64 {
        self.ticks
    }
}

#[derive(Clone, Default)]
struct ManualClock {
    ticks: Arc<AtomicU64>,
}

impl ManualClock {
    fn at(ticks: u64) -> Self {
        let clock = Self::default();
        clock.set(ticks);
        clock
    }

    fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn current_ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

/// Reports `before` for the first `switch_after` reads and `after` from then
/// on, simulating a tick boundary that arrives mid-wait.
struct StepClock {
    reads: AtomicU64,
    switch_after: u64,
    before: u64,
    after: u64,
}

impl TimeSource for StepClock {
    fn current_ticks(&self) -> u64 {
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.switch_after {
            self.before
        } else {
            self.after
        }
    }
}

trait PollExt<ID: FlakeId> {
    fn unwrap_ready(self) -> ID;
    fn unwrap_pending(self) -> u64;
}

impl<ID: FlakeId> PollExt<ID> for Poll<ID> {
    fn unwrap_ready(self) -> ID {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn run_id_sequence_increments_within_same_tick<G, ID, T>(generator: &G)
where
    G: FlakeGenerator<ID, T>,
    ID: FlakeId,
    T: TimeSource,
{
    let id1 = generator.try_next_id().unwrap();
    let id2 = generator.try_next_id().unwrap();
    let id3 = generator.try_next_id().unwrap();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_sequence_wrap_forces_tick_advance<ID>()
where
    ID: FlakeId,
{
    let clock = StepClock {
        reads: AtomicU64::new(0),
        // One read per id in tick 42, plus one read that finds it exhausted.
        switch_after: ID::max_sequence() + 2,
        before: 42,
        after: 43,
    };
    let generator = LockFlakeGenerator::<ID, _>::new(1, clock).unwrap();

    let mut last = None;
    for i in 0..=ID::max_sequence() {
        let id = generator.try_next_id().unwrap();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
        assert!(last < Some(id));
        last = Some(id);
    }

    let id = generator.try_next_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(id.machine_id(), 1);
    assert!(last < Some(id));
}

fn run_clock_regression_leaves_state_untouched<ID>()
where
    ID: FlakeId,
{
    let clock = ManualClock::at(100);
    let generator = LockFlakeGenerator::<ID, _>::new(3, clock.clone()).unwrap();

    let first = generator.try_next_id().unwrap();
    let before = generator.state();
    assert_eq!(
        before,
        SequenceState {
            last_tick: 100,
            sequence: 0
        }
    );

    clock.set(90);
    assert_eq!(
        generator.try_next_id(),
        Err(Error::ClockRegression {
            now: 90,
            last_tick: 100,
            drift: 10
        })
    );
    assert!(matches!(
        generator.try_poll_id(),
        Err(Error::ClockRegression { drift: 10, .. })
    ));
    assert_eq!(generator.state(), before);

    clock.set(100);
    let next = generator.try_next_id().unwrap();
    assert_eq!(next.timestamp(), 100);
    assert_eq!(next.sequence(), 1);
    assert!(first < next);
}

fn run_single_thread_monotonic<ID, T>(generator: &LockFlakeGenerator<ID, T>, total: usize)
where
    ID: FlakeId,
    T: TimeSource,
{
    let mut last_timestamp = 0;
    let mut sequence = 0;
    let mut last_id: Option<ID> = None;

    for _ in 0..total {
        let id = generator.try_next_id().unwrap();
        let ts = id.timestamp();
        if ts > last_timestamp {
            sequence = 0;
        }

        assert!(ts >= last_timestamp);
        assert_eq!(id.machine_id(), 1);
        assert_eq!(id.sequence(), sequence);
        assert!(last_id < Some(id));

        last_timestamp = ts;
        last_id = Some(id);
        sequence += 1;
    }
}

fn run_threaded_unique<ID, T>(generator: LockFlakeGenerator<ID, T>, total: usize)
where
    ID: FlakeId,
    T: TimeSource + Send + Sync,
{
    let threads = num_cpus::get().clamp(2, 8);
    let per_thread = total / threads;

    let generator = Arc::new(generator);
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(total)));

    scope(|s| {
        for _ in 0..threads {
            let generator = Arc::clone(&generator);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                let mut mine = Vec::with_capacity(per_thread);
                for _ in 0..per_thread {
                    mine.push(generator.try_next_id().unwrap());
                }
                // Calls from one thread complete in order, so they must rise.
                assert!(mine.windows(2).all(|w| w[0] < w[1]));
                let mut seen = seen_ids.lock().unwrap();
                for id in mine {
                    assert!(seen.insert(id), "duplicate id {id:?}");
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, per_thread * threads);
}

#[test]
fn snowflake_sequence_test() {
    let generator = LockFlakeGenerator::<SnowflakeUid, _>::new(0, MockTime { ticks: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn sonyflake_sequence_test() {
    let generator = LockFlakeGenerator::<SonyflakeUid, _>::new(0, MockTime { ticks: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn snowflake_concrete_layout_scenario() {
    let clock = ManualClock::at(1000);
    let generator = LockFlakeGenerator::<SnowflakeUid, _>::new(5, clock.clone()).unwrap();

    let first = generator.try_next_id().unwrap();
    assert_eq!(first.to_raw(), (1000 << 22) | (5 << 12));

    let second = generator.try_next_id().unwrap();
    assert_eq!(second.to_raw(), first.to_raw() + 1);

    clock.set(1001);
    let third = generator.try_next_id().unwrap();
    assert_eq!(third.to_raw(), (1001 << 22) | (5 << 12));
}

#[test]
fn pending_when_sequence_exhausted() {
    let generator = LockFlakeGenerator::<SnowflakeUid, _>::from_components(
        0,
        0,
        SnowflakeUid::max_sequence(),
        MockTime { ticks: 0 },
    )
    .unwrap();
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);

    let generator = LockFlakeGenerator::<SonyflakeUid, _>::from_components(
        0,
        0,
        SonyflakeUid::max_sequence(),
        MockTime { ticks: 0 },
    )
    .unwrap();
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);
}

#[test]
fn poll_ready_on_new_tick() {
    let generator = LockFlakeGenerator::<SonyflakeUid, _>::new(9, MockTime { ticks: 7 }).unwrap();
    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 7);
    assert_eq!(id.machine_id(), 9);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn snowflake_sequence_wrap_forces_tick_advance() {
    run_sequence_wrap_forces_tick_advance::<SnowflakeUid>();
}

#[test]
fn sonyflake_sequence_wrap_forces_tick_advance() {
    run_sequence_wrap_forces_tick_advance::<SonyflakeUid>();
}

#[test]
fn overflow_wait_is_bounded() {
    let generator = LockFlakeGenerator::<SnowflakeUid, _>::from_components(
        42,
        1,
        SnowflakeUid::max_sequence(),
        MockTime { ticks: 42 },
    )
    .unwrap()
    .with_max_wait(Duration::from_millis(5));
    let before = generator.state();

    match generator.try_next_id() {
        Err(Error::SequenceOverflowTimeout { tick, waited }) => {
            assert_eq!(tick, 42);
            assert!(waited >= Duration::from_millis(5));
        }
        other => panic!("expected overflow timeout, got {other:?}"),
    }
    assert_eq!(generator.state(), before);
}

#[test]
fn zero_wait_fails_fast() {
    let generator = LockFlakeGenerator::<SonyflakeUid, _>::from_components(
        8,
        1,
        SonyflakeUid::max_sequence(),
        MockTime { ticks: 8 },
    )
    .unwrap()
    .with_max_wait(Duration::ZERO);

    assert!(matches!(
        generator.try_next_id(),
        Err(Error::SequenceOverflowTimeout { tick: 8, .. })
    ));
}

#[test]
fn snowflake_clock_regression_rejected() {
    run_clock_regression_leaves_state_untouched::<SnowflakeUid>();
}

#[test]
fn sonyflake_clock_regression_rejected() {
    run_clock_regression_leaves_state_untouched::<SonyflakeUid>();
}

#[test]
fn timestamp_overflow_rejected() {
    let ticks = SonyflakeUid::max_timestamp() + 1;
    let generator = LockFlakeGenerator::<SonyflakeUid, _>::new(0, MockTime { ticks }).unwrap();
    assert_eq!(
        generator.try_next_id(),
        Err(Error::TimestampOverflow {
            tick: ticks,
            max: SonyflakeUid::max_timestamp()
        })
    );
    assert_eq!(
        generator.state(),
        SequenceState {
            last_tick: 0,
            sequence: 0
        }
    );
}

#[test]
fn machine_id_bound_enforced() {
    assert_eq!(
        LockFlakeGenerator::<SnowflakeUid, _>::new(1 << 10, MockTime { ticks: 0 }).err(),
        Some(Error::InvalidMachineId {
            machine_id: 1 << 10,
            max: (1 << 10) - 1
        })
    );
    assert_eq!(
        LockFlakeGenerator::<SonyflakeUid, _>::new(1 << 16, MockTime { ticks: 0 }).err(),
        Some(Error::InvalidMachineId {
            machine_id: 1 << 16,
            max: (1 << 16) - 1
        })
    );
    let generator =
        LockFlakeGenerator::<SonyflakeUid, _>::new((1 << 16) - 1, MockTime { ticks: 0 }).unwrap();
    assert_eq!(generator.machine_id(), (1 << 16) - 1);
}

#[test]
fn resumed_state_rejects_earlier_ticks() {
    let clock = ManualClock::at(499);
    let generator = LockFlakeGenerator::<SnowflakeUid, _>::from_components(500, 2, 3, clock.clone())
        .unwrap();

    assert!(matches!(
        generator.try_next_id(),
        Err(Error::ClockRegression { drift: 1, .. })
    ));

    clock.set(500);
    let id = generator.try_next_id().unwrap();
    assert_eq!((id.timestamp(), id.sequence()), (500, 4));
}

#[test]
fn out_of_range_components_rejected() {
    assert!(matches!(
        LockFlakeGenerator::<SonyflakeUid, _>::from_components(
            0,
            0,
            SonyflakeUid::max_sequence() + 1,
            MockTime { ticks: 0 },
        ),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        LockFlakeGenerator::<SnowflakeUid, _>::from_components(
            SnowflakeUid::max_timestamp() + 1,
            0,
            0,
            MockTime { ticks: 0 },
        ),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn snowflake_wall_clock_monotonic() {
    let clock = WallClock::for_layout::<SnowflakeUid>(SNOWFLAKE_EPOCH).unwrap();
    let generator = LockFlakeGenerator::<SnowflakeUid, _>::new(1, clock).unwrap();
    run_single_thread_monotonic(&generator, 4096 * 32);
}

#[test]
fn sonyflake_wall_clock_monotonic() {
    let clock = WallClock::for_layout::<SonyflakeUid>(SONYFLAKE_EPOCH).unwrap();
    let generator = LockFlakeGenerator::<SonyflakeUid, _>::new(1, clock).unwrap();
    run_single_thread_monotonic(&generator, 256 * 20);
}

#[test]
fn snowflake_threaded_unique() {
    let clock = WallClock::for_layout::<SnowflakeUid>(SNOWFLAKE_EPOCH).unwrap();
    let generator = LockFlakeGenerator::<SnowflakeUid, _>::new(0, clock).unwrap();
    run_threaded_unique(generator, 4096 * 64);
}

#[test]
fn sonyflake_threaded_unique() {
    let clock = WallClock::for_layout::<SonyflakeUid>(SONYFLAKE_EPOCH).unwrap();
    let generator = LockFlakeGenerator::<SonyflakeUid, _>::new(0, clock).unwrap();
    run_threaded_unique(generator, 256 * 40);
}
