use core::future::{Future, ready};
use core::time::Duration;
use portable_atomic::{AtomicU32, AtomicU64, Ordering};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    Error, ErrorKind, GeneratorConfig, IdGenStatus, MemoryWorkerIdStore, RandSource, Result,
    TimeSource, Uid, UidGenerator, WorkerIdStore, futures::SleepProvider,
};

#[derive(Clone)]
struct MockTime {
    millis: Arc<AtomicU64>,
}

impl MockTime {
    fn at(millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    fn advance(&self, dur: Duration) {
        self.millis
            .fetch_add(u64::try_from(dur.as_millis()).unwrap(), Ordering::SeqCst);
    }
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

static STEPPED_MILLIS: AtomicU64 = AtomicU64::new(5_000_400);

/// A clock that only moves when [`AdvanceSleep`] sleeps.
struct SteppedClock;

impl TimeSource for SteppedClock {
    fn current_millis(&self) -> u64 {
        STEPPED_MILLIS.load(Ordering::SeqCst)
    }
}

struct AdvanceSleep;

impl SleepProvider for AdvanceSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        STEPPED_MILLIS.fetch_add(u64::try_from(dur.as_millis()).unwrap(), Ordering::SeqCst);
        ready(())
    }
}

struct NoSleep;

impl SleepProvider for NoSleep {
    fn sleep_for(_dur: Duration) -> impl Future<Output = ()> + Send {
        ready(())
    }
}

struct FixedRand(u64);

impl RandSource for FixedRand {
    fn rand(&self) -> u64 {
        self.0
    }
}

/// Fails the first `failures` increments, then counts like a real store.
struct FlakyStore {
    calls: AtomicU32,
    failures: u32,
}

impl FlakyStore {
    fn failing(failures: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures,
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WorkerIdStore for FlakyStore {
    fn increment(&self) -> impl Future<Output = Result<u64>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        ready(if call <= self.failures {
            Err(Error::internal("store offline"))
        } else {
            Ok(u64::from(call))
        })
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> Uid;
    fn unwrap_pending(self) -> Duration;
}

impl IdGenStatusExt for Result<IdGenStatus> {
    fn unwrap_ready(self) -> Uid {
        match self.unwrap() {
            IdGenStatus::Ready { id } => id,
            other => panic!("expected ready, got {other:?}"),
        }
    }

    fn unwrap_pending(self) -> Duration {
        match self.unwrap() {
            IdGenStatus::Pending { yield_for } => yield_for,
            other => panic!("expected pending, got {other:?}"),
        }
    }
}

fn fixed_config() -> GeneratorConfig {
    GeneratorConfig {
        lease_jitter: Duration::ZERO,
        sequence_seed_span: 0,
        ..GeneratorConfig::default()
    }
}

fn mock_generator(
    time: &MockTime,
    config: GeneratorConfig,
) -> UidGenerator<MemoryWorkerIdStore, MockTime, FixedRand> {
    UidGenerator::from_components(MemoryWorkerIdStore::new(), time.clone(), FixedRand(7), config)
}

#[tokio::test]
async fn no_lease_before_first_acquire() {
    let time = MockTime::at(1_000_250);
    let generator = mock_generator(&time, fixed_config());
    assert_eq!(generator.try_poll_id().unwrap(), IdGenStatus::LeaseRequired);
    assert!(generator.lease().is_none());

    let lease = generator.acquire_lease::<NoSleep>().await.unwrap();
    assert_eq!(lease.worker_id(), 1);
    assert_eq!(lease.acquired_at(), 1000);
    assert_eq!(lease.expires_at(), 1000 + 3600);
    assert_eq!(generator.lease(), Some(lease));
}

#[tokio::test]
async fn sequence_increments_within_same_second() {
    let time = MockTime::at(1_000_250);
    let generator = mock_generator(&time, fixed_config());
    generator.acquire_lease::<NoSleep>().await.unwrap();

    for expected in 0..3 {
        let id = generator.try_poll_id().unwrap_ready();
        assert_eq!(id.timestamp(), 1000);
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.sequence(), expected);
        assert_eq!(id.random(), 7);
    }
}

#[tokio::test]
async fn each_second_starts_at_random_seed() {
    let time = MockTime::at(1_000_000);
    let generator = UidGenerator::from_components(
        MemoryWorkerIdStore::new(),
        time.clone(),
        FixedRand(1000),
        GeneratorConfig::default(),
    );
    generator.acquire_lease::<NoSleep>().await.unwrap();

    let first = generator.try_poll_id().unwrap_ready();
    assert_eq!(first.sequence(), 1000 % 64);
    assert_eq!(first.random(), 1000 % 512);

    let second = generator.try_poll_id().unwrap_ready();
    assert_eq!(second.sequence(), first.sequence() + 1);

    time.advance(Duration::from_secs(1));
    let third = generator.try_poll_id().unwrap_ready();
    assert_eq!(third.timestamp(), 1001);
    assert_eq!(third.sequence(), 1000 % 64);
    assert!(third > second);
}

#[tokio::test]
async fn seed_span_is_capped_to_sequence_field() {
    let time = MockTime::at(1_000_000);
    let config = GeneratorConfig {
        sequence_seed_span: 4096,
        ..fixed_config()
    };
    let generator = UidGenerator::from_components(
        MemoryWorkerIdStore::new(),
        time,
        FixedRand(3000),
        config,
    );
    generator.acquire_lease::<NoSleep>().await.unwrap();

    let first = generator.try_poll_id().unwrap_ready();
    assert_eq!(first.sequence(), 3000 % 1024);
    let second = generator.try_poll_id().unwrap_ready();
    assert_eq!(second.sequence(), first.sequence() + 1);
    assert!(second > first);
}

#[tokio::test]
async fn default_lease_carries_jitter() {
    let time = MockTime::at(1_000_000);
    let generator = UidGenerator::from_components(
        MemoryWorkerIdStore::new(),
        time,
        FixedRand(5000),
        GeneratorConfig::default(),
    );
    let lease = generator.acquire_lease::<NoSleep>().await.unwrap();
    assert_eq!(lease.expires_at(), 1000 + 3600 + 5000 % 3601);
}

#[tokio::test]
async fn sequence_exhaustion_is_pending_until_next_second() {
    let time = MockTime::at(1_000_250);
    let generator = mock_generator(&time, fixed_config());
    generator.acquire_lease::<NoSleep>().await.unwrap();

    let mut last = None;
    for expected in 0..=Uid::max_sequence() {
        let id = generator.try_poll_id().unwrap_ready();
        assert_eq!(id.sequence(), expected);
        assert!(last < Some(id));
        last = Some(id);
    }

    let yield_for = generator.try_poll_id().unwrap_pending();
    assert_eq!(yield_for, Duration::from_millis(750));

    time.advance(yield_for);
    let id = generator.try_poll_id().unwrap_ready();
    assert_eq!(id.timestamp(), 1001);
    assert_eq!(id.sequence(), 0);
    assert!(last < Some(id));
}

#[tokio::test]
async fn exhaustion_sleeps_into_next_second() {
    let generator = UidGenerator::from_components(
        MemoryWorkerIdStore::new(),
        SteppedClock,
        FixedRand(3),
        fixed_config(),
    );

    let total = usize::from(Uid::max_sequence()) + 2;
    let mut ids = Vec::with_capacity(total);
    for _ in 0..total {
        ids.push(generator.next_with::<AdvanceSleep>().await.unwrap());
    }

    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(ids[..total - 1].iter().all(|id| id.timestamp() == 5000));
    assert_eq!(ids[total - 1].timestamp(), 5001);
    assert_eq!(ids[total - 1].sequence(), 0);
    assert_eq!(STEPPED_MILLIS.load(Ordering::SeqCst), 5_001_000);
}

#[tokio::test]
async fn clock_behind_is_pending() {
    let time = MockTime::at(1_000_250);
    let generator = mock_generator(&time, fixed_config());
    generator.acquire_lease::<NoSleep>().await.unwrap();
    let before = generator.try_poll_id().unwrap_ready();

    time.set(998_500);
    assert_eq!(
        generator.try_poll_id().unwrap_pending(),
        Duration::from_millis(1500)
    );

    time.set(1_000_100);
    let after = generator.try_poll_id().unwrap_ready();
    assert_eq!(after.timestamp(), 1000);
    assert_eq!(after.sequence(), before.sequence() + 1);
}

#[tokio::test]
async fn worker_id_is_stable_within_lease() {
    let time = MockTime::at(1_000_000);
    let generator = mock_generator(&time, GeneratorConfig::default());

    let mut workers = HashSet::new();
    for _ in 0..50 {
        workers.insert(generator.next_with::<NoSleep>().await.unwrap().worker_id());
        time.advance(Duration::from_millis(90));
    }
    assert_eq!(workers.into_iter().collect::<Vec<_>>(), vec![1]);
    assert_eq!(generator.store().count(), 1);
}

#[tokio::test]
async fn expired_lease_is_renewed() {
    let time = MockTime::at(1_000_000);
    let config = GeneratorConfig {
        lease_ttl: Duration::from_secs(10),
        ..fixed_config()
    };
    let generator = mock_generator(&time, config);
    let first = generator.next_with::<NoSleep>().await.unwrap();
    assert_eq!(first.worker_id(), 1);

    time.set(1_009_999);
    let before_expiry = generator.try_poll_id().unwrap_ready();
    assert_eq!(before_expiry.worker_id(), 1);

    time.set(1_010_000);
    assert_eq!(generator.try_poll_id().unwrap(), IdGenStatus::LeaseRequired);

    let renewed = generator.next_with::<NoSleep>().await.unwrap();
    assert_eq!(renewed.worker_id(), 2);
    assert_eq!(renewed.timestamp(), 1010);
    assert!(renewed > before_expiry);
    assert_eq!(generator.lease().unwrap().expires_at(), 1020);
}

#[tokio::test]
async fn worker_change_is_fenced_to_next_second() {
    let time = MockTime::at(1_000_250);
    let generator = mock_generator(&time, fixed_config());
    generator.install_lease(5, 1000);
    let before = generator.try_poll_id().unwrap_ready();
    assert_eq!(before.worker_id(), 5);

    generator.install_lease(3, 1000);
    assert_eq!(
        generator.try_poll_id().unwrap_pending(),
        Duration::from_millis(750)
    );

    time.advance(Duration::from_millis(750));
    let after = generator.try_poll_id().unwrap_ready();
    assert_eq!(after.worker_id(), 3);
    assert_eq!(after.timestamp(), 1001);
    assert!(after > before);
}

#[tokio::test]
async fn same_worker_renewal_is_not_fenced() {
    let time = MockTime::at(1_000_250);
    let generator = mock_generator(&time, fixed_config());
    generator.install_lease(5, 1000);
    generator.try_poll_id().unwrap_ready();

    generator.install_lease(5, 1000);
    let id = generator.try_poll_id().unwrap_ready();
    assert_eq!(id.timestamp(), 1000);
    assert_eq!(id.sequence(), 1);
}

#[tokio::test]
async fn lease_jitter_extends_expiry() {
    let time = MockTime::at(1_000_000);
    let config = GeneratorConfig {
        lease_ttl: Duration::from_secs(100),
        lease_jitter: Duration::from_secs(30),
        ..GeneratorConfig::default()
    };
    let generator = UidGenerator::from_components(
        MemoryWorkerIdStore::new(),
        time,
        FixedRand(45),
        config,
    );
    let lease = generator.acquire_lease::<NoSleep>().await.unwrap();
    assert_eq!(lease.expires_at(), 1000 + 100 + 45 % 31);
}

#[tokio::test]
async fn acquisition_failure_is_fatal_after_bounded_retries() {
    let generator = UidGenerator::from_components(
        FlakyStore::failing(u32::MAX),
        MockTime::at(1_000_000),
        FixedRand(0),
        GeneratorConfig::default(),
    );

    let err = generator.next_with::<NoSleep>().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fatal);
    assert_eq!(
        err,
        Error::LeaseUnavailable {
            attempts: 3,
            context: "internal error: store offline".into(),
        }
    );
    assert_eq!(generator.store().calls(), 3);
    assert!(generator.lease().is_none());

    generator.next_with::<NoSleep>().await.unwrap_err();
    assert_eq!(generator.store().calls(), 6);
}

#[tokio::test]
async fn transient_acquisition_failure_is_retried() {
    let generator = UidGenerator::from_components(
        FlakyStore::failing(2),
        MockTime::at(1_000_000),
        FixedRand(0),
        GeneratorConfig::default(),
    );

    let id = generator.next_with::<NoSleep>().await.unwrap();
    assert_eq!(id.worker_id(), 3);
    assert_eq!(generator.store().calls(), 3);
}

#[tokio::test]
async fn failed_renewal_keeps_expired_lease() {
    let time = MockTime::at(1_000_000);
    let config = GeneratorConfig {
        lease_ttl: Duration::from_secs(10),
        acquire_attempts: 1,
        ..GeneratorConfig::default()
    };
    let generator = UidGenerator::from_components(
        FlakyStore::failing(u32::MAX),
        time.clone(),
        FixedRand(0),
        config,
    );
    let expired = generator.install_lease(9, 1000);
    generator.try_poll_id().unwrap_ready();

    time.advance(Duration::from_secs(10));
    let err = generator.next_with::<NoSleep>().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fatal);
    assert_eq!(generator.lease(), Some(expired));
    assert_eq!(generator.try_poll_id().unwrap(), IdGenStatus::LeaseRequired);
    assert_eq!(generator.store().calls(), 1);
}

#[test]
fn clock_outside_timestamp_range_is_internal() {
    let time = MockTime::at(999);
    let generator = mock_generator(&time, fixed_config());
    let err = generator.try_poll_id().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);

    time.set((Uid::max_timestamp() + 1) * 1000);
    assert_eq!(generator.try_poll_id().unwrap_err().kind(), ErrorKind::Internal);
}

#[tokio::test]
async fn sequential_ids_are_strictly_increasing() {
    let generator = UidGenerator::new(MemoryWorkerIdStore::new());
    let mut ids = Vec::with_capacity(2000);
    for _ in 0..2000 {
        ids.push(generator.next().await.unwrap());
    }
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(ids.iter().all(|id| id.worker_id() == 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ids_are_unique() {
    const TASKS: usize = 8;
    const IDS_PER_TASK: usize = 128;

    let generator = Arc::new(UidGenerator::new(MemoryWorkerIdStore::new()));
    let tasks: Vec<_> = (0..TASKS)
        .map(|_| {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move {
                let mut ids = Vec::with_capacity(IDS_PER_TASK);
                for _ in 0..IDS_PER_TASK {
                    ids.push(generator.next().await?);
                }
                Ok::<_, Error>(ids)
            })
        })
        .collect();

    let mut seen = HashSet::with_capacity(TASKS * IDS_PER_TASK);
    for joined in ::futures::future::try_join_all(tasks).await.unwrap() {
        let ids = joined.unwrap();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        for id in ids {
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(seen.len(), TASKS * IDS_PER_TASK);
    // Racing first callers share a single acquisition.
    assert_eq!(generator.store().count(), 1);
}
