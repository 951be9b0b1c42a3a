use core::{cmp::Ordering, time::Duration};
use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(feature = "async-tokio")]
use crate::futures::TokioSleep;
use crate::{
    Error, GeneratorConfig, IdGenStatus, MonotonicClock, RANDOM_BITS, RandSource, Result,
    SEQUENCE_BITS, ThreadRandom, TimeSource, Uid, WorkerIdStore, WorkerLease,
    futures::SleepProvider,
};

/// A lock-based, lease-backed generator of [`Uid`]s.
///
/// Identifiers are composed from the current second, a worker id leased
/// from a shared [`WorkerIdStore`], a per-second sequence and a few random
/// bits. Within one generator every issued identifier is strictly greater
/// than the previous one. Across generators, uniqueness rests on distinct
/// worker ids.
///
/// The sequence does not wrap. Each second starts at a small random seed
/// and counts up; once it reaches [`Uid::max_sequence`] the generator
/// reports [`IdGenStatus::Pending`] until the next second begins.
///
/// Issuing is a short critical section over the generator state. Worker id
/// acquisition happens outside that lock, behind a single-flight gate, so
/// callers racing on an expired lease trigger one store round trip.
///
/// ## Example
///
/// ```
/// # #[cfg(feature = "async-tokio")]
/// # tokio_test();
/// # #[cfg(feature = "async-tokio")]
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// use uexky::{MemoryWorkerIdStore, UidGenerator};
///
/// let generator = UidGenerator::new(MemoryWorkerIdStore::new());
/// let a = generator.next().await.unwrap();
/// let b = generator.next().await.unwrap();
/// assert!(b > a);
/// assert_eq!(a.worker_id(), 1);
/// # }
/// ```
pub struct UidGenerator<L, T = MonotonicClock, R = ThreadRandom>
where
    L: WorkerIdStore,
    T: TimeSource,
    R: RandSource,
{
    store: L,
    time: T,
    rng: R,
    config: GeneratorConfig,
    state: Mutex<State>,
    lease_gate: ::futures::lock::Mutex<()>,
}

#[derive(Clone, Copy, Debug, Default)]
struct State {
    lease: Option<WorkerLease>,
    timestamp: u64,
    sequence: u16,
    // Earliest second at which identifiers may be issued again.
    resume_at: u64,
}

impl<L> UidGenerator<L>
where
    L: WorkerIdStore,
{
    /// Creates a generator using the default clock, random source and
    /// configuration.
    pub fn new(store: L) -> Self {
        Self::with_config(store, GeneratorConfig::default())
    }

    pub fn with_config(store: L, config: GeneratorConfig) -> Self {
        Self::from_components(store, MonotonicClock::default(), ThreadRandom, config)
    }
}

impl<L, T, R> UidGenerator<L, T, R>
where
    L: WorkerIdStore,
    T: TimeSource,
    R: RandSource,
{
    /// Creates a generator from explicit collaborators.
    ///
    /// The generator starts without a lease; the first call to
    /// [`UidGenerator::next_with`] acquires one.
    pub fn from_components(store: L, time: T, rng: R, config: GeneratorConfig) -> Self {
        Self {
            store,
            time,
            rng,
            config,
            state: Mutex::new(State::default()),
            lease_gate: ::futures::lock::Mutex::new(()),
        }
    }

    /// The lease currently held, live or expired.
    pub fn lease(&self) -> Option<WorkerLease> {
        self.state.lock().lease
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn store(&self) -> &L {
        &self.store
    }

    /// Attempts to issue an identifier without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when the clock reads a second outside the
    /// timestamp field's range, i.e. before the epoch or after the field is
    /// exhausted.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let now_ms = self.time.current_millis();
        let now = now_ms / 1000;
        if now == 0 || now > Uid::max_timestamp() {
            return Err(Error::internal(format!(
                "clock second {now} is outside the timestamp range"
            )));
        }
        let seed = self.next_seed();
        let random = self.next_random();

        let mut state = self.state.lock();
        let Some(lease) = state.lease.filter(|lease| lease.is_live(now)) else {
            return Ok(IdGenStatus::LeaseRequired);
        };
        if now < state.resume_at {
            return Ok(Self::pending_until(now_ms, state.resume_at));
        }

        match now.cmp(&state.timestamp) {
            Ordering::Greater => {
                state.timestamp = now;
                state.sequence = seed;
            }
            Ordering::Equal => {
                if state.sequence >= Uid::max_sequence() {
                    return Ok(Self::pending_until(now_ms, now + 1));
                }
                state.sequence += 1;
            }
            Ordering::Less => return Ok(Self::cold_clock_behind(now_ms, state.timestamp)),
        }

        let id = Uid::from_components(state.timestamp, lease.worker_id(), state.sequence, random)?;
        Ok(IdGenStatus::Ready { id })
    }

    /// Issues the next identifier, acquiring or renewing the worker lease as
    /// needed and sleeping with `S` whenever the generator is pending.
    ///
    /// # Errors
    ///
    /// - [`Error::LeaseUnavailable`] if no worker id could be acquired within
    ///   [`GeneratorConfig::acquire_attempts`]. The expired lease is kept, so
    ///   a later call retries acquisition.
    /// - [`Error::Internal`] if the clock is out of range.
    pub async fn next_with<S>(&self) -> Result<Uid>
    where
        S: SleepProvider,
        L: Sync,
    {
        loop {
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => break Ok(id),
                IdGenStatus::Pending { yield_for } => S::sleep_for(yield_for).await,
                IdGenStatus::LeaseRequired => {
                    self.acquire_lease::<S>().await?;
                }
            }
        }
    }

    /// Issues the next identifier using [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// See [`UidGenerator::next_with`].
    #[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
    #[cfg(feature = "async-tokio")]
    pub async fn next(&self) -> Result<Uid>
    where
        L: Sync,
    {
        self.next_with::<TokioSleep>().await
    }

    /// Returns the live lease, acquiring a new worker id if there is none.
    ///
    /// Concurrent callers are serialized; whoever enters second finds the
    /// lease already renewed and returns it without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LeaseUnavailable`] once every attempt has failed.
    pub async fn acquire_lease<S>(&self) -> Result<WorkerLease>
    where
        S: SleepProvider,
        L: Sync,
    {
        let _gate = self.lease_gate.lock().await;
        let now = self.time.current_secs();
        if let Some(lease) = self.lease().filter(|lease| lease.is_live(now)) {
            return Ok(lease);
        }

        let worker_id = self.acquire_worker_id::<S>().await?;
        let lease = self.install_lease(worker_id, self.time.current_secs());

        #[cfg(feature = "tracing")]
        tracing::info!(
            worker_id,
            expires_at = lease.expires_at(),
            "worker lease acquired"
        );

        Ok(lease)
    }

    async fn acquire_worker_id<S>(&self) -> Result<u16>
    where
        S: SleepProvider,
        L: Sync,
    {
        let attempts = self.config.acquire_attempts.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            match self.store.acquire().await {
                Ok(worker_id) => return Ok(worker_id),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(attempt, attempts, error = %err, "worker id acquisition failed");
                    last_error = Some(err);
                    if attempt < attempts {
                        S::sleep_for(self.config.retry_delay).await;
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::error!(attempts, "giving up on worker id acquisition");

        Err(Error::LeaseUnavailable {
            attempts,
            context: last_error.map_or_else(String::new, |err| err.to_string()),
        })
    }

    /// Replaces the held lease.
    ///
    /// When the worker id changes, issuing is fenced off until the second
    /// after the last issued timestamp, so that identifiers under the new
    /// worker id still sort after everything issued before.
    pub(crate) fn install_lease(&self, worker_id: u16, now: u64) -> WorkerLease {
        let ttl = self.config.lease_ttl_secs() + self.next_jitter();
        let lease = WorkerLease::new(worker_id, now, ttl);

        let mut state = self.state.lock();
        if state
            .lease
            .is_some_and(|previous| previous.worker_id() != worker_id)
        {
            state.resume_at = state.resume_at.max(state.timestamp + 1);
        }
        state.lease = Some(lease);
        lease
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_seed(&self) -> u16 {
        let span = u64::from(self.config.sequence_seed_span).min(1 << SEQUENCE_BITS);
        self.rng.rand_below(span) as u16
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_random(&self) -> u16 {
        self.rng.rand_below(1 << RANDOM_BITS) as u16
    }

    fn next_jitter(&self) -> u64 {
        match self.config.lease_jitter.as_secs() {
            0 => 0,
            jitter => self.rng.rand_below(jitter + 1),
        }
    }

    fn pending_until(now_ms: u64, second: u64) -> IdGenStatus {
        IdGenStatus::Pending {
            yield_for: Duration::from_millis(second.saturating_mul(1000).saturating_sub(now_ms)),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now_ms: u64, timestamp: u64) -> IdGenStatus {
        #[cfg(feature = "tracing")]
        tracing::warn!(now_ms, timestamp, "clock is behind the last issued timestamp");
        Self::pending_until(now_ms, timestamp)
    }
}

impl<L, T, R> core::fmt::Debug for UidGenerator<L, T, R>
where
    L: WorkerIdStore,
    T: TimeSource,
    R: RandSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UidGenerator")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
