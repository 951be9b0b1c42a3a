use core::time::Duration;

/// Tuning knobs for [`UidGenerator`](crate::UidGenerator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// How long an acquired worker id stays valid. Rounded down to whole
    /// seconds, with a floor of one second.
    pub lease_ttl: Duration,
    /// Upper bound of a random extension added to every lease, so that a
    /// fleet started together does not renew in lockstep.
    pub lease_jitter: Duration,
    /// Number of acquisition attempts before the generator gives up with
    /// [`Error::LeaseUnavailable`](crate::Error::LeaseUnavailable).
    pub acquire_attempts: u32,
    /// Delay between failed acquisition attempts.
    pub retry_delay: Duration,
    /// Each second's sequence starts at a random value below this bound.
    /// Spans wider than the sequence field are capped to it.
    pub sequence_seed_span: u16,
}

impl GeneratorConfig {
    pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(60 * 60);
    pub const DEFAULT_LEASE_JITTER: Duration = Duration::from_secs(60 * 60);

    pub(crate) fn lease_ttl_secs(&self) -> u64 {
        self.lease_ttl.as_secs().max(1)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            lease_ttl: Self::DEFAULT_LEASE_TTL,
            lease_jitter: Self::DEFAULT_LEASE_JITTER,
            acquire_attempts: 3,
            retry_delay: Duration::from_millis(100),
            sequence_seed_span: 64,
        }
    }
}
