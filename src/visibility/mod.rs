//! Author visibility resolution: a TTL cache fronting a rate-limited probe
//! of the forum's public profile page.

mod cache;
mod limiter;
mod probe;

use std::sync::Arc;
use std::time::Duration;

pub use cache::VisibilityCache;
pub use limiter::TokenBucket;
pub use probe::{parse_profile_page, HttpProfileProbe, ProbeOutcome, ProfileProbe};

use crate::error::{Result, SifterError};

const CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const LIMITER_REFILL_PER_SEC: f64 = 2.0;
const LIMITER_BURST: u32 = 4;
const LIMITER_WAIT_MAX: Duration = Duration::from_secs(5);

/// Cached answer to "are this author's topics searchable right now?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRecord {
    pub found: bool,
    pub display_name: String,
    pub searchable: bool,
}

impl VisibilityRecord {
    fn not_found() -> Self {
        Self {
            found: false,
            display_name: String::new(),
            searchable: false,
        }
    }
}

/// Resolves author visibility with a shared cache and a global token bucket
/// bounding how fast the external probe may be hit.
///
/// Both shared resources are safe for concurrent use, but the cache offers no
/// stampede protection: concurrent first-time lookups for one key may each
/// take a permit and probe. All probes for a key converge on the same value.
pub struct VisibilityResolver {
    cache: VisibilityCache,
    limiter: TokenBucket,
    probe: Arc<dyn ProfileProbe>,
    max_wait: Duration,
}

impl VisibilityResolver {
    pub fn new(probe: Arc<dyn ProfileProbe>) -> Self {
        Self::with_settings(
            probe,
            CACHE_TTL,
            LIMITER_REFILL_PER_SEC,
            LIMITER_BURST,
            LIMITER_WAIT_MAX,
        )
    }

    pub fn with_settings(
        probe: Arc<dyn ProfileProbe>,
        ttl: Duration,
        refill_per_sec: f64,
        burst: u32,
        max_wait: Duration,
    ) -> Self {
        Self {
            cache: VisibilityCache::new(ttl),
            limiter: TokenBucket::new(refill_per_sec, burst),
            probe,
            max_wait,
        }
    }

    /// Looks up the visibility record for a username. The key is the trimmed,
    /// lower-cased name. A cache hit returns immediately; a miss takes a
    /// rate-limit permit (bounded wait) and probes the profile page.
    ///
    /// 404 probes are cached like any found record; probe failures are NOT
    /// cached, so the next request naturally retries.
    pub async fn resolve(&self, username: &str) -> Result<VisibilityRecord> {
        let key = username.trim().to_lowercase();
        if let Some(record) = self.cache.get(&key) {
            return Ok(record);
        }

        if !self.limiter.acquire(self.max_wait).await {
            return Err(SifterError::RateLimited);
        }

        let record = match self.probe.fetch(&key).await? {
            ProbeOutcome::NotFound => VisibilityRecord::not_found(),
            ProbeOutcome::Found {
                display_name,
                searchable,
            } => VisibilityRecord {
                found: true,
                display_name,
                searchable,
            },
        };
        self.cache.insert(key, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProbe {
        outcome: std::result::Result<ProbeOutcome, ()>,
        calls: AtomicUsize,
    }

    impl StubProbe {
        fn found(name: &str, searchable: bool) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(ProbeOutcome::Found {
                    display_name: name.to_string(),
                    searchable,
                }),
                calls: AtomicUsize::new(0),
            })
        }

        fn not_found() -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(ProbeOutcome::NotFound),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProfileProbe for StubProbe {
        async fn fetch(&self, _username: &str) -> Result<ProbeOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok(outcome) => Ok(outcome.clone()),
                Err(()) => Err(SifterError::ProbeFailed("status 502".into())),
            }
        }
    }

    #[tokio::test]
    async fn second_lookup_hits_the_cache() {
        let probe = StubProbe::found("Mornlight", true);
        let resolver = VisibilityResolver::new(probe.clone());

        let first = resolver.resolve("mornlight").await.unwrap();
        let second = resolver.resolve("mornlight").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn key_is_trimmed_and_lowercased() {
        let probe = StubProbe::found("Mornlight", true);
        let resolver = VisibilityResolver::new(probe.clone());

        resolver.resolve(" MORnlight ").await.unwrap();
        resolver.resolve("mornlight").await.unwrap();
        assert_eq!(probe.calls(), 1, "both spellings share one cache entry");
    }

    #[tokio::test]
    async fn not_found_is_cached() {
        let probe = StubProbe::not_found();
        let resolver = VisibilityResolver::new(probe.clone());

        let record = resolver.resolve("ghost").await.unwrap();
        assert!(!record.found);
        resolver.resolve("ghost").await.unwrap();
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn probe_failure_is_not_cached() {
        let probe = StubProbe::failing();
        let resolver = VisibilityResolver::new(probe.clone());

        assert!(resolver.resolve("flaky").await.is_err());
        assert!(resolver.resolve("flaky").await.is_err());
        assert_eq!(probe.calls(), 2, "each request retries the probe");
    }

    #[tokio::test]
    async fn hidden_author_record() {
        let probe = StubProbe::found("gbin", false);
        let resolver = VisibilityResolver::new(probe);
        let record = resolver.resolve("gBIn").await.unwrap();
        assert!(record.found);
        assert!(!record.searchable);
        assert_eq!(record.display_name, "gbin");
    }

    #[tokio::test(start_paused = true)]
    async fn probing_over_the_refill_rate_is_rejected() {
        let probe = StubProbe::found("x", true);
        // Burst of 2, no wait budget: the third distinct key fails.
        let resolver = VisibilityResolver::with_settings(
            probe.clone(),
            Duration::from_secs(3600),
            2.0,
            2,
            Duration::ZERO,
        );

        resolver.resolve("a").await.unwrap();
        resolver.resolve("b").await.unwrap();
        let err = resolver.resolve("c").await.unwrap_err();
        assert!(matches!(err, SifterError::RateLimited));
        assert_eq!(probe.calls(), 2, "no probe when the permit is denied");

        // Cached keys never need a permit.
        resolver.resolve("a").await.unwrap();
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_timeout_caches_nothing() {
        let probe = StubProbe::found("x", true);
        let resolver = VisibilityResolver::with_settings(
            probe.clone(),
            Duration::from_secs(3600),
            2.0,
            1,
            Duration::ZERO,
        );

        resolver.resolve("a").await.unwrap();
        assert!(resolver.resolve("b").await.is_err());
        // Once tokens refill, the key probes as if never seen.
        tokio::time::sleep(Duration::from_secs(1)).await;
        resolver.resolve("b").await.unwrap();
        assert_eq!(probe.calls(), 2);
    }
}
