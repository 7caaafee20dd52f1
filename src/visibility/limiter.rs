use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Process-wide token bucket guarding the external profile probe.
///
/// Acquiring reserves a token up front (the balance may go negative, which
/// orders concurrent waiters) and then sleeps out the deficit. A caller whose
/// deficit cannot be repaid within `max_wait` gives the token back and fails
/// immediately instead of queueing.
pub struct TokenBucket {
    state: Mutex<BucketState>,
    capacity: f64,
    refill_per_sec: f64,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(refill_per_sec: f64, burst: u32) -> Self {
        Self {
            state: Mutex::new(BucketState {
                tokens: burst as f64,
                last_refill: Instant::now(),
            }),
            capacity: burst as f64,
            refill_per_sec,
        }
    }

    /// Takes one token, waiting at most `max_wait`. Returns `false` when the
    /// wait would exceed the deadline; no token is consumed in that case.
    pub async fn acquire(&self, max_wait: Duration) -> bool {
        let delay = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            let elapsed = now.duration_since(state.last_refill).as_secs_f64();
            state.tokens = (state.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            state.last_refill = now;

            state.tokens -= 1.0;
            if state.tokens >= 0.0 {
                return true;
            }
            let deficit = -state.tokens;
            let delay = Duration::from_secs_f64(deficit / self.refill_per_sec);
            if delay > max_wait {
                state.tokens += 1.0;
                return false;
            }
            delay
        };
        tokio::time::sleep(delay).await;
        true
    }
}
