//! Token bucket rate limiter.
//!
//! The regulator allows at most 10 requests per second per client. One
//! [`RateLimiter`] is shared (via `Arc`) by every worker task so the budget
//! is enforced globally, not per ticker.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter.
///
/// Capacity equals the refill rate, so a full bucket allows a one-second
/// burst at most. [`acquire`](Self::acquire) blocks the calling task until a
/// token is available; ordering between blocked callers is best-effort FIFO
/// (whatever order the mutex grants).
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<BucketState>,
    rate: f64,
    capacity: f64,
}

impl RateLimiter {
    /// Creates a limiter allowing `rate` requests per second.
    ///
    /// Rates are clamped to a small positive minimum so a zero rate cannot
    /// deadlock callers.
    #[must_use]
    pub fn new(rate: f64) -> Self {
        let rate = rate.max(0.001);
        Self {
            state: Mutex::new(BucketState {
                tokens: rate,
                last_refill: Instant::now(),
            }),
            rate,
            capacity: rate,
        }
    }

    /// Blocks until one token is available, then consumes it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let elapsed = state.last_refill.elapsed().as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.rate).min(self.capacity);
                state.last_refill = Instant::now();

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                (1.0 - state.tokens) / self.rate
            };
            sleep(Duration::from_secs_f64(wait)).await;
        }
    }

    /// The configured requests-per-second rate.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_up_to_capacity_is_immediate() {
        let limiter = RateLimiter::new(5.0);
        let t0 = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        // Full bucket: no waiting
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn refill_paces_requests() {
        let limiter = RateLimiter::new(10.0);
        let t0 = Instant::now();
        // Drain the bucket, then two more tokens must wait ~100ms each
        for _ in 0..12 {
            limiter.acquire().await;
        }
        assert!(t0.elapsed() >= Duration::from_millis(190));
    }

    #[tokio::test(start_paused = true)]
    async fn shared_across_tasks() {
        use std::sync::Arc;

        let limiter = Arc::new(RateLimiter::new(4.0));
        let t0 = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        // 8 acquisitions at 4 rps with a 4-token burst: ~1s total
        assert!(t0.elapsed() >= Duration::from_millis(900));
    }
}
