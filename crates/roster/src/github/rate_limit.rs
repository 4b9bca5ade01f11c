//! Client-side pacing of GitHub requests.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default pacing. Well above the 5000/h authenticated quota on average, so
/// it only smooths bursts of fork and detail lookups.
pub const GITHUB_DEFAULT_RPS: u32 = 10;

/// Token bucket awaited before every GitHub request of an aggregator.
///
/// Pacing never retries anything: an exhausted quota still comes back as a
/// 403 and ends pagination.
///
/// ```ignore
/// let limiter = roster::github::ApiRateLimiter::new(5).expect("non-zero");
/// limiter.wait().await;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    bucket: Arc<DirectLimiter>,
    per_second: NonZeroU32,
}

impl ApiRateLimiter {
    /// `None` for zero: pacing disabled.
    pub fn new(requests_per_second: u32) -> Option<Self> {
        let per_second = NonZeroU32::new(requests_per_second)?;
        Some(Self {
            bucket: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
            per_second,
        })
    }

    pub fn requests_per_second(&self) -> u32 {
        self.per_second.get()
    }

    /// Resolve once the next request may be sent.
    pub async fn wait(&self) {
        self.bucket.until_ready().await;
    }
}

impl std::fmt::Debug for ApiRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRateLimiter")
            .field("requests_per_second", &self.per_second)
            .finish()
    }
}
