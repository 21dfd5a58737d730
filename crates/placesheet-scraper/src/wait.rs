//! Bounded polling waits.
//!
//! Every wait in the collector goes through [`wait_until`]: poll a probe until
//! it yields a value or the timeout expires. Expiry is reported as `None` and
//! never as an error.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Timeout and polling interval for a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    #[must_use]
    pub fn from_millis(timeout_ms: u64, interval_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            interval: Duration::from_millis(interval_ms.max(1)),
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::from_millis(10_000, 250)
    }
}

/// Polls `probe` until it returns `Some` or `policy.timeout` elapses.
///
/// The probe always runs at least once, even with a zero timeout. Sleeps
/// between attempts never overshoot the deadline.
pub async fn wait_until<T, F, Fut>(policy: WaitPolicy, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + policy.timeout;
    loop {
        if let Some(value) = probe().await {
            return Some(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        tokio::time::sleep(policy.interval.min(deadline - now)).await;
    }
}
