use crate::domain::ports::RateLimiter;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use std::time::Duration;

type DirectLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// 固定間隔閘門：相鄰兩次 acquire 至少相隔 `interval`，第一次立即放行
pub struct FixedInterval {
    limiter: DirectLimiter,
}

impl FixedInterval {
    /// 間隔為零時沒有可用的配額，回傳 `None`
    pub fn new(interval: Duration) -> Option<Self> {
        let quota = Quota::with_period(interval)?;
        Some(Self {
            limiter: governor::RateLimiter::direct(quota),
        })
    }

    pub fn from_millis(millis: u64) -> Option<Self> {
        Self::new(Duration::from_millis(millis))
    }
}

#[async_trait]
impl RateLimiter for FixedInterval {
    async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

/// 不節流，用於測試或本地資料來源
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

#[async_trait]
impl RateLimiter for Unthrottled {
    async fn acquire(&self) {}
}

#[async_trait]
impl<T: RateLimiter + ?Sized> RateLimiter for Box<T> {
    async fn acquire(&self) {
        (**self).acquire().await;
    }
}

/// 依 `delay_ms` 選擇閘門，0 代表不節流
pub fn pacing(delay_ms: u64) -> Box<dyn RateLimiter> {
    match FixedInterval::from_millis(delay_ms) {
        Some(limiter) => {
            tracing::debug!("⏱️  Pacing requests every {} ms", delay_ms);
            Box::new(limiter)
        }
        None => {
            tracing::debug!("⏱️  Request pacing disabled");
            Box::new(Unthrottled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let limiter = FixedInterval::from_millis(500).unwrap();
        let started = std::time::Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_consecutive_acquires_are_spaced() {
        let limiter = FixedInterval::from_millis(40).unwrap();
        let started = std::time::Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        // governor 的時鐘與 std 不同源，保留少量誤差
        assert!(started.elapsed() >= Duration::from_millis(75));
    }

    #[tokio::test]
    async fn test_elapsed_interval_does_not_wait_again() {
        let limiter = FixedInterval::from_millis(50).unwrap();
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let started = std::time::Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() < Duration::from_millis(40));
    }

    #[test]
    fn test_zero_interval_has_no_fixed_gate() {
        assert!(FixedInterval::from_millis(0).is_none());
    }

    #[tokio::test]
    async fn test_zero_delay_pacing_never_blocks() {
        let limiter = pacing(0);
        let started = std::time::Instant::now();
        for _ in 0..50 {
            limiter.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_boxed_pacing_spaces_calls() {
        let limiter = pacing(40);
        let started = std::time::Instant::now();
        limiter.acquire().await;
        assert!(started.elapsed() < Duration::from_millis(30));
        limiter.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(35));
    }

    #[test]
    fn test_unthrottled_never_blocks() {
        tokio_test::block_on(async {
            for _ in 0..100 {
                Unthrottled.acquire().await;
            }
        });
    }
}
