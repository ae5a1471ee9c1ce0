use std::time::{Duration, Instant};

/// Token bucket applied to each WebSocket connection's incoming commands.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: u32,
    max_tokens: u32,
    refill_rate: Duration,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        // Stat taps come in bursts during play
        Self::new_with_limits(60, Duration::from_millis(250))
    }

    pub fn new_with_limits(max_tokens: u32, refill_rate: Duration) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate: refill_rate.max(Duration::from_millis(1)),
            last_refill: Instant::now(),
        }
    }

    pub fn check_rate_limit(&mut self) -> bool {
        self.refill_tokens();

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill_tokens(&mut self) {
        let time_passed = self.last_refill.elapsed();
        let refills = time_passed.as_millis() / self.refill_rate.as_millis();
        if refills > 0 {
            let tokens_to_add = u32::try_from(refills).unwrap_or(u32::MAX);
            self.tokens = self.tokens.saturating_add(tokens_to_add).min(self.max_tokens);
            self.last_refill = Instant::now();
        }
    }

    pub fn get_remaining_tokens(&mut self) -> u32 {
        self.refill_tokens();
        self.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_drains_then_refuses() {
        let mut limiter = RateLimiter::new_with_limits(3, Duration::from_secs(60));
        assert!(limiter.check_rate_limit());
        assert!(limiter.check_rate_limit());
        assert!(limiter.check_rate_limit());
        assert!(!limiter.check_rate_limit());
        assert_eq!(limiter.get_remaining_tokens(), 0);
    }

    #[tokio::test]
    async fn test_sub_second_refill() {
        let mut limiter = RateLimiter::new_with_limits(2, Duration::from_millis(10));
        assert!(limiter.check_rate_limit());
        assert!(limiter.check_rate_limit());
        assert!(!limiter.check_rate_limit());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.check_rate_limit());
    }

    #[tokio::test]
    async fn test_refill_never_exceeds_capacity() {
        let mut limiter = RateLimiter::new_with_limits(2, Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(limiter.get_remaining_tokens(), 2);
    }
}
