use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

/// Throttle hooks run by the dispatcher around every batch.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Called before a batch is issued.
    async fn before_batch(&self) {}

    /// Called once every result of a batch has been collected.
    async fn after_batch(&self);
}

/// Sleeps for a fixed cooldown after each batch. Does not react to 429s.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    cooldown: Duration,
}

impl FixedDelay {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn after_batch(&self) {
        sleep(self.cooldown).await;
    }
}

/// No throttling at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RateLimiter for NoDelay {
    async fn after_batch(&self) {}
}
