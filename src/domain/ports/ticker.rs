//! Clock port for the polling loops.

use std::time::Duration;

use async_trait::async_trait;

/// Sleep boundary of the polling loops.
///
/// Loops call `sleep` between ticks; tests substitute an implementation that
/// returns immediately and records the requested durations.
#[async_trait]
pub trait Ticker: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock ticker backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTicker;

#[async_trait]
impl Ticker for TokioTicker {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
