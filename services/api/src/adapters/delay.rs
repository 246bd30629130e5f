//! services/api/src/adapters/delay.rs
//!
//! Real-time implementation of the `Delay` port used by the mock auth flows.

use async_trait::async_trait;
use nihongo_core::ports::Delay;
use std::time::Duration;

/// A `Delay` backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_requested_duration() {
        let start = tokio::time::Instant::now();
        TokioDelay.wait(Duration::from_millis(500)).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
