use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, Default)]
/// Fixed pauses that let asynchronous rendering finish after a transition.
pub struct Pacing {
    /// Pause after a page transition (click or navigation).
    pub settle: Duration,
    /// Pause after navigating to a download target.
    pub download_settle: Duration,
}

impl Pacing {
    pub fn new(settle: Duration, download_settle: Duration) -> Self {
        Self {
            settle,
            download_settle,
        }
    }

    /// No pauses at all; for tests and in-memory fakes.
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Sleep for the settle delay.
    pub async fn settle(&self) {
        pause(self.settle).await;
    }

    /// Sleep for the download settle delay.
    pub async fn download_settle(&self) {
        pause(self.download_settle).await;
    }
}

async fn pause(d: Duration) {
    if !d.is_zero() {
        sleep(d).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn immediate_pacing_does_not_sleep() {
        let started = Instant::now();
        let pacing = Pacing::immediate();
        pacing.settle().await;
        pacing.download_settle().await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn settle_waits_at_least_the_delay() {
        let pacing = Pacing::new(Duration::from_millis(20), Duration::ZERO);
        let started = Instant::now();
        pacing.settle().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
