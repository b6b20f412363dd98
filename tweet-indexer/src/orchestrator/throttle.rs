//! Fixed-interval admission gate for dispatching records.

use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Admits at most one caller per period.
///
/// The first admission is immediate; each later one waits until a full period has
/// passed since the previous admission. A zero period disables the gate.
#[derive(Debug)]
pub struct RateGate {
    ticker: Option<Interval>,
}

impl RateGate {
    pub fn new(period: Duration) -> Self {
        let ticker = (!period.is_zero()).then(|| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        Self { ticker }
    }

    /// Wait for the next admission slot.
    pub async fn admit(&mut self) {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.tick().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_admissions_are_spaced_by_period() {
        let mut gate = RateGate::new(Duration::from_secs(3));
        let start = Instant::now();

        gate.admit().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        gate.admit().await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));

        gate.admit().await;
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_is_not_banked() {
        let mut gate = RateGate::new(Duration::from_secs(3));
        gate.admit().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        let resumed = Instant::now();
        gate.admit().await;
        gate.admit().await;

        assert_eq!(resumed.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_never_waits() {
        let mut gate = RateGate::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            gate.admit().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
