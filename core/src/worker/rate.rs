//! Per-worker rate limiting

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Periodic tick source pacing one worker to a target commands-per-second
/// rate.
///
/// Accuracy is OS timer accuracy, best effort: ticks that fall behind are
/// delayed rather than compensated for, so a stalled worker does not burst
/// afterwards.
pub struct RateTicker {
    interval: Interval,
}

impl RateTicker {
    /// A ticker firing `per_second` times a second, starting one period from
    /// now
    pub fn new(per_second: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(per_second));
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
