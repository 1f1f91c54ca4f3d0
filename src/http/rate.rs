use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Paces job production to a fixed number of dispatches per second.
///
/// Only the enqueue side waits on it; requests already handed to workers are
/// never held back.
#[derive(Debug)]
pub struct Throttle {
    ticker: Interval,
    period: Duration,
}

impl Throttle {
    /// Returns `None` (no pacing) when `qps` is zero or so large that the
    /// tick interval rounds down to nothing.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime with the timer enabled.
    #[must_use]
    pub fn new(qps: u64) -> Option<Self> {
        let micros = MICROS_PER_SECOND.checked_div(qps)?;
        if micros == 0 {
            return None;
        }
        let period = Duration::from_micros(micros);
        let first_tick = Instant::now().checked_add(period)?;
        let mut ticker = interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Some(Self { ticker, period })
    }

    /// Waits for the next permit. The first one arrives a full period after
    /// construction.
    pub async fn wait(&mut self) {
        self.ticker.tick().await;
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}
