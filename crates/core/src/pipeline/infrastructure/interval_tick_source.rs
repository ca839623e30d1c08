use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::pipeline::domain::tick_source::TickSource;

/// Wall-clock ticks from `crossbeam_channel::tick`.
///
/// The ticker channel holds at most one pending tick, so a slow iteration
/// coalesces the ticks it overran instead of queueing them.
pub struct IntervalTickSource {
    ticker: Receiver<std::time::Instant>,
}

impl IntervalTickSource {
    pub fn new(period: Duration) -> Self {
        Self {
            ticker: crossbeam_channel::tick(period),
        }
    }

    pub fn from_millis(period_ms: u64) -> Self {
        Self::new(Duration::from_millis(period_ms))
    }
}

impl TickSource for IntervalTickSource {
    fn wait_next(&mut self) -> bool {
        self.ticker.recv().is_ok()
    }
}

/// Fires a fixed number of ticks back to back, then stops.
///
/// Replays and tests use it to step the session without sleeping.
pub struct CountedTickSource {
    remaining: u64,
}

impl CountedTickSource {
    pub fn new(ticks: u64) -> Self {
        Self { remaining: ticks }
    }
}

impl TickSource for CountedTickSource {
    fn wait_next(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
