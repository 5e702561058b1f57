//! Tip-height refresh cadence.
//!
//! Timer ticks and navigation triggers share one leading-edge throttle
//! window: a trigger that passes restarts the window, a suppressed one does
//! not. Ticks are further gated on page visibility.

use std::time::{Duration, Instant};

pub const DEFAULT_TIP_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_TIP_MIN_SPACING: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct TipRefresh {
    interval: Duration,
    min_spacing: Duration,
    last_fired: Option<Instant>,
}

impl Default for TipRefresh {
    fn default() -> Self {
        Self::new(DEFAULT_TIP_INTERVAL, DEFAULT_TIP_MIN_SPACING)
    }
}

impl TipRefresh {
    pub fn new(interval: Duration, min_spacing: Duration) -> Self {
        Self {
            interval,
            min_spacing,
            last_fired: None,
        }
    }

    /// Cadence of the periodic timer.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn on_tick(&mut self, at: Instant, visible: bool) -> bool {
        visible && self.throttle(at)
    }

    pub fn on_navigation(&mut self, at: Instant) -> bool {
        self.throttle(at)
    }

    fn throttle(&mut self, at: Instant) -> bool {
        let open = self
            .last_fired
            .map_or(true, |last| at.saturating_duration_since(last) >= self.min_spacing);
        if open {
            self.last_fired = Some(at);
        }
        open
    }
}

#[cfg(test)]
#[path = "tests/refresh_tests.rs"]
mod tests;
