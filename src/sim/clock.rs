//! Frame clock
//!
//! Turns host animation timestamps into simulation deltas. The first
//! timestamp after a reset only establishes the baseline.

use crate::consts::MAX_FRAME_DELTA_MS;

/// Monotonic delta source driven by host timestamps (milliseconds)
#[derive(Debug, Clone)]
pub struct Clock {
    previous: Option<f64>,
    max_delta_ms: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            previous: None,
            max_delta_ms: MAX_FRAME_DELTA_MS,
        }
    }

    /// Clock with a custom catch-up limit
    pub fn with_max_delta(max_delta_ms: f64) -> Self {
        Self {
            previous: None,
            max_delta_ms: max_delta_ms.max(0.0),
        }
    }

    /// Forget the baseline; the next tick yields a zero delta
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Move the baseline to `now` without producing a delta (used on resume)
    pub fn rebase(&mut self, now: f64) {
        self.previous = Some(now);
    }

    /// Last timestamp seen, if any
    pub fn last_timestamp(&self) -> Option<f64> {
        self.previous
    }

    /// Report a timestamp and get the clamped delta since the previous one
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        let Some(previous) = self.previous.replace(timestamp) else {
            return 0.0;
        };

        let raw = timestamp - previous;
        if raw < 0.0 {
            log::warn!("Clock went backwards by {:.3}ms, treating as zero", -raw);
            return 0.0;
        }
        if raw > self.max_delta_ms {
            log::debug!("Clamping frame delta {:.1}ms to {:.1}ms", raw, self.max_delta_ms);
            return self.max_delta_ms;
        }
        raw
    }
}
