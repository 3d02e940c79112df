//! # Update Time Statistics
//!
//! Frame times accumulate into a window. Whenever the total frame count
//! reaches a power of two above 4 (8, 16, 32, ...), the window's mean is
//! reported and the window starts over, so reports thin out as a run goes
//! on.

use std::time::Duration;

/// Accumulates per-frame update times.
#[derive(Clone, Debug, Default)]
pub struct UpdateStats {
    window_us: u64,
    window_frames: u64,
    total_us: u64,
    total_frames: u64,
    min_us: Option<u64>,
    max_us: u64,
}

impl UpdateStats {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame. Returns the window's mean update time in
    /// milliseconds when this frame triggers a report.
    pub fn record(&mut self, elapsed: Duration) -> Option<f64> {
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.record_us(us)
    }

    /// Records one frame given in microseconds.
    pub fn record_us(&mut self, us: u64) -> Option<f64> {
        self.window_us = self.window_us.saturating_add(us);
        self.window_frames += 1;
        self.total_us = self.total_us.saturating_add(us);
        self.total_frames += 1;
        self.min_us = Some(self.min_us.map_or(us, |min| min.min(us)));
        self.max_us = self.max_us.max(us);

        if self.total_frames > 4 && self.total_frames.is_power_of_two() {
            let mean = self.window_us as f64 / self.window_frames as f64 / 1000.0;
            self.window_us = 0;
            self.window_frames = 0;
            Some(mean)
        } else {
            None
        }
    }

    /// Frames recorded.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Mean update time over the whole run, in milliseconds.
    #[must_use]
    pub fn mean_ms(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.total_us as f64 / self.total_frames as f64 / 1000.0
    }

    /// Fastest frame, in milliseconds.
    #[must_use]
    pub fn min_ms(&self) -> f64 {
        self.min_us.unwrap_or(0) as f64 / 1000.0
    }

    /// Slowest frame, in milliseconds.
    #[must_use]
    pub fn max_ms(&self) -> f64 {
        self.max_us as f64 / 1000.0
    }
}
