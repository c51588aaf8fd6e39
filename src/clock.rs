//! Monotonic scene clock

use std::time::{Duration, Instant};

/// Elapsed-time source started once at setup and never reset
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Starts the clock at a given instant
    pub fn started_at(start: Instant) -> Self {
        Self { start }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Seconds since start as `f32`, the unit the animation works in
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Seconds between the clock start and `now`; zero if `now` is earlier
    pub fn seconds_at(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::start()
    }
}
