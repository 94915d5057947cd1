//! Day/night cycle driven by simulated time.

use engine_spawning::DayNightClock;

/// Default length of a full day, in milliseconds of simulated time.
pub const DEFAULT_DAY_LENGTH_MS: u64 = 20 * 60 * 1_000;

/// A repeating day of `day_length_ms`; the first half is day, the second night.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleClock {
    day_length_ms: u64,
    now_ms: u64,
}

impl CycleClock {
    #[must_use]
    pub fn new(day_length_ms: u64) -> Self {
        Self {
            day_length_ms,
            now_ms: 0,
        }
    }

    pub fn set_time(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

}

impl Default for CycleClock {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_LENGTH_MS)
    }
}

impl DayNightClock for CycleClock {
    /// A zero-length day is always day.
    fn is_night(&self) -> bool {
        if self.day_length_ms == 0 {
            return false;
        }
        self.now_ms % self.day_length_ms >= self.day_length_ms / 2
    }
}
