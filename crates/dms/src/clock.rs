//! Monotonic time sources

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of monotonic "now"
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock backed monotonic time
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests and recorded replays
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            now: Cell::new(origin),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump to `offset` after the origin. Never moves backwards.
    pub fn set_offset(&self, offset: Duration) {
        let target = self.origin + offset;
        if target > self.now.get() {
            self.now.set(target);
        }
    }

    /// Time since the origin
    pub fn elapsed(&self) -> Duration {
        self.now.get() - self.origin
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_monotonic() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - start, Duration::from_millis(250));

        clock.set_offset(Duration::from_millis(100));
        assert_eq!(clock.elapsed(), Duration::from_millis(250));

        clock.set_offset(Duration::from_secs(2));
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }
}
