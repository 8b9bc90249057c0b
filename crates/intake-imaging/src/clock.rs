//! Time sources for the emission debouncer.
//!
//! The core never reads the wall clock directly. Native callers use
//! [`StdClock`]; the browser crate supplies a `web-time` clock; tests
//! and offline replays use [`ManualClock`] and advance it by hand.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Abstraction over a monotonic time source.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// Capture the current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the surface under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// A clock starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Time since the clock was created.
    #[must_use]
    pub fn current(&self) -> Duration {
        self.now.get()
    }
}

impl Clock for ManualClock {
    type Instant = Duration;

    fn now(&self) -> Duration {
        self.now.get()
    }

    fn elapsed(&self, since: &Duration) -> Duration {
        self.now.get().saturating_sub(*since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let start = clock.now();
        handle.advance(Duration::from_millis(40));
        assert_eq!(clock.elapsed(&start), Duration::from_millis(40));
        assert_eq!(clock.current(), Duration::from_millis(40));
    }

    #[test]
    fn std_clock_is_monotonic() {
        let clock = StdClock;
        let start = clock.now();
        assert!(clock.elapsed(&start) < Duration::from_secs(60));
    }
}
