//! Single-shot trailing debouncer.
//!
//! Each [`schedule`](Debouncer::schedule) replaces any pending deadline,
//! so a burst of changes produces one firing, `delay` after the last
//! change. The debouncer holds no timer of its own: the owner calls
//! [`poll`](Debouncer::poll) (or waits [`remaining`](Debouncer::remaining)
//! and then polls).
//!
//! [`epoch`](Debouncer::epoch) changes whenever the pending deadline is
//! set, moved, or cleared, so an owner running a real timer can tell
//! whether it needs re-arming.

use std::time::Duration;

use crate::clock::Clock;

/// Trailing debouncer over an arbitrary [`Clock`].
pub struct Debouncer<K: Clock> {
    clock: K,
    delay: Duration,
    scheduled_at: Option<K::Instant>,
    epoch: u64,
}

impl<K: Clock> Debouncer<K> {
    /// Create an idle debouncer.
    #[must_use]
    pub const fn new(clock: K, delay: Duration) -> Self {
        Self {
            clock,
            delay,
            scheduled_at: None,
            epoch: 0,
        }
    }

    /// Configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// The clock driving this debouncer.
    #[must_use]
    pub const fn clock(&self) -> &K {
        &self.clock
    }

    /// (Re)start the quiet period from now, discarding any earlier deadline.
    pub fn schedule(&mut self) {
        self.scheduled_at = Some(self.clock.now());
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        if self.scheduled_at.take().is_some() {
            self.epoch = self.epoch.wrapping_add(1);
        }
    }

    /// Counter bumped on every change to the pending deadline.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// `true` while a firing is scheduled.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.scheduled_at.is_some()
    }

    /// Time left until the pending firing is due.
    ///
    /// `None` when nothing is scheduled, `Some(Duration::ZERO)` when it is
    /// already due.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.scheduled_at
            .as_ref()
            .map(|at| self.delay.saturating_sub(self.clock.elapsed(at)))
    }

    /// Fire if due. Returns `true` exactly once per scheduled deadline.
    pub fn poll(&mut self) -> bool {
        if self.remaining() == Some(Duration::ZERO) {
            self.scheduled_at = None;
            self.epoch = self.epoch.wrapping_add(1);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn idle_debouncer_never_fires() {
        let mut debouncer = Debouncer::new(ManualClock::new(), DELAY);
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.remaining(), None);
        assert!(!debouncer.poll());
    }

    #[test]
    fn fires_once_after_delay() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(clock.clone(), DELAY);
        debouncer.schedule();

        clock.advance(Duration::from_millis(99));
        assert!(!debouncer.poll());
        assert_eq!(debouncer.remaining(), Some(Duration::from_millis(1)));

        clock.advance(Duration::from_millis(1));
        assert!(debouncer.poll());
        assert!(!debouncer.poll(), "must not fire twice");
    }

    #[test]
    fn reschedule_restarts_quiet_period() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(clock.clone(), DELAY);
        debouncer.schedule();
        clock.advance(Duration::from_millis(50));
        debouncer.schedule();

        clock.advance(Duration::from_millis(60));
        assert!(!debouncer.poll(), "only 60ms since the second change");

        clock.advance(Duration::from_millis(40));
        assert!(debouncer.poll());
    }

    #[test]
    fn cancel_discards_deadline() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(clock.clone(), DELAY);
        debouncer.schedule();
        debouncer.cancel();
        clock.advance(Duration::from_secs(1));
        assert!(!debouncer.poll());
    }

    #[test]
    fn epoch_tracks_deadline_changes() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(clock.clone(), DELAY);
        let idle = debouncer.epoch();

        debouncer.cancel();
        assert!(!debouncer.poll());
        assert_eq!(debouncer.epoch(), idle, "nothing pending, nothing changed");

        debouncer.schedule();
        let scheduled = debouncer.epoch();
        assert_ne!(scheduled, idle);

        clock.advance(Duration::from_millis(10));
        debouncer.schedule();
        assert_ne!(debouncer.epoch(), scheduled, "moved deadline");

        let moved = debouncer.epoch();
        debouncer.cancel();
        assert_ne!(debouncer.epoch(), moved);
    }
}
