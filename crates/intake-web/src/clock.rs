//! Browser time source.

use std::time::Duration;

use intake_imaging::Clock;

/// [`Clock`] backed by `web_time::Instant` (`performance.now()` on WASM).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebClock;

impl Clock for WebClock {
    type Instant = web_time::Instant;

    fn now(&self) -> web_time::Instant {
        web_time::Instant::now()
    }

    fn elapsed(&self, since: &web_time::Instant) -> Duration {
        since.elapsed()
    }
}
