//! Millisecond tick clock used by button timers and the display compositor.
//!
//! All timing in this crate is expressed as `u32` milliseconds since some
//! arbitrary epoch (usually process start). Injecting the clock keeps the
//! debounce and rate-gate logic deterministic under test.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Monotonic millisecond source.
pub trait Clock: Send + Sync {
    /// Milliseconds since the clock's epoch. Must never decrease.
    fn now_ms(&self) -> u32;
}

/// Wall-time backed clock, epoch at construction.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// Manually advanced clock for tests and simulation.
pub struct ManualClock {
    now: AtomicU32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: AtomicU32::new(0) }
    }

    /// Advance the clock by `delta_ms`.
    pub fn advance(&self, delta_ms: u32) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, now_ms: u32) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }
}
