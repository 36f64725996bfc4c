use std::cell::Cell;
use std::time::Instant;

/// Monotonic milliseconds since boot.
///
/// Timestamps from this trait are only ever compared against each other for
/// elapsed-time checks; they carry no wall-clock meaning.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// Lets tests hand a node `&ManualClock` while keeping a handle to advance it.
impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Clock backed by [`std::time::Instant`], anchored at construction.
#[derive(Debug)]
pub struct WallClock {
    boot: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }
}

/// Test clock advanced explicitly, so readiness windows can be stepped
/// through deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, delta: u64) {
        self.now_ms.set(self.now_ms.get() + delta);
    }

    pub fn set_ms(&self, now: u64) {
        self.now_ms.set(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}
