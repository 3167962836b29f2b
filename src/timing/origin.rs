use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of wall-clock timestamps, in the same unit and base as incoming
/// MIDI event timestamps (milliseconds).
pub trait WallClock: Send + Sync {
    fn now_ms(&self) -> f64;
}

/// Monotonic playback-synchronized clock, in seconds.
pub trait ReferenceClock: Send + Sync {
    fn now_seconds(&self) -> f64;
}

/// Clock measuring time since its own creation.
///
/// The binary creates separate instances for the wall and reference clocks,
/// so the two differ by a small startup offset.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

impl ReferenceClock for MonotonicClock {
    fn now_seconds(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests and scripted replays.
///
/// Stores milliseconds as `f64` bits so it can be shared across threads
/// without a lock.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            millis: AtomicU64::new(start_ms.to_bits()),
        }
    }

    pub fn set_ms(&self, millis: f64) {
        self.millis.store(millis.to_bits(), Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta: f64) {
        self.set_ms(self.now_ms() + delta);
    }
}

impl WallClock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.millis.load(Ordering::SeqCst))
    }
}

impl ReferenceClock for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.now_ms() / 1000.0
    }
}

/// Anchor of musical time zero for one session.
///
/// Captured on every reset and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingOrigin {
    pub wall_clock_start_ms: f64,
    pub reference_clock_start: f64,
    /// `wall_clock_start_ms / 1000 - reference_clock_start`
    pub reference_clock_offset: f64,
    pub started_at: DateTime<Local>,
}

impl TimingOrigin {
    pub fn new(wall_clock_start_ms: f64, reference_clock_start: f64) -> Self {
        Self {
            wall_clock_start_ms,
            reference_clock_start,
            reference_clock_offset: wall_clock_start_ms / 1000.0 - reference_clock_start,
            started_at: Local::now(),
        }
    }

    /// Reads both clocks back to back.
    pub fn capture(wall: &dyn WallClock, reference: &dyn ReferenceClock) -> Self {
        Self::new(wall.now_ms(), reference.now_seconds())
    }

    pub fn reference_to_wall_ms(&self, reference_seconds: f64) -> f64 {
        (reference_seconds + self.reference_clock_offset) * 1000.0
    }

    pub fn wall_ms_to_reference(&self, wall_ms: f64) -> f64 {
        wall_ms / 1000.0 - self.reference_clock_offset
    }
}
