use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Simulation-time countdown in seconds, floored at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    pub remaining: f32,
}

impl Countdown {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Frame-counted cooldown. Zero means ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCooldown {
    remaining: u32,
}

impl FrameCooldown {
    pub fn trigger(&mut self, frames: u32) {
        self.remaining = frames;
    }

    /// Count down one frame.
    pub fn step(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn clear(&mut self) {
        self.remaining = 0;
    }
}

/// Shared tick mailbox between a real-time clock and the simulation thread.
///
/// The clock side only ever calls [`TickCounter::post`]; the simulation drains
/// the accumulated count once per frame, so all state that depends on ticks is
/// written from a single thread.
#[derive(Debug, Clone, Default)]
pub struct TickCounter(Arc<AtomicU32>);

impl TickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    pub fn post_many(&self, n: u32) {
        self.0.fetch_add(n, Ordering::AcqRel);
    }

    /// Take every tick posted since the last drain.
    pub fn drain(&self) -> u32 {
        self.0.swap(0, Ordering::AcqRel)
    }

    /// Ticks waiting to be drained.
    pub fn pending(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
}

/// Number of whole ticks of `period` that fit in `elapsed`.
pub fn ticks_in(elapsed: Duration, period: Duration) -> u32 {
    if period.is_zero() {
        return 0;
    }
    (elapsed.as_nanos() / period.as_nanos()).min(u32::MAX as u128) as u32
}
