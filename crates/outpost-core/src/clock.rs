//! Deterministic simulation clock.
//!
//! Every timestamp in the core is simulation time in milliseconds read from
//! [`SimClock`]. Nothing consults the wall clock, so a run is fully
//! reproducible from its seed and command sequence.

use serde::{Deserialize, Serialize};

/// Milliseconds of simulation time.
pub type Millis = u64;

/// Fixed-step simulation clock.
///
/// # Example
///
/// ```
/// use outpost_core::clock::SimClock;
///
/// let mut clock = SimClock::new(16);
/// clock.advance();
/// clock.advance();
/// assert_eq!(clock.tick(), 2);
/// assert_eq!(clock.now(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    now_ms: Millis,
    tick: u64,
    tick_ms: Millis,
}

impl SimClock {
    /// Creates a clock at time zero advancing `tick_ms` per tick.
    #[must_use]
    pub const fn new(tick_ms: Millis) -> Self {
        Self {
            now_ms: 0,
            tick: 0,
            tick_ms,
        }
    }

    /// Advances one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.now_ms += self.tick_ms;
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.now_ms
    }

    /// Ticks elapsed since creation.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Length of one tick.
    #[must_use]
    pub const fn tick_ms(&self) -> Millis {
        self.tick_ms
    }

    /// Elapsed time in seconds, for smooth periodic motion.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn seconds(&self) -> f32 {
        self.now_ms as f32 / 1000.0
    }
}
