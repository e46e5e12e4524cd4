//! The simulation clock.
//!
//! Time advances by a fixed increment per tick, not by elapsed wall-clock
//! time, so animation speed follows the display's refresh rate. Quantities
//! expressed "per second" (hue rotation, fadeout) convert with an assumed
//! [`TICK_RATE`].

use serde::{Deserialize, Serialize};

/// Simulation time added per tick.
pub const TIME_STEP: f64 = 0.0005;

/// Ticks per second assumed when converting per-second rates.
pub const TICK_RATE: f64 = 60.0;

/// Monotonic simulation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    time: f64,
}

impl Clock {
    /// A clock resumed at `time` (used when restoring a frozen state).
    pub fn at(time: f64) -> Self {
        Self { time }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advances one tick and returns the new time.
    pub fn tick(&mut self) -> f64 {
        self.time += TIME_STEP;
        self.time
    }
}
