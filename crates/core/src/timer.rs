//! Frame timer supplying the per-frame delta.

use std::time::{Duration, Instant};

/// High-resolution timer for measuring elapsed time.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
    fixed_delta: Option<f32>,
}

impl Timer {
    /// Create a new timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            fixed_delta: None,
        }
    }

    /// Create a timer that reports the same delta on every tick.
    ///
    /// Useful for headless runs where wall-clock time would make the
    /// animation depend on how fast the machine is.
    pub fn fixed(delta_secs: f32) -> Self {
        Self {
            fixed_delta: Some(delta_secs),
            ..Self::new()
        }
    }

    /// Get the total elapsed time since the timer was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the elapsed time in seconds since the timer was created.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Get the time elapsed since the last call to `tick()`.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta
    }

    /// Get the delta time in seconds since the last tick.
    ///
    /// A fixed timer still advances its clock but always reports its
    /// configured step.
    pub fn delta_secs(&mut self) -> f32 {
        let measured = self.tick().as_secs_f32();
        self.fixed_delta.unwrap_or(measured)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
