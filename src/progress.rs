//! Step timing helpers for the bulk-load progress bar.
//!
//! This module is enabled only with the `progress` feature.

use std::time::{Duration, Instant};

/// Tracks the wall-clock duration of each bulk-load step.
pub struct StepTimer {
    last: Instant,
}

impl StepTimer {
    pub fn start() -> Self {
        StepTimer {
            last: Instant::now(),
        }
    }

    /// Duration since the previous tick (or since start).
    #[inline]
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        dt
    }
}

/// Human-readable duration: `"253µs"`, `"42ms"` or `"3.14s"` by scale.
#[inline]
pub fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else {
        let ms = d.as_millis();
        if ms < 1_000 {
            format!("{ms}ms")
        } else {
            let s = d.as_secs_f32();
            format!("{s:.2}s")
        }
    }
}
