// ============================================================
// Layer 6 — Wall-Clock Timer
// ============================================================
// tic / toc measure one interval; hold / release accumulate
// several intervals (e.g. only the time spent inside the model,
// not in data loading) and hand back the total.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Timer {
    t0:  Instant,
    acc: Duration,
}

impl Timer {
    /// A new timer, already started.
    pub fn new() -> Self {
        Self { t0: Instant::now(), acc: Duration::ZERO }
    }

    pub fn tic(&mut self) {
        self.t0 = Instant::now();
    }

    /// Seconds since the last tic; `restart` starts a new interval.
    pub fn toc(&mut self, restart: bool) -> f64 {
        let elapsed = self.t0.elapsed().as_secs_f64();
        if restart {
            self.t0 = Instant::now();
        }
        elapsed
    }

    /// Add the current interval to the accumulator.
    pub fn hold(&mut self) {
        self.acc += self.t0.elapsed();
    }

    /// Return the accumulated seconds and clear them.
    pub fn release(&mut self) -> f64 {
        let total = self.acc.as_secs_f64();
        self.acc = Duration::ZERO;
        total
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
