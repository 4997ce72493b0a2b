/// Stateful predicate that fires at most once per fixed time window.
///
/// The caller supplies a non-decreasing elapsed time (seconds) on every poll;
/// typically [`FrameTime::elapsed`](super::FrameTime::elapsed).
///
/// Time going backwards (clock reset) is not corrected: the gate simply
/// compares against the last fire time, which may delay or advance the next fire.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PeriodicGate {
    period: f32,
    last_fire: f32,
}

impl PeriodicGate {
    /// Creates a gate with a period in seconds.
    pub fn new(period_seconds: f32) -> Self {
        Self {
            period: period_seconds,
            last_fire: 0.0,
        }
    }

    /// Creates a gate with a period in milliseconds.
    pub fn from_millis(period_ms: u32) -> Self {
        Self::new(period_ms as f32 / 1000.0)
    }

    #[inline]
    pub fn period(&self) -> f32 {
        self.period
    }

    /// Elapsed time at which the gate last fired (0 before the first fire).
    #[inline]
    pub fn last_fire(&self) -> f32 {
        self.last_fire
    }

    /// Returns `true` and records `elapsed` if at least one period has passed
    /// since the last fire. Otherwise returns `false` and leaves state unchanged.
    pub fn is_elapsed(&mut self, elapsed: f32) -> bool {
        let delta = elapsed - self.last_fire;
        if delta >= self.period {
            self.last_fire = elapsed;
            return true;
        }
        false
    }
}
