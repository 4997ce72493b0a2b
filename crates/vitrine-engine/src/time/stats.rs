use super::PeriodicGate;

/// Frames-per-second counter.
///
/// Counts frames and produces a new rate sample once per reporting window.
#[derive(Debug, Clone)]
pub struct FrameStats {
    gate: PeriodicGate,
    frames: u32,
    window_start: f32,
    fps: Option<f32>,
}

impl FrameStats {
    pub fn new(window_seconds: f32) -> Self {
        Self {
            gate: PeriodicGate::new(window_seconds),
            frames: 0,
            window_start: 0.0,
            fps: None,
        }
    }

    /// Records one frame at `elapsed` seconds.
    ///
    /// Returns the new sample when a window closes.
    pub fn record(&mut self, elapsed: f32) -> Option<f32> {
        self.frames += 1;
        if !self.gate.is_elapsed(elapsed) {
            return None;
        }

        let span = elapsed - self.window_start;
        let fps = if span > 0.0 { self.frames as f32 / span } else { 0.0 };

        self.frames = 0;
        self.window_start = elapsed;
        self.fps = Some(fps);
        self.fps
    }

    /// Last completed sample, if any.
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let mut stats = FrameStats::new(1.0);
        for i in 1..60 {
            assert_eq!(stats.record(i as f32 / 60.0), None);
        }
        let fps = stats.record(1.0).unwrap();
        assert!((fps - 60.0).abs() < 1e-3);
        assert_eq!(stats.fps(), Some(fps));
    }

    #[test]
    fn second_window_counts_only_its_frames() {
        let mut stats = FrameStats::new(1.0);
        stats.record(1.0);
        for i in 1..30 {
            stats.record(1.0 + i as f32 / 30.0);
        }
        let fps = stats.record(2.0).unwrap();
        assert!((fps - 30.0).abs() < 1e-3);
    }
}
