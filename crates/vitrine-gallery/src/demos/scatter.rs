//! Cheap repeatable randomness for procedural point clouds.

use std::time::{SystemTime, UNIX_EPOCH};

/// xorshift64*; demos only need a fast scatter, not statistical quality.
pub struct Scatter(u64);

impl Scatter {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    /// Seeded from the wall clock, so every launch scatters differently.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64);
        Self::new(nanos)
    }

    /// Uniform in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        let bits = self.0.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 40;
        bits as f32 / (1u64 << 24) as f32
    }

    /// Uniform in `[-0.5, 0.5)`.
    pub fn centered(&mut self) -> f32 {
        self.unit() - 0.5
    }

    /// Uniform in `[-1, 1)`, cubed so most values hug zero.
    pub fn offset(&mut self) -> f32 {
        (self.unit() * 2.0 - 1.0).powi(3)
    }

    /// Random color with every channel in `[0, 1)`.
    pub fn color(&mut self) -> [f32; 3] {
        [self.unit(), self.unit(), self.unit()]
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f32) as usize).min(len - 1)
    }
}
