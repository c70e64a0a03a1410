//! Deterministic pseudo-randomness keyed on discretized coordinates.
//!
//! The same key always yields the same value, across runs and platforms.

/// Grid keys are rounded to this many units per degree / meter / day.
const LATLON_STEPS_PER_DEG: f64 = 100.0;

/// Hashable sample coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SampleKey<'a> {
    pub tag: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub day: i64,
    pub index: u32,
}

impl SampleKey<'_> {
    fn digest(&self) -> blake3::Hash {
        let mut h = blake3::Hasher::new();
        h.update(self.tag.as_bytes());
        h.update(&grid(self.latitude, LATLON_STEPS_PER_DEG).to_le_bytes());
        h.update(&grid(self.longitude, LATLON_STEPS_PER_DEG).to_le_bytes());
        h.update(&grid(self.depth, 1.0).to_le_bytes());
        h.update(&self.day.to_le_bytes());
        h.update(&self.index.to_le_bytes());
        h.finalize()
    }

    /// Uniform value in `[0, 1)`.
    pub fn unit(&self) -> f64 {
        let bytes = self.digest();
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes.as_bytes()[..8]);
        // 53 significant bits map exactly onto an f64 mantissa.
        (u64::from_le_bytes(word) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[-1, 1)`.
    pub fn signed(&self) -> f64 {
        self.unit() * 2.0 - 1.0
    }

    /// Integer in `0..n` (`n > 0`).
    pub fn below(&self, n: u64) -> u64 {
        ((self.unit() * n as f64) as u64).min(n.saturating_sub(1))
    }
}

fn grid(v: f64, steps: f64) -> i64 {
    if v.is_finite() { (v * steps).round() as i64 } else { 0 }
}
