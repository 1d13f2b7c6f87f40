use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic per-stage random stream.
///
/// Seeded once per stage call; `skip` discards draws so two stages sharing a
/// seed can still be decorrelated.
#[derive(Debug, Clone)]
pub struct StageRng {
    rng: ChaCha8Rng,
}

impl StageRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            self.next_unit();
        }
    }

    /// Uniform in [0, 1).
    pub fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Uniform in [-1, 1).
    pub fn next_bipolar(&mut self) -> f64 {
        self.next_unit() * 2.0 - 1.0
    }
}
