//! Random sources for spawning and tie-breaking.
//!
//! The engine draws every random number through [`RandomSource`], so a game
//! can run on a seeded [`fastrand::Rng`] or on a [`ScriptedRandom`] that
//! replays a fixed sequence.

/// A uniform random number generator.
pub trait RandomSource {
    /// A float in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// An integer in `[0, n)`. `n` must be positive.
    fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "below(0) has no valid result");
        let pick = (self.next_f64() * n as f64) as usize;
        pick.min(n.saturating_sub(1))
    }
}

impl RandomSource for fastrand::Rng {
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }

    fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "below(0) has no valid result");
        self.usize(..n.max(1))
    }
}

/// Replays a fixed list of floats in `[0, 1)`, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// An empty script behaves like a constant `0.0`.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// A source that returns `value` forever.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999_999)
    }
}
