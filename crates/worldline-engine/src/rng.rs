//! The randomness capability passed into every stochastic stage.

/// Source of uniform draws.
///
/// Every [`rand::Rng`] is a `RandomSource`; the engine itself uses
/// `rand_chacha::ChaCha8Rng` so runs are reproducible from a seed.
pub trait RandomSource {
    /// A draw from `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// A draw from `0..n`. `n` must be non-zero.
    fn uniform_index(&mut self, n: usize) -> usize;

    /// `true` with probability `p`.
    #[inline]
    fn bernoulli(&mut self, p: f64) -> bool {
        self.uniform() < p
    }
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }

    #[inline]
    fn uniform_index(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "uniform_index(0)");
        self.random_range(0..n)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::RandomSource;

    /// Replays a fixed list of uniforms; index draws scale them.
    pub(crate) struct Scripted {
        values: Vec<f64>,
        pos: usize,
    }

    impl Scripted {
        pub(crate) fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                pos: 0,
            }
        }

        pub(crate) fn consumed(&self) -> usize {
            self.pos
        }
    }

    impl RandomSource for Scripted {
        fn uniform(&mut self) -> f64 {
            let v = self.values[self.pos % self.values.len()];
            self.pos += 1;
            v
        }

        fn uniform_index(&mut self, n: usize) -> usize {
            ((self.uniform() * n as f64) as usize).min(n - 1)
        }
    }
}
