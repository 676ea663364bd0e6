//! # Random Sampler
//!
//! Produces the sequence of sample indices the solver visits.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::config::RandType;

/// Draws indices in `[0, n)` under a [`RandType`] policy.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    n: usize,
    rand_type: RandType,
    rng: StdRng,
    // Only used in `Perm` mode; `cursor == permutation.len()` means exhausted
    permutation: Vec<usize>,
    cursor: usize,
}

impl RandomSampler {
    /// Creates a sampler over `n` indices. `seed = None` seeds from entropy.
    pub fn new(n: usize, rand_type: RandType, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::from_rng(n, rand_type, rng)
    }

    /// Creates a sampler driven by an already seeded generator.
    pub fn from_rng(n: usize, rand_type: RandType, rng: StdRng) -> Self {
        let mut sampler = RandomSampler {
            n,
            rand_type,
            rng,
            permutation: Vec::new(),
            cursor: 0,
        };
        if rand_type == RandType::Perm {
            sampler.reshuffle();
        }
        sampler
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn rand_type(&self) -> RandType {
        self.rand_type
    }

    fn reshuffle(&mut self) {
        self.permutation = (0..self.n).collect();
        self.permutation.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    /// Next sample index.
    ///
    /// # Panics
    /// When the sampler was built over zero indices.
    pub fn next_index(&mut self) -> usize {
        assert!(self.n > 0, "cannot sample from an empty index set");
        match self.rand_type {
            RandType::Unif => self.rng.gen_range(0..self.n),
            RandType::Perm => {
                if self.cursor >= self.permutation.len() {
                    self.reshuffle();
                }
                let i = self.permutation[self.cursor];
                self.cursor += 1;
                i
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_reproducible_with_seed() {
        let mut a = RandomSampler::new(50, RandType::Unif, Some(3));
        let mut b = RandomSampler::new(50, RandType::Unif, Some(3));
        let xs: Vec<usize> = (0..200).map(|_| a.next_index()).collect();
        let ys: Vec<usize> = (0..200).map(|_| b.next_index()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&i| i < 50));
    }

    #[test]
    fn permutation_covers_each_index_once_per_pass() {
        let n = 37;
        let mut sampler = RandomSampler::new(n, RandType::Perm, Some(11));
        for _pass in 0..5 {
            let mut seen = vec![0usize; n];
            for _ in 0..n {
                seen[sampler.next_index()] += 1;
            }
            assert!(seen.iter().all(|&count| count == 1), "{:?}", seen);
        }
    }

    #[test]
    fn uniform_draws_with_replacement() {
        let n = 10;
        let mut sampler = RandomSampler::new(n, RandType::Unif, Some(0));
        // 1000 draws from 10 values must repeat
        let mut seen = vec![0usize; n];
        for _ in 0..1000 {
            seen[sampler.next_index()] += 1;
        }
        assert!(seen.iter().all(|&count| count > 0));
        assert_eq!(seen.iter().sum::<usize>(), 1000);
    }

    #[test]
    #[should_panic]
    fn empty_sampler_panics() {
        RandomSampler::new(0, RandType::Unif, Some(0)).next_index();
    }
}
