//! Bootstrap resamplers over a [`Dataset`].

use super::{Dataset, Split};
use crate::core::error::{Result, ToupeeError};
use crate::core::traits::Resampler;
use rand::distributions::{Distribution, WeightedIndex};
use rand::prelude::*;

/// Uniform bootstrap: every draw picks a training example with equal probability.
#[derive(Debug)]
pub struct UniformResampler {
    dataset: Dataset,
    rng: StdRng,
}

impl UniformResampler {
    /// Creates a new uniform resampler seeded with `seed`.
    pub fn new(dataset: Dataset, seed: u64) -> Self {
        UniformResampler {
            dataset,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Resampler for UniformResampler {
    fn make_new_train(&mut self, size: usize) -> Result<Split> {
        let n = self.dataset.train().len();
        let indices: Vec<usize> = (0..size).map(|_| self.rng.gen_range(0..n)).collect();
        log::debug!("Drew uniform resample of {} from {} examples", size, n);
        Ok(self.dataset.train().select(&indices))
    }

    fn get_train(&self) -> &Split {
        self.dataset.train()
    }

    fn get_valid(&self) -> &Split {
        self.dataset.valid()
    }

    fn get_test(&self) -> &Split {
        self.dataset.test()
    }

    fn update_weights(&mut self, _distribution: &[f64]) -> Result<()> {
        Err(ToupeeError::config(
            "uniform resampler does not accept a sampling distribution",
        ))
    }

    fn weights(&self) -> Option<&[f64]> {
        None
    }
}

/// Weighted bootstrap: draws follow the current sampling distribution.
#[derive(Debug)]
pub struct WeightedResampler {
    dataset: Dataset,
    weights: Vec<f64>,
    sampler: WeightedIndex<f64>,
    rng: StdRng,
}

impl WeightedResampler {
    /// Creates a new weighted resampler with a uniform starting distribution.
    pub fn new(dataset: Dataset, seed: u64) -> Result<Self> {
        let n = dataset.train().len();
        let weights = vec![1.0 / n as f64; n];
        let sampler = build_sampler(&weights)?;
        Ok(WeightedResampler {
            dataset,
            weights,
            sampler,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

fn build_sampler(weights: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(weights)
        .map_err(|e| ToupeeError::numerical(format!("invalid sampling distribution: {}", e)))
}

impl Resampler for WeightedResampler {
    fn make_new_train(&mut self, size: usize) -> Result<Split> {
        let indices: Vec<usize> = (0..size)
            .map(|_| self.sampler.sample(&mut self.rng))
            .collect();
        log::debug!(
            "Drew weighted resample of {} from {} examples",
            size,
            self.weights.len()
        );
        Ok(self.dataset.train().select(&indices))
    }

    fn get_train(&self) -> &Split {
        self.dataset.train()
    }

    fn get_valid(&self) -> &Split {
        self.dataset.valid()
    }

    fn get_test(&self) -> &Split {
        self.dataset.test()
    }

    fn update_weights(&mut self, distribution: &[f64]) -> Result<()> {
        if distribution.len() != self.weights.len() {
            return Err(ToupeeError::dimension_mismatch(
                format!("{} weights", self.weights.len()),
                format!("{} weights", distribution.len()),
            ));
        }
        if let Some(bad) = distribution.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ToupeeError::numerical(format!(
                "sampling weight {} is not a finite non-negative number",
                bad
            )));
        }
        self.sampler = build_sampler(distribution)?;
        self.weights = distribution.to_vec();
        Ok(())
    }

    fn weights(&self) -> Option<&[f64]> {
        Some(&self.weights)
    }
}
