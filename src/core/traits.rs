//! Trait abstractions for the collaborators the ensemble core drives.
//!
//! The core never trains a network itself. It asks a [`ModelTrainer`] for a
//! [`Member`], asks a [`Resampler`] for training data, and feeds the member's
//! errors back into the resampler's distribution.

use crate::architecture::{ModelConfig, WarmStart, WeightSnapshot};
use crate::config::TrainingParams;
use crate::core::error::Result;
use crate::core::types::*;
use crate::dataset::Split;
use ndarray::{Array2, ArrayView2};
use std::fmt::Debug;

/// A trained ensemble member.
pub trait Member: Send + Sync + Debug {
    /// Class-probability rows for a batch of inputs.
    fn predict_proba(
        &self,
        data: ArrayView2<'_, Feature>,
        batch_size: usize,
    ) -> Result<Array2<Probability>>;

    /// Hard class call for each input, one-hot encoded.
    fn predict(&self, data: ArrayView2<'_, Feature>, batch_size: usize) -> Result<Array2<Probability>> {
        let proba = self.predict_proba(data, batch_size)?;
        Ok(one_hot(argmax_rows(proba.view()).view(), self.num_classes()))
    }

    /// Snapshot of the trained parameters, layer by layer.
    fn get_weights(&self) -> WeightSnapshot;

    /// Cardinality of the final output layer.
    fn num_classes(&self) -> usize;
}

/// Dataset triple handed to the trainer for one member.
#[derive(Debug, Clone, Copy)]
pub struct TrainingData<'a> {
    /// Resampled training split
    pub train: &'a Split,
    /// Fixed validation split
    pub valid: &'a Split,
    /// Fixed test split
    pub test: &'a Split,
}

/// Everything the trainer needs besides the data.
#[derive(Debug, Clone, Copy)]
pub struct TrainingRequest<'a> {
    /// Hyperparameters for this member
    pub params: &'a TrainingParams,
    /// Member number, starting at 1
    pub member_number: MemberNumber,
    /// Parameters carried over from the previous member, if any
    pub warm_start: Option<&'a WarmStart>,
    /// Architecture to build instead of the trainer's default
    pub architecture: Option<&'a ModelConfig>,
}

/// Produces trained members.
///
/// Errors are reported through `anyhow` and surface as
/// [`ToupeeError::Training`](crate::ToupeeError::Training); they are never retried.
pub trait ModelTrainer {
    /// Member type produced by this trainer
    type Member: Member;

    /// Train one member.
    fn train(
        &mut self,
        data: &TrainingData<'_>,
        request: &TrainingRequest<'_>,
    ) -> anyhow::Result<Self::Member>;
}

/// Source of training subsets.
pub trait Resampler: Send + Debug {
    /// Draw a resample of the training set with `size` examples.
    fn make_new_train(&mut self, size: usize) -> Result<Split>;

    /// The full, unresampled training split.
    fn get_train(&self) -> &Split;

    /// The fixed validation split.
    fn get_valid(&self) -> &Split;

    /// The fixed test split.
    fn get_test(&self) -> &Split;

    /// Replace the sampling distribution used by subsequent resamples.
    fn update_weights(&mut self, distribution: &[f64]) -> Result<()>;

    /// Current sampling distribution, if the resampler is weighted.
    fn weights(&self) -> Option<&[f64]>;
}
