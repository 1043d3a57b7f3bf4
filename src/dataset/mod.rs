//! Dataset splits and resampling.
//!
//! A [`Dataset`] holds the train/validation/test triple. Resamplers own a
//! dataset and hand out training subsets; validation and test splits are
//! never resampled.

pub mod resampler;

pub use resampler::{UniformResampler, WeightedResampler};

use crate::core::error::{Result, ToupeeError};
use crate::core::types::{ClassLabel, Feature};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Features and class labels for one split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    features: Array2<Feature>,
    labels: Array1<ClassLabel>,
}

impl Split {
    /// Create a split, checking that features and labels line up.
    pub fn new(features: Array2<Feature>, labels: Array1<ClassLabel>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(ToupeeError::dimension_mismatch(
                format!("{} labels", features.nrows()),
                format!("{} labels", labels.len()),
            ));
        }
        Ok(Split { features, labels })
    }

    /// Feature matrix, one row per example
    pub fn features(&self) -> ArrayView2<'_, Feature> {
        self.features.view()
    }

    /// Class label of each example
    pub fn labels(&self) -> ArrayView1<'_, ClassLabel> {
        self.labels.view()
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the split holds no examples
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of feature columns
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    /// Rows selected by `indices`, in order; indices may repeat.
    pub fn select(&self, indices: &[usize]) -> Split {
        Split {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }
}

/// The train/validation/test triple an ensemble is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    train: Split,
    valid: Split,
    test: Split,
}

impl Dataset {
    /// Create a dataset. All splits must share the feature width and the
    /// training split must not be empty.
    pub fn new(train: Split, valid: Split, test: Split) -> Result<Self> {
        crate::ensure!(
            !train.is_empty(),
            crate::dataset_error!("training split is empty")
        );
        for (name, split) in [("validation", &valid), ("test", &test)] {
            if split.num_features() != train.num_features() {
                return Err(ToupeeError::dimension_mismatch(
                    format!("{} features in {} split", train.num_features(), name),
                    format!("{}", split.num_features()),
                ));
            }
        }
        Ok(Dataset { train, valid, test })
    }

    /// Training split
    pub fn train(&self) -> &Split {
        &self.train
    }

    /// Validation split
    pub fn valid(&self) -> &Split {
        &self.valid
    }

    /// Test split
    pub fn test(&self) -> &Split {
        &self.test
    }
}
