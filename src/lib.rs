//! # toupee
//!
//! Ensemble orchestration for trained classifiers: Bagging, AdaBoost-M1 and
//! Deep Incremental Boosting (DIB).
//!
//! The crate does not train networks itself. A [`ModelTrainer`] produces
//! [`Member`]s; the crate decides which data each member sees, feeds member
//! errors back into the boosting distribution, grows the architecture for
//! DIB, and combines the finished members into one prediction.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ndarray::{Array2, ArrayView2};
//! use toupee::{
//!     build_ensemble, Dataset, EnsembleParams, Feature, Member, ModelTrainer, Probability,
//!     TrainingData, TrainingRequest, WeightSnapshot,
//! };
//!
//! /// Predicts the class frequencies of its training resample.
//! #[derive(Debug)]
//! struct Prior(Vec<f64>);
//!
//! impl Member for Prior {
//!     fn predict_proba(
//!         &self,
//!         data: ArrayView2<'_, Feature>,
//!         _batch_size: usize,
//!     ) -> toupee::Result<Array2<Probability>> {
//!         Ok(Array2::from_shape_fn((data.nrows(), self.0.len()), |(_, j)| self.0[j]))
//!     }
//!
//!     fn get_weights(&self) -> WeightSnapshot {
//!         WeightSnapshot::default()
//!     }
//!
//!     fn num_classes(&self) -> usize {
//!         self.0.len()
//!     }
//! }
//!
//! struct PriorTrainer;
//!
//! impl ModelTrainer for PriorTrainer {
//!     type Member = Prior;
//!
//!     fn train(
//!         &mut self,
//!         data: &TrainingData<'_>,
//!         _request: &TrainingRequest<'_>,
//!     ) -> anyhow::Result<Prior> {
//!         let mut counts = vec![0.0; 2];
//!         for &label in data.train.labels() {
//!             counts[label] += 1.0;
//!         }
//!         let total: f64 = counts.iter().sum();
//!         Ok(Prior(counts.into_iter().map(|c| c / total).collect()))
//!     }
//! }
//!
//! # fn load_dataset() -> toupee::Result<Dataset> { unimplemented!() }
//! # fn main() -> toupee::Result<()> {
//! toupee::init()?;
//! let params = EnsembleParams::load_from_file("toupee.toml")?;
//! let build = build_ensemble(params, load_dataset()?, PriorTrainer)?;
//! println!("test accuracy: {:.4}", build.report.test_accuracy);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: fundamental types, defaults, error handling and trait seams
//! - [`config`]: validated ensemble parameters
//! - [`dataset`]: splits and the bootstrap resamplers
//! - [`architecture`]: layer lists, incremental growth and weight carry-over
//! - [`boosting`]: the AdaBoost-M1 distribution and coefficient update
//! - [`ensemble`]: ensemble methods, sessions and the build driver
//! - [`aggregation`]: combination of member outputs
//! - [`evaluation`]: per-member error and accuracy
//! - [`report`]: per-round and ensemble results

#![doc(html_root_url = "https://docs.rs/toupee/")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Dataset splits and resampling
pub mod dataset;

// Architecture description and growth
pub mod architecture;

// Boosting state
pub mod boosting;

// Ensemble methods and sessions
pub mod ensemble;

// Member output combination
pub mod aggregation;

// Member evaluation
pub mod evaluation;

// Results
pub mod report;

// Re-export core functionality for convenience
pub use crate::core::{
    constants::*,
    error::{Result, ToupeeError},
    traits::*,
    types::*,
};

pub use crate::aggregation::{AggregationStrategy, Aggregator};
pub use crate::architecture::{
    IncrementalGrowth, InjectionIndex, InjectionPolicy, LayerSpec, LayerWeights, ModelConfig,
    WarmStart, WeightSnapshot,
};
pub use crate::boosting::{boosting_coefficient, BoostingState, BoostingUpdate};
pub use crate::config::{EnsembleParams, EnsembleParamsBuilder, MethodParams, TrainingParams};
pub use crate::dataset::{Dataset, Split, UniformResampler, WeightedResampler};
pub use crate::ensemble::{
    build_ensemble, AdaBoostM1, Bagging, Dib, EnsembleBuild, EnsembleMethod, EnsembleSession,
    RoundStatus,
};
pub use crate::evaluation::{accuracy, misclassified};
pub use crate::report::{EnsembleReport, RoundReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library.
///
/// Installs the `env_logger` backend (level `info` unless `RUST_LOG` says
/// otherwise). Calling it more than once is harmless.
///
/// # Examples
///
/// ```rust
/// fn main() -> toupee::Result<()> {
///     toupee::init()?;
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    crate::core::initialize_logging();
    log::debug!("toupee {} initialized", VERSION);
    Ok(())
}
