//! Ensemble methods and the session that drives them.
//!
//! An [`EnsembleMethod`] is a closed set of variants sharing three
//! capabilities: `prepare`, `create_member` and the aggregation strategy
//! used once training ends. [`EnsembleSession`] owns the collaborators
//! (trainer, resampler) and the trained members.

pub mod adaboost;
pub mod bagging;
pub mod dib;
pub mod session;

pub use adaboost::AdaBoostM1;
pub use bagging::Bagging;
pub use dib::Dib;
pub use session::{build_ensemble, EnsembleBuild, EnsembleSession, RoundStatus};

use crate::aggregation::AggregationStrategy;
use crate::architecture::{IncrementalGrowth, ModelConfig, WarmStart};
use crate::boosting::{BoostingState, BoostingUpdate};
use crate::config::{EnsembleParams, MethodParams};
use crate::core::error::{Result, ToupeeError};
use crate::core::traits::{ModelTrainer, Resampler, TrainingData, TrainingRequest};
use crate::core::types::MethodKind;
use std::fmt;

/// Collaborators lent to a method for one round.
pub(crate) struct RoundContext<'a, T: ModelTrainer> {
    pub(crate) params: &'a EnsembleParams,
    pub(crate) resampler: &'a mut dyn Resampler,
    pub(crate) trainer: &'a mut T,
    /// Architecture from `model_file`, if any
    pub(crate) architecture: Option<&'a ModelConfig>,
    /// 0-based position of the member being created
    pub(crate) member_index: usize,
}

/// A freshly trained member and what the round did to produce it.
#[derive(Debug)]
pub(crate) struct MemberOutcome<M> {
    pub(crate) member: M,
    pub(crate) resample_size: usize,
    pub(crate) n_epochs: usize,
    pub(crate) update: Option<BoostingUpdate>,
    pub(crate) architecture_len: Option<usize>,
    pub(crate) carried_layers: Option<usize>,
}

/// Draw a resample and train one member on it.
///
/// Returns the member and the resample size. Trainer failures become
/// [`ToupeeError::Training`] for the member's number.
pub(crate) fn train_member<T: ModelTrainer>(
    ctx: &mut RoundContext<'_, T>,
    n_epochs: usize,
    architecture: Option<&ModelConfig>,
    warm_start: Option<&WarmStart>,
) -> Result<(T::Member, usize)> {
    let member_number = ctx.member_index + 1;
    let size = ctx
        .params
        .effective_resample_size(ctx.resampler.get_train().len());
    let train = ctx.resampler.make_new_train(size)?;
    log::debug!(
        "Member {}: resampled {} examples, training for {} epochs",
        member_number,
        train.len(),
        n_epochs
    );

    let training_params = ctx.params.training_params(n_epochs);
    let data = TrainingData {
        train: &train,
        valid: ctx.resampler.get_valid(),
        test: ctx.resampler.get_test(),
    };
    let request = TrainingRequest {
        params: &training_params,
        member_number,
        warm_start,
        architecture,
    };
    let member = ctx
        .trainer
        .train(&data, &request)
        .map_err(|e| ToupeeError::training(member_number, e))?;
    Ok((member, size))
}

/// The ensemble method of a session, with its per-method state.
#[derive(Debug, Clone)]
pub enum EnsembleMethod {
    /// Bootstrap aggregation
    Bagging(Bagging),
    /// AdaBoost-M1
    AdaBoostM1(AdaBoostM1),
    /// Deep Incremental Boosting
    Dib(Dib),
}

impl EnsembleMethod {
    /// Initialize the method for a training set of `num_examples` examples.
    ///
    /// DIB needs a base architecture to grow; the other methods ignore it.
    pub fn prepare(
        method: &MethodParams,
        num_examples: usize,
        base: Option<&ModelConfig>,
    ) -> Result<Self> {
        match method {
            MethodParams::Bagging { voting } => Ok(EnsembleMethod::Bagging(Bagging::new(*voting))),
            MethodParams::AdaBoostM1 => Ok(EnsembleMethod::AdaBoostM1(AdaBoostM1::prepare(
                num_examples,
            )?)),
            MethodParams::Dib {
                n_epochs_after_first,
                incremental_layers,
                ..
            } => {
                let base = base.ok_or_else(|| {
                    ToupeeError::config("DIB requires a base architecture (set model_file)")
                })?;
                let policy = method.injection_policy().ok_or_else(|| {
                    ToupeeError::config("DIB parameters carry no injection policy")
                })?;
                let growth = IncrementalGrowth::new(base.clone(), policy, incremental_layers.clone())?;
                Ok(EnsembleMethod::Dib(Dib::prepare(
                    num_examples,
                    growth,
                    *n_epochs_after_first,
                )?))
            }
        }
    }

    /// Method identifier
    pub fn kind(&self) -> MethodKind {
        match self {
            EnsembleMethod::Bagging(_) => MethodKind::Bagging,
            EnsembleMethod::AdaBoostM1(_) => MethodKind::AdaBoostM1,
            EnsembleMethod::Dib(_) => MethodKind::Dib,
        }
    }

    /// Boosting state, for the boosting methods
    pub fn boosting_state(&self) -> Option<&BoostingState> {
        match self {
            EnsembleMethod::Bagging(_) => None,
            EnsembleMethod::AdaBoostM1(m) => Some(m.state()),
            EnsembleMethod::Dib(m) => Some(m.state()),
        }
    }

    /// Index of the perfect member that ended boosting, if any
    pub fn converged_at(&self) -> Option<usize> {
        self.boosting_state().and_then(BoostingState::converged_at)
    }

    /// Current grown architecture (DIB only)
    pub fn architecture(&self) -> Option<&ModelConfig> {
        match self {
            EnsembleMethod::Dib(m) => Some(m.architecture()),
            _ => None,
        }
    }

    pub(crate) fn create_member<T: ModelTrainer>(
        &mut self,
        ctx: &mut RoundContext<'_, T>,
    ) -> Result<MemberOutcome<T::Member>> {
        match self {
            EnsembleMethod::Bagging(m) => m.create_member(ctx),
            EnsembleMethod::AdaBoostM1(m) => m.create_member(ctx),
            EnsembleMethod::Dib(m) => m.create_member(ctx),
        }
    }

    /// How the finished members are combined.
    ///
    /// A converged boosting run is represented by its perfect member alone,
    /// with weight one.
    pub fn aggregation_strategy(&self) -> AggregationStrategy {
        if self.converged_at().is_some() {
            return AggregationStrategy::WeightedAverage {
                coefficients: vec![1.0],
            };
        }
        match self {
            EnsembleMethod::Bagging(m) => m.aggregation_strategy(),
            EnsembleMethod::AdaBoostM1(m) => m.aggregation_strategy(),
            EnsembleMethod::Dib(m) => m.aggregation_strategy(),
        }
    }
}

impl fmt::Display for EnsembleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnsembleMethod::Bagging(m) if m.voting() => write!(f, "Bagging (majority vote)"),
            EnsembleMethod::Bagging(_) => write!(f, "Bagging"),
            EnsembleMethod::AdaBoostM1(m) => {
                write!(f, "AdaBoostM1 ({} rounds)", m.state().rounds())
            }
            EnsembleMethod::Dib(m) => write!(
                f,
                "DIB ({} rounds, {} layers)",
                m.state().rounds(),
                m.architecture().len()
            ),
        }
    }
}
