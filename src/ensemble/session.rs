//! Ensemble session lifecycle and the build driver.

use super::{EnsembleMethod, RoundContext};
use crate::aggregation::Aggregator;
use crate::architecture::ModelConfig;
use crate::boosting::BoostingUpdate;
use crate::config::EnsembleParams;
use crate::core::error::{Result, ToupeeError};
use crate::core::traits::{Member, ModelTrainer, Resampler};
use crate::dataset::{Dataset, UniformResampler, WeightedResampler};
use crate::evaluation::accuracy;
use crate::report::{EnsembleReport, RoundReport};
use chrono::Utc;
use std::fmt;
use std::time::Instant;

/// Outcome of a `create_member` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    /// A member was appended; the session may keep growing.
    Trained,
    /// Boosting has converged on a perfect member; no further members are trained.
    Converged,
}

/// One ensemble build in progress.
///
/// Created by [`EnsembleSession::prepare`], grown one member per
/// [`EnsembleSession::create_member`] call, and consumed by
/// [`EnsembleSession::create_aggregator`].
pub struct EnsembleSession<T: ModelTrainer> {
    params: EnsembleParams,
    resampler: Box<dyn Resampler>,
    trainer: T,
    method: EnsembleMethod,
    base_architecture: Option<ModelConfig>,
    members: Vec<T::Member>,
    history: Vec<RoundReport>,
}

impl<T: ModelTrainer> fmt::Debug for EnsembleSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnsembleSession")
            .field("params", &self.params)
            .field("resampler", &self.resampler)
            .field("method", &self.method)
            .field("members", &self.members.len())
            .finish_non_exhaustive()
    }
}

impl<T: ModelTrainer> EnsembleSession<T> {
    /// Validate `params`, load the base architecture from `model_file` when
    /// set, and choose the resampler the method needs.
    pub fn prepare(params: EnsembleParams, dataset: Dataset, trainer: T) -> Result<Self> {
        let architecture = params
            .model_file
            .as_ref()
            .map(ModelConfig::load)
            .transpose()?;
        Self::prepare_with_architecture(params, dataset, trainer, architecture)
    }

    /// Like [`EnsembleSession::prepare`] with an architecture supplied in memory.
    pub fn prepare_with_architecture(
        params: EnsembleParams,
        dataset: Dataset,
        trainer: T,
        architecture: Option<ModelConfig>,
    ) -> Result<Self> {
        let seed = params.random_seed;
        let resampler: Box<dyn Resampler> = if params.method.kind().is_boosting() {
            Box::new(WeightedResampler::new(dataset, seed)?)
        } else {
            Box::new(UniformResampler::new(dataset, seed))
        };
        Self::prepare_with_resampler(params, resampler, trainer, architecture)
    }

    /// Start a session over a caller-provided resampler.
    ///
    /// Boosting methods need a resampler that accepts a sampling distribution.
    pub fn prepare_with_resampler(
        params: EnsembleParams,
        resampler: Box<dyn Resampler>,
        trainer: T,
        architecture: Option<ModelConfig>,
    ) -> Result<Self> {
        params.validate()?;
        let kind = params.method.kind();
        if kind.is_boosting() && resampler.weights().is_none() {
            return Err(ToupeeError::config(format!(
                "{} needs a weighted resampler",
                kind
            )));
        }

        let num_examples = resampler.get_train().len();
        let method = EnsembleMethod::prepare(&params.method, num_examples, architecture.as_ref())?;
        log::info!(
            "Prepared {} ensemble of {} members over {} training examples",
            params.method.describe(),
            params.ensemble_size,
            num_examples
        );

        Ok(EnsembleSession {
            params,
            resampler,
            trainer,
            method,
            base_architecture: architecture,
            members: Vec::new(),
            history: Vec::new(),
        })
    }

    /// Train one member and fold it into the method's state.
    ///
    /// Once boosting has converged no further members are trained and every
    /// call returns [`RoundStatus::Converged`].
    pub fn create_member(&mut self) -> Result<RoundStatus> {
        if self.method.converged_at().is_some() {
            log::debug!("Boosting already converged; not training another member");
            return Ok(RoundStatus::Converged);
        }
        if self.members.len() >= self.params.ensemble_size {
            return Err(ToupeeError::config(format!(
                "ensemble already has all {} members",
                self.params.ensemble_size
            )));
        }

        let started = Instant::now();
        let member_index = self.members.len();
        let member_number = member_index + 1;

        let mut ctx = RoundContext {
            params: &self.params,
            resampler: &mut *self.resampler,
            trainer: &mut self.trainer,
            architecture: self.base_architecture.as_ref(),
            member_index,
        };
        let outcome = self.method.create_member(&mut ctx)?;

        let batch_size = self.params.batch_size;
        let valid_accuracy = accuracy(&outcome.member, self.resampler.get_valid(), batch_size)?;
        let test_accuracy = accuracy(&outcome.member, self.resampler.get_test(), batch_size)?;

        let converged = matches!(outcome.update, Some(BoostingUpdate::Converged));
        let report = RoundReport {
            member_number,
            resample_size: outcome.resample_size,
            n_epochs: outcome.n_epochs,
            weighted_error: outcome.update.map(|u| u.weighted_error()),
            coefficient: outcome.update.and_then(|u| u.coefficient()),
            converged,
            architecture_len: outcome.architecture_len,
            carried_layers: outcome.carried_layers,
            valid_accuracy,
            test_accuracy,
            elapsed_secs: started.elapsed().as_secs_f64(),
            finished_at: Utc::now(),
        };

        match (report.weighted_error, report.coefficient) {
            (Some(error), Some(alpha)) => log::info!(
                "Member {}/{}: weighted error {:.4}, coefficient {:.4}, valid accuracy {:.4}, test accuracy {:.4}",
                member_number,
                self.params.ensemble_size,
                error,
                alpha,
                valid_accuracy,
                test_accuracy
            ),
            _ => log::info!(
                "Member {}/{}: valid accuracy {:.4}, test accuracy {:.4}",
                member_number,
                self.params.ensemble_size,
                valid_accuracy,
                test_accuracy
            ),
        }

        self.members.push(outcome.member);
        self.history.push(report);

        Ok(if converged {
            RoundStatus::Converged
        } else {
            RoundStatus::Trained
        })
    }

    /// Validated parameters
    pub fn params(&self) -> &EnsembleParams {
        &self.params
    }

    /// Method and its state
    pub fn method(&self) -> &EnsembleMethod {
        &self.method
    }

    /// Resampler feeding the trainer
    pub fn resampler(&self) -> &dyn Resampler {
        &*self.resampler
    }

    /// Members trained so far, in order
    pub fn members(&self) -> &[T::Member] {
        &self.members
    }

    /// One report per trained member
    pub fn history(&self) -> &[RoundReport] {
        &self.history
    }

    /// Number of members trained so far
    pub fn num_members(&self) -> usize {
        self.members.len()
    }

    /// Whether boosting converged on a perfect member
    pub fn is_converged(&self) -> bool {
        self.method.converged_at().is_some()
    }

    /// Whether the session will train no further members
    pub fn is_complete(&self) -> bool {
        self.is_converged() || self.members.len() >= self.params.ensemble_size
    }

    /// Finalize the session into an aggregator over its members.
    pub fn create_aggregator(self) -> Result<Aggregator<T::Member>> {
        let strategy = self.method.aggregation_strategy();
        let members: Vec<T::Member> = match self.method.converged_at() {
            Some(index) => self.members.into_iter().skip(index).take(1).collect(),
            None => self.members,
        };
        log::info!(
            "Aggregating {} members with {}",
            members.len(),
            strategy
        );
        Aggregator::new(strategy, members, self.params.batch_size)
    }

    /// Finalize the session and evaluate the ensemble on the validation and
    /// test splits.
    pub fn finish(self) -> Result<EnsembleBuild<T::Member>> {
        let kind = self.method.kind();
        let method = self.params.method.describe();
        let requested_members = self.params.ensemble_size;
        let converged_at = self.method.converged_at();
        let coefficients = self
            .method
            .boosting_state()
            .map(|s| s.coefficients().to_vec())
            .unwrap_or_default();
        let valid = self.resampler.get_valid().clone();
        let test = self.resampler.get_test().clone();
        let rounds = self.history.clone();

        let aggregator = self.create_aggregator()?;
        let valid_accuracy = aggregator.accuracy(&valid)?;
        let test_accuracy = aggregator.accuracy(&test)?;
        log::info!(
            "Ensemble valid accuracy {:.4}, test accuracy {:.4}",
            valid_accuracy,
            test_accuracy
        );

        let report = EnsembleReport {
            kind,
            method,
            requested_members,
            aggregated_members: aggregator.len(),
            converged_at,
            coefficients,
            valid_accuracy,
            test_accuracy,
            rounds,
            finished_at: Utc::now(),
        };
        Ok(EnsembleBuild { aggregator, report })
    }
}

/// A finished ensemble and its report.
#[derive(Debug)]
pub struct EnsembleBuild<M: Member> {
    /// Combined members
    pub aggregator: Aggregator<M>,
    /// Per-round and ensemble results
    pub report: EnsembleReport,
}

/// Run a whole build: prepare, train until the ensemble is complete or
/// boosting converges, then aggregate.
///
/// Any error aborts the build; the failing round and error category are
/// logged before the error is returned.
pub fn build_ensemble<T: ModelTrainer>(
    params: EnsembleParams,
    dataset: Dataset,
    trainer: T,
) -> Result<EnsembleBuild<T::Member>> {
    let mut session = EnsembleSession::prepare(params, dataset, trainer)?;
    while !session.is_complete() {
        match session.create_member() {
            Ok(RoundStatus::Trained) => {}
            Ok(RoundStatus::Converged) => {
                log::info!(
                    "Boosting converged after {} members; stopping early",
                    session.num_members()
                );
                break;
            }
            Err(e) => {
                log::error!(
                    "Ensemble build failed at member {} [{}]: {}",
                    e.round().unwrap_or(session.num_members() + 1),
                    e.category(),
                    e
                );
                return Err(e);
            }
        }
    }
    session.finish()
}
