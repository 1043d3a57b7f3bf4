//! AdaBoost-M1 boosting state and the per-round update.
//!
//! [`BoostingState`] owns the sampling distribution over the original
//! training examples and the coefficients of the members trained so far.
//! Each round evaluates the new member on the unresampled training set,
//! computes its weighted error `e`, derives `α = ½ ln((1 − e) / e)` and
//! multiplies each example's weight by `e^α` (misclassified) or `e^−α`
//! (correct) before renormalizing.

use crate::core::constants::*;
use crate::core::error::{Result, ToupeeError};
use crate::core::traits::{Member, Resampler};
use crate::core::types::MemberNumber;
use crate::evaluation::misclassified;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Result of one boosting update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoostingUpdate {
    /// The distribution was reweighted and a coefficient appended.
    Reweighted {
        /// Distribution-weighted misclassification rate
        weighted_error: f64,
        /// Boosting coefficient α of the member
        coefficient: f64,
    },
    /// The member made no weighted errors; boosting has converged.
    Converged,
}

impl BoostingUpdate {
    /// Weighted error observed in the round
    pub fn weighted_error(&self) -> f64 {
        match self {
            BoostingUpdate::Reweighted { weighted_error, .. } => *weighted_error,
            BoostingUpdate::Converged => 0.0,
        }
    }

    /// Coefficient appended in the round, if any
    pub fn coefficient(&self) -> Option<f64> {
        match self {
            BoostingUpdate::Reweighted { coefficient, .. } => Some(*coefficient),
            BoostingUpdate::Converged => None,
        }
    }
}

/// Log-odds boosting coefficient `½ ln((1 − e) / e)`.
///
/// Fails for errors outside the open interval (0, 1) where the coefficient
/// is undefined; `round` is only used for the error report.
pub fn boosting_coefficient(weighted_error: f64, round: MemberNumber) -> Result<f64> {
    if !weighted_error.is_finite()
        || weighted_error <= 0.0
        || weighted_error >= 1.0 - DEGENERATE_ERROR_TOLERANCE
    {
        return Err(ToupeeError::degenerate_boosting(round, weighted_error));
    }
    Ok(0.5 * ((1.0 - weighted_error) / weighted_error).ln())
}

/// Sampling distribution and accumulated coefficients of a boosting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingState {
    distribution: Array1<f64>,
    coefficients: Vec<f64>,
    rounds: usize,
    converged_at: Option<usize>,
}

impl BoostingState {
    /// Uniform distribution over `num_examples` examples, no coefficients.
    pub fn uniform(num_examples: usize) -> Result<Self> {
        if num_examples == 0 {
            return Err(ToupeeError::dataset(
                "boosting needs at least one training example",
            ));
        }
        Ok(BoostingState {
            distribution: Array1::from_elem(num_examples, 1.0 / num_examples as f64),
            coefficients: Vec::new(),
            rounds: 0,
            converged_at: None,
        })
    }

    /// Current sampling distribution
    pub fn distribution(&self) -> ArrayView1<'_, f64> {
        self.distribution.view()
    }

    /// Coefficients of the members trained so far, in order
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Number of updates applied
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Index of the perfect member that ended boosting, if any
    pub fn converged_at(&self) -> Option<usize> {
        self.converged_at
    }

    /// Whether boosting has converged
    pub fn is_converged(&self) -> bool {
        self.converged_at.is_some()
    }

    /// Distribution-weighted misclassification rate.
    pub fn weighted_error(&self, misclassified: &[bool]) -> Result<f64> {
        if misclassified.len() != self.distribution.len() {
            return Err(ToupeeError::dimension_mismatch(
                format!("{} indicators", self.distribution.len()),
                format!("{} indicators", misclassified.len()),
            ));
        }
        Ok(self
            .distribution
            .iter()
            .zip(misclassified)
            .filter(|(_, &miss)| miss)
            .map(|(d, _)| d)
            .sum())
    }

    /// Apply one round given the member's misclassification pattern on the
    /// original training set. `member_index` is the 0-based position of the
    /// member in the ensemble.
    pub fn update(&mut self, misclassified: &[bool], member_index: usize) -> Result<BoostingUpdate> {
        let round = member_index + 1;
        if self.is_converged() {
            return Err(ToupeeError::config(format!(
                "boosting already converged at member {}",
                self.converged_at.map_or(0, |i| i + 1)
            )));
        }

        let weighted_error = self.weighted_error(misclassified)?;
        if weighted_error <= PERFECT_ERROR_TOLERANCE {
            self.rounds += 1;
            self.converged_at = Some(member_index);
            return Ok(BoostingUpdate::Converged);
        }

        let coefficient = boosting_coefficient(weighted_error, round)?;
        let up = coefficient.exp();
        let down = (-coefficient).exp();

        let mut reweighted = self.distribution.clone();
        reweighted
            .iter_mut()
            .zip(misclassified)
            .for_each(|(d, &miss)| *d *= if miss { up } else { down });

        let total = reweighted.sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ToupeeError::numerical(format!(
                "reweighted distribution sums to {} in round {}",
                total, round
            )));
        }
        reweighted /= total;

        self.distribution = reweighted;
        self.coefficients.push(coefficient);
        self.rounds += 1;
        Ok(BoostingUpdate::Reweighted {
            weighted_error,
            coefficient,
        })
    }

    /// Whether the distribution is non-negative and sums to one.
    pub fn is_normalized(&self) -> bool {
        self.distribution.iter().all(|&d| d >= 0.0)
            && (self.distribution.sum() - 1.0).abs() <= DISTRIBUTION_SUM_TOLERANCE
    }
}

/// Evaluate `member` on the resampler's original training set, update
/// `state`, and push the new distribution to the resampler.
pub fn boosting_round<M: Member + ?Sized>(
    state: &mut BoostingState,
    member: &M,
    resampler: &mut dyn Resampler,
    batch_size: usize,
    member_index: usize,
) -> Result<BoostingUpdate> {
    let errors = misclassified(member, resampler.get_train(), batch_size)?;
    let update = state.update(&errors, member_index)?;

    match update {
        BoostingUpdate::Reweighted {
            weighted_error,
            coefficient,
        } => {
            if coefficient <= 0.0 {
                log::warn!(
                    "Member {} has weighted error {:.4} (no better than chance); coefficient {:.4}",
                    member_index + 1,
                    weighted_error,
                    coefficient
                );
            }
            let distribution = state.distribution();
            let weights = distribution
                .as_slice()
                .ok_or_else(|| ToupeeError::numerical("sampling distribution is not contiguous"))?;
            resampler.update_weights(weights)?;
        }
        BoostingUpdate::Converged => {
            log::info!(
                "Member {} classifies the training set perfectly; boosting converged",
                member_index + 1
            );
        }
    }
    Ok(update)
}
