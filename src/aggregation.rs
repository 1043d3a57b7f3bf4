//! Combination of member outputs into one ensemble prediction.
//!
//! Members are evaluated in parallel with rayon. Each member's inference is
//! stateless, so the combined output does not depend on evaluation order.

use crate::core::error::{Result, ToupeeError};
use crate::core::traits::Member;
use crate::core::types::{argmax_rows, one_hot, ClassLabel, Feature, Probability};
use crate::dataset::Split;
use crate::evaluation::{check_prediction_shape, label_accuracy};
use ndarray::{Array1, Array2, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How member outputs are combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggregationStrategy {
    /// Arithmetic mean of member probabilities
    Average,
    /// Fraction of members voting for each class
    MajorityVote,
    /// Coefficient-weighted mean of member probabilities
    WeightedAverage {
        /// One coefficient per member, in member order
        coefficients: Vec<f64>,
    },
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationStrategy::Average => write!(f, "Average"),
            AggregationStrategy::MajorityVote => write!(f, "MajorityVote"),
            AggregationStrategy::WeightedAverage { coefficients } => {
                write!(f, "WeightedAverage({} coefficients)", coefficients.len())
            }
        }
    }
}

/// A finished ensemble: members plus the rule that combines them.
#[derive(Debug)]
pub struct Aggregator<M: Member> {
    strategy: AggregationStrategy,
    members: Vec<M>,
    /// Normalized member weights for `WeightedAverage`
    weights: Option<Vec<f64>>,
    batch_size: usize,
    num_classes: usize,
}

impl<M: Member> Aggregator<M> {
    /// Build an aggregator over `members`.
    ///
    /// All members must report the same class count. `WeightedAverage`
    /// needs one finite coefficient per member with a non-zero sum.
    pub fn new(strategy: AggregationStrategy, members: Vec<M>, batch_size: usize) -> Result<Self> {
        let first = members
            .first()
            .ok_or_else(|| ToupeeError::config("cannot aggregate an empty ensemble"))?;
        let num_classes = first.num_classes();
        if let Some((index, other)) = members
            .iter()
            .enumerate()
            .find(|(_, m)| m.num_classes() != num_classes)
        {
            return Err(ToupeeError::config(format!(
                "member {} has {} classes, member 1 has {}",
                index + 1,
                other.num_classes(),
                num_classes
            )));
        }
        if batch_size == 0 {
            return Err(ToupeeError::invalid_parameter(
                "batch_size",
                "0",
                "must be at least 1",
            ));
        }

        let weights = match &strategy {
            AggregationStrategy::WeightedAverage { coefficients } => {
                Some(normalized_weights(coefficients, members.len())?)
            }
            _ => None,
        };

        Ok(Aggregator {
            strategy,
            members,
            weights,
            batch_size,
            num_classes,
        })
    }

    /// Combination rule
    pub fn strategy(&self) -> &AggregationStrategy {
        &self.strategy
    }

    /// Members in training order
    pub fn members(&self) -> &[M] {
        &self.members
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; an aggregator holds at least one member.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Class count shared by all members
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Combined class-probability rows.
    pub fn predict(&self, data: ArrayView2<'_, Feature>) -> Result<Array2<Probability>> {
        let hard = matches!(self.strategy, AggregationStrategy::MajorityVote);
        let outputs: Vec<Array2<Probability>> = self
            .members
            .par_iter()
            .map(|member| -> Result<Array2<Probability>> {
                let out = if hard {
                    member.predict(data, self.batch_size)?
                } else {
                    member.predict_proba(data, self.batch_size)?
                };
                check_prediction_shape(&out, data.nrows(), self.num_classes)?;
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut combined = Array2::<Probability>::zeros((data.nrows(), self.num_classes));
        match &self.weights {
            Some(weights) => {
                for (out, &w) in outputs.iter().zip(weights) {
                    combined.scaled_add(w, out);
                }
            }
            None => {
                for out in &outputs {
                    combined += out;
                }
                combined /= outputs.len() as f64;
            }
        }
        Ok(combined)
    }

    /// Combined hard class call, one-hot encoded.
    pub fn predict_classes(&self, data: ArrayView2<'_, Feature>) -> Result<Array2<Probability>> {
        let labels = self.predict_labels(data)?;
        Ok(one_hot(labels.view(), self.num_classes))
    }

    /// Combined class index per row; ties go to the lowest class.
    pub fn predict_labels(&self, data: ArrayView2<'_, Feature>) -> Result<Array1<ClassLabel>> {
        let combined = self.predict(data)?;
        Ok(argmax_rows(combined.view()))
    }

    /// Fraction of `split` the ensemble classifies correctly.
    pub fn accuracy(&self, split: &Split) -> Result<f64> {
        if split.is_empty() {
            return Ok(0.0);
        }
        let predicted = self.predict_labels(split.features())?;
        let correct = predicted
            .iter()
            .zip(split.labels().iter())
            .filter(|(p, y)| p == y)
            .count();
        Ok(label_accuracy(correct, split.len()))
    }

    /// Release the members.
    pub fn into_members(self) -> Vec<M> {
        self.members
    }
}

fn normalized_weights(coefficients: &[f64], num_members: usize) -> Result<Vec<f64>> {
    if coefficients.len() != num_members {
        return Err(ToupeeError::dimension_mismatch(
            format!("{} coefficients", num_members),
            format!("{} coefficients", coefficients.len()),
        ));
    }
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(ToupeeError::numerical("non-finite boosting coefficient"));
    }
    let total: f64 = coefficients.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return Err(ToupeeError::numerical(format!(
            "boosting coefficients sum to {}; weighted average is undefined",
            total
        )));
    }
    Ok(coefficients.iter().map(|c| c / total).collect())
}
