//! AdaBoost-M1 over a distribution-weighted resampler.

use super::{train_member, MemberOutcome, RoundContext};
use crate::aggregation::AggregationStrategy;
use crate::boosting::{boosting_round, BoostingState};
use crate::core::error::Result;
use crate::core::traits::ModelTrainer;

/// AdaBoost-M1 state: the boosting distribution and coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaBoostM1 {
    state: BoostingState,
}

impl AdaBoostM1 {
    /// Uniform distribution over `num_examples` training examples.
    pub fn prepare(num_examples: usize) -> Result<Self> {
        Ok(AdaBoostM1 {
            state: BoostingState::uniform(num_examples)?,
        })
    }

    /// Boosting state
    pub fn state(&self) -> &BoostingState {
        &self.state
    }

    pub(crate) fn create_member<T: ModelTrainer>(
        &mut self,
        ctx: &mut RoundContext<'_, T>,
    ) -> Result<MemberOutcome<T::Member>> {
        let n_epochs = ctx.params.n_epochs;
        let architecture = ctx.architecture;
        let (member, resample_size) = train_member(ctx, n_epochs, architecture, None)?;
        let update = boosting_round(
            &mut self.state,
            &member,
            &mut *ctx.resampler,
            ctx.params.batch_size,
            ctx.member_index,
        )?;
        Ok(MemberOutcome {
            member,
            resample_size,
            n_epochs,
            update: Some(update),
            architecture_len: None,
            carried_layers: None,
        })
    }

    /// `WeightedAverage` over the accumulated coefficients.
    pub fn aggregation_strategy(&self) -> AggregationStrategy {
        AggregationStrategy::WeightedAverage {
            coefficients: self.state.coefficients().to_vec(),
        }
    }
}
