//! Deep Incremental Boosting.
//!
//! AdaBoost-M1 reweighting plus architecture growth: from the second member
//! on, the incremental layers are spliced into the architecture, the layers
//! the previous member already had start from its trained weights, and the
//! member trains for the shorter `n_epochs_after_first` schedule.

use super::{train_member, MemberOutcome, RoundContext};
use crate::aggregation::AggregationStrategy;
use crate::architecture::{IncrementalGrowth, ModelConfig, WarmStart, WeightSnapshot};
use crate::boosting::{boosting_round, BoostingState};
use crate::core::error::{Result, ToupeeError};
use crate::core::traits::{Member, ModelTrainer};

/// DIB state: boosting state, grown architecture, and the last member's weights.
#[derive(Debug, Clone)]
pub struct Dib {
    state: BoostingState,
    growth: IncrementalGrowth,
    n_epochs_after_first: usize,
    previous_weights: Option<WeightSnapshot>,
}

impl Dib {
    /// Start from the base architecture held by `growth`.
    pub fn prepare(
        num_examples: usize,
        growth: IncrementalGrowth,
        n_epochs_after_first: usize,
    ) -> Result<Self> {
        Ok(Dib {
            state: BoostingState::uniform(num_examples)?,
            growth,
            n_epochs_after_first,
            previous_weights: None,
        })
    }

    /// Boosting state
    pub fn state(&self) -> &BoostingState {
        &self.state
    }

    /// Architecture the next (or latest) member is built from
    pub fn architecture(&self) -> &ModelConfig {
        self.growth.config()
    }

    /// Weights captured from the latest member
    pub fn previous_weights(&self) -> Option<&WeightSnapshot> {
        self.previous_weights.as_ref()
    }

    pub(crate) fn create_member<T: ModelTrainer>(
        &mut self,
        ctx: &mut RoundContext<'_, T>,
    ) -> Result<MemberOutcome<T::Member>> {
        let member_number = ctx.member_index + 1;

        let (n_epochs, warm_start) = if ctx.member_index == 0 {
            (ctx.params.n_epochs, None)
        } else {
            let previous = self.previous_weights.as_ref().ok_or_else(|| {
                ToupeeError::config(format!(
                    "no weights captured before member {}",
                    member_number
                ))
            })?;
            self.growth.grow(member_number)?;
            let warm_start = WarmStart::carry_forward(previous, self.growth.config());
            log::debug!(
                "Member {}: {} layers carried forward, {} initialized fresh",
                member_number,
                warm_start.num_carried(),
                warm_start.num_fresh()
            );
            (self.n_epochs_after_first, Some(warm_start))
        };

        let (member, resample_size) = train_member(
            ctx,
            n_epochs,
            Some(self.growth.config()),
            warm_start.as_ref(),
        )?;
        let update = boosting_round(
            &mut self.state,
            &member,
            &mut *ctx.resampler,
            ctx.params.batch_size,
            ctx.member_index,
        )?;
        self.previous_weights = Some(member.get_weights());

        Ok(MemberOutcome {
            member,
            resample_size,
            n_epochs,
            update: Some(update),
            architecture_len: Some(self.growth.config().len()),
            carried_layers: Some(warm_start.as_ref().map_or(0, WarmStart::num_carried)),
        })
    }

    /// `WeightedAverage` over the accumulated coefficients.
    pub fn aggregation_strategy(&self) -> AggregationStrategy {
        AggregationStrategy::WeightedAverage {
            coefficients: self.state.coefficients().to_vec(),
        }
    }
}
