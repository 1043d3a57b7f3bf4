//! Bagging: independent members on uniform bootstrap resamples.

use super::{train_member, MemberOutcome, RoundContext};
use crate::aggregation::AggregationStrategy;
use crate::core::error::Result;
use crate::core::traits::ModelTrainer;

/// Bagging keeps no state besides its aggregation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bagging {
    voting: bool,
}

impl Bagging {
    /// Combine by majority vote when `voting`, else by probability averaging.
    pub fn new(voting: bool) -> Self {
        Bagging { voting }
    }

    /// Whether members are combined by majority vote
    pub fn voting(&self) -> bool {
        self.voting
    }

    pub(crate) fn create_member<T: ModelTrainer>(
        &mut self,
        ctx: &mut RoundContext<'_, T>,
    ) -> Result<MemberOutcome<T::Member>> {
        let n_epochs = ctx.params.n_epochs;
        let architecture = ctx.architecture;
        let (member, resample_size) = train_member(ctx, n_epochs, architecture, None)?;
        Ok(MemberOutcome {
            member,
            resample_size,
            n_epochs,
            update: None,
            architecture_len: None,
            carried_layers: None,
        })
    }

    /// `MajorityVote` or `Average`, per the voting flag.
    pub fn aggregation_strategy(&self) -> AggregationStrategy {
        if self.voting {
            AggregationStrategy::MajorityVote
        } else {
            AggregationStrategy::Average
        }
    }
}
