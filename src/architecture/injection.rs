//! Layer injection for Deep Incremental Boosting.
//!
//! Each round after the first splices a fresh copy of the incremental layers
//! into the architecture. Injected layers are renamed
//! `incremental-{member}-{layer}` so names stay unique across rounds.

use super::{LayerSpec, ModelConfig};
use crate::core::constants::INCREMENTAL_LAYER_PREFIX;
use crate::core::error::{Result, ToupeeError};
use crate::core::types::MemberNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where incremental layers are spliced into the layer sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexRepr", into = "IndexRepr")]
pub enum InjectionIndex {
    /// Insert before this position. `-1` appends like [`InjectionIndex::End`];
    /// other negative values count from the end.
    Position(i64),
    /// Append after the last layer
    #[default]
    End,
}

impl fmt::Display for InjectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionIndex::Position(i) => write!(f, "{}", i),
            InjectionIndex::End => write!(f, "end"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IndexRepr {
    Position(i64),
    Keyword(String),
}

impl TryFrom<IndexRepr> for InjectionIndex {
    type Error = String;

    fn try_from(repr: IndexRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            IndexRepr::Position(i) => Ok(InjectionIndex::Position(i)),
            IndexRepr::Keyword(k) if k.eq_ignore_ascii_case("end") => Ok(InjectionIndex::End),
            IndexRepr::Keyword(k) => Err(format!(
                "injection index must be an integer or \"end\", got \"{}\"",
                k
            )),
        }
    }
}

impl From<InjectionIndex> for IndexRepr {
    fn from(index: InjectionIndex) -> Self {
        match index {
            InjectionIndex::Position(i) => IndexRepr::Position(i),
            InjectionIndex::End => IndexRepr::Keyword("end".to_string()),
        }
    }
}

/// Injection index plus the grow-forward flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPolicy {
    /// Base injection position
    pub index: InjectionIndex,
    /// Advance a non-negative index by one position per earlier growth round
    pub grow_forward: bool,
}

impl InjectionPolicy {
    /// Resolve the effective splice position.
    ///
    /// `current_len` is the length of the config about to be grown,
    /// `rounds_grown` the number of earlier rounds that injected layers.
    pub fn resolve(&self, current_len: usize, rounds_grown: usize) -> Result<usize> {
        let len = current_len as i64;
        let resolved = match self.index {
            InjectionIndex::End | InjectionIndex::Position(-1) => len,
            InjectionIndex::Position(i) if i >= 0 => {
                if self.grow_forward {
                    i + rounds_grown as i64
                } else {
                    i
                }
            }
            InjectionIndex::Position(i) => len + i,
        };

        if resolved < 0 || resolved > len {
            return Err(ToupeeError::config(format!(
                "injection index {} resolves to {} outside a config of {} layers",
                self.index, resolved, current_len
            )));
        }
        Ok(resolved as usize)
    }
}

/// Architecture growth state carried across DIB rounds.
#[derive(Debug, Clone)]
pub struct IncrementalGrowth {
    policy: InjectionPolicy,
    incremental_layers: Vec<LayerSpec>,
    config: ModelConfig,
    base_len: usize,
    rounds_grown: usize,
}

impl IncrementalGrowth {
    /// Start growth from `base`. Fails when the policy cannot be applied to
    /// the base config or the base config has duplicate names.
    pub fn new(
        base: ModelConfig,
        policy: InjectionPolicy,
        incremental_layers: Vec<LayerSpec>,
    ) -> Result<Self> {
        base.ensure_unique_names()?;
        policy.resolve(base.len(), 0)?;
        let base_len = base.len();
        Ok(IncrementalGrowth {
            policy,
            incremental_layers,
            config: base,
            base_len,
            rounds_grown: 0,
        })
    }

    /// Current architecture
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Length of the architecture before any growth
    pub fn base_len(&self) -> usize {
        self.base_len
    }

    /// Number of layers injected per round
    pub fn layers_per_round(&self) -> usize {
        self.incremental_layers.len()
    }

    /// Splice a renamed copy of the incremental layers for `member_number`.
    /// Returns the position the layers were inserted at.
    pub fn grow(&mut self, member_number: MemberNumber) -> Result<usize> {
        let index = self.policy.resolve(self.config.len(), self.rounds_grown)?;
        let new_layers: Vec<LayerSpec> = self
            .incremental_layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let mut layer = layer.clone();
                layer.set_name(format!("{}-{}-{}", INCREMENTAL_LAYER_PREFIX, member_number, i));
                layer
            })
            .collect();

        let mut grown = self.config.clone();
        grown.splice(index, new_layers)?;
        grown.ensure_unique_names()?;

        self.rounds_grown += 1;
        self.config = grown;
        log::debug!(
            "Injected {} layers at position {} for member {} ({} layers total)",
            self.incremental_layers.len(),
            index,
            member_number,
            self.config.len()
        );
        Ok(index)
    }
}
