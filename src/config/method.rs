//! Ensemble method selection and per-method parameters.

use crate::architecture::{InjectionIndex, InjectionPolicy, LayerSpec};
use crate::core::error::{Result, ToupeeError};
use crate::core::types::MethodKind;
use serde::{Deserialize, Serialize};

/// Which ensemble method to run, with the parameters only that method uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum MethodParams {
    /// Bootstrap aggregation
    Bagging {
        /// Combine members by majority vote instead of probability averaging
        #[serde(default)]
        voting: bool,
    },
    /// AdaBoost-M1
    AdaBoostM1,
    /// Deep Incremental Boosting
    #[serde(rename = "DIB", alias = "Dib")]
    Dib {
        /// Training epochs for every member after the first
        n_epochs_after_first: usize,
        /// Advance the injection index past earlier injections
        #[serde(default)]
        grow_forward: bool,
        /// Where to splice the incremental layers
        #[serde(default)]
        incremental_index: InjectionIndex,
        /// Layers added to the architecture each round after the first
        #[serde(default)]
        incremental_layers: Vec<LayerSpec>,
    },
}

impl Default for MethodParams {
    fn default() -> Self {
        MethodParams::Bagging { voting: false }
    }
}

impl MethodParams {
    /// Method identifier
    pub fn kind(&self) -> MethodKind {
        match self {
            MethodParams::Bagging { .. } => MethodKind::Bagging,
            MethodParams::AdaBoostM1 => MethodKind::AdaBoostM1,
            MethodParams::Dib { .. } => MethodKind::Dib,
        }
    }

    /// Injection policy for DIB, `None` for the other methods.
    pub fn injection_policy(&self) -> Option<InjectionPolicy> {
        match self {
            MethodParams::Dib {
                grow_forward,
                incremental_index,
                ..
            } => Some(InjectionPolicy {
                index: *incremental_index,
                grow_forward: *grow_forward,
            }),
            _ => None,
        }
    }

    /// Human-readable description of the method and its parameters.
    pub fn describe(&self) -> String {
        match self {
            MethodParams::Bagging { voting: true } => "Bagging (majority vote)".to_string(),
            MethodParams::Bagging { voting: false } => "Bagging".to_string(),
            MethodParams::AdaBoostM1 => "AdaBoostM1".to_string(),
            MethodParams::Dib {
                n_epochs_after_first,
                grow_forward,
                incremental_index,
                incremental_layers,
            } => {
                let layers: Vec<&str> = incremental_layers
                    .iter()
                    .map(|l| l.class_name.as_str())
                    .collect();
                format!(
                    "DIB {{ n_epochs_after_first: {}, grow_forward: {}, incremental_index: {}, incremental_layers: [{}] }}",
                    n_epochs_after_first,
                    grow_forward,
                    incremental_index,
                    layers.join(", ")
                )
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let MethodParams::Dib {
            n_epochs_after_first,
            incremental_layers,
            ..
        } = self
        {
            if *n_epochs_after_first == 0 {
                return Err(ToupeeError::invalid_parameter(
                    "n_epochs_after_first",
                    "0",
                    "must be at least 1",
                ));
            }
            if incremental_layers.is_empty() {
                log::warn!("DIB configured without incremental layers; the architecture will not grow");
            }
        }
        Ok(())
    }
}
