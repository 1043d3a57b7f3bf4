//! Ensemble parameters, their builder, and file/environment loading.
//!
//! Parameters are validated once, when built or loaded. Nothing downstream
//! fills in missing values on the fly.

use super::method::MethodParams;
use crate::core::constants::*;
use crate::core::error::{Result, ToupeeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Hyperparameters handed to the model trainer for one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Number of training epochs
    pub n_epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Seed for the trainer's own randomness
    pub random_seed: u64,
    /// Trainer-specific settings passed through untouched
    pub extra: BTreeMap<String, Value>,
}

/// Complete configuration of an ensemble build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsembleParams {
    /// Ensemble method and its specific parameters
    pub method: MethodParams,
    /// Number of members to train
    pub ensemble_size: usize,
    /// Examples per resample (0 = size of the training set)
    #[serde(default = "default_resample_size")]
    pub resample_size: usize,
    /// Batch size for training and inference
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Epochs for the first member (and every member outside DIB)
    #[serde(default = "default_n_epochs")]
    pub n_epochs: usize,
    /// Seed for resampling and trainer randomness
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    /// Architecture description file
    #[serde(default)]
    pub model_file: Option<PathBuf>,
    /// Trainer-specific settings passed through untouched
    #[serde(default)]
    pub trainer: BTreeMap<String, Value>,
}

fn default_resample_size() -> usize {
    DEFAULT_RESAMPLE_SIZE
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_n_epochs() -> usize {
    DEFAULT_N_EPOCHS
}

fn default_random_seed() -> u64 {
    DEFAULT_RANDOM_SEED
}

impl Default for EnsembleParams {
    fn default() -> Self {
        EnsembleParams {
            method: MethodParams::default(),
            ensemble_size: DEFAULT_ENSEMBLE_SIZE,
            resample_size: DEFAULT_RESAMPLE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            n_epochs: DEFAULT_N_EPOCHS,
            random_seed: DEFAULT_RANDOM_SEED,
            model_file: None,
            trainer: BTreeMap::new(),
        }
    }
}

impl EnsembleParams {
    /// Validate all parameters.
    pub fn validate(&self) -> Result<()> {
        if self.ensemble_size == 0 {
            return Err(ToupeeError::invalid_parameter(
                "ensemble_size",
                "0",
                "must be at least 1",
            ));
        }

        if self.batch_size == 0 {
            return Err(ToupeeError::invalid_parameter(
                "batch_size",
                "0",
                "must be at least 1",
            ));
        }

        if self.n_epochs == 0 {
            return Err(ToupeeError::invalid_parameter(
                "n_epochs",
                "0",
                "must be at least 1",
            ));
        }

        self.method.validate()
    }

    /// Resample size for a training set of `train_len` examples.
    pub fn effective_resample_size(&self, train_len: usize) -> usize {
        if self.resample_size == 0 {
            train_len
        } else {
            self.resample_size
        }
    }

    /// Trainer hyperparameters for a member trained for `n_epochs` epochs.
    pub fn training_params(&self, n_epochs: usize) -> TrainingParams {
        TrainingParams {
            n_epochs,
            batch_size: self.batch_size,
            random_seed: self.random_seed,
            extra: self.trainer.clone(),
        }
    }

    /// Load parameters from a `.json` or `.toml` file and validate them.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ToupeeError::config(format!("Failed to read config file: {}", e)))?;

        let params: EnsembleParams = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ToupeeError::config(format!("Failed to parse JSON config: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ToupeeError::config(format!("Failed to parse TOML config: {}", e)))?,
            _ => {
                return Err(ToupeeError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        params.validate()?;
        Ok(params)
    }

    /// Save parameters to a `.json` or `.toml` file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| ToupeeError::config(format!("Failed to serialize to JSON: {}", e)))?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| ToupeeError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(ToupeeError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| ToupeeError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Override numeric parameters from `TOUPEE_*` environment variables.
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_value("ENSEMBLE_SIZE")? {
            self.ensemble_size = v;
        }
        if let Some(v) = env_value("RESAMPLE_SIZE")? {
            self.resample_size = v;
        }
        if let Some(v) = env_value("BATCH_SIZE")? {
            self.batch_size = v;
        }
        if let Some(v) = env_value("N_EPOCHS")? {
            self.n_epochs = v;
        }
        if let Some(v) = env_value("RANDOM_SEED")? {
            self.random_seed = v;
        }

        self.validate()
    }
}

fn env_value<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    let key = format!("{}{}", ENV_PREFIX, name);
    match std::env::var(&key) {
        Ok(val) => val
            .parse()
            .map(Some)
            .map_err(|_| ToupeeError::config(format!("Invalid {}: {}", key, val))),
        Err(_) => Ok(None),
    }
}

/// Builder for [`EnsembleParams`].
#[derive(Debug)]
pub struct EnsembleParamsBuilder {
    params: EnsembleParams,
    validation_errors: Vec<String>,
}

impl EnsembleParamsBuilder {
    /// Create a new builder with default parameters
    pub fn new() -> Self {
        EnsembleParamsBuilder {
            params: EnsembleParams::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the ensemble method
    pub fn method(mut self, method: MethodParams) -> Self {
        self.params.method = method;
        self
    }

    /// Set the number of members
    pub fn ensemble_size(mut self, size: usize) -> Self {
        if size == 0 {
            self.validation_errors
                .push("ensemble_size must be at least 1".to_string());
        }
        self.params.ensemble_size = size;
        self
    }

    /// Set the resample size (0 = size of the training set)
    pub fn resample_size(mut self, size: usize) -> Self {
        self.params.resample_size = size;
        self
    }

    /// Set the batch size
    pub fn batch_size(mut self, size: usize) -> Self {
        if size == 0 {
            self.validation_errors
                .push("batch_size must be at least 1".to_string());
        }
        self.params.batch_size = size;
        self
    }

    /// Set the epochs for the first member
    pub fn n_epochs(mut self, epochs: usize) -> Self {
        if epochs == 0 {
            self.validation_errors
                .push("n_epochs must be at least 1".to_string());
        }
        self.params.n_epochs = epochs;
        self
    }

    /// Set the random seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.params.random_seed = seed;
        self
    }

    /// Set the architecture description file
    pub fn model_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.params.model_file = Some(path.into());
        self
    }

    /// Add a trainer-specific setting
    pub fn trainer_option<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.params.trainer.insert(key.into(), value.into());
        self
    }

    /// Build the parameters, reporting every collected validation error.
    pub fn build(self) -> Result<EnsembleParams> {
        if !self.validation_errors.is_empty() {
            return Err(ToupeeError::config(self.validation_errors.join("; ")));
        }
        self.params.validate()?;
        Ok(self.params)
    }
}

impl Default for EnsembleParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
