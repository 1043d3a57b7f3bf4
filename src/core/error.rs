//! Error handling and error types for toupee.
//!
//! Every error aborts the ensemble build: boosting rounds depend on the
//! outcome of all previous rounds, so a failed round leaves nothing to
//! resume from.

use std::io;
use thiserror::Error;

/// Main error type for the toupee library.
#[derive(Error, Debug)]
pub enum ToupeeError {
    /// Unset or invalid ensemble parameters
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Name of the parameter
        parameter: String,
        /// Offending value
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The weighted error of a boosting round left the log-odds coefficient undefined
    #[error("Degenerate boosting round {round}: weighted error {weighted_error} leaves the coefficient undefined")]
    DegenerateBoosting {
        /// Member number of the failing round (1-based)
        round: usize,
        /// Weighted error observed on the original training set
        weighted_error: f64,
    },

    /// Failure surfaced by the model trainer
    #[error("Training failed for member {round}: {source}")]
    Training {
        /// Member number of the failing round (1-based)
        round: usize,
        /// Error reported by the trainer
        #[source]
        source: anyhow::Error,
    },

    /// Dataset-related errors
    #[error("Dataset error: {message}")]
    Dataset {
        /// Description of the problem
        message: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape or size
        expected: String,
        /// Observed shape or size
        actual: String,
    },

    /// Numerical computation errors (overflow, underflow, NaN)
    #[error("Numerical error: {message}")]
    Numerical {
        /// Description of the problem
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying serde_json error
        #[from]
        source: serde_json::Error,
    },

    /// TOML parsing errors
    #[error("TOML error: {source}")]
    Toml {
        /// Underlying toml error
        #[from]
        source: toml::de::Error,
    },
}

/// Type alias for Results using ToupeeError
pub type Result<T> = std::result::Result<T, ToupeeError>;

impl ToupeeError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        ToupeeError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        ToupeeError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a degenerate boosting error
    pub fn degenerate_boosting(round: usize, weighted_error: f64) -> Self {
        ToupeeError::DegenerateBoosting {
            round,
            weighted_error,
        }
    }

    /// Wrap a trainer failure for the given round
    pub fn training(round: usize, source: anyhow::Error) -> Self {
        ToupeeError::Training { round, source }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        ToupeeError::Dataset {
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        ToupeeError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a numerical error
    pub fn numerical<S: Into<String>>(message: S) -> Self {
        ToupeeError::Numerical {
            message: message.into(),
        }
    }

    /// Whether the ensemble build may continue after this error.
    ///
    /// Always false: a missing round breaks the sequential dependency chain
    /// for every round after it.
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// Member number of the round that failed, when the error is tied to one
    pub fn round(&self) -> Option<usize> {
        match self {
            ToupeeError::DegenerateBoosting { round, .. } | ToupeeError::Training { round, .. } => {
                Some(*round)
            }
            _ => None,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ToupeeError::Config { .. } => "config",
            ToupeeError::InvalidParameter { .. } => "invalid_parameter",
            ToupeeError::DegenerateBoosting { .. } => "degenerate_boosting",
            ToupeeError::Training { .. } => "training",
            ToupeeError::Dataset { .. } => "dataset",
            ToupeeError::DimensionMismatch { .. } => "dimension_mismatch",
            ToupeeError::Numerical { .. } => "numerical",
            ToupeeError::Io { .. } => "io",
            ToupeeError::Json { .. } => "json",
            ToupeeError::Toml { .. } => "toml",
        }
    }

    /// Whether this error belongs to the configuration family
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ToupeeError::Config { .. } | ToupeeError::InvalidParameter { .. }
        )
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::ToupeeError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::ToupeeError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! dataset_error {
    ($msg:expr) => {
        $crate::core::error::ToupeeError::dataset($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::ToupeeError::dataset(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
