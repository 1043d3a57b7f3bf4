//! Configuration management for ensemble builds.
//!
//! [`EnsembleParams`] is the single validated configuration surface consumed
//! by the ensemble core; [`MethodParams`] selects the ensemble method.

pub mod core;
pub mod method;

pub use self::core::{EnsembleParams, EnsembleParamsBuilder, TrainingParams};
pub use self::method::MethodParams;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "toupee.toml";
