//! Default values for ensemble parameters and numerical tolerances.

/// Default number of ensemble members.
pub const DEFAULT_ENSEMBLE_SIZE: usize = 10;

/// Default number of examples drawn per resample.
/// Zero means "as many as the original training set".
pub const DEFAULT_RESAMPLE_SIZE: usize = 0;

/// Default inference and training batch size.
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Default number of training epochs for a member.
pub const DEFAULT_N_EPOCHS: usize = 100;

/// Default random seed for resampling.
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Weighted errors at or below this value count as a perfect member.
pub const PERFECT_ERROR_TOLERANCE: f64 = 1e-12;

/// Weighted errors at or above `1 - DEGENERATE_ERROR_TOLERANCE` are degenerate.
pub const DEGENERATE_ERROR_TOLERANCE: f64 = 1e-12;

/// Allowed deviation of the sampling distribution sum from one.
pub const DISTRIBUTION_SUM_TOLERANCE: f64 = 1e-9;

/// Prefix given to layers injected by incremental growth.
pub const INCREMENTAL_LAYER_PREFIX: &str = "incremental";

/// Prefix of the environment variables read by `apply_environment_overrides`.
pub const ENV_PREFIX: &str = "TOUPEE_";
