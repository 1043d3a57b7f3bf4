//! Core infrastructure: fundamental types, defaults, error handling and the
//! trait seams the ensemble core is built around.
//!
//! - [`types`]: data types and row-wise helpers
//! - [`constants`]: configuration defaults and numerical tolerances
//! - [`error`]: the crate error type
//! - [`traits`]: `Member`, `ModelTrainer` and `Resampler`

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{Result, ToupeeError};
pub use traits::*;
pub use types::*;

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Install the `env_logger` backend, defaulting to `info` when `RUST_LOG` is unset.
///
/// Safe to call more than once; only the first call has an effect, and an
/// already-installed logger is left alone.
pub fn initialize_logging() {
    LOGGING_INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        if env_logger::Builder::from_env(env).try_init().is_ok() {
            log::debug!("Logging initialized");
        }
    });
}
