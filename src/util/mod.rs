//! Shared helpers

pub mod logging;

pub use logging::{config_from_args, config_from_env, init_logging, LoggingConfig};
