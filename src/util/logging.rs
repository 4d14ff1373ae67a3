//! Structured logging setup
//!
//! Wraps `tracing-subscriber` for the binary. Filtering honours `RUST_LOG` when it is set; otherwise
//! only this crate logs at the configured level and the HTTP stack is kept
//! at `warn`.
//!
//! # Example
//!
//! ```no_run
//! use easyapigis::util::logging;
//!
//! // Reads EASYAPIGIS_LOG_LEVEL and EASYAPIGIS_LOG_JSON
//! logging::init_logging(logging::config_from_env());
//!
//! tracing::info!(url = "https://example.com/layer.json", "Processing layer");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const QUIET_TARGETS: &[&str] = &["h2", "hyper", "hyper_util", "reqwest", "rustls"];

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,

    /// One JSON object per line instead of the human console format
    pub use_json: bool,

    /// Include the module target (e.g. easyapigis::pipeline) in logs
    pub include_target: bool,

    /// Include file and line number
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    fn filter(&self) -> EnvFilter {
        if env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }

        let mut filter = EnvFilter::default();
        if let Ok(directive) = format!("easyapigis={}", self.level).parse() {
            filter = filter.add_directive(directive);
        }
        for target in QUIET_TARGETS {
            if let Ok(directive) = format!("{target}=warn").parse() {
                filter = filter.add_directive(directive);
            }
        }

        filter
    }
}

/// Parses a log level, case-insensitively, falling back to INFO
///
/// ```
/// use easyapigis::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("Debug"), Level::DEBUG);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber; later calls are ignored
///
/// Logs go to stderr so stdout stays clean for command output.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter();

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

/// Reads `EASYAPIGIS_LOG_LEVEL` and `EASYAPIGIS_LOG_JSON`
///
/// Unset or unparsable values fall back to INFO and console output.
pub fn config_from_env() -> LoggingConfig {
    let level = env::var("EASYAPIGIS_LOG_LEVEL")
        .map(|v| parse_level(&v))
        .unwrap_or(Level::INFO);

    let use_json = env::var("EASYAPIGIS_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level,
        use_json,
        ..Default::default()
    }
}

/// Environment settings with the command-line level flags applied on top
///
/// An explicit `--log-level` wins over `--verbose`, which wins over `--quiet`.
pub fn config_from_args(log_level: Option<&str>, verbose: bool, quiet: bool) -> LoggingConfig {
    let mut config = config_from_env();

    if let Some(level_str) = log_level {
        config.level = parse_level(level_str);
    } else if verbose {
        config.level = Level::DEBUG;
    } else if quiet {
        config.level = Level::ERROR;
    }

    config
}
