pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, DdlArgs, HealthArgs, ProcessArgs};
pub use output::{HealthStatus, OutputFormat, OutputFormatter, ProcessReport};
