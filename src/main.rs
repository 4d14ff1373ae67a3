use easyapigis::cli::commands::{CliArgs, Commands};
use easyapigis::cli::handlers::{handle_ddl, handle_health, handle_process};
use easyapigis::util::logging::{config_from_args, init_logging};
use easyapigis::VERSION;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("easyapigis v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Process(process_args) => handle_process(process_args, args.quiet).await,
        Commands::Health(health_args) => handle_health(health_args).await,
        Commands::Ddl(ddl_args) => handle_ddl(ddl_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    init_logging(config_from_args(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));
}
