use sloth_comments::cli::commands::{CliArgs, Commands};
use sloth_comments::cli::handlers::{handle_generate, handle_version};
use sloth_comments::util::logging::{config_from_env, init_logging, parse_level, LoggingConfig};
use sloth_comments::{NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(logging_config(&args));

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => handle_generate(generate_args, args.quiet).await,
        Commands::Version => handle_version(),
    };

    process::exit(exit_code);
}

fn logging_config(args: &CliArgs) -> LoggingConfig {
    let from_env = config_from_env();
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        from_env.level
    };

    LoggingConfig { level, ..from_env }
}
