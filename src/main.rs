//! dme-nxos - Cisco NX-OS DME automation
//!
//! This is the main entry point for the dme-nxos CLI.

mod cli;

use anyhow::Result;
use cli::commands::CommandContext;
use cli::{Cli, Commands};
use dme_nxos::config::{Config, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {:#}", e);
        Config::default()
    });

    // Initialize logging based on verbosity and the logging section
    init_logging(cli.verbosity(), &config.logging);

    // Create command context
    let mut ctx = CommandContext::new(&cli, config);

    // Execute the appropriate command
    let exit_code = match &cli.command {
        Commands::ReadClass(args) => args.execute(&mut ctx).await?,
        Commands::ReadDn(args) => args.execute(&mut ctx).await?,
        Commands::Validate(args) => args.execute(&mut ctx).await?,
        Commands::Apply(args) => args.execute(&mut ctx).await?,
        Commands::Interfaces(args) => args.execute(&mut ctx).await?,
    };

    std::process::exit(exit_code);
}

/// Initialize logging to stderr
///
/// `-v` flags take precedence over the configured level; `RUST_LOG` takes
/// precedence over both.
fn init_logging(verbosity: u8, logging: &LoggingConfig) {
    let filter = match verbosity {
        0 => logging.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(verbosity >= 3)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
