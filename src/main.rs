//! modbuild CLI entry point

use clap::Parser;

use modbuild::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();

    // Initialize structured logging with env-based filter, defaulting to info (debug with --verbose)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    cli::run(cli);
}
