//! Birdforge: declarative BGP peering config generator for the BIRD
//! routing daemon.
//!
//! This is the main entry point. It initializes logging, parses arguments,
//! runs the generation pipeline, and maps errors to exit codes.

mod bird;
mod cli;
mod config;
mod enrich;
mod error;
mod events;
mod exit_codes;
mod filter;
mod fs;
mod naming;
mod pipeline;
mod registry;
mod render;
mod tree;

use cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose {
        "birdforge=debug"
    } else {
        "birdforge=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("birdforge {} starting", env!("CARGO_PKG_VERSION"));

    match pipeline::run(&cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
