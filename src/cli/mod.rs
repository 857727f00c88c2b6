//! CLI argument parsing for birdforge.
//!
//! Uses clap derive macros. The tool is single-purpose (one generation pass
//! per invocation), so run modes are flags rather than subcommands.

use clap::Parser;
use std::path::PathBuf;

/// Birdforge: declarative BGP peering config generator for BIRD.
///
/// Reads a YAML declaration of peering sessions, enriches incomplete peers
/// from external routing registries, renders BIRD config artifacts, fully
/// reconciles the output directory, and reloads the daemon.
#[derive(Parser, Debug)]
#[command(name = "birdforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the peering declaration file.
    #[arg(short, long, default_value = "/etc/birdforge.yml")]
    pub config: PathBuf,

    /// Run generation and validation without touching the filesystem or
    /// the daemon.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Write artifacts but do not send the reload command to BIRD.
    #[arg(short, long)]
    pub no_configure: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
