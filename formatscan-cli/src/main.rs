//! Formatscan CLI - interlace and telecine analysis for raw video files.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{CmdDeltas, CmdInterlace, CmdTelecine};

/// Analyze raw, uncompressed video for interlacing and telecine patterns.
#[derive(Parser, Debug)]
#[command(name = "formatscan", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print internal statistics and debug information.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-frame field/frame delta log (delta_frame, delta_even, delta_odd, gamma).
    Deltas(CmdDeltas),
    /// Field-difference histogram for one frame.
    Interlace(CmdInterlace),
    /// Telecine cadence detection across the whole stream.
    Telecine(CmdTelecine),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Deltas(cmd) => cmd.run(cli.verbose),
        Command::Interlace(cmd) => cmd.run(cli.verbose),
        Command::Telecine(cmd) => cmd.run(cli.verbose),
    }
}
