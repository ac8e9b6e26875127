//! `iat`: runs one IAT session on the console.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod console;

pub use app::App;

/// Implicit Association Test session runner
#[derive(Parser, Debug)]
#[command(name = "iat")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (default: iat.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stimulus table, overrides the configured one
    #[arg(short, long, value_name = "FILE")]
    stimuli: Option<PathBuf>,

    /// Participant ID; prompted for when missing
    #[arg(long)]
    id: Option<String>,

    /// Condition; prompted for when missing
    #[arg(long)]
    condition: Option<String>,

    /// Output directory for datasets
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match App::new(args).and_then(App::run) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
