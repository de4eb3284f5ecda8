mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use cli::logging::Logger;
use cli::replay::ReplayOptions;

#[derive(Debug, Parser)]
#[command(name = "drea")]
#[command(about = "Multi-finger gesture decoder for smart-home targets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Feed a recorded payload trace through the gesture engine.
    Replay(ReplayArgs),
    /// Decode a single raw payload.
    Decode(DecodeArgs),
    /// List the attributes a target can be driven through.
    Attributes(AttributesArgs),
}

#[derive(Debug, Args)]
struct ReplayArgs {
    trace: PathBuf,
    #[arg(long)]
    targets: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    status: Option<PathBuf>,
    #[arg(long)]
    expect: Option<PathBuf>,
    /// Print one trace line per payload.
    #[arg(long)]
    trace_lines: bool,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    payload: String,
}

#[derive(Debug, Args)]
struct AttributesArgs {
    #[arg(long)]
    targets: PathBuf,
    target_id: String,
}

fn run(cli: Cli) -> Result<()> {
    let mut logger = Logger::from_env()?;

    match cli.command {
        Commands::Replay(args) => cli::replay::run_replay(
            &mut logger,
            ReplayOptions {
                trace_path: args.trace,
                targets_path: args.targets,
                config_path: args.config,
                status_path: args.status,
                expect_path: args.expect,
                trace_lines: args.trace_lines,
            },
        ),
        Commands::Decode(args) => cli::run_decode(&mut logger, &args.payload),
        Commands::Attributes(args) => {
            cli::run_attributes(&mut logger, &args.targets, &args.target_id)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
