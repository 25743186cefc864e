use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod replay;
mod session;
mod synth;
mod trace;

use config::Config;

#[derive(Parser)]
#[command(name = "smilecheck", version, about = "Smile asymmetry check over facial landmark traces")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a JSON-lines landmark trace through the capture protocol
    Replay {
        /// Trace file
        trace: PathBuf,
        /// TOML config file (default: $SMILECHECK_CONFIG, else built-in defaults)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print every tick's status as JSON
        #[arg(long)]
        json: bool,
        /// Stay on the welcome stage until the trace sends a begin event
        #[arg(long)]
        wait_for_begin: bool,
    },
    /// Write a synthetic capture trace to stdout
    Synth(synth::SynthArgs),
    /// Print the effective configuration as TOML
    Config {
        /// TOML config file (default: $SMILECHECK_CONFIG, else built-in defaults)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries traces and statuses; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            trace,
            config,
            json,
            wait_for_begin,
        } => {
            let config = Config::load(config.as_deref())?;
            if let Some(source) = &config.source {
                tracing::info!(path = %source.display(), "configuration loaded");
            }
            let options = replay::ReplayOptions {
                json,
                wait_for_begin,
            };
            replay::run(&trace, config.flow, &options).await?;
        }
        Command::Synth(args) => synth::run(&args)?,
        Command::Config { config } => {
            let config = Config::load(config.as_deref())?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
