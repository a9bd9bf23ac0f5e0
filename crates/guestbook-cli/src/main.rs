//! Command-line interface for a local guestbook ledger
//!
//! Signs, counts and lists guestbook entries stored under a data directory.

use anyhow::Result;
use clap::{Parser, Subcommand};
use guestbook_cli::commands::{common, init, read, sign, status};
use guestbook_core::SignerAddress;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "guestbook")]
#[command(about = "Guestbook - sign and read a shared wall of messages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "guestbook.toml")]
    config: PathBuf,

    /// Override the configured data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy an empty guestbook
    Init,

    /// Sign the guestbook
    Sign {
        /// Signer address (0x-prefixed, 20 bytes)
        #[arg(long = "from")]
        signer: SignerAddress,

        /// Message to leave
        message: String,
    },

    /// Show the number of signatures
    Total,

    /// Show the newest signatures
    Last {
        /// How many entries to show (defaults to the configured window)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show ledger location and summary
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = common::load_config(&cli.config, cli.data_dir)?;
    let mut out = std::io::stdout();

    match cli.command {
        Commands::Init => init::handle_init(&config, &mut out).await,
        Commands::Sign { signer, message } => {
            sign::handle_sign(&config, signer, &message, &mut out).await
        }
        Commands::Total => read::handle_total(&config, &mut out).await,
        Commands::Last { count, json } => read::handle_last(&config, count, json, &mut out).await,
        Commands::Status => status::handle_status(&config, &mut out).await,
    }
}
