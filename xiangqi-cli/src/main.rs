//! Xiangqi CLI - Command-line interface
//!
//! Commands:
//! - play: Play a game between two AI players
//! - suggest: Search a saved position for the best move

mod play;
mod suggest;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use play::PlayArgs;
use suggest::SuggestArgs;

#[derive(Parser)]
#[command(name = "xiangqi")]
#[command(about = "Xiangqi rules engine and minimax player")]
struct Cli {
    /// RNG seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game between two AI players
    Play(PlayArgs),
    /// Suggest a move for a saved position
    Suggest(SuggestArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args, cli.seed),
        Commands::Suggest(args) => suggest::run(args, cli.seed),
    }
}
