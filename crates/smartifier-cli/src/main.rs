//! Smartifier2 CLI - transform graph data into smart graph format
//!
//! Rewrites CSV and JSONL property graph files so that every vertex key is
//! prefixed with its smart graph attribute value and every edge reference
//! points at the prefixed form.
//!
//! # Usage
//!
//! ```bash
//! # Rewrite vertex keys
//! smartifier2 vertices --input v.csv --output v.out.csv \
//!     --smart-graph-attribute region
//!
//! # Rewrite edge endpoints against the vertex data, in place
//! smartifier2 edges --vertices profiles:v.csv \
//!     --edges e.csv:profiles:profiles --threads 4
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod progress;
mod selftest;

/// Smartifier2 - smart graph data preparation
#[derive(Parser, Debug)]
#[command(name = "smartifier2")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Run the built-in codec self checks and exit
    #[arg(long = "test", global = true)]
    test: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite vertex keys with the smart graph attribute
    Vertices(commands::vertices::VerticesArgs),

    /// Rewrite edge endpoints and keys against vertex data
    Edges(commands::edges::EdgesArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = if cli.global.quiet {
        Level::ERROR
    } else if cli.global.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if cli.global.test {
        return selftest::run();
    }

    match cli.command {
        Some(Commands::Vertices(args)) => commands::vertices::execute(args, cli.global),
        Some(Commands::Edges(args)) => commands::edges::execute(args, cli.global),
        None => anyhow::bail!("need a subcommand 'vertices' or 'edges', see --help"),
    }
}
