//! dochub CLI - documentation aggregator.
//!
//! Provides commands for:
//! - `book`: Build the offline mdBook from every configured collection
//! - `sidebar`: Generate sidebar link JSON for the live site
//! - `combine`: Concatenate a generated book into one markdown file

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BookArgs, CombineArgs, SidebarArgs};
use output::Output;

/// dochub - documentation aggregator.
#[derive(Parser)]
#[command(name = "dochub", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the offline book.
    Book(BookArgs),
    /// Generate sidebar link JSON.
    Sidebar(SidebarArgs),
    /// Combine a generated book into a single markdown file.
    Combine(CombineArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Book(args) => args.common.verbose,
            Self::Sidebar(args) => args.common.verbose,
            Self::Combine(args) => args.common.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Book(args) => args.execute(),
        Commands::Sidebar(args) => args.execute(),
        Commands::Combine(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
