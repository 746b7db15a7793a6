use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ratingwatch::config::WatchConfig;
use ratingwatch::runtime;

#[derive(Parser)]
#[command(name = "ratingwatch")]
#[command(about = "Scrapes a rating leaderboard into a sheet store and re-filters it on threshold edits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape, publish, then watch the threshold cells until stopped
    Run {
        /// Path to watch YAML file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Scrape and publish once, without the watch loop
    Once {
        /// Path to watch YAML file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a watch configuration
    Validate {
        /// Path to watch YAML file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let watch = WatchConfig::from_yaml_file(&config)?;
            runtime::run_watch(&watch)?;
        }
        Commands::Once { config } => {
            let watch = WatchConfig::from_yaml_file(&config)?;
            runtime::run_once(&watch)?;
        }
        Commands::Validate { config } => {
            let _watch = WatchConfig::from_yaml_file(&config)?;
            println!("✓ Watch configuration is valid");
        }
        Commands::Version => {
            println!("ratingwatch version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
