mod commands;
mod source;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::config::ViewerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio", about = "Inspect, fetch and preview attachments")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $FOLIO_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how attachments are classified
    Info(commands::info::InfoArgs),
    /// Download an attachment
    Fetch(commands::fetch::FetchArgs),
    /// Render sidebar previews to PNG files
    Thumbs(commands::thumbs::ThumbsArgs),
    /// Compute viewer geometry for a content and viewport size
    Fit(commands::fit::FitArgs),
    /// Print or save the default config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let load_config =
        || ViewerConfig::load(cli.config.as_deref()).context("Failed to load config");

    match &cli.command {
        Commands::Info(args) => commands::info::run(args, &load_config()?),
        Commands::Fetch(args) => commands::fetch::run(args, &load_config()?),
        Commands::Thumbs(args) => commands::thumbs::run(args, &load_config()?),
        Commands::Fit(args) => commands::fit::run(args, &load_config()?),
        Commands::Config(args) => commands::config::run(args),
    }
}
