use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use folio_core::classify::classify_with;
use folio_core::config::ViewerConfig;
use folio_core::download::{download, DownloadOutcome};

use crate::source;

#[derive(Args)]
pub struct FetchArgs {
    /// URL or local path
    pub source: String,

    /// Directory to save into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Fetch with the session credential
    #[arg(long)]
    pub auth: bool,
}

pub fn run(args: &FetchArgs, config: &ViewerConfig) -> Result<()> {
    let descriptors = source::descriptors(std::slice::from_ref(&args.source), args.auth);
    let loader = source::loader(config)?;
    let descriptor = &descriptors[0];
    let meta = classify_with(descriptor, None, loader.base_url());

    let outcome = download(&loader, descriptor, &meta, &args.output)
        .with_context(|| format!("Failed to save {}", meta.resolved_display_name))?;
    match outcome {
        DownloadOutcome::Saved(path) => println!("Saved {}", path.display()),
        DownloadOutcome::Navigate(url) => {
            println!("Could not download directly; open this link instead:");
            println!("  {url}");
        }
    }

    Ok(())
}
