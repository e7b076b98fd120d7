use anyhow::Result;
use clap::Args;
use folio_core::classify::{classify_with, sniff_mime};
use folio_core::config::ViewerConfig;
use folio_core::loader::Fetched;

use crate::source;
use crate::summary::{self, Resolved};

#[derive(Args)]
pub struct InfoArgs {
    /// URLs or local paths
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Fetch URLs with the session credential
    #[arg(long)]
    pub auth: bool,

    /// Fetch each source and refine the classification from its content
    #[arg(long)]
    pub resolve: bool,
}

pub fn run(args: &InfoArgs, config: &ViewerConfig) -> Result<()> {
    let descriptors = source::descriptors(&args.sources, args.auth);
    let loader = source::loader(config)?;

    for descriptor in &descriptors {
        if !args.resolve {
            let meta = classify_with(descriptor, None, loader.base_url());
            summary::print_meta(&meta, None);
            continue;
        }

        match loader.fetch(descriptor) {
            Ok(fetched) => {
                let bytes = loader.read_bytes(&fetched).ok();
                let content_type = fetched
                    .content_type()
                    .map(str::to_string)
                    .or_else(|| bytes.as_deref().and_then(sniff_mime).map(str::to_string));
                let size = match (&fetched, &bytes) {
                    (Fetched::Local(path), _) => std::fs::metadata(path).ok().map(|m| m.len()),
                    (_, Some(bytes)) => Some(bytes.len() as u64),
                    _ => None,
                };
                let meta = classify_with(descriptor, content_type.as_deref(), loader.base_url());
                summary::print_meta(&meta, Some(&Resolved { content_type, size }));
            }
            Err(e) => {
                let meta = classify_with(descriptor, None, loader.base_url());
                summary::print_meta(&meta, None);
                eprintln!("    {} ({})", e.kind(), e);
            }
        }
    }
    println!();

    Ok(())
}
