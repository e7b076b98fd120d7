use anyhow::{Context, Result};
use folio_core::attachment::AttachmentDescriptor;
use folio_core::config::ViewerConfig;
use folio_core::loader::ResourceLoader;
use tracing::debug;

/// Turn command-line sources into descriptors numbered from 1. Remote
/// sources are protected when `auth` is set.
pub fn descriptors(sources: &[String], auth: bool) -> Vec<AttachmentDescriptor> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| AttachmentDescriptor::from_source((i + 1).to_string(), source, auth))
        .collect()
}

pub fn loader(config: &ViewerConfig) -> Result<ResourceLoader> {
    let loader =
        ResourceLoader::from_config(&config.network).context("Failed to set up HTTP client")?;
    debug!("Base URL: {}", loader.base_url().unwrap_or("(none)"));
    Ok(loader)
}
