use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use folio_core::classify::classify_with;
use folio_core::config::ViewerConfig;
use folio_core::download::{sanitize_file_name, unique_path};
use folio_core::thumbnail::{Thumbnail, ThumbnailRenderer};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::source;

#[derive(Args)]
pub struct ThumbsArgs {
    /// URLs or local paths
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Directory to write the PNG previews into
    #[arg(short, long)]
    pub output: PathBuf,

    /// Fetch URLs with the session credential
    #[arg(long)]
    pub auth: bool,
}

pub fn run(args: &ThumbsArgs, config: &ViewerConfig) -> Result<()> {
    let descriptors = source::descriptors(&args.sources, args.auth);
    let loader = source::loader(config)?;
    let renderer = ThumbnailRenderer::from_config(&config.thumbnails);
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let pb = ProgressBar::new(descriptors.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Rendering previews");

    let thumbs: Vec<Thumbnail> = descriptors
        .par_iter()
        .map(|descriptor| {
            let thumb = renderer.render_attachment(&loader, descriptor);
            pb.inc(1);
            thumb
        })
        .collect();
    pb.finish_with_message("Writing previews");

    let (w, h) = renderer.surface_size();
    println!("\n{:>4}  {:<10}  {}", "#", "Preview", "File");
    println!("{}", "-".repeat(40));
    let mut glyphs = 0;
    for (i, (descriptor, thumb)) in descriptors.iter().zip(thumbs).enumerate() {
        let meta = classify_with(descriptor, None, loader.base_url());
        let (image, kind) = match thumb {
            Thumbnail::Preview(image) => (image, "rendered"),
            Thumbnail::Glyph(category) => {
                glyphs += 1;
                (renderer.glyph_surface(category), "glyph")
            }
        };
        let path = output_path(&args.output, i, &meta.resolved_display_name);
        image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{:>4}  {:<10}  {}", i + 1, kind, path.display());
    }

    println!(
        "\n{} preview(s) at {w}x{h}, {glyphs} shown as glyphs",
        descriptors.len()
    );
    Ok(())
}

fn output_path(dir: &Path, index: usize, display_name: &str) -> PathBuf {
    let stem = Path::new(&sanitize_file_name(display_name))
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".into());
    unique_path(&dir.join(format!("{:03}-{stem}.png", index + 1)))
}
