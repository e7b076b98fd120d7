use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use image::RgbaImage;
use tracing::debug;

use crate::error::{FolioError, Result};

/// Renders one page of a paginated document. Pages are 1-based.
pub trait PageRasterizer: Send + Sync {
    fn rasterize_page(&self, document: &[u8], page: u32) -> Result<RgbaImage>;
}

/// Rasterizer used when no external program is available.
pub struct NoRasterizer;

impl PageRasterizer for NoRasterizer {
    fn rasterize_page(&self, _document: &[u8], _page: u32) -> Result<RgbaImage> {
        Err(FolioError::Decode("no page rasterizer configured".into()))
    }
}

/// Rasterizes through an external poppler-compatible program (`pdftoppm`).
pub struct CommandRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl CommandRasterizer {
    pub fn new(program: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            program: program.into(),
            dpi: dpi.max(1),
        }
    }
}

impl PageRasterizer for CommandRasterizer {
    fn rasterize_page(&self, document: &[u8], page: u32) -> Result<RgbaImage> {
        if page == 0 {
            return Err(FolioError::Decode("page numbers start at 1".into()));
        }

        let dir = tempfile::tempdir()?;
        let input = dir.path().join("document.pdf");
        std::fs::write(&input, document)?;
        let output_root = dir.path().join("page");
        let page_arg = page.to_string();

        debug!(
            "Rasterizing page {page} with {} at {} dpi",
            self.program.display(),
            self.dpi
        );
        let output = Command::new(&self.program)
            .args(["-f", &page_arg, "-l", &page_arg])
            .args(["-r", &self.dpi.to_string()])
            .args(["-png", "-singlefile"])
            .arg(&input)
            .arg(&output_root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                FolioError::Decode(format!("failed to run {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FolioError::Decode(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let rendered = image::open(output_root.with_extension("png"))
            .map_err(|e| FolioError::Decode(format!("unreadable page raster: {e}")))?;
        Ok(rendered.to_rgba8())
    }
}

/// Pick a rasterizer from a configured program name; empty disables it.
pub fn rasterizer_for(program: &str, dpi: u32) -> Arc<dyn PageRasterizer> {
    if program.trim().is_empty() {
        Arc::new(NoRasterizer)
    } else {
        Arc::new(CommandRasterizer::new(program.trim(), dpi))
    }
}
