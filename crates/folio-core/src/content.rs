use std::sync::Arc;

use image::RgbaImage;

use crate::attachment::{AttachmentMeta, RenderPlan};
use crate::config::ViewerConfig;
use crate::error::{FolioError, Result};
use crate::loader::{Fetched, ResourceLoader};
use crate::raster::{rasterizer_for, PageRasterizer};
use crate::transform::Size;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Renderer-ready form of an attachment's content.
#[derive(Clone, Debug)]
pub enum PreparedContent {
    Image(RgbaImage),
    /// First page of a paginated document, rasterized for the main view.
    Document(RgbaImage),
    Text {
        text: String,
        truncated: bool,
    },
    /// Video or audio; played by an external surface.
    Media,
    Passthrough(String),
    DownloadOnly,
}

impl PreparedContent {
    pub fn natural_size(&self) -> Option<Size> {
        match self {
            Self::Image(img) | Self::Document(img) => {
                let (w, h) = img.dimensions();
                Some(Size::new(w as f32, h as f32))
            }
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Decodes fetched bytes according to the attachment's render plan.
#[derive(Clone)]
pub struct ContentPreparer {
    rasterizer: Arc<dyn PageRasterizer>,
    max_text_bytes: usize,
}

impl ContentPreparer {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, max_text_bytes: usize) -> Self {
        Self {
            rasterizer,
            max_text_bytes,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(
            rasterizer_for(&config.thumbnails.rasterizer, config.thumbnails.viewer_dpi),
            config.viewer.max_text_bytes,
        )
    }

    pub fn prepare(
        &self,
        loader: &ResourceLoader,
        meta: &AttachmentMeta,
        fetched: &Fetched,
    ) -> Result<PreparedContent> {
        match meta.render_plan() {
            RenderPlan::Image => {
                let bytes = loader.read_bytes(fetched)?;
                let decoded = image::load_from_memory(&bytes).map_err(|e| {
                    FolioError::Decode(format!("{}: {e}", meta.resolved_display_name))
                })?;
                Ok(PreparedContent::Image(decoded.to_rgba8()))
            }
            RenderPlan::Document => {
                let bytes = loader.read_bytes(fetched)?;
                let page = self.rasterizer.rasterize_page(&bytes, 1)?;
                Ok(PreparedContent::Document(page))
            }
            RenderPlan::Text => {
                let bytes = loader.read_bytes(fetched)?;
                let (text, truncated) = decode_text(&bytes, self.max_text_bytes);
                Ok(PreparedContent::Text { text, truncated })
            }
            RenderPlan::Video | RenderPlan::Audio => Ok(PreparedContent::Media),
            RenderPlan::Passthrough(url) => Ok(PreparedContent::Passthrough(url)),
            RenderPlan::DownloadOnly => Ok(PreparedContent::DownloadOnly),
        }
    }
}

/// Lossy UTF-8 decode capped at `max_bytes`, cut on a character boundary.
/// Returns the text and whether it was truncated.
pub fn decode_text(bytes: &[u8], max_bytes: usize) -> (String, bool) {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.len() <= max_bytes {
        return (String::from_utf8_lossy(bytes).into_owned(), false);
    }

    let mut end = max_bytes;
    while end > 0 && is_continuation_byte(bytes[end]) {
        end -= 1;
    }
    (String::from_utf8_lossy(&bytes[..end]).into_owned(), true)
}

fn is_continuation_byte(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "añb";
        let (decoded, truncated) = decode_text(text.as_bytes(), 2);
        assert_eq!(decoded, "a");
        assert!(truncated);
    }

    #[test]
    fn bom_is_stripped() {
        let (decoded, truncated) = decode_text(b"\xEF\xBB\xBFhello", 64);
        assert_eq!(decoded, "hello");
        assert!(!truncated);
    }
}
