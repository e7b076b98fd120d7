use std::sync::Arc;

use image::{imageops, Rgba, RgbaImage};
use rayon::prelude::*;
use tracing::warn;

use crate::attachment::{AttachmentDescriptor, Category};
use crate::classify::classify_with;
use crate::config::ThumbnailConfig;
use crate::error::{FolioError, Result};
use crate::loader::ResourceLoader;
use crate::raster::{rasterizer_for, PageRasterizer};

const SURFACE_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Accent color of the placeholder card drawn for a category.
pub fn glyph_tint(category: Category) -> Rgba<u8> {
    match category {
        Category::Image => Rgba([76, 139, 245, 255]),
        Category::Video => Rgba([156, 89, 209, 255]),
        Category::Pdf => Rgba([219, 68, 55, 255]),
        Category::Text => Rgba([96, 125, 139, 255]),
        Category::Audio => Rgba([15, 157, 88, 255]),
        Category::Generic => Rgba([158, 158, 158, 255]),
    }
}

/// Sidebar preview for one attachment.
#[derive(Clone, Debug)]
pub enum Thumbnail {
    /// Content scaled into the fixed preview surface.
    Preview(RgbaImage),
    /// Draw the generic glyph for this category instead.
    Glyph(Category),
}

impl Thumbnail {
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview(_))
    }
}

/// Renders first-page previews into a fixed-size surface. Every failure is
/// contained to the item that caused it.
#[derive(Clone)]
pub struct ThumbnailRenderer {
    rasterizer: Arc<dyn PageRasterizer>,
    width: u32,
    height: u32,
}

impl ThumbnailRenderer {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, width: u32, height: u32) -> Self {
        Self {
            rasterizer,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn from_config(config: &ThumbnailConfig) -> Self {
        Self::new(
            rasterizer_for(&config.rasterizer, config.dpi),
            config.width,
            config.height,
        )
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render from bytes already in hand.
    pub fn render(&self, category: Category, bytes: &[u8]) -> Thumbnail {
        let rendered = match category {
            Category::Pdf => self.rasterizer.rasterize_page(bytes, 1),
            Category::Image => image::load_from_memory(bytes)
                .map(|img| img.to_rgba8())
                .map_err(FolioError::from),
            other => return Thumbnail::Glyph(other),
        };
        match rendered {
            Ok(page) => Thumbnail::Preview(self.fit_to_surface(&page)),
            Err(e) => {
                warn!("Thumbnail fallback to glyph: {e}");
                Thumbnail::Glyph(category)
            }
        }
    }

    /// Fetch and render one attachment. Categories without a preview never
    /// touch the network.
    pub fn render_attachment(
        &self,
        loader: &ResourceLoader,
        descriptor: &AttachmentDescriptor,
    ) -> Thumbnail {
        let meta = classify_with(descriptor, None, loader.base_url());
        if !matches!(meta.category, Category::Pdf | Category::Image) {
            return Thumbnail::Glyph(meta.category);
        }
        match self.load_bytes(loader, descriptor) {
            Ok(bytes) => self.render(meta.category, &bytes),
            Err(e) => {
                warn!("Thumbnail for {} unavailable: {e}", meta.resolved_display_name);
                Thumbnail::Glyph(meta.category)
            }
        }
    }

    /// Render a whole list in parallel, preserving order.
    pub fn render_all(
        &self,
        loader: &ResourceLoader,
        descriptors: &[AttachmentDescriptor],
    ) -> Vec<Thumbnail> {
        descriptors
            .par_iter()
            .map(|descriptor| self.render_attachment(loader, descriptor))
            .collect()
    }

    fn load_bytes(
        &self,
        loader: &ResourceLoader,
        descriptor: &AttachmentDescriptor,
    ) -> Result<Arc<[u8]>> {
        let fetched = loader.fetch(descriptor)?;
        loader.read_bytes(&fetched)
    }

    /// Raster stand-in for a glyph: a tinted page with a folded corner.
    pub fn glyph_surface(&self, category: Category) -> RgbaImage {
        let mut surface = RgbaImage::from_pixel(self.width, self.height, SURFACE_BACKGROUND);
        let tint = glyph_tint(category);
        let inset_x = self.width / 5;
        let inset_y = self.height / 6;
        let fold = (self.width.min(self.height) / 5).max(1);
        let right = self.width - inset_x;

        for y in inset_y..self.height - inset_y {
            for x in inset_x..right {
                // Cut the top-right corner along the diagonal.
                let from_right = right - x;
                let from_top = y - inset_y;
                if from_right + from_top < fold {
                    continue;
                }
                surface.put_pixel(x, y, tint);
            }
        }
        surface
    }

    /// Scale `page` to fit the surface, centered on a white background.
    fn fit_to_surface(&self, page: &RgbaImage) -> RgbaImage {
        let mut surface = RgbaImage::from_pixel(self.width, self.height, SURFACE_BACKGROUND);
        let (w, h) = page.dimensions();
        if w == 0 || h == 0 {
            return surface;
        }

        let scale = (self.width as f32 / w as f32).min(self.height as f32 / h as f32);
        let scaled_w = ((w as f32 * scale).round() as u32).clamp(1, self.width);
        let scaled_h = ((h as f32 * scale).round() as u32).clamp(1, self.height);
        let scaled = imageops::thumbnail(page, scaled_w, scaled_h);

        let x = (self.width - scaled_w) / 2;
        let y = (self.height - scaled_h) / 2;
        imageops::overlay(&mut surface, &scaled, x as i64, y as i64);
        surface
    }
}
