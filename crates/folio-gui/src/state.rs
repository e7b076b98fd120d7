use std::collections::HashMap;

use folio_core::attachment::AttachmentId;
use folio_core::config::ThumbnailConfig;

/// What the viewport draws for the active attachment once it has loaded.
pub enum ContentView {
    /// Image or first document page, uploaded to the GPU.
    Raster(egui::TextureHandle),
    /// The text itself lives in the controller state.
    Text { truncated: bool },
    Media,
    Passthrough(String),
    DownloadOnly,
}

/// UI-side state that never crosses into the controller.
pub struct ViewState {
    pub content: Option<ContentView>,
    pub thumbnails: HashMap<AttachmentId, egui::TextureHandle>,
    pub thumbnail_size: egui::Vec2,
    pub show_details: bool,
    /// Bumped per opened session; thumbnails from older sessions are dropped.
    pub session: u64,
    /// Outcome of the last user action (download, open, remove).
    pub status: Option<String>,
}

impl ViewState {
    pub fn new(thumbnails: &ThumbnailConfig) -> Self {
        Self {
            content: None,
            thumbnails: HashMap::new(),
            // Sidebar shows the preview surface at half size.
            thumbnail_size: egui::vec2(
                thumbnails.width as f32 / 2.0,
                thumbnails.height as f32 / 2.0,
            ),
            show_details: false,
            session: 0,
            status: None,
        }
    }

    pub fn clear(&mut self) {
        self.content = None;
        self.thumbnails.clear();
        self.session += 1;
    }
}
