/// Lowest legal zoom, in percent.
pub const MIN_ZOOM_PERCENT: f32 = 25.0;

/// Highest legal zoom, in percent.
pub const MAX_ZOOM_PERCENT: f32 = 400.0;

/// Zoom at which content exactly fits the available viewport area.
pub const DEFAULT_ZOOM_PERCENT: f32 = 100.0;

/// Zoom change per discrete input event (wheel tick, +/- key).
pub const DEFAULT_ZOOM_STEP: f32 = 10.0;

/// Extra slack (px) added to the pan bound so edges can be pulled slightly
/// past the viewport.
pub const DEFAULT_PAN_PADDING: f32 = 24.0;

/// Floor for the available viewport height once overlays are subtracted.
pub const MIN_AVAILABLE_EXTENT: f32 = 1.0;

/// Synthetic loading window between an explicit selection and the index swap.
pub const DEFAULT_SELECTION_TRANSITION_MS: u64 = 120;

/// How long a handle given to an external surface stays alive.
pub const DEFAULT_OPEN_EXTERNAL_GRACE_MS: u64 = 10_000;

/// Upper bound on decoded text content kept for the text renderer.
pub const DEFAULT_MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Fixed preview surface for sidebar thumbnails.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 120;
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 160;

/// Rasterization resolution for thumbnails and for the main document view.
pub const DEFAULT_THUMBNAIL_DPI: u32 = 48;
pub const DEFAULT_VIEWER_DPI: u32 = 110;

/// HTTP status that triggers the credential refresh cycle.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// URI scheme prefix for locally allocated blob handles.
pub const BLOB_URI_PREFIX: &str = "blob:folio/";

/// Trailing path segment that marks an inline-view endpoint.
pub const VIEW_SEGMENT: &str = "view";

/// Replacement segment for the matching download endpoint.
pub const DOWNLOAD_SEGMENT: &str = "download";
