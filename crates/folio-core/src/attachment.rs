use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Stable identifier of an attachment, as assigned by the record it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(pub String);

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AttachmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AttachmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A network location for attachment content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteLocator {
    pub url: String,
    /// Whether the fetch must carry the session credential.
    pub requires_auth: bool,
}

impl RemoteLocator {
    pub fn public(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            requires_auth: false,
        }
    }

    pub fn protected(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            requires_auth: true,
        }
    }

    pub fn is_absolute(&self) -> bool {
        is_absolute_url(&self.url)
    }

    /// Join a relative locator onto `base`. Absolute locators are returned as-is.
    pub fn resolve(&self, base: Option<&str>) -> String {
        match base {
            Some(base) if !self.is_absolute() => {
                let base = base.trim_end_matches('/');
                let path = self.url.trim_start_matches('/');
                format!("{base}/{path}")
            }
            _ => self.url.clone(),
        }
    }
}

/// Attachment bytes already held in memory (e.g. a freshly picked file).
#[derive(Clone)]
pub struct BinaryBlob {
    pub bytes: Arc<[u8]>,
    pub file_name: Option<String>,
}

impl BinaryBlob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, file_name: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name,
        }
    }
}

impl std::fmt::Debug for BinaryBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryBlob")
            .field("len", &self.bytes.len())
            .field("file_name", &self.file_name)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum AttachmentSource {
    Remote(RemoteLocator),
    /// A path on the local filesystem; dereferenceable without allocation.
    Local(PathBuf),
    Binary(BinaryBlob),
}

impl AttachmentSource {
    /// Path-like string used for name and extension inference.
    pub fn path_hint(&self) -> Option<String> {
        match self {
            Self::Remote(locator) => Some(url_path(&locator.url).to_string()),
            Self::Local(path) => Some(path.to_string_lossy().into_owned()),
            Self::Binary(blob) => blob.file_name.clone(),
        }
    }

    pub fn remote(&self) -> Option<&RemoteLocator> {
        match self {
            Self::Remote(locator) => Some(locator),
            _ => None,
        }
    }
}

/// Caller-supplied, immutable description of one attachment.
#[derive(Clone, Debug)]
pub struct AttachmentDescriptor {
    pub id: AttachmentId,
    pub source: AttachmentSource,
    pub display_name: Option<String>,
    pub declared_mime_type: Option<String>,
    pub size_bytes: Option<u64>,
}

impl AttachmentDescriptor {
    pub fn new(id: impl Into<AttachmentId>, source: AttachmentSource) -> Self {
        Self {
            id: id.into(),
            source,
            display_name: None,
            declared_mime_type: None,
            size_bytes: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime_type = Some(mime.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }

    /// Descriptor for a user-typed source. Absolute URLs become remote
    /// locators, anything else is a local path whose size is read from disk.
    pub fn from_source(id: impl Into<AttachmentId>, source: &str, protected: bool) -> Self {
        let origin = if is_absolute_url(source) {
            let locator = if protected {
                RemoteLocator::protected(source)
            } else {
                RemoteLocator::public(source)
            };
            AttachmentSource::Remote(locator)
        } else {
            AttachmentSource::Local(PathBuf::from(source))
        };
        let descriptor = Self::new(id, origin);
        match std::fs::metadata(source) {
            Ok(meta) if meta.is_file() => descriptor.with_size(meta.len()),
            _ => descriptor,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Image,
    Video,
    Pdf,
    Text,
    Audio,
    Generic,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "Image"),
            Self::Video => write!(f, "Video"),
            Self::Pdf => write!(f, "PDF document"),
            Self::Text => write!(f, "Text"),
            Self::Audio => write!(f, "Audio"),
            Self::Generic => write!(f, "File"),
        }
    }
}

/// A row in the attachment details list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataField {
    Name,
    Type,
    Size,
    Dimensions,
    Lines,
}

impl MetadataField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Type => "Type",
            Self::Size => "Size",
            Self::Dimensions => "Dimensions",
            Self::Lines => "Lines",
        }
    }
}

impl Category {
    /// Detail rows shown for this category, in display order.
    pub fn metadata_fields(&self) -> &'static [MetadataField] {
        use MetadataField::*;
        match self {
            Self::Image | Self::Video | Self::Pdf => &[Name, Type, Size, Dimensions],
            Self::Text => &[Name, Type, Size, Lines],
            Self::Audio | Self::Generic => &[Name, Type, Size],
        }
    }

    /// Whether the main view draws this category through the transform engine.
    pub fn is_transformable(&self) -> bool {
        matches!(self, Self::Image | Self::Pdf)
    }
}

/// Renderer chosen for an attachment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderPlan {
    Image,
    Document,
    Video,
    Audio,
    Text,
    /// Hand the absolute locator to an embedded passthrough viewer.
    Passthrough(String),
    /// No inline preview; offer download instead.
    DownloadOnly,
}

/// Derived per-descriptor metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentMeta {
    pub id: AttachmentId,
    pub resolved_display_name: String,
    /// Lowercase, without the dot. Empty when nothing could be inferred.
    pub extension: String,
    /// `None` for in-memory blobs until a handle is allocated.
    pub resolved_url: Option<String>,
    pub category: Category,
    pub must_revoke_handle: bool,
    pub mime_type: Option<String>,
}

impl AttachmentMeta {
    pub fn render_plan(&self) -> RenderPlan {
        match self.category {
            Category::Image => RenderPlan::Image,
            Category::Pdf => RenderPlan::Document,
            Category::Video => RenderPlan::Video,
            Category::Audio => RenderPlan::Audio,
            Category::Text => RenderPlan::Text,
            Category::Generic => match self.resolved_url.as_deref() {
                Some(url) if is_absolute_url(url) => RenderPlan::Passthrough(url.to_string()),
                _ => RenderPlan::DownloadOnly,
            },
        }
    }

    /// Human label for the type row, e.g. "Image (png)".
    pub fn type_label(&self) -> String {
        if self.extension.is_empty() {
            self.category.to_string()
        } else {
            format!("{} ({})", self.category, self.extension)
        }
    }
}

pub fn is_absolute_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Path component of a URL, without scheme, authority, query or fragment.
pub fn url_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let url = &url[..end];
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "",
            }
        }
        None => url,
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
