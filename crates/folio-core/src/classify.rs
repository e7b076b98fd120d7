use crate::attachment::{
    AttachmentDescriptor, AttachmentMeta, AttachmentSource, Category,
};

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "ico", "tif", "tiff", "avif",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "mov", "m4v", "mkv", "avi"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "oga", "flac", "aac", "m4a", "opus"];
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "csv", "log", "json", "xml", "yaml", "yml", "ini", "toml",
];

/// Classify a descriptor using only the information it carries.
pub fn classify(descriptor: &AttachmentDescriptor) -> AttachmentMeta {
    classify_with(descriptor, None, None)
}

/// Classify a descriptor, taking a detected content-type (from a response
/// header or magic bytes) into account when no type was declared.
///
/// Extension inference order: display name, source path, mime-type table.
pub fn classify_with(
    descriptor: &AttachmentDescriptor,
    detected_mime: Option<&str>,
    base_url: Option<&str>,
) -> AttachmentMeta {
    let mime_type = descriptor
        .declared_mime_type
        .as_deref()
        .or(detected_mime)
        .map(normalize_mime)
        .filter(|m| !m.is_empty());

    let path_hint = descriptor.source.path_hint();
    let extension = descriptor
        .display_name
        .as_deref()
        .and_then(extension_of)
        .or_else(|| path_hint.as_deref().and_then(extension_of))
        .or_else(|| {
            mime_type
                .as_deref()
                .and_then(extension_for_mime)
                .map(str::to_string)
        })
        .unwrap_or_default();

    let mut category = category_for_extension(&extension);
    if category == Category::Generic {
        if let Some(mime) = mime_type.as_deref() {
            category = category_for_mime(mime);
        }
    }

    let resolved_display_name = resolve_display_name(descriptor, path_hint.as_deref(), &extension);

    let (resolved_url, must_revoke_handle) = match &descriptor.source {
        AttachmentSource::Remote(locator) => {
            (Some(locator.resolve(base_url)), locator.requires_auth)
        }
        AttachmentSource::Local(path) => (Some(path.to_string_lossy().into_owned()), false),
        AttachmentSource::Binary(_) => (None, true),
    };

    AttachmentMeta {
        id: descriptor.id.clone(),
        resolved_display_name,
        extension,
        resolved_url,
        category,
        must_revoke_handle,
        mime_type,
    }
}

fn resolve_display_name(
    descriptor: &AttachmentDescriptor,
    path_hint: Option<&str>,
    extension: &str,
) -> String {
    if let Some(name) = descriptor.display_name.as_deref().map(str::trim) {
        if !name.is_empty() {
            return name.to_string();
        }
    }

    let last_segment = path_hint
        .map(last_path_segment)
        .filter(|segment| extension_of(segment).is_some());
    if let Some(segment) = last_segment {
        return segment.to_string();
    }

    if extension.is_empty() {
        format!("attachment-{}", descriptor.id)
    } else {
        format!("attachment-{}.{extension}", descriptor.id)
    }
}

fn last_path_segment(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
}

/// Lowercase extension of the last path segment, if it has a plausible one.
pub fn extension_of(name: &str) -> Option<String> {
    let segment = last_path_segment(name);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 8 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Strip parameters and case from a content-type value.
pub fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Fallback extension for a content-type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let mime = normalize_mime(mime);
    if mime == "application/pdf" {
        Some("pdf")
    } else if mime.starts_with("image/") {
        Some("jpg")
    } else if mime.starts_with("video/") {
        Some("mp4")
    } else if mime.starts_with("text/") {
        Some("txt")
    } else if mime.starts_with("audio/") {
        Some("mp3")
    } else {
        None
    }
}

pub fn category_for_extension(ext: &str) -> Category {
    let ext = ext.to_ascii_lowercase();
    let ext = ext.as_str();
    if IMAGE_EXTENSIONS.contains(&ext) {
        Category::Image
    } else if ext == "pdf" {
        Category::Pdf
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Category::Video
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Category::Audio
    } else if TEXT_EXTENSIONS.contains(&ext) {
        Category::Text
    } else {
        Category::Generic
    }
}

pub fn category_for_mime(mime: &str) -> Category {
    match extension_for_mime(mime) {
        Some(ext) => category_for_extension(ext),
        None => Category::Generic,
    }
}

/// Detect a content-type from leading magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_rejects_hidden_and_spaced_names() {
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("Report v1.2 final"), None);
        assert_eq!(extension_of("C:\\docs\\Scan.PDF"), Some("pdf".into()));
        assert_eq!(extension_of("/files/9/view"), None);
    }

    #[test]
    fn mime_parameters_are_ignored() {
        assert_eq!(extension_for_mime("Text/Plain; charset=utf-8"), Some("txt"));
        assert_eq!(extension_for_mime("application/octet-stream"), None);
    }

    #[test]
    fn sniff_detects_pdf_and_png() {
        assert_eq!(sniff_mime(b"%PDF-1.7\n..."), Some("application/pdf"));
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(sniff_mime(&png_magic), Some("image/png"));
        assert_eq!(sniff_mime(b"hello"), None);
    }
}
