use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::attachment::{AttachmentDescriptor, AttachmentMeta, AttachmentSource};
use crate::classify::extension_of;
use crate::consts::{DOWNLOAD_SEGMENT, VIEW_SEGMENT};
use crate::error::Result;
use crate::loader::ResourceLoader;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    /// The content could not be saved directly; navigate to this locator instead.
    Navigate(String),
}

/// Map an inline-view locator to its download counterpart by swapping a
/// trailing `view` path segment for `download`. Other locators pass through.
pub fn download_locator(url: &str) -> String {
    let split = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(split);
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((head, last)) if last == VIEW_SEGMENT => {
            format!("{head}/{DOWNLOAD_SEGMENT}{suffix}")
        }
        _ => url.to_string(),
    }
}

/// Save an attachment into `dest_dir` under its display name.
///
/// Protected remote content is fetched with the session credential; if that
/// fails the caller gets [`DownloadOutcome::Navigate`] so it can fall back to
/// direct navigation rather than surfacing an error.
pub fn download(
    loader: &ResourceLoader,
    descriptor: &AttachmentDescriptor,
    meta: &AttachmentMeta,
    dest_dir: &Path,
) -> Result<DownloadOutcome> {
    let name = download_file_name(meta);
    match &descriptor.source {
        AttachmentSource::Binary(blob) => {
            Ok(DownloadOutcome::Saved(save_into(dest_dir, &name, &blob.bytes)?))
        }
        AttachmentSource::Local(path) => {
            let bytes = std::fs::read(path)?;
            Ok(DownloadOutcome::Saved(save_into(dest_dir, &name, &bytes)?))
        }
        AttachmentSource::Remote(locator) => {
            let url = download_locator(&locator.resolve(loader.base_url()));
            if !locator.requires_auth {
                return Ok(DownloadOutcome::Navigate(url));
            }
            match loader.fetch_protected(&url) {
                Ok(response) => {
                    let path = save_into(dest_dir, &name, &response.body)?;
                    info!("Downloaded {} to {}", name, path.display());
                    Ok(DownloadOutcome::Saved(path))
                }
                Err(e) => {
                    warn!("Download of {url} failed ({e}), falling back to direct navigation");
                    Ok(DownloadOutcome::Navigate(url))
                }
            }
        }
    }
}

/// Display name, with the inferred extension appended when the name lacks one.
pub fn download_file_name(meta: &AttachmentMeta) -> String {
    let name = sanitize_file_name(&meta.resolved_display_name);
    if extension_of(&name).is_none() && !meta.extension.is_empty() {
        format!("{name}.{}", meta.extension)
    } else {
        name
    }
}

pub fn save_into(dest_dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dest_dir)?;
    let path = unique_path(&dest_dir.join(sanitize_file_name(name)));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Replace characters that are unsafe in file names.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').to_string();
    if cleaned.is_empty() {
        "attachment".into()
    } else {
        cleaned
    }
}

/// `path` if free, otherwise `stem (n).ext` with the first free `n`.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    let mut counter = 1u32;
    loop {
        let candidate = parent.join(format!("{stem} ({counter}){ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
