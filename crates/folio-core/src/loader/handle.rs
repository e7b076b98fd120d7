use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::consts::BLOB_URI_PREFIX;

use super::Fetched;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

/// A locally dereferenceable reference to attachment content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Handle {
    /// Bytes held by a [`HandleRegistry`]; must be released by its owner.
    Blob {
        id: HandleId,
        content_type: Option<String>,
    },
    /// A locator the renderer can load directly.
    Remote(String),
    Local(PathBuf),
}

impl Handle {
    pub fn uri(&self) -> String {
        match self {
            Self::Blob { id, .. } => format!("{BLOB_URI_PREFIX}{}", id.0),
            Self::Remote(url) => url.clone(),
            Self::Local(path) => path.to_string_lossy().into_owned(),
        }
    }

    pub fn is_revocable(&self) -> bool {
        matches!(self, Self::Blob { .. })
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Blob { content_type, .. } => content_type.as_deref(),
            _ => None,
        }
    }
}

/// Owner of every blob handle allocated for a viewer session.
///
/// Releasing is idempotent: a second release of the same handle, or a
/// release of a non-revocable handle, is a no-op. Anything still live when
/// the registry is dropped is released then.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    live: HashMap<HandleId, Arc<[u8]>>,
    allocated_total: u64,
    released_total: u64,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, bytes: Arc<[u8]>, content_type: Option<String>) -> Handle {
        let id = HandleId(self.next_id);
        self.next_id += 1;
        self.allocated_total += 1;
        debug!("Allocated handle {} ({} bytes)", id.0, bytes.len());
        self.live.insert(id, bytes);
        Handle::Blob { id, content_type }
    }

    /// Turn a fetch result into a handle, allocating only for inline bytes.
    pub fn materialize(&mut self, fetched: Fetched) -> Handle {
        match fetched {
            Fetched::Inline {
                bytes,
                content_type,
            } => self.allocate(bytes, content_type),
            Fetched::Remote(url) => Handle::Remote(url),
            Fetched::Local(path) => Handle::Local(path),
        }
    }

    /// Bytes behind a live blob handle. Released handles no longer resolve.
    pub fn dereference(&self, handle: &Handle) -> Option<Arc<[u8]>> {
        match handle {
            Handle::Blob { id, .. } => self.live.get(id).cloned(),
            _ => None,
        }
    }

    /// Returns true only when this call actually released the handle.
    pub fn release(&mut self, handle: &Handle) -> bool {
        let Handle::Blob { id, .. } = handle else {
            return false;
        };
        if self.live.remove(id).is_some() {
            self.released_total += 1;
            debug!("Released handle {}", id.0);
            true
        } else {
            false
        }
    }

    pub fn release_all(&mut self) -> usize {
        let count = self.live.len();
        self.live.clear();
        self.released_total += count as u64;
        if count > 0 {
            debug!("Released {count} remaining handle(s)");
        }
        count
    }

    pub fn is_live(&self, handle: &Handle) -> bool {
        match handle {
            Handle::Blob { id, .. } => self.live.contains_key(id),
            _ => false,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn allocated_total(&self) -> u64 {
        self.allocated_total
    }

    pub fn released_total(&self) -> u64 {
        self.released_total
    }
}

impl Drop for HandleRegistry {
    fn drop(&mut self) {
        self.release_all();
    }
}
