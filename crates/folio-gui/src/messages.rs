use std::path::PathBuf;

use folio_core::attachment::{AttachmentDescriptor, AttachmentId, AttachmentMeta};
use folio_core::controller::{LoadOutcome, LoadRequest, OpenRequest};
use folio_core::download::DownloadOutcome;
use folio_core::error::Result;
use folio_core::loader::Fetched;
use image::RgbaImage;

/// Commands sent from UI thread to worker thread.
pub enum WorkerCommand {
    /// Fetch and decode the attachment a load ticket was issued for.
    Load(LoadRequest),

    /// Render sidebar thumbnails for a descriptor list.
    Thumbnails {
        session: u64,
        descriptors: Vec<AttachmentDescriptor>,
    },

    /// Fetch the active attachment for hand-off to the system opener.
    OpenExternal(OpenRequest),

    /// Save an attachment into `dest_dir`.
    Download {
        descriptor: AttachmentDescriptor,
        meta: AttachmentMeta,
        dest_dir: PathBuf,
    },
}

/// Results sent from worker thread back to UI thread.
pub enum WorkerResult {
    Loaded(LoadOutcome),

    Thumbnail {
        session: u64,
        id: AttachmentId,
        image: RgbaImage,
    },

    OpenFetched {
        request: OpenRequest,
        fetched: Result<Fetched>,
    },

    Downloaded {
        name: String,
        result: Result<DownloadOutcome>,
    },
}
