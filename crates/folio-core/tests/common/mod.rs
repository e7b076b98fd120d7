#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use folio_core::attachment::{AttachmentDescriptor, AttachmentSource, BinaryBlob, RemoteLocator};
use folio_core::content::ContentPreparer;
use folio_core::error::{FolioError, Result};
use folio_core::external::{ExternalSurface, ScratchFile};
use folio_core::loader::{Credential, CredentialProvider, FetchResponse, ResourceLoader, Transport};
use folio_core::raster::PageRasterizer;

/// Encode a solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

pub fn binary(id: &str, name: &str, bytes: Vec<u8>) -> AttachmentDescriptor {
    AttachmentDescriptor::new(
        id,
        AttachmentSource::Binary(BinaryBlob::new(bytes, Some(name.to_string()))),
    )
}

pub fn protected(id: &str, url: &str) -> AttachmentDescriptor {
    AttachmentDescriptor::new(id, AttachmentSource::Remote(RemoteLocator::protected(url)))
}

pub fn public(id: &str, url: &str) -> AttachmentDescriptor {
    AttachmentDescriptor::new(id, AttachmentSource::Remote(RemoteLocator::public(url)))
}

/// Three in-memory attachments: a PNG, a PDF and an MP4.
pub fn sample_list() -> Vec<AttachmentDescriptor> {
    vec![
        binary("1", "img1.png", png_bytes(40, 20)),
        binary("2", "doc.pdf", b"%PDF-1.7 fake".to_vec()),
        binary("3", "clip.mp4", vec![0, 0, 0, 24, b'f', b't', b'y', b'p']),
    ]
}

// ---------------------------------------------------------------------------
// Transport double
// ---------------------------------------------------------------------------

/// Replays queued responses in order, then repeats `fallback`. Records every
/// call with the credential it carried.
pub struct MockTransport {
    queue: Mutex<VecDeque<Result<FetchResponse>>>,
    fallback: FetchResponse,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl MockTransport {
    pub fn new(fallback: FetchResponse) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(body: &[u8], content_type: Option<&str>) -> Self {
        Self::new(FetchResponse::ok(body.to_vec(), content_type))
    }

    pub fn then(self, response: FetchResponse) -> Self {
        self.queue.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn then_err(self, error: FolioError) -> Self {
        self.queue.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn fetch(&self, url: &str, credential: Option<&Credential>) -> Result<FetchResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), credential.map(|c| c.secret().to_string())));
        match self.queue.lock().unwrap().pop_front() {
            Some(next) => next,
            None => Ok(self.fallback.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Credential double
// ---------------------------------------------------------------------------

pub struct CountingCredentials {
    current: Mutex<Option<Credential>>,
    refreshed: Option<Credential>,
    refresh_calls: AtomicUsize,
}

impl CountingCredentials {
    /// Refresh succeeds and yields `refreshed`.
    pub fn refreshing(initial: &str, refreshed: &str) -> Self {
        Self {
            current: Mutex::new(Some(Credential::new(initial))),
            refreshed: Some(Credential::new(refreshed)),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// Refresh always fails.
    pub fn failing(initial: &str) -> Self {
        Self {
            current: Mutex::new(Some(Credential::new(initial))),
            refreshed: None,
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

impl CredentialProvider for CountingCredentials {
    fn current(&self) -> Option<Credential> {
        self.current.lock().unwrap().clone()
    }

    fn refresh(&self) -> Result<Credential> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match &self.refreshed {
            Some(credential) => {
                *self.current.lock().unwrap() = Some(credential.clone());
                Ok(credential.clone())
            }
            None => Err(FolioError::Auth {
                locator: "refresh".into(),
            }),
        }
    }
}

/// Loader over shared doubles, so tests can inspect the counters afterwards.
pub fn loader_with(
    transport: Arc<MockTransport>,
    credentials: Arc<CountingCredentials>,
) -> ResourceLoader {
    ResourceLoader::new(transport, credentials)
}

/// Loader whose transport answers 200 with an empty body.
pub fn offline_loader() -> (ResourceLoader, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::ok(b"", None));
    let credentials = Arc::new(CountingCredentials::failing("t0"));
    (loader_with(transport.clone(), credentials), transport)
}

// ---------------------------------------------------------------------------
// Rasterizer and surface doubles
// ---------------------------------------------------------------------------

/// Produces a 30x50 page for anything that looks like a PDF.
pub struct FakeRasterizer {
    pub calls: AtomicUsize,
}

impl FakeRasterizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize_page(&self, document: &[u8], page: u32) -> Result<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(page, 1);
        if !document.starts_with(b"%PDF-") {
            return Err(FolioError::Decode("not a PDF".into()));
        }
        Ok(RgbaImage::from_pixel(30, 50, Rgba([0, 0, 0, 255])))
    }
}

pub fn preparer() -> ContentPreparer {
    ContentPreparer::new(Arc::new(FakeRasterizer::new()), 1024)
}

/// Records everything presented; optionally rejects presentations that
/// carry inline bytes.
#[derive(Default)]
pub struct RecordingSurface {
    pub presented: Mutex<Vec<(String, String, bool)>>,
    pub reject_inline: bool,
}

impl ExternalSurface for RecordingSurface {
    fn present(
        &self,
        name: &str,
        uri: &str,
        bytes: Option<&[u8]>,
    ) -> Result<Option<ScratchFile>> {
        if self.reject_inline && bytes.is_some() {
            return Err(FolioError::Io(std::io::Error::other("no opener")));
        }
        self.presented
            .lock()
            .unwrap()
            .push((name.to_string(), uri.to_string(), bytes.is_some()));
        Ok(None)
    }
}

/// Writes inline bytes to real scratch files under `root` and remembers
/// where each one went.
pub struct ScratchSurface {
    pub root: tempfile::TempDir,
    pub written: Mutex<Vec<PathBuf>>,
}

impl ScratchSurface {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn last_written(&self) -> PathBuf {
        self.written.lock().unwrap().last().cloned().expect("a scratch file")
    }
}

impl ExternalSurface for ScratchSurface {
    fn present(
        &self,
        name: &str,
        _uri: &str,
        bytes: Option<&[u8]>,
    ) -> Result<Option<ScratchFile>> {
        let Some(bytes) = bytes else {
            return Ok(None);
        };
        let scratch = ScratchFile::write(self.root.path(), name, bytes)?;
        self.written.lock().unwrap().push(scratch.path().to_path_buf());
        Ok(Some(scratch))
    }
}
