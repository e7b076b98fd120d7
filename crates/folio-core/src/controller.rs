//! Session state for one viewer: the attachment sequence, the active
//! attachment's load state, its transform, and every handle it owns.
//!
//! The controller never blocks. Loading is split into a [`LoadRequest`] the
//! host executes wherever it likes (a worker thread, or inline in tests) and
//! a [`LoadOutcome`] fed back through [`ViewerController::complete_load`].

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::attachment::{
    format_size, AttachmentDescriptor, AttachmentId, AttachmentMeta, AttachmentSource, Category,
    MetadataField,
};
use crate::classify::{classify_with, sniff_mime};
use crate::config::ViewerConfig;
use crate::content::{ContentPreparer, PreparedContent};
use crate::error::{ErrorKind, FolioError, Result};
use crate::external::{ExternalSurface, ScratchFile};
use crate::loader::{Fetched, Handle, HandleRegistry, ResourceLoader};
use crate::transform::{TransformSettings, TransformState};

/// Callback that deletes an attachment on the caller's side.
pub type DeleteHandler = Box<dyn FnMut(&AttachmentId) -> Result<()> + Send>;

#[derive(Clone, Debug)]
pub struct ViewerSettings {
    pub transform: TransformSettings,
    pub selection_transition: Duration,
    pub open_external_grace: Duration,
    pub base_url: Option<String>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl ViewerSettings {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            transform: config.viewer.transform_settings(),
            selection_transition: config.viewer.selection_transition(),
            open_external_grace: config.viewer.open_external_grace(),
            base_url: config.network.base_url.clone(),
        }
    }
}

/// Identifies the load that a request belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub index: usize,
    pub id: AttachmentId,
    pub generation: u64,
}

/// Work the host must run to load the active attachment.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub descriptor: AttachmentDescriptor,
}

impl LoadRequest {
    /// Fetch, classify against the detected type, and prepare the content.
    /// Safe to run on any thread.
    pub fn execute(self, loader: &ResourceLoader, preparer: &ContentPreparer) -> LoadOutcome {
        let result = load(loader, preparer, &self.descriptor);
        LoadOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

fn load(
    loader: &ResourceLoader,
    preparer: &ContentPreparer,
    descriptor: &AttachmentDescriptor,
) -> Result<Loaded> {
    let fetched = loader.fetch(descriptor)?;
    let mut detected_mime = fetched.content_type().map(str::to_string);
    let mut meta = classify_with(descriptor, detected_mime.as_deref(), loader.base_url());

    // Local files carry no content-type; sniff them when the name says nothing.
    if meta.category == Category::Generic && detected_mime.is_none() {
        if let Fetched::Local(_) = fetched {
            let bytes = loader.read_bytes(&fetched)?;
            detected_mime = sniff_mime(&bytes).map(str::to_string);
            meta = classify_with(descriptor, detected_mime.as_deref(), loader.base_url());
        }
    }

    let content = preparer.prepare(loader, &meta, &fetched)?;
    Ok(Loaded {
        fetched,
        detected_mime,
        content,
    })
}

/// Result of a successful load, not yet owned by the controller.
#[derive(Debug)]
pub struct Loaded {
    pub fetched: Fetched,
    pub detected_mime: Option<String>,
    pub content: PreparedContent,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub result: Result<Loaded>,
}

/// Per-attachment failure shown in place of the content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl LoadFailure {
    fn from_error(error: &FolioError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// What `complete_load` did with an outcome.
#[derive(Debug)]
pub enum LoadApplied {
    Ready(PreparedContent),
    Failed(LoadFailure),
    /// The outcome belonged to a load that is no longer current.
    Discarded,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewerState {
    pub current_index: usize,
    pub loading: bool,
    pub error: Option<LoadFailure>,
    pub text_content: Option<String>,
}

/// Explicit-index selection result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Unchanged,
    /// The swap happens on the first `tick` after the transition window.
    Pending,
}

#[derive(Clone, Copy, Debug)]
struct PendingSelection {
    index: usize,
    due: Instant,
}

#[derive(Debug)]
struct DeferredRelease {
    handle: Handle,
    /// On-disk copy handed to the outside program, deleted on drop.
    scratch: Option<ScratchFile>,
    due: Instant,
}

/// Work the host must run to open the active attachment externally.
#[derive(Clone, Debug)]
pub struct OpenRequest {
    pub descriptor: AttachmentDescriptor,
    pub meta: AttachmentMeta,
}

impl OpenRequest {
    pub fn execute(&self, loader: &ResourceLoader) -> Result<Fetched> {
        loader.fetch(&self.descriptor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    Presented,
    /// The fetch or hand-off failed; the surface was pointed at the locator.
    Navigated(String),
}

pub struct ViewerController {
    settings: ViewerSettings,
    open: bool,
    attachments: Vec<AttachmentDescriptor>,
    metas: Vec<AttachmentMeta>,
    state: ViewerState,
    transform: TransformState,
    registry: HandleRegistry,
    active_handle: Option<Handle>,
    generation: u64,
    in_flight: bool,
    pending: Option<PendingSelection>,
    deferred: Vec<DeferredRelease>,
    on_delete: Option<DeleteHandler>,
}

impl Default for ViewerController {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}

impl ViewerController {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            transform: TransformState::new(settings.transform),
            settings,
            open: false,
            attachments: Vec::new(),
            metas: Vec::new(),
            state: ViewerState::default(),
            registry: HandleRegistry::new(),
            active_handle: None,
            generation: 0,
            in_flight: false,
            pending: None,
            deferred: Vec::new(),
            on_delete: None,
        }
    }

    pub fn with_delete_handler(mut self, handler: DeleteHandler) -> Self {
        self.on_delete = Some(handler);
        self
    }

    pub fn set_delete_handler(&mut self, handler: Option<DeleteHandler>) {
        self.on_delete = handler;
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    /// Gestures (rotate, zoom, drag) and viewport measurements go through here.
    pub fn transform_mut(&mut self) -> &mut TransformState {
        &mut self.transform
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    pub fn attachments(&self) -> &[AttachmentDescriptor] {
        &self.attachments
    }

    pub fn metas(&self) -> &[AttachmentMeta] {
        &self.metas
    }

    pub fn current_descriptor(&self) -> Option<&AttachmentDescriptor> {
        self.attachments.get(self.state.current_index)
    }

    pub fn current_meta(&self) -> Option<&AttachmentMeta> {
        self.metas.get(self.state.current_index)
    }

    pub fn active_handle(&self) -> Option<&Handle> {
        self.active_handle.as_ref()
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    pub fn has_delete_handler(&self) -> bool {
        self.on_delete.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.open && self.state.current_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.open && self.state.current_index + 1 < self.attachments.len()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Start a session over `attachments`. An out-of-range initial index is
    /// clamped to the last attachment.
    pub fn open(
        &mut self,
        attachments: Vec<AttachmentDescriptor>,
        initial_index: usize,
    ) -> Option<LoadRequest> {
        if self.open {
            self.close();
        }
        self.open = true;
        self.attachments = attachments;
        self.recompute_metas();
        info!("Opened viewer with {} attachment(s)", self.attachments.len());

        if self.attachments.is_empty() {
            return None;
        }
        let index = initial_index.min(self.attachments.len() - 1);
        Some(self.enter_index(index))
    }

    /// End the session. The active handle is released now; open-external
    /// handles still inside their grace window are released by `tick` or
    /// when the controller is dropped.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.release_active();
        self.generation += 1;
        self.open = false;
        self.attachments.clear();
        self.metas.clear();
        self.pending = None;
        self.in_flight = false;
        self.state = ViewerState::default();
        self.transform.reset();
        info!("Closed viewer");
    }

    /// Swap in a new descriptor list, e.g. after a delegated deletion.
    pub fn replace_attachments(
        &mut self,
        attachments: Vec<AttachmentDescriptor>,
    ) -> Option<LoadRequest> {
        if !self.open {
            return self.open(attachments, 0);
        }
        self.attachments = attachments;
        self.recompute_metas();
        self.pending = None;

        if self.attachments.is_empty() {
            self.release_active();
            self.generation += 1;
            self.in_flight = false;
            self.state = ViewerState::default();
            self.transform.reset();
            return None;
        }
        let index = self.state.current_index.min(self.attachments.len() - 1);
        Some(self.enter_index(index))
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// No-op at the first attachment.
    pub fn prev(&mut self) -> Option<LoadRequest> {
        if !self.has_prev() {
            return None;
        }
        let index = self.state.current_index - 1;
        Some(self.enter_index(index))
    }

    /// No-op at the last attachment.
    pub fn next(&mut self) -> Option<LoadRequest> {
        if !self.has_next() {
            return None;
        }
        let index = self.state.current_index + 1;
        Some(self.enter_index(index))
    }

    /// Select an explicit index. The current content stays up under a
    /// synthetic loading state until the transition window has passed.
    pub fn select_index(&mut self, index: usize, now: Instant) -> Result<Selection> {
        if index >= self.attachments.len() {
            return Err(FolioError::IndexOutOfRange {
                index,
                total: self.attachments.len(),
            });
        }
        if index == self.state.current_index {
            self.pending = None;
            self.sync_loading();
            return Ok(Selection::Unchanged);
        }
        self.pending = Some(PendingSelection {
            index,
            due: now + self.settings.selection_transition,
        });
        self.sync_loading();
        Ok(Selection::Pending)
    }

    /// Commit a pending selection immediately, ignoring its window.
    pub fn commit_selection(&mut self) -> Option<LoadRequest> {
        let pending = self.pending.take()?;
        Some(self.enter_index(pending.index))
    }

    /// Advance time: commit a due selection and release expired handles,
    /// deleting any scratch copy made for them.
    pub fn tick(&mut self, now: Instant) -> Option<LoadRequest> {
        let registry = &mut self.registry;
        self.deferred.retain(|deferred| {
            if deferred.due <= now {
                registry.release(&deferred.handle);
                if let Some(scratch) = &deferred.scratch {
                    debug!("Removing scratch copy {}", scratch.path().display());
                }
                false
            } else {
                true
            }
        });

        match self.pending {
            Some(pending) if pending.due <= now => self.commit_selection(),
            _ => None,
        }
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred
            .iter()
            .map(|d| d.due)
            .chain(self.pending.map(|p| p.due))
            .min()
    }

    fn enter_index(&mut self, index: usize) -> LoadRequest {
        self.release_active();
        self.generation += 1;
        self.pending = None;
        self.in_flight = true;
        self.state = ViewerState {
            current_index: index,
            loading: true,
            error: None,
            text_content: None,
        };
        self.transform.reset();

        let descriptor = self.attachments[index].clone();
        debug!(
            "Loading attachment {} ({}), generation {}",
            index, descriptor.id, self.generation
        );
        LoadRequest {
            ticket: LoadTicket {
                index,
                id: descriptor.id.clone(),
                generation: self.generation,
            },
            descriptor,
        }
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Apply a finished load. Outcomes for anything but the current load, or
    /// a second outcome for a load already applied, are dropped without
    /// allocating a handle.
    pub fn complete_load(&mut self, outcome: LoadOutcome) -> LoadApplied {
        let LoadOutcome { ticket, result } = outcome;
        if !self.open || ticket.generation != self.generation {
            warn!(
                "Discarding stale load for {} (generation {}, current {})",
                ticket.id, ticket.generation, self.generation
            );
            return LoadApplied::Discarded;
        }
        if !self.in_flight {
            warn!("Discarding duplicate load for {}", ticket.id);
            return LoadApplied::Discarded;
        }
        self.in_flight = false;

        match result {
            Ok(loaded) => {
                self.refine_meta(ticket.index, loaded.detected_mime.as_deref());
                let handle = self.registry.materialize(loaded.fetched);
                if handle.is_revocable() {
                    if let Some(meta) = self.metas.get_mut(ticket.index) {
                        meta.resolved_url = Some(handle.uri());
                    }
                }
                self.active_handle = Some(handle);

                if let Some(size) = loaded.content.natural_size() {
                    self.transform.set_natural_size(size);
                }
                self.state.text_content = loaded.content.text().map(str::to_string);
                self.state.error = None;
                self.sync_loading();
                info!("Attachment {} ready", ticket.id);
                LoadApplied::Ready(loaded.content)
            }
            Err(error) => {
                match error.kind() {
                    ErrorKind::Auth => warn!("Authorization failed for {}: {error}", ticket.id),
                    ErrorKind::Network => warn!("Network failure for {}: {error}", ticket.id),
                    ErrorKind::Decode => warn!("Decode failure for {}: {error}", ticket.id),
                    _ => warn!("Load of {} failed: {error}", ticket.id),
                }
                let failure = LoadFailure::from_error(&error);
                self.state.error = Some(failure.clone());
                self.state.text_content = None;
                self.sync_loading();
                LoadApplied::Failed(failure)
            }
        }
    }

    fn refine_meta(&mut self, index: usize, detected_mime: Option<&str>) {
        let Some(descriptor) = self.attachments.get(index) else {
            return;
        };
        if descriptor.declared_mime_type.is_some() || detected_mime.is_none() {
            return;
        }
        let refined = classify_with(descriptor, detected_mime, self.settings.base_url.as_deref());
        if let Some(meta) = self.metas.get_mut(index) {
            if meta.category != refined.category {
                debug!(
                    "Reclassified {} from {:?} to {:?}",
                    descriptor.id, meta.category, refined.category
                );
            }
            *meta = refined;
        }
    }

    fn recompute_metas(&mut self) {
        let base_url = self.settings.base_url.as_deref();
        self.metas = self
            .attachments
            .iter()
            .map(|d| classify_with(d, None, base_url))
            .collect();
    }

    fn sync_loading(&mut self) {
        self.state.loading = self.in_flight || self.pending.is_some();
    }

    fn release_active(&mut self) {
        if let Some(handle) = self.active_handle.take() {
            self.registry.release(&handle);
        }
    }

    /// Bytes behind the active handle, when the controller holds them.
    pub fn active_bytes(&self) -> Option<std::sync::Arc<[u8]>> {
        self.active_handle
            .as_ref()
            .and_then(|h| self.registry.dereference(h))
    }

    // ---------------------------------------------------------------------
    // Details
    // ---------------------------------------------------------------------

    /// Detail rows for the active attachment. Rows whose value is not known
    /// yet (dimensions before load, size of a remote file) are left out.
    pub fn metadata_rows(&self) -> Vec<(&'static str, String)> {
        let (Some(meta), Some(descriptor)) = (self.current_meta(), self.current_descriptor())
        else {
            return Vec::new();
        };

        meta.category
            .metadata_fields()
            .iter()
            .filter_map(|field| {
                let value = match field {
                    MetadataField::Name => Some(meta.resolved_display_name.clone()),
                    MetadataField::Type => Some(meta.type_label()),
                    MetadataField::Size => descriptor
                        .size_bytes
                        .or_else(|| self.active_bytes().map(|b| b.len() as u64))
                        .map(format_size),
                    MetadataField::Dimensions => self
                        .transform
                        .natural_size()
                        .map(|s| format!("{} × {}", s.w.round(), s.h.round())),
                    MetadataField::Lines => self
                        .state
                        .text_content
                        .as_deref()
                        .map(|t| t.lines().count().to_string()),
                }?;
                Some((field.label(), value))
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Delete / open externally
    // ---------------------------------------------------------------------

    /// Hand the active attachment to the caller's delete callback. The
    /// caller follows up with `replace_attachments`.
    pub fn delete_current(&mut self) -> Result<AttachmentId> {
        let id = self
            .current_descriptor()
            .map(|d| d.id.clone())
            .ok_or(FolioError::IndexOutOfRange {
                index: self.state.current_index,
                total: self.attachments.len(),
            })?;
        let handler = self.on_delete.as_mut().ok_or(FolioError::NoDeleteHandler)?;
        handler(&id)?;
        info!("Deleted attachment {id}");
        Ok(id)
    }

    pub fn open_external_request(&self) -> Option<OpenRequest> {
        Some(OpenRequest {
            descriptor: self.current_descriptor()?.clone(),
            meta: self.current_meta()?.clone(),
        })
    }

    /// Present a fetched attachment on an external surface. Inline bytes get
    /// a temporary handle that is released once the grace delay passes, along
    /// with whatever scratch file the surface wrote for them.
    /// Any failure falls back to pointing the surface at the locator.
    pub fn complete_open_external(
        &mut self,
        request: &OpenRequest,
        fetched: Result<Fetched>,
        surface: &dyn ExternalSurface,
        now: Instant,
    ) -> Result<OpenOutcome> {
        let name = request.meta.resolved_display_name.as_str();
        let presented = match fetched {
            Ok(Fetched::Inline {
                bytes,
                content_type,
            }) => {
                let handle = self.registry.allocate(bytes.clone(), content_type);
                match surface.present(name, &handle.uri(), Some(&bytes[..])) {
                    Ok(scratch) => {
                        self.deferred.push(DeferredRelease {
                            handle,
                            scratch,
                            due: now + self.settings.open_external_grace,
                        });
                        Ok(())
                    }
                    Err(e) => {
                        self.registry.release(&handle);
                        Err(e)
                    }
                }
            }
            Ok(Fetched::Remote(url)) => surface.present(name, &url, None).map(|_| ()),
            Ok(Fetched::Local(path)) => surface
                .present(name, &path.to_string_lossy(), None)
                .map(|_| ()),
            Err(e) => Err(e),
        };

        match presented {
            Ok(()) => Ok(OpenOutcome::Presented),
            Err(e) => {
                let Some(url) = self.fallback_locator(&request.descriptor) else {
                    return Err(e);
                };
                warn!("Open of {name} failed ({e}), navigating to {url}");
                surface.present(name, &url, None)?;
                Ok(OpenOutcome::Navigated(url))
            }
        }
    }

    /// Where to point an external surface when the content itself could not
    /// be handed over. In-memory sources have nowhere to go.
    fn fallback_locator(&self, descriptor: &AttachmentDescriptor) -> Option<String> {
        match &descriptor.source {
            AttachmentSource::Remote(locator) => {
                Some(locator.resolve(self.settings.base_url.as_deref()))
            }
            AttachmentSource::Local(path) => Some(path.to_string_lossy().into_owned()),
            AttachmentSource::Binary(_) => None,
        }
    }

    /// Number of open-external handles still inside their grace window.
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }
}

impl Drop for ViewerController {
    fn drop(&mut self) {
        self.release_active();
        for deferred in self.deferred.drain(..) {
            self.registry.release(&deferred.handle);
        }
        self.registry.release_all();
    }
}
