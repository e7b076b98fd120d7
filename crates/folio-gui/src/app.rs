use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use folio_core::attachment::{AttachmentDescriptor, AttachmentId};
use folio_core::config::ViewerConfig;
use folio_core::content::{ContentPreparer, PreparedContent};
use folio_core::controller::{
    LoadApplied, LoadRequest, OpenOutcome, ViewerController, ViewerSettings,
};
use folio_core::download::DownloadOutcome;
use folio_core::external::SystemOpener;
use folio_core::loader::ResourceLoader;
use folio_core::thumbnail::ThumbnailRenderer;
use tracing::{info, warn};

use crate::convert::rgba_to_color_image;
use crate::messages::{WorkerCommand, WorkerResult};
use crate::panels;
use crate::state::{ContentView, ViewState};
use crate::worker::{self, WorkerContext};

pub struct FolioApp {
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub result_rx: mpsc::Receiver<WorkerResult>,
    pub controller: ViewerController,
    pub view: ViewState,
    pub opener: SystemOpener,
    pub download_dir: PathBuf,
}

impl FolioApp {
    pub fn new(
        ctx: &egui::Context,
        config: ViewerConfig,
        attachments: Vec<AttachmentDescriptor>,
    ) -> anyhow::Result<Self> {
        let loader =
            ResourceLoader::from_config(&config.network).context("Failed to set up HTTP client")?;
        let context = WorkerContext {
            loader,
            preparer: ContentPreparer::from_config(&config),
            thumbnails: Arc::new(ThumbnailRenderer::from_config(&config.thumbnails)),
        };

        let (result_tx, result_rx) = mpsc::channel();
        let cmd_tx = worker::spawn_worker(context, result_tx, ctx.clone())
            .context("Failed to spawn worker thread")?;

        // Removal only drops the attachment from this session; there is no
        // record behind a local viewer to delete from.
        let controller = ViewerController::new(ViewerSettings::from_config(&config))
            .with_delete_handler(Box::new(|id: &AttachmentId| {
                info!("Removed attachment {id} from the session");
                Ok(())
            }));

        let mut app = Self {
            cmd_tx,
            result_rx,
            controller,
            view: ViewState::new(&config.thumbnails),
            opener: SystemOpener::default(),
            download_dir: dirs::download_dir().unwrap_or_else(std::env::temp_dir),
        };
        if !attachments.is_empty() {
            app.open_session(attachments);
        }
        Ok(app)
    }

    pub fn send_command(&self, cmd: WorkerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    fn dispatch(&mut self, request: Option<LoadRequest>) {
        if let Some(request) = request {
            self.view.content = None;
            self.send_command(WorkerCommand::Load(request));
        }
    }

    // ---------------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------------

    pub fn open_session(&mut self, attachments: Vec<AttachmentDescriptor>) {
        self.view.clear();
        self.send_command(WorkerCommand::Thumbnails {
            session: self.view.session,
            descriptors: attachments.clone(),
        });
        let request = self.controller.open(attachments, 0);
        self.dispatch(request);
    }

    pub fn open_files_dialog(&mut self) {
        let Some(paths) = rfd::FileDialog::new().set_title("Open attachments").pick_files() else {
            return;
        };
        let attachments = paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                AttachmentDescriptor::from_source((i + 1).to_string(), &path.to_string_lossy(), false)
            })
            .collect();
        self.open_session(attachments);
    }

    pub fn close(&mut self) {
        self.controller.close();
        self.view.clear();
    }

    pub fn prev(&mut self) {
        let request = self.controller.prev();
        self.dispatch(request);
    }

    pub fn next(&mut self) {
        let request = self.controller.next();
        self.dispatch(request);
    }

    pub fn select(&mut self, index: usize) {
        if let Err(e) = self.controller.select_index(index, Instant::now()) {
            self.view.status = Some(e.to_string());
        }
    }

    pub fn remove_current(&mut self) {
        match self.controller.delete_current() {
            Ok(id) => {
                let remaining: Vec<AttachmentDescriptor> = self
                    .controller
                    .attachments()
                    .iter()
                    .filter(|d| d.id != id)
                    .cloned()
                    .collect();
                self.view.thumbnails.remove(&id);
                self.view.content = None;
                let request = self.controller.replace_attachments(remaining);
                self.dispatch(request);
            }
            Err(e) => {
                warn!("Remove failed: {e}");
                self.view.status = Some(format!("Remove failed: {e}"));
            }
        }
    }

    pub fn open_external(&mut self) {
        if let Some(request) = self.controller.open_external_request() {
            self.send_command(WorkerCommand::OpenExternal(request));
        }
    }

    pub fn download_current(&mut self) {
        let (Some(descriptor), Some(meta)) =
            (self.controller.current_descriptor(), self.controller.current_meta())
        else {
            return;
        };
        let cmd = WorkerCommand::Download {
            descriptor: descriptor.clone(),
            meta: meta.clone(),
            dest_dir: self.download_dir.clone(),
        };
        self.send_command(cmd);
    }

    // ---------------------------------------------------------------------
    // Worker results
    // ---------------------------------------------------------------------

    /// Drain all pending results from the worker.
    fn poll_results(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                WorkerResult::Loaded(outcome) => match self.controller.complete_load(outcome) {
                    LoadApplied::Ready(content) => {
                        self.view.content = Some(content_view(ctx, content));
                    }
                    LoadApplied::Failed(_) => self.view.content = None,
                    LoadApplied::Discarded => {}
                },
                WorkerResult::Thumbnail { session, id, image } => {
                    if session != self.view.session {
                        continue;
                    }
                    let texture = ctx.load_texture(
                        format!("thumb-{id}"),
                        rgba_to_color_image(&image),
                        egui::TextureOptions::LINEAR,
                    );
                    self.view.thumbnails.insert(id, texture);
                }
                WorkerResult::OpenFetched { request, fetched } => {
                    let name = request.meta.resolved_display_name.clone();
                    let outcome = self.controller.complete_open_external(
                        &request,
                        fetched,
                        &self.opener,
                        Instant::now(),
                    );
                    self.view.status = Some(match outcome {
                        Ok(OpenOutcome::Presented) => format!("Opened {name}"),
                        Ok(OpenOutcome::Navigated(url)) => format!("Opened {url}"),
                        Err(e) => format!("Could not open {name}: {e}"),
                    });
                }
                WorkerResult::Downloaded { name, result } => {
                    self.view.status = Some(match result {
                        Ok(DownloadOutcome::Saved(path)) => {
                            format!("Saved {name} to {}", path.display())
                        }
                        Ok(DownloadOutcome::Navigate(url)) => {
                            ctx.open_url(egui::OpenUrl::new_tab(&url));
                            format!("Downloading {name} in the browser")
                        }
                        Err(e) => format!("Download of {name} failed: {e}"),
                    });
                }
            }
        }
    }

    /// Drive deferred work and schedule the next wake-up for it.
    fn tick(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let request = self.controller.tick(now);
        self.dispatch(request);
        if let Some(deadline) = self.controller.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}

fn content_view(ctx: &egui::Context, content: PreparedContent) -> ContentView {
    match content {
        PreparedContent::Image(image) | PreparedContent::Document(image) => {
            ContentView::Raster(ctx.load_texture(
                "viewport",
                rgba_to_color_image(&image),
                egui::TextureOptions::LINEAR,
            ))
        }
        PreparedContent::Text { truncated, .. } => ContentView::Text { truncated },
        PreparedContent::Media => ContentView::Media,
        PreparedContent::Passthrough(url) => ContentView::Passthrough(url),
        PreparedContent::DownloadOnly => ContentView::DownloadOnly,
    }
}

impl eframe::App for FolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results(ctx);
        self.tick(ctx);

        panels::shortcuts::handle(ctx, self);
        panels::sidebar::show(ctx, self);
        panels::viewport::show(ctx, self);
    }
}
