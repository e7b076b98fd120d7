use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;

use folio_core::attachment::{AttachmentDescriptor, AttachmentMeta};
use folio_core::content::ContentPreparer;
use folio_core::controller::{LoadRequest, OpenRequest};
use folio_core::download::download;
use folio_core::loader::ResourceLoader;
use folio_core::thumbnail::{Thumbnail, ThumbnailRenderer};
use rayon::prelude::*;
use tracing::debug;

use crate::messages::{WorkerCommand, WorkerResult};

/// Everything the worker needs to turn descriptors into content.
pub struct WorkerContext {
    pub loader: ResourceLoader,
    pub preparer: ContentPreparer,
    pub thumbnails: Arc<ThumbnailRenderer>,
}

/// Spawn the worker thread. Returns the command sender.
pub fn spawn_worker(
    context: WorkerContext,
    result_tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) -> std::io::Result<mpsc::Sender<WorkerCommand>> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();

    std::thread::Builder::new()
        .name("folio-worker".into())
        .spawn(move || {
            worker_loop(context, cmd_rx, result_tx, ctx);
        })?;

    Ok(cmd_tx)
}

fn send(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, result: WorkerResult) {
    let _ = tx.send(result);
    ctx.request_repaint();
}

fn worker_loop(
    context: WorkerContext,
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            WorkerCommand::Load(request) => {
                handle_load(request, &context, &tx, &ctx);
            }
            WorkerCommand::Thumbnails {
                session,
                descriptors,
            } => {
                handle_thumbnails(session, descriptors, &context, &tx, &ctx);
            }
            WorkerCommand::OpenExternal(request) => {
                handle_open_external(request, &context, &tx, &ctx);
            }
            WorkerCommand::Download {
                descriptor,
                meta,
                dest_dir,
            } => {
                handle_download(&descriptor, &meta, &dest_dir, &context, &tx, &ctx);
            }
        }
    }
}

fn handle_load(
    request: LoadRequest,
    context: &WorkerContext,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    debug!("Loading attachment {}", request.descriptor.id);
    let outcome = request.execute(&context.loader, &context.preparer);
    send(tx, ctx, WorkerResult::Loaded(outcome));
}

/// Thumbnails render off the worker thread so a long list never holds up
/// the main view. Each one is sent as soon as it is ready.
fn handle_thumbnails(
    session: u64,
    descriptors: Vec<AttachmentDescriptor>,
    context: &WorkerContext,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let loader = context.loader.clone();
    let renderer = Arc::clone(&context.thumbnails);
    let tx = tx.clone();
    let ctx = ctx.clone();

    rayon::spawn(move || {
        descriptors
            .par_iter()
            .for_each_with(tx, |tx, descriptor| {
                let image = match renderer.render_attachment(&loader, descriptor) {
                    Thumbnail::Preview(image) => image,
                    Thumbnail::Glyph(category) => renderer.glyph_surface(category),
                };
                send(
                    tx,
                    &ctx,
                    WorkerResult::Thumbnail {
                        session,
                        id: descriptor.id.clone(),
                        image,
                    },
                );
            });
    });
}

fn handle_open_external(
    request: OpenRequest,
    context: &WorkerContext,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let fetched = request.execute(&context.loader);
    send(tx, ctx, WorkerResult::OpenFetched { request, fetched });
}

fn handle_download(
    descriptor: &AttachmentDescriptor,
    meta: &AttachmentMeta,
    dest_dir: &Path,
    context: &WorkerContext,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let result = download(&context.loader, descriptor, meta, dest_dir);
    send(
        tx,
        ctx,
        WorkerResult::Downloaded {
            name: meta.resolved_display_name.clone(),
            result,
        },
    );
}
