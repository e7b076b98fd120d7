use folio_core::transform::{Overlay, PointerEvent, Size, Vec2};

use crate::app::FolioApp;
use crate::panels::{toolbar, zoom_bar};
use crate::state::ContentView;

/// Texture corners in top-left, top-right, bottom-right, bottom-left order.
const CORNER_UVS: [egui::Pos2; 4] = [
    egui::pos2(0.0, 0.0),
    egui::pos2(1.0, 0.0),
    egui::pos2(1.0, 1.0),
    egui::pos2(0.0, 1.0),
];

pub fn show(ctx: &egui::Context, app: &mut FolioApp) {
    let rect = ctx.available_rect();

    if app.controller.is_open() {
        let top = toolbar::show(ctx, app, rect);
        let bottom = zoom_bar::show(ctx, app, rect);
        app.controller
            .transform_mut()
            .set_overlay(Overlay::new(top, bottom));
    }

    egui::CentralPanel::default()
        .frame(egui::Frame::new().fill(egui::Color32::from_gray(30)))
        .show(ctx, |ui| {
            let rect = ui.available_rect_before_wrap();
            if !app.controller.is_open() || app.controller.is_empty() {
                show_placeholder(ui, app);
                return;
            }
            app.controller
                .transform_mut()
                .set_container_size(Size::new(rect.width(), rect.height()));

            let overlay = app.controller.transform().overlay();
            let content_rect = egui::Rect::from_min_max(
                rect.min + egui::vec2(0.0, overlay.top),
                rect.max - egui::vec2(0.0, overlay.bottom),
            );

            if let Some(failure) = app.controller.state().error.clone() {
                let title = failure.kind.to_string();
                show_message(ui, content_rect, &title, Some(&failure.message));
                return;
            }

            let loading = app.controller.state().loading;
            match &app.view.content {
                Some(ContentView::Raster(texture)) => {
                    let texture_id = texture.id();
                    let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
                    handle_input(ui, &response, app, rect);
                    draw_content(ui, app, texture_id, rect, loading);
                }
                Some(ContentView::Text { truncated }) => {
                    let truncated = *truncated;
                    show_text(ui, app, content_rect, truncated);
                }
                Some(ContentView::Media) => {
                    let name = current_name(app);
                    let hint = "Plays in the default application";
                    if show_action(ui, content_rect, &name, hint, "Play") {
                        app.open_external();
                    }
                }
                Some(ContentView::Passthrough(url)) => {
                    let url = url.clone();
                    ui.scope_builder(egui::UiBuilder::new().max_rect(content_rect), |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(content_rect.height() / 3.0);
                            ui.label(format!("{} has no inline preview.", current_name(app)));
                            ui.hyperlink_to("View in browser", &url);
                        });
                    });
                }
                Some(ContentView::DownloadOnly) => {
                    let name = current_name(app);
                    if show_action(ui, content_rect, &name, "No inline preview", "Download") {
                        app.download_current();
                    }
                }
                None => {}
            }

            if loading {
                ui.put(
                    egui::Rect::from_center_size(content_rect.center(), egui::vec2(32.0, 32.0)),
                    egui::Spinner::new().size(32.0),
                );
            }
        });
}

fn current_name(app: &FolioApp) -> String {
    app.controller
        .current_meta()
        .map(|meta| meta.resolved_display_name.clone())
        .unwrap_or_default()
}

/// Feed wheel, drag and double-click input into the transform.
fn handle_input(ui: &egui::Ui, response: &egui::Response, app: &mut FolioApp, rect: egui::Rect) {
    let to_local = |p: egui::Pos2| Vec2::new(p.x - rect.min.x, p.y - rect.min.y);
    let transform = app.controller.transform_mut();

    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            transform.wheel(scroll);
        }
    }

    if response.double_clicked() {
        transform.reset_zoom();
    }

    if response.drag_started_by(egui::PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            transform.handle_pointer(PointerEvent::Down(to_local(pos)));
        }
    }
    if transform.is_dragging() {
        let focused = ui.input(|i| i.focused);
        let pointer = response.interact_pointer_pos().map(to_local);
        if let Some(event) = drag_event(focused, response.drag_stopped(), pointer) {
            transform.handle_pointer(event);
        }
    }

    if transform.is_dragging() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if transform.pan_enabled() && response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    }
}

/// Translate an active drag's frame input into a pointer event. The drag
/// stays captured while the pointer is outside the viewport; only release
/// or losing window focus ends it.
fn drag_event(focused: bool, stopped: bool, pointer: Option<Vec2>) -> Option<PointerEvent> {
    if !focused {
        Some(PointerEvent::Cancel)
    } else if stopped {
        Some(PointerEvent::Up)
    } else {
        pointer.map(PointerEvent::Move)
    }
}

/// Paint the texture as a quad whose UVs are rotated by quarter turns, so
/// the rotated bounding box is filled without resampling the image.
fn draw_content(
    ui: &egui::Ui,
    app: &FolioApp,
    texture_id: egui::TextureId,
    rect: egui::Rect,
    loading: bool,
) {
    let render = app.controller.transform().render_transform();
    let Some(drawn) = render.drawn_size else {
        return;
    };
    let center = rect.min + egui::vec2(render.center.x, render.center.y);
    let target = egui::Rect::from_center_size(center, egui::vec2(drawn.w, drawn.h));

    let turns = render.rotation.quarter_turns() as usize;
    let tint = if loading {
        egui::Color32::from_gray(120)
    } else {
        egui::Color32::WHITE
    };
    let corners = [
        target.left_top(),
        target.right_top(),
        target.right_bottom(),
        target.left_bottom(),
    ];

    let mut mesh = egui::Mesh::with_texture(texture_id);
    for (pos, uv) in corners.into_iter().zip(corner_uvs(turns)) {
        mesh.vertices.push(egui::epaint::Vertex {
            pos,
            uv,
            color: tint,
        });
    }
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    ui.painter_at(rect).add(egui::Shape::mesh(mesh));
}

/// UVs for the on-screen corners after `turns` clockwise quarter turns.
/// Turning clockwise moves the texture's top-left to the top-right corner.
fn corner_uvs(turns: usize) -> [egui::Pos2; 4] {
    std::array::from_fn(|i| CORNER_UVS[(i + 4 - turns % 4) % 4])
}

fn show_text(ui: &mut egui::Ui, app: &FolioApp, rect: egui::Rect, truncated: bool) {
    let Some(text) = app.controller.state().text_content.as_deref() else {
        return;
    };
    ui.scope_builder(egui::UiBuilder::new().max_rect(rect.shrink(12.0)), |ui| {
        egui::ScrollArea::both().auto_shrink(false).show(ui, |ui| {
            ui.add(egui::Label::new(egui::RichText::new(text).monospace()).extend());
            if truncated {
                ui.add_space(8.0);
                ui.weak("(truncated)");
            }
        });
    });
}

/// Centered name, hint and a single action button. Returns true when the
/// button was clicked.
fn show_action(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    name: &str,
    hint: &str,
    action: &str,
) -> bool {
    let mut clicked = false;
    ui.scope_builder(egui::UiBuilder::new().max_rect(rect), |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(rect.height() / 3.0);
            ui.heading(name);
            ui.weak(hint);
            ui.add_space(8.0);
            clicked = ui.button(action).clicked();
        });
    });
    clicked
}

fn show_message(ui: &mut egui::Ui, rect: egui::Rect, title: &str, detail: Option<&str>) {
    ui.scope_builder(egui::UiBuilder::new().max_rect(rect), |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(rect.height() / 3.0);
            ui.label(
                egui::RichText::new(title)
                    .size(18.0)
                    .color(egui::Color32::from_gray(160)),
            );
            if let Some(detail) = detail {
                ui.weak(detail);
            }
        });
    });
}

fn show_placeholder(ui: &mut egui::Ui, app: &mut FolioApp) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.label(
                egui::RichText::new("Open attachments to begin")
                    .size(18.0)
                    .color(egui::Color32::from_gray(100)),
            );
            ui.add_space(8.0);
            if ui.button("Open files…").clicked() {
                app.open_files_dialog();
            }
        });
    });
}
