use folio_core::consts::{MAX_ZOOM_PERCENT, MIN_ZOOM_PERCENT};

use crate::app::FolioApp;
use crate::panels::overlay_frame;

/// Bottom overlay with the zoom controls. Only shown for content that can
/// be zoomed; returns the height it occupies.
pub fn show(ctx: &egui::Context, app: &mut FolioApp, rect: egui::Rect) -> f32 {
    let transformable = app
        .controller
        .current_meta()
        .is_some_and(|meta| meta.category.is_transformable());
    if !transformable {
        return 0.0;
    }

    let response = egui::Area::new(egui::Id::new("folio-zoom-bar"))
        .pivot(egui::Align2::CENTER_BOTTOM)
        .fixed_pos(rect.center_bottom())
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            overlay_frame().corner_radius(egui::CornerRadius::same(6)).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let transform = app.controller.transform_mut();
                    if ui.button("−").on_hover_text("Zoom out (-)").clicked() {
                        transform.zoom_out();
                    }
                    let mut zoom = transform.zoom_percent();
                    let slider = egui::Slider::new(&mut zoom, MIN_ZOOM_PERCENT..=MAX_ZOOM_PERCENT)
                        .show_value(false);
                    if ui.add(slider).changed() {
                        transform.set_zoom(zoom);
                    }
                    if ui.button("+").on_hover_text("Zoom in (+)").clicked() {
                        transform.zoom_in();
                    }
                    ui.monospace(format!("{:>3.0}%", transform.zoom_percent()));
                    if ui.button("Fit").on_hover_text("Reset zoom (0)").clicked() {
                        transform.reset_zoom();
                    }
                    ui.weak(transform.rotation().to_string());
                });
            });
        });

    // The bar floats centered; reserve its height plus the gap below it.
    rect.bottom() - response.response.rect.top()
}
