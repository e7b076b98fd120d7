use crate::app::FolioApp;
use crate::panels::overlay_frame;

/// Top overlay: name, position, navigation and attachment actions.
/// Returns the height it occupies over the viewport.
pub fn show(ctx: &egui::Context, app: &mut FolioApp, rect: egui::Rect) -> f32 {
    let Some(meta) = app.controller.current_meta().cloned() else {
        return 0.0;
    };
    let index = app.controller.state().current_index;
    let total = app.controller.len();
    let transformable = meta.category.is_transformable();

    let response = egui::Area::new(egui::Id::new("folio-toolbar"))
        .fixed_pos(rect.left_top())
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            ui.set_width(rect.width());
            overlay_frame().show(ui, |ui| {
                ui.set_width(rect.width() - 20.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(app.controller.has_prev(), egui::Button::new("◀"))
                        .on_hover_text("Previous (←)")
                        .clicked()
                    {
                        app.prev();
                    }
                    ui.label(format!("{} / {}", index + 1, total));
                    if ui
                        .add_enabled(app.controller.has_next(), egui::Button::new("▶"))
                        .on_hover_text("Next (→)")
                        .clicked()
                    {
                        app.next();
                    }
                    ui.separator();
                    ui.add(
                        egui::Label::new(egui::RichText::new(&meta.resolved_display_name).strong())
                            .truncate(),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("✕").on_hover_text("Close (Esc)").clicked() {
                            app.close();
                            return;
                        }
                        let can_remove = app.controller.has_delete_handler();
                        if ui.add_enabled(can_remove, egui::Button::new("Remove")).clicked() {
                            app.remove_current();
                        }
                        if ui
                            .button("Open")
                            .on_hover_text("Open in the default application")
                            .clicked()
                        {
                            app.open_external();
                        }
                        if ui.button("Download").clicked() {
                            app.download_current();
                        }
                        ui.toggle_value(&mut app.view.show_details, "Details");
                        if transformable {
                            ui.separator();
                            let transform = app.controller.transform_mut();
                            if ui.button("⟳").on_hover_text("Rotate clockwise (R)").clicked() {
                                transform.rotate_clockwise();
                            }
                            if ui
                                .button("⟲")
                                .on_hover_text("Rotate counter-clockwise (Shift+R)")
                                .clicked()
                            {
                                transform.rotate_counter_clockwise();
                            }
                        }
                    });
                });

                if app.view.show_details {
                    ui.add_space(4.0);
                    egui::Grid::new("details").num_columns(2).spacing([16.0, 2.0]).show(ui, |ui| {
                        for (label, value) in app.controller.metadata_rows() {
                            ui.weak(label);
                            ui.label(value);
                            ui.end_row();
                        }
                    });
                }
                if let Some(status) = &app.view.status {
                    ui.small(status);
                }
            });
        });

    response.response.rect.height()
}
