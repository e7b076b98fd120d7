use crate::app::FolioApp;

pub fn show(ctx: &egui::Context, app: &mut FolioApp) {
    if !app.controller.is_open() || app.controller.len() < 2 {
        return;
    }
    let thumb = app.view.thumbnail_size;
    let current = app.controller.state().current_index;
    let mut clicked = None;

    egui::SidePanel::left("thumbnails")
        .resizable(false)
        .exact_width(thumb.x + 28.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(6.0);
                for (index, meta) in app.controller.metas().iter().enumerate() {
                    ui.vertical_centered(|ui| {
                        let response = match app.view.thumbnails.get(&meta.id) {
                            Some(texture) => ui.add(
                                egui::Button::image(
                                    egui::Image::new(texture).fit_to_exact_size(thumb),
                                )
                                .selected(index == current),
                            ),
                            None => ui.add_sized(thumb, egui::Spinner::new()),
                        };
                        if response
                            .on_hover_text(&meta.resolved_display_name)
                            .clicked()
                        {
                            clicked = Some(index);
                        }
                        ui.add(
                            egui::Label::new(egui::RichText::new(&meta.resolved_display_name).small())
                                .truncate(),
                        );
                    });
                    ui.add_space(4.0);
                }
            });
        });

    if let Some(index) = clicked {
        app.select(index);
    }
}
