use egui::Key;

use crate::app::FolioApp;

pub fn handle(ctx: &egui::Context, app: &mut FolioApp) {
    if ctx.wants_keyboard_input() {
        return;
    }
    if ctx.input(|i| i.modifiers.command && i.key_pressed(Key::O)) {
        app.open_files_dialog();
        return;
    }
    if !app.controller.is_open() {
        return;
    }

    let (left, right, zoom_in, zoom_out, rotate, reset, escape, shift) = ctx.input(|i| {
        (
            i.key_pressed(Key::ArrowLeft),
            i.key_pressed(Key::ArrowRight),
            i.key_pressed(Key::Plus) || i.key_pressed(Key::Equals),
            i.key_pressed(Key::Minus),
            i.key_pressed(Key::R),
            i.key_pressed(Key::Num0),
            i.key_pressed(Key::Escape),
            i.modifiers.shift,
        )
    });

    if escape {
        app.close();
        return;
    }
    if left {
        app.prev();
    }
    if right {
        app.next();
    }

    let transformable = app
        .controller
        .current_meta()
        .is_some_and(|meta| meta.category.is_transformable());
    if !transformable {
        return;
    }
    let transform = app.controller.transform_mut();
    if zoom_in {
        transform.zoom_in();
    }
    if zoom_out {
        transform.zoom_out();
    }
    if rotate {
        if shift {
            transform.rotate_counter_clockwise();
        } else {
            transform.rotate_clockwise();
        }
    }
    if reset {
        transform.reset_zoom();
    }
}
