pub mod shortcuts;
pub mod sidebar;
pub mod toolbar;
pub mod viewport;
pub mod zoom_bar;

/// Translucent backdrop shared by the overlays floating above the content.
pub(crate) fn overlay_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(egui::Color32::from_black_alpha(190))
        .inner_margin(egui::Margin::symmetric(10, 6))
}
