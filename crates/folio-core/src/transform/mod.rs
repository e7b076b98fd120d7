pub mod drag;
pub mod geometry;

pub use drag::{DragSession, PointerEvent};
pub use geometry::{Overlay, Rotation, Size, Vec2};

use crate::consts::{
    DEFAULT_PAN_PADDING, DEFAULT_ZOOM_PERCENT, DEFAULT_ZOOM_STEP, MAX_ZOOM_PERCENT,
    MIN_ZOOM_PERCENT,
};

/// Tunables for the transform engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformSettings {
    /// Zoom change per discrete step, in percent.
    pub zoom_step: f32,
    /// Slack added to the pan bound, in pixels.
    pub pan_padding: f32,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            zoom_step: DEFAULT_ZOOM_STEP,
            pan_padding: DEFAULT_PAN_PADDING,
        }
    }
}

/// Everything a renderer needs to place content in the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTransform {
    pub rotation: Rotation,
    /// Natural-pixel to screen-pixel factor.
    pub scale: f32,
    /// Bounding box of the rotated content on screen, if the content size is known.
    pub drawn_size: Option<Size>,
    /// Content center relative to the container's top-left corner.
    pub center: Vec2,
}

/// Rotation, zoom and pan of the active attachment, plus the measurements
/// they are bounded by. Every mutation re-derives the pan bound, so the
/// offset invariant holds after each call.
#[derive(Clone, Debug)]
pub struct TransformState {
    rotation: Rotation,
    zoom_percent: f32,
    pan_offset: Vec2,
    natural_size: Option<Size>,
    container_size: Size,
    overlay: Overlay,
    drag: DragSession,
    settings: TransformSettings,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new(TransformSettings::default())
    }
}

impl TransformState {
    pub fn new(settings: TransformSettings) -> Self {
        Self {
            rotation: Rotation::Deg0,
            zoom_percent: DEFAULT_ZOOM_PERCENT,
            pan_offset: Vec2::ZERO,
            natural_size: None,
            container_size: Size::default(),
            overlay: Overlay::default(),
            drag: DragSession::default(),
            settings,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn zoom_percent(&self) -> f32 {
        self.zoom_percent
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan_offset
    }

    pub fn natural_size(&self) -> Option<Size> {
        self.natural_size
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn settings(&self) -> TransformSettings {
        self.settings
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// Panning is only meaningful once content is zoomed past the fit size.
    pub fn pan_enabled(&self) -> bool {
        self.zoom_percent > DEFAULT_ZOOM_PERCENT
    }

    // ---------------------------------------------------------------------
    // Derived geometry
    // ---------------------------------------------------------------------

    pub fn displayed_size(&self) -> Option<Size> {
        self.natural_size
            .map(|natural| geometry::displayed_size(natural, self.rotation))
    }

    pub fn available_area(&self) -> Size {
        geometry::available_area(self.container_size, self.overlay)
    }

    pub fn base_scale(&self) -> f32 {
        geometry::fit_scale(self.displayed_size(), self.available_area())
    }

    pub fn effective_scale(&self) -> f32 {
        self.base_scale() * (self.zoom_percent / 100.0)
    }

    pub fn pan_bound(&self) -> Vec2 {
        geometry::pan_bound(
            self.displayed_size(),
            self.available_area(),
            self.effective_scale(),
            self.settings.pan_padding,
        )
    }

    pub fn render_transform(&self) -> RenderTransform {
        let available = self.available_area();
        let scale = self.effective_scale();
        let anchor = Vec2::new(available.w / 2.0, self.overlay.top + available.h / 2.0);
        RenderTransform {
            rotation: self.rotation,
            scale,
            drawn_size: self.displayed_size().map(|d| d.scaled(scale)),
            center: anchor + self.pan_offset,
        }
    }

    // ---------------------------------------------------------------------
    // Rotation
    // ---------------------------------------------------------------------

    pub fn rotate_clockwise(&mut self) {
        self.rotate_by(1);
    }

    pub fn rotate_counter_clockwise(&mut self) {
        self.rotate_by(-1);
    }

    /// Rotate by whole quarter turns. A change in rotation invalidates the
    /// bounding geometry, so the pan offset is dropped; zoom is kept.
    pub fn rotate_by(&mut self, quarter_turns: i32) {
        let next = self.rotation.rotated(quarter_turns);
        if next == self.rotation {
            return;
        }
        self.rotation = next;
        self.pan_offset = Vec2::ZERO;
        self.drag.end();
    }

    // ---------------------------------------------------------------------
    // Zoom
    // ---------------------------------------------------------------------

    /// Set an explicit zoom (slider). Out-of-range values are clamped;
    /// non-finite values are ignored.
    pub fn set_zoom(&mut self, percent: f32) {
        if !percent.is_finite() {
            return;
        }
        self.zoom_percent = percent.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT);
        if !self.pan_enabled() {
            self.drag.end();
        }
        self.reclamp();
    }

    pub fn zoom_by_steps(&mut self, steps: i32) {
        let target = self.zoom_percent + steps as f32 * self.settings.zoom_step;
        self.set_zoom(target);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by_steps(1);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by_steps(-1);
    }

    /// One wheel tick: positive delta zooms in, negative zooms out.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y > 0.0 {
            self.zoom_in();
        } else if delta_y < 0.0 {
            self.zoom_out();
        }
    }

    /// Back to fit size without touching rotation.
    pub fn reset_zoom(&mut self) {
        self.zoom_percent = DEFAULT_ZOOM_PERCENT;
        self.pan_offset = Vec2::ZERO;
        self.drag.end();
    }

    // ---------------------------------------------------------------------
    // Measurements
    // ---------------------------------------------------------------------

    /// Record the content's intrinsic size once it has loaded.
    pub fn set_natural_size(&mut self, size: Size) {
        self.natural_size = Some(size).filter(Size::is_measurable);
        self.reclamp();
    }

    pub fn set_container_size(&mut self, size: Size) {
        if size == self.container_size {
            return;
        }
        self.container_size = size;
        self.reclamp();
    }

    pub fn set_overlay(&mut self, overlay: Overlay) {
        if overlay == self.overlay {
            return;
        }
        self.overlay = overlay;
        self.reclamp();
    }

    // ---------------------------------------------------------------------
    // Pan
    // ---------------------------------------------------------------------

    /// Feed one pointer event. Returns true when the pan offset changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down(pointer) => {
                if self.pan_enabled() {
                    self.drag.begin(pointer, self.pan_offset);
                }
                false
            }
            PointerEvent::Move(pointer) => {
                let Some(candidate) = self.drag.candidate(pointer) else {
                    return false;
                };
                let next = geometry::clamp_offset(candidate, self.pan_bound());
                let changed = next != self.pan_offset;
                self.pan_offset = next;
                changed
            }
            PointerEvent::Up | PointerEvent::Leave | PointerEvent::Cancel => {
                self.drag.end();
                false
            }
        }
    }

    /// Attachment switch: forget everything tied to the previous content.
    /// Viewport measurements survive since the viewport itself did not change.
    pub fn reset(&mut self) {
        self.rotation = Rotation::Deg0;
        self.zoom_percent = DEFAULT_ZOOM_PERCENT;
        self.pan_offset = Vec2::ZERO;
        self.natural_size = None;
        self.drag.end();
    }

    fn reclamp(&mut self) {
        self.pan_offset = geometry::clamp_offset(self.pan_offset, self.pan_bound());
    }
}
