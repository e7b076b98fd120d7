use super::geometry::Vec2;

/// Platform-level pointer input relevant to panning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    Leave,
    Cancel,
}

/// An in-progress pan gesture. While active, the pointer is captured: move
/// events keep arriving even outside the viewport bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragSession {
    /// Pointer position minus the pan offset at drag start.
    origin: Option<Vec2>,
}

impl DragSession {
    pub fn begin(&mut self, pointer: Vec2, current_offset: Vec2) {
        self.origin = Some(pointer - current_offset);
    }

    /// Unclamped offset the pointer is asking for, if a drag is active.
    pub fn candidate(&self, pointer: Vec2) -> Option<Vec2> {
        self.origin.map(|origin| pointer - origin)
    }

    pub fn end(&mut self) {
        self.origin = None;
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }
}
