use std::ops::{Add, Sub};

use crate::consts::MIN_AVAILABLE_EXTENT;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    pub fn transposed(self) -> Self {
        Self::new(self.h, self.w)
    }

    /// Both extents finite and strictly positive.
    pub fn is_measurable(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.w * factor, self.h * factor)
    }
}

/// Heights of the chrome strips drawn over the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Overlay {
    pub top: f32,
    pub bottom: f32,
}

impl Overlay {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self {
            top: top.max(0.0),
            bottom: bottom.max(0.0),
        }
    }
}

/// Content rotation, always resting on a quarter turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalize any angle into `[0, 360)` and snap it to the nearest quarter turn.
    pub fn from_degrees(degrees: i32) -> Self {
        let quarters = (degrees as f32 / 90.0).round() as i32;
        Self::from_quarter_turns(quarters)
    }

    pub fn from_quarter_turns(quarter_turns: i32) -> Self {
        match quarter_turns.rem_euclid(4) {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    pub fn quarter_turns(self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Rotate clockwise by `quarter_turns` (negative is counter-clockwise).
    pub fn rotated(self, quarter_turns: i32) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + quarter_turns)
    }

    /// Whether the displayed bounding box swaps width and height.
    pub fn is_transposed(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

pub fn displayed_size(natural: Size, rotation: Rotation) -> Size {
    if rotation.is_transposed() {
        natural.transposed()
    } else {
        natural
    }
}

/// Viewport area left once the overlay strips are subtracted.
pub fn available_area(container: Size, overlay: Overlay) -> Size {
    Size::new(
        container.w.max(0.0),
        (container.h - overlay.top - overlay.bottom).max(MIN_AVAILABLE_EXTENT),
    )
}

/// Scale that fits `displayed` inside `available`; 1.0 when either is unknown.
pub fn fit_scale(displayed: Option<Size>, available: Size) -> f32 {
    let Some(displayed) = displayed.filter(Size::is_measurable) else {
        return 1.0;
    };
    let scale = (available.w / displayed.w).min(available.h / displayed.h);
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Maximum pan magnitude per axis for content drawn at `effective_scale`.
pub fn pan_bound(
    displayed: Option<Size>,
    available: Size,
    effective_scale: f32,
    padding: f32,
) -> Vec2 {
    let drawn = displayed
        .filter(Size::is_measurable)
        .map(|d| d.scaled(effective_scale))
        .unwrap_or_default();
    let excess_w = (drawn.w - available.w).max(0.0);
    let excess_h = (drawn.h - available.h).max(0.0);
    let padding = padding.max(0.0);
    Vec2::new((excess_w + padding) / 2.0, (excess_h + padding) / 2.0)
}

pub fn clamp_offset(offset: Vec2, bound: Vec2) -> Vec2 {
    Vec2::new(
        clamp_axis(offset.x, bound.x),
        clamp_axis(offset.y, bound.y),
    )
}

fn clamp_axis(value: f32, bound: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(-bound, bound)
}
