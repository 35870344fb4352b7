//! Rectangles, the eight resize handles, and zoom-aware hit testing.
//!
//! All rectangles are kept in source-image pixel coordinates. Screen
//! coordinates only appear at the hit-test and render boundary, where a
//! position is divided (or multiplied) by the zoom scale.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Sub};

// ── Vectors & Rectangles ────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// Axis-aligned rectangle stored as position + size. Serialized as
/// `{x, y, w, h}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Square of edge `size` centered on `center`.
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = size * 0.5;
        Self::new(center.x - half, center.y - half, size, size)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Left/top edges are inclusive, right/bottom exclusive.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.y >= self.y && point.x < self.right() && point.y < self.bottom()
    }

    pub fn has_area(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Same position, with a negative width or height clamped to zero.
    pub fn with_non_negative_size(&self) -> Self {
        Self::new(self.x, self.y, self.w.max(0.0), self.h.max(0.0))
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }

    /// Position and size both multiplied by `scale`.
    pub fn scaled(&self, scale: f32) -> Self {
        Self::new(self.x * scale, self.y * scale, self.w * scale, self.h * scale)
    }
}

// ── Handles ─────────────────────────────────────────────────────────────────

pub const HANDLE_COUNT: usize = 8;

/// Resize handles in row-major order; the discriminant is the handle index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft = 0,
    Top = 1,
    TopRight = 2,
    Left = 3,
    Right = 4,
    BottomLeft = 5,
    Bottom = 6,
    BottomRight = 7,
}

impl Handle {
    pub const ALL: [Handle; HANDLE_COUNT] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Left,
        Handle::Right,
        Handle::BottomLeft,
        Handle::Bottom,
        Handle::BottomRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Handle> {
        Self::ALL.get(index).copied()
    }

    pub fn on_left_edge(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Left | Handle::BottomLeft)
    }

    pub fn on_right_edge(self) -> bool {
        matches!(self, Handle::TopRight | Handle::Right | Handle::BottomRight)
    }

    pub fn on_top_edge(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Top | Handle::TopRight)
    }

    pub fn on_bottom_edge(self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::Bottom | Handle::BottomRight)
    }

    /// Left/right counterpart in the same row (0↔2, 3↔4, 5↔7). Middle
    /// column handles map to themselves.
    pub fn mirrored_horizontally(self) -> Handle {
        match self {
            Handle::TopLeft => Handle::TopRight,
            Handle::TopRight => Handle::TopLeft,
            Handle::Left => Handle::Right,
            Handle::Right => Handle::Left,
            Handle::BottomLeft => Handle::BottomRight,
            Handle::BottomRight => Handle::BottomLeft,
            other => other,
        }
    }

    /// Top/bottom counterpart in the same column, i.e. an index shift of
    /// ±5. Middle row handles map to themselves.
    pub fn mirrored_vertically(self) -> Handle {
        let index = self.index();
        let mirrored = match index {
            0..=2 => index + 5,
            5..=7 => index - 5,
            _ => index,
        };
        Self::ALL[mirrored]
    }

    /// The point of `region` this handle sits on.
    pub fn anchor(self, region: &Rect) -> Vec2 {
        let x = if self.on_left_edge() {
            region.x
        } else if self.on_right_edge() {
            region.right()
        } else {
            region.x + region.w * 0.5
        };
        let y = if self.on_top_edge() {
            region.y
        } else if self.on_bottom_edge() {
            region.bottom()
        } else {
            region.y + region.h * 0.5
        };
        Vec2::new(x, y)
    }
}

/// What a click landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grab {
    Handle(Handle),
    Body,
}

impl Grab {
    /// Handle index 0–7, or -1 for the body.
    pub fn index(self) -> i32 {
        match self {
            Grab::Handle(handle) => handle.index() as i32,
            Grab::Body => -1,
        }
    }
}

/// Handle squares for `region` in unscaled source coordinates.
pub fn handle_rects(region: &Rect, handle_size: f32) -> [Rect; HANDLE_COUNT] {
    Handle::ALL.map(|handle| Rect::centered(handle.anchor(region), handle_size))
}

/// Screen rectangle of a handle: the center is zoomed, the square is not,
/// so click targets stay the same size at every zoom level.
pub fn screen_handle_rect(handle: &Rect, zoom: f32) -> Rect {
    Rect::centered(handle.center() * zoom, handle.w)
}

/// Source-space rectangle that maps onto `screen_handle_rect` at `zoom`.
fn source_handle_rect(handle: &Rect, zoom: f32) -> Rect {
    Rect::centered(handle.center(), handle.w / zoom)
}

/// Hit test a screen-space position against a region and its handles.
/// Handles are checked first, in index order, then the body.
pub fn hit_test(
    region: &Rect,
    handles: &[Rect; HANDLE_COUNT],
    screen_pos: Vec2,
    zoom: f32,
) -> Option<Grab> {
    let source_pos = screen_pos / zoom;
    for (i, handle) in handles.iter().enumerate() {
        if source_handle_rect(handle, zoom).contains(source_pos) {
            return Some(Grab::Handle(Handle::ALL[i]));
        }
    }
    if region.contains(source_pos) {
        return Some(Grab::Body);
    }
    None
}

// ── Grid ────────────────────────────────────────────────────────────────────

/// Snapping grid for new regions and handle drags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grid {
    pub size_x: u32,
    pub size_y: u32,
    pub snap: bool,
    pub square: bool,
    #[serde(skip)]
    last_changed_x: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            size_x: 16,
            size_y: 16,
            snap: false,
            square: false,
            last_changed_x: true,
        }
    }
}

impl Grid {
    pub fn set_size_x(&mut self, size: u32) {
        self.last_changed_x = true;
        self.size_x = size;
        if self.square {
            self.size_y = size;
        }
    }

    pub fn set_size_y(&mut self, size: u32) {
        self.last_changed_x = false;
        self.size_y = size;
        if self.square {
            self.size_x = size;
        }
    }

    /// Turning the lock on copies whichever axis was edited last.
    pub fn set_square(&mut self, square: bool) {
        self.square = square;
        if square {
            if self.last_changed_x {
                self.size_y = self.size_x;
            } else {
                self.size_x = self.size_y;
            }
        }
    }

    pub fn snap(&self, point: Vec2) -> Vec2 {
        if !self.snap {
            return point;
        }
        Vec2::new(snap_axis(point.x, self.size_x), snap_axis(point.y, self.size_y))
    }
}

fn snap_axis(value: f32, interval: u32) -> f32 {
    if interval == 0 {
        return value;
    }
    let interval = interval as f32;
    (value / interval).round() * interval
}
