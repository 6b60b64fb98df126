//! Axis-aligned geometry for game areas, hit boxes and stack spans
//!
//! Screen space: origin top-left, +y down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Drawable extent of a game area or the backdrop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Clamp a box's top-left corner so the whole box stays inside
    pub fn clamp_box(&self, pos: Vec2, size: Vec2) -> Vec2 {
        let max = (self.size() - size).max(Vec2::ZERO);
        pos.clamp(Vec2::ZERO, max)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

/// Axis-aligned rectangle (top-left + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Inclusive containment (edges count as inside)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Strict AABB overlap; touching edges do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn horizontal_span(&self) -> Span {
        Span::new(self.x, self.right())
    }
}

/// Closed horizontal interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn from_origin(x: f32, width: f32) -> Self {
        Self::new(x, x + width)
    }

    #[inline]
    pub fn len(&self) -> f32 {
        self.end - self.start
    }
}
