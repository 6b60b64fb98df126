//! 2D drawing surface abstraction
//!
//! The engine never talks to a canvas directly. It paints through
//! [`RenderTarget`], which the browser build implements on Canvas2D and tests
//! implement with [`RecordingTarget`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recorder;
pub mod scene;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::geom::{Bounds, Rect};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasTarget;
pub use recorder::{DrawCommand, RecordingTarget};
pub use scene::{draw_field, draw_session};

/// HSL colour with alpha; hue in degrees, saturation/lightness in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub const WHITE: Hsla = Hsla::new(0.0, 0.0, 100.0, 1.0);

    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `hsla()` string, alpha clamped to `[0, 1]`
    pub fn to_css(&self) -> String {
        format!(
            "hsla({:.0}, {:.0}%, {:.0}%, {:.3})",
            self.h.rem_euclid(360.0),
            self.s.clamp(0.0, 100.0),
            self.l.clamp(0.0, 100.0),
            self.a.clamp(0.0, 1.0)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// 0 at the focus, 1 at the rim
    pub offset: f32,
    pub color: Hsla,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Hsla) -> Self {
        Self { offset, color }
    }
}

/// How a shape is filled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Solid(Hsla),
    /// Radial gradient from `focus` (offset from the shape centre) to the rim
    Radial { focus: Vec2, stops: Vec<GradientStop> },
}

/// A 2D drawing surface
pub trait RenderTarget {
    fn size(&self) -> Bounds;
    /// Reset drawable dimensions; contents may be discarded
    fn resize(&mut self, size: Bounds);
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Hsla);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Hsla);
    fn fill_rect(&mut self, rect: Rect, color: Hsla);
    fn fill_text(&mut self, pos: Vec2, text: &str, color: Hsla);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(Hsla::new(190.0, 80.0, 70.0, 0.5).to_css(), "hsla(190, 80%, 70%, 0.500)");
        assert_eq!(Hsla::new(-10.0, 50.0, 50.0, 2.0).to_css(), "hsla(350, 50%, 50%, 1.000)");
    }
}
