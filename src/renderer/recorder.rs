//! Render target that records draw calls instead of drawing

use glam::Vec2;
use serde::Serialize;

use super::{Hsla, Paint, RenderTarget};
use crate::sim::geom::{Bounds, Rect};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Clear,
    FillCircle { center: Vec2, radius: f32, paint: Paint },
    StrokeCircle { center: Vec2, radius: f32, width: f32, color: Hsla },
    FillEllipse { center: Vec2, radii: Vec2, rotation: f32, color: Hsla },
    FillRect { rect: Rect, color: Hsla },
    FillText { pos: Vec2, text: String, color: Hsla },
}

#[derive(Debug, Clone)]
pub struct RecordingTarget {
    size: Bounds,
    pub commands: Vec<DrawCommand>,
}

impl RecordingTarget {
    pub fn new(size: Bounds) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Commands recorded since the last `clear`
    pub fn frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map_or(0, |i| i + 1);
        &self.commands[start..]
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.frame().iter().filter(|c| pred(c)).count()
    }
}

impl RenderTarget for RecordingTarget {
    fn size(&self) -> Bounds {
        self.size
    }

    fn resize(&mut self, size: Bounds) {
        self.size = size;
        self.commands.clear();
    }

    fn clear(&mut self) {
        // keep only the previous frame around
        let keep_from = self.commands.iter().rposition(|c| *c == DrawCommand::Clear).unwrap_or(0);
        self.commands.drain(..keep_from);
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Hsla) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Hsla) {
        self.commands.push(DrawCommand::FillEllipse {
            center,
            radii,
            rotation,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Hsla) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_text(&mut self, pos: Vec2, text: &str, color: Hsla) {
        self.commands.push(DrawCommand::FillText {
            pos,
            text: text.to_string(),
            color,
        });
    }
}
