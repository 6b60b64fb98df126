//! Canvas2D render target (WASM only)

use glam::Vec2;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Hsla, Paint, RenderTarget};
use crate::sim::geom::{Bounds, Rect};

const TAU: f64 = std::f64::consts::TAU;

pub struct CanvasTarget {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
    size: Bounds,
}

impl CanvasTarget {
    /// Wrap a canvas; None when no 2D context is available
    pub fn new(canvas: HtmlCanvasElement, dpr: f64) -> Option<Self> {
        use wasm_bindgen::JsCast;

        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let size = Bounds::new(canvas.client_width() as f32, canvas.client_height() as f32);
        let mut target = Self {
            canvas,
            ctx,
            dpr: dpr.max(1.0),
            size,
        };
        target.resize(size);
        Some(target)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn set_paint(&self, center: Vec2, radius: f32, paint: &Paint) {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(&color.to_css()),
            Paint::Radial { focus, stops } => {
                let f = center + *focus;
                let Ok(gradient) = self.ctx.create_radial_gradient(
                    f.x as f64,
                    f.y as f64,
                    0.0,
                    center.x as f64,
                    center.y as f64,
                    radius as f64,
                ) else {
                    return;
                };
                for stop in stops {
                    gradient.add_color_stop(stop.offset, &stop.color.to_css()).ok();
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
    }
}

impl RenderTarget for CanvasTarget {
    fn size(&self) -> Bounds {
        self.size
    }

    fn resize(&mut self, size: Bounds) {
        self.size = size;
        self.canvas.set_width((size.width as f64 * self.dpr) as u32);
        self.canvas.set_height((size.height as f64 * self.dpr) as u32);
        self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0).ok();
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.size.width as f64, self.size.height as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.set_paint(center, radius, paint);
        self.ctx.begin_path();
        self.ctx.arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU).ok();
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Hsla) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU).ok();
        self.ctx.stroke();
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32, color: Hsla) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        self.ctx
            .ellipse(
                center.x as f64,
                center.y as f64,
                radii.x.max(0.0) as f64,
                radii.y.max(0.0) as f64,
                rotation as f64,
                0.0,
                TAU,
            )
            .ok();
        self.ctx.fill();
    }

    fn fill_rect(&mut self, rect: Rect, color: Hsla) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn fill_text(&mut self, pos: Vec2, text: &str, color: Hsla) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font("bold 20px sans-serif");
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
    }
}
