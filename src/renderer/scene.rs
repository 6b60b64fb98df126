//! Scene painter for the backdrop and the active mini-game

use glam::Vec2;

use super::{GradientStop, Hsla, Paint, RenderTarget};
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::field::{Bubble, ParticleField, PopRing, PressBubble};
use crate::sim::geom::Rect;
use crate::sim::modes::memory::card_rect;
use crate::sim::modes::stacker::BLOCK_HEIGHT;
use crate::sim::modes::{GameModeAdapter, ModeState, snake};

const TARGET_HUE: f32 = 200.0;
const BAD_HUE: f32 = 0.0;
const GOOD_HUE: f32 = 140.0;
const INK: Hsla = Hsla::new(210.0, 30.0, 25.0, 1.0);

/// Glassy bubble: gradient body, rim, highlight
pub fn bubble(target: &mut dyn RenderTarget, center: Vec2, radius: f32, hue: f32, opacity: f32, shine: f32) {
    if radius <= 0.0 || opacity <= 0.0 {
        return;
    }
    let paint = Paint::Radial {
        focus: Vec2::splat(-radius * 0.3),
        stops: vec![
            GradientStop::new(0.0, Hsla::new(hue, 80.0, 95.0, opacity * 0.9)),
            GradientStop::new(0.6, Hsla::new(hue, 70.0, 72.0, opacity * 0.35)),
            GradientStop::new(1.0, Hsla::new(hue, 70.0, 60.0, opacity * 0.12)),
        ],
    };
    target.fill_circle(center, radius, &paint);
    target.stroke_circle(center, radius, 1.0, Hsla::new(hue, 80.0, 85.0, opacity * 0.6));
    target.fill_ellipse(
        center - Vec2::splat(radius * 0.35),
        Vec2::new(radius * 0.35, radius * 0.22),
        -0.6,
        Hsla::WHITE.with_alpha(shine * opacity),
    );
}

fn field_bubble(target: &mut dyn RenderTarget, b: &Bubble) {
    bubble(target, b.motion.pos, b.radius, b.hue, b.motion.opacity, b.shine);
}

fn press_bubble(target: &mut dyn RenderTarget, p: &PressBubble) {
    bubble(target, p.pos, p.radius, p.hue, p.opacity, 0.5);
}

fn ring(target: &mut dyn RenderTarget, r: &PopRing) {
    target.stroke_circle(r.pos, r.radius, r.stroke, Hsla::new(195.0, 80.0, 85.0, r.opacity));
}

/// Paint the ambient backdrop
pub fn draw_field(target: &mut dyn RenderTarget, field: &ParticleField) {
    target.clear();
    if !field.is_enabled() {
        return;
    }
    for b in field.ambient() {
        field_bubble(target, b);
    }
    for b in field.bursts() {
        field_bubble(target, b);
    }
    if let Some(p) = field.press() {
        press_bubble(target, p);
    }
    for r in field.rings() {
        ring(target, r);
    }
}

fn entity_hue(e: &Entity) -> f32 {
    // stable per entity
    180.0 + (e.id.0 as f32 * 37.0) % 60.0
}

fn pooled(target: &mut dyn RenderTarget, e: &Entity) {
    match e.kind {
        EntityKind::Bubble => bubble(target, e.center(), e.radius(), entity_hue(e), e.opacity.max(0.25), 0.45),
        EntityKind::Target => target.fill_rect(e.rect(), Hsla::new(TARGET_HUE, 80.0, 55.0, 1.0)),
        EntityKind::Obstacle => target.fill_rect(e.rect(), Hsla::new(30.0, 60.0, 40.0, 1.0)),
        EntityKind::Block => target.fill_rect(e.rect(), Hsla::new(350.0, 70.0, 55.0, 1.0)),
        EntityKind::Drop { good } => {
            let hue = if good { GOOD_HUE } else { BAD_HUE };
            target.fill_circle(e.center(), e.radius(), &Paint::Solid(Hsla::new(hue, 70.0, 50.0, 1.0)));
        }
        EntityKind::Pipe { gap_top, gap_bottom } => {
            let color = Hsla::new(120.0, 45.0, 40.0, 1.0);
            target.fill_rect(Rect::new(e.pos.x, 0.0, e.size.x, gap_top), color);
            target.fill_rect(
                Rect::new(e.pos.x, gap_bottom, e.size.x, (e.size.y - gap_bottom).max(0.0)),
                color,
            );
        }
    }
}

/// Paint the active session into the game area
pub fn draw_session(target: &mut dyn RenderTarget, adapter: Option<&GameModeAdapter>) {
    target.clear();
    let Some(adapter) = adapter else {
        return;
    };
    let area = target.size();

    match &adapter.state {
        ModeState::Clicker(m) => {
            for e in m.pool.iter() {
                pooled(target, e);
            }
        }
        ModeState::Precision(m) => {
            target.stroke_circle(area.center(), m.target / 2.0, 2.0, INK.with_alpha(0.4));
            if let Some(held) = &m.current {
                bubble(target, held.center, held.growth.size / 2.0, 195.0, 0.8, 0.5);
            }
        }
        ModeState::Stacker(m) => {
            let levels = m.stack.len() as f32 + 1.0;
            // scroll so the mover stays on screen
            let scroll = (levels * BLOCK_HEIGHT - area.height + BLOCK_HEIGHT).max(0.0);
            for (i, block) in m.stack.iter().enumerate() {
                let y = area.height - (i as f32 + 1.0) * BLOCK_HEIGHT + scroll;
                target.fill_rect(
                    Rect::new(block.span.start, y, block.span.len(), BLOCK_HEIGHT),
                    Hsla::new(block.hue, 70.0, 60.0, 1.0),
                );
            }
            if let Some(current) = &m.current {
                let y = area.height - levels * BLOCK_HEIGHT + scroll;
                target.fill_rect(
                    Rect::new(current.x, y, current.width, BLOCK_HEIGHT),
                    Hsla::new(current.hue, 70.0, 60.0, 1.0),
                );
            }
        }
        ModeState::Snake(m) => {
            // one pixel of grid showing between cells
            let cell = |c: glam::IVec2| {
                let r = snake::cell_rect(c);
                Rect::new(r.x, r.y, r.w - 1.0, r.h - 1.0)
            };
            if !m.body.is_empty() {
                target.fill_rect(cell(m.food), Hsla::new(BAD_HUE, 70.0, 55.0, 1.0));
            }
            for &segment in &m.body {
                target.fill_rect(cell(segment), Hsla::new(GOOD_HUE, 55.0, 45.0, 1.0));
            }
        }
        ModeState::Flappy(m) => {
            for pipe in m.pipes.iter() {
                pooled(target, pipe);
            }
            target.fill_circle(
                m.bird,
                crate::sim::modes::flappy::BIRD_RADIUS,
                &Paint::Solid(Hsla::new(50.0, 90.0, 55.0, 1.0)),
            );
        }
        ModeState::Runner(m) => {
            target.fill_rect(Rect::new(0.0, area.height - 1.0, area.width, 1.0), INK);
            for o in m.obstacles.iter() {
                pooled(target, o);
            }
            let size = crate::sim::modes::runner::RUNNER_SIZE;
            target.fill_rect(Rect::from_pos_size(m.runner, Vec2::splat(size)), INK);
        }
        ModeState::Dodger(m) => {
            for b in m.blocks.iter() {
                pooled(target, b);
            }
            target.fill_rect(m.player, Hsla::new(TARGET_HUE, 80.0, 50.0, 1.0));
        }
        ModeState::Paddle(m) => {
            target.fill_rect(m.paddle, INK);
            target.fill_circle(
                m.ball,
                crate::sim::modes::paddle::BALL_RADIUS,
                &Paint::Solid(Hsla::new(TARGET_HUE, 80.0, 55.0, 1.0)),
            );
        }
        ModeState::Catcher(m) => {
            for d in m.drops.iter() {
                pooled(target, d);
            }
            target.fill_rect(m.player, INK);
        }
        ModeState::Memory(m) => {
            for (i, card) in m.cards.iter().enumerate() {
                let rect = card_rect(i, &area);
                if card.face_up || card.matched {
                    let l = if card.matched { 85.0 } else { 95.0 };
                    target.fill_rect(rect, Hsla::new(195.0, 60.0, l, 1.0));
                    target.fill_text(rect.center(), &card.value.to_string(), INK);
                } else {
                    target.fill_rect(rect, Hsla::new(205.0, 55.0, 45.0, 1.0));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingTarget};
    use crate::sim::geom::Bounds;

    #[test]
    fn test_field_draws_every_bubble() {
        let field = ParticleField::new(Bounds::new(400.0, 300.0), 20, 1, true);
        let mut target = RecordingTarget::new(field.bounds());
        draw_field(&mut target, &field);
        let fills = target.count(|c| matches!(c, DrawCommand::FillCircle { .. }));
        assert_eq!(fills, field.ambient().count());
    }

    #[test]
    fn test_disabled_field_only_clears() {
        let field = ParticleField::new(Bounds::new(400.0, 300.0), 20, 1, false);
        let mut target = RecordingTarget::new(field.bounds());
        draw_field(&mut target, &field);
        assert_eq!(target.commands, vec![DrawCommand::Clear]);
    }

    #[test]
    fn test_invisible_bubble_skipped() {
        let mut target = RecordingTarget::new(Bounds::new(10.0, 10.0));
        bubble(&mut target, Vec2::ZERO, 5.0, 190.0, 0.0, 0.5);
        assert!(target.commands.is_empty());
    }
}
