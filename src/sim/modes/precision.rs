//! Precision: hold to grow, release near the target size

use glam::Vec2;

use super::{SessionCtx, SessionTimer};
use crate::audio::SoundEffect;
use crate::consts::{PRECISION_GROW_PERIOD_MS, PRECISION_GROWTH, PRECISION_MAX_SIZE, PRECISION_START_SIZE};
use crate::sim::motion::Growth;

pub const TARGET_MIN: f32 = 70.0;
pub const TARGET_MAX: f32 = 140.0;

/// Points for releasing at `size` against `target`
pub fn precision_points(size: f32, target: f32) -> u32 {
    let diff = (size - target).abs();
    if diff <= 12.0 {
        2
    } else if diff <= 25.0 {
        1
    } else {
        0
    }
}

/// The bubble under the held pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldBubble {
    /// Press position, area-local
    pub center: Vec2,
    /// Diameter and its cap
    pub growth: Growth,
}

#[derive(Debug, Clone)]
pub struct PrecisionMode {
    /// Diameter to aim for this round
    pub target: f32,
    /// Bubble being grown, if the pointer is down
    pub current: Option<HeldBubble>,
    /// Points from the previous release, shown in the status line
    pub last_points: Option<u32>,
}

impl PrecisionMode {
    pub fn start(ctx: &mut SessionCtx<'_>) -> Self {
        Self {
            target: ctx.random(TARGET_MIN, TARGET_MAX),
            current: None,
            last_points: None,
        }
    }

    /// Begin growing a bubble; ignored while one is already held
    pub fn on_press(&mut self, pos: Vec2, ctx: &mut SessionCtx<'_>) {
        if self.current.is_some() {
            return;
        }
        self.current = Some(HeldBubble {
            center: pos,
            growth: Growth::new(PRECISION_START_SIZE, PRECISION_GROWTH, PRECISION_MAX_SIZE),
        });
        ctx.start_interval(SessionTimer::Grow, PRECISION_GROW_PERIOD_MS);
    }

    /// One grow tick; reaching the cap releases automatically
    pub fn on_grow_tick(&mut self, ctx: &mut SessionCtx<'_>) {
        let Some(held) = self.current.as_mut() else {
            return;
        };
        if held.growth.grow(1.0) {
            self.on_release(ctx);
        }
    }

    /// Score the held bubble and finish the round; ignored with nothing held
    pub fn on_release(&mut self, ctx: &mut SessionCtx<'_>) {
        let Some(held) = self.current.take() else {
            return;
        };
        ctx.stop_timer(SessionTimer::Grow);
        let points = precision_points(held.growth.size, self.target);
        self.last_points = Some(points);
        ctx.session.add_score(points);
        ctx.play(SoundEffect::ButtonPop);
        log::debug!(
            "precision release size={:.1} target={:.1} points={}",
            held.growth.size,
            self.target,
            points
        );

        let flow = ctx.session.complete_round();
        ctx.follow(flow);
        if !ctx.has_ended() {
            self.target = ctx.random(TARGET_MIN, TARGET_MAX);
        }
    }
}
