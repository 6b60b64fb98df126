//! Flappy: gravity bird threading pipe gaps

use glam::Vec2;

use super::SessionCtx;
use crate::audio::SoundEffect;
use crate::sim::collision::{CollisionOutcome, CollisionRule};
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::geom::{Bounds, Rect};
use crate::sim::motion::{Contact, FloorRule, MotionModel, ballistic};
use crate::sim::pool::EntityPool;

pub const BIRD_X: f32 = 80.0;
pub const BIRD_RADIUS: f32 = 12.0;
/// Half extents used for pipe contact
pub const BIRD_HALF_WIDTH: f32 = 14.0;
pub const BIRD_HALF_HEIGHT: f32 = 12.0;
pub const GRAVITY: f32 = 0.4;
pub const LIFT: f32 = -6.5;
pub const PIPE_GAP: f32 = 120.0;
pub const PIPE_WIDTH: f32 = 60.0;
pub const PIPE_SPEED: f32 = 2.5;

#[derive(Debug, Clone)]
pub struct FlappyMode {
    /// Bird centre
    pub bird: Vec2,
    /// Only `y` changes; gravity and flaps act on it
    pub vel: Vec2,
    /// Pipe pairs scrolling left
    pub pipes: EntityPool<Entity>,
}

impl FlappyMode {
    pub fn start(ctx: &mut SessionCtx<'_>) -> Self {
        Self {
            bird: Vec2::new(BIRD_X, ctx.bounds.height / 2.0),
            vel: Vec2::ZERO,
            pipes: EntityPool::unbounded(),
        }
    }

    pub fn flap(&mut self, ctx: &mut SessionCtx<'_>) {
        self.vel.y = LIFT;
        ctx.play(SoundEffect::ButtonPop);
    }

    pub fn spawn_pipe(&mut self, ctx: &mut SessionCtx<'_>) {
        let height = ctx.bounds.height;
        let gap_top = ctx.random(0.0, 1.0) * (height - PIPE_GAP - 60.0).max(0.0) + 20.0;
        let x = ctx.bounds.width;
        self.pipes.spawn(|id| {
            Entity::new(
                id,
                EntityKind::Pipe {
                    gap_top,
                    gap_bottom: gap_top + PIPE_GAP,
                },
                Vec2::new(x, 0.0),
                Vec2::new(PIPE_WIDTH, height),
            )
            .with_velocity(Vec2::new(-PIPE_SPEED, 0.0))
        });
    }

    fn bird_box(&self) -> Rect {
        Rect::new(
            self.bird.x - BIRD_HALF_WIDTH,
            self.bird.y - BIRD_HALF_HEIGHT,
            BIRD_HALF_WIDTH * 2.0,
            BIRD_HALF_HEIGHT * 2.0,
        )
    }

    pub fn on_frame(&mut self, frames: f32, motion: MotionModel, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        let bounds = ctx.bounds;
        // the bird dies a little above the bottom edge
        let flight = Bounds::new(bounds.width, bounds.height - BIRD_RADIUS);
        let contact = ballistic(&mut self.bird, &mut self.vel, GRAVITY, frames, FloorRule::FallThrough, &flight);
        if matches!(contact, Contact::Floor | Contact::Ceiling) {
            ctx.apply(CollisionOutcome::ended(None));
            return;
        }

        let bird = self.bird_box();
        let bird_x = self.bird.x;
        let mut passed = 0;
        let mut crashed = None;
        self.pipes.for_each_alive(|pipe| {
            if motion.step(pipe, frames, &bounds) == Contact::Exited {
                pipe.kill();
                return;
            }
            let EntityKind::Pipe { gap_top, gap_bottom } = pipe.kind else {
                return;
            };
            let top = Rect::new(pipe.pos.x, 0.0, pipe.size.x, gap_top);
            let bottom = Rect::new(pipe.pos.x, gap_bottom, pipe.size.x, (bounds.height - gap_bottom).max(0.0));
            if rule.hits_box(&bird, &top) || rule.hits_box(&bird, &bottom) {
                crashed.get_or_insert(pipe.id);
            }
            if !pipe.scored && pipe.pos.x + pipe.size.x < bird_x {
                pipe.scored = true;
                passed += 1;
            }
        });
        self.pipes.remove_where(Entity::is_dead);

        if passed > 0 {
            ctx.apply(CollisionOutcome::scored(None, passed));
        }
        if let Some(id) = crashed {
            ctx.apply(CollisionOutcome::ended(Some(id)));
        }
    }
}
