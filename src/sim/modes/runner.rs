//! Runner: jump over ground obstacles

use glam::Vec2;

use super::SessionCtx;
use crate::sim::collision::{CollisionOutcome, CollisionRule};
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::geom::Rect;
use crate::sim::motion::{Contact, FloorRule, MotionModel, ballistic};
use crate::sim::pool::EntityPool;

pub const RUNNER_X: f32 = 40.0;
pub const RUNNER_SIZE: f32 = 24.0;
/// Runner top sits this far above the bottom edge when grounded
pub const GROUND_OFFSET: f32 = 40.0;
pub const GRAVITY: f32 = 0.6;
pub const JUMP: f32 = -10.0;
pub const OBSTACLE_SPEED: f32 = 3.2;

#[derive(Debug, Clone)]
pub struct RunnerMode {
    /// Top-left of the runner box
    pub runner: Vec2,
    pub vel: Vec2,
    /// A jump is only accepted while this is set
    pub on_ground: bool,
    pub obstacles: EntityPool<Entity>,
}

impl RunnerMode {
    pub fn start(ctx: &mut SessionCtx<'_>) -> Self {
        Self {
            runner: Vec2::new(RUNNER_X, ctx.bounds.height - GROUND_OFFSET),
            vel: Vec2::ZERO,
            on_ground: true,
            obstacles: EntityPool::unbounded(),
        }
    }

    /// Jump only from the ground
    pub fn jump(&mut self) {
        if self.on_ground {
            self.vel.y = JUMP;
            self.on_ground = false;
        }
    }

    pub fn spawn_obstacle(&mut self, ctx: &mut SessionCtx<'_>) {
        let size = ctx.random(20.0, 38.0);
        let pos = Vec2::new(ctx.bounds.width, ctx.bounds.height - size);
        self.obstacles.spawn(|id| {
            Entity::square(id, EntityKind::Obstacle, pos, size).with_velocity(Vec2::new(-OBSTACLE_SPEED, 0.0))
        });
    }

    pub fn on_frame(&mut self, frames: f32, motion: MotionModel, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        let bounds = ctx.bounds;
        let floor = FloorRule::Land {
            ground_y: bounds.height - GROUND_OFFSET,
        };
        if ballistic(&mut self.runner, &mut self.vel, GRAVITY, frames, floor, &bounds) == Contact::Landed {
            self.on_ground = true;
        }

        let runner = Rect::from_pos_size(self.runner, Vec2::splat(RUNNER_SIZE));
        let mut cleared = 0;
        let mut hit = None;
        self.obstacles.for_each_alive(|o| {
            if motion.step(o, frames, &bounds) == Contact::Exited {
                o.kill();
                return;
            }
            if rule.hits_box(&runner, &o.rect()) {
                hit.get_or_insert(o.id);
            }
            if !o.scored && o.pos.x + o.size.x < runner.x {
                o.scored = true;
                cleared += 1;
            }
        });
        self.obstacles.remove_where(Entity::is_dead);

        if cleared > 0 {
            ctx.apply(CollisionOutcome::scored(None, cleared));
        }
        if let Some(id) = hit {
            ctx.apply(CollisionOutcome::ended(Some(id)));
        }
    }
}
