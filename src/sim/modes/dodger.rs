//! Dodger: steer along the floor away from falling blocks

use glam::Vec2;

use super::SessionCtx;
use crate::sim::collision::{CollisionOutcome, CollisionRule};
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::geom::Rect;
use crate::sim::input::HeldKeys;
use crate::sim::motion::{Contact, MotionModel};
use crate::sim::pool::EntityPool;

pub const PLAYER_SIZE: f32 = 24.0;
pub const PLAYER_SPEED: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct DodgerMode {
    /// Player box, pinned to the floor
    pub player: Rect,
    /// Falling blocks; each scores once when it passes the floor
    pub blocks: EntityPool<Entity>,
    pub keys: HeldKeys,
}

impl DodgerMode {
    pub fn start(ctx: &mut SessionCtx<'_>) -> Self {
        let b = ctx.bounds;
        Self {
            player: Rect::new(
                b.width / 2.0 - PLAYER_SIZE / 2.0,
                b.height - PLAYER_SIZE,
                PLAYER_SIZE,
                PLAYER_SIZE,
            ),
            blocks: EntityPool::unbounded(),
            keys: HeldKeys::default(),
        }
    }

    pub fn spawn_block(&mut self, ctx: &mut SessionCtx<'_>) {
        let size = ctx.random(18.0, 34.0);
        let x = ctx.random(0.0, 1.0) * (ctx.bounds.width - size).max(0.0);
        let speed = ctx.random(2.0, 4.0);
        self.blocks.spawn(|id| {
            Entity::square(id, EntityKind::Block, Vec2::new(x, -size), size).with_velocity(Vec2::new(0.0, speed))
        });
    }

    pub fn on_frame(&mut self, frames: f32, motion: MotionModel, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        let bounds = ctx.bounds;
        self.player.x = (self.player.x + self.keys.axis() * PLAYER_SPEED * frames)
            .clamp(0.0, (bounds.width - self.player.w).max(0.0));

        let player = self.player;
        let mut dodged = 0;
        let mut hit = None;
        self.blocks.for_each_alive(|block| {
            if motion.step(block, frames, &bounds) == Contact::Exited {
                block.kill();
                return;
            }
            if rule.hits_box(&player, &block.rect()) {
                hit.get_or_insert(block.id);
            }
            if !block.scored && block.pos.y > bounds.height {
                block.scored = true;
                dodged += 1;
            }
        });
        self.blocks.remove_where(Entity::is_dead);

        if dodged > 0 {
            ctx.apply(CollisionOutcome::scored(None, dodged));
        }
        if let Some(id) = hit {
            ctx.apply(CollisionOutcome::ended(Some(id)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSound;
    use crate::sim::geom::Bounds;
    use crate::sim::input::Key;
    use crate::sim::modes::{GameInput, GameMode};
    use crate::sim::session::GameSession;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn running() -> GameSession {
        let mut session = GameSession::idle(GameMode::Dodger);
        session.start(GameMode::Dodger, 1);
        session
    }

    #[test]
    fn test_player_clamped_to_area() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(200.0, 200.0));
        let mut mode = DodgerMode::start(&mut ctx);
        mode.keys.apply(&GameInput::KeyDown(Key::Left));
        for _ in 0..100 {
            mode.on_frame(1.0, GameMode::Dodger.config().motion, CollisionRule::RectOverlap, &mut ctx);
        }
        assert_eq!(mode.player.x, 0.0);
    }

    #[test]
    fn test_block_scores_once_past_floor() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(200.0, 200.0));
        let mut mode = DodgerMode::start(&mut ctx);
        let motion = GameMode::Dodger.config().motion;
        mode.blocks.spawn(|id| {
            Entity::square(id, EntityKind::Block, Vec2::new(0.0, 190.0), 20.0).with_velocity(Vec2::new(0.0, 4.0))
        });
        for _ in 0..20 {
            mode.on_frame(1.0, motion, CollisionRule::RectOverlap, &mut ctx);
        }
        assert_eq!(ctx.session.score, 1);
        assert!(mode.blocks.is_empty());
        assert!(!ctx.has_ended());
    }

    #[test]
    fn test_block_on_player_ends_session() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(200.0, 200.0));
        let mut mode = DodgerMode::start(&mut ctx);
        let target = mode.player;
        mode.blocks.spawn(|id| {
            Entity::square(id, EntityKind::Block, Vec2::new(target.x, target.y - 20.0), 20.0)
                .with_velocity(Vec2::new(0.0, 4.0))
        });
        mode.on_frame(1.0, GameMode::Dodger.config().motion, CollisionRule::RectOverlap, &mut ctx);
        assert!(ctx.has_ended());
    }
}
