//! Falling catcher: collect good drops, avoid bad ones, three lives

use glam::Vec2;
use rand::Rng;

use super::SessionCtx;
use crate::audio::SoundEffect;
use crate::sim::collision::{CollisionOutcome, CollisionRule};
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::geom::Rect;
use crate::sim::input::HeldKeys;
use crate::sim::motion::{Contact, MotionModel};
use crate::sim::pool::EntityPool;

pub const PLAYER_WIDTH: f32 = 60.0;
pub const PLAYER_HEIGHT: f32 = 12.0;
pub const PLAYER_SPEED: f32 = 5.0;
pub const DROP_SIZE: f32 = 12.0;
/// A drop is good when a unit sample exceeds this
pub const BAD_CHANCE: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct CatcherMode {
    /// Catcher tray near the floor
    pub player: Rect,
    /// Good and bad drops still falling
    pub drops: EntityPool<Entity>,
    /// Left/right steering
    pub keys: HeldKeys,
}

impl CatcherMode {
    pub fn start(ctx: &mut SessionCtx<'_>) -> Self {
        let b = ctx.bounds;
        Self {
            player: Rect::new(b.width / 2.0 - PLAYER_WIDTH / 2.0, b.height - 20.0, PLAYER_WIDTH, PLAYER_HEIGHT),
            drops: EntityPool::unbounded(),
            keys: HeldKeys::default(),
        }
    }

    pub fn spawn_drop(&mut self, ctx: &mut SessionCtx<'_>) {
        let x = ctx.random(0.0, 1.0) * (ctx.bounds.width - DROP_SIZE).max(0.0);
        let speed = ctx.random(2.5, 4.0);
        let good = ctx.rng.random_bool(1.0 - BAD_CHANCE);
        self.drops.spawn(|id| {
            Entity::square(id, EntityKind::Drop { good }, Vec2::new(x, -DROP_SIZE), DROP_SIZE)
                .with_velocity(Vec2::new(0.0, speed))
        });
    }

    pub fn on_frame(&mut self, frames: f32, motion: MotionModel, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        let bounds = ctx.bounds;
        self.player.x = (self.player.x + self.keys.axis() * PLAYER_SPEED * frames)
            .clamp(0.0, (bounds.width - self.player.w).max(0.0));

        let player = self.player;
        let mut outcomes = Vec::new();
        self.drops.for_each_alive(|drop| {
            let contact = motion.step(drop, frames, &bounds);
            let EntityKind::Drop { good } = drop.kind else {
                return;
            };
            if rule.hits_box(&player, &drop.rect()) {
                outcomes.push(if good {
                    CollisionOutcome::scored(Some(drop.id), 1)
                } else {
                    CollisionOutcome::life_lost(Some(drop.id))
                });
                drop.kill();
                return;
            }
            // a missed good drop costs one life, once
            if good && !drop.scored && drop.pos.y > bounds.height {
                drop.scored = true;
                outcomes.push(CollisionOutcome::life_lost(Some(drop.id)));
            }
            if contact == Contact::Exited {
                drop.kill();
            }
        });
        self.drops.remove_where(Entity::is_dead);

        for outcome in outcomes {
            if matches!(outcome.consequence, crate::sim::collision::Consequence::Scored(_)) {
                ctx.play(SoundEffect::ButtonPop);
            }
            ctx.apply(outcome);
            if ctx.has_ended() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSound;
    use crate::sim::geom::Bounds;
    use crate::sim::modes::GameMode;
    use crate::sim::session::GameSession;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn running() -> GameSession {
        let mut session = GameSession::idle(GameMode::FallingCatcher);
        session.start(GameMode::FallingCatcher, 1);
        session
    }

    fn drop_at(mode: &mut CatcherMode, pos: Vec2, good: bool) {
        mode.drops.spawn(|id| {
            Entity::square(id, EntityKind::Drop { good }, pos, DROP_SIZE).with_velocity(Vec2::new(0.0, 3.0))
        });
    }

    #[test]
    fn test_missed_good_drop_costs_one_life() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(300.0, 200.0));
        let mut mode = CatcherMode::start(&mut ctx);
        let motion = GameMode::FallingCatcher.config().motion;
        drop_at(&mut mode, Vec2::new(0.0, 195.0), true);
        for _ in 0..30 {
            mode.on_frame(1.0, motion, CollisionRule::RectOverlap, &mut ctx);
        }
        assert_eq!(ctx.session.lives, Some(2));
        assert!(mode.drops.is_empty());
    }

    #[test]
    fn test_caught_drop_is_removed() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(300.0, 200.0));
        let mut mode = CatcherMode::start(&mut ctx);
        let motion = GameMode::FallingCatcher.config().motion;
        let over = Vec2::new(mode.player.x + 10.0, mode.player.y - 12.0);
        drop_at(&mut mode, over, true);
        drop_at(&mut mode, over + Vec2::new(20.0, 0.0), false);
        mode.on_frame(1.0, motion, CollisionRule::RectOverlap, &mut ctx);
        assert!(mode.drops.is_empty());
        assert_eq!(ctx.session.score, 1);
        assert_eq!(ctx.session.lives, Some(2));
    }

    #[test]
    fn test_three_bad_catches_end_session() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(300.0, 200.0));
        let mut mode = CatcherMode::start(&mut ctx);
        let motion = GameMode::FallingCatcher.config().motion;
        for i in 0..3 {
            let pos = Vec2::new(mode.player.x + i as f32 * 15.0, mode.player.y - 12.0);
            drop_at(&mut mode, pos, false);
        }
        mode.on_frame(1.0, motion, CollisionRule::RectOverlap, &mut ctx);
        assert!(ctx.has_ended());
    }
}
