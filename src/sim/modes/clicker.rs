//! Click-to-score modes: pop sprint, catch, whack and target chase
//!
//! All four share one pool of targets, one hit test and one scoring rule
//! (+1 per consumed target); they differ in spawn shape and motion.

use glam::Vec2;

use super::{ModeConfig, SessionCtx};
use crate::audio::SoundEffect;
use crate::sim::collision::{CollisionOutcome, CollisionRule, consume_top_hit};
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::motion::{Contact, MotionModel};
use crate::sim::pool::EntityPool;

/// Pop sprint targets vanish after this long
pub const POP_LIFETIME_MS: f32 = 1800.0;
/// Whack keeps at most this many targets on screen
pub const WHACK_CAP: usize = 12;
pub const CHASE_SIZE: f32 = 28.0;

/// Which of the four click modes a [`ClickerMode`] plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickerKind {
    Pop,
    Catch,
    Whack,
    Chase,
}

impl ClickerKind {
    fn size_range(&self) -> (f32, f32) {
        match self {
            ClickerKind::Pop => (50.0, 70.0),
            ClickerKind::Catch => (45.0, 65.0),
            ClickerKind::Whack => (30.0, 60.0),
            ClickerKind::Chase => (CHASE_SIZE, CHASE_SIZE),
        }
    }

    /// Per-axis velocity spread, `(rand - 0.5) * spread`
    fn velocity_spread(&self) -> f32 {
        match self {
            ClickerKind::Catch => 2.2,
            ClickerKind::Chase => 3.0,
            ClickerKind::Pop | ClickerKind::Whack => 0.0,
        }
    }

    fn capacity(&self) -> usize {
        match self {
            ClickerKind::Whack => WHACK_CAP,
            ClickerKind::Chase => 1,
            ClickerKind::Pop | ClickerKind::Catch => usize::MAX,
        }
    }

    fn entity_kind(&self) -> EntityKind {
        match self {
            ClickerKind::Chase => EntityKind::Target,
            _ => EntityKind::Bubble,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClickerMode {
    pub kind: ClickerKind,
    /// Clickable targets; capped per kind
    pub pool: EntityPool<Entity>,
}

impl ClickerMode {
    pub fn start(kind: ClickerKind, _config: &ModeConfig, ctx: &mut SessionCtx<'_>) -> Self {
        let mut mode = Self {
            kind,
            pool: EntityPool::with_capacity(kind.capacity()),
        };
        mode.spawn(ctx);
        mode
    }

    /// Spawn one target at a random in-bounds position; skipped at capacity
    pub fn spawn(&mut self, ctx: &mut SessionCtx<'_>) {
        let (min, max) = self.kind.size_range();
        let size = ctx.random(min, max);
        let x = ctx.random(0.0, (ctx.bounds.width - size).max(0.0));
        let y = ctx.random(0.0, (ctx.bounds.height - size).max(0.0));
        let spread = self.kind.velocity_spread();
        let vel = Vec2::new(
            (ctx.random(0.0, 1.0) - 0.5) * spread,
            (ctx.random(0.0, 1.0) - 0.5) * spread,
        );
        let kind = self.kind.entity_kind();
        if self
            .pool
            .spawn(|id| Entity::square(id, kind, Vec2::new(x, y), size).with_velocity(vel))
            .is_none()
        {
            log::trace!("{:?} spawn skipped at capacity {}", self.kind, self.pool.capacity());
        }
    }

    pub fn on_frame(&mut self, frames: f32, delta_ms: f64, motion: MotionModel, ctx: &mut SessionCtx<'_>) {
        let bounds = ctx.bounds;
        let lifetime = matches!(self.kind, ClickerKind::Pop).then_some(POP_LIFETIME_MS);
        self.pool.for_each_alive(|e| {
            e.age_ms += delta_ms as f32;
            if motion.step(e, frames, &bounds) == Contact::Exited {
                e.kill();
            }
            if lifetime.is_some_and(|limit| e.age_ms >= limit) {
                e.kill();
            }
        });
        self.pool.remove_where(Entity::is_dead);
    }

    /// Consume at most one target under `pos`
    pub fn on_press(&mut self, pos: Vec2, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        let Some(hit) = consume_top_hit(&mut self.pool, rule, pos) else {
            return;
        };
        ctx.play(SoundEffect::ButtonPop);
        ctx.apply(CollisionOutcome::scored(Some(hit.id), 1));
        if self.kind == ClickerKind::Chase && !ctx.has_ended() {
            self.spawn(ctx);
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

    fn running(mode: GameMode) -> GameSession {
        let mut session = GameSession::idle(mode);
        session.start(mode, 1);
        session
    }

    #[test]
    fn test_overlapping_targets_consume_one() {
        let mut session = running(GameMode::PopSprint);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(480.0, 360.0));
        let mut mode = ClickerMode {
            kind: ClickerKind::Pop,
            pool: EntityPool::unbounded(),
        };
        mode.pool.spawn(|id| Entity::square(id, EntityKind::Bubble, Vec2::new(100.0, 100.0), 60.0));
        mode.pool.spawn(|id| Entity::square(id, EntityKind::Bubble, Vec2::new(110.0, 110.0), 60.0));

        mode.on_press(Vec2::new(135.0, 135.0), CollisionRule::PointInCircle, &mut ctx);
        assert_eq!(ctx.session.score, 1);
        // the newer bubble is drawn on top, so it is the one popped
        let left: Vec<_> = mode.pool.iter().map(|e| e.id).collect();
        assert_eq!(left, vec![crate::sim::pool::EntityId(1)]);
    }

    #[test]
    fn test_pop_targets_expire() {
        let mut session = running(GameMode::PopSprint);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(480.0, 360.0));
        let config = GameMode::PopSprint.config();
        let mut mode = ClickerMode::start(ClickerKind::Pop, &config, &mut ctx);
        assert_eq!(mode.pool.len(), 1);
        for _ in 0..19 {
            mode.on_frame(1.0, 100.0, config.motion, &mut ctx);
        }
        assert_eq!(mode.pool.len(), 0);
    }

    #[test]
    fn test_whack_skips_spawn_at_cap() {
        let mut session = running(GameMode::Whack);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(480.0, 360.0));
        let config = GameMode::Whack.config();
        let mut mode = ClickerMode::start(ClickerKind::Whack, &config, &mut ctx);
        for _ in 0..20 {
            mode.spawn(&mut ctx);
        }
        assert_eq!(mode.pool.len(), WHACK_CAP);
    }

    #[test]
    fn test_chase_respawns_and_stays_in_bounds() {
        let mut session = running(GameMode::TargetChase);
        let mut rng = Pcg32::seed_from_u64(6);
        let bounds = Bounds::new(200.0, 150.0);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, bounds);
        let config = GameMode::TargetChase.config();
        let mut mode = ClickerMode::start(ClickerKind::Chase, &config, &mut ctx);

        for _ in 0..500 {
            mode.on_frame(1.0, 16.0, config.motion, &mut ctx);
        }
        let target = mode.pool.iter().next().map(Entity::rect);
        let Some(rect) = target else {
            panic!("chase target missing");
        };
        assert!(rect.x >= 0.0 && rect.right() <= bounds.width);
        assert!(rect.y >= 0.0 && rect.bottom() <= bounds.height);

        mode.on_press(rect.center(), CollisionRule::PointInRect, &mut ctx);
        assert_eq!(ctx.session.score, 1);
        assert_eq!(mode.pool.len(), 1);
    }
}
