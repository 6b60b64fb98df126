//! Stacker: drop a sliding block onto the stack, keeping only the overlap

use glam::Vec2;

use super::{ModeConfig, SessionCtx};
use crate::sim::collision::{CollisionOutcome, interval_overlap};
use crate::sim::geom::Span;
use crate::sim::motion::{MotionModel, bounded_bounce};

pub const BLOCK_HEIGHT: f32 = 24.0;
pub const BASE_WIDTH: f32 = 160.0;
pub const START_SPEED: f32 = 2.2;
pub const SPEED_STEP: f32 = 0.08;

/// A settled block; the first one is the base
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackBlock {
    /// Horizontal extent after slicing
    pub span: Span,
    pub hue: f32,
}

/// The block sliding above the stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingBlock {
    /// Left edge
    pub x: f32,
    /// Width of the block below it when it was placed
    pub width: f32,
    /// `1.0` sliding right, `-1.0` sliding left
    pub dir: f32,
    pub hue: f32,
}

impl MovingBlock {
    pub fn span(&self) -> Span {
        Span::from_origin(self.x, self.width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropResult {
    /// Settled with this overlap
    Landed(Span),
    Missed,
    /// Nothing was sliding
    Ignored,
}

#[derive(Debug, Clone)]
pub struct StackerMode {
    /// Bottom to top
    pub stack: Vec<StackBlock>,
    /// None once a miss has ended the session
    pub current: Option<MovingBlock>,
    /// Slide pixels per frame; starts at the configured bounce speed
    pub speed: f32,
}

impl StackerMode {
    pub fn start(config: &ModeConfig, ctx: &mut SessionCtx<'_>) -> Self {
        let speed = match config.motion {
            MotionModel::BoundedBounce { speed } => speed,
            _ => START_SPEED,
        };
        let base = Span::from_origin(ctx.bounds.width / 2.0 - BASE_WIDTH / 2.0, BASE_WIDTH);
        let hue = ctx.random(0.0, 360.0);
        Self {
            stack: vec![StackBlock { span: base, hue }],
            current: Some(MovingBlock {
                x: 0.0,
                width: BASE_WIDTH,
                dir: 1.0,
                hue: (hue + 30.0) % 360.0,
            }),
            speed,
        }
    }

    /// Slide the current block, reversing at either wall
    pub fn on_frame(&mut self, frames: f32, ctx: &mut SessionCtx<'_>) {
        let bounds = ctx.bounds;
        let Some(block) = self.current.as_mut() else {
            return;
        };
        // a zero-height box so only the side walls reflect
        let mut pos = Vec2::new(block.x, 0.0);
        let mut vel = Vec2::new(block.dir, 0.0);
        bounded_bounce(&mut pos, &mut vel, Vec2::new(block.width, 0.0), self.speed, frames, &bounds);
        block.x = pos.x;
        block.dir = vel.x.signum();
    }

    /// Drop the current block; a miss ends the session
    pub fn drop(&mut self, ctx: &mut SessionCtx<'_>) -> DropResult {
        let (Some(block), Some(top)) = (self.current, self.stack.last().copied()) else {
            return DropResult::Ignored;
        };

        let Some(overlap) = interval_overlap(block.span(), top.span) else {
            self.current = None;
            ctx.apply(CollisionOutcome::ended(None));
            return DropResult::Missed;
        };

        self.stack.push(StackBlock {
            span: overlap,
            hue: block.hue,
        });
        self.speed += SPEED_STEP;
        // score is stack height above the base
        ctx.apply(CollisionOutcome::scored(None, 1));
        self.current = Some(MovingBlock {
            x: 0.0,
            width: overlap.len(),
            dir: 1.0,
            hue: (block.hue + 30.0) % 360.0,
        });
        DropResult::Landed(overlap)
    }

    pub fn clear(&mut self) {
        self.stack.clear();
        self.current = None;
    }

    pub fn height(&self) -> usize {
        self.stack.len()
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
        let mut session = GameSession::idle(GameMode::Stacker);
        session.start(GameMode::Stacker, 1);
        session
    }

    #[test]
    fn test_drop_keeps_overlap() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(480.0, 360.0));
        let mut mode = StackerMode::start(&GameMode::Stacker.config(), &mut ctx);
        mode.stack = vec![StackBlock {
            span: Span::new(100.0, 260.0),
            hue: 0.0,
        }];
        mode.current = Some(MovingBlock {
            x: 150.0,
            width: 160.0,
            dir: 1.0,
            hue: 30.0,
        });

        assert_eq!(mode.drop(&mut ctx), DropResult::Landed(Span::new(150.0, 260.0)));
        assert_eq!(mode.height(), 2);
        assert_eq!(mode.current.map(|b| b.width), Some(110.0));
        assert_eq!(ctx.session.score, 1);
        assert!((mode.speed - (START_SPEED + SPEED_STEP)).abs() < 1e-6);
    }

    #[test]
    fn test_miss_ends_session() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(480.0, 360.0));
        let mut mode = StackerMode::start(&GameMode::Stacker.config(), &mut ctx);
        mode.current = Some(MovingBlock {
            x: 0.0,
            width: 50.0,
            dir: 1.0,
            hue: 0.0,
        });
        assert_eq!(mode.drop(&mut ctx), DropResult::Missed);
        assert!(ctx.has_ended());
        assert_eq!(mode.drop(&mut ctx), DropResult::Ignored);
    }

    #[test]
    fn test_mover_reverses_at_walls() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(200.0, 360.0));
        let mut mode = StackerMode::start(&GameMode::Stacker.config(), &mut ctx);
        // 2.2 per frame reaches the right wall (40) on frame 19
        for _ in 0..19 {
            mode.on_frame(1.0, &mut ctx);
        }
        let Some(block) = mode.current else {
            panic!("no moving block");
        };
        assert_eq!(block.x, 40.0);
        assert_eq!(block.dir, -1.0);
    }

    #[test]
    fn test_slide_speed_follows_config() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(480.0, 360.0));
        let mut config = GameMode::Stacker.config();
        assert_eq!(config.motion, MotionModel::BoundedBounce { speed: START_SPEED });
        config.motion = MotionModel::BoundedBounce { speed: 5.0 };
        let mut mode = StackerMode::start(&config, &mut ctx);
        mode.on_frame(2.0, &mut ctx);
        assert_eq!(mode.current.map(|b| b.x), Some(10.0));
    }
}
