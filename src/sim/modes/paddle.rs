//! Paddle bounce: keep the ball above the floor

use glam::Vec2;

use super::SessionCtx;
use crate::audio::SoundEffect;
use crate::sim::collision::{CollisionOutcome, CollisionRule};
use crate::sim::geom::Rect;
use crate::sim::input::HeldKeys;
use crate::sim::motion::{Contact, MotionModel};

pub const BALL_RADIUS: f32 = 8.0;
pub const BALL_VELOCITY: Vec2 = Vec2::new(2.5, -2.3);
pub const PADDLE_WIDTH: f32 = 90.0;
pub const PADDLE_HEIGHT: f32 = 14.0;
pub const PADDLE_SPEED: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct PaddleMode {
    /// Ball centre
    pub ball: Vec2,
    /// Per-frame ball velocity before the motion model's speed factor
    pub vel: Vec2,
    /// Player paddle; only its x changes
    pub paddle: Rect,
    /// Left/right steering
    pub keys: HeldKeys,
}

impl PaddleMode {
    pub fn start(ctx: &mut SessionCtx<'_>) -> Self {
        let b = ctx.bounds;
        Self {
            ball: b.center(),
            vel: BALL_VELOCITY,
            paddle: Rect::new(b.width / 2.0 - PADDLE_WIDTH / 2.0, b.height - 20.0, PADDLE_WIDTH, PADDLE_HEIGHT),
            keys: HeldKeys::default(),
        }
    }

    /// The ball's lowest point, tested against the paddle
    pub fn leading_edge(&self) -> Vec2 {
        Vec2::new(self.ball.x, self.ball.y + BALL_RADIUS)
    }

    pub fn on_frame(&mut self, frames: f32, motion: MotionModel, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        let b = ctx.bounds;
        self.paddle.x = (self.paddle.x + self.keys.axis() * PADDLE_SPEED * frames)
            .clamp(0.0, (b.width - self.paddle.w).max(0.0));

        let r = Vec2::splat(BALL_RADIUS);
        let mut body = self.ball - r;
        let contact = motion.move_box(&mut body, &mut self.vel, r * 2.0, frames, &b);
        self.ball = body + r;

        if self.vel.y > 0.0 && rule.contains_point(&self.paddle, self.leading_edge()) {
            self.vel.y = -self.vel.y.abs();
            self.ball.y = self.paddle.y - BALL_RADIUS;
            ctx.play(SoundEffect::ButtonPop);
            ctx.apply(CollisionOutcome::scored(None, 1));
            return;
        }

        if contact == Contact::Exited {
            ctx.apply(CollisionOutcome::ended(None));
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
        let mut session = GameSession::idle(GameMode::PaddleBounce);
        session.start(GameMode::PaddleBounce, 1);
        session
    }

    fn frame(mode: &mut PaddleMode, frames: f32, ctx: &mut SessionCtx<'_>) {
        let config = GameMode::PaddleBounce.config();
        let rule = config.collision.unwrap_or(CollisionRule::PointInRect);
        mode.on_frame(frames, config.motion, rule, ctx);
    }

    #[test]
    fn test_paddle_returns_ball() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(300.0, 200.0));
        let mut mode = PaddleMode::start(&mut ctx);
        mode.ball = Vec2::new(mode.paddle.center().x, mode.paddle.y - 9.0);
        mode.vel = Vec2::new(0.0, 3.0);
        frame(&mut mode, 1.0, &mut ctx);
        assert!(mode.vel.y < 0.0);
        assert_eq!(mode.ball.y, mode.paddle.y - BALL_RADIUS);
        assert_eq!(ctx.session.score, 1);
    }

    #[test]
    fn test_missed_ball_ends_session() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(300.0, 200.0));
        let mut mode = PaddleMode::start(&mut ctx);
        mode.ball = Vec2::new(10.0, 150.0);
        mode.vel = Vec2::new(0.0, 5.0);
        for _ in 0..20 {
            frame(&mut mode, 1.0, &mut ctx);
        }
        assert!(ctx.has_ended());
    }

    #[test]
    fn test_ball_stays_inside_walls() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(3);
        let bounds = Bounds::new(300.0, 200.0);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, bounds);
        let mut mode = PaddleMode::start(&mut ctx);
        mode.vel = Vec2::new(40.0, -40.0);
        frame(&mut mode, 6.0, &mut ctx);
        assert!(mode.ball.x <= bounds.width - BALL_RADIUS);
        assert!(mode.ball.y >= BALL_RADIUS);
        assert!(mode.vel.x < 0.0 && mode.vel.y > 0.0);
    }

    #[test]
    fn test_ball_beside_paddle_is_not_returned() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(300.0, 200.0));
        let mut mode = PaddleMode::start(&mut ctx);
        // the ball's box grazes the paddle corner but its centre column is outside
        mode.ball = Vec2::new(mode.paddle.x - 4.0, mode.paddle.y - 6.0);
        mode.vel = Vec2::new(0.0, 2.0);
        frame(&mut mode, 1.0, &mut ctx);
        assert!(mode.vel.y > 0.0);
        assert_eq!(ctx.session.score, 0);
    }
}
