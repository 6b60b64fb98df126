//! Snake on a fixed grid, stepped by accumulated frame time

use std::collections::VecDeque;

use glam::IVec2;
use rand::Rng;

use super::SessionCtx;
use crate::audio::SoundEffect;
use crate::sim::collision::{CollisionOutcome, CollisionRule};
use crate::sim::geom::Rect;
use crate::sim::input::Key;

pub const CELL: f32 = 20.0;
pub const STEP_MS: f64 = 120.0;

/// Box of a grid cell in area pixels
pub fn cell_rect(cell: IVec2) -> Rect {
    Rect::new(cell.x as f32 * CELL, cell.y as f32 * CELL, CELL, CELL)
}

#[derive(Debug, Clone)]
pub struct SnakeMode {
    /// Head first
    pub body: VecDeque<IVec2>,
    /// Direction of the last completed move
    pub dir: IVec2,
    /// Applied at the next step
    pub pending_dir: IVec2,
    pub food: IVec2,
    /// Grid size, fixed at start
    pub cols: i32,
    pub rows: i32,
    /// Time not yet spent on whole steps
    pub elapsed_ms: f64,
}

impl SnakeMode {
    pub fn start(ctx: &mut SessionCtx<'_>) -> Self {
        let cols = ((ctx.bounds.width / CELL).floor() as i32).max(1);
        let rows = ((ctx.bounds.height / CELL).floor() as i32).max(1);
        let mut mode = Self {
            body: VecDeque::from([IVec2::new(5, 5)]),
            dir: IVec2::X,
            pending_dir: IVec2::X,
            food: IVec2::ZERO,
            cols,
            rows,
            elapsed_ms: 0.0,
        };
        mode.place_food(ctx);
        mode
    }

    /// Steer; reversing onto the last moved direction is ignored
    pub fn on_key(&mut self, key: Key) {
        let wanted = match key {
            Key::Up => IVec2::NEG_Y,
            Key::Down => IVec2::Y,
            Key::Left => IVec2::NEG_X,
            Key::Right => IVec2::X,
            _ => return,
        };
        if wanted != -self.dir {
            self.pending_dir = wanted;
        }
    }

    pub fn on_frame(&mut self, delta_ms: f64, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        self.elapsed_ms += delta_ms.clamp(0.0, f64::from(crate::consts::MAX_FRAME_DELTA_MS));
        while self.elapsed_ms >= STEP_MS {
            self.elapsed_ms -= STEP_MS;
            self.step(rule, ctx);
            if ctx.has_ended() {
                return;
            }
        }
    }

    /// Advance one cell
    pub fn step(&mut self, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        let Some(&head) = self.body.front() else {
            return;
        };
        self.dir = self.pending_dir;
        let next = head + self.dir;
        let outside = next.x < 0 || next.y < 0 || next.x >= self.cols || next.y >= self.rows;
        let head_box = cell_rect(next);
        let bitten = self.body.iter().any(|&c| rule.hits_box(&head_box, &cell_rect(c)));
        if outside || bitten {
            ctx.apply(CollisionOutcome::ended(None));
            return;
        }

        self.body.push_front(next);
        if rule.hits_box(&head_box, &cell_rect(self.food)) {
            ctx.play(SoundEffect::ButtonPop);
            ctx.apply(CollisionOutcome::scored(None, 1));
            self.place_food(ctx);
        } else {
            self.body.pop_back();
        }
    }

    /// Drop food on a random cell the snake does not occupy
    fn place_food(&mut self, ctx: &mut SessionCtx<'_>) {
        let free: Vec<IVec2> = (0..self.rows)
            .flat_map(|y| (0..self.cols).map(move |x| IVec2::new(x, y)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        if free.is_empty() {
            return;
        }
        self.food = free[ctx.rng.random_range(0..free.len())];
    }

    pub fn clear(&mut self) {
        self.body.clear();
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
        let mut session = GameSession::idle(GameMode::Snake);
        session.start(GameMode::Snake, 1);
        session
    }

    #[test]
    fn test_quick_double_turn_cannot_reverse() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(400.0, 400.0));
        let mut snake = SnakeMode::start(&mut ctx);
        snake.body = VecDeque::from([IVec2::new(5, 5), IVec2::new(4, 5), IVec2::new(3, 5)]);
        snake.food = IVec2::new(19, 19);

        // Up then Left before the next step: Left reverses the last move, so Up stands
        snake.on_key(Key::Up);
        snake.on_key(Key::Left);
        snake.step(CollisionRule::GridCell, &mut ctx);
        assert_eq!(snake.body.front(), Some(&IVec2::new(5, 4)));
        assert!(!ctx.has_ended());
    }

    #[test]
    fn test_eating_grows() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(400.0, 400.0));
        let mut snake = SnakeMode::start(&mut ctx);
        snake.food = IVec2::new(6, 5);
        snake.step(CollisionRule::GridCell, &mut ctx);
        assert_eq!(snake.body.len(), 2);
        assert_eq!(ctx.session.score, 1);
        assert!(!snake.body.contains(&snake.food));
    }

    #[test]
    fn test_wall_ends_session() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(140.0, 140.0));
        let mut snake = SnakeMode::start(&mut ctx);
        snake.food = IVec2::new(0, 0);
        snake.step(CollisionRule::GridCell, &mut ctx);
        assert!(!ctx.has_ended());
        snake.step(CollisionRule::GridCell, &mut ctx);
        assert!(ctx.has_ended());
    }

    #[test]
    fn test_steps_follow_elapsed_time() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(400.0, 400.0));
        let mut snake = SnakeMode::start(&mut ctx);
        snake.food = IVec2::new(0, 19);
        for _ in 0..15 {
            snake.on_frame(16.0, CollisionRule::GridCell, &mut ctx);
        }
        // 240 ms elapsed: two steps
        assert_eq!(snake.body.front(), Some(&IVec2::new(7, 5)));
    }

    #[test]
    fn test_running_into_tail_ends_session() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(400.0, 400.0));
        let mut snake = SnakeMode::start(&mut ctx);
        snake.body = VecDeque::from([
            IVec2::new(5, 5),
            IVec2::new(5, 6),
            IVec2::new(6, 6),
            IVec2::new(6, 5),
            IVec2::new(6, 4),
        ]);
        snake.food = IVec2::new(19, 19);
        snake.dir = IVec2::NEG_Y;
        snake.on_key(Key::Right);
        snake.step(CollisionRule::GridCell, &mut ctx);
        assert!(ctx.has_ended());
    }
}
