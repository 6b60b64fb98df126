//! Mini-game adapters
//!
//! Each mode is a configuration ([`ModeConfig`]: clock, spawn cadence, motion
//! model, collision rule) plus a small state value. The engine owns timers
//! and lifecycle; adapters only react to frames, timer ticks and input, and
//! talk back through [`SessionCtx`].

pub mod catcher;
pub mod clicker;
pub mod dodger;
pub mod flappy;
pub mod memory;
pub mod paddle;
pub mod precision;
pub mod runner;
pub mod snake;
pub mod stacker;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionOutcome, CollisionRule};
use super::geom::Bounds;
use super::input::Key;
use super::motion::MotionModel;
use super::session::{Clock, Flow, GameSession};
use crate::audio::{SoundEffect, SoundSink};
use crate::consts::COUNTDOWN_PERIOD_MS;

pub use catcher::CatcherMode;
pub use clicker::{ClickerKind, ClickerMode};
pub use dodger::DodgerMode;
pub use flappy::FlappyMode;
pub use memory::{Card, MemoryMode};
pub use paddle::PaddleMode;
pub use precision::{PrecisionMode, precision_points};
pub use runner::RunnerMode;
pub use snake::SnakeMode;
pub use stacker::{DropResult, StackerMode};

/// Every selectable mini-game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    PopSprint,
    Precision,
    Catch,
    Whack,
    TargetChase,
    Stacker,
    Snake,
    Flappy,
    Runner,
    Dodger,
    PaddleBounce,
    FallingCatcher,
    MemoryMatch,
}

impl GameMode {
    pub const ALL: [GameMode; 13] = [
        GameMode::PopSprint,
        GameMode::Precision,
        GameMode::Catch,
        GameMode::Whack,
        GameMode::TargetChase,
        GameMode::Stacker,
        GameMode::Snake,
        GameMode::Flappy,
        GameMode::Runner,
        GameMode::Dodger,
        GameMode::PaddleBounce,
        GameMode::FallingCatcher,
        GameMode::MemoryMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::PopSprint => "pop",
            GameMode::Precision => "precision",
            GameMode::Catch => "catch",
            GameMode::Whack => "whack",
            GameMode::TargetChase => "chase",
            GameMode::Stacker => "stack",
            GameMode::Snake => "snake",
            GameMode::Flappy => "flappy",
            GameMode::Runner => "runner",
            GameMode::Dodger => "dodger",
            GameMode::PaddleBounce => "paddle",
            GameMode::FallingCatcher => "catcher",
            GameMode::MemoryMatch => "memory",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pop" | "pop-sprint" => Some(GameMode::PopSprint),
            "precision" => Some(GameMode::Precision),
            "catch" => Some(GameMode::Catch),
            "whack" => Some(GameMode::Whack),
            "chase" | "target-chase" => Some(GameMode::TargetChase),
            "stack" | "stacker" => Some(GameMode::Stacker),
            "snake" => Some(GameMode::Snake),
            "flappy" => Some(GameMode::Flappy),
            "runner" | "dino" => Some(GameMode::Runner),
            "dodger" => Some(GameMode::Dodger),
            "paddle" => Some(GameMode::PaddleBounce),
            "catcher" => Some(GameMode::FallingCatcher),
            "memory" => Some(GameMode::MemoryMatch),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameMode::PopSprint => "Click the bubbles before they fade. 20 seconds to set a high score.",
            GameMode::Precision => {
                "Hold to grow a bubble to the target size. Release close to target for points. Five rounds."
            }
            GameMode::Catch => "Catch moving bubbles in 20 seconds. They bounce around, tap fast.",
            GameMode::Whack => "Whack fading bubbles for 30 seconds.",
            GameMode::TargetChase => "Click the drifting target as often as you can in 20 seconds.",
            GameMode::Stacker => "Drop each block onto the stack. Overhangs are sliced off.",
            GameMode::Snake => "Eat, grow, and stay off the walls and your own tail.",
            GameMode::Flappy => "Flap through the gaps between pipes.",
            GameMode::Runner => "Jump over the obstacles.",
            GameMode::Dodger => "Dodge the falling blocks.",
            GameMode::PaddleBounce => "Keep the ball in play with the paddle.",
            GameMode::FallingCatcher => "Catch the good drops, avoid the red ones. Three lives.",
            GameMode::MemoryMatch => "Find all pairs.",
        }
    }

    pub fn config(&self) -> ModeConfig {
        use CollisionRule::*;
        use MotionModel::*;
        let (clock, lives, spawn_every_ms, motion, collision) = match self {
            GameMode::PopSprint => (Some(Clock::Seconds(20)), None, Some(420.0), Static, Some(PointInCircle)),
            GameMode::Precision => (Some(Clock::Rounds(5)), None, None, Static, None),
            GameMode::Catch => (
                Some(Clock::Seconds(20)),
                None,
                Some(600.0),
                BoundedBounce { speed: 2.0 },
                Some(PointInCircle),
            ),
            GameMode::Whack => (
                Some(Clock::Seconds(30)),
                None,
                Some(600.0),
                Fade { rate: 0.01 },
                Some(PointInCircle),
            ),
            GameMode::TargetChase => (
                Some(Clock::Seconds(20)),
                None,
                None,
                BoundedBounce { speed: 1.0 },
                Some(PointInRect),
            ),
            GameMode::Stacker => (
                None,
                None,
                None,
                BoundedBounce {
                    speed: stacker::START_SPEED,
                },
                Some(IntervalOverlap),
            ),
            GameMode::Snake => (None, None, None, Static, Some(GridCell)),
            GameMode::Flappy => (None, None, Some(1300.0), LinearFall { exit_margin: 0.0 }, Some(RectOverlap)),
            GameMode::Runner => (None, None, Some(900.0), LinearFall { exit_margin: 0.0 }, Some(RectOverlap)),
            GameMode::Dodger => (None, None, Some(700.0), LinearFall { exit_margin: 50.0 }, Some(RectOverlap)),
            // the ball's leading edge against the paddle box
            GameMode::PaddleBounce => (None, None, None, Rebound { speed: 1.0 }, Some(PointInRect)),
            GameMode::FallingCatcher => (
                None,
                Some(3),
                Some(700.0),
                LinearFall { exit_margin: 20.0 },
                Some(RectOverlap),
            ),
            GameMode::MemoryMatch => (None, None, None, Static, Some(PointInRect)),
        };
        ModeConfig {
            clock,
            lives,
            spawn_every_ms,
            motion,
            collision,
        }
    }
}

/// Static configuration of a mode; the adapter reads every field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Countdown seconds or round count; None runs until a loss
    pub clock: Option<Clock>,
    /// Starting lives for modes that use them
    pub lives: Option<u32>,
    /// Period of the spawn interval
    pub spawn_every_ms: Option<f64>,
    /// How the mode's moving bodies advance each frame
    pub motion: MotionModel,
    /// Contact and hit test; None for modes without one (precision)
    pub collision: Option<CollisionRule>,
}

impl ModeConfig {
    /// The declared rule, or box overlap when the mode names none
    pub fn rule(&self) -> CollisionRule {
        self.collision.unwrap_or(CollisionRule::RectOverlap)
    }
}

/// Timers a session can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionTimer {
    Frame,
    Countdown,
    Spawn,
    Grow,
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerRequest {
    Frame,
    Interval { period_ms: f64 },
    Timeout { delay_ms: f64 },
}

/// Per-call context handed to adapters
pub struct SessionCtx<'a> {
    pub session: &'a mut GameSession,
    /// Session stream, seeded per start
    pub rng: &'a mut Pcg32,
    pub sound: &'a dyn SoundSink,
    /// Game area size
    pub bounds: Bounds,
    pub(crate) starts: Vec<(SessionTimer, TimerRequest)>,
    pub(crate) stops: Vec<SessionTimer>,
    ended: bool,
}

impl<'a> SessionCtx<'a> {
    pub fn new(
        session: &'a mut GameSession,
        rng: &'a mut Pcg32,
        sound: &'a dyn SoundSink,
        bounds: Bounds,
    ) -> Self {
        Self {
            session,
            rng,
            sound,
            bounds,
            starts: Vec::new(),
            stops: Vec::new(),
            ended: false,
        }
    }

    pub fn start_interval(&mut self, timer: SessionTimer, period_ms: f64) {
        self.starts.push((timer, TimerRequest::Interval { period_ms }));
    }

    pub fn start_timeout(&mut self, timer: SessionTimer, delay_ms: f64) {
        self.starts.push((timer, TimerRequest::Timeout { delay_ms }));
    }

    pub fn stop_timer(&mut self, timer: SessionTimer) {
        self.starts.retain(|(t, _)| *t != timer);
        self.stops.push(timer);
    }

    /// Request the transition to Ended
    pub fn end(&mut self) {
        self.ended = true;
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn follow(&mut self, flow: Flow) {
        if flow == Flow::End {
            self.end();
        }
    }

    pub fn apply(&mut self, outcome: CollisionOutcome) {
        let flow = self.session.apply(&outcome);
        self.follow(flow);
    }

    pub fn play(&self, effect: SoundEffect) {
        self.sound.play(effect);
    }

    /// Uniform sample in `[min, max)`; `min` for empty ranges
    pub fn random(&mut self, min: f32, max: f32) -> f32 {
        crate::random_between(&mut *self.rng, min, max)
    }

    /// Release the borrows and hand back what the adapter asked for
    pub(crate) fn into_requests(self) -> TimerRequests {
        TimerRequests {
            starts: self.starts,
            stops: self.stops,
            ended: self.ended,
        }
    }
}

/// Timer changes collected during one adapter call; stops apply before starts
#[derive(Debug, Default)]
pub(crate) struct TimerRequests {
    pub starts: Vec<(SessionTimer, TimerRequest)>,
    pub stops: Vec<SessionTimer>,
    pub ended: bool,
}

/// Input delivered to the active session (area-local coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameInput {
    PressStart(Vec2),
    PressEnd(Vec2),
    Move(Vec2),
    KeyDown(Key),
    KeyUp(Key),
}

/// Mode-specific state
#[derive(Debug, Clone)]
pub enum ModeState {
    Clicker(ClickerMode),
    Precision(PrecisionMode),
    Stacker(StackerMode),
    Snake(SnakeMode),
    Flappy(FlappyMode),
    Runner(RunnerMode),
    Dodger(DodgerMode),
    Paddle(PaddleMode),
    Catcher(CatcherMode),
    Memory(MemoryMode),
}

/// One parameterized adapter: config + state
#[derive(Debug, Clone)]
pub struct GameModeAdapter {
    pub mode: GameMode,
    /// Copied from [`GameMode::config`] at start
    pub config: ModeConfig,
    pub state: ModeState,
}

impl GameModeAdapter {
    /// Build the mode's initial state and request its standing timers
    pub fn start(mode: GameMode, ctx: &mut SessionCtx<'_>) -> Self {
        let config = mode.config();
        ctx.starts.push((SessionTimer::Frame, TimerRequest::Frame));
        if let Some(Clock::Seconds(_)) = config.clock {
            ctx.start_interval(SessionTimer::Countdown, COUNTDOWN_PERIOD_MS);
        }
        if let Some(period_ms) = config.spawn_every_ms {
            ctx.start_interval(SessionTimer::Spawn, period_ms);
        }

        let state = match mode {
            GameMode::PopSprint => ModeState::Clicker(ClickerMode::start(ClickerKind::Pop, &config, ctx)),
            GameMode::Catch => ModeState::Clicker(ClickerMode::start(ClickerKind::Catch, &config, ctx)),
            GameMode::Whack => ModeState::Clicker(ClickerMode::start(ClickerKind::Whack, &config, ctx)),
            GameMode::TargetChase => {
                ModeState::Clicker(ClickerMode::start(ClickerKind::Chase, &config, ctx))
            }
            GameMode::Precision => ModeState::Precision(PrecisionMode::start(ctx)),
            GameMode::Stacker => ModeState::Stacker(StackerMode::start(&config, ctx)),
            GameMode::Snake => ModeState::Snake(SnakeMode::start(ctx)),
            GameMode::Flappy => ModeState::Flappy(FlappyMode::start(ctx)),
            GameMode::Runner => ModeState::Runner(RunnerMode::start(ctx)),
            GameMode::Dodger => ModeState::Dodger(DodgerMode::start(ctx)),
            GameMode::PaddleBounce => ModeState::Paddle(PaddleMode::start(ctx)),
            GameMode::FallingCatcher => ModeState::Catcher(CatcherMode::start(ctx)),
            GameMode::MemoryMatch => ModeState::Memory(MemoryMode::start(ctx)),
        };

        Self { mode, config, state }
    }

    /// Per-frame update: motion, then collision, then score/lifecycle
    pub fn on_frame(&mut self, delta_ms: f64, ctx: &mut SessionCtx<'_>) {
        let frames = crate::frame_scale(delta_ms);
        let motion = self.config.motion;
        let rule = self.config.rule();
        match &mut self.state {
            ModeState::Clicker(m) => m.on_frame(frames, delta_ms, motion, ctx),
            ModeState::Precision(_) | ModeState::Memory(_) => {}
            ModeState::Stacker(m) => m.on_frame(frames, ctx),
            ModeState::Snake(m) => m.on_frame(delta_ms, rule, ctx),
            ModeState::Flappy(m) => m.on_frame(frames, motion, rule, ctx),
            ModeState::Runner(m) => m.on_frame(frames, motion, rule, ctx),
            ModeState::Dodger(m) => m.on_frame(frames, motion, rule, ctx),
            ModeState::Paddle(m) => m.on_frame(frames, motion, rule, ctx),
            ModeState::Catcher(m) => m.on_frame(frames, motion, rule, ctx),
        }
    }

    /// Spawn/grow/reveal ticks; countdown ticks are the engine's
    pub fn on_timer(&mut self, timer: SessionTimer, ctx: &mut SessionCtx<'_>) {
        match (&mut self.state, timer) {
            (ModeState::Clicker(m), SessionTimer::Spawn) => m.spawn(ctx),
            (ModeState::Flappy(m), SessionTimer::Spawn) => m.spawn_pipe(ctx),
            (ModeState::Runner(m), SessionTimer::Spawn) => m.spawn_obstacle(ctx),
            (ModeState::Dodger(m), SessionTimer::Spawn) => m.spawn_block(ctx),
            (ModeState::Catcher(m), SessionTimer::Spawn) => m.spawn_drop(ctx),
            (ModeState::Precision(m), SessionTimer::Grow) => m.on_grow_tick(ctx),
            (ModeState::Memory(m), SessionTimer::Reveal) => m.on_reveal_timeout(),
            (_, other) => log::debug!("{:?} ignores {:?} tick", self.mode, other),
        }
    }

    pub fn on_input(&mut self, input: GameInput, ctx: &mut SessionCtx<'_>) {
        let rule = self.config.rule();
        match &mut self.state {
            ModeState::Clicker(m) => {
                if let GameInput::PressStart(pos) = input {
                    m.on_press(pos, rule, ctx);
                }
            }
            ModeState::Precision(m) => match input {
                GameInput::PressStart(pos) => m.on_press(pos, ctx),
                GameInput::PressEnd(_) => m.on_release(ctx),
                _ => {}
            },
            ModeState::Stacker(m) => match input {
                GameInput::PressStart(_) | GameInput::KeyDown(Key::Space) => {
                    ctx.play(SoundEffect::ButtonPop);
                    m.drop(ctx);
                }
                _ => {}
            },
            ModeState::Snake(m) => {
                if let GameInput::KeyDown(key) = input {
                    m.on_key(key);
                }
            }
            ModeState::Flappy(m) => match input {
                GameInput::PressStart(_) | GameInput::KeyDown(Key::Space) => m.flap(ctx),
                _ => {}
            },
            ModeState::Runner(m) => match input {
                GameInput::PressStart(_) | GameInput::KeyDown(Key::Space) => m.jump(),
                _ => {}
            },
            ModeState::Dodger(m) => m.keys.apply(&input),
            ModeState::Paddle(m) => m.keys.apply(&input),
            ModeState::Catcher(m) => m.keys.apply(&input),
            ModeState::Memory(m) => {
                if let GameInput::PressStart(pos) = input {
                    m.on_press(pos, rule, ctx);
                }
            }
        }
    }

    /// Drop every session-owned entity
    pub fn clear(&mut self) {
        match &mut self.state {
            ModeState::Clicker(m) => m.pool.clear(),
            ModeState::Precision(m) => m.current = None,
            ModeState::Stacker(m) => m.clear(),
            ModeState::Snake(m) => m.clear(),
            ModeState::Flappy(m) => m.pipes.clear(),
            ModeState::Runner(m) => m.obstacles.clear(),
            ModeState::Dodger(m) => m.blocks.clear(),
            ModeState::Paddle(_) => {}
            ModeState::Catcher(m) => m.drops.clear(),
            ModeState::Memory(m) => m.clear(),
        }
    }

    /// Count of live pooled/session entities
    pub fn live_entities(&self) -> usize {
        match &self.state {
            ModeState::Clicker(m) => m.pool.len(),
            ModeState::Precision(m) => usize::from(m.current.is_some()),
            ModeState::Stacker(m) => m.stack.len() + usize::from(m.current.is_some()),
            ModeState::Snake(m) => m.body.len(),
            ModeState::Flappy(m) => m.pipes.len(),
            ModeState::Runner(m) => m.obstacles.len(),
            ModeState::Dodger(m) => m.blocks.len(),
            ModeState::Paddle(_) => 0,
            ModeState::Catcher(m) => m.drops.len(),
            ModeState::Memory(m) => m.cards.len(),
        }
    }

    /// Mode-specific status line while running
    pub fn status(&self) -> Option<String> {
        match &self.state {
            ModeState::Precision(m) => {
                let target = m.target.round() as i32;
                Some(match m.last_points {
                    Some(points) => format!("Target size: {target}px (last +{points})"),
                    None => format!("Target size: {target}px"),
                })
            }
            ModeState::Stacker(_) => Some("Stacking...".to_string()),
            ModeState::Memory(_) => Some("Find all pairs.".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSound;
    use crate::sim::entity::{Entity, EntityKind};
    use rand::SeedableRng;

    #[test]
    fn test_mode_ids_round_trip() {
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(GameMode::from_str("dino"), Some(GameMode::Runner));
        assert_eq!(GameMode::from_str("tetris"), None);
    }

    #[test]
    fn test_spawn_cadence_table() {
        assert_eq!(GameMode::PopSprint.config().spawn_every_ms, Some(420.0));
        assert_eq!(GameMode::Flappy.config().spawn_every_ms, Some(1300.0));
        assert_eq!(GameMode::Snake.config().spawn_every_ms, None);
        assert_eq!(GameMode::FallingCatcher.config().lives, Some(3));
    }

    fn running(mode: GameMode) -> GameSession {
        let mut session = GameSession::idle(mode);
        session.start(mode, 1);
        session
    }

    #[test]
    fn test_declared_rules() {
        use CollisionRule::*;
        let rule = |mode: GameMode| mode.config().collision;
        assert_eq!(rule(GameMode::Stacker), Some(IntervalOverlap));
        assert_eq!(rule(GameMode::Snake), Some(GridCell));
        assert_eq!(rule(GameMode::PaddleBounce), Some(PointInRect));
        assert_eq!(rule(GameMode::MemoryMatch), Some(PointInRect));
        assert_eq!(rule(GameMode::Precision), None);
        for mode in [GameMode::Flappy, GameMode::Runner, GameMode::Dodger, GameMode::FallingCatcher] {
            assert_eq!(rule(mode), Some(RectOverlap));
        }
        assert_eq!(GameMode::PaddleBounce.config().motion, MotionModel::Rebound { speed: 1.0 });
    }

    #[test]
    fn test_adapter_applies_configured_rule() {
        // a block clipping the dodger's right edge, clear of its centre
        let graze = |rule: CollisionRule| {
            let mut session = running(GameMode::Dodger);
            let mut rng = Pcg32::seed_from_u64(1);
            let bounds = Bounds::new(200.0, 200.0);
            let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, bounds);
            let mut adapter = GameModeAdapter::start(GameMode::Dodger, &mut ctx);
            adapter.config.collision = Some(rule);
            let ModeState::Dodger(m) = &mut adapter.state else {
                panic!("dodger state missing");
            };
            let player = m.player;
            m.blocks.spawn(|id| {
                Entity::square(id, EntityKind::Block, Vec2::new(player.right() - 4.0, player.y), 20.0)
            });
            adapter.on_frame(f64::from(crate::consts::NOMINAL_FRAME_MS), &mut ctx);
            ctx.has_ended()
        };
        assert!(graze(CollisionRule::RectOverlap));
        assert!(!graze(CollisionRule::PointInRect));
    }

    #[test]
    fn test_adapter_moves_paddle_ball_by_configured_speed() {
        let travel = |speed: f32| {
            let mut session = running(GameMode::PaddleBounce);
            let mut rng = Pcg32::seed_from_u64(2);
            let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(300.0, 200.0));
            let mut adapter = GameModeAdapter::start(GameMode::PaddleBounce, &mut ctx);
            adapter.config.motion = MotionModel::Rebound { speed };
            let ModeState::Paddle(m) = &adapter.state else {
                panic!("paddle state missing");
            };
            let before = m.ball;
            adapter.on_frame(f64::from(crate::consts::NOMINAL_FRAME_MS), &mut ctx);
            let ModeState::Paddle(m) = &adapter.state else {
                panic!("paddle state missing");
            };
            m.ball.x - before.x
        };
        let base = travel(1.0);
        assert!(base > 0.0);
        assert!((travel(2.0) - base * 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_precision_status_shows_last_points() {
        let mut session = running(GameMode::Precision);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(480.0, 360.0));
        let mut adapter = GameModeAdapter::start(GameMode::Precision, &mut ctx);
        let ModeState::Precision(m) = &mut adapter.state else {
            panic!("precision state missing");
        };
        m.target = 90.0;
        assert_eq!(adapter.status().as_deref(), Some("Target size: 90px"));

        adapter.on_input(GameInput::PressStart(Vec2::new(100.0, 100.0)), &mut ctx);
        adapter.on_input(GameInput::PressEnd(Vec2::new(100.0, 100.0)), &mut ctx);
        let ModeState::Precision(m) = &mut adapter.state else {
            panic!("precision state missing");
        };
        // a 20px release against 90 misses every band
        assert_eq!(m.last_points, Some(0));
        m.target = 120.0;
        assert_eq!(adapter.status().as_deref(), Some("Target size: 120px (last +0)"));
    }
}
