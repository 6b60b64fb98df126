//! Simulation module
//!
//! All gameplay logic lives here and stays free of platform types:
//! - Time only enters through [`Scheduler::advance`]
//! - Seeded RNG only
//! - Stable iteration order (pool insertion order)
//! - Drawing goes through `renderer::RenderTarget`, sound through `audio::SoundSink`

pub mod collision;
pub mod engine;
pub mod entity;
pub mod field;
pub mod geom;
pub mod input;
pub mod modes;
pub mod motion;
pub mod pool;
pub mod scheduler;
pub mod session;

pub use collision::{CollisionOutcome, CollisionRule, Consequence};
pub use engine::{Arcade, ArcadeTimer, HudSnapshot};
pub use entity::{Entity, EntityKind, EntityState};
pub use field::{Bubble, ParticleField, PopRing, PressBubble};
pub use geom::{Bounds, Rect, Span};
pub use input::{HeldKeys, InputEvent, InputTarget, Key};
pub use modes::{GameInput, GameMode, GameModeAdapter, ModeConfig, ModeState, SessionCtx, SessionTimer};
pub use motion::MotionModel;
pub use pool::{EntityId, EntityPool, Pooled};
pub use scheduler::{Fired, FiredKind, Scheduler, TimerHandle};
pub use session::{Clock, Flow, GameSession, Lifecycle};
