//! Gameplay entities owned by a session's pool

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::pool::{EntityId, Pooled};

/// What an entity is, plus any kind-specific data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Clickable bubble (pop sprint, catch, whack)
    Bubble,
    /// Clickable square target (chase)
    Target,
    /// Flappy pipe pair; the gap spans `gap_top..gap_bottom`
    Pipe { gap_top: f32, gap_bottom: f32 },
    /// Ground obstacle (runner)
    Obstacle,
    /// Falling block (dodger)
    Block,
    /// Falling drop (catcher); bad drops cost a life when caught
    Drop { good: bool },
}

/// Lifecycle of a single entity inside its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityState {
    #[default]
    Active,
    /// Still visible but no longer interactive
    Expiring,
    /// Removed at the end of the current pass
    Dead,
}

/// A positioned, moving game object. `pos` is the top-left of its box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique within the owning pool
    pub id: EntityId,
    pub kind: EntityKind,
    /// Top-left, area-local pixels
    pub pos: Vec2,
    /// Pixels per nominal frame
    pub vel: Vec2,
    /// Box extent; circle kinds use the inscribed circle
    pub size: Vec2,
    /// Milliseconds since spawn
    pub age_ms: f32,
    /// Opacity for fading kinds (whack bubbles)
    pub opacity: f32,
    /// Only `Active` entities take part in hit tests
    pub state: EntityState,
    /// Already counted for pass-by scoring
    pub scored: bool,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size: size.max(Vec2::splat(0.0)),
            age_ms: 0.0,
            opacity: 1.0,
            state: EntityState::Active,
            scored: false,
        }
    }

    /// Square entity of side `side`
    pub fn square(id: EntityId, kind: EntityKind, pos: Vec2, side: f32) -> Self {
        Self::new(id, kind, pos, Vec2::splat(side))
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Radius of the inscribed circle
    pub fn radius(&self) -> f32 {
        self.size.x.min(self.size.y) * 0.5
    }

    pub fn is_active(&self) -> bool {
        self.state == EntityState::Active
    }

    pub fn kill(&mut self) {
        self.state = EntityState::Dead;
    }

    pub fn is_dead(&self) -> bool {
        self.state == EntityState::Dead
    }
}

impl Pooled for Entity {
    fn id(&self) -> EntityId {
        self.id
    }
}
