//! Motion models
//!
//! Every per-frame constant is expressed against the nominal 60 Hz frame and
//! scaled by `frames` (see [`crate::frame_scale`]), so motion stays correct
//! when the host throttles or drops frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::geom::Bounds;
use crate::consts::{BUBBLE_EXIT_Y, BUBBLE_PHASE_STEP};

/// What happened at the bounds during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Contact {
    #[default]
    None,
    /// Reflected off a side or the top
    Bounced,
    /// Came to rest on the floor
    Landed,
    /// Crossed the floor (fall-through rule)
    Floor,
    /// Crossed the ceiling
    Ceiling,
    /// Fully left the visible area
    Exited,
}

/// What a ballistic body does when it reaches the bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FloorRule {
    /// Snap to `ground_y` and zero vertical velocity
    Land { ground_y: f32 },
    /// Report `Contact::Floor` once the body's top passes the floor
    FallThrough,
}

/// Per-kind update rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionModel {
    /// Never moves
    Static,
    /// Velocity × `speed` per frame, reflecting and clamping at the bounds
    BoundedBounce { speed: f32 },
    /// Constant velocity; `Exited` once past the area by `exit_margin`
    LinearFall { exit_margin: f32 },
    /// Opacity decays by `rate` per frame; `Exited` at zero
    Fade { rate: f32 },
    /// Like `BoundedBounce` on the sides and top, but the floor is open:
    /// `Exited` once the box is wholly below the area
    Rebound { speed: f32 },
}

impl MotionModel {
    /// Advance one pooled entity by `frames`
    pub fn step(&self, entity: &mut Entity, frames: f32, bounds: &Bounds) -> Contact {
        if let MotionModel::Fade { rate } = *self {
            entity.opacity = (entity.opacity - rate * frames).max(0.0);
            return if entity.opacity <= 0.0 {
                Contact::Exited
            } else {
                Contact::None
            };
        }
        self.move_box(&mut entity.pos, &mut entity.vel, entity.size, frames, bounds)
    }

    /// Move a bare box (top-left `pos`) that is not pool-owned.
    /// `Fade` has no positional part and leaves the box alone.
    pub fn move_box(&self, pos: &mut Vec2, vel: &mut Vec2, size: Vec2, frames: f32, bounds: &Bounds) -> Contact {
        match *self {
            MotionModel::Static | MotionModel::Fade { .. } => Contact::None,
            MotionModel::BoundedBounce { speed } => bounded_bounce(pos, vel, size, speed, frames, bounds),
            MotionModel::LinearFall { exit_margin } => {
                *pos += *vel * frames;
                if fully_past(*pos, size, bounds, exit_margin) {
                    Contact::Exited
                } else {
                    Contact::None
                }
            }
            MotionModel::Rebound { speed } => rebound(pos, vel, size, speed, frames, bounds),
        }
    }
}

/// Rising, wobbling, fading bubble motion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftRise {
    /// Centre position
    pub pos: Vec2,
    /// Upward pixels per frame
    pub speed: f32,
    /// Constant sideways pixels per frame
    pub drift: f32,
    /// Amplitude of the sine sway
    pub wobble: f32,
    /// Sway phase in radians
    pub phase: f32,
    pub opacity: f32,
}

impl DriftRise {
    /// Advance one step; returns true when the bubble left the top or faded out.
    /// Opacity never goes below zero.
    pub fn step(&mut self, frames: f32, fade: f32) -> bool {
        self.phase += BUBBLE_PHASE_STEP * frames;
        self.pos.y -= self.speed * frames;
        self.pos.x += (self.phase.sin() * self.wobble + self.drift) * frames;
        self.opacity = (self.opacity - fade * frames).max(0.0);
        self.pos.y < BUBBLE_EXIT_Y || self.opacity <= 0.0
    }
}

/// Reflect off every edge and clamp into bounds in the same step
pub fn bounded_bounce(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    speed: f32,
    frames: f32,
    bounds: &Bounds,
) -> Contact {
    *pos += *vel * speed * frames;
    let mut contact = Contact::None;

    if pos.x < 0.0 {
        vel.x = vel.x.abs();
        contact = Contact::Bounced;
    } else if pos.x + size.x > bounds.width {
        vel.x = -vel.x.abs();
        contact = Contact::Bounced;
    }
    if pos.y < 0.0 {
        vel.y = vel.y.abs();
        contact = Contact::Bounced;
    } else if pos.y + size.y > bounds.height {
        vel.y = -vel.y.abs();
        contact = Contact::Bounced;
    }

    *pos = bounds.clamp_box(*pos, size);
    contact
}

/// Reflect off the sides and the top; clamp only those edges
pub fn rebound(pos: &mut Vec2, vel: &mut Vec2, size: Vec2, speed: f32, frames: f32, bounds: &Bounds) -> Contact {
    *pos += *vel * speed * frames;
    let mut contact = Contact::None;

    if pos.x < 0.0 {
        vel.x = vel.x.abs();
        contact = Contact::Bounced;
    } else if pos.x + size.x > bounds.width {
        vel.x = -vel.x.abs();
        contact = Contact::Bounced;
    }
    if pos.y < 0.0 {
        vel.y = vel.y.abs();
        contact = Contact::Bounced;
    }

    pos.x = pos.x.clamp(0.0, (bounds.width - size.x).max(0.0));
    pos.y = pos.y.max(0.0);
    if pos.y > bounds.height {
        Contact::Exited
    } else {
        contact
    }
}

/// Gravity integration: `vy += g; y += vy` (per frame), then the floor rule
pub fn ballistic(
    pos: &mut Vec2,
    vel: &mut Vec2,
    gravity: f32,
    frames: f32,
    floor: FloorRule,
    bounds: &Bounds,
) -> Contact {
    vel.y += gravity * frames;
    *pos += *vel * frames;

    match floor {
        FloorRule::Land { ground_y } => {
            if pos.y >= ground_y {
                pos.y = ground_y;
                vel.y = 0.0;
                Contact::Landed
            } else {
                Contact::None
            }
        }
        FloorRule::FallThrough => {
            if pos.y > bounds.height {
                Contact::Floor
            } else if pos.y < 0.0 {
                Contact::Ceiling
            } else {
                Contact::None
            }
        }
    }
}

/// True once a box is wholly below the area or wholly off its left edge
pub fn fully_past(pos: Vec2, size: Vec2, bounds: &Bounds, margin: f32) -> bool {
    pos.y >= bounds.height + margin || pos.x + size.x <= -margin
}

/// Grow-on-hold: fixed increment per fixed-period tick, capped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    pub size: f32,
    /// Added per tick
    pub increment: f32,
    pub max: f32,
}

impl Growth {
    pub fn new(size: f32, increment: f32, max: f32) -> Self {
        Self {
            size: size.min(max),
            increment,
            max,
        }
    }

    /// Grow by `ticks` increments; returns true when the cap is reached
    pub fn grow(&mut self, ticks: f32) -> bool {
        self.size = (self.size + self.increment * ticks).min(self.max);
        self.size >= self.max
    }
}
