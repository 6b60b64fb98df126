//! Ambient bubble field
//!
//! Runs from boot and never ends. Ambient bubbles are recycled in place when
//! they leave the top or fade out; burst bubbles are short-lived and removed.
//! The press bubble is a singleton held outside both pools.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::Bounds;
use super::motion::DriftRise;
use super::pool::{EntityId, EntityPool, Pooled};
use crate::audio::{SoundEffect, SoundSink};
use crate::consts::*;
use crate::random_between;

/// One drifting bubble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: EntityId,
    /// Position, sway and fade
    pub motion: DriftRise,
    pub radius: f32,
    /// Degrees on the colour wheel
    pub hue: f32,
    /// Highlight strength
    pub shine: f32,
}

impl Pooled for Bubble {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Expanding, fading outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopRing {
    /// Centre
    pub pos: Vec2,
    /// Grows every frame
    pub radius: f32,
    /// Ring is dropped at zero
    pub opacity: f32,
    /// Line width in pixels
    pub stroke: f32,
}

impl PopRing {
    pub fn new(pos: Vec2, radius: f32, opacity: f32, stroke: f32) -> Self {
        Self {
            pos,
            radius,
            opacity,
            stroke,
        }
    }

    /// Returns false once invisible
    fn step(&mut self, frames: f32) -> bool {
        self.radius += RING_GROWTH * frames;
        self.opacity = (self.opacity - RING_FADE * frames).max(0.0);
        self.stroke *= RING_STROKE_DECAY.powf(frames);
        self.opacity > 0.0
    }
}

/// Bubble growing under a held pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressBubble {
    /// Follows the pointer while held
    pub pos: Vec2,
    /// Grows while held, up to a cap
    pub radius: f32,
    pub hue: f32,
    pub opacity: f32,
}

pub struct ParticleField {
    bounds: Bounds,
    ambient: EntityPool<Bubble>,
    bursts: EntityPool<Bubble>,
    rings: Vec<PopRing>,
    press: Option<PressBubble>,
    rng: Pcg32,
    enabled: bool,
}

impl ParticleField {
    /// Populate to 70% of `cap` at random on-screen positions
    pub fn new(bounds: Bounds, cap: usize, seed: u64, enabled: bool) -> Self {
        let mut field = Self {
            bounds,
            ambient: EntityPool::with_capacity(cap.min(AMBIENT_CAP)),
            bursts: EntityPool::with_capacity(BURST_CAP),
            rings: Vec::new(),
            press: None,
            rng: Pcg32::seed_from_u64(seed),
            enabled,
        };
        if enabled {
            let initial = (field.ambient.capacity() as f32 * AMBIENT_INITIAL_FILL).round() as usize;
            for _ in 0..initial {
                let pos = Vec2::new(
                    random_between(&mut field.rng, 0.0, bounds.width),
                    random_between(&mut field.rng, 0.0, bounds.height),
                );
                field.spawn_ambient(pos);
            }
            log::info!("ambient field: {} of {} bubbles", field.ambient.len(), field.ambient.capacity());
        }
        field
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn ambient(&self) -> impl Iterator<Item = &Bubble> {
        self.ambient.iter()
    }

    pub fn bursts(&self) -> impl Iterator<Item = &Bubble> {
        self.bursts.iter()
    }

    pub fn rings(&self) -> &[PopRing] {
        &self.rings
    }

    pub fn press(&self) -> Option<&PressBubble> {
        self.press.as_ref()
    }

    /// New drawable size; logical state is kept
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    fn spawn_ambient(&mut self, pos: Vec2) {
        let opacity = random_between(&mut self.rng, 0.2, 0.65);
        let bubble = fresh_bubble(&mut self.rng, pos, opacity);
        self.ambient.spawn(|id| Bubble { id, ..bubble });
    }

    /// One frame of the field
    pub fn tick(&mut self, frames: f32) {
        if !self.enabled {
            return;
        }
        let bounds = self.bounds;

        if !self.ambient.is_full() {
            let below = Vec2::new(
                random_between(&mut self.rng, 0.0, bounds.width),
                bounds.height + random_between(&mut self.rng, 10.0, 80.0),
            );
            self.spawn_ambient(below);
        }

        let rng = &mut self.rng;
        let rings = &mut self.rings;
        self.ambient.for_each_alive(|b| {
            if b.motion.step(frames, BUBBLE_FADE) {
                rings.push(PopRing::new(b.motion.pos, b.radius * 0.8, 0.8, 2.0));
                recycle(rng, b, &bounds);
            }
        });

        let mut expired = Vec::new();
        self.bursts.for_each_alive(|b| {
            if b.motion.step(frames, BUBBLE_FADE * BURST_FADE_MULTIPLIER) {
                expired.push(b.id);
            }
        });
        self.bursts.remove_where(|b| expired.contains(&b.id));

        self.rings.retain_mut(|r| r.step(frames));

        if let Some(press) = self.press.as_mut() {
            press.radius = (press.radius + PRESS_GROWTH * frames).min(PRESS_MAX_RADIUS);
        }
    }

    pub fn press_start(&mut self, pos: Vec2) {
        if !self.enabled {
            return;
        }
        self.press = Some(PressBubble {
            pos,
            radius: PRESS_START_RADIUS,
            hue: random_between(&mut self.rng, 185.0, 205.0),
            opacity: 0.4,
        });
    }

    pub fn press_move(&mut self, pos: Vec2) {
        if let Some(press) = self.press.as_mut() {
            press.pos = pos;
        }
    }

    /// Release the held bubble: one ring and a pop
    pub fn press_end(&mut self, sound: &dyn SoundSink) {
        let Some(press) = self.press.take() else {
            return;
        };
        self.rings.push(PopRing::new(press.pos, press.radius, 0.9, 2.0));
        sound.play(SoundEffect::BasePop);
    }

    /// Inject short-lived bubbles around `pos`
    pub fn burst(&mut self, pos: Vec2) {
        if !self.enabled {
            return;
        }
        for _ in 0..BURST_COUNT {
            let offset = Vec2::new(
                random_between(&mut self.rng, -BURST_SPREAD, BURST_SPREAD),
                random_between(&mut self.rng, -BURST_SPREAD, BURST_SPREAD),
            );
            let opacity = random_between(&mut self.rng, 0.4, 0.8);
            let mut bubble = fresh_bubble(&mut self.rng, pos + offset, opacity);
            bubble.radius = random_between(&mut self.rng, 6.0, 18.0);
            if self.bursts.spawn(|id| Bubble { id, ..bubble }).is_none() {
                break;
            }
        }
        self.rings.push(PopRing::new(pos, 4.0, 0.9, 2.0));
    }

    /// Decorative ring somewhere in the upper part of the backdrop
    pub fn ambient_pop(&mut self) {
        if !self.enabled {
            return;
        }
        let pos = Vec2::new(
            random_between(&mut self.rng, 0.0, self.bounds.width),
            random_between(&mut self.rng, 0.0, self.bounds.height * 0.8),
        );
        let radius = random_between(&mut self.rng, 4.0, 10.0);
        self.rings.push(PopRing::new(pos, radius, 0.7, 1.8));
    }
}

fn fresh_bubble(rng: &mut Pcg32, pos: Vec2, opacity: f32) -> Bubble {
    Bubble {
        id: EntityId(0),
        motion: DriftRise {
            pos,
            speed: random_between(rng, 0.5, 1.15),
            drift: random_between(rng, -0.25, 0.25),
            wobble: random_between(rng, 0.6, 1.5),
            phase: random_between(rng, 0.0, std::f32::consts::TAU),
            opacity,
        },
        radius: random_between(rng, 8.0, 28.0),
        hue: random_between(rng, 185.0, 210.0),
        shine: random_between(rng, 0.25, 0.55),
    }
}

/// Reinitialize in place below the visible area
fn recycle(rng: &mut Pcg32, bubble: &mut Bubble, bounds: &Bounds) {
    let pos = Vec2::new(
        random_between(rng, 0.0, bounds.width),
        bounds.height + random_between(rng, 10.0, 60.0),
    );
    let opacity = random_between(rng, 0.25, 0.7);
    *bubble = Bubble {
        id: bubble.id,
        ..fresh_bubble(rng, pos, opacity)
    };
}
