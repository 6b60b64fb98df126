//! Collision predicates and outcomes
//!
//! Only three predicate families exist: point-in-circle, axis-aligned box
//! tests and horizontal interval overlap. [`CollisionRule`] picks one per mode
//! and every adapter asks the rule rather than a predicate directly.
//!
//! Input hit tests consume at most one entity per event. Pools draw in spawn
//! order, so the newest entity is on top and is the one a click takes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::geom::{Rect, Span};
use super::pool::{EntityId, EntityPool};
use crate::distance;

/// Which predicate a mode uses for input and contact tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionRule {
    /// `distance(point, center) <= radius`
    PointInCircle,
    /// Inclusive point-in-box
    PointInRect,
    /// Strict AABB overlap between two boxes
    RectOverlap,
    /// Horizontal span intersection (stacker)
    IntervalOverlap,
    /// Exact grid-cell equality (snake)
    GridCell,
}

impl CollisionRule {
    /// Point test against an entity's circle or box
    pub fn hits_point(&self, entity: &Entity, point: Vec2) -> bool {
        self.contains_point(&entity.rect(), point)
    }

    /// Point test against a bare box; the circle rule uses the inscribed circle
    pub fn contains_point(&self, rect: &Rect, point: Vec2) -> bool {
        match self {
            CollisionRule::PointInCircle => point_in_circle(point, rect.center(), rect.w.min(rect.h) * 0.5),
            _ => point_in_rect(point, rect),
        }
    }

    /// Contact between a moving `actor` box and a `target` box.
    /// Point rules test the actor's centre against the target.
    pub fn hits_box(&self, actor: &Rect, target: &Rect) -> bool {
        match self {
            CollisionRule::PointInCircle | CollisionRule::PointInRect => {
                self.contains_point(target, actor.center())
            }
            CollisionRule::RectOverlap => rect_overlap(actor, target),
            CollisionRule::IntervalOverlap => {
                interval_overlap(Span::from_origin(actor.x, actor.w), Span::from_origin(target.x, target.w)).is_some()
            }
            // boxes snapped to the same cell share an origin
            CollisionRule::GridCell => actor.x == target.x && actor.y == target.y,
        }
    }
}

/// What a collision did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consequence {
    /// Add this many points
    Scored(u32),
    /// Take one life; ends the session at zero
    LifeLost,
    SessionEnded,
}

/// Per-tick collision result, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionOutcome {
    /// Entity involved, if the contact was with a pooled one
    pub entity_id: Option<EntityId>,
    /// Effect on the session
    pub consequence: Consequence,
}

impl CollisionOutcome {
    pub fn scored(entity_id: Option<EntityId>, points: u32) -> Self {
        Self {
            entity_id,
            consequence: Consequence::Scored(points),
        }
    }

    pub fn life_lost(entity_id: Option<EntityId>) -> Self {
        Self {
            entity_id,
            consequence: Consequence::LifeLost,
        }
    }

    pub fn ended(entity_id: Option<EntityId>) -> Self {
        Self {
            entity_id,
            consequence: Consequence::SessionEnded,
        }
    }
}

#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    distance(point, center) <= radius
}

#[inline]
pub fn point_in_rect(point: Vec2, rect: &Rect) -> bool {
    rect.contains(point)
}

#[inline]
pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b)
}

/// Intersection of two spans, or None when its length is ≤ 0
pub fn interval_overlap(current: Span, previous: Span) -> Option<Span> {
    let start = current.start.max(previous.start);
    let end = current.end.min(previous.end);
    if end - start <= 0.0 {
        None
    } else {
        Some(Span::new(start, end))
    }
}

/// Tie-break: remove only the topmost (newest) active entity hit by `point`
pub fn consume_top_hit(
    pool: &mut EntityPool<Entity>,
    rule: CollisionRule,
    point: Vec2,
) -> Option<Entity> {
    pool.take_last(|e| e.is_active() && rule.hits_point(e, point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use proptest::prelude::*;

    #[test]
    fn test_point_in_circle_edge() {
        let c = Vec2::new(10.0, 10.0);
        assert!(point_in_circle(Vec2::new(15.0, 10.0), c, 5.0));
        assert!(!point_in_circle(Vec2::new(15.1, 10.0), c, 5.0));
    }

    #[test]
    fn test_interval_overlap_clips() {
        let previous = Span::new(100.0, 260.0);
        let current = Span::new(150.0, 310.0);
        let overlap = interval_overlap(current, previous).map(|s| (s.start, s.end, s.len()));
        assert_eq!(overlap, Some((150.0, 260.0, 110.0)));
    }

    #[test]
    fn test_interval_overlap_touching_is_miss() {
        assert!(interval_overlap(Span::new(260.0, 420.0), Span::new(100.0, 260.0)).is_none());
        assert!(interval_overlap(Span::new(0.0, 50.0), Span::new(100.0, 260.0)).is_none());
    }

    #[test]
    fn test_top_hit_tie_break() {
        let mut pool = EntityPool::unbounded();
        pool.spawn(|id| Entity::square(id, EntityKind::Bubble, Vec2::new(0.0, 0.0), 60.0));
        pool.spawn(|id| Entity::square(id, EntityKind::Bubble, Vec2::new(20.0, 20.0), 60.0));
        let click = Vec2::new(45.0, 45.0);
        // the later spawn is drawn over the first
        let hit = consume_top_hit(&mut pool, CollisionRule::PointInCircle, click);
        assert_eq!(hit.map(|e| e.id), Some(EntityId(2)));
        assert_eq!(pool.iter().map(|e| e.id).collect::<Vec<_>>(), vec![EntityId(1)]);
    }

    #[test]
    fn test_box_contact_per_rule() {
        let actor = Rect::new(0.0, 0.0, 24.0, 24.0);
        // overlaps the actor's right edge, clear of its centre
        let edge = Rect::new(20.0, 0.0, 20.0, 20.0);
        assert!(CollisionRule::RectOverlap.hits_box(&actor, &edge));
        assert!(CollisionRule::IntervalOverlap.hits_box(&actor, &edge));
        assert!(!CollisionRule::PointInRect.hits_box(&actor, &edge));
        assert!(!CollisionRule::PointInCircle.hits_box(&actor, &edge));
        assert!(!CollisionRule::GridCell.hits_box(&actor, &edge));

        let cell = Rect::new(0.0, 0.0, 24.0, 24.0);
        assert!(CollisionRule::GridCell.hits_box(&actor, &cell));
        assert!(CollisionRule::PointInCircle.hits_box(&actor, &cell));
    }

    #[test]
    fn test_circle_rule_skips_box_corner() {
        let rect = Rect::new(0.0, 0.0, 40.0, 40.0);
        let corner = Vec2::new(2.0, 2.0);
        assert!(CollisionRule::PointInRect.contains_point(&rect, corner));
        assert!(!CollisionRule::PointInCircle.contains_point(&rect, corner));
    }

    #[test]
    fn test_expiring_entities_not_hittable() {
        let mut pool = EntityPool::unbounded();
        if let Some(e) = pool.spawn(|id| Entity::square(id, EntityKind::Bubble, Vec2::ZERO, 40.0)) {
            e.state = crate::sim::entity::EntityState::Expiring;
        }
        assert!(consume_top_hit(&mut pool, CollisionRule::PointInCircle, Vec2::splat(20.0)).is_none());
    }

    proptest! {
        #[test]
        fn prop_overlap_is_commutative_and_bounded(
            a0 in -500.0f32..500.0, aw in 0.0f32..300.0,
            b0 in -500.0f32..500.0, bw in 0.0f32..300.0,
        ) {
            let a = Span::from_origin(a0, aw);
            let b = Span::from_origin(b0, bw);
            let ab = interval_overlap(a, b);
            let ba = interval_overlap(b, a);
            prop_assert_eq!(ab, ba);
            if let Some(s) = ab {
                prop_assert!(s.len() > 0.0);
                prop_assert!(s.len() <= aw.min(bw) + 1e-3);
                prop_assert!(s.start >= a.start.max(b.start));
            }
        }

        #[test]
        fn prop_rect_overlap_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            w in 1.0f32..50.0, h in 1.0f32..50.0,
        ) {
            let a = Rect::new(ax, ay, w, h);
            let b = Rect::new(bx, by, h, w);
            prop_assert_eq!(rect_overlap(&a, &b), rect_overlap(&b, &a));
        }
    }
}
