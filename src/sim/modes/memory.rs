//! Memory match: flip two cards, keep pairs

use glam::Vec2;
use rand::seq::SliceRandom;

use super::{SessionCtx, SessionTimer};
use crate::sim::collision::{CollisionOutcome, CollisionRule};
use crate::sim::geom::{Bounds, Rect};

pub const GRID: usize = 4;
pub const PAIRS: u8 = 8;
pub const CARD_GAP: f32 = 8.0;
pub const MISMATCH_REVEAL_MS: f64 = 700.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    /// Pair id, `1..=PAIRS`
    pub value: u8,
    pub face_up: bool,
    /// Stays face up for the rest of the session
    pub matched: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryMode {
    /// Row-major, `GRID` per row
    pub cards: Vec<Card>,
    /// Index of the single face-up unmatched card
    pub first: Option<usize>,
    /// Mismatched pair waiting to flip back; input is locked meanwhile
    pub pending: Option<(usize, usize)>,
    pub matches: u8,
}

/// Box of card `index` in the 4×4 grid
pub fn card_rect(index: usize, bounds: &Bounds) -> Rect {
    let n = GRID as f32;
    let w = (bounds.width - CARD_GAP * (n + 1.0)) / n;
    let h = (bounds.height - CARD_GAP * (n + 1.0)) / n;
    let col = (index % GRID) as f32;
    let row = (index / GRID) as f32;
    Rect::new(
        CARD_GAP + col * (w + CARD_GAP),
        CARD_GAP + row * (h + CARD_GAP),
        w.max(0.0),
        h.max(0.0),
    )
}

impl MemoryMode {
    pub fn start(ctx: &mut SessionCtx<'_>) -> Self {
        let mut values: Vec<u8> = (1..=PAIRS).chain(1..=PAIRS).collect();
        values.shuffle(&mut *ctx.rng);
        Self {
            cards: values
                .into_iter()
                .map(|value| Card {
                    value,
                    face_up: false,
                    matched: false,
                })
                .collect(),
            first: None,
            pending: None,
            matches: 0,
        }
    }

    pub fn on_press(&mut self, pos: Vec2, rule: CollisionRule, ctx: &mut SessionCtx<'_>) {
        let bounds = ctx.bounds;
        if let Some(index) = (0..self.cards.len()).find(|&i| rule.contains_point(&card_rect(i, &bounds), pos)) {
            self.flip(index, ctx);
        }
    }

    /// Flip one card; ignored while a mismatch is showing
    pub fn flip(&mut self, index: usize, ctx: &mut SessionCtx<'_>) {
        if self.pending.is_some() {
            return;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return;
        };
        if card.face_up || card.matched {
            return;
        }
        card.face_up = true;

        let Some(first) = self.first.take() else {
            self.first = Some(index);
            return;
        };

        if self.cards[first].value == self.cards[index].value {
            self.cards[first].matched = true;
            self.cards[index].matched = true;
            self.matches += 1;
            ctx.apply(CollisionOutcome::scored(None, 1));
            if self.matches == PAIRS {
                ctx.apply(CollisionOutcome::ended(None));
            }
        } else {
            self.pending = Some((first, index));
            ctx.start_timeout(SessionTimer::Reveal, MISMATCH_REVEAL_MS);
        }
    }

    pub fn on_reveal_timeout(&mut self) {
        if let Some((a, b)) = self.pending.take() {
            for i in [a, b] {
                if let Some(card) = self.cards.get_mut(i) {
                    card.face_up = false;
                }
            }
        }
    }

    pub fn all_matched(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.matched)
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.first = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSound;
    use crate::sim::modes::GameMode;
    use crate::sim::session::GameSession;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn running() -> GameSession {
        let mut session = GameSession::idle(GameMode::MemoryMatch);
        session.start(GameMode::MemoryMatch, 1);
        session
    }

    fn partner(mode: &MemoryMode, index: usize) -> usize {
        let value = mode.cards[index].value;
        (0..mode.cards.len())
            .find(|&i| i != index && mode.cards[i].value == value)
            .unwrap_or(index)
    }

    #[test]
    fn test_deck_has_eight_pairs() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(400.0, 400.0));
        let mode = MemoryMode::start(&mut ctx);
        assert_eq!(mode.cards.len(), 16);
        for v in 1..=PAIRS {
            assert_eq!(mode.cards.iter().filter(|c| c.value == v).count(), 2);
        }
    }

    #[test]
    fn test_mismatch_locks_until_timeout() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(400.0, 400.0));
        let mut mode = MemoryMode::start(&mut ctx);
        let a = 0;
        let b = (1..16).find(|&i| mode.cards[i].value != mode.cards[a].value).unwrap_or(1);
        mode.flip(a, &mut ctx);
        mode.flip(b, &mut ctx);
        assert!(mode.pending.is_some());
        let third = (0..16).find(|&i| i != a && i != b).unwrap_or(2);
        mode.flip(third, &mut ctx);
        assert!(!mode.cards[third].face_up);

        mode.on_reveal_timeout();
        assert!(!mode.cards[a].face_up && !mode.cards[b].face_up);
    }

    #[test]
    fn test_all_pairs_end_session() {
        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, Bounds::new(400.0, 400.0));
        let mut mode = MemoryMode::start(&mut ctx);
        for i in 0..16 {
            if mode.cards[i].matched {
                continue;
            }
            let j = partner(&mode, i);
            mode.flip(i, &mut ctx);
            mode.flip(j, &mut ctx);
        }
        assert!(mode.all_matched());
        assert_eq!(ctx.session.score, 8);
        assert!(ctx.has_ended());
    }

    #[test]
    fn test_press_maps_to_card() {
        let bounds = Bounds::new(400.0, 400.0);
        let r = card_rect(5, &bounds);
        assert!(r.x > card_rect(4, &bounds).right());
        assert!(r.y > card_rect(1, &bounds).bottom());

        let mut session = running();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ctx = SessionCtx::new(&mut session, &mut rng, &NullSound, bounds);
        let mut mode = MemoryMode::start(&mut ctx);
        mode.on_press(r.center(), CollisionRule::PointInRect, &mut ctx);
        assert!(mode.cards[5].face_up);
        // the gap between cards belongs to none of them
        mode.on_press(Vec2::new(CARD_GAP / 2.0, CARD_GAP / 2.0), CollisionRule::PointInRect, &mut ctx);
        assert_eq!(mode.first, Some(5));
        assert_eq!(mode.cards.iter().filter(|c| c.face_up).count(), 1);
    }
}
