//! Soft-capacity entity pool
//!
//! Entities are owned by exactly one pool. Capacity is enforced by refusing
//! to spawn, never by evicting a live entity. Iteration order is spawn order;
//! input hit tests scan it backwards so the newest (topmost) entity wins.

use serde::{Deserialize, Serialize};

/// Pool-unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Anything a pool can own
pub trait Pooled {
    fn id(&self) -> EntityId;
}

#[derive(Debug, Clone)]
pub struct EntityPool<E> {
    /// Live entities in spawn order
    items: Vec<E>,
    /// Spawns beyond this are skipped
    capacity: usize,
    /// Never reused within one pool
    next_id: u32,
}

impl<E: Pooled> EntityPool<E> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.min(256)),
            capacity,
            next_id: 1,
        }
    }

    /// Pool without a practical ceiling
    pub fn unbounded() -> Self {
        Self::with_capacity(usize::MAX)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Spawn a new entity built by `factory`; skipped (None) at capacity
    pub fn spawn(&mut self, factory: impl FnOnce(EntityId) -> E) -> Option<&mut E> {
        if self.is_full() {
            return None;
        }
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let item = factory(id);
        debug_assert_eq!(item.id(), id, "factory must keep the pool's id");
        self.items.push(item);
        self.items.last_mut()
    }

    /// Mutate every live entity in place, in spawn order
    pub fn for_each_alive(&mut self, mut f: impl FnMut(&mut E)) {
        for item in self.items.iter_mut() {
            f(item);
        }
    }

    /// Remove every entity matching `predicate`, returning how many went
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&E) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|e| !predicate(e));
        before - self.items.len()
    }

    /// Remove and return only the last entity (newest first) matching
    pub fn take_last(&mut self, predicate: impl FnMut(&E) -> bool) -> Option<E> {
        let idx = self.items.iter().rposition(predicate)?;
        Some(self.items.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Dot {
        id: EntityId,
        value: i32,
    }

    impl Pooled for Dot {
        fn id(&self) -> EntityId {
            self.id
        }
    }

    fn spawn_values(pool: &mut EntityPool<Dot>, values: &[i32]) {
        for &value in values {
            pool.spawn(|id| Dot { id, value });
        }
    }

    #[test]
    fn test_capacity_skips_spawn() {
        let mut pool = EntityPool::with_capacity(2);
        spawn_values(&mut pool, &[1, 2]);
        assert!(pool.spawn(|id| Dot { id, value: 3 }).is_none());
        assert_eq!(pool.len(), 2);
        let values: Vec<_> = pool.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_ids_are_unique_after_removal() {
        let mut pool = EntityPool::with_capacity(4);
        spawn_values(&mut pool, &[1, 2]);
        pool.remove_where(|d| d.value == 1);
        spawn_values(&mut pool, &[3]);
        let ids: Vec<_> = pool.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![EntityId(2), EntityId(3)]);
    }

    #[test]
    fn test_mutate_then_remove_same_pass() {
        let mut pool = EntityPool::unbounded();
        spawn_values(&mut pool, &[1, 5, 9]);
        pool.for_each_alive(|d| d.value += 1);
        let removed = pool.remove_where(|d| d.value > 5);
        assert_eq!(removed, 2);
        assert_eq!(pool.iter().map(|d| d.value).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_take_last_prefers_newest() {
        let mut pool = EntityPool::unbounded();
        spawn_values(&mut pool, &[7, 3, 7, 3]);
        let taken = pool.take_last(|d| d.value == 7);
        assert_eq!(taken.map(|d| d.id), Some(EntityId(3)));
        let ids: Vec<_> = pool.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![EntityId(1), EntityId(2), EntityId(4)]);
        assert!(pool.take_last(|d| d.value == 9).is_none());
    }
}
