//! Snapshot Store
//!
//! Fixed-capacity ring buffer of world snapshots keyed by tick. A snapshot
//! stored under tick `T` is the world before tick `T`'s inputs were applied,
//! so restoring it and stepping replays tick `T` onwards.

use crate::game::state::WorldState;

/// Ring buffer of deep-copied world states.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    slots: Vec<Option<WorldState>>,
    capacity: usize,
}

impl SnapshotStore {
    /// Create an empty store. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            capacity,
        }
    }

    #[inline]
    fn slot(&self, tick: u32) -> usize {
        tick as usize % self.capacity
    }

    /// Store a copy of `world` under `world.tick`, evicting whatever
    /// occupied that slot.
    pub fn commit(&mut self, world: &WorldState) {
        let slot = self.slot(world.tick);
        self.slots[slot] = Some(world.clone());
    }

    /// Snapshot for a tick, if it is still retained.
    pub fn get(&self, tick: u32) -> Option<&WorldState> {
        self.slots[self.slot(tick)]
            .as_ref()
            .filter(|world| world.tick == tick)
    }

    /// Independent copy of a retained snapshot.
    pub fn restore(&self, tick: u32) -> Option<WorldState> {
        self.get(tick).cloned()
    }

    /// Check if a tick is still retained.
    pub fn contains(&self, tick: u32) -> bool {
        self.get(tick).is_some()
    }

    /// Oldest retained tick.
    pub fn oldest_tick(&self) -> Option<u32> {
        self.slots.iter().flatten().map(|world| world.tick).min()
    }

    /// Maximum number of snapshots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Check if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::FixedVec2;

    fn world_at(tick: u32) -> WorldState {
        let mut world = WorldState::new(42, FixedVec2::from_ints(6, 0));
        world.tick = tick;
        world
    }

    #[test]
    fn test_commit_and_restore() {
        let mut store = SnapshotStore::new(4);
        assert!(store.is_empty());

        store.commit(&world_at(0));
        store.commit(&world_at(1));

        assert_eq!(store.len(), 2);
        assert_eq!(store.restore(1).map(|w| w.tick), Some(1));
        assert_eq!(store.oldest_tick(), Some(0));
        assert!(store.get(2).is_none());
    }

    #[test]
    fn test_oldest_is_evicted() {
        let mut store = SnapshotStore::new(3);
        for tick in 0..5 {
            store.commit(&world_at(tick));
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.oldest_tick(), Some(2));
        assert!(!store.contains(1));
        // Slot 1 now holds tick 4, not tick 1
        assert!(store.get(1).is_none());
        assert!(store.contains(4));
    }

    #[test]
    fn test_restore_is_independent_copy() {
        let mut store = SnapshotStore::new(2);
        let mut live = world_at(7);
        store.commit(&live);

        live.boss.health = 0;
        let mut restored = store.restore(7).unwrap();
        assert_ne!(restored.boss.health, 0);

        restored.boss.break_gauge = 5;
        assert_eq!(store.get(7).unwrap().boss.break_gauge, 0);
    }

    #[test]
    fn test_recommit_overwrites_same_tick() {
        let mut store = SnapshotStore::new(8);
        store.commit(&world_at(3));

        let mut corrected = world_at(3);
        corrected.bosses_defeated = 1;
        store.commit(&corrected);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(3).unwrap().bosses_defeated, 1);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut store = SnapshotStore::new(0);
        store.commit(&world_at(9));
        assert_eq!(store.capacity(), 1);
        assert!(store.contains(9));

        store.commit(&world_at(10));
        assert_eq!(store.len(), 1);
        assert!(!store.contains(9));
        assert_eq!(store.oldest_tick(), Some(10));
    }
}
