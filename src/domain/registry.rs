// Entity storage for the simulation: one ordered store per entity kind.

use crate::domain::state::{Collectible, EntityId, Npc, Player, Projectile, WorldSnapshot};

pub trait Entity {
    fn id(&self) -> EntityId;
}

impl Entity for Player {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Collectible {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Npc {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Hands out monotonically increasing ids. Owned by the registry, never global.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        self.last += 1;
        EntityId(self.last)
    }
}

/// Insertion-ordered collection of one entity kind.
///
/// Order matters: "first match" scans in the systems walk entities in the
/// order they were created.
#[derive(Debug, Clone)]
pub struct Store<T> {
    items: Vec<T>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Store<T> {
    pub fn insert(&mut self, item: T) -> EntityId {
        let id = item.id();
        self.items.push(item);
        id
    }

    /// Removes by id, keeping the order of the rest. Missing ids are a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }
}

impl<T> Store<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    /// Index-based access for passes that queue removals by position.
    pub(crate) fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    pub players: Store<Player>,
    pub projectiles: Store<Projectile>,
    pub collectibles: Store<Collectible>,
    pub npcs: Store<Npc>,
    pub ids: IdAllocator,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_collectibles(&self) -> usize {
        self.collectibles.iter().filter(|c| !c.collected).count()
    }

    pub fn alive_npcs(&self) -> usize {
        self.npcs.iter().filter(|n| n.alive).count()
    }

    /// Drops collectibles and NPCs retired more than `grace` ticks before `tick`.
    ///
    /// Retired entities never appear in snapshots, so this is invisible to clients.
    pub fn compact(&mut self, tick: u64, grace: u64) -> usize {
        let before = self.collectibles.len() + self.npcs.len();
        let expired = |retired_at: Option<u64>| {
            retired_at.is_some_and(|at| tick.saturating_sub(at) > grace)
        };
        self.collectibles.retain(|c| !expired(c.collected_at));
        self.npcs.retain(|n| !expired(n.died_at));
        before - (self.collectibles.len() + self.npcs.len())
    }

    pub fn snapshot(&self, tick: u64) -> WorldSnapshot {
        WorldSnapshot {
            tick,
            players: self.players.iter().cloned().collect(),
            projectiles: self.projectiles.iter().cloned().collect(),
            collectibles: self
                .collectibles
                .iter()
                .filter(|c| !c.collected)
                .cloned()
                .collect(),
            npcs: self.npcs.iter().filter(|n| n.alive).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::{CollectibleTuning, NpcTuning, PlayerTuning};

    #[test]
    fn when_ids_are_allocated_then_they_are_never_reused() {
        let mut registry = Registry::new();
        let a = registry.ids.allocate();
        registry.players.insert(Player::new(a, 0.0, 0.0, &PlayerTuning::default()));
        registry.players.remove(a);
        let b = registry.ids.allocate();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn when_entity_is_removed_twice_then_second_removal_is_a_noop() {
        let mut registry = Registry::new();
        let id = registry.ids.allocate();
        registry.players.insert(Player::new(id, 0.0, 0.0, &PlayerTuning::default()));

        assert!(registry.players.remove(id).is_some());
        assert!(registry.players.remove(id).is_none());
        assert!(registry.players.get(id).is_none());
    }

    #[test]
    fn when_snapshot_is_taken_then_retired_entities_are_filtered() {
        let mut registry = Registry::new();
        let coin_tuning = CollectibleTuning::default();
        let npc_tuning = NpcTuning::default();

        let kept = registry.ids.allocate();
        registry.collectibles.insert(Collectible::new(kept, 1.0, 1.0, 0.0, &coin_tuning));
        let taken = registry.ids.allocate();
        let mut coin = Collectible::new(taken, 2.0, 2.0, 0.0, &coin_tuning);
        coin.collect(1);
        registry.collectibles.insert(coin);

        let dead = registry.ids.allocate();
        let mut npc = Npc::new(dead, 0.0, 0.0, 0.0, "#fff", &npc_tuning);
        npc.take_damage(10, 1);
        registry.npcs.insert(npc);

        let snapshot = registry.snapshot(1);
        assert_eq!(snapshot.collectibles.len(), 1);
        assert_eq!(snapshot.collectibles[0].id, kept);
        assert!(snapshot.npcs.is_empty());
    }

    #[test]
    fn when_grace_period_passes_then_compaction_drops_retired_entities() {
        let mut registry = Registry::new();
        let tuning = CollectibleTuning::default();
        for tick in [10, 50] {
            let id = registry.ids.allocate();
            let mut coin = Collectible::new(id, 0.0, 0.0, 0.0, &tuning);
            coin.collect(tick);
            registry.collectibles.insert(coin);
        }
        let live = registry.ids.allocate();
        registry.collectibles.insert(Collectible::new(live, 0.0, 0.0, 0.0, &tuning));

        assert_eq!(registry.compact(40, 30), 0);
        assert_eq!(registry.compact(41, 30), 1);
        assert_eq!(registry.collectibles.len(), 2);
        assert_eq!(registry.compact(1000, 30), 1);
        assert!(registry.collectibles.contains(live));
    }
}
