//! Arena module: typed entity storage for the simulation.
//!
//! The Arena is the container for every entity in a game. It provides:
//! - One `BTreeMap` per entity kind, giving deterministic id-ordered iteration
//! - A single monotonically increasing id space shared by all kinds
//! - An id-to-kind index for resolving weak references
//! - Centralized removal through [`Arena::sweep`]
//!
//! # Removal
//!
//! Systems never remove entities directly. Death is recorded in place
//! (hp reaching zero, a missile going inactive) or by
//! [`Arena::mark_despawn`] for enemies leaving the world, and one sweep at
//! the end of collision resolution removes everything at once. An entity can
//! therefore never be removed twice or skipped by a system iterating over
//! its collection.
//!
//! # Example
//!
//! ```
//! use outpost_core::arena::Arena;
//! use outpost_core::entity::{Base, Turret};
//! use glam::Vec2;
//!
//! let mut arena = Arena::new(Base::new(Vec2::new(500.0, 800.0)));
//! let id = arena.spawn(|id| Turret::new(id, Vec2::new(100.0, 100.0)));
//!
//! assert!(arena.get::<Turret>(id).is_some());
//! assert_eq!(arena.count::<Turret>(), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::entity::{
    Base, Battery, Enemy, EntityId, EntityTag, Health, MineralPatch, Missile, MissileLauncher,
    TargetRef, Turret, Worker, WorkerMap,
};

// =============================================================================
// Storage trait
// =============================================================================

/// An entity kind with its own collection in the [`Arena`].
pub trait ArenaEntity: Sized {
    /// Kind recorded in the arena's id index.
    const TAG: EntityTag;

    /// The collection holding this kind.
    fn storage(arena: &Arena) -> &BTreeMap<EntityId, Self>;

    /// Mutable access to the collection holding this kind.
    fn storage_mut(arena: &mut Arena) -> &mut BTreeMap<EntityId, Self>;
}

macro_rules! arena_entity {
    ($ty:ty, $tag:expr, $field:ident) => {
        impl ArenaEntity for $ty {
            const TAG: EntityTag = $tag;

            fn storage(arena: &Arena) -> &BTreeMap<EntityId, Self> {
                &arena.$field
            }

            fn storage_mut(arena: &mut Arena) -> &mut BTreeMap<EntityId, Self> {
                &mut arena.$field
            }
        }
    };
}

arena_entity!(Worker, EntityTag::Worker, workers);
arena_entity!(Enemy, EntityTag::Enemy, enemies);
arena_entity!(Turret, EntityTag::Turret, turrets);
arena_entity!(MissileLauncher, EntityTag::MissileLauncher, launchers);
arena_entity!(Battery, EntityTag::Battery, batteries);
arena_entity!(MineralPatch, EntityTag::MineralPatch, patches);
arena_entity!(Missile, EntityTag::Missile, missiles);

// =============================================================================
// Arena
// =============================================================================

/// Container for every entity in a game.
///
/// Collections are `pub(crate)` so systems can borrow two kinds at once
/// (a worker and its patch, a launcher and the enemies). Outside the crate,
/// use the typed accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    pub(crate) base: Base,
    pub(crate) workers: WorkerMap,
    pub(crate) enemies: BTreeMap<EntityId, Enemy>,
    pub(crate) turrets: BTreeMap<EntityId, Turret>,
    pub(crate) launchers: BTreeMap<EntityId, MissileLauncher>,
    pub(crate) batteries: BTreeMap<EntityId, Battery>,
    pub(crate) patches: BTreeMap<EntityId, MineralPatch>,
    pub(crate) missiles: BTreeMap<EntityId, Missile>,
    tags: BTreeMap<EntityId, EntityTag>,
    pending_despawn: BTreeSet<EntityId>,
}

impl Arena {
    /// Creates an arena holding only the base.
    #[must_use]
    pub fn new(base: Base) -> Self {
        Self {
            next_id: 0,
            base,
            workers: BTreeMap::new(),
            enemies: BTreeMap::new(),
            turrets: BTreeMap::new(),
            launchers: BTreeMap::new(),
            batteries: BTreeMap::new(),
            patches: BTreeMap::new(),
            missiles: BTreeMap::new(),
            tags: BTreeMap::new(),
            pending_despawn: BTreeSet::new(),
        }
    }

    /// Allocates an id and stores the entity built from it.
    ///
    /// # Arguments
    ///
    /// * `make` - Builds the entity given its freshly allocated id
    pub fn spawn<T: ArenaEntity>(&mut self, make: impl FnOnce(EntityId) -> T) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        T::storage_mut(self).insert(id, make(id));
        self.tags.insert(id, T::TAG);
        id
    }

    /// Returns an entity of kind `T`.
    #[must_use]
    pub fn get<T: ArenaEntity>(&self, id: EntityId) -> Option<&T> {
        T::storage(self).get(&id)
    }

    /// Returns a mutable entity of kind `T`.
    #[must_use]
    pub fn get_mut<T: ArenaEntity>(&mut self, id: EntityId) -> Option<&mut T> {
        T::storage_mut(self).get_mut(&id)
    }

    /// Snapshot of the ids of kind `T`, in id order.
    ///
    /// Systems iterate this while mutating entities one at a time.
    #[must_use]
    pub fn ids<T: ArenaEntity>(&self) -> Vec<EntityId> {
        T::storage(self).keys().copied().collect()
    }

    /// Number of entities of kind `T`.
    #[must_use]
    pub fn count<T: ArenaEntity>(&self) -> usize {
        T::storage(self).len()
    }

    /// Kind of a live entity.
    #[must_use]
    pub fn tag_of(&self, id: EntityId) -> Option<EntityTag> {
        self.tags.get(&id).copied()
    }

    /// The base.
    #[must_use]
    pub const fn base(&self) -> &Base {
        &self.base
    }

    /// Mutable base.
    #[must_use]
    pub fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }

    /// All workers.
    #[must_use]
    pub const fn workers(&self) -> &WorkerMap {
        &self.workers
    }

    /// All enemies, including any killed this tick and not yet swept.
    #[must_use]
    pub const fn enemies(&self) -> &BTreeMap<EntityId, Enemy> {
        &self.enemies
    }

    /// All turrets.
    #[must_use]
    pub const fn turrets(&self) -> &BTreeMap<EntityId, Turret> {
        &self.turrets
    }

    /// All missile launchers.
    #[must_use]
    pub const fn launchers(&self) -> &BTreeMap<EntityId, MissileLauncher> {
        &self.launchers
    }

    /// All batteries.
    #[must_use]
    pub const fn batteries(&self) -> &BTreeMap<EntityId, Battery> {
        &self.batteries
    }

    /// All mineral patches.
    #[must_use]
    pub const fn patches(&self) -> &BTreeMap<EntityId, MineralPatch> {
        &self.patches
    }

    /// Turret missiles in flight.
    #[must_use]
    pub const fn missiles(&self) -> &BTreeMap<EntityId, Missile> {
        &self.missiles
    }

    // -------------------------------------------------------------------------
    // Target resolution
    // -------------------------------------------------------------------------

    /// Position of an attackable target, if it still exists.
    #[must_use]
    pub fn position_of(&self, target: TargetRef) -> Option<Vec2> {
        match target {
            TargetRef::Base => Some(self.base.body.position),
            TargetRef::Entity(id) => match self.tag_of(id)? {
                EntityTag::Worker => self.workers.get(&id).map(|w| w.body.position),
                EntityTag::Turret => self.turrets.get(&id).map(|t| t.body.position),
                EntityTag::Battery => self.batteries.get(&id).map(|b| b.body.position),
                EntityTag::MissileLauncher => self.launchers.get(&id).map(|l| l.body.position),
                EntityTag::Enemy => self.enemies.get(&id).map(|e| e.body.position),
                EntityTag::MineralPatch => self.patches.get(&id).map(|p| p.body.position),
                EntityTag::Missile => self.missiles.get(&id).map(|m| m.position),
            },
        }
    }

    /// Health of an attackable target, if it still exists.
    #[must_use]
    pub fn health_of(&self, target: TargetRef) -> Option<Health> {
        match target {
            TargetRef::Base => Some(self.base.health),
            TargetRef::Entity(id) => match self.tag_of(id)? {
                EntityTag::Worker => self.workers.get(&id).map(|w| w.health),
                EntityTag::Turret => self.turrets.get(&id).map(|t| t.health),
                EntityTag::Battery => self.batteries.get(&id).map(|b| b.health),
                EntityTag::MissileLauncher => self.launchers.get(&id).map(|l| l.health),
                EntityTag::Enemy => self.enemies.get(&id).map(|e| e.health),
                EntityTag::MineralPatch | EntityTag::Missile => None,
            },
        }
    }

    /// True if the target exists and has hp left.
    #[must_use]
    pub fn is_alive(&self, target: TargetRef) -> bool {
        self.health_of(target).is_some_and(|h| !h.is_dead())
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    /// Schedules an entity for removal at the next sweep.
    pub fn mark_despawn(&mut self, id: EntityId) {
        self.pending_despawn.insert(id);
    }

    /// Removes every dead or marked entity in one pass.
    ///
    /// Dead workers release their patch bookkeeping first: the lock and
    /// queue slot on every patch, and one count on their target patch.
    /// Returns the removed entities except missiles, in id order per kind.
    pub fn sweep(&mut self, now: Millis) -> Vec<(EntityId, EntityTag)> {
        let mut removed = Vec::new();

        let dead_workers: Vec<(EntityId, Option<EntityId>)> = self
            .workers
            .values()
            .filter(|w| w.health.is_dead() || self.pending_despawn.contains(&w.id))
            .map(|w| (w.id, w.target_patch))
            .collect();
        for (id, target) in dead_workers {
            for patch in self.patches.values_mut() {
                patch.forget(id, now);
            }
            if let Some(patch) = target.and_then(|p| self.patches.get_mut(&p)) {
                patch.remove_worker();
            }
            self.workers.remove(&id);
            removed.push((id, EntityTag::Worker));
        }

        let pending = &self.pending_despawn;
        Self::sweep_kind(&mut self.enemies, &mut removed, |e| {
            e.health.is_dead() || pending.contains(&e.id)
        });
        Self::sweep_kind(&mut self.turrets, &mut removed, |t| t.health.is_dead());
        Self::sweep_kind(&mut self.launchers, &mut removed, |l| l.health.is_dead());
        Self::sweep_kind(&mut self.batteries, &mut removed, |b| b.health.is_dead());

        let spent: Vec<EntityId> = self
            .missiles
            .values()
            .filter(|m| !m.active)
            .map(|m| m.id)
            .collect();
        for id in spent {
            self.missiles.remove(&id);
            self.tags.remove(&id);
        }

        for (id, _) in &removed {
            self.tags.remove(id);
        }
        self.pending_despawn.clear();
        removed
    }

    fn sweep_kind<T: ArenaEntity>(
        storage: &mut BTreeMap<EntityId, T>,
        removed: &mut Vec<(EntityId, EntityTag)>,
        is_gone: impl Fn(&T) -> bool,
    ) {
        let gone: Vec<EntityId> = storage
            .iter()
            .filter(|(_, e)| is_gone(e))
            .map(|(id, _)| *id)
            .collect();
        for id in gone {
            storage.remove(&id);
            removed.push((id, T::TAG));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EnemyKind, WorkerState};

    fn arena() -> Arena {
        Arena::new(Base::new(Vec2::new(500.0, 800.0)))
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn ids_are_shared_across_kinds() {
            let mut arena = arena();
            let a = arena.spawn(|id| Turret::new(id, Vec2::ZERO));
            let b = arena.spawn(|id| Battery::new(id, Vec2::ZERO));
            let c = arena.spawn(|id| Turret::new(id, Vec2::ZERO));

            assert!(a < b && b < c);
            assert_eq!(arena.tag_of(b), Some(EntityTag::Battery));
            assert_eq!(arena.ids::<Turret>(), vec![a, c]);
        }

        #[test]
        fn spawned_entity_knows_its_id() {
            let mut arena = arena();
            let id = arena.spawn(|id| Worker::new(id, Vec2::ZERO, 1.0));
            assert_eq!(arena.get::<Worker>(id).map(|w| w.id), Some(id));
        }

        #[test]
        fn wrong_kind_lookup_is_none() {
            let mut arena = arena();
            let id = arena.spawn(|id| Turret::new(id, Vec2::ZERO));
            assert!(arena.get::<Battery>(id).is_none());
        }
    }

    mod target_tests {
        use super::*;

        #[test]
        fn base_always_resolves() {
            let arena = arena();
            assert_eq!(arena.position_of(TargetRef::Base), Some(Vec2::new(500.0, 800.0)));
            assert!(arena.is_alive(TargetRef::Base));
        }

        #[test]
        fn removed_entity_resolves_to_none() {
            let mut arena = arena();
            let id = arena.spawn(|id| Turret::new(id, Vec2::ONE));
            assert_eq!(arena.position_of(TargetRef::Entity(id)), Some(Vec2::ONE));

            if let Some(t) = arena.get_mut::<Turret>(id) {
                t.health.take_damage(1000.0);
            }
            assert!(!arena.is_alive(TargetRef::Entity(id)));
            arena.sweep(0);
            assert_eq!(arena.position_of(TargetRef::Entity(id)), None);
            assert_eq!(arena.tag_of(id), None);
        }
    }

    mod sweep_tests {
        use super::*;

        #[test]
        fn sweep_removes_dead_and_marked_once() {
            let mut arena = arena();
            let dead = arena.spawn(|id| Enemy::new(id, Vec2::ZERO, EnemyKind::Normal, 1, 1.0));
            let fled = arena.spawn(|id| Enemy::new(id, Vec2::ZERO, EnemyKind::Fast, 1, 1.0));
            let alive = arena.spawn(|id| Enemy::new(id, Vec2::ZERO, EnemyKind::Tank, 1, 1.0));

            if let Some(e) = arena.get_mut::<Enemy>(dead) {
                e.health.take_damage(500.0);
            }
            arena.mark_despawn(fled);
            arena.mark_despawn(fled);

            let removed = arena.sweep(0);
            assert_eq!(
                removed,
                vec![(dead, EntityTag::Enemy), (fled, EntityTag::Enemy)]
            );
            assert_eq!(arena.ids::<Enemy>(), vec![alive]);
            assert!(arena.sweep(0).is_empty());
        }

        #[test]
        fn dead_worker_releases_patch() {
            let mut arena = arena();
            let patch = arena.spawn(|id| MineralPatch::new(id, Vec2::ZERO, 100.0, 0));
            let worker = arena.spawn(|id| {
                let mut w = Worker::new(id, Vec2::ZERO, 1.0);
                w.target_patch = Some(patch);
                w
            });
            let workers = arena.workers.clone();
            let snapshot = workers[&worker].clone();
            if let Some(p) = arena.patches.get_mut(&patch) {
                p.add_worker();
                assert!(p.start_mining(&snapshot, 0, &workers));
            }
            if let Some(w) = arena.get_mut::<Worker>(worker) {
                w.state = WorkerState::Mining;
                w.health.take_damage(100.0);
            }

            arena.sweep(250);

            let p = &arena.patches()[&patch];
            assert!(p.current_miner().is_none());
            assert_eq!(p.worker_count(), 0);
            assert_eq!(p.last_mine_time(), Some(250));
            assert_eq!(arena.count::<Worker>(), 0);
        }

        #[test]
        fn spent_missiles_are_not_reported() {
            let mut arena = arena();
            let id = arena.spawn(|id| Missile::new(id, Vec2::ZERO, Vec2::X, 25.0, 1.0));
            if let Some(m) = arena.get_mut::<Missile>(id) {
                m.active = false;
            }
            assert!(arena.sweep(0).is_empty());
            assert_eq!(arena.count::<Missile>(), 0);
        }
    }
}
