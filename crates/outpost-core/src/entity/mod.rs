//! Entity types for the base-defense simulation.
//!
//! Every entity kind is a plain struct that embeds the shared components
//! from [`components`] by value. Behavior is dispatched by kind through the
//! per-kind collections in [`Arena`](crate::arena::Arena), never through
//! trait objects:
//! - [`EntityId`]: unique identifier shared across all kinds
//! - [`EntityTag`]: kind classification, used by the arena's id index
//! - [`TargetRef`]: what an enemy is attacking (the base or an entity)
//!
//! # Example
//!
//! ```
//! use outpost_core::entity::{EntityId, EntityTag, TargetRef};
//!
//! let id = EntityId::new(42);
//! assert_eq!(id.as_u64(), 42);
//! assert_eq!(TargetRef::Entity(id).entity(), Some(id));
//! assert_eq!(EntityTag::Worker.to_string(), "Worker");
//! ```

pub mod components;
pub mod enemy;
pub mod missile;
pub mod patch;
pub mod structures;
pub mod worker;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{Body, Health};
pub use enemy::{Enemy, EnemyKind};
pub use missile::Missile;
pub use patch::{MineralPatch, WorkerMap};
pub use structures::{Base, Battery, HomingMissile, MissileLauncher, Turret};
pub use worker::{Worker, WorkerState};

/// Unique identifier for an entity.
///
/// Ids are allocated from one monotonically increasing counter shared by
/// all kinds, so an id never refers to two entities over a session. Holders
/// of an id (an enemy's target, a missile's target, a worker's patch) look
/// it up on use and treat "not found" as the entity being gone.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// Harvester shuttling minerals between a patch and the base.
    Worker,
    /// Hostile unit.
    Enemy,
    /// Rotating gun firing straight missiles.
    Turret,
    /// Launcher firing homing missiles.
    MissileLauncher,
    /// Area healer.
    Battery,
    /// Finite mineral node.
    MineralPatch,
    /// Turret projectile.
    Missile,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Worker => write!(f, "Worker"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Turret => write!(f, "Turret"),
            Self::MissileLauncher => write!(f, "MissileLauncher"),
            Self::Battery => write!(f, "Battery"),
            Self::MineralPatch => write!(f, "MineralPatch"),
            Self::Missile => write!(f, "Missile"),
        }
    }
}

/// Something an enemy can attack.
///
/// The base is a singleton with no id; everything else is referenced by id
/// and may disappear between ticks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    /// The player's base.
    Base,
    /// A worker, turret or battery.
    Entity(EntityId),
}

impl TargetRef {
    /// Returns the entity id, or `None` for the base.
    #[must_use]
    pub const fn entity(self) -> Option<EntityId> {
        match self {
            Self::Base => None,
            Self::Entity(id) => Some(id),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
