//! Worker entity: a harvester cycling between a mineral patch and the base.
//!
//! The state machine itself runs in
//! [`WorkerSystem`](crate::systems::WorkerSystem); this module holds the data
//! and the capacity arithmetic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Body, EntityId, Health};
use crate::constants::{WORKER_CAPACITY, WORKER_HP, WORKER_SIZE, WORKER_SPEED};

/// Phase of the harvest cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    /// Walking to the target patch, or waiting in its queue.
    ToMineral,
    /// Holding the patch's mining lock.
    Mining,
    /// Carrying minerals home.
    ToBase,
    /// No patch assigned.
    Idle,
}

/// A harvester.
///
/// # Invariants
///
/// `0 <= minerals <= capacity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique id.
    pub id: EntityId,
    /// Position and footprint.
    pub body: Body,
    /// Hit points.
    pub health: Health,
    /// Current phase.
    pub state: WorkerState,
    /// Patch this worker harvests, if any.
    pub target_patch: Option<EntityId>,
    /// Minerals carried.
    pub minerals: f32,
    /// Carrying capacity.
    pub capacity: f32,
    /// Distance moved per tick.
    pub speed: f32,
}

impl Worker {
    /// Creates an unassigned worker heading nowhere.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, speed_scale: f32) -> Self {
        Self {
            id,
            body: Body::new(position, WORKER_SIZE),
            health: Health::full(WORKER_HP),
            state: WorkerState::ToMineral,
            target_patch: None,
            minerals: 0.0,
            capacity: WORKER_CAPACITY,
            speed: WORKER_SPEED * speed_scale,
        }
    }

    /// Remaining carrying capacity.
    #[must_use]
    pub fn free_capacity(&self) -> f32 {
        (self.capacity - self.minerals).max(0.0)
    }

    /// True when carrying a full load.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.minerals >= self.capacity
    }

    /// Adds up to `amount` minerals, returning what was actually taken.
    pub fn load(&mut self, amount: f32) -> f32 {
        let taken = amount.min(self.free_capacity()).max(0.0);
        self.minerals += taken;
        taken
    }

    /// Empties the cargo hold, returning what was carried.
    pub fn unload(&mut self) -> f32 {
        std::mem::take(&mut self.minerals)
    }
}
