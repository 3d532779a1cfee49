//! Turret missile: a straight-flying projectile in the shared missile pool.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::constants::{MISSILE_SIZE, MISSILE_SPEED};

/// A straight-flying projectile fired by a turret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    /// Unique id.
    pub id: EntityId,
    /// World position.
    pub position: Vec2,
    /// Unit travel direction.
    pub direction: Vec2,
    /// Damage dealt on hit, copied from the turret at launch.
    pub damage: f32,
    /// Distance moved per tick.
    pub speed: f32,
    /// Footprint for hit tests.
    pub size: f32,
    /// Cleared on hit or when leaving the world; swept at end of tick.
    pub active: bool,
}

impl Missile {
    /// Creates a missile at `position` heading along `direction`.
    ///
    /// A zero direction is kept as zero, leaving the missile in place until
    /// it hits something or is swept.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, direction: Vec2, damage: f32, speed_scale: f32) -> Self {
        Self {
            id,
            position,
            direction: direction.normalize_or_zero(),
            damage,
            speed: MISSILE_SPEED * speed_scale,
            size: MISSILE_SIZE,
            active: true,
        }
    }

    /// Advances one tick along the direction of travel.
    pub fn advance(&mut self) {
        self.position += self.direction * self.speed;
    }
}
