//! Stationary structures: the base and the three buildable defenses.
//!
//! # Structures
//!
//! - [`Base`]: the singleton the player must keep alive
//! - [`Turret`]: rotates toward the nearest enemy and fires straight missiles
//! - [`MissileLauncher`]: fires homing missiles, bosses and tanks first
//! - [`Battery`]: regenerates energy and heals damaged units in range
//!
//! Turrets and launchers share an [`Armament`] so they upgrade the same way.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Body, EntityId, Health, TargetRef};
use crate::constants::{
    BASE_HP, BASE_SIZE, BATTERY_ENERGY_DAMAGE_FACTOR, BATTERY_HP, BATTERY_MAX_ENERGY,
    BATTERY_RANGE, BATTERY_SIZE, LAUNCHER_DAMAGE, LAUNCHER_FIRE_RATE, LAUNCHER_HP, LAUNCHER_RANGE,
    LAUNCHER_SIZE, TURRET_DAMAGE, TURRET_FIRE_RATE, TURRET_HP, TURRET_RANGE, TURRET_SIZE,
    UPGRADE_BASE_COST, UPGRADE_FIRE_RATE, UPGRADE_FIRE_RATE_FLOOR, UPGRADE_POWER, UPGRADE_RANGE,
};

// =============================================================================
// Base
// =============================================================================

/// The player's base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    /// Position and footprint.
    pub body: Body,
    /// Hit points. Zero ends the game.
    pub health: Health,
    /// Patch closest to the base; new workers go here by default.
    pub default_patch: Option<EntityId>,
}

impl Base {
    /// Creates a base at full health.
    #[must_use]
    pub const fn new(position: Vec2) -> Self {
        Self {
            body: Body::new(position, BASE_SIZE),
            health: Health::full(BASE_HP),
            default_patch: None,
        }
    }
}

// =============================================================================
// Armament
// =============================================================================

/// Weapon stats shared by turrets and missile launchers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Armament {
    /// Upgrade level, starting at 1.
    pub level: u32,
    /// Damage per shot.
    pub damage: f32,
    /// Ticks between shots.
    pub fire_rate: f32,
    /// Ticks until the next shot may fire.
    pub cooldown: f32,
    /// Engagement range.
    pub range: f32,
}

impl Armament {
    /// Creates a level-1 armament ready to fire.
    #[must_use]
    pub const fn new(damage: f32, fire_rate: f32, range: f32) -> Self {
        Self {
            level: 1,
            damage,
            fire_rate,
            cooldown: 0.0,
            range,
        }
    }

    /// Counts the cooldown down by one tick.
    pub fn tick(&mut self) {
        if self.cooldown > 0.0 {
            self.cooldown -= 1.0;
        }
    }

    /// True when a shot may fire.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Restarts the cooldown after a shot.
    pub fn reload(&mut self) {
        self.cooldown = self.fire_rate;
    }

    /// Applies one upgrade step to the weapon stats.
    pub fn upgrade(&mut self) {
        self.level += 1;
        self.damage *= UPGRADE_POWER;
        self.fire_rate = (self.fire_rate * UPGRADE_FIRE_RATE).max(UPGRADE_FIRE_RATE_FLOOR);
        self.range *= UPGRADE_RANGE;
    }

    /// Mineral cost of the next upgrade: `150 * 2^(level - 1)`.
    #[must_use]
    pub fn upgrade_cost(&self) -> f32 {
        let exponent = i32::try_from(self.level.saturating_sub(1)).unwrap_or(i32::MAX);
        UPGRADE_BASE_COST * 2f32.powi(exponent)
    }
}

fn upgrade_health(health: &mut Health) {
    health.reset_max(health.max_hp() * UPGRADE_POWER);
}

// =============================================================================
// Turret
// =============================================================================

/// A rotating gun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    /// Unique id.
    pub id: EntityId,
    /// Position and footprint.
    pub body: Body,
    /// Hit points.
    pub health: Health,
    /// Weapon stats.
    pub armament: Armament,
    /// Barrel heading in radians, kept in `(-pi, pi]`.
    pub rotation: f32,
}

impl Turret {
    /// Creates a level-1 turret.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            body: Body::new(position, TURRET_SIZE),
            health: Health::full(TURRET_HP),
            armament: Armament::new(TURRET_DAMAGE, TURRET_FIRE_RATE, TURRET_RANGE),
            rotation: 0.0,
        }
    }

    /// Upgrades weapon stats and max hp, restoring hp to full.
    pub fn upgrade(&mut self) {
        self.armament.upgrade();
        upgrade_health(&mut self.health);
    }
}

// =============================================================================
// Missile launcher
// =============================================================================

/// A homing missile owned by the launcher that fired it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomingMissile {
    /// World position.
    pub position: Vec2,
    /// Enemy being tracked.
    pub target: EntityId,
    /// Current heading in radians.
    pub angle: f32,
    /// Distance moved per tick.
    pub speed: f32,
    /// Damage on detonation, boss multiplier already applied.
    pub damage: f32,
}

/// A launcher of homing missiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissileLauncher {
    /// Unique id.
    pub id: EntityId,
    /// Position and footprint.
    pub body: Body,
    /// Hit points.
    pub health: Health,
    /// Weapon stats.
    pub armament: Armament,
    /// Enemy currently engaged.
    pub target: Option<EntityId>,
    /// Missiles in flight.
    pub missiles: Vec<HomingMissile>,
}

impl MissileLauncher {
    /// Creates a level-1 launcher.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            body: Body::new(position, LAUNCHER_SIZE),
            health: Health::full(LAUNCHER_HP),
            armament: Armament::new(LAUNCHER_DAMAGE, LAUNCHER_FIRE_RATE, LAUNCHER_RANGE),
            target: None,
            missiles: Vec::new(),
        }
    }

    /// Upgrades weapon stats and max hp, restoring hp to full.
    pub fn upgrade(&mut self) {
        self.armament.upgrade();
        upgrade_health(&mut self.health);
    }
}

// =============================================================================
// Battery
// =============================================================================

/// An energy-powered area healer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    /// Unique id.
    pub id: EntityId,
    /// Position and footprint.
    pub body: Body,
    /// Hit points.
    pub health: Health,
    /// Stored energy, in `[0, max_energy]`.
    pub energy: f32,
    /// Energy cap.
    pub max_energy: f32,
    /// Healing range.
    pub range: f32,
    /// Units healed this tick. Presentation only.
    pub healing_targets: Vec<TargetRef>,
}

impl Battery {
    /// Creates a fully charged battery.
    #[must_use]
    pub const fn new(id: EntityId, position: Vec2) -> Self {
        Self {
            id,
            body: Body::new(position, BATTERY_SIZE),
            health: Health::full(BATTERY_HP),
            energy: BATTERY_MAX_ENERGY,
            max_energy: BATTERY_MAX_ENERGY,
            range: BATTERY_RANGE,
            healing_targets: Vec::new(),
        }
    }

    /// Absorbs a hit: energy drains at twice the damage until empty, then
    /// hp takes the hit.
    pub fn absorb(&mut self, damage: f32) {
        if self.energy > 0.0 {
            self.energy = (self.energy - damage * BATTERY_ENERGY_DAMAGE_FACTOR).max(0.0);
        } else {
            self.health.take_damage(damage);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
