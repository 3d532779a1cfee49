//! Enemy entity and its per-kind stat table.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Body, EntityId, Health, TargetRef};
use crate::constants::WAVE_SCALING;

/// Enemy archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline attacker.
    Normal,
    /// Fast, fragile raider.
    Fast,
    /// Slow, heavily armored bruiser.
    Tank,
    /// Wave-5 multiples; prioritized by missile launchers.
    Boss,
    /// Tougher, quicker-hitting variant that arrives in squads.
    Elite,
}

impl EnemyKind {
    /// Hit points at wave 1.
    #[must_use]
    pub const fn base_hp(self) -> f32 {
        match self {
            Self::Normal => 100.0,
            Self::Fast => 60.0,
            Self::Tank => 300.0,
            Self::Boss => 1000.0,
            Self::Elite => 150.0,
        }
    }

    /// Damage per hit at wave 1.
    #[must_use]
    pub const fn base_damage(self) -> f32 {
        match self {
            Self::Normal => 10.0,
            Self::Fast => 5.0,
            Self::Tank => 20.0,
            Self::Boss => 40.0,
            Self::Elite => 15.0,
        }
    }

    /// Speed before the world speed scale.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            Self::Normal => 1.2,
            Self::Fast => 2.0,
            Self::Tank => 0.5,
            Self::Boss => 0.4,
            Self::Elite => 0.8,
        }
    }

    /// Ticks between hits.
    #[must_use]
    pub const fn attack_speed(self) -> i32 {
        match self {
            Self::Normal => 90,
            Self::Fast | Self::Tank => 120,
            Self::Boss => 45,
            Self::Elite => 60,
        }
    }

    /// Footprint.
    #[must_use]
    pub const fn size(self) -> f32 {
        match self {
            Self::Boss => 70.0,
            Self::Tank => 50.0,
            Self::Normal | Self::Fast | Self::Elite => 35.0,
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Fast => write!(f, "fast"),
            Self::Tank => write!(f, "tank"),
            Self::Boss => write!(f, "boss"),
            Self::Elite => write!(f, "elite"),
        }
    }
}

/// Multiplier applied to hp and damage for enemies spawned in `wave`.
#[must_use]
pub fn wave_scaling(wave: u32) -> f32 {
    let exponent = i32::try_from(wave.saturating_sub(1)).unwrap_or(i32::MAX);
    WAVE_SCALING.powi(exponent)
}

/// A hostile unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Unique id, also what homing missiles track.
    pub id: EntityId,
    /// Position and footprint.
    pub body: Body,
    /// Hit points, wave-scaled at spawn.
    pub health: Health,
    /// Archetype.
    pub kind: EnemyKind,
    /// Distance moved per tick. Not wave-scaled.
    pub speed: f32,
    /// Damage per hit, wave-scaled at spawn.
    pub damage: f32,
    /// Ticks the attack cooldown resets to after a hit.
    pub attack_speed: i32,
    /// Ticks until the next hit may land.
    pub attack_cooldown: i32,
    /// What this enemy is closing on.
    pub target: Option<TargetRef>,
    /// Cached position of the target at acquisition.
    pub attack_pos: Option<Vec2>,
    /// Ticks until the next periodic re-acquisition.
    pub target_update_cooldown: i32,
}

impl Enemy {
    /// Creates an enemy of `kind` scaled for `wave`.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, kind: EnemyKind, wave: u32, speed_scale: f32) -> Self {
        let scaling = wave_scaling(wave);
        Self {
            id,
            body: Body::new(position, kind.size()),
            health: Health::full(kind.base_hp() * scaling),
            kind,
            speed: kind.base_speed() * speed_scale,
            damage: kind.base_damage() * scaling,
            attack_speed: kind.attack_speed(),
            attack_cooldown: 0,
            target: None,
            attack_pos: None,
            target_update_cooldown: 0,
        }
    }

    /// Drops the current target so the next update re-acquires.
    pub fn clear_target(&mut self) {
        self.target = None;
        self.attack_pos = None;
    }

    /// True when the attack cooldown allows a hit.
    #[must_use]
    pub const fn can_attack(&self) -> bool {
        self.attack_cooldown <= 0
    }
}
