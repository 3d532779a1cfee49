//! Shared components embedded by value in every entity kind.
//!
//! # Components
//!
//! - [`Body`]: position and footprint, with straight-line movement
//! - [`Health`]: hit points clamped to `[0, max]`

use glam::Vec2;
use serde::{Deserialize, Serialize};

// =============================================================================
// Body
// =============================================================================

/// Position and footprint.
///
/// `size` is a diameter proxy: two bodies touch when their distance is below
/// the mean of their sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// World position.
    pub position: Vec2,
    /// Footprint used for contact checks.
    pub size: f32,
}

impl Body {
    /// Creates a body at a position.
    #[must_use]
    pub const fn new(position: Vec2, size: f32) -> Self {
        Self { position, size }
    }

    /// Distance to a point.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Returns true if this body overlaps another of the given size at `point`.
    #[must_use]
    pub fn touches(&self, point: Vec2, other_size: f32) -> bool {
        self.distance_to(point) < (self.size + other_size) / 2.0
    }

    /// Moves straight toward `target` by at most `speed`, never overshooting.
    pub fn move_toward(&mut self, target: Vec2, speed: f32) {
        let offset = target - self.position;
        let dist = offset.length();
        if dist <= speed {
            self.position = target;
        } else if dist > 0.0 {
            self.position += offset / dist * speed;
        }
    }
}

// =============================================================================
// Health
// =============================================================================

/// Hit points.
///
/// # Invariants
///
/// `0 <= hp <= max_hp` after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    hp: f32,
    max_hp: f32,
}

impl Health {
    /// Creates full health.
    #[must_use]
    pub const fn full(max_hp: f32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> f32 {
        self.hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> f32 {
        self.max_hp
    }

    /// Fraction of max hp remaining.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.max_hp > 0.0 {
            self.hp / self.max_hp
        } else {
            0.0
        }
    }

    /// True once hp has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// True if below max hp and still alive.
    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.hp > 0.0 && self.hp < self.max_hp
    }

    /// Subtracts damage, clamping at zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).max(0.0);
    }

    /// Adds hit points, capped at max.
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Sets a new max and restores to full.
    pub fn reset_max(&mut self, max_hp: f32) {
        self.max_hp = max_hp;
        self.hp = max_hp;
    }
}

// =============================================================================
// Tests
// =============================================================================
