//! Turret missile flight.

use super::System;
use crate::world::World;

/// Moves turret missiles and retires any that leave the world.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectileSystem;

impl System for ProjectileSystem {
    fn name(&self) -> &'static str {
        "projectile"
    }

    fn run(&self, world: &mut World) {
        let config = &world.config;
        for missile in world.arena.missiles.values_mut().filter(|m| m.active) {
            missile.advance();
            if !config.in_bounds(missile.position.x, missile.position.y) {
                missile.active = false;
            }
        }
    }
}
