//! Battery energy regeneration and area healing.
//!
//! Healing uses a flat gate: a battery holding at least
//! [`BATTERY_BATCH_COST`] energy heals every damaged unit in range by
//! [`BATTERY_HEAL`] hp and pays the batch cost once, however many units it
//! healed. Candidates are the base, workers, turrets and the other
//! batteries (hp only; energy is never transferred).

use super::System;
use crate::arena::Arena;
use crate::constants::{BATTERY_BATCH_COST, BATTERY_ENERGY_REGEN, BATTERY_HEAL};
use crate::entity::{Battery, EntityTag, TargetRef};
use crate::world::World;

/// Recharges and heals with every battery.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatterySystem;

impl System for BatterySystem {
    fn name(&self) -> &'static str {
        "battery"
    }

    fn run(&self, world: &mut World) {
        let arena = &mut world.arena;
        for id in arena.ids::<Battery>() {
            let Some(battery) = arena.batteries.get_mut(&id) else {
                continue;
            };
            battery.healing_targets.clear();
            battery.energy = (battery.energy + BATTERY_ENERGY_REGEN).min(battery.max_energy);
            if battery.energy < BATTERY_BATCH_COST {
                continue;
            }

            let center = battery.body.position;
            let range = battery.range;
            let in_range = |p: glam::Vec2| p.distance(center) <= range;

            let mut targets = Vec::new();
            if arena.base.health.is_damaged() && in_range(arena.base.body.position) {
                targets.push(TargetRef::Base);
            }
            targets.extend(
                arena
                    .workers
                    .values()
                    .filter(|w| w.health.is_damaged() && in_range(w.body.position))
                    .map(|w| TargetRef::Entity(w.id)),
            );
            targets.extend(
                arena
                    .turrets
                    .values()
                    .filter(|t| t.health.is_damaged() && in_range(t.body.position))
                    .map(|t| TargetRef::Entity(t.id)),
            );
            targets.extend(
                arena
                    .batteries
                    .values()
                    .filter(|b| b.id != id && b.health.is_damaged() && in_range(b.body.position))
                    .map(|b| TargetRef::Entity(b.id)),
            );
            if targets.is_empty() {
                continue;
            }

            for target in &targets {
                heal(arena, *target);
            }
            if let Some(battery) = arena.batteries.get_mut(&id) {
                battery.energy = (battery.energy - BATTERY_BATCH_COST).max(0.0);
                battery.healing_targets = targets;
            }
        }
    }
}

fn heal(arena: &mut Arena, target: TargetRef) {
    let health = match target {
        TargetRef::Base => Some(&mut arena.base.health),
        TargetRef::Entity(id) => match arena.tag_of(id) {
            Some(EntityTag::Worker) => arena.workers.get_mut(&id).map(|w| &mut w.health),
            Some(EntityTag::Turret) => arena.turrets.get_mut(&id).map(|t| &mut t.health),
            Some(EntityTag::Battery) => arena.batteries.get_mut(&id).map(|b| &mut b.health),
            _ => None,
        },
    };
    if let Some(health) = health {
        health.heal(BATTERY_HEAL);
    }
}

// =============================================================================
// Tests
// =============================================================================
