//! Missile launcher targeting and homing missile flight.
//!
//! A launcher keeps one target until it dies, leaves the world, or moves out
//! of range. When it has none it picks the closest boss in range, else the
//! closest tank, else the closest enemy of any kind. A target that drifts
//! out of range is cleared and not replaced until the next tick.
//!
//! Launcher missiles are owned by their launcher, not the shared missile
//! pool. They re-aim at the target's live position every tick and detonate
//! within half the target's size. A missile whose target is gone is dropped.

use glam::Vec2;
use tracing::trace;

use super::System;
use crate::constants::{LAUNCHER_BOSS_MULTIPLIER, MISSILE_SPEED};
use crate::entity::{Enemy, EnemyKind, EntityId, HomingMissile, MissileLauncher};
use crate::world::World;

/// Targets, fires and flies missiles for every launcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct LauncherSystem;

impl System for LauncherSystem {
    fn name(&self) -> &'static str {
        "launcher"
    }

    fn run(&self, world: &mut World) {
        let missile_speed = MISSILE_SPEED * world.config.speed_scale;
        let arena = &mut world.arena;

        for id in arena.ids::<MissileLauncher>() {
            let Some(launcher) = arena.launchers.get_mut(&id) else {
                continue;
            };
            launcher.armament.tick();

            let alive = |target: EntityId| {
                arena
                    .enemies
                    .get(&target)
                    .is_some_and(|e| !e.health.is_dead())
            };
            if !launcher.target.is_some_and(alive) {
                launcher.target = pick_target(
                    arena.enemies.values(),
                    launcher.body.position,
                    launcher.armament.range,
                );
            }

            if let Some(target) = launcher.target.and_then(|t| arena.enemies.get(&t)) {
                let origin = launcher.body.position;
                if target.body.distance_to(origin) > launcher.armament.range {
                    launcher.target = None;
                } else if launcher.armament.ready() {
                    let missile = launch(launcher, target, missile_speed);
                    launcher.missiles.push(missile);
                    launcher.armament.reload();
                    trace!(launcher = %id, target = %target.id, "missile away");
                }
            }

            fly_missiles(launcher, &mut arena.enemies);
        }
    }
}

/// Closest boss in range, else closest tank, else closest of any kind.
pub(crate) fn pick_target<'a>(
    enemies: impl Iterator<Item = &'a Enemy> + Clone,
    origin: Vec2,
    range: f32,
) -> Option<EntityId> {
    let closest = |filter: &dyn Fn(&Enemy) -> bool| {
        enemies
            .clone()
            .filter(|e| !e.health.is_dead() && filter(e))
            .map(|e| (e.id, e.body.distance_to(origin)))
            .filter(|(_, dist)| *dist <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    };
    closest(&|e| e.kind == EnemyKind::Boss)
        .or_else(|| closest(&|e| e.kind == EnemyKind::Tank))
        .or_else(|| closest(&|_| true))
}

fn launch(launcher: &MissileLauncher, target: &Enemy, speed: f32) -> HomingMissile {
    let offset = target.body.position - launcher.body.position;
    let multiplier = if target.kind == EnemyKind::Boss {
        LAUNCHER_BOSS_MULTIPLIER
    } else {
        1.0
    };
    HomingMissile {
        position: launcher.body.position,
        target: target.id,
        angle: offset.y.atan2(offset.x),
        speed,
        damage: launcher.armament.damage * multiplier,
    }
}

/// Moves every missile of a launcher and resolves detonations.
fn fly_missiles(
    launcher: &mut MissileLauncher,
    enemies: &mut std::collections::BTreeMap<EntityId, Enemy>,
) {
    launcher.missiles.retain_mut(|missile| {
        let Some(target) = enemies
            .get_mut(&missile.target)
            .filter(|e| !e.health.is_dead())
        else {
            return false;
        };

        let offset = target.body.position - missile.position;
        missile.angle = offset.y.atan2(offset.x);
        missile.position += Vec2::from_angle(missile.angle) * missile.speed;

        if missile.position.distance(target.body.position) < target.body.size / 2.0 {
            target.health.take_damage(missile.damage);
            return false;
        }
        true
    });
}

// =============================================================================
// Tests
// =============================================================================
