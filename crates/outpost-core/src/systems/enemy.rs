//! Enemy targeting and movement.
//!
//! Target priority, first match wins:
//!
//! 1. the closest worker or turret (one combined tier)
//! 2. the closest battery
//! 3. the base
//!
//! Range plays no part; an enemy always has something to walk toward. The
//! target's position is cached at acquisition and the enemy closes on that
//! cached point until it is within [`COMBAT_RANGE`]. Damage is dealt by the
//! collision pass, not here.

use glam::Vec2;

use super::System;
use crate::arena::Arena;
use crate::constants::{COMBAT_RANGE, TARGET_UPDATE_TICKS};
use crate::entity::{Enemy, EntityId, TargetRef};
use crate::world::World;

/// Re-targets and moves every enemy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemySystem;

impl System for EnemySystem {
    fn name(&self) -> &'static str {
        "enemy"
    }

    fn run(&self, world: &mut World) {
        let arena = &mut world.arena;
        for id in arena.ids::<Enemy>() {
            let Some(enemy) = arena.enemies.get_mut(&id) else {
                continue;
            };
            if enemy.health.is_dead() {
                continue;
            }
            if enemy.attack_cooldown > 0 {
                enemy.attack_cooldown -= 1;
            }
            if enemy.target_update_cooldown > 0 {
                enemy.target_update_cooldown -= 1;
            }
            let position = enemy.body.position;
            let due = enemy.target_update_cooldown <= 0;
            let current = enemy.target;
            let stale = match current {
                None => true,
                Some(TargetRef::Base) => false,
                Some(target) => !arena.is_alive(target),
            };

            let acquired = (stale || due).then(|| find_target(arena, position));

            let Some(enemy) = arena.enemies.get_mut(&id) else {
                continue;
            };
            if let Some((target, attack_pos)) = acquired {
                enemy.target = Some(target);
                enemy.attack_pos = Some(attack_pos);
                enemy.target_update_cooldown = TARGET_UPDATE_TICKS;
            }
            if let Some(goal) = enemy.attack_pos {
                if enemy.body.distance_to(goal) > COMBAT_RANGE {
                    let speed = enemy.speed;
                    enemy.body.move_toward(goal, speed);
                }
            }
        }
    }
}

/// Picks what an enemy at `from` should attack, with its current position.
#[must_use]
pub fn find_target(arena: &Arena, from: Vec2) -> (TargetRef, Vec2) {
    let closest = |candidates: &mut dyn Iterator<Item = (EntityId, Vec2, bool)>| {
        candidates
            .filter(|(_, _, dead)| !dead)
            .map(|(id, pos, _)| (id, pos, pos.distance(from)))
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(id, pos, _)| (TargetRef::Entity(id), pos))
    };

    let mut front_line = arena
        .workers
        .values()
        .map(|w| (w.id, w.body.position, w.health.is_dead()))
        .chain(
            arena
                .turrets
                .values()
                .map(|t| (t.id, t.body.position, t.health.is_dead())),
        );
    let mut batteries = arena
        .batteries
        .values()
        .map(|b| (b.id, b.body.position, b.health.is_dead()));

    closest(&mut front_line)
        .or_else(|| closest(&mut batteries))
        .unwrap_or((TargetRef::Base, arena.base.body.position))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::{Battery, EnemyKind, Turret, Worker};

    fn world() -> World {
        World::new(
            SimConfig {
                initial_workers: 0,
                ..SimConfig::default()
            },
            1,
        )
    }

    fn spawn_enemy(world: &mut World, position: Vec2) -> EntityId {
        world
            .arena
            .spawn(|id| Enemy::new(id, position, EnemyKind::Normal, 1, 1.0))
    }

    mod targeting_tests {
        use super::*;

        #[test]
        fn base_when_nothing_else_exists() {
            let w = world();
            let (target, pos) = find_target(&w.arena, Vec2::ZERO);
            assert_eq!(target, TargetRef::Base);
            assert_eq!(pos, w.arena.base().body.position);
        }

        #[test]
        fn battery_before_base() {
            let mut w = world();
            let b = w.arena.spawn(|id| Battery::new(id, Vec2::new(3000.0, 100.0)));
            let (target, _) = find_target(&w.arena, Vec2::ZERO);
            assert_eq!(target, TargetRef::Entity(b));
        }

        #[test]
        fn worker_or_turret_before_closer_battery() {
            let mut w = world();
            w.arena.spawn(|id| Battery::new(id, Vec2::new(10.0, 0.0)));
            let far_worker = w.arena.spawn(|id| Worker::new(id, Vec2::new(900.0, 0.0), 1.0));
            let turret = w.arena.spawn(|id| Turret::new(id, Vec2::new(500.0, 0.0)));

            let (target, _) = find_target(&w.arena, Vec2::ZERO);
            assert_eq!(target, TargetRef::Entity(turret));

            w.arena.turrets.clear();
            let (target, _) = find_target(&w.arena, Vec2::ZERO);
            assert_eq!(target, TargetRef::Entity(far_worker));
        }

        #[test]
        fn equidistant_worker_and_turret_share_a_tier() {
            let mut w = world();
            w.arena.spawn(|id| Battery::new(id, Vec2::new(5.0, 0.0)));
            let worker = w.arena.spawn(|id| Worker::new(id, Vec2::new(100.0, 0.0), 1.0));
            let turret = w.arena.spawn(|id| Turret::new(id, Vec2::new(-100.0, 0.0)));

            let (target, _) = find_target(&w.arena, Vec2::ZERO);
            assert!(target == TargetRef::Entity(worker) || target == TargetRef::Entity(turret));
        }
    }

    mod update_tests {
        use super::*;

        #[test]
        fn moves_toward_cached_position_until_in_range() {
            let mut w = world();
            let base = w.arena.base().body.position;
            let e = spawn_enemy(&mut w, base - Vec2::new(0.0, 100.0));

            EnemySystem.run(&mut w);
            let enemy = &w.arena.enemies()[&e];
            assert_eq!(enemy.target, Some(TargetRef::Base));
            assert_eq!(enemy.target_update_cooldown, TARGET_UPDATE_TICKS);
            assert!((enemy.body.distance_to(base) - 98.8).abs() < 1e-3);

            for _ in 0..200 {
                EnemySystem.run(&mut w);
            }
            let d = w.arena.enemies()[&e].body.distance_to(base);
            assert!(d <= COMBAT_RANGE && d > COMBAT_RANGE - 1.2);
        }

        #[test]
        fn dead_target_triggers_reacquisition() {
            let mut w = world();
            let worker = w.arena.spawn(|id| Worker::new(id, Vec2::new(100.0, 0.0), 1.0));
            let e = spawn_enemy(&mut w, Vec2::ZERO);
            EnemySystem.run(&mut w);
            assert_eq!(w.arena.enemies()[&e].target, Some(TargetRef::Entity(worker)));

            if let Some(x) = w.arena.workers.get_mut(&worker) {
                x.health.take_damage(100.0);
            }
            EnemySystem.run(&mut w);
            assert_eq!(w.arena.enemies()[&e].target, Some(TargetRef::Base));
        }

        #[test]
        fn periodic_retarget_after_thirty_ticks() {
            let mut w = world();
            let e = spawn_enemy(&mut w, Vec2::new(100.0, 100.0));
            EnemySystem.run(&mut w);
            let turret = w.arena.spawn(|id| Turret::new(id, Vec2::new(200.0, 100.0)));

            for _ in 0..29 {
                EnemySystem.run(&mut w);
            }
            assert_eq!(w.arena.enemies()[&e].target, Some(TargetRef::Base));
            EnemySystem.run(&mut w);
            assert_eq!(w.arena.enemies()[&e].target, Some(TargetRef::Entity(turret)));
        }

        #[test]
        fn attack_cooldown_ticks_down() {
            let mut w = world();
            let e = spawn_enemy(&mut w, Vec2::ZERO);
            if let Some(enemy) = w.arena.enemies.get_mut(&e) {
                enemy.attack_cooldown = 2;
            }
            EnemySystem.run(&mut w);
            EnemySystem.run(&mut w);
            EnemySystem.run(&mut w);
            assert_eq!(w.arena.enemies()[&e].attack_cooldown, 0);
        }
    }
}
