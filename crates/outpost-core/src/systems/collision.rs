//! Hit and melee resolution, followed by the once-per-tick removal sweep.
//!
//! # Order
//!
//! 1. Turret missiles: each active missile hits the first living enemy (in
//!    id order) whose footprint it overlaps, deals its damage and is spent.
//! 2. Melee: each living enemy checks contact against the base, then every
//!    worker, then every turret, then every battery. Only the first contact
//!    is resolved. If its attack cooldown is ready the enemy strikes and the
//!    cooldown restarts; a battery soaks the blow with its energy first. An
//!    enemy that destroys its target forgets it and re-acquires next tick.
//!    An enemy touching nothing is scheduled for removal if it has left the
//!    world.
//! 3. Sweep: everything dead or scheduled is removed and reported, then the
//!    base is checked for defeat.

use tracing::{debug, info};

use super::System;
use crate::arena::Arena;
use crate::entity::{Enemy, EntityTag, TargetRef};
use crate::events::GameEvent;
use crate::world::{GameStatus, World};

/// Resolves contacts and removes the dead.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionSystem;

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn run(&self, world: &mut World) {
        resolve_missiles(&mut world.arena);
        resolve_melee(world);

        let now = world.now();
        for (id, tag) in world.arena.sweep(now) {
            debug!(id = %id, tag = %tag, "entity removed");
            world.events.push(GameEvent::EntityDestroyed { id, tag });
        }

        if world.arena.base.health.is_dead() && !world.is_over() {
            world.status.insert(GameStatus::GAME_OVER);
            world.events.warn("Game Over! Base destroyed!");
            world.events.push(GameEvent::GameOver);
            info!(
                wave = world.waves.wave,
                time_ms = now,
                "base destroyed, game over"
            );
        }
    }
}

fn resolve_missiles(arena: &mut Arena) {
    for missile in arena.missiles.values_mut().filter(|m| m.active) {
        let hit = arena.enemies.values_mut().find(|e| {
            !e.health.is_dead() && e.body.touches(missile.position, missile.size)
        });
        if let Some(enemy) = hit {
            enemy.health.take_damage(missile.damage);
            missile.active = false;
        }
    }
}

fn resolve_melee(world: &mut World) {
    let arena = &mut world.arena;
    for id in arena.ids::<Enemy>() {
        let Some(enemy) = arena.enemies.get(&id) else {
            continue;
        };
        if enemy.health.is_dead() {
            continue;
        }

        let Some(contact) = first_contact(arena, enemy) else {
            let pos = enemy.body.position;
            if !world.config.in_bounds(pos.x, pos.y) {
                arena.mark_despawn(id);
            }
            continue;
        };
        if !enemy.can_attack() {
            continue;
        }

        let damage = enemy.damage;
        strike(arena, contact, damage);
        let destroyed = contact != TargetRef::Base && !arena.is_alive(contact);

        if let Some(enemy) = arena.enemies.get_mut(&id) {
            enemy.attack_cooldown = enemy.attack_speed;
            if destroyed {
                enemy.clear_target();
            }
        }
    }
}

/// First structure or unit the enemy is touching, in priority order.
fn first_contact(arena: &Arena, enemy: &Enemy) -> Option<TargetRef> {
    let pos = enemy.body.position;
    let size = enemy.body.size;

    if arena.base.body.touches(pos, size) {
        return Some(TargetRef::Base);
    }
    arena
        .workers
        .values()
        .filter(|w| !w.health.is_dead() && w.body.touches(pos, size))
        .map(|w| w.id)
        .chain(
            arena
                .turrets
                .values()
                .filter(|t| !t.health.is_dead() && t.body.touches(pos, size))
                .map(|t| t.id),
        )
        .chain(
            arena
                .batteries
                .values()
                .filter(|b| !b.health.is_dead() && b.body.touches(pos, size))
                .map(|b| b.id),
        )
        .next()
        .map(TargetRef::Entity)
}

fn strike(arena: &mut Arena, target: TargetRef, damage: f32) {
    match target {
        TargetRef::Base => arena.base.health.take_damage(damage),
        TargetRef::Entity(id) => match arena.tag_of(id) {
            Some(EntityTag::Worker) => {
                if let Some(w) = arena.workers.get_mut(&id) {
                    w.health.take_damage(damage);
                }
            }
            Some(EntityTag::Turret) => {
                if let Some(t) = arena.turrets.get_mut(&id) {
                    t.health.take_damage(damage);
                }
            }
            Some(EntityTag::Battery) => {
                if let Some(b) = arena.batteries.get_mut(&id) {
                    b.absorb(damage);
                }
            }
            _ => {}
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::{Battery, EnemyKind, EntityId, MineralPatch, Missile, Turret, Worker};
    use glam::Vec2;

    fn world() -> World {
        World::new(
            SimConfig {
                initial_workers: 0,
                ..SimConfig::default()
            },
            1,
        )
    }

    fn spawn_enemy(world: &mut World, position: Vec2, kind: EnemyKind) -> EntityId {
        world
            .arena
            .spawn(|id| Enemy::new(id, position, kind, 1, 1.0))
    }

    fn destroyed(world: &World) -> Vec<(EntityId, EntityTag)> {
        world
            .events
            .events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::EntityDestroyed { id, tag } => Some((*id, *tag)),
                _ => None,
            })
            .collect()
    }

    mod missile_tests {
        use super::*;

        #[test]
        fn first_overlapping_enemy_takes_the_hit() {
            let mut w = world();
            let a = spawn_enemy(&mut w, Vec2::new(100.0, 100.0), EnemyKind::Normal);
            let b = spawn_enemy(&mut w, Vec2::new(105.0, 100.0), EnemyKind::Normal);
            w.arena
                .spawn(|id| Missile::new(id, Vec2::new(102.0, 100.0), Vec2::X, 25.0, 1.0));

            CollisionSystem.run(&mut w);

            assert!((w.arena.enemies()[&a].health.hp() - 75.0).abs() < 1e-4);
            assert!((w.arena.enemies()[&b].health.hp() - 100.0).abs() < 1e-4);
            assert_eq!(w.arena.count::<Missile>(), 0);
        }

        #[test]
        fn killing_hit_removes_enemy_once() {
            let mut w = world();
            let e = spawn_enemy(&mut w, Vec2::new(100.0, 100.0), EnemyKind::Fast);
            for _ in 0..3 {
                w.arena
                    .spawn(|id| Missile::new(id, Vec2::new(100.0, 100.0), Vec2::X, 25.0, 1.0));
            }

            CollisionSystem.run(&mut w);

            assert_eq!(w.arena.count::<Enemy>(), 0);
            assert_eq!(destroyed(&w), vec![(e, EntityTag::Enemy)]);
            assert_eq!(w.arena.count::<Missile>(), 0);
        }

        #[test]
        fn miss_keeps_missile() {
            let mut w = world();
            spawn_enemy(&mut w, Vec2::new(100.0, 100.0), EnemyKind::Normal);
            w.arena
                .spawn(|id| Missile::new(id, Vec2::new(300.0, 100.0), Vec2::X, 25.0, 1.0));

            CollisionSystem.run(&mut w);
            assert_eq!(w.arena.count::<Missile>(), 1);
        }
    }

    mod melee_tests {
        use super::*;

        #[test]
        fn base_contact_strikes_and_resets_cooldown() {
            let mut w = world();
            let base = w.arena.base().body.position;
            let e = spawn_enemy(&mut w, base + Vec2::new(50.0, 0.0), EnemyKind::Normal);

            CollisionSystem.run(&mut w);
            assert!((w.arena.base().health.hp() - 990.0).abs() < 1e-4);
            assert_eq!(w.arena.enemies()[&e].attack_cooldown, 90);

            CollisionSystem.run(&mut w);
            assert!((w.arena.base().health.hp() - 990.0).abs() < 1e-4);
        }

        #[test]
        fn base_outranks_touching_worker() {
            let mut w = world();
            let base = w.arena.base().body.position;
            let worker = w
                .arena
                .spawn(|id| Worker::new(id, base + Vec2::new(60.0, 0.0), 1.0));
            spawn_enemy(&mut w, base + Vec2::new(50.0, 0.0), EnemyKind::Normal);

            CollisionSystem.run(&mut w);
            assert!((w.arena.workers()[&worker].health.hp() - 50.0).abs() < 1e-4);
            assert!(w.arena.base().health.hp() < 1000.0);
        }

        #[test]
        fn killed_worker_releases_patch_and_clears_target() {
            let mut w = world();
            let patch = w.arena.ids::<MineralPatch>()[0];
            let worker = w.arena.spawn(|id| {
                let mut x = Worker::new(id, Vec2::new(100.0, 100.0), 1.0);
                x.target_patch = Some(patch);
                x.health.take_damage(20.0);
                x
            });
            if let Some(p) = w.arena.patches.get_mut(&patch) {
                p.add_worker();
            }
            let e = spawn_enemy(&mut w, Vec2::new(110.0, 100.0), EnemyKind::Boss);
            if let Some(enemy) = w.arena.enemies.get_mut(&e) {
                enemy.target = Some(TargetRef::Entity(worker));
                enemy.attack_pos = Some(Vec2::new(100.0, 100.0));
            }

            CollisionSystem.run(&mut w);

            assert_eq!(w.arena.count::<Worker>(), 0);
            assert_eq!(w.arena.patches()[&patch].worker_count(), 0);
            let enemy = &w.arena.enemies()[&e];
            assert!(enemy.target.is_none());
            assert!(enemy.attack_pos.is_none());
            assert_eq!(destroyed(&w), vec![(worker, EntityTag::Worker)]);
        }

        #[test]
        fn battery_energy_soaks_damage() {
            let mut w = world();
            let b = w.arena.spawn(|id| Battery::new(id, Vec2::new(100.0, 100.0)));
            spawn_enemy(&mut w, Vec2::new(120.0, 100.0), EnemyKind::Tank);

            CollisionSystem.run(&mut w);

            let battery = &w.arena.batteries()[&b];
            assert!((battery.energy - 760.0).abs() < 1e-4);
            assert!((battery.health.hp() - 300.0).abs() < 1e-4);
        }

        #[test]
        fn turret_contact() {
            let mut w = world();
            let t = w.arena.spawn(|id| Turret::new(id, Vec2::new(100.0, 100.0)));
            spawn_enemy(&mut w, Vec2::new(130.0, 100.0), EnemyKind::Elite);

            CollisionSystem.run(&mut w);
            assert!((w.arena.turrets()[&t].health.hp() - 185.0).abs() < 1e-4);
        }

        #[test]
        fn stray_enemy_outside_world_is_removed() {
            let mut w = world();
            let e = spawn_enemy(&mut w, Vec2::new(-5.0, 100.0), EnemyKind::Normal);
            let kept = spawn_enemy(&mut w, Vec2::new(0.0, 100.0), EnemyKind::Normal);

            CollisionSystem.run(&mut w);
            assert_eq!(w.arena.ids::<Enemy>(), vec![kept]);
            assert_eq!(destroyed(&w), vec![(e, EntityTag::Enemy)]);
        }
    }

    mod game_over_tests {
        use super::*;

        #[test]
        fn base_destruction_ends_game_once() {
            let mut w = world();
            let base = w.arena.base().body.position;
            w.arena.base_mut().health.take_damage(995.0);
            spawn_enemy(&mut w, base, EnemyKind::Normal);

            CollisionSystem.run(&mut w);
            assert!(w.is_over());
            CollisionSystem.run(&mut w);

            let overs = w
                .events
                .events()
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOver))
                .count();
            assert_eq!(overs, 1);
        }
    }
}
