//! Turret aiming and firing.
//!
//! A turret engages the nearest living enemy inside its range. It turns its
//! barrel toward the target by at most [`TURRET_TURN_RATE`] per tick and
//! fires only when the bearing error measured at the start of the tick is
//! below [`TURRET_AIM_TOLERANCE`] and its cooldown has run out, so turn rate
//! and fire rate are coupled. With nothing in range the barrel eases along a
//! slow idle sweep. The heading is wrapped into `(-pi, pi]` every tick.

use glam::Vec2;

use super::{normalize_angle, System};
use crate::constants::{
    TURRET_AIM_TOLERANCE, TURRET_IDLE_EASING, TURRET_IDLE_FREQUENCY, TURRET_IDLE_SWEEP,
    TURRET_TURN_RATE,
};
use crate::entity::{Enemy, EntityId, Missile, Turret};
use crate::world::World;

/// Aims and fires every turret.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurretSystem;

impl System for TurretSystem {
    fn name(&self) -> &'static str {
        "turret"
    }

    fn run(&self, world: &mut World) {
        let idle_heading = (world.clock.seconds() * TURRET_IDLE_FREQUENCY).sin() * TURRET_IDLE_SWEEP;
        let speed_scale = world.config.speed_scale;

        for id in world.arena.ids::<Turret>() {
            let Some(turret) = world.arena.turrets.get_mut(&id) else {
                continue;
            };
            turret.armament.tick();

            let target = nearest_enemy_in_range(
                world.arena.enemies.values(),
                turret.body.position,
                turret.armament.range,
            );

            let shot = match target {
                Some((_, enemy_pos)) => aim(turret, enemy_pos),
                None => {
                    let error = normalize_angle(idle_heading - turret.rotation);
                    turret.rotation += error * TURRET_IDLE_EASING;
                    None
                }
            };
            turret.rotation = normalize_angle(turret.rotation);

            if let Some((origin, direction, damage)) = shot {
                world
                    .arena
                    .spawn(|mid| Missile::new(mid, origin, direction, damage, speed_scale));
            }
        }
    }
}

/// Turns toward `target` and returns `(origin, direction, damage)` if the
/// turret fires this tick.
fn aim(turret: &mut Turret, target: Vec2) -> Option<(Vec2, Vec2, f32)> {
    let offset = target - turret.body.position;
    let bearing = offset.y.atan2(offset.x);
    let error = normalize_angle(bearing - turret.rotation);

    turret.rotation += error.signum() * error.abs().min(TURRET_TURN_RATE);

    if turret.armament.ready() && error.abs() < TURRET_AIM_TOLERANCE {
        turret.armament.reload();
        let direction = offset.try_normalize().unwrap_or(Vec2::X);
        return Some((turret.body.position, direction, turret.armament.damage));
    }
    None
}

/// Closest living enemy strictly inside `range` of `origin`.
pub(crate) fn nearest_enemy_in_range<'a>(
    enemies: impl Iterator<Item = &'a Enemy>,
    origin: Vec2,
    range: f32,
) -> Option<(EntityId, Vec2)> {
    enemies
        .filter(|e| !e.health.is_dead())
        .map(|e| (e, e.body.distance_to(origin)))
        .filter(|(_, dist)| *dist < range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(e, _)| (e.id, e.body.position))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::EnemyKind;
    use std::f32::consts::PI;

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

    #[test]
    fn fires_when_aligned_and_ready() {
        let mut w = world();
        let t = w.arena.spawn(|id| Turret::new(id, Vec2::new(100.0, 100.0)));
        spawn_enemy(&mut w, Vec2::new(200.0, 100.0));

        TurretSystem.run(&mut w);

        assert_eq!(w.arena.count::<Missile>(), 1);
        let missile = w.arena.missiles().values().next().unwrap();
        assert!((missile.direction - Vec2::X).length() < 1e-5);
        assert!((missile.damage - 25.0).abs() < 1e-5);
        assert!((w.arena.turrets()[&t].armament.cooldown - 90.0).abs() < 1e-5);
    }

    #[test]
    fn must_turn_before_firing() {
        let mut w = world();
        let t = w.arena.spawn(|id| Turret::new(id, Vec2::new(100.0, 100.0)));
        spawn_enemy(&mut w, Vec2::new(100.0, 200.0));

        TurretSystem.run(&mut w);
        assert_eq!(w.arena.count::<Missile>(), 0);
        assert!((w.arena.turrets()[&t].rotation - 0.1).abs() < 1e-5);

        // pi/2 at 0.1 rad per tick: the error drops below 0.1 after 15 turns.
        for _ in 0..15 {
            TurretSystem.run(&mut w);
        }
        assert_eq!(w.arena.count::<Missile>(), 1);
    }

    #[test]
    fn ignores_enemies_out_of_range() {
        let mut w = world();
        w.arena.spawn(|id| Turret::new(id, Vec2::new(100.0, 100.0)));
        spawn_enemy(&mut w, Vec2::new(300.0, 100.0));

        TurretSystem.run(&mut w);
        assert_eq!(w.arena.count::<Missile>(), 0);
    }

    #[test]
    fn picks_nearest_enemy() {
        let mut w = world();
        let near = spawn_enemy(&mut w, Vec2::new(130.0, 0.0));
        spawn_enemy(&mut w, Vec2::new(50.0, 0.0));
        let dead = spawn_enemy(&mut w, Vec2::new(105.0, 0.0));
        if let Some(e) = w.arena.enemies.get_mut(&dead) {
            e.health.take_damage(1000.0);
        }

        let found = nearest_enemy_in_range(w.arena.enemies().values(), Vec2::new(100.0, 0.0), 200.0);
        assert_eq!(found.map(|(id, _)| id), Some(near));
    }

    #[test]
    fn rotation_stays_normalized() {
        let mut w = world();
        let t = w.arena.spawn(|id| Turret::new(id, Vec2::new(100.0, 100.0)));
        if let Some(turret) = w.arena.turrets.get_mut(&t) {
            turret.rotation = 7.0 * PI;
        }
        TurretSystem.run(&mut w);
        let rotation = w.arena.turrets()[&t].rotation;
        assert!(rotation > -PI && rotation <= PI);
    }
}
