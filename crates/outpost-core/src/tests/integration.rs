//! End-to-end scenarios through the full system order.

use glam::Vec2;

use crate::constants::SURVIVAL_GOAL_MS;
use crate::entity::{EnemyKind, EntityTag, MineralPatch, Worker, WorkerState};
use crate::events::GameEvent;
use crate::systems::milestone::Phase;
use crate::world::GameStatus;

use super::helpers::{
    base_position, empty_sim, new_sim, notifications, run_until, skip_time, spawn_enemy,
};

// =============================================================================
// Economy
// =============================================================================

#[test]
fn starting_workers_harvest_minerals() {
    let mut sim = new_sim(1);
    assert_eq!(sim.arena().count::<Worker>(), 3);
    assert!((sim.economy().minerals() - 300.0).abs() < 1e-3);

    let harvested = run_until(&mut sim, 1000, |s| s.economy().total_collected() >= 10.0);
    assert!(harvested);
    assert!(sim.economy().minerals() >= 310.0);
}

#[test]
fn one_miner_per_patch_at_all_times() {
    let mut sim = new_sim(3);
    for _ in 0..3 {
        sim.build_worker(None).unwrap();
    }

    for _ in 0..1500 {
        sim.step();
        for patch in sim.arena().patches().values() {
            let miners: Vec<_> = sim
                .arena()
                .workers()
                .values()
                .filter(|w| w.state == WorkerState::Mining && w.target_patch == Some(patch.id))
                .map(|w| w.id)
                .collect();
            assert!(miners.len() <= 1, "patch {} has miners {miners:?}", patch.id);
            if let Some(miner) = miners.first() {
                assert_eq!(patch.current_miner(), Some(*miner));
            }
        }
    }
}

#[test]
fn reassigned_worker_leaves_old_patch() {
    let mut sim = new_sim(5);
    let worker = sim.arena().ids::<Worker>()[0];
    let old = sim.arena().workers()[&worker].target_patch.unwrap();
    let new = sim
        .arena()
        .ids::<MineralPatch>()
        .into_iter()
        .find(|p| *p != old)
        .unwrap();

    sim.assign_worker_to_patch(worker, new).unwrap();

    assert_eq!(sim.arena().patches()[&old].worker_count(), 2);
    assert_eq!(sim.arena().patches()[&new].worker_count(), 1);
    assert!(!sim.arena().patches()[&old].mining_queue().contains(&worker));
    assert_eq!(sim.arena().workers()[&worker].state, WorkerState::ToMineral);
    assert!(notifications(&sim.take_events())
        .contains(&"Worker reassigned to mineral patch".to_string()));
}

// =============================================================================
// Defense
// =============================================================================

#[test]
fn turret_destroys_approaching_enemy() {
    let mut sim = empty_sim(2);
    let turret = sim.build_turret(Vec2::new(2000.0, 1500.0)).unwrap();
    let enemy = spawn_enemy(&mut sim, Vec2::new(2000.0, 1350.0), EnemyKind::Normal);

    let killed = run_until(&mut sim, 600, |s| !s.arena().enemies().contains_key(&enemy));
    assert!(killed);
    assert!(sim.arena().turrets().contains_key(&turret));
    assert!(sim
        .take_events()
        .contains(&GameEvent::EntityDestroyed {
            id: enemy,
            tag: EntityTag::Enemy
        }));
}

#[test]
fn launcher_homes_onto_enemy() {
    let mut sim = empty_sim(4);
    sim.add_minerals(500.0).unwrap();
    sim.build_missile_launcher(Vec2::new(2000.0, 1500.0)).unwrap();
    let enemy = spawn_enemy(&mut sim, Vec2::new(2150.0, 1300.0), EnemyKind::Normal);

    let killed = run_until(&mut sim, 400, |s| !s.arena().enemies().contains_key(&enemy));
    assert!(killed);
}

#[test]
fn battery_repairs_base() {
    let mut sim = empty_sim(6);
    let base = base_position(&sim);
    sim.build_battery(base + Vec2::new(0.0, -100.0)).unwrap();
    sim.world_mut().arena.base_mut().health.take_damage(100.0);

    sim.run(10);
    assert!((sim.arena().base().health.hp() - 930.0).abs() < 1e-3);
}

#[test]
fn enemies_arrive_with_the_first_wave() {
    let mut sim = empty_sim(8);
    let spawned = run_until(&mut sim, 400, |s| {
        s.world().events.events().iter().any(|e| matches!(e, GameEvent::EnemySpawned { .. }))
    });
    assert!(spawned);
    assert!(sim.now() > 5000);
}

// =============================================================================
// Endgame
// =============================================================================

#[test]
fn base_destruction_ends_the_game() {
    let mut sim = empty_sim(9);
    let base = base_position(&sim);
    sim.world_mut().arena.base_mut().health.take_damage(950.0);
    spawn_enemy(&mut sim, base + Vec2::new(0.0, -60.0), EnemyKind::Boss);

    let over = run_until(&mut sim, 200, |s| s.is_over());
    assert!(over);
    assert!(!sim.is_victory());

    let tick = sim.tick();
    sim.step();
    assert_eq!(sim.tick(), tick);

    let events = sim.take_events();
    assert!(events.contains(&GameEvent::GameOver));
    assert!(notifications(&events).contains(&"Game Over! Base destroyed!".to_string()));
    assert!(sim.build_turret(base).is_err());
}

#[test]
fn first_phase_completes_and_pays_bonus() {
    let mut sim = new_sim(10);
    sim.build_turret(Vec2::new(1000.0, 1000.0)).unwrap();
    sim.add_minerals(500.0).unwrap();
    let before = sim.economy().minerals();

    sim.step();

    assert_eq!(sim.phase(), Phase::Infrastructure);
    assert!((sim.economy().minerals() - before - 500.0).abs() < 1e-3);
    assert!((sim.economy().total_collected() - 500.0).abs() < 1e-3);
    let events = sim.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::PhaseCompleted { phase: Phase::Establishment, .. })));
    assert!(notifications(&events).contains(&"Establishment Phase Complete!".to_string()));
}

#[test]
fn final_phase_ends_in_victory() {
    let mut sim = empty_sim(11);
    skip_time(&mut sim, SURVIVAL_GOAL_MS);
    let now = sim.now();
    {
        let world = sim.world_mut();
        world.milestones.phase = Phase::Final;
        world.waves.wave = 10;
        world.waves.wave_start = now;
        world.waves.last_spawn = now;
    }

    sim.step();

    assert!(sim.is_victory());
    assert!(sim.status().contains(GameStatus::GAME_OVER));
    assert!(sim.take_events().contains(&GameEvent::Victory));
    assert_eq!(sim.run(10), 0);
}
