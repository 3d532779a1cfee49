//! Test helper functions for setting up simulations and scenarios.

use glam::Vec2;

use crate::clock::Millis;
use crate::config::SimConfig;
use crate::entity::{Enemy, EnemyKind, EntityId};
use crate::events::GameEvent;
use crate::simulation::Simulation;

// =============================================================================
// Setup
// =============================================================================

/// Default game with the given seed.
pub fn new_sim(seed: u64) -> Simulation {
    Simulation::new(SimConfig::default(), seed).unwrap()
}

/// Game with no starting workers, for combat scenarios that should not be
/// disturbed by harvesting.
pub fn empty_sim(seed: u64) -> Simulation {
    let config = SimConfig {
        initial_workers: 0,
        ..SimConfig::default()
    };
    Simulation::new(config, seed).unwrap()
}

/// Places an enemy of `kind` scaled for the current wave.
pub fn spawn_enemy(sim: &mut Simulation, position: Vec2, kind: EnemyKind) -> EntityId {
    let wave = sim.wave();
    let world = sim.world_mut();
    let speed_scale = world.config.speed_scale;
    world
        .arena
        .spawn(|id| Enemy::new(id, position, kind, wave, speed_scale))
}

/// Base position of the game.
pub fn base_position(sim: &Simulation) -> Vec2 {
    sim.arena().base().body.position
}

// =============================================================================
// Driving
// =============================================================================

/// Steps until `done` holds or `max_ticks` pass. Returns whether `done` held.
pub fn run_until(sim: &mut Simulation, max_ticks: u64, done: impl Fn(&Simulation) -> bool) -> bool {
    for _ in 0..max_ticks {
        if done(sim) {
            return true;
        }
        sim.step();
    }
    done(sim)
}

/// Advances the clock without running any system.
pub fn skip_time(sim: &mut Simulation, until: Millis) {
    let world = sim.world_mut();
    while world.clock.now() < until {
        world.clock.advance();
    }
}

// =============================================================================
// Inspection
// =============================================================================

/// Text of every notification in `events`.
pub fn notifications(events: &[GameEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Notification { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Serialized world state for equality checks across runs.
pub fn snapshot(sim: &Simulation) -> String {
    let world = sim.world();
    serde_json::to_string(&(
        &world.arena,
        &world.economy,
        &world.waves,
        &world.milestones,
        world.status,
        world.clock,
    ))
    .unwrap()
}
