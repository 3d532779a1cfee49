//! Wave timer and enemy generation.
//!
//! Waves last [`WAVE_DURATION_MS`]. Each new wave shortens the spawn
//! interval by [`SPAWN_INTERVAL_STEP_MS`] down to a floor. Every spawn
//! event creates `1 + (wave - 1) / 3` enemies whose kinds are drawn from a
//! wave-dependent mix, plus a boss on every fifth wave or an elite squad on
//! every other third wave. Enemies enter from the top edge or from the upper
//! part of either side edge.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use super::System;
use crate::constants::{
    MAX_ELITE_SQUAD, SIDE_SPAWN_HEIGHT, SPAWN_INTERVAL_FLOOR_MS, SPAWN_INTERVAL_START_MS,
    SPAWN_INTERVAL_STEP_MS, WAVE_DURATION_MS,
};
use crate::entity::{Enemy, EnemyKind};
use crate::events::GameEvent;
use crate::world::World;

/// Advances waves and spawns enemies on schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnSystem;

impl System for SpawnSystem {
    fn name(&self) -> &'static str {
        "spawn"
    }

    fn run(&self, world: &mut World) {
        let now = world.now();

        if now.saturating_sub(world.waves.wave_start) > WAVE_DURATION_MS {
            let wave = world.waves.wave + 1;
            world.waves.wave = wave;
            world.waves.wave_start = now;
            world.waves.spawn_interval = spawn_interval(wave);
            world.events.warn(format!("Wave {wave} incoming!"));
            world.events.push(GameEvent::WaveStarted { wave });
            info!(wave, interval_ms = world.waves.spawn_interval, "wave started");
        }

        if now.saturating_sub(world.waves.last_spawn) > world.waves.spawn_interval {
            spawn_group(world);
            world.waves.last_spawn = now;
        }
    }
}

/// Spawn interval for `wave`: 7 s minus half a second per wave, floored.
#[must_use]
pub fn spawn_interval(wave: u32) -> u64 {
    let step = u64::from(wave.saturating_sub(1)) * SPAWN_INTERVAL_STEP_MS;
    SPAWN_INTERVAL_START_MS
        .saturating_sub(step)
        .max(SPAWN_INTERVAL_FLOOR_MS)
}

/// Number of regular enemies per spawn event in `wave`.
#[must_use]
pub const fn group_size(wave: u32) -> u32 {
    1 + wave.saturating_sub(1) / 3
}

/// Maps a uniform roll in `[0, 1)` to an enemy kind for `wave`.
#[must_use]
pub fn roll_kind(wave: u32, roll: f32) -> EnemyKind {
    if wave >= 10 && roll < 0.1 {
        EnemyKind::Boss
    } else if wave >= 5 {
        match roll {
            r if r < 0.2 => EnemyKind::Elite,
            r if r < 0.4 => EnemyKind::Fast,
            r if r < 0.6 => EnemyKind::Tank,
            _ => EnemyKind::Normal,
        }
    } else if wave >= 3 {
        match roll {
            r if r < 0.3 => EnemyKind::Fast,
            r if r < 0.5 => EnemyKind::Tank,
            _ => EnemyKind::Normal,
        }
    } else {
        EnemyKind::Normal
    }
}

fn spawn_group(world: &mut World) {
    let wave = world.waves.wave;

    for _ in 0..group_size(wave) {
        let roll = world.rng.gen::<f32>();
        spawn_enemy(world, roll_kind(wave, roll));
    }

    if wave % 5 == 0 {
        spawn_enemy(world, EnemyKind::Boss);
        world.events.warn("Boss enemy incoming!");
    } else if wave % 3 == 0 {
        for _ in 0..(wave / 3).min(MAX_ELITE_SQUAD) {
            spawn_enemy(world, EnemyKind::Elite);
        }
        world.events.warn("Elite squad incoming!");
    }
}

fn spawn_enemy(world: &mut World, kind: EnemyKind) {
    let position = spawn_point(world);
    let wave = world.waves.wave;
    let speed_scale = world.config.speed_scale;
    let id = world
        .arena
        .spawn(|id| Enemy::new(id, position, kind, wave, speed_scale));
    world.events.push(GameEvent::EnemySpawned { id, kind });
    debug!(id = %id, kind = %kind, wave, x = position.x, y = position.y, "enemy spawned");
}

/// Random point on the top edge or the upper part of a side edge.
fn spawn_point(world: &mut World) -> Vec2 {
    let width = world.config.world_width;
    let side_height = world.config.world_height * SIDE_SPAWN_HEIGHT;
    let rng = &mut world.rng;
    match rng.gen_range(0..3) {
        0 => Vec2::new(rng.gen_range(0.0..width), 0.0),
        1 => Vec2::new(0.0, rng.gen_range(0.0..side_height)),
        _ => Vec2::new(width, rng.gen_range(0.0..side_height)),
    }
}

// =============================================================================
// Tests
// =============================================================================
