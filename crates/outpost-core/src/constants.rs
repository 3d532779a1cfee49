//! Fixed gameplay numbers.
//!
//! Everything here is balance data that the rest of the core reads directly.
//! Values a host may reasonably want to override (world size, tick length,
//! costs, starting economy) live in [`SimConfig`](crate::config::SimConfig)
//! instead.
//!
//! Distances are world units, per-tick counters are simulation ticks and
//! timers are milliseconds of simulation time.

use std::f32::consts::PI;

// =============================================================================
// Economy
// =============================================================================

/// Minerals the player starts with, before initial workers are paid for.
pub const STARTING_MINERALS: f32 = 450.0;

/// Workers spawned and paid for at game start.
pub const INITIAL_WORKERS: u32 = 3;

/// Minerals in a freshly created patch.
pub const PATCH_MINERALS: f32 = 15_000.0;

/// Base cost of the first upgrade; doubles with every level.
pub const UPGRADE_BASE_COST: f32 = 150.0;

/// Workers allowed on one patch before the excess is redistributed.
pub const MAX_WORKERS_PER_PATCH: u32 = 8;

// =============================================================================
// World layout
// =============================================================================

/// Default world width.
pub const WORLD_WIDTH: f32 = 4000.0;

/// Default world height.
pub const WORLD_HEIGHT: f32 = 3000.0;

/// Milliseconds of simulation time per tick.
pub const TICK_MS: u64 = 16;

/// Multiplier applied to unit and projectile speeds.
pub const SPEED_SCALE: f32 = 2.4;

/// Mineral patch positions as fractions of the world size.
pub const PATCH_LAYOUT: [(f32, f32); 6] = [
    (0.3, 0.3),
    (0.7, 0.3),
    (0.4, 0.5),
    (0.6, 0.5),
    (0.35, 0.7),
    (0.65, 0.7),
];

/// Base position as a fraction of the world size.
pub const BASE_LAYOUT: (f32, f32) = (0.5, 0.8);

// =============================================================================
// Units and structures
// =============================================================================

/// Base hit points.
pub const BASE_HP: f32 = 1000.0;
/// Base footprint.
pub const BASE_SIZE: f32 = 80.0;

/// Worker hit points.
pub const WORKER_HP: f32 = 50.0;
/// Worker footprint.
pub const WORKER_SIZE: f32 = 40.0;
/// Worker speed before [`SPEED_SCALE`].
pub const WORKER_SPEED: f32 = 1.2;
/// Minerals a worker can carry.
pub const WORKER_CAPACITY: f32 = 10.0;
/// Distance at which a worker counts as arrived.
pub const ARRIVAL_RADIUS: f32 = 5.0;
/// Distance from base a worker is placed at after a deposit.
pub const DEPOSIT_STEP_BACK: f32 = 10.0;
/// Random spread of initial worker positions around the base.
pub const INITIAL_WORKER_SPREAD: f32 = 20.0;

/// Patch footprint.
pub const PATCH_SIZE: f32 = 30.0;
/// Minimum time between extractions on one patch.
pub const MINING_DELAY_MS: u64 = 800;
/// Minimum time between queue validation passes on one patch.
pub const QUEUE_VALIDATION_MS: u64 = 5000;

/// Turret hit points.
pub const TURRET_HP: f32 = 200.0;
/// Turret footprint.
pub const TURRET_SIZE: f32 = 40.0;
/// Turret engagement range.
pub const TURRET_RANGE: f32 = 200.0;
/// Turret missile damage.
pub const TURRET_DAMAGE: f32 = 25.0;
/// Ticks between turret shots.
pub const TURRET_FIRE_RATE: f32 = 90.0;
/// Maximum turret rotation per tick, radians.
pub const TURRET_TURN_RATE: f32 = 0.1;
/// Bearing error below which a turret may fire, radians.
pub const TURRET_AIM_TOLERANCE: f32 = 0.1;
/// Half-width of the idle sweep, radians.
pub const TURRET_IDLE_SWEEP: f32 = PI / 3.0;
/// Idle sweep frequency against elapsed seconds.
pub const TURRET_IDLE_FREQUENCY: f32 = 0.02;
/// Fraction of the idle error closed per tick.
pub const TURRET_IDLE_EASING: f32 = 0.05;

/// Missile launcher hit points.
pub const LAUNCHER_HP: f32 = 250.0;
/// Missile launcher footprint.
pub const LAUNCHER_SIZE: f32 = 40.0;
/// Missile launcher engagement range.
pub const LAUNCHER_RANGE: f32 = 300.0;
/// Homing missile damage.
pub const LAUNCHER_DAMAGE: f32 = 75.0;
/// Ticks between launcher shots.
pub const LAUNCHER_FIRE_RATE: f32 = 120.0;
/// Damage multiplier against bosses.
pub const LAUNCHER_BOSS_MULTIPLIER: f32 = 2.5;

/// Upgrade multiplier for max hp and damage.
pub const UPGRADE_POWER: f32 = 1.5;
/// Upgrade multiplier for fire interval.
pub const UPGRADE_FIRE_RATE: f32 = 0.8;
/// Lowest fire interval an upgrade can reach.
pub const UPGRADE_FIRE_RATE_FLOOR: f32 = 20.0;
/// Upgrade multiplier for range.
pub const UPGRADE_RANGE: f32 = 1.1;

/// Battery hit points.
pub const BATTERY_HP: f32 = 300.0;
/// Battery footprint.
pub const BATTERY_SIZE: f32 = 40.0;
/// Battery healing range.
pub const BATTERY_RANGE: f32 = 250.0;
/// Battery energy cap.
pub const BATTERY_MAX_ENERGY: f32 = 800.0;
/// Energy regenerated per tick.
pub const BATTERY_ENERGY_REGEN: f32 = 0.15;
/// Hit points restored to each damaged unit per healing pass.
pub const BATTERY_HEAL: f32 = 3.0;
/// Energy spent on one healing pass, regardless of target count.
pub const BATTERY_BATCH_COST: f32 = 5.0;
/// Energy lost per point of damage absorbed.
pub const BATTERY_ENERGY_DAMAGE_FACTOR: f32 = 2.0;

/// Turret missile speed before [`SPEED_SCALE`].
pub const MISSILE_SPEED: f32 = 5.0;
/// Turret missile footprint.
pub const MISSILE_SIZE: f32 = 9.6;

// =============================================================================
// Enemies
// =============================================================================

/// Distance at which an enemy stops closing on its target.
pub const COMBAT_RANGE: f32 = 30.0;
/// Ticks between enemy target re-acquisitions.
pub const TARGET_UPDATE_TICKS: i32 = 30;
/// Per-wave growth of enemy hp and damage.
pub const WAVE_SCALING: f32 = 1.2;

// =============================================================================
// Waves
// =============================================================================

/// Length of one wave.
pub const WAVE_DURATION_MS: u64 = 45_000;
/// Spawn interval at wave 1.
pub const INITIAL_SPAWN_INTERVAL_MS: u64 = 5000;
/// Spawn interval formula intercept.
pub const SPAWN_INTERVAL_START_MS: u64 = 7000;
/// Spawn interval reduction per wave.
pub const SPAWN_INTERVAL_STEP_MS: u64 = 500;
/// Shortest spawn interval.
pub const SPAWN_INTERVAL_FLOOR_MS: u64 = 1500;
/// Side spawns stay within this fraction of the world height.
pub const SIDE_SPAWN_HEIGHT: f32 = 0.7;
/// Largest elite squad.
pub const MAX_ELITE_SQUAD: u32 = 3;

// =============================================================================
// Timers
// =============================================================================

/// Interval of the global patch bookkeeping reconciliation.
pub const RECONCILE_INTERVAL_MS: u64 = 5000;
/// Default notification display time.
pub const NOTIFICATION_MS: u64 = 2000;
/// Display time of milestone notifications, also their suppression window.
pub const MILESTONE_NOTIFICATION_MS: u64 = 3000;
/// Survival time required by the final phase.
pub const SURVIVAL_GOAL_MS: u64 = 600_000;
