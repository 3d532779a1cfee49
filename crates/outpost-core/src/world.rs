//! Mutable game state shared by all systems.
//!
//! [`World`] bundles the arena with everything else a system may read or
//! write during a tick: the clock, the economy, wave and milestone progress,
//! the event log and the seeded random number generator.

use bitflags::bitflags;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::Arena;
use crate::clock::{Millis, SimClock};
use crate::config::SimConfig;
use crate::constants::{
    BASE_LAYOUT, INITIAL_SPAWN_INTERVAL_MS, INITIAL_WORKER_SPREAD, PATCH_LAYOUT,
};
use crate::economy::Economy;
use crate::entity::{Base, EntityId, MineralPatch, Worker};
use crate::events::EventLog;
use crate::systems::milestone::MilestoneState;
use crate::systems::worker::assign_worker_to_patch;

bitflags! {
    /// Game-level status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct GameStatus: u8 {
        /// The game has ended, by defeat or victory.
        const GAME_OVER = 1 << 0;
        /// The final phase was completed.
        const VICTORY = 1 << 1;
        /// The host paused the simulation.
        const PAUSED = 1 << 2;
    }
}

/// Wave progression and spawn timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    /// Current wave, starting at 1.
    pub wave: u32,
    /// When the current wave began.
    pub wave_start: Millis,
    /// When the last spawn event happened.
    pub last_spawn: Millis,
    /// Time between spawn events in this wave.
    pub spawn_interval: Millis,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            wave: 1,
            wave_start: 0,
            last_spawn: 0,
            spawn_interval: INITIAL_SPAWN_INTERVAL_MS,
        }
    }
}

/// Everything a system can touch during a tick.
#[derive(Debug, Clone)]
pub struct World {
    /// Run configuration.
    pub config: SimConfig,
    /// Entity storage.
    pub arena: Arena,
    /// Simulation time.
    pub clock: SimClock,
    /// Player minerals.
    pub economy: Economy,
    /// Wave progression.
    pub waves: WaveState,
    /// Milestone progression.
    pub milestones: MilestoneState,
    /// Game-level flags.
    pub status: GameStatus,
    /// Events not yet drained by the host.
    pub events: EventLog,
    /// Seeded randomness for spawns.
    pub rng: ChaCha8Rng,
    /// When patch bookkeeping was last reconciled.
    pub last_reconcile: Millis,
}

impl World {
    /// Builds the initial game: base, patch layout and starting workers.
    ///
    /// Initial workers are paid for out of the starting minerals and sent to
    /// the patch closest to the base.
    #[must_use]
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let size = Vec2::new(config.world_width, config.world_height);
        let base = Base::new(Vec2::from(BASE_LAYOUT) * size);

        let mut world = Self {
            arena: Arena::new(base),
            clock: SimClock::new(config.tick_ms),
            economy: Economy::new(config.starting_minerals),
            waves: WaveState::default(),
            milestones: MilestoneState::default(),
            status: GameStatus::empty(),
            events: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            last_reconcile: 0,
            config,
        };

        for ratio in PATCH_LAYOUT {
            let minerals = world.config.patch_minerals;
            world
                .arena
                .spawn(|id| MineralPatch::new(id, Vec2::from(ratio) * size, minerals, 0));
        }
        world.arena.base.default_patch = world.closest_patch(world.arena.base.body.position);

        world.spawn_initial_workers();
        world
    }

    fn spawn_initial_workers(&mut self) {
        let Some(patch) = self.arena.base.default_patch else {
            return;
        };
        let base = self.arena.base.body.position;
        let speed_scale = self.config.speed_scale;
        let cost = self.config.costs.worker;

        for _ in 0..self.config.initial_workers {
            if self.economy.spend(cost, &mut self.events).is_err() {
                break;
            }
            let offset = Vec2::new(
                self.rng.gen_range(-INITIAL_WORKER_SPREAD..=INITIAL_WORKER_SPREAD),
                self.rng.gen_range(-INITIAL_WORKER_SPREAD..=INITIAL_WORKER_SPREAD),
            );
            let id = self
                .arena
                .spawn(|id| Worker::new(id, base + offset, speed_scale));
            if assign_worker_to_patch(self, id, patch).is_ok() {
                if let Some(p) = self.arena.patches.get_mut(&patch) {
                    p.enqueue(id);
                }
            }
        }
        debug!(workers = self.arena.workers.len(), patch = %patch, "initial workers assigned");
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.clock.now()
    }

    /// True once the game has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.status.contains(GameStatus::GAME_OVER)
    }

    /// Patch with minerals closest to `point`, any patch if all are empty.
    #[must_use]
    pub fn closest_patch(&self, point: Vec2) -> Option<EntityId> {
        self.closest_patch_where(point, |p| !p.is_depleted())
            .or_else(|| self.closest_patch_where(point, |_| true))
    }

    /// Patch with minerals closest to `point`.
    #[must_use]
    pub fn closest_patch_with_minerals(&self, point: Vec2) -> Option<EntityId> {
        self.closest_patch_where(point, |p| !p.is_depleted())
    }

    fn closest_patch_where(
        &self,
        point: Vec2,
        keep: impl Fn(&MineralPatch) -> bool,
    ) -> Option<EntityId> {
        self.arena
            .patches
            .values()
            .filter(|p| keep(p))
            .min_by(|a, b| {
                a.body
                    .distance_to(point)
                    .total_cmp(&b.body.distance_to(point))
            })
            .map(|p| p.id)
    }
}
