//! Simulation driver and player command surface.
//!
//! [`Simulation`] owns the [`World`] and the ordered list of systems. Each
//! [`step`](Simulation::step) advances the clock by one tick and runs every
//! system to completion in order. A paused or finished game does not advance.
//!
//! Commands (`build_*`, `upgrade_*`, `assign_worker_to_patch`, ...) are the
//! only way a host changes the game between ticks. A rejected command
//! returns a [`CommandError`], emits a notification with the error text and
//! leaves the state untouched.
//!
//! # Example
//!
//! ```
//! use outpost_core::config::SimConfig;
//! use outpost_core::simulation::Simulation;
//! use glam::Vec2;
//!
//! let mut sim = Simulation::new(SimConfig::default(), 42).unwrap();
//! let turret = sim.build_turret(Vec2::new(2000.0, 2200.0)).unwrap();
//!
//! sim.run(100);
//!
//! assert_eq!(sim.tick(), 100);
//! assert!(sim.arena().turrets().contains_key(&turret));
//! ```

use std::fmt;

use glam::Vec2;
use tracing::{debug, info, trace};

use crate::arena::{Arena, ArenaEntity};
use crate::clock::Millis;
use crate::config::{ConfigError, SimConfig};
use crate::economy::Economy;
use crate::entity::{Battery, Enemy, EntityId, EntityTag, MissileLauncher, Turret, Worker};
use crate::error::CommandError;
use crate::events::GameEvent;
use crate::systems::milestone::Phase;
use crate::systems::{self, standard_systems, System};
use crate::world::{GameStatus, World};

// =============================================================================
// Simulation
// =============================================================================

/// A running game.
pub struct Simulation {
    world: World,
    systems: Vec<Box<dyn System>>,
    seed: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.systems.iter().map(|s| s.name()).collect();
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("systems", &names)
            .field("seed", &self.seed)
            .finish()
    }
}

impl Simulation {
    /// Creates a game from `config`, seeding all randomness with `seed`.
    ///
    /// # Arguments
    ///
    /// * `config` - World size, timing, economy and costs
    /// * `seed` - Seed for spawn positions, enemy mix and worker placement
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the config fails validation.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            seed,
            width = config.world_width,
            height = config.world_height,
            "simulation created"
        );
        Ok(Self {
            world: World::new(config, seed),
            systems: standard_systems(),
            seed,
        })
    }

    /// Advances one tick.
    ///
    /// Does nothing if the game is paused or over. Once a system ends the
    /// game, the remaining systems of that tick are skipped.
    pub fn step(&mut self) {
        if self
            .world
            .status
            .intersects(GameStatus::GAME_OVER | GameStatus::PAUSED)
        {
            return;
        }
        self.world.clock.advance();
        for system in &self.systems {
            system.run(&mut self.world);
            if self.world.is_over() {
                debug!(system = system.name(), tick = self.tick(), "game ended mid-tick");
                break;
            }
        }
        trace!(
            tick = self.tick(),
            enemies = self.world.arena.count::<Enemy>(),
            "tick"
        );
    }

    /// Runs up to `ticks` steps, stopping early if the game ends or is
    /// paused. Returns the number of ticks actually simulated.
    pub fn run(&mut self, ticks: u64) -> u64 {
        let start = self.tick();
        for _ in 0..ticks {
            if !self.is_running() {
                break;
            }
            self.step();
        }
        self.tick() - start
    }

    /// Rebuilds the initial state from the same config and seed.
    pub fn reset(&mut self) {
        let config = self.world.config.clone();
        self.world = World::new(config, self.seed);
        info!(seed = self.seed, "simulation reset");
    }

    /// Pauses or resumes the game.
    pub fn set_paused(&mut self, paused: bool) {
        if self.is_paused() == paused {
            return;
        }
        self.world.status.set(GameStatus::PAUSED, paused);
        self.world
            .events
            .warn(if paused { "Game Paused" } else { "Game Resumed" });
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// The whole game state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable game state, for scenario setup between ticks.
    #[must_use]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Entity storage.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.world.arena
    }

    /// Mineral accounts.
    #[must_use]
    pub const fn economy(&self) -> &Economy {
        &self.world.economy
    }

    /// The seed this game was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks simulated so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.world.clock.tick()
    }

    /// Simulation time.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.world.clock.now()
    }

    /// Current wave.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.world.waves.wave
    }

    /// Current milestone phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.world.milestones.phase
    }

    /// Game-level flags.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.world.status
    }

    /// True once the game has ended by defeat or victory.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.world.is_over()
    }

    /// True if the final phase was completed.
    #[must_use]
    pub fn is_victory(&self) -> bool {
        self.world.status.contains(GameStatus::VICTORY)
    }

    /// True while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.world.status.contains(GameStatus::PAUSED)
    }

    /// True if [`step`](Self::step) would advance the game.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.is_over() && !self.is_paused()
    }

    /// Removes and returns every event emitted since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.world.events.drain()
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Deposits minerals, counting them as harvested.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::GameOver`] once the game has ended.
    pub fn add_minerals(&mut self, amount: f32) -> Result<(), CommandError> {
        self.ensure_not_over()?;
        self.world
            .economy
            .add_minerals(amount, &mut self.world.events);
        Ok(())
    }

    /// Sends a worker to a patch, releasing its old patch's queue slot,
    /// lock and counter.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownEntity`] or
    /// [`CommandError::WrongEntityKind`] for bad ids, and
    /// [`CommandError::GameOver`] once the game has ended.
    pub fn assign_worker_to_patch(
        &mut self,
        worker: EntityId,
        patch: EntityId,
    ) -> Result<(), CommandError> {
        let result = self
            .ensure_not_over()
            .and_then(|()| systems::worker::assign_worker_to_patch(&mut self.world, worker, patch));
        self.report(result)?;
        self.world.events.warn("Worker reassigned to mineral patch");
        debug!(worker = %worker, patch = %patch, "worker reassigned");
        Ok(())
    }

    /// Makes `patch` the destination of newly built workers.
    ///
    /// # Errors
    ///
    /// Returns an error if `patch` is not a live mineral patch.
    pub fn set_default_patch(&mut self, patch: EntityId) -> Result<(), CommandError> {
        let result = self
            .ensure_not_over()
            .and_then(|()| self.expect_kind(patch, EntityTag::MineralPatch));
        self.report(result)?;
        self.world.arena.base.default_patch = Some(patch);
        self.world
            .events
            .warn("Default mineral patch updated - new workers will be sent here");
        Ok(())
    }

    /// Builds a worker at the base and sends it to `patch`, or to the
    /// base's default patch when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NoMineralPatch`] if no patch exists,
    /// [`CommandError::InsufficientMinerals`] if the worker is unaffordable,
    /// or a kind error if `patch` is not a mineral patch.
    pub fn build_worker(&mut self, patch: Option<EntityId>) -> Result<EntityId, CommandError> {
        let result = self.ensure_not_over().and_then(|()| self.worker_destination(patch));
        let patch = self.report(result)?;

        let cost = self.world.config.costs.worker;
        let paid = self.world.economy.spend(cost, &mut self.world.events);
        self.report(paid)?;

        let base = self.world.arena.base.body.position;
        let speed_scale = self.world.config.speed_scale;
        let id = self
            .world
            .arena
            .spawn(|id| Worker::new(id, base, speed_scale));
        systems::worker::assign_worker_to_patch(&mut self.world, id, patch)?;
        self.world.events.warn("Worker built!");
        debug!(id = %id, patch = %patch, "worker built");
        Ok(id)
    }

    /// Builds a turret at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::OutOfBounds`] or
    /// [`CommandError::InsufficientMinerals`].
    pub fn build_turret(&mut self, position: Vec2) -> Result<EntityId, CommandError> {
        let cost = self.world.config.costs.turret;
        self.build(position, cost, "Turret", Turret::new)
    }

    /// Builds a battery at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::OutOfBounds`] or
    /// [`CommandError::InsufficientMinerals`].
    pub fn build_battery(&mut self, position: Vec2) -> Result<EntityId, CommandError> {
        let cost = self.world.config.costs.battery;
        self.build(position, cost, "Shield Battery", Battery::new)
    }

    /// Builds a missile launcher at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::OutOfBounds`] or
    /// [`CommandError::InsufficientMinerals`].
    pub fn build_missile_launcher(&mut self, position: Vec2) -> Result<EntityId, CommandError> {
        let cost = self.world.config.costs.missile_launcher;
        self.build(position, cost, "Missile Launcher", MissileLauncher::new)
    }

    /// Upgrades a turret, paying `150 * 2^(level - 1)`.
    ///
    /// # Errors
    ///
    /// Returns a kind error if `id` is not a turret, or
    /// [`CommandError::InsufficientMinerals`].
    pub fn upgrade_turret(&mut self, id: EntityId) -> Result<u32, CommandError> {
        let result = self
            .ensure_not_over()
            .and_then(|()| self.expect_kind(id, EntityTag::Turret));
        self.report(result)?;
        let Some(cost) = self.world.arena.turrets.get(&id).map(|t| t.armament.upgrade_cost()) else {
            return self.report(Err(CommandError::UnknownEntity(id)));
        };
        let paid = self.world.economy.spend(cost, &mut self.world.events);
        self.report(paid)?;

        let Some(turret) = self.world.arena.turrets.get_mut(&id) else {
            return self.report(Err(CommandError::UnknownEntity(id)));
        };
        turret.upgrade();
        let level = turret.armament.level;
        self.world
            .events
            .warn(format!("Turret upgraded to level {level}!"));
        debug!(id = %id, level, cost, "turret upgraded");
        Ok(level)
    }

    /// Upgrades a missile launcher, priced like a turret upgrade.
    ///
    /// # Errors
    ///
    /// Returns a kind error if `id` is not a launcher, or
    /// [`CommandError::InsufficientMinerals`].
    pub fn upgrade_missile_launcher(&mut self, id: EntityId) -> Result<u32, CommandError> {
        let result = self
            .ensure_not_over()
            .and_then(|()| self.expect_kind(id, EntityTag::MissileLauncher));
        self.report(result)?;
        let Some(cost) = self.world.arena.launchers.get(&id).map(|l| l.armament.upgrade_cost()) else {
            return self.report(Err(CommandError::UnknownEntity(id)));
        };
        let paid = self.world.economy.spend(cost, &mut self.world.events);
        self.report(paid)?;

        let Some(launcher) = self.world.arena.launchers.get_mut(&id) else {
            return self.report(Err(CommandError::UnknownEntity(id)));
        };
        launcher.upgrade();
        let level = launcher.armament.level;
        self.world
            .events
            .warn(format!("Missile Launcher upgraded to level {level}!"));
        debug!(id = %id, level, cost, "launcher upgraded");
        Ok(level)
    }

    // -------------------------------------------------------------------------
    // Command helpers
    // -------------------------------------------------------------------------

    fn build<T: ArenaEntity>(
        &mut self,
        position: Vec2,
        cost: f32,
        label: &str,
        make: impl FnOnce(EntityId, Vec2) -> T,
    ) -> Result<EntityId, CommandError> {
        let result = self.ensure_not_over().and_then(|()| {
            if self.world.config.in_bounds(position.x, position.y) {
                Ok(())
            } else {
                Err(CommandError::OutOfBounds {
                    x: position.x,
                    y: position.y,
                })
            }
        });
        self.report(result)?;
        let paid = self.world.economy.spend(cost, &mut self.world.events);
        self.report(paid)?;

        let id = self.world.arena.spawn(|id| make(id, position));
        self.world.events.warn(format!("{label} built!"));
        let kind = T::TAG;
        debug!(id = %id, kind = %kind, x = position.x, y = position.y, "structure built");
        Ok(id)
    }

    fn worker_destination(&self, patch: Option<EntityId>) -> Result<EntityId, CommandError> {
        match patch {
            Some(patch) => {
                self.expect_kind(patch, EntityTag::MineralPatch)?;
                Ok(patch)
            }
            None => self
                .world
                .arena
                .base
                .default_patch
                .filter(|p| self.world.arena.patches.contains_key(p))
                .or_else(|| self.world.closest_patch(self.world.arena.base.body.position))
                .ok_or(CommandError::NoMineralPatch),
        }
    }

    fn expect_kind(&self, id: EntityId, expected: EntityTag) -> Result<(), CommandError> {
        systems::worker::expect_kind(&self.world, id, expected)
    }

    fn ensure_not_over(&self) -> Result<(), CommandError> {
        if self.is_over() {
            Err(CommandError::GameOver)
        } else {
            Ok(())
        }
    }

    /// Shows a rejected command to the player and passes the result on.
    fn report<T>(&mut self, result: Result<T, CommandError>) -> Result<T, CommandError> {
        if let Err(err) = &result {
            debug!(error = %err, "command rejected");
            self.world.events.warn(err.to_string());
        }
        result
    }
}

// =============================================================================
// Tests
// =============================================================================
