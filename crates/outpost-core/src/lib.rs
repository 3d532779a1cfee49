//! # Outpost Core
//!
//! Deterministic simulation core for Outpost, a single-player base-defense
//! game. Workers mine finite mineral patches and haul the minerals to the
//! base. Waves of enemies attack the base, the workers and the defenses.
//! Turrets, missile launchers and healing batteries hold them off while the
//! player works through four milestone phases towards victory.
//!
//! ## Architecture
//!
//! - **Entities** ([`entity`]): plain data records keyed by [`EntityId`]
//! - **Arena** ([`arena`]): per-kind `BTreeMap` storage and the removal sweep
//! - **Systems** ([`systems`]): one pass each over the world, run in a fixed
//!   order every tick
//! - **Simulation** ([`simulation`]): the tick driver and the player command
//!   surface
//!
//! All randomness comes from one seeded generator and all iteration is in id
//! order, so a seed plus a command sequence always replays identically.
//!
//! ## Usage
//!
//! ```
//! use outpost_core::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::default(), 7)?;
//! sim.build_worker(None)?;
//! sim.run(600);
//!
//! for event in sim.take_events() {
//!     println!("{event:?}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod clock;
pub mod config;
pub mod constants;
pub mod economy;
pub mod entity;
pub mod error;
pub mod events;
pub mod simulation;
pub mod systems;
pub mod world;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use config::{ConfigError, CostTable, SimConfig};
pub use entity::{EntityId, EntityTag, TargetRef};
pub use error::CommandError;
pub use events::GameEvent;
pub use simulation::Simulation;
pub use systems::milestone::{GoalId, Phase};
pub use world::{GameStatus, World};
