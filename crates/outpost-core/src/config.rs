//! Simulation configuration.
//!
//! [`SimConfig`] carries the values a host is expected to tune: world size,
//! tick length, speed scale, starting economy and the build cost table.
//! Everything else is balance data in [`constants`](crate::constants).
//!
//! # Example
//!
//! ```
//! use outpost_core::config::SimConfig;
//!
//! let config = SimConfig::from_json(r#"{ "world_width": 2000.0, "tick_ms": 20 }"#).unwrap();
//! assert_eq!(config.world_width, 2000.0);
//! assert_eq!(config.world_height, 3000.0);
//! assert_eq!(config.tick_ms, 20);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    INITIAL_WORKERS, PATCH_MINERALS, SPEED_SCALE, STARTING_MINERALS, TICK_MS, WORLD_HEIGHT,
    WORLD_WIDTH,
};

/// Errors produced while loading or validating a [`SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    /// World dimensions must be positive and finite.
    #[error("world size must be positive, got {width}x{height}")]
    WorldSize {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },

    /// A tick must advance the clock.
    #[error("tick length must be at least 1ms")]
    TickLength,

    /// Speeds must stay positive.
    #[error("speed scale must be positive, got {0}")]
    SpeedScale(f32),
}

/// Mineral cost of each buildable entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    /// Cost of one worker.
    pub worker: f32,
    /// Cost of one turret.
    pub turret: f32,
    /// Cost of one battery.
    pub battery: f32,
    /// Cost of one missile launcher.
    pub missile_launcher: f32,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            worker: 50.0,
            turret: 100.0,
            battery: 150.0,
            missile_launcher: 200.0,
        }
    }
}

/// Configuration for a simulation run.
///
/// Missing fields fall back to their defaults when deserialized, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World width. Enemies and missiles leaving `[0, width]` are culled.
    pub world_width: f32,
    /// World height.
    pub world_height: f32,
    /// Simulation milliseconds per tick.
    pub tick_ms: u64,
    /// Multiplier on worker, enemy and missile speeds.
    pub speed_scale: f32,
    /// Minerals available before initial workers are paid for.
    pub starting_minerals: f32,
    /// Workers spawned at game start.
    pub initial_workers: u32,
    /// Minerals in each patch at game start.
    pub patch_minerals: f32,
    /// Build costs.
    pub costs: CostTable,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            tick_ms: TICK_MS,
            speed_scale: SPEED_SCALE,
            starting_minerals: STARTING_MINERALS,
            initial_workers: INITIAL_WORKERS,
            patch_minerals: PATCH_MINERALS,
            costs: CostTable::default(),
        }
    }
}

impl SimConfig {
    /// Creates a default config with custom world dimensions.
    #[must_use]
    pub fn with_world(width: f32, height: f32) -> Self {
        Self {
            world_width: width,
            world_height: height,
            ..Self::default()
        }
    }

    /// Parses a config from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any
    /// [`validate`](Self::validate) error for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the config describes a runnable simulation.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.world_width) || !positive(self.world_height) {
            return Err(ConfigError::WorldSize {
                width: self.world_width,
                height: self.world_height,
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::TickLength);
        }
        if !positive(self.speed_scale) {
            return Err(ConfigError::SpeedScale(self.speed_scale));
        }
        Ok(())
    }

    /// Returns true if `(x, y)` lies inside the world, edges included.
    #[must_use]
    pub fn in_bounds(&self, x: f32, y: f32) -> bool {
        (0.0..=self.world_width).contains(&x) && (0.0..=self.world_height).contains(&y)
    }
}

// =============================================================================
// Tests
// =============================================================================
