//! Mineral accounting.
//!
//! [`Economy`] is the only place the mineral total changes. Every change
//! emits [`GameEvent::MineralsChanged`] so a UI can refresh whatever depends
//! on affordability.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::events::{EventLog, GameEvent};

/// The player's minerals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    minerals: f32,
    total_collected: f32,
}

impl Economy {
    /// Creates an economy holding `minerals`, with nothing collected yet.
    #[must_use]
    pub const fn new(minerals: f32) -> Self {
        Self {
            minerals,
            total_collected: 0.0,
        }
    }

    /// Minerals available to spend.
    #[must_use]
    pub const fn minerals(&self) -> f32 {
        self.minerals
    }

    /// Minerals harvested over the whole game. Bonuses do not count.
    #[must_use]
    pub const fn total_collected(&self) -> f32 {
        self.total_collected
    }

    /// True if `cost` can be paid now.
    #[must_use]
    pub fn can_afford(&self, cost: f32) -> bool {
        self.minerals >= cost
    }

    /// Deposits harvested minerals.
    pub fn add_minerals(&mut self, amount: f32, events: &mut EventLog) {
        if amount <= 0.0 {
            return;
        }
        self.total_collected += amount;
        self.credit(amount, events);
    }

    /// Awards minerals that were not harvested.
    pub fn grant_bonus(&mut self, amount: f32, events: &mut EventLog) {
        if amount > 0.0 {
            self.credit(amount, events);
        }
    }

    /// Pays `cost`, or fails without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InsufficientMinerals`] if `cost` exceeds the
    /// current total.
    pub fn spend(&mut self, cost: f32, events: &mut EventLog) -> Result<(), CommandError> {
        if !self.can_afford(cost) {
            return Err(CommandError::InsufficientMinerals {
                needed: cost,
                available: self.minerals,
            });
        }
        self.minerals -= cost;
        events.push(GameEvent::MineralsChanged {
            amount: -cost,
            total: self.minerals,
        });
        Ok(())
    }

    fn credit(&mut self, amount: f32, events: &mut EventLog) {
        self.minerals += amount;
        events.push(GameEvent::MineralsChanged {
            amount,
            total: self.minerals,
        });
    }
}
