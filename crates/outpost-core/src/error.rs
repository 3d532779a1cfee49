//! Errors returned by player commands.
//!
//! The tick loop itself never fails. Only the command surface on
//! [`Simulation`](crate::simulation::Simulation) can reject a request, and a
//! rejected command leaves the game state untouched.

use thiserror::Error;

use crate::entity::{EntityId, EntityTag};

/// Reason a player command was rejected.
///
/// The `Display` text is what the player sees in the rejection notification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// The player cannot afford the build or upgrade.
    #[error("Not enough minerals! Need {needed}")]
    InsufficientMinerals {
        /// Cost of the request.
        needed: f32,
        /// Minerals currently held.
        available: f32,
    },

    /// No live entity has this id.
    #[error("Entity {0} does not exist")]
    UnknownEntity(EntityId),

    /// The id exists but refers to the wrong kind of entity.
    #[error("Entity {id} is not a {expected}")]
    WrongEntityKind {
        /// The id supplied.
        id: EntityId,
        /// The kind the command needed.
        expected: EntityTag,
    },

    /// The build position lies outside the world.
    #[error("Cannot build outside the world at ({x}, {y})")]
    OutOfBounds {
        /// Requested x.
        x: f32,
        /// Requested y.
        y: f32,
    },

    /// A worker was requested but there is no patch to send it to.
    #[error("No mineral patch available")]
    NoMineralPatch,

    /// The game has ended.
    #[error("The game is over")]
    GameOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_minerals_message() {
        let err = CommandError::InsufficientMinerals {
            needed: 150.0,
            available: 20.0,
        };
        assert_eq!(err.to_string(), "Not enough minerals! Need 150");
    }

    #[test]
    fn wrong_kind_message() {
        let err = CommandError::WrongEntityKind {
            id: EntityId::new(7),
            expected: EntityTag::Turret,
        };
        assert_eq!(err.to_string(), "Entity 7 is not a Turret");
    }
}
