//! Events emitted by the simulation for the presentation layer.
//!
//! Systems push [`GameEvent`]s into the [`EventLog`] as things happen. The
//! host drains the log with
//! [`Simulation::take_events`](crate::simulation::Simulation::take_events)
//! once per frame. Nothing in the core reads events back.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::constants::NOTIFICATION_MS;
use crate::entity::{EnemyKind, EntityId, EntityTag};
use crate::systems::milestone::{GoalId, Phase};

/// Something the UI may want to show or react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Transient message for the player.
    Notification {
        /// Text to show.
        text: String,
        /// How long to show it.
        duration_ms: Millis,
    },
    /// The mineral total changed.
    MineralsChanged {
        /// Signed change.
        amount: f32,
        /// New total.
        total: f32,
    },
    /// A new wave began.
    WaveStarted {
        /// Wave number.
        wave: u32,
    },
    /// An enemy entered the world.
    EnemySpawned {
        /// Its id.
        id: EntityId,
        /// Its archetype.
        kind: EnemyKind,
    },
    /// An entity was removed after dying or leaving the world.
    EntityDestroyed {
        /// Its id.
        id: EntityId,
        /// Its kind.
        tag: EntityTag,
    },
    /// A milestone goal was met for the first time in its phase.
    MilestoneCompleted {
        /// Phase the goal belongs to.
        phase: Phase,
        /// Which goal.
        goal: GoalId,
        /// Human-readable goal text.
        description: String,
    },
    /// Every goal of a phase was met.
    PhaseCompleted {
        /// The completed phase.
        phase: Phase,
        /// Minerals awarded.
        bonus: f32,
    },
    /// The base was destroyed.
    GameOver,
    /// The final phase was completed.
    Victory,
}

/// Accumulated events since the last drain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Appends a notification shown for `duration_ms`.
    pub fn notify(&mut self, text: impl Into<String>, duration_ms: Millis) {
        self.push(GameEvent::Notification {
            text: text.into(),
            duration_ms,
        });
    }

    /// Appends a notification with the default duration.
    pub fn warn(&mut self, text: impl Into<String>) {
        self.notify(text, NOTIFICATION_MS);
    }

    /// Events accumulated so far.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Removes and returns every accumulated event.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
