//! Phase-gated goals, mineral bonuses and the victory condition.
//!
//! The game moves through four [`Phase`]s. Every tick the goals of the
//! current phase are evaluated against live state. A goal that is true for
//! the first time in its phase is recorded and announced; goals are not
//! latched, so a phase only completes on a tick where all of its goals hold
//! at once. Completing a phase pays its bonus, clears the record and moves
//! on. Completing the final phase wins the game.
//!
//! Milestone announcements are rate-limited: while one is on screen (for
//! [`MILESTONE_NOTIFICATION_MS`]) further goals are recorded silently.
//!
//! # Example
//!
//! ```
//! use outpost_core::systems::milestone::{GoalId, Phase};
//!
//! assert_eq!(Phase::Establishment.goals()[0], GoalId::Workers3);
//! assert_eq!(Phase::Establishment.next(), Some(Phase::Infrastructure));
//! assert_eq!(Phase::Final.next(), None);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::System;
use crate::clock::Millis;
use crate::constants::{MILESTONE_NOTIFICATION_MS, SURVIVAL_GOAL_MS};
use crate::entity::{Battery, Enemy, Turret, Worker};
use crate::events::GameEvent;
use crate::world::{GameStatus, World};

// =============================================================================
// Phases and goals
// =============================================================================

/// A stage of the milestone track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Get the economy and a first defense going.
    #[default]
    Establishment,
    /// Grow the workforce and defenses.
    Infrastructure,
    /// Hold up under pressure.
    Fortification,
    /// Survive to the end.
    Final,
}

impl Phase {
    /// Display name used in announcements.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Establishment => "Establishment",
            Self::Infrastructure => "Infrastructure",
            Self::Fortification => "Fortification",
            Self::Final => "Final Challenge",
        }
    }

    /// Minerals paid on completion. The final phase pays with victory.
    #[must_use]
    pub const fn bonus(self) -> f32 {
        match self {
            Self::Establishment => 500.0,
            Self::Infrastructure => 1000.0,
            Self::Fortification => 2000.0,
            Self::Final => 0.0,
        }
    }

    /// The phase after this one.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Establishment => Some(Self::Infrastructure),
            Self::Infrastructure => Some(Self::Fortification),
            Self::Fortification => Some(Self::Final),
            Self::Final => None,
        }
    }

    /// Goals that must all hold to complete this phase.
    #[must_use]
    pub const fn goals(self) -> &'static [GoalId] {
        match self {
            Self::Establishment => &[GoalId::Workers3, GoalId::Minerals500, GoalId::FirstTurret],
            Self::Infrastructure => &[
                GoalId::Workers5,
                GoalId::Turrets3,
                GoalId::FirstBattery,
                GoalId::Minerals5000,
            ],
            Self::Fortification => &[
                GoalId::SurviveWave5,
                GoalId::Workers8,
                GoalId::DefenseSetup,
                GoalId::Minerals15000,
            ],
            Self::Final => &[
                GoalId::Survive10Min,
                GoalId::BaseHealth,
                GoalId::MineralPatch,
                GoalId::FinalWave,
            ],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalId {
    /// At least 3 workers.
    Workers3,
    /// 500 minerals harvested.
    Minerals500,
    /// At least one turret.
    FirstTurret,
    /// At least 5 workers.
    Workers5,
    /// At least 3 turrets.
    Turrets3,
    /// At least one battery.
    FirstBattery,
    /// 5000 minerals harvested.
    Minerals5000,
    /// Past wave 5 with the base at 75% or better.
    SurviveWave5,
    /// At least 8 workers.
    Workers8,
    /// At least 5 turrets and 2 batteries.
    DefenseSetup,
    /// 15000 minerals harvested.
    Minerals15000,
    /// Ten minutes of game time.
    Survive10Min,
    /// Base at 50% or better.
    BaseHealth,
    /// Some patch still has minerals.
    MineralPatch,
    /// Wave 10 reached with no enemies left.
    FinalWave,
}

impl GoalId {
    /// True if the goal holds in `world` right now.
    #[must_use]
    pub fn is_met(self, world: &World) -> bool {
        let arena = &world.arena;
        let collected = world.economy.total_collected();
        let base = arena.base().health.ratio();
        match self {
            Self::Workers3 => arena.count::<Worker>() >= 3,
            Self::Minerals500 => collected >= 500.0,
            Self::FirstTurret => arena.count::<Turret>() >= 1,
            Self::Workers5 => arena.count::<Worker>() >= 5,
            Self::Turrets3 => arena.count::<Turret>() >= 3,
            Self::FirstBattery => arena.count::<Battery>() >= 1,
            Self::Minerals5000 => collected >= 5000.0,
            Self::SurviveWave5 => world.waves.wave > 5 && base >= 0.75,
            Self::Workers8 => arena.count::<Worker>() >= 8,
            Self::DefenseSetup => arena.count::<Turret>() >= 5 && arena.count::<Battery>() >= 2,
            Self::Minerals15000 => collected >= 15000.0,
            Self::Survive10Min => world.now() >= SURVIVAL_GOAL_MS,
            Self::BaseHealth => base >= 0.5,
            Self::MineralPatch => arena.patches().values().any(|p| !p.is_depleted()),
            Self::FinalWave => world.waves.wave >= 10 && arena.count::<Enemy>() == 0,
        }
    }

    /// Announcement text, with live progress where the goal has any.
    #[must_use]
    pub fn description(self, world: &World) -> String {
        let collected = world.economy.total_collected().floor();
        match self {
            Self::Workers3 => "Build 3 workers".into(),
            Self::Minerals500 => format!("Collect 500 minerals ({collected})"),
            Self::FirstTurret => "Build your first turret".into(),
            Self::Workers5 => "Reach 5 workers".into(),
            Self::Turrets3 => "Build 3 turrets".into(),
            Self::FirstBattery => "Build first battery".into(),
            Self::Minerals5000 => format!("Accumulate 5,000 minerals ({collected})"),
            Self::SurviveWave5 => "Survive Wave 5 with 75%+ health".into(),
            Self::Workers8 => "Have 8 workers operational".into(),
            Self::DefenseSetup => "Maintain 5 turrets and 2 batteries".into(),
            Self::Minerals15000 => format!("Reach 15,000 minerals ({collected})"),
            Self::Survive10Min => "Survive for 10 minutes".into(),
            Self::BaseHealth => "Keep base health above 50%".into(),
            Self::MineralPatch => "Have at least one mineral patch not depleted".into(),
            Self::FinalWave => "Defeat the final wave".into(),
        }
    }
}

// =============================================================================
// State
// =============================================================================

/// Milestone progress carried between ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneState {
    /// Phase being worked on.
    pub phase: Phase,
    /// Goals of the current phase already announced.
    pub completed: BTreeSet<GoalId>,
    /// Milestone announcements stay silent until this time.
    pub quiet_until: Millis,
}

// =============================================================================
// System
// =============================================================================

/// Evaluates goals and advances phases.
#[derive(Debug, Clone, Copy, Default)]
pub struct MilestoneSystem;

impl System for MilestoneSystem {
    fn name(&self) -> &'static str {
        "milestone"
    }

    fn run(&self, world: &mut World) {
        if world.is_over() {
            return;
        }
        let now = world.now();
        let phase = world.milestones.phase;
        let mut all_met = true;

        for &goal in phase.goals() {
            if !goal.is_met(world) {
                all_met = false;
                continue;
            }
            if !world.milestones.completed.insert(goal) {
                continue;
            }
            let description = goal.description(world);
            debug!(phase = %phase, goal = ?goal, "milestone completed");
            if now >= world.milestones.quiet_until {
                world.events.notify(
                    format!("Milestone Complete: {description}!"),
                    MILESTONE_NOTIFICATION_MS,
                );
                world.milestones.quiet_until = now + MILESTONE_NOTIFICATION_MS;
            }
            world.events.push(GameEvent::MilestoneCompleted {
                phase,
                goal,
                description,
            });
        }

        if all_met {
            complete_phase(world, phase);
        }
    }
}

fn complete_phase(world: &mut World, phase: Phase) {
    let Some(next) = phase.next() else {
        world.status.insert(GameStatus::VICTORY | GameStatus::GAME_OVER);
        world.events.push(GameEvent::Victory);
        info!(time_ms = world.now(), wave = world.waves.wave, "victory");
        return;
    };

    let bonus = phase.bonus();
    world.economy.grant_bonus(bonus, &mut world.events);
    world
        .events
        .notify(format!("{} Phase Complete!", phase.name()), MILESTONE_NOTIFICATION_MS);
    world.events.push(GameEvent::PhaseCompleted { phase, bonus });
    world.milestones.completed.clear();
    world.milestones.phase = next;
    info!(phase = %phase, next = %next, bonus, "phase completed");
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::MineralPatch;
    use crate::events::EventLog;
    use glam::Vec2;

    fn world() -> World {
        World::new(
            SimConfig {
                initial_workers: 0,
                ..SimConfig::default()
            },
            1,
        )
    }

    fn add_workers(world: &mut World, n: usize) {
        for _ in 0..n {
            world.arena.spawn(|id| Worker::new(id, Vec2::ZERO, 1.0));
        }
    }

    fn add_turrets(world: &mut World, n: usize) {
        for _ in 0..n {
            world.arena.spawn(|id| Turret::new(id, Vec2::ZERO));
        }
    }

    fn harvest(world: &mut World, amount: f32) {
        let mut events = EventLog::new();
        world.economy.add_minerals(amount, &mut events);
    }

    fn milestone_events(world: &World) -> usize {
        world
            .events
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::MilestoneCompleted { .. }))
            .count()
    }

    mod goal_tests {
        use super::*;

        #[test]
        fn establishment_goals_track_live_state() {
            let mut w = world();
            assert!(!GoalId::Workers3.is_met(&w));
            add_workers(&mut w, 3);
            assert!(GoalId::Workers3.is_met(&w));

            harvest(&mut w, 499.0);
            assert!(!GoalId::Minerals500.is_met(&w));
            harvest(&mut w, 1.0);
            assert!(GoalId::Minerals500.is_met(&w));
        }

        #[test]
        fn survive_wave_needs_healthy_base() {
            let mut w = world();
            w.waves.wave = 6;
            assert!(GoalId::SurviveWave5.is_met(&w));
            w.arena.base_mut().health.take_damage(251.0);
            assert!(!GoalId::SurviveWave5.is_met(&w));
        }

        #[test]
        fn patch_goal_fails_when_all_depleted() {
            let mut w = world();
            assert!(GoalId::MineralPatch.is_met(&w));
            for id in w.arena.ids::<MineralPatch>() {
                if let Some(p) = w.arena.patches.get_mut(&id) {
                    p.extract(f32::MAX);
                }
            }
            assert!(!GoalId::MineralPatch.is_met(&w));
        }

        #[test]
        fn description_shows_progress() {
            let mut w = world();
            harvest(&mut w, 123.7);
            assert_eq!(
                GoalId::Minerals500.description(&w),
                "Collect 500 minerals (123)"
            );
        }
    }

    mod progression_tests {
        use super::*;

        #[test]
        fn goal_is_announced_once() {
            let mut w = world();
            add_turrets(&mut w, 1);
            MilestoneSystem.run(&mut w);
            MilestoneSystem.run(&mut w);
            assert_eq!(milestone_events(&w), 1);
            assert!(w.milestones.completed.contains(&GoalId::FirstTurret));
        }

        #[test]
        fn announcements_are_rate_limited_but_recorded() {
            let mut w = world();
            add_turrets(&mut w, 1);
            add_workers(&mut w, 3);
            MilestoneSystem.run(&mut w);

            let notices = w
                .events
                .events()
                .iter()
                .filter(|e| matches!(e, GameEvent::Notification { text, .. } if text.starts_with("Milestone")))
                .count();
            assert_eq!(notices, 1);
            assert_eq!(milestone_events(&w), 2);
            assert_eq!(w.milestones.completed.len(), 2);
        }

        #[test]
        fn phase_completion_pays_bonus_and_advances() {
            let mut w = world();
            add_turrets(&mut w, 1);
            add_workers(&mut w, 3);
            harvest(&mut w, 500.0);
            let before = w.economy.minerals();

            MilestoneSystem.run(&mut w);

            assert_eq!(w.milestones.phase, Phase::Infrastructure);
            assert!(w.milestones.completed.is_empty());
            assert!((w.economy.minerals() - before - 500.0).abs() < 1e-3);
            assert!((w.economy.total_collected() - 500.0).abs() < 1e-3);
            assert!(w.events.events().contains(&GameEvent::PhaseCompleted {
                phase: Phase::Establishment,
                bonus: 500.0
            }));
        }

        #[test]
        fn final_phase_wins() {
            let mut w = world();
            w.milestones.phase = Phase::Final;
            w.waves.wave = 10;
            while w.now() < SURVIVAL_GOAL_MS {
                w.clock.advance();
            }

            MilestoneSystem.run(&mut w);

            assert!(w.status.contains(GameStatus::VICTORY | GameStatus::GAME_OVER));
            assert!(w.events.events().contains(&GameEvent::Victory));
        }

        #[test]
        fn enemies_alive_block_victory() {
            let mut w = world();
            w.milestones.phase = Phase::Final;
            w.waves.wave = 12;
            while w.now() < SURVIVAL_GOAL_MS {
                w.clock.advance();
            }
            w.arena.spawn(|id| {
                Enemy::new(id, Vec2::ZERO, crate::entity::EnemyKind::Fast, 12, 1.0)
            });

            MilestoneSystem.run(&mut w);
            assert!(!w.is_over());
        }
    }
}
