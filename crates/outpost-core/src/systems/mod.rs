//! Per-tick systems.
//!
//! Each system is a stateless unit struct implementing [`System`]. The
//! [`Simulation`](crate::simulation::Simulation) runs them in the fixed order
//! returned by [`standard_systems`], each to completion before the next:
//!
//! 1. [`WorkerSystem`]: harvest state machines
//! 2. [`TurretSystem`], [`BatterySystem`], [`LauncherSystem`]: defenses
//! 3. [`EnemySystem`]: targeting and movement
//! 4. [`ProjectileSystem`]: turret missile flight
//! 5. [`CollisionSystem`]: hits, melee, game over, and the removal sweep
//! 6. [`SpawnSystem`]: wave timer and enemy generation
//! 7. [`MilestoneSystem`]: goal checks, bonuses, victory
//! 8. [`ReconcileSystem`]: periodic patch bookkeeping repair

pub mod battery;
pub mod collision;
pub mod enemy;
pub mod launcher;
pub mod milestone;
pub mod projectile;
pub mod reconcile;
pub mod spawn;
pub mod turret;
pub mod worker;

use std::fmt::Debug;

use crate::world::World;

pub use battery::BatterySystem;
pub use collision::CollisionSystem;
pub use enemy::EnemySystem;
pub use launcher::LauncherSystem;
pub use milestone::MilestoneSystem;
pub use projectile::ProjectileSystem;
pub use reconcile::ReconcileSystem;
pub use spawn::SpawnSystem;
pub use turret::TurretSystem;
pub use worker::WorkerSystem;

/// One stage of the tick.
///
/// Systems hold no state of their own; everything persistent lives in the
/// [`World`] so a game can be inspected or cloned between ticks.
pub trait System: Debug + Send + Sync {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Runs the stage against the world.
    fn run(&self, world: &mut World);
}

/// The systems of one tick, in execution order.
#[must_use]
pub fn standard_systems() -> Vec<Box<dyn System>> {
    vec![
        Box::new(WorkerSystem),
        Box::new(TurretSystem),
        Box::new(BatterySystem),
        Box::new(LauncherSystem),
        Box::new(EnemySystem),
        Box::new(ProjectileSystem),
        Box::new(CollisionSystem),
        Box::new(SpawnSystem),
        Box::new(MilestoneSystem),
        Box::new(ReconcileSystem),
    ]
}

/// Wraps an angle into `(-pi, pi]`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
