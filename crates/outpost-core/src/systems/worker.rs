//! Worker harvest cycle and patch assignment.
//!
//! Each tick every worker advances its state machine:
//!
//! - `ToMineral`: walk to the patch; on arrival go home if full or the patch
//!   is empty, otherwise ask the patch for the mining lock (and wait in its
//!   queue if refused).
//! - `Mining`: while holding the lock, wait out the patch cooldown, then
//!   extract up to free capacity and head home.
//! - `ToBase`: walk home, deposit through the economy, release any patch
//!   bookkeeping, then either step back out toward the patch or go idle.
//! - `Idle`: nothing until reassigned.
//!
//! After its update a worker carrying nothing whose patch is depleted is
//! moved to the nearest patch that still has minerals.

use glam::Vec2;
use tracing::debug;

use super::System;
use crate::clock::Millis;
use crate::constants::{ARRIVAL_RADIUS, DEPOSIT_STEP_BACK, MAX_WORKERS_PER_PATCH};
use crate::entity::{EntityId, EntityTag, Worker, WorkerState};
use crate::error::CommandError;
use crate::world::World;

/// Runs every worker's harvest state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerSystem;

impl System for WorkerSystem {
    fn name(&self) -> &'static str {
        "worker"
    }

    fn run(&self, world: &mut World) {
        let now = world.now();
        for id in world.arena.ids::<Worker>() {
            let Some(state) = world.arena.workers.get(&id).map(|w| w.state) else {
                continue;
            };
            match state {
                WorkerState::ToMineral => to_mineral(world, id, now),
                WorkerState::Mining => mining(world, id, now),
                WorkerState::ToBase => to_base(world, id, now),
                WorkerState::Idle => {}
            }
            reassign_if_depleted(world, id);
        }
    }
}

fn set_state(world: &mut World, id: EntityId, state: WorkerState) {
    if let Some(worker) = world.arena.workers.get_mut(&id) {
        worker.state = state;
    }
}

/// Switches a worker promoted by a patch hand-off into `Mining`.
fn promote(world: &mut World, promoted: Option<EntityId>) {
    if let Some(id) = promoted {
        set_state(world, id, WorkerState::Mining);
    }
}

fn to_mineral(world: &mut World, id: EntityId, now: Millis) {
    let arena = &mut world.arena;
    let Some(worker) = arena.workers.get(&id) else {
        return;
    };
    let Some(patch) = worker.target_patch.and_then(|p| arena.patches.get_mut(&p)) else {
        return;
    };

    let patch_pos = patch.body.position;
    if worker.body.distance_to(patch_pos) >= ARRIVAL_RADIUS {
        let speed = worker.speed;
        if let Some(worker) = arena.workers.get_mut(&id) {
            worker.body.move_toward(patch_pos, speed);
        }
        return;
    }

    let next = if worker.is_full() || patch.is_depleted() {
        WorkerState::ToBase
    } else if patch.start_mining(worker, now, &arena.workers) {
        WorkerState::Mining
    } else {
        WorkerState::ToMineral
    };
    set_state(world, id, next);
}

fn mining(world: &mut World, id: EntityId, now: Millis) {
    let arena = &mut world.arena;
    let Some(worker) = arena.workers.get(&id) else {
        return;
    };
    let Some(patch) = worker.target_patch.and_then(|p| arena.patches.get_mut(&p)) else {
        set_state(world, id, WorkerState::ToBase);
        return;
    };

    let holds_lock = patch.current_miner() == Some(id);
    if worker.is_full() || patch.is_depleted() || !holds_lock {
        if let Some(worker) = arena.workers.get_mut(&id) {
            worker.state = WorkerState::ToBase;
        }
        let promoted = if holds_lock {
            patch.finish_mining(now, &arena.workers)
        } else {
            None
        };
        promote(world, promoted);
        return;
    }

    if !patch.cooldown_elapsed(now) {
        return;
    }

    let amount = patch.extract(worker.free_capacity());
    if let Some(worker) = arena.workers.get_mut(&id) {
        worker.load(amount);
        worker.state = WorkerState::ToBase;
    }
    let promoted = patch.finish_mining(now, &arena.workers);
    debug!(worker = %id, patch = %patch.id, amount, remaining = patch.minerals(), "extracted");
    promote(world, promoted);
}

fn to_base(world: &mut World, id: EntityId, now: Millis) {
    let base_pos = world.arena.base.body.position;
    let Some(worker) = world.arena.workers.get_mut(&id) else {
        return;
    };
    if worker.body.distance_to(base_pos) >= ARRIVAL_RADIUS {
        let speed = worker.speed;
        worker.body.move_toward(base_pos, speed);
        return;
    }

    let carried = worker.unload();
    let target = worker.target_patch;
    world.economy.add_minerals(carried, &mut world.events);

    let arena = &mut world.arena;
    let mut promoted = None;
    let mut has_minerals = false;
    if let Some(patch) = target.and_then(|p| arena.patches.get_mut(&p)) {
        if patch.current_miner() == Some(id) {
            promoted = patch.finish_mining(now, &arena.workers);
        }
        patch.dequeue(id);
        has_minerals = !patch.is_depleted();
        if !has_minerals {
            patch.remove_worker();
        }
    }

    if let Some(worker) = arena.workers.get_mut(&id) {
        if has_minerals {
            let away = (worker.body.position - base_pos).try_normalize().unwrap_or(Vec2::X);
            worker.body.position = base_pos + away * DEPOSIT_STEP_BACK;
            worker.state = WorkerState::ToMineral;
        } else {
            worker.state = WorkerState::Idle;
            worker.target_patch = None;
        }
    }
    promote(world, promoted);
}

fn reassign_if_depleted(world: &mut World, id: EntityId) {
    let Some(worker) = world.arena.workers.get(&id) else {
        return;
    };
    let Some(patch_id) = worker.target_patch else {
        return;
    };
    let depleted = world
        .arena
        .patches
        .get(&patch_id)
        .is_some_and(|p| p.is_depleted());
    if worker.minerals > 0.0 || !depleted {
        return;
    }

    let position = worker.body.position;
    match world.closest_patch_with_minerals(position) {
        Some(next) => {
            debug!(worker = %id, from = %patch_id, to = %next, "patch depleted, reassigning");
            attach(world, id, next);
        }
        None => {
            detach(world, id);
            set_state(world, id, WorkerState::Idle);
        }
    }
}

// =============================================================================
// Assignment
// =============================================================================

/// Sends a worker to a patch, cleaning up its previous assignment.
///
/// The worker leaves its old patch's queue, hands back the lock if it held
/// it, and is removed from the old counter before joining the new patch in
/// `ToMineral`. If the new patch ends up with more than
/// [`MAX_WORKERS_PER_PATCH`] workers, the excess is spread over the least
/// crowded patches that still have minerals.
///
/// # Errors
///
/// Returns [`CommandError::UnknownEntity`] or [`CommandError::WrongEntityKind`]
/// if either id does not name a live worker and patch respectively.
pub fn assign_worker_to_patch(
    world: &mut World,
    worker: EntityId,
    patch: EntityId,
) -> Result<(), CommandError> {
    expect_kind(world, worker, EntityTag::Worker)?;
    expect_kind(world, patch, EntityTag::MineralPatch)?;

    attach(world, worker, patch);

    let crowded = world
        .arena
        .patches
        .get(&patch)
        .is_some_and(|p| p.worker_count() > MAX_WORKERS_PER_PATCH);
    if crowded {
        redistribute(world, patch);
    }
    Ok(())
}

/// Checks that `id` names a live entity of kind `expected`.
pub(crate) fn expect_kind(
    world: &World,
    id: EntityId,
    expected: EntityTag,
) -> Result<(), CommandError> {
    match world.arena.tag_of(id) {
        None => Err(CommandError::UnknownEntity(id)),
        Some(tag) if tag != expected => Err(CommandError::WrongEntityKind { id, expected }),
        Some(_) => Ok(()),
    }
}

/// Removes a worker from its current patch, leaving it unassigned.
fn detach(world: &mut World, id: EntityId) {
    let now = world.now();
    let arena = &mut world.arena;
    let Some(old) = arena.workers.get(&id).and_then(|w| w.target_patch) else {
        return;
    };
    let promoted = arena
        .patches
        .get_mut(&old)
        .and_then(|p| p.detach(id, now, &arena.workers));
    if let Some(worker) = arena.workers.get_mut(&id) {
        worker.target_patch = None;
    }
    promote(world, promoted);
}

/// Moves a worker onto a patch without any crowding check.
fn attach(world: &mut World, id: EntityId, patch: EntityId) {
    detach(world, id);
    if let Some(worker) = world.arena.workers.get_mut(&id) {
        worker.target_patch = Some(patch);
        worker.state = WorkerState::ToMineral;
    }
    if let Some(p) = world.arena.patches.get_mut(&patch) {
        p.add_worker();
    }
}

fn redistribute(world: &mut World, crowded: EntityId) {
    let Some(count) = world.arena.patches.get(&crowded).map(|p| p.worker_count()) else {
        return;
    };
    let excess = count.saturating_sub(MAX_WORKERS_PER_PATCH) as usize;
    let movers: Vec<EntityId> = world
        .arena
        .workers
        .values()
        .filter(|w| w.target_patch == Some(crowded))
        .map(|w| w.id)
        .take(excess)
        .collect();

    let mut moved = 0;
    for worker in movers {
        let target = world
            .arena
            .patches
            .values()
            .filter(|p| {
                p.id != crowded && !p.is_depleted() && p.worker_count() < MAX_WORKERS_PER_PATCH
            })
            .min_by_key(|p| p.worker_count())
            .map(|p| p.id);
        let Some(target) = target else {
            break;
        };
        attach(world, worker, target);
        moved += 1;
    }

    if moved > 0 {
        debug!(patch = %crowded, moved, "redistributed workers");
        world
            .events
            .warn("Redistributed workers from crowded mineral patch");
    }
}

// =============================================================================
// Tests
// =============================================================================
