//! Periodic repair of patch bookkeeping.
//!
//! Every [`RECONCILE_INTERVAL_MS`] each patch recounts the workers that
//! target it and drops queue entries and a current miner that no longer
//! exist. Drift is logged and fixed; it is never an error.

use tracing::debug;

use super::System;
use crate::constants::RECONCILE_INTERVAL_MS;
use crate::world::World;

/// Recounts and cleans patch state on a fixed period.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileSystem;

impl System for ReconcileSystem {
    fn name(&self) -> &'static str {
        "reconcile"
    }

    fn run(&self, world: &mut World) {
        let now = world.now();
        if now.saturating_sub(world.last_reconcile) <= RECONCILE_INTERVAL_MS {
            return;
        }
        world.last_reconcile = now;

        let arena = &mut world.arena;
        for patch in arena.patches.values_mut() {
            let before = patch.worker_count();
            let recounted = patch.recount(&arena.workers);
            let cleaned = patch.reconcile(now, &arena.workers);
            if recounted || cleaned {
                debug!(
                    patch = %patch.id,
                    before,
                    after = patch.worker_count(),
                    queue = patch.mining_queue().len(),
                    "patch bookkeeping repaired"
                );
            }
        }
    }
}
