//! Mineral patch and its single-miner extraction protocol.
//!
//! A patch is a lock with a cooldown. At most one worker holds
//! `current_miner` at a time, and [`MINING_DELAY_MS`] must pass between one
//! extraction ending and the next one starting, even across different
//! workers. Workers that arrive while the lock is held wait in a FIFO queue.
//!
//! The patch never moves minerals itself: the worker holding the lock
//! extracts with [`MineralPatch::extract`] once its wait has elapsed, then
//! hands the lock back with [`MineralPatch::finish_mining`].
//!
//! # Invariants
//!
//! - `current_miner` is `None` or a worker whose `target_patch` is this patch.
//! - The queue holds no duplicates and never holds `current_miner`.
//! - `minerals` never goes negative.
//!
//! The `workers` counter and queue contents may drift when workers die or are
//! reassigned; the throttled [`validate_mining_queue`](MineralPatch::validate_mining_queue)
//! pass and the global reconciliation system heal that drift.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Body, EntityId, Worker, WorkerState};
use crate::clock::Millis;
use crate::constants::{ARRIVAL_RADIUS, MINING_DELAY_MS, PATCH_SIZE, QUEUE_VALIDATION_MS};

/// All live workers, keyed by id.
pub type WorkerMap = BTreeMap<EntityId, Worker>;

/// A finite mineral node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineralPatch {
    /// Unique id.
    pub id: EntityId,
    /// Position and footprint.
    pub body: Body,
    minerals: f32,
    max_minerals: f32,
    workers: u32,
    current_miner: Option<EntityId>,
    mining_queue: VecDeque<EntityId>,
    mining_delay: Millis,
    last_mine_time: Option<Millis>,
    last_validation: Millis,
}

impl MineralPatch {
    /// Creates a full patch. `now` seeds the validation throttle.
    #[must_use]
    pub fn new(id: EntityId, position: Vec2, minerals: f32, now: Millis) -> Self {
        Self {
            id,
            body: Body::new(position, PATCH_SIZE),
            minerals: minerals.max(0.0),
            max_minerals: minerals.max(0.0),
            workers: 0,
            current_miner: None,
            mining_queue: VecDeque::new(),
            mining_delay: MINING_DELAY_MS,
            last_mine_time: None,
            last_validation: now,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Minerals remaining.
    #[must_use]
    pub const fn minerals(&self) -> f32 {
        self.minerals
    }

    /// Minerals at creation.
    #[must_use]
    pub const fn max_minerals(&self) -> f32 {
        self.max_minerals
    }

    /// True once every mineral has been extracted.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.minerals <= 0.0
    }

    /// Number of workers assigned to this patch, as tracked by the counter.
    #[must_use]
    pub const fn worker_count(&self) -> u32 {
        self.workers
    }

    /// Worker holding the mining lock.
    #[must_use]
    pub const fn current_miner(&self) -> Option<EntityId> {
        self.current_miner
    }

    /// Workers waiting for the lock, head first.
    #[must_use]
    pub fn mining_queue(&self) -> &VecDeque<EntityId> {
        &self.mining_queue
    }

    /// Time of the last extraction event, `None` if never mined.
    #[must_use]
    pub const fn last_mine_time(&self) -> Option<Millis> {
        self.last_mine_time
    }

    /// Cooldown between extractions.
    #[must_use]
    pub const fn mining_delay(&self) -> Millis {
        self.mining_delay
    }

    /// True if the inter-miner cooldown has elapsed at `now`.
    #[must_use]
    pub fn cooldown_elapsed(&self, now: Millis) -> bool {
        self.last_mine_time
            .map_or(true, |last| now.saturating_sub(last) >= self.mining_delay)
    }

    // -------------------------------------------------------------------------
    // Counter bookkeeping
    // -------------------------------------------------------------------------

    /// Records one more assigned worker.
    pub fn add_worker(&mut self) {
        self.workers += 1;
    }

    /// Records one fewer assigned worker, never going below zero.
    pub fn remove_worker(&mut self) {
        self.workers = self.workers.saturating_sub(1);
    }

    /// Overwrites the counter. Returns true if it changed.
    pub fn set_worker_count(&mut self, count: u32) -> bool {
        let changed = self.workers != count;
        self.workers = count;
        changed
    }

    // -------------------------------------------------------------------------
    // Extraction protocol
    // -------------------------------------------------------------------------

    /// True if `worker` may take the lock right now.
    #[must_use]
    pub fn can_start_mining(&self, worker: &Worker, now: Millis) -> bool {
        self.current_miner.is_none()
            && self.cooldown_elapsed(now)
            && !worker.is_full()
            && !self.is_depleted()
    }

    /// Tries to give `worker` the lock.
    ///
    /// On success the worker leaves the queue, becomes `current_miner`, the
    /// cooldown restarts and a validation pass runs. Otherwise the worker is
    /// queued if it is a valid future candidate, and silently dropped if not.
    pub fn start_mining(&mut self, worker: &Worker, now: Millis, workers: &WorkerMap) -> bool {
        if self.can_start_mining(worker, now) {
            self.mining_queue.retain(|&id| id != worker.id);
            self.current_miner = Some(worker.id);
            self.last_mine_time = Some(now);
            trace!(patch = %self.id, worker = %worker.id, "mining started");
            self.validate_mining_queue(now, workers);
            return true;
        }

        let candidate = !self.mining_queue.contains(&worker.id)
            && self.current_miner != Some(worker.id)
            && !worker.is_full()
            && !self.is_depleted()
            && worker.state != WorkerState::Mining;
        if candidate {
            self.mining_queue.push_back(worker.id);
        }
        false
    }

    /// Releases the lock and restarts the cooldown.
    ///
    /// Call after the outgoing miner's cargo has been written back to
    /// `workers`. Unless that miner is full or the patch is empty, stale
    /// queue entries are purged and an adjacent, eligible head of queue is
    /// promoted. Returns the promoted worker, whose state the caller must
    /// switch to [`WorkerState::Mining`].
    pub fn finish_mining(&mut self, now: Millis, workers: &WorkerMap) -> Option<EntityId> {
        let previous = self.current_miner.take();
        self.last_mine_time = Some(now);

        let previous_full = previous
            .and_then(|id| workers.get(&id))
            .is_some_and(Worker::is_full);
        if previous.is_some() && (previous_full || self.is_depleted()) {
            self.validate_mining_queue(now, workers);
            return None;
        }

        let patch_id = self.id;
        let depleted = self.is_depleted();
        self.mining_queue.retain(|id| {
            Some(*id) != previous
                && workers.get(id).is_some_and(|w| {
                    w.target_patch == Some(patch_id)
                        && !w.is_full()
                        && w.state != WorkerState::ToBase
                        && w.state != WorkerState::Mining
                })
                && !depleted
        });

        let mut promoted = None;
        if let Some(head) = self.mining_queue.front().and_then(|id| workers.get(id)) {
            let adjacent = head.body.distance_to(self.body.position) < ARRIVAL_RADIUS;
            if head.state == WorkerState::ToMineral
                && adjacent
                && self.can_start_mining(head, now)
            {
                self.mining_queue.pop_front();
                if self.start_mining(head, now, workers) {
                    promoted = Some(head.id);
                }
            }
        }

        self.validate_mining_queue(now, workers);
        promoted
    }

    /// Moves minerals out of the patch, clamped to what remains.
    ///
    /// Returns the amount actually removed.
    pub fn extract(&mut self, amount: f32) -> f32 {
        let taken = amount.min(self.minerals).max(0.0);
        self.minerals -= taken;
        taken
    }

    /// Throttled self-check, at most once per [`QUEUE_VALIDATION_MS`].
    ///
    /// Drops a current miner that no longer exists or no longer targets this
    /// patch (restarting the cooldown so the patch cannot stall), filters the
    /// queue down to live, assigned, non-full, non-mining workers, and
    /// recounts the `workers` counter from `workers`.
    pub fn validate_mining_queue(&mut self, now: Millis, workers: &WorkerMap) {
        if now.saturating_sub(self.last_validation) <= QUEUE_VALIDATION_MS {
            return;
        }

        let patch_id = self.id;
        if let Some(miner) = self.current_miner {
            let valid = workers
                .get(&miner)
                .is_some_and(|w| w.target_patch == Some(patch_id));
            if !valid {
                self.current_miner = None;
                self.last_mine_time = Some(now);
            }
        }

        self.mining_queue.retain(|id| {
            workers.get(id).is_some_and(|w| {
                w.target_patch == Some(patch_id) && !w.is_full() && w.state != WorkerState::Mining
            })
        });

        self.recount(workers);
        self.last_validation = now;
    }

    /// Recomputes the counter from the workers that target this patch.
    ///
    /// Returns true if the counter had drifted.
    pub fn recount(&mut self, workers: &WorkerMap) -> bool {
        let actual = workers
            .values()
            .filter(|w| w.target_patch == Some(self.id))
            .count();
        self.set_worker_count(u32::try_from(actual).unwrap_or(u32::MAX))
    }

    /// Unconditional cleanup used by the periodic reconciliation.
    ///
    /// Drops queue entries for workers that no longer exist, removes
    /// duplicates, and clears a current miner that no longer exists.
    /// Returns true if anything changed.
    pub fn reconcile(&mut self, now: Millis, workers: &WorkerMap) -> bool {
        let before = self.mining_queue.len();
        let mut seen = BTreeSet::new();
        let current = self.current_miner;
        self.mining_queue
            .retain(|id| workers.contains_key(id) && Some(*id) != current && seen.insert(*id));
        let mut changed = before != self.mining_queue.len();

        if let Some(miner) = self.current_miner {
            if !workers.contains_key(&miner) {
                self.current_miner = None;
                self.last_mine_time = Some(now);
                changed = true;
            }
        }
        changed
    }

    /// Removes every trace of a worker from the lock and the queue.
    ///
    /// Used when a worker dies. Does not touch the counter.
    pub fn forget(&mut self, worker: EntityId, now: Millis) {
        self.mining_queue.retain(|&id| id != worker);
        if self.current_miner == Some(worker) {
            self.current_miner = None;
            self.last_mine_time = Some(now);
        }
    }

    /// Appends a worker to the back of the queue unless it is already
    /// waiting or holds the lock.
    pub fn enqueue(&mut self, worker: EntityId) {
        if self.current_miner != Some(worker) && !self.mining_queue.contains(&worker) {
            self.mining_queue.push_back(worker);
        }
    }

    /// Removes a worker from the queue only.
    pub fn dequeue(&mut self, worker: EntityId) {
        self.mining_queue.retain(|&id| id != worker);
    }

    /// Detaches a worker being reassigned away from this patch.
    ///
    /// Leaves the queue, hands the lock back if held, and decrements the
    /// counter. Returns a promoted worker as [`finish_mining`](Self::finish_mining) does.
    pub fn detach(&mut self, worker: EntityId, now: Millis, workers: &WorkerMap) -> Option<EntityId> {
        self.dequeue(worker);
        let promoted = if self.current_miner == Some(worker) {
            self.finish_mining(now, workers)
        } else {
            None
        };
        self.remove_worker();
        promoted
    }
}

// =============================================================================
// Tests
// =============================================================================
