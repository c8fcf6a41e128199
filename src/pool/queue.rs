// Tue Jan 15 2026 - Alex

use crate::error::LinkError;
use crate::files::ParsedFile;
use crate::format::probe::IngestStats;
use crate::options::LinkOptions;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Everything the parse lock guards. The lock is never held across an
/// actual parse.
pub struct PoolState {
    /// Write-once by the claiming worker, taken by the consumer.
    pub parsed: Vec<Option<ParsedFile>>,
    /// Per-slot "may be claimed" flag; cleared on claim so two workers
    /// never parse the same slot.
    pub ready: Vec<bool>,
    /// Count of ready, unclaimed slots.
    pub available: usize,
    /// Smallest slot at or after which a ready job is believed to exist.
    pub cursor: usize,
    /// Total work left; workers exit when this reaches zero.
    pub remaining: usize,
    /// Slot the consumer is blocked on, if any.
    pub needed_slot: Option<usize>,
    pub idle_workers: usize,
    /// Headroom for lazily spawning more workers.
    pub available_workers: usize,
    /// First fatal error; latched once, surfaced at the next consumer wait.
    pub error: Option<LinkError>,
}

pub struct PoolShared {
    pub state: Mutex<PoolState>,
    pub work_ready: Condvar,
    pub new_file: Condvar,
    pub options: Arc<LinkOptions>,
    pub stats: IngestStats,
}

impl PoolShared {
    pub fn new(options: Arc<LinkOptions>) -> Arc<PoolShared> {
        let count = options.inputs.len();
        let pipelined = options.pipeline_enabled();
        let mut ready = Vec::with_capacity(count);
        let mut available = 0;
        for info in &options.inputs {
            // pipelined from-file-list entries wait for the listener
            let ready_now = !info.from_file_list || !pipelined;
            if ready_now {
                available += 1;
            }
            ready.push(ready_now);
        }
        let mut parsed = Vec::with_capacity(count);
        parsed.resize_with(count, || None);
        Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                parsed,
                ready,
                available,
                cursor: 0,
                remaining: count,
                needed_slot: None,
                idle_workers: 0,
                available_workers: num_cpus::get().min(count),
                error: None,
            }),
            work_ready: Condvar::new(),
            new_file: Condvar::new(),
            options,
            stats: IngestStats::default(),
        })
    }

    /// Ordered consumption: blocks until `slot` is filled, spawning another
    /// worker when there is claimable work and headroom. Re-raises any
    /// latched error.
    pub fn wait_for_slot(shared: &Arc<PoolShared>, slot: usize) -> Result<ParsedFile, LinkError> {
        let mut state = shared.state.lock();
        while state.parsed[slot].is_none() && state.error.is_none() {
            if state.available > 0 && state.available_workers > 0 {
                state.available_workers -= 1;
                crate::pool::worker::spawn_worker(shared);
            }
            state.needed_slot = Some(slot);
            shared.new_file.wait(&mut state);
        }
        if let Some(err) = state.error.take() {
            return Err(err);
        }
        Ok(state.parsed[slot].take().expect("slot filled"))
    }
}
