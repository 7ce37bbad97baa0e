use std::{
    collections::HashSet,
    net::IpAddr,
};

use anyhow::Context;
use common::{
    errors::ErrorMetadata,
    fs::disk_usage_percent,
};
use parking_lot::Mutex;
use serde::Serialize;

use crate::{
    config::CoordinatorConfig,
    dispatch::DispatchQueue,
    state::{
        StateStore,
        WorkRecord,
    },
};

/// Facade over the dispatch queue and the durable state store.
///
/// One coarse mutex guards the membership sets, the queue, the enumeration
/// cursor, and every durable append. Appends fsync while holding it, which
/// is what makes the commit ordering crash-safe; the workload (large-batch
/// dequeues, relatively rare commits) is bounded by fsync latency rather
/// than contention.
pub struct WorkManager {
    config: CoordinatorConfig,
    pub(crate) inner: Mutex<Inner>,
    /// Unique peers that have asked for work, for the monitor.
    worker_addrs: Mutex<HashSet<IpAddr>>,
}

pub(crate) struct Inner {
    pub(crate) store: StateStore,
    pub(crate) dispatch: DispatchQueue,
}

#[derive(Serialize)]
pub struct Progress {
    pub completed: u64,
    pub private: u64,
    pub total_processed: u64,
    pub remaining: u64,
    pub progress_percent: f64,
    pub disk_usage_percent: u64,
    pub connected_workers: u64,
    pub results_file_size: u64,
    pub available_queue_size: u64,
}

#[derive(Serialize)]
pub struct FileStatus {
    pub results_file_size: u64,
    pub results_file_path: String,
}

impl WorkManager {
    /// Recover durable state from the output directory and start with a
    /// fresh dispatch cursor at `start_id - 1`.
    pub fn open(config: CoordinatorConfig) -> anyhow::Result<Self> {
        let store = StateStore::open(&config)?;
        let dispatch = DispatchQueue::new(config.start_id, config.end_id);
        Ok(Self {
            config,
            inner: Mutex::new(Inner { store, dispatch }),
            worker_addrs: Mutex::new(HashSet::new()),
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// One producer pass: snapshot the next window and the exclusion union
    /// under the mutex, enumerate the gaps outside it, then push the result
    /// and advance the cursor. Returns how many IDs were queued.
    ///
    /// IDs that transition to completed/private/assigned between snapshot
    /// and push are handed out anyway; the redundant completion is
    /// deduplicated at commit time.
    pub fn refill_queue(&self) -> usize {
        let (window, excluded) = {
            let inner = self.inner.lock();
            let Some(window) = inner.dispatch.refill_window() else {
                return 0;
            };
            let excluded = inner
                .store
                .completed
                .union(&inner.store.private)
                .union(&inner.store.assigned);
            (window, excluded)
        };
        // Gap enumeration is the expensive part; the mutex is released while
        // it runs.
        let new_ids = excluded.filter_range(window.start, window.end);
        let added = new_ids.len();
        let mut inner = self.inner.lock();
        if added > 0 {
            tracing::debug!(
                "Queued {added} IDs from window [{}, {}]",
                window.start,
                window.end
            );
        }
        inner.dispatch.complete_refill(window, new_ids);
        added
    }

    /// Hand out up to `batch_size` pending IDs, moving each into `assigned`,
    /// and record `client` for the monitor. Returns fewer (possibly zero)
    /// IDs when the queue runs dry.
    pub fn get_batch(&self, batch_size: usize, client: Option<IpAddr>) -> Vec<u64> {
        if let Some(addr) = client {
            self.worker_addrs.lock().insert(addr);
        }
        let mut inner = self.inner.lock();
        let mut batch = Vec::with_capacity(batch_size.min(inner.dispatch.len()));
        while batch.len() < batch_size {
            let Some(id) = inner.dispatch.pop() else {
                break;
            };
            inner.store.assigned.add(id);
            batch.push(id);
        }
        batch
    }

    /// Parse and durably commit a completed work, returning its ID. On a
    /// durability failure the ID stays `assigned` so a worker retry can
    /// still land it.
    pub fn submit_completed(&self, record: WorkRecord) -> anyhow::Result<u64> {
        let id: u64 = record.id.parse().map_err(|_| {
            anyhow::anyhow!(ErrorMetadata::bad_request(
                "InvalidWorkId",
                format!("work id {:?} is not a non-negative integer", record.id),
            ))
        })?;
        let mut inner = self.inner.lock();
        inner
            .store
            .commit_completed(id, &record)
            .with_context(|| format!("committing completed work {id}"))?;
        Ok(id)
    }

    /// Durably mark a work as private.
    pub fn submit_private(&self, id: u64) -> anyhow::Result<()> {
        let mut inner = self.inner.lock();
        inner
            .store
            .commit_private(id)
            .with_context(|| format!("committing private work {id}"))
    }

    pub fn progress(&self) -> Progress {
        let (completed, private, queue_len, results_file_size) = {
            let inner = self.inner.lock();
            (
                inner.store.completed.len(),
                inner.store.private.len(),
                inner.dispatch.len(),
                inner.store.results_file_size(),
            )
        };
        let total_processed = completed + private;
        let total_range = self
            .config
            .end_id
            .saturating_sub(self.config.start_id)
            .saturating_add(1);
        let progress_percent = if total_range > 0 {
            total_processed as f64 / total_range as f64 * 100.0
        } else {
            0.0
        };
        // The disk probe is comparatively slow; keep it off the store mutex.
        let disk_usage_percent = disk_usage_percent(&self.config.output);
        Progress {
            completed,
            private,
            total_processed,
            remaining: total_range.saturating_sub(total_processed),
            progress_percent,
            disk_usage_percent,
            connected_workers: self.worker_addrs.lock().len() as u64,
            results_file_size,
            available_queue_size: queue_len as u64,
        }
    }

    pub fn file_status(&self) -> FileStatus {
        let inner = self.inner.lock();
        FileStatus {
            results_file_size: inner.store.results_file_size(),
            results_file_path: self.config.results_file().display().to_string(),
        }
    }
}
