use std::{
    collections::VecDeque,
    sync::Arc,
};

use crate::{
    knobs::{
        PRODUCER_IDLE_SLEEP,
        QUEUE_LOW_WATER,
        QUEUE_REFILL_BATCH,
    },
    manager::WorkManager,
};

/// The pool of IDs ready to hand to workers, plus the enumeration cursor.
/// Drained by `/work-batch`, refilled by the producer task. Lives under the
/// store mutex in [`WorkManager`].
pub struct DispatchQueue {
    queue: VecDeque<u64>,
    /// Highest ID the producer has enumerated so far.
    last_queued_id: u64,
    end_id: u64,
}

/// One producer enumeration window.
pub struct RefillWindow {
    pub start: u64,
    pub end: u64,
}

impl DispatchQueue {
    pub fn new(start_id: u64, end_id: u64) -> Self {
        Self {
            queue: VecDeque::new(),
            last_queued_id: start_id.saturating_sub(1),
            end_id,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// The next enumeration window, or `None` while the queue is comfortably
    /// full or once the ID space is exhausted.
    pub fn refill_window(&self) -> Option<RefillWindow> {
        if self.queue.len() >= *QUEUE_LOW_WATER || self.last_queued_id >= self.end_id {
            return None;
        }
        let start = self.last_queued_id + 1;
        let end = start
            .saturating_add(*QUEUE_REFILL_BATCH - 1)
            .min(self.end_id);
        Some(RefillWindow { start, end })
    }

    /// Push the filtered IDs of `window` and advance the cursor past it.
    pub fn complete_refill(&mut self, window: RefillWindow, ids: Vec<u64>) {
        self.queue.extend(ids);
        self.last_queued_id = window.end;
    }

    pub fn pop(&mut self) -> Option<u64> {
        self.queue.pop_front()
    }
}

/// Keep the dispatch queue populated for the life of the process. Once the
/// cursor passes `end_id` every pass is a no-op and the task idles.
///
/// An ID whose worker vanished stays in `assigned` and is never
/// re-enumerated here: the cursor has already moved past it, and only a
/// restart (which clears `assigned`) returns it to the pool. This matches
/// the long-standing behaviour of the swarm; operators restart the
/// coordinator to reclaim abandoned assignments.
pub async fn run_producer(manager: Arc<WorkManager>) {
    loop {
        let added = manager.refill_queue();
        if added == 0 {
            tokio::time::sleep(*PRODUCER_IDLE_SLEEP).await;
        }
    }
}
