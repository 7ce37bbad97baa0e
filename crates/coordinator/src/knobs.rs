use std::{
    sync::LazyLock,
    time::Duration,
};

use cmd_util::env::env_config;

/// Refill the dispatch queue once it drops below this many pending IDs.
pub static QUEUE_LOW_WATER: LazyLock<usize> =
    LazyLock::new(|| env_config("QUEUE_LOW_WATER", 5000));

/// How many candidate IDs the producer enumerates per refill window.
pub static QUEUE_REFILL_BATCH: LazyLock<u64> =
    LazyLock::new(|| env_config("QUEUE_REFILL_BATCH", 30000));

/// Producer sleep after a pass that queued nothing.
pub static PRODUCER_IDLE_SLEEP: LazyLock<Duration> =
    LazyLock::new(|| Duration::from_millis(env_config("PRODUCER_IDLE_SLEEP_MS", 1000)));

/// Grace period between renaming `results.jsonl` and compressing the rotated
/// segment, so a straggling write on the old inode can finish first.
pub static ROTATE_SETTLE_SLEEP: LazyLock<Duration> =
    LazyLock::new(|| Duration::from_millis(env_config("ROTATE_SETTLE_SLEEP_MS", 1000)));

/// `/work-batch` size when the client doesn't ask for one.
pub static DEFAULT_WORK_BATCH_SIZE: LazyLock<usize> =
    LazyLock::new(|| env_config("DEFAULT_WORK_BATCH_SIZE", 100));
