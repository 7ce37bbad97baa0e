use std::{
    fs::File,
    io::{
        BufRead,
        BufReader,
    },
    path::Path,
};

use anyhow::Context;
use rangeset::RangeSet;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    config::CoordinatorConfig,
    durable_log::DurableLog,
};

/// One completed work, as submitted by a worker and recorded verbatim as a
/// line of `results.jsonl`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkRecord {
    /// Decimal work ID. A string on the wire; parsed on submission.
    pub id: String,
    pub title: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub chapters: Vec<serde_json::Value>,
}

/// The durable ground truth (three append-only logs) plus the in-memory
/// membership sets rebuilt from them on startup. `assigned` is deliberately
/// volatile: a restart returns all in-flight work to the pool.
pub struct StateStore {
    public_log: DurableLog,
    private_log: DurableLog,
    results_log: DurableLog,
    pub completed: RangeSet,
    pub private: RangeSet,
    pub assigned: RangeSet,
}

impl StateStore {
    /// Open the logs under the output directory (creating it if needed) and
    /// rebuild the membership sets.
    pub fn open(config: &CoordinatorConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.output)
            .with_context(|| format!("creating output directory {}", config.output.display()))?;
        let completed = load_id_log(&config.public_file())?;
        let private = load_id_log(&config.private_file())?;
        tracing::info!(
            "Recovered {} completed and {} private works",
            completed.len(),
            private.len()
        );
        Ok(Self {
            public_log: DurableLog::new(config.public_file()),
            private_log: DurableLog::new(config.private_file()),
            results_log: DurableLog::new(config.results_file()),
            completed,
            private,
            assigned: RangeSet::new(),
        })
    }

    /// Durably record a completed work. The JSON payload lands in
    /// `results.jsonl` strictly before the membership marker lands in
    /// `public.txt`: a crash in between leaves at worst a dangling payload
    /// that a re-scrape duplicates harmlessly, never a marker without its
    /// payload. A duplicate completion appends a second payload but skips
    /// the marker.
    pub fn commit_completed(&mut self, id: u64, record: &WorkRecord) -> anyhow::Result<()> {
        let line = serde_json::to_string(record)?;
        self.results_log.append(&line)?;
        if !self.completed.contains(id) {
            self.public_log.append(&id.to_string())?;
            self.completed.add(id);
            self.assigned.discard(id);
        }
        Ok(())
    }

    /// Durably record an upstream "not available" verdict for `id`.
    pub fn commit_private(&mut self, id: u64) -> anyhow::Result<()> {
        if !self.private.contains(id) {
            self.private_log.append(&id.to_string())?;
            self.private.add(id);
            self.assigned.discard(id);
        }
        Ok(())
    }

    pub fn results_log_mut(&mut self) -> &mut DurableLog {
        &mut self.results_log
    }

    pub fn results_file_size(&self) -> u64 {
        self.results_log.size()
    }
}

/// Rebuild a membership set from an ID-per-line log. Unparsable lines (torn
/// writes from a crash mid-append) are skipped without side effect.
fn load_id_log(path: &Path) -> anyhow::Result<RangeSet> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RangeSet::new()),
        Err(e) => return Err(e).with_context(|| format!("opening {}", path.display())),
    };
    let mut set = RangeSet::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<u64>() {
            Ok(id) => set.add(id),
            Err(e) => tracing::debug!("Skipping unparsable line {line:?}: {e}"),
        }
    }
    Ok(set)
}
