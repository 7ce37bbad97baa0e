use std::{
    fs::{
        File,
        OpenOptions,
    },
    io::Write,
    path::{
        Path,
        PathBuf,
    },
};

use anyhow::Context;

/// An append-only line log. A record counts as committed only once its bytes
/// and trailing newline are fsync'd; callers must not update in-memory
/// caches before `append` returns `Ok`.
///
/// The file handle is opened lazily and can be dropped with [`invalidate`],
/// so a rotation that renames the file out from under us is picked up by the
/// next append.
///
/// [`invalidate`]: DurableLog::invalidate
pub struct DurableLog {
    path: PathBuf,
    file: Option<File>,
}

impl DurableLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path, file: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record: write the line, then fsync. On error the record is
    /// uncommitted (a torn line may be sitting in the file; recovery skips
    /// it) and the handle is dropped so the next append starts from a fresh
    /// open.
    pub fn append(&mut self, record: &str) -> anyhow::Result<()> {
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => {
                let file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(&self.path)
                    .with_context(|| format!("opening {}", self.path.display()))?;
                self.file.insert(file)
            },
        };
        let mut line = Vec::with_capacity(record.len() + 1);
        line.extend_from_slice(record.as_bytes());
        line.push(b'\n');
        let written = file.write_all(&line).and_then(|()| file.sync_all());
        if let Err(e) = written {
            self.file = None;
            return Err(e).with_context(|| format!("appending to {}", self.path.display()));
        }
        Ok(())
    }

    /// Drop the open handle so the next append reopens the path.
    pub fn invalidate(&mut self) {
        self.file = None;
    }

    /// Current size in bytes; 0 if the file does not exist yet.
    pub fn size(&self) -> u64 {
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}
