use std::path::{
    Path,
    PathBuf,
};

use anyhow::Context;
use async_compression::tokio::write::GzipEncoder;
use common::errors::ErrorMetadata;
use tokio::io::AsyncWriteExt;

use crate::{
    knobs::ROTATE_SETTLE_SLEEP,
    manager::WorkManager,
};

pub struct RotationOutcome {
    pub rotated_name: String,
    pub compressed_name: String,
    pub compressed_path: PathBuf,
}

/// Rotate `results.jsonl` out to the first free numbered segment and gzip
/// it. The rename happens under the store mutex, so no append can interleave
/// with it; the settle sleep afterwards is for anything still holding a
/// handle to the old inode.
pub async fn rotate_results(manager: &WorkManager) -> anyhow::Result<RotationOutcome> {
    let (rotated_path, rotated_name) = {
        let mut inner = manager.inner.lock();
        let dir = &manager.config().output;
        let k = next_segment_index(dir);
        let rotated_name = format!("results_{k}.jsonl");
        let rotated_path = dir.join(&rotated_name);
        let results_path = manager.config().results_file();
        std::fs::rename(&results_path, &rotated_path).with_context(|| {
            format!(
                "rotating {} to {}",
                results_path.display(),
                rotated_path.display()
            )
        })?;
        // The next append must open a fresh results.jsonl rather than keep
        // writing into the renamed inode.
        inner.store.results_log_mut().invalidate();
        (rotated_path, rotated_name)
    };

    tokio::time::sleep(*ROTATE_SETTLE_SLEEP).await;

    let compressed_name = format!("{rotated_name}.gz");
    let compressed_path = rotated_path.with_file_name(&compressed_name);
    compress_gzip(&rotated_path, &compressed_path)
        .await
        .with_context(|| format!("compressing {}", rotated_path.display()))?;
    // Hand the archiver an absolute path; it feeds the name to rsync as-is.
    let compressed_path = compressed_path.canonicalize().unwrap_or(compressed_path);
    Ok(RotationOutcome {
        rotated_name,
        compressed_name,
        compressed_path,
    })
}

/// Remove a transferred segment from the output directory. Only bare `.gz`
/// filenames are eligible; path separators or parent references are a client
/// error, not a lookup miss.
pub fn cleanup_segment(manager: &WorkManager, filename: &str) -> anyhow::Result<()> {
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        anyhow::bail!(ErrorMetadata::bad_request(
            "UnsafeFilename",
            format!("{filename:?} does not name a file in the output directory"),
        ));
    }
    if !filename.ends_with(".gz") {
        anyhow::bail!(ErrorMetadata::bad_request(
            "NotCompressedSegment",
            format!("{filename:?} is not a compressed segment"),
        ));
    }
    let path = manager.config().output.join(filename);
    if !path.is_file() {
        anyhow::bail!(ErrorMetadata::not_found(
            "SegmentNotFound",
            format!("{filename:?} does not exist"),
        ));
    }
    std::fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
    tracing::info!("Removed transferred segment {filename}");
    Ok(())
}

fn next_segment_index(dir: &Path) -> u64 {
    let mut k = 0;
    while dir.join(format!("results_{k}.jsonl")).exists() {
        k += 1;
    }
    k
}

async fn compress_gzip(src: &Path, dst: &Path) -> anyhow::Result<()> {
    let mut input = tokio::fs::File::open(src).await?;
    let output = tokio::fs::File::create(dst).await?;
    let mut encoder = GzipEncoder::new(tokio::io::BufWriter::new(output));
    tokio::io::copy(&mut input, &mut encoder).await?;
    encoder.shutdown().await?;
    Ok(())
}
