use std::path::Path;

use sysinfo::{
    DiskExt,
    RefreshKind,
    System,
    SystemExt,
};

/// Percentage (0..=100) of the filesystem holding `path` that is in use,
/// mirroring `df`'s Use% column. Returns 0 when the filesystem cannot be
/// resolved; callers treat the gauge as advisory.
pub fn disk_usage_percent(path: &Path) -> u64 {
    let path = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => return 0,
    };
    let system = System::new_with_specifics(RefreshKind::new().with_disks_list());
    // The disk with the longest mount point that prefixes `path` is the one
    // the output directory actually lives on.
    let disk = system
        .disks()
        .iter()
        .filter(|d| path.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len());
    match disk {
        Some(d) if d.total_space() > 0 => {
            let used = d.total_space() - d.available_space();
            used * 100 / d.total_space()
        },
        _ => 0,
    }
}
