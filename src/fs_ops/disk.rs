//! Disk usage of the filesystem holding a path.

use std::path::Path;

use crate::errors::FsResult;

/// Sizes in bytes. `used` is `total - free` where `free` counts the space
/// available to the calling user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

pub fn disk_usage(path: impl AsRef<Path>) -> FsResult<DiskUsage> {
    let path = path.as_ref();
    let total = fs2::total_space(path)?;
    let all_free = fs2::free_space(path)?;
    let free = fs2::available_space(path)?;
    Ok(DiskUsage {
        total,
        used: total.saturating_sub(all_free),
        free,
    })
}
