//! Disk space: a one-shot overview of every mounted disk, and a live
//! provider for a single mount point.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sysinfo::Disks;
use tracing::debug;

use super::traits::{MetricKind, MetricProvider, MetricSample, ProviderError, ProviderResult};

/// Space usage of one mounted disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub name: String,
    pub mount_point: PathBuf,
    pub total: u64,
    pub available: u64,
}

impl DiskUsage {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.available)
    }

    /// Used space in percent; 0 for a zero-sized disk.
    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used() as f64 * 100.0 / self.total as f64
    }

    /// Free space in percent; 0 for a zero-sized disk.
    pub fn free_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.available.min(self.total) as f64 * 100.0 / self.total as f64
    }

    /// True when free space is below `threshold_percent` of the total.
    pub fn is_low_on_space(&self, threshold_percent: f64) -> bool {
        self.total > 0 && self.free_percent() < threshold_percent
    }
}

/// Snapshot of all mounted disks, sorted by mount point.
pub fn collect_disks() -> Vec<DiskUsage> {
    let disks = Disks::new_with_refreshed_list();
    let mut usage: Vec<DiskUsage> = disks
        .list()
        .iter()
        .map(|disk| DiskUsage {
            name: disk.name().to_string_lossy().to_string(),
            mount_point: disk.mount_point().to_path_buf(),
            total: disk.total_space(),
            available: disk.available_space(),
        })
        .collect();
    usage.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));
    debug!("Found {} disks", usage.len());
    usage
}

/// Live usage of the disk mounted at one path.
pub struct DiskProvider {
    mount_point: PathBuf,
}

impl DiskProvider {
    pub fn new(mount_point: impl AsRef<Path>) -> Self {
        Self {
            mount_point: mount_point.as_ref().to_path_buf(),
        }
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }
}

impl MetricProvider for DiskProvider {
    fn kind(&self) -> MetricKind {
        MetricKind::Disk
    }

    fn label(&self) -> String {
        self.mount_point.display().to_string()
    }

    fn sample(&mut self) -> ProviderResult<MetricSample> {
        let disk = collect_disks()
            .into_iter()
            .find(|d| d.mount_point == self.mount_point)
            .ok_or_else(|| {
                ProviderError::NotFound(format!(
                    "no disk mounted at {}",
                    self.mount_point.display()
                ))
            })?;
        MetricSample::from_totals(disk.total, disk.available)
    }
}
