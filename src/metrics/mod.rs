//! Metric providers sampled by the live monitor

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod traits;

pub use cpu::{busy_percent, CpuClock, CpuProvider, CpuTimes};
pub use disk::{collect_disks, DiskProvider, DiskUsage};
pub use memory::{MemoryProvider, MemorySource, MemoryTotals, SystemMemory};
pub use traits::{MetricKind, MetricProvider, MetricSample, ProviderError, ProviderResult};
