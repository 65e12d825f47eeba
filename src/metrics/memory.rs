//! Physical memory provider
//!
//! Samples absolute totals, so no warm-up or previous reading is needed.

use sysinfo::System;

use super::traits::{MetricKind, MetricProvider, MetricSample, ProviderResult};

/// Physical memory counts in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryTotals {
    pub total: u64,
    pub available: u64,
}

/// Where memory totals come from.
pub trait MemorySource {
    fn read(&mut self) -> ProviderResult<MemoryTotals>;
}

/// sysinfo-backed memory source.
pub struct SystemMemory {
    system: System,
}

impl SystemMemory {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource for SystemMemory {
    fn read(&mut self) -> ProviderResult<MemoryTotals> {
        self.system.refresh_memory();
        Ok(MemoryTotals {
            total: self.system.total_memory(),
            available: self.system.available_memory(),
        })
    }
}

/// Physical memory usage provider.
pub struct MemoryProvider<S = SystemMemory> {
    source: S,
}

impl MemoryProvider<SystemMemory> {
    pub fn new() -> Self {
        Self::with_source(SystemMemory::new())
    }
}

impl Default for MemoryProvider<SystemMemory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MemorySource> MemoryProvider<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }
}

impl<S: MemorySource> MetricProvider for MemoryProvider<S> {
    fn kind(&self) -> MetricKind {
        MetricKind::Memory
    }

    fn label(&self) -> String {
        "Memory".to_string()
    }

    fn sample(&mut self) -> ProviderResult<MetricSample> {
        let totals = self.source.read()?;
        MetricSample::from_totals(totals.total, totals.available)
    }
}
