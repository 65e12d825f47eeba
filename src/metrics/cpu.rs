//! CPU utilisation provider
//!
//! Two sources are supported:
//! - **Counter**: sysinfo's global CPU usage, already rate-computed by the OS
//!   layer. Needs one refresh before the first meaningful reading.
//! - **Clock**: a raw cumulative busy-time reading (e.g. `/proc/stat`) turned
//!   into a percentage from the delta between two reads.

use std::time::Duration;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::debug;

use super::traits::{MetricKind, MetricProvider, MetricSample, ProviderError, ProviderResult};

/// Cumulative CPU time observed at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    /// Busy time summed over all cores since boot
    pub busy: Duration,
    /// Monotonic wall-clock reading taken together with `busy`
    pub wall: Duration,
}

/// A raw busy-time counter.
pub trait CpuClock {
    fn read(&mut self) -> ProviderResult<CpuTimes>;
}

/// Utilisation over one interval: `busy delta / elapsed * 100 / cores`,
/// clamped to `[0, 100]`.
///
/// A zero interval or zero core count yields 0.
pub fn busy_percent(
    previous_busy: Duration,
    current_busy: Duration,
    elapsed: Duration,
    cores: usize,
) -> f64 {
    if elapsed.is_zero() || cores == 0 {
        return 0.0;
    }
    let busy = current_busy.saturating_sub(previous_busy);
    let percent = busy.as_secs_f64() / elapsed.as_secs_f64() * 100.0 / cores as f64;
    percent.clamp(0.0, 100.0)
}

enum CpuSource {
    Counter(System),
    Clock {
        clock: Box<dyn CpuClock>,
        cores: usize,
        previous: Option<CpuTimes>,
    },
}

/// Global CPU usage provider.
pub struct CpuProvider {
    source: CpuSource,
}

impl CpuProvider {
    /// Provider backed by sysinfo's rate-computed counter.
    pub fn counter() -> Self {
        Self {
            source: CpuSource::Counter(System::new_with_specifics(
                RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
            )),
        }
    }

    /// Provider that computes utilisation from a raw busy-time clock.
    pub fn with_clock(clock: impl CpuClock + 'static, cores: usize) -> Self {
        Self {
            source: CpuSource::Clock {
                clock: Box::new(clock),
                cores,
                previous: None,
            },
        }
    }

    /// Provider reading `/proc/stat`, with the logical core count from `num_cpus`.
    #[cfg(target_os = "linux")]
    pub fn proc_stat() -> ProviderResult<Self> {
        let clock = crate::platform::linux::ProcStatClock::new()?;
        Ok(Self::with_clock(clock, num_cpus::get()))
    }

    #[cfg(not(target_os = "linux"))]
    pub fn proc_stat() -> ProviderResult<Self> {
        Err(ProviderError::Unavailable(
            "/proc/stat is only available on Linux".to_string(),
        ))
    }
}

impl MetricProvider for CpuProvider {
    fn kind(&self) -> MetricKind {
        MetricKind::Cpu
    }

    fn label(&self) -> String {
        "CPU".to_string()
    }

    fn needs_warm_up(&self) -> bool {
        true
    }

    fn warm_up(&mut self) -> ProviderResult<()> {
        match &mut self.source {
            CpuSource::Counter(system) => {
                system.refresh_cpu_usage();
                if system.cpus().is_empty() {
                    return Err(ProviderError::Unavailable("no CPUs reported".to_string()));
                }
            }
            CpuSource::Clock { clock, previous, .. } => {
                *previous = Some(clock.read()?);
            }
        }
        debug!("CPU counter warmed up");
        Ok(())
    }

    fn sample(&mut self) -> ProviderResult<MetricSample> {
        match &mut self.source {
            CpuSource::Counter(system) => {
                system.refresh_cpu_usage();
                if system.cpus().is_empty() {
                    return Err(ProviderError::Unavailable("no CPUs reported".to_string()));
                }
                let usage = system.global_cpu_usage() as f64;
                Ok(MetricSample::percent(usage.clamp(0.0, 100.0)))
            }
            CpuSource::Clock {
                clock,
                cores,
                previous,
            } => {
                let current = clock.read()?;
                let before = previous.replace(current).ok_or_else(|| {
                    ProviderError::InvalidReading("CPU clock read before warm-up".to_string())
                })?;

                let elapsed = current.wall.saturating_sub(before.wall);
                let percent = busy_percent(before.busy, current.busy, elapsed, *cores);

                let capacity_ms = elapsed.as_millis() as u64 * *cores as u64;
                let busy_ms = (current.busy.saturating_sub(before.busy).as_millis() as u64)
                    .min(capacity_ms);

                let mut sample = MetricSample::percent(percent);
                sample.used = Some(busy_ms);
                sample.total = Some(capacity_ms);
                sample.free = Some(capacity_ms - busy_ms);
                Ok(sample)
            }
        }
    }
}
