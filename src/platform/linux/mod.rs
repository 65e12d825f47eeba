//! Linux Platform Support
//!
//! Reads the aggregate CPU line of `/proc/stat` to provide a raw busy-time
//! clock for [`CpuProvider`](crate::metrics::CpuProvider).

use std::fs;
use std::time::{Duration, Instant};

use crate::metrics::{CpuClock, CpuTimes, ProviderError, ProviderResult};

const PROC_STAT: &str = "/proc/stat";

/// Busy-time clock backed by `/proc/stat`.
pub struct ProcStatClock {
    ms_per_tick: f64,
    origin: Instant,
}

impl ProcStatClock {
    pub fn new() -> ProviderResult<Self> {
        // SAFETY: sysconf has no preconditions.
        let ticks_per_sec = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if ticks_per_sec <= 0 {
            return Err(ProviderError::Unavailable(
                "clock tick rate unknown".to_string(),
            ));
        }
        Ok(Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            origin: Instant::now(),
        })
    }
}

impl CpuClock for ProcStatClock {
    fn read(&mut self) -> ProviderResult<CpuTimes> {
        let content = fs::read_to_string(PROC_STAT)?;
        let busy_ticks = parse_busy_ticks(&content)?;
        Ok(CpuTimes {
            busy: Duration::from_micros((busy_ticks as f64 * self.ms_per_tick * 1000.0) as u64),
            wall: self.origin.elapsed(),
        })
    }
}

/// Sum the busy columns of the aggregate `cpu` line.
///
/// Busy is user + nice + system + irq + softirq + steal; idle and iowait are
/// excluded, guest time is already folded into user.
pub fn parse_busy_ticks(content: &str) -> ProviderResult<u64> {
    let line = content
        .lines()
        .find(|line| line.starts_with("cpu "))
        .ok_or_else(|| ProviderError::InvalidReading("no aggregate cpu line".to_string()))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|field| field.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|e| ProviderError::InvalidReading(format!("bad cpu field: {}", e)))?;

    if fields.len() < 4 {
        return Err(ProviderError::InvalidReading(format!(
            "expected at least 4 cpu fields, got {}",
            fields.len()
        )));
    }

    // user nice system idle iowait irq softirq steal
    let busy: u64 = [0usize, 1, 2, 5, 6, 7]
        .iter()
        .filter_map(|&i| fields.get(i))
        .sum();
    Ok(busy)
}
