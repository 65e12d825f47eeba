//! Metric provider abstraction
//!
//! Every live screen samples exactly one metric through this trait:
//!
//! ```text
//! +------------------+
//! |  MetricProvider  |  <- sample() -> MetricSample
//! +------------------+
//!    |      |      |
//! +--v-+ +--v--+ +-v--+
//! | Cpu| | Mem | |Disk|
//! +----+ +-----+ +----+
//! ```
//!
//! Providers report failures as a [`ProviderError`] value instead of
//! panicking, so the monitor loop can print the message once and return.

use chrono::{DateTime, Local};
use std::fmt;
use std::io;

// ============================================================================
// Error Types
// ============================================================================

/// Error returned when a provider cannot produce a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The metric source could not be read
    Unavailable(String),
    /// The metric source exists but access was refused
    PermissionDenied(String),
    /// The source returned values that cannot form a percentage
    InvalidReading(String),
    /// The requested resource (mount point, counter) does not exist
    NotFound(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable(msg) => write!(f, "Metric unavailable: {}", msg),
            ProviderError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            ProviderError::InvalidReading(msg) => write!(f, "Invalid reading: {}", msg),
            ProviderError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<io::Error> for ProviderError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ProviderError::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => ProviderError::PermissionDenied(err.to_string()),
            _ => ProviderError::Unavailable(err.to_string()),
        }
    }
}

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

// ============================================================================
// Sample Types
// ============================================================================

/// What a provider measures. Selects the renderer used by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Processor utilisation
    Cpu,
    /// Physical memory
    Memory,
    /// Space on one mounted filesystem
    Disk,
}

/// One reading of a metric.
///
/// Byte-based providers fill `used`, `total` and `free` in bytes. The CPU
/// provider fills them with busy and capacity milliseconds when it computes
/// the delta itself, and leaves them empty when the OS hands back a
/// ready-made percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Utilisation in percent, nominally 0-100
    pub percent: f64,
    /// Used amount
    pub used: Option<u64>,
    /// Total amount
    pub total: Option<u64>,
    /// Free amount
    pub free: Option<u64>,
    /// When the sample was taken
    pub taken_at: DateTime<Local>,
}

impl MetricSample {
    /// A sample that only carries a percentage.
    pub fn percent(percent: f64) -> Self {
        Self {
            percent,
            used: None,
            total: None,
            free: None,
            taken_at: Local::now(),
        }
    }

    /// Build a sample from absolute `total` and `available` counts.
    ///
    /// Fails instead of dividing by zero when `total` is zero.
    pub fn from_totals(total: u64, available: u64) -> ProviderResult<Self> {
        if total == 0 {
            return Err(ProviderError::InvalidReading(
                "total reported as zero".to_string(),
            ));
        }
        let free = available.min(total);
        let used = total - free;
        Ok(Self {
            percent: used as f64 / total as f64 * 100.0,
            used: Some(used),
            total: Some(total),
            free: Some(free),
            taken_at: Local::now(),
        })
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// A source of one numeric system metric.
pub trait MetricProvider {
    /// Which metric this provider reports.
    fn kind(&self) -> MetricKind;

    /// Short label used in screen headers, e.g. "CPU" or "/home".
    fn label(&self) -> String;

    /// Whether the first reading is meaningless and must be discarded.
    fn needs_warm_up(&self) -> bool {
        false
    }

    /// Take the discarded first reading.
    fn warm_up(&mut self) -> ProviderResult<()> {
        Ok(())
    }

    /// Take one sample.
    fn sample(&mut self) -> ProviderResult<MetricSample>;
}

impl<P: MetricProvider + ?Sized> MetricProvider for Box<P> {
    fn kind(&self) -> MetricKind {
        (**self).kind()
    }

    fn label(&self) -> String {
        (**self).label()
    }

    fn needs_warm_up(&self) -> bool {
        (**self).needs_warm_up()
    }

    fn warm_up(&mut self) -> ProviderResult<()> {
        (**self).warm_up()
    }

    fn sample(&mut self) -> ProviderResult<MetricSample> {
        (**self).sample()
    }
}
