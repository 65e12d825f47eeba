//! sysdash - console system dashboard
//!
//! Live CPU, memory and disk monitors plus a handful of one-shot utility
//! screens, all driven from a single command line.
//!
//! ## Layout
//!
//! ```text
//! metrics/   <- MetricProvider trait and the CPU, memory, disk providers
//! monitor/   <- bar rendering and the sample/render/wait loop
//! console/   <- output sink and cancel input (crossterm, in-memory capture)
//! apps/      <- process list/kill, file search, directory tree
//! core/      <- TOML configuration
//! platform/  <- byte formatting, /proc readers
//! ```
//!
//! ## Safety
//!
//! - Kill refuses PID 1, PID 2 and the dashboard's own process
//! - Kill asks for confirmation unless explicitly skipped
//! - Raw terminal mode is restored when the monitor exits

pub mod apps;
pub mod console;
pub mod core;
pub mod metrics;
pub mod monitor;
pub mod platform;

// Re-exports
pub use crate::core::{ConfigError, DashboardConfig};
pub use metrics::{MetricKind, MetricProvider, MetricSample, ProviderError};
pub use monitor::{MonitorOutcome, MonitorSettings, RealtimeMonitor};
pub use platform::format_bytes;
