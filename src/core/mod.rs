//! Core dashboard settings

pub mod config;

pub use config::{ConfigError, CpuSourceKind, DashboardConfig};
