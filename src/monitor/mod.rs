//! Live monitoring and text rendering

pub mod dashboard;
pub mod realtime;

pub use dashboard::{disk_report, render_bar, BarStyle, Screen};
pub use realtime::{MonitorOutcome, MonitorReport, MonitorSettings, RealtimeMonitor};
