//! Process listing and termination
//!
//! CPU usage is measured over a short window: processes are refreshed, the
//! window elapses, and the second refresh yields the usage in between.
//! sysinfo reports per-core percentages, so values are divided by the
//! logical core count to stay within 0-100.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, info, warn};

use crate::console::{confirm, LineReader, OutputSink};

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    /// Resident memory in bytes
    pub memory_bytes: u64,
    /// Share of total CPU capacity over the measurement window
    pub cpu_percent: f32,
}

impl ProcessEntry {
    /// Get memory usage in MB
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Error type for process operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// No process matches the PID or name
    NotFound(String),
    /// Refusing to touch init, kthreadd or ourselves
    Protected(u32),
    /// The kill signal could not be delivered
    KillFailed { pid: u32, name: String },
    /// The operator declined the confirmation
    Cancelled,
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::NotFound(target) => write!(f, "Process '{}' not found", target),
            ProcessError::Protected(pid) => write!(f, "Process {} is protected", pid),
            ProcessError::KillFailed { pid, name } => {
                write!(f, "Failed to kill process {} (PID {})", name, pid)
            }
            ProcessError::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for ProcessError {}

/// Keep entries whose name contains `filter` (case-insensitive), sorted by
/// name then PID.
pub fn filter_and_sort(mut entries: Vec<ProcessEntry>, filter: Option<&str>) -> Vec<ProcessEntry> {
    if let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) {
        let needle = filter.to_lowercase();
        entries.retain(|e| e.name.to_lowercase().contains(&needle));
    }
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.pid.cmp(&b.pid))
    });
    entries
}

/// Fixed-width table: name, PID, memory (MB), CPU (%).
pub fn process_table(entries: &[ProcessEntry]) -> Vec<String> {
    let mut lines = Vec::with_capacity(entries.len() + 2);
    lines.push(format!(
        "{:<30} {:>6} {:>12} {:>10}",
        "Process Name", "PID", "Memory (MB)", "CPU (%)"
    ));
    lines.push("-".repeat(61));
    for entry in entries {
        lines.push(format!(
            "{:<30} {:>6} {:>12.2} {:>10.2}",
            truncate(&entry.name, 30),
            entry.pid,
            entry.memory_mb(),
            entry.cpu_percent
        ));
    }
    lines
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    }
}

/// PIDs that are never killed.
pub fn is_pid_protected(pid: u32) -> bool {
    pid <= 2 || pid == std::process::id()
}

/// sysinfo-backed process manager
pub struct ProcessManager {
    system: System,
    cores: usize,
}

impl ProcessManager {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);
        Self {
            system,
            cores: num_cpus::get().max(1),
        }
    }

    /// Measure every process over `window` and return the filtered, sorted table.
    pub async fn snapshot(&mut self, window: Duration, filter: Option<&str>) -> Vec<ProcessEntry> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        tokio::time::sleep(window).await;
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        let entries: Vec<ProcessEntry> = self
            .system
            .processes()
            .values()
            .map(|p| ProcessEntry {
                pid: p.pid().as_u32(),
                name: p.name().to_string_lossy().to_string(),
                memory_bytes: p.memory(),
                cpu_percent: p.cpu_usage() / self.cores as f32,
            })
            .collect();
        debug!("Collected {} processes", entries.len());
        filter_and_sort(entries, filter)
    }

    /// Resolve a PID or an exact (case-insensitive) process name.
    ///
    /// Several processes may share a name; the lowest PID wins.
    pub fn find(&mut self, target: &str) -> Result<(u32, String), ProcessError> {
        let target = target.trim();
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        if let Ok(pid) = target.parse::<u32>() {
            return self
                .system
                .process(Pid::from_u32(pid))
                .map(|p| (pid, p.name().to_string_lossy().to_string()))
                .ok_or_else(|| ProcessError::NotFound(target.to_string()));
        }

        let wanted = target.to_lowercase();
        self.system
            .processes()
            .values()
            .filter(|p| p.name().to_string_lossy().to_lowercase() == wanted)
            .map(|p| (p.pid().as_u32(), p.name().to_string_lossy().to_string()))
            .min_by_key(|(pid, _)| *pid)
            .ok_or_else(|| ProcessError::NotFound(target.to_string()))
    }

    /// Send the platform's kill signal to `pid`.
    pub fn kill(&mut self, pid: u32) -> Result<(), ProcessError> {
        if is_pid_protected(pid) {
            return Err(ProcessError::Protected(pid));
        }
        let process = self
            .system
            .process(Pid::from_u32(pid))
            .ok_or_else(|| ProcessError::NotFound(pid.to_string()))?;
        let name = process.name().to_string_lossy().to_string();
        if process.kill() {
            info!("Killed process {} (PID {})", name, pid);
            Ok(())
        } else {
            warn!("Kill signal to {} (PID {}) was not delivered", name, pid);
            Err(ProcessError::KillFailed { pid, name })
        }
    }

    /// Resolve `target`, ask for confirmation unless `assume_yes`, then kill.
    pub fn kill_interactive(
        &mut self,
        target: &str,
        assume_yes: bool,
        out: &mut dyn OutputSink,
        input: &mut dyn LineReader,
    ) -> Result<u32, Box<dyn std::error::Error>> {
        let (pid, name) = self.find(target)?;
        if is_pid_protected(pid) {
            return Err(ProcessError::Protected(pid).into());
        }
        let question = format!("Are you sure you want to kill process {} (PID {})?", name, pid);
        if !assume_yes && !confirm(out, input, &question)? {
            return Err(ProcessError::Cancelled.into());
        }
        self.kill(pid)?;
        Ok(pid)
    }
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::CaptureSink;

    fn entry(pid: u32, name: &str) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: name.to_string(),
            memory_bytes: 3 * 1024 * 1024,
            cpu_percent: 1.5,
        }
    }

    #[test]
    fn test_filter_and_sort() {
        let entries = vec![entry(30, "sshd"), entry(10, "Bash"), entry(20, "bash"), entry(5, "zsh")];

        let all = filter_and_sort(entries.clone(), None);
        let names: Vec<_> = all.iter().map(|e| (e.name.as_str(), e.pid)).collect();
        assert_eq!(names, vec![("Bash", 10), ("bash", 20), ("sshd", 30), ("zsh", 5)]);

        let filtered = filter_and_sort(entries.clone(), Some("BAS"));
        assert_eq!(filtered.len(), 2);

        let blank = filter_and_sort(entries, Some("  "));
        assert_eq!(blank.len(), 4);
    }

    #[test]
    fn test_process_table_layout() {
        let lines = process_table(&[entry(42, "cargo")]);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Process Name"));
        assert_eq!(
            lines[2],
            format!("{:<30} {:>6} {:>12} {:>10}", "cargo", 42, "3.00", "1.50")
        );
    }

    #[test]
    fn test_truncate_long_names() {
        let long = "a".repeat(40);
        let lines = process_table(&[entry(1, &long)]);
        assert!(lines[2].starts_with(&format!("{}...", "a".repeat(27))));
    }

    #[test]
    fn test_protected_pids() {
        assert!(is_pid_protected(1));
        assert!(is_pid_protected(std::process::id()));
        assert!(!is_pid_protected(999_999));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ProcessError::NotFound("nginx".into()).to_string(),
            "Process 'nginx' not found"
        );
        assert_eq!(ProcessError::Protected(1).to_string(), "Process 1 is protected");
    }

    #[test]
    fn test_find_own_process_by_pid() {
        let mut manager = ProcessManager::new();
        let pid = std::process::id();
        let (found, name) = manager.find(&pid.to_string()).unwrap();
        assert_eq!(found, pid);
        assert!(!name.is_empty());
    }

    #[test]
    fn test_find_unknown_name() {
        let mut manager = ProcessManager::new();
        assert_eq!(
            manager.find("no-such-process-xyz"),
            Err(ProcessError::NotFound("no-such-process-xyz".into()))
        );
    }

    #[test]
    fn test_kill_refuses_self() {
        let mut manager = ProcessManager::new();
        let mut out = CaptureSink::new();
        let mut input: &[u8] = b"y\n";
        let err = manager
            .kill_interactive(&std::process::id().to_string(), false, &mut out, &mut input)
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Process {} is protected", std::process::id()));
        assert!(out.lines().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_kill_child_after_confirmation() {
        let mut child = std::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("spawn sleep");
        let pid = child.id();

        let mut manager = ProcessManager::new();
        let mut out = CaptureSink::new();

        let mut declined: &[u8] = b"n\n";
        let err = manager
            .kill_interactive(&pid.to_string(), false, &mut out, &mut declined)
            .unwrap_err();
        assert_eq!(err.to_string(), "Operation cancelled");

        let mut accepted: &[u8] = b"Y\n";
        let killed = manager
            .kill_interactive(&pid.to_string(), false, &mut out, &mut accepted)
            .unwrap();
        assert_eq!(killed, pid);
        assert!(!child.wait().unwrap().success());
    }

    #[tokio::test]
    async fn test_snapshot_includes_self() {
        let mut manager = ProcessManager::new();
        let entries = manager.snapshot(Duration::from_millis(200), None).await;
        let me = std::process::id();
        let own = entries.iter().find(|e| e.pid == me).expect("own process listed");
        assert!(own.memory_bytes > 0);
        assert!(entries.windows(2).all(|w| w[0].name.to_lowercase() <= w[1].name.to_lowercase()));
    }
}
