//! Platform helpers shared by every screen
//!
//! ```text
//! src/platform/
//! +-- mod.rs           <- This file (byte formatting, platform detection)
//! +-- linux/           <- /proc readers (cfg(linux))
//! ```

/// Linux-specific counters.
#[cfg(target_os = "linux")]
pub mod linux;

// ============================================================================
// Platform Detection Utilities
// ============================================================================

/// Returns the current platform name
pub fn platform_name() -> &'static str {
    std::env::consts::OS
}

/// Whether the raw `/proc/stat` CPU clock can be used here.
pub fn has_proc_stat() -> bool {
    cfg!(target_os = "linux")
}

// ============================================================================
// Cross-Platform Utilities
// ============================================================================

/// Format bytes into a human-readable string.
///
/// Picks the largest binary unit that keeps the value below 1024 and prints
/// two decimals; plain bytes are printed as a whole number.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Parse a human-readable byte string (e.g., "1.5GB") into bytes.
pub fn parse_bytes(s: &str) -> Option<u64> {
    let s = s.trim().to_uppercase();

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("TB") {
        (n, 1024u64 * 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("GB") {
        (n, 1024u64 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024u64 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024u64)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1u64)
    } else {
        return s.parse().ok();
    };

    let value = num_str.trim().parse::<f64>().ok()?;
    if value < 0.0 || !value.is_finite() {
        return None;
    }
    Some((value * multiplier as f64) as u64)
}
