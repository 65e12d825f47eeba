//! Simple text-based dashboard rendering
//!
//! Everything here is a pure function of its inputs; nothing writes to the
//! terminal.

use crate::metrics::{DiskUsage, MetricKind, MetricSample};
use crate::platform::format_bytes;

/// Bar geometry and glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarStyle {
    pub width: usize,
    pub filled: char,
    pub empty: char,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            width: 50,
            filled: '█',
            empty: '░',
        }
    }
}

/// Number of filled cells for `percent` on a bar of `width` cells.
///
/// `floor(percent / 100 * width)`, clamped to `[0, width]`; NaN counts as 0.
pub fn filled_cells(percent: f64, width: usize) -> usize {
    let cells = (percent / 100.0 * width as f64).floor();
    if cells.is_nan() || cells <= 0.0 {
        0
    } else if cells >= width as f64 {
        width
    } else {
        cells as usize
    }
}

/// Render the bar body without brackets or readout.
pub fn render_bar(percent: f64, style: &BarStyle) -> String {
    let filled = filled_cells(percent, style.width);
    let mut bar = String::with_capacity(style.width * 3);
    bar.extend(std::iter::repeat(style.filled).take(filled));
    bar.extend(std::iter::repeat(style.empty).take(style.width - filled));
    bar
}

/// What the monitor should draw for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Overwrite the current line in place
    Line(String),
    /// Clear the screen and draw these lines
    Page(Vec<String>),
}

/// CPU readout: `CPU Usage:  25.0% [██░░…]`
pub fn cpu_line(sample: &MetricSample, style: &BarStyle) -> String {
    format!(
        "CPU Usage: {:5.1}% [{}]",
        sample.percent,
        render_bar(sample.percent, style)
    )
}

/// Full-screen page for a byte-based metric (memory or one disk).
pub fn usage_page(title: &str, hint: &str, sample: &MetricSample, style: &BarStyle) -> Vec<String> {
    let mut lines = vec![
        format!("=== {} ===", title),
        hint.to_string(),
        String::new(),
        format!(
            "Usage: [{}] {:.2}%",
            render_bar(sample.percent, style),
            sample.percent
        ),
        String::new(),
    ];
    if let (Some(total), Some(used), Some(free)) = (sample.total, sample.used, sample.free) {
        lines.push(format!("Total:     {}", format_bytes(total)));
        lines.push(format!("Used:      {}", format_bytes(used)));
        lines.push(format!("Available: {}", format_bytes(free)));
    }
    lines.push(format!("Updated:   {}", sample.taken_at.format("%H:%M:%S")));
    lines
}

/// Pick the layout for a sample of `kind`.
pub fn render_sample(
    kind: MetricKind,
    label: &str,
    sample: &MetricSample,
    style: &BarStyle,
    cancel_key: char,
) -> Screen {
    let hint = format!("Press {} to stop", cancel_key.to_ascii_uppercase());
    match kind {
        MetricKind::Cpu => Screen::Line(cpu_line(sample, style)),
        MetricKind::Memory => Screen::Page(usage_page("Memory Monitor", &hint, sample, style)),
        MetricKind::Disk => Screen::Page(usage_page(
            &format!("Disk Monitor: {}", label),
            &hint,
            sample,
            style,
        )),
    }
}

/// One-shot overview of every disk, with a warning under `warning_percent` free.
pub fn disk_report(disks: &[DiskUsage], style: &BarStyle, warning_percent: f64) -> Vec<String> {
    let mut lines = vec!["=== Disk Monitor ===".to_string(), String::new()];
    if disks.is_empty() {
        lines.push("No drives found.".to_string());
        return lines;
    }

    for disk in disks {
        if disk.total == 0 {
            lines.push(format!(
                "Drive {} ({}) is not ready.",
                disk.mount_point.display(),
                disk.name
            ));
            lines.push(String::new());
            continue;
        }

        let used_percent = disk.used_percent();
        lines.push(format!("Drive: {} ({})", disk.mount_point.display(), disk.name));
        lines.push(format!("  Total Size:    {}", format_bytes(disk.total)));
        lines.push(format!(
            "  Used Space:    {} ({:.2}%)",
            format_bytes(disk.used()),
            used_percent
        ));
        lines.push(format!(
            "  Free Space:    {} ({:.2}%)",
            format_bytes(disk.available.min(disk.total)),
            disk.free_percent()
        ));
        lines.push(format!(
            "  Usage: [{}] {:.2}% used",
            render_bar(used_percent, style),
            used_percent
        ));
        if disk.is_low_on_space(warning_percent) {
            lines.push("  WARNING: Free space is critically low!".to_string());
        }
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn style(width: usize) -> BarStyle {
        BarStyle {
            width,
            filled: '#',
            empty: '-',
        }
    }

    #[test]
    fn test_filled_cells_matches_floor() {
        for width in [1usize, 7, 10, 50, 80] {
            for step in 0..=200 {
                let percent = step as f64 * 0.5;
                let filled = filled_cells(percent, width);
                assert_eq!(filled, (percent / 100.0 * width as f64).floor() as usize);

                let bar = render_bar(percent, &style(width));
                let empty = bar.chars().filter(|&c| c == '-').count();
                assert_eq!(bar.chars().filter(|&c| c == '#').count(), filled);
                assert_eq!(filled + empty, width);
            }
        }
    }

    #[test]
    fn test_filled_cells_clamps_out_of_range() {
        assert_eq!(filled_cells(-5.0, 50), 0);
        assert_eq!(filled_cells(-1e9, 50), 0);
        assert_eq!(filled_cells(100.1, 50), 50);
        assert_eq!(filled_cells(250.0, 50), 50);
        assert_eq!(filled_cells(f64::NAN, 50), 0);
        assert_eq!(filled_cells(f64::INFINITY, 50), 50);
        assert_eq!(render_bar(150.0, &style(4)), "####");
        assert_eq!(render_bar(-20.0, &style(4)), "----");
    }

    #[test]
    fn test_cpu_line_format() {
        let sample = MetricSample::percent(25.0);
        assert_eq!(
            cpu_line(&sample, &style(4)),
            "CPU Usage:  25.0% [#---]"
        );
        let sample = MetricSample::percent(7.24);
        assert!(cpu_line(&sample, &style(4)).starts_with("CPU Usage:   7.2% "));
    }

    #[test]
    fn test_memory_page_shows_totals() {
        let gib = 1024u64 * 1024 * 1024;
        let sample = MetricSample::from_totals(8 * gib, 2 * gib).unwrap();
        let screen = render_sample(MetricKind::Memory, "Memory", &sample, &style(8), 'q');

        let Screen::Page(lines) = screen else {
            panic!("memory should render a full page");
        };
        assert_eq!(lines[0], "=== Memory Monitor ===");
        assert_eq!(lines[1], "Press Q to stop");
        assert!(lines.contains(&"Usage: [######--] 75.00%".to_string()));
        assert!(lines.contains(&"Total:     8.00 GB".to_string()));
        assert!(lines.contains(&"Used:      6.00 GB".to_string()));
        assert!(lines.contains(&"Available: 2.00 GB".to_string()));
    }

    #[test]
    fn test_disk_page_titled_by_mount() {
        let sample = MetricSample::from_totals(1000, 250).unwrap();
        let screen = render_sample(MetricKind::Disk, "/home", &sample, &style(4), 'x');

        let Screen::Page(lines) = screen else {
            panic!("disk should render a full page");
        };
        assert_eq!(lines[0], "=== Disk Monitor: /home ===");
        assert_eq!(lines[1], "Press X to stop");
        assert!(lines.contains(&"Usage: [###-] 75.00%".to_string()));
        assert!(lines.contains(&"Used:      750 B".to_string()));
        assert!(lines.contains(&"Available: 250 B".to_string()));
    }

    #[test]
    fn test_cpu_renders_as_line() {
        let sample = MetricSample::percent(50.0);
        assert!(matches!(
            render_sample(MetricKind::Cpu, "CPU", &sample, &style(2), 'q'),
            Screen::Line(_)
        ));
    }

    #[test]
    fn test_disk_report_warns_on_low_space() {
        let disks = vec![
            DiskUsage {
                name: "nvme0n1p2".into(),
                mount_point: PathBuf::from("/"),
                total: 1000,
                available: 50,
            },
            DiskUsage {
                name: "sdb1".into(),
                mount_point: PathBuf::from("/data"),
                total: 1000,
                available: 500,
            },
        ];
        let lines = disk_report(&disks, &style(10), 10.0);
        let warnings = lines
            .iter()
            .filter(|l| l.contains("WARNING"))
            .count();
        assert_eq!(warnings, 1);
        assert!(lines.contains(&"  Used Space:    950 B (95.00%)".to_string()));
        assert!(lines.contains(&"  Usage: [#########-] 95.00% used".to_string()));
    }

    #[test]
    fn test_disk_report_empty_and_not_ready() {
        let lines = disk_report(&[], &style(10), 10.0);
        assert!(lines.contains(&"No drives found.".to_string()));

        let disks = vec![DiskUsage {
            name: "cdrom".into(),
            mount_point: PathBuf::from("/media/cd"),
            total: 0,
            available: 0,
        }];
        let lines = disk_report(&disks, &style(10), 10.0);
        assert!(lines[2].ends_with("is not ready."));
    }
}
