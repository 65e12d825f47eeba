//! sysdash - console system dashboard
//!
//! Each subcommand opens one screen and returns when it is done. Live
//! monitors stop on `q`, `Esc` or `Ctrl+C`.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sysdash::apps::{
    process_table, search, search_table, tree_lines, ProcessError, ProcessManager, SearchOptions,
    WildcardMask,
};
use sysdash::console::{KeyboardInput, TerminalSink};
use sysdash::core::{CpuSourceKind, DashboardConfig};
use sysdash::metrics::{collect_disks, CpuProvider, DiskProvider, MemoryProvider, MetricProvider};
use sysdash::monitor::{disk_report, BarStyle, MonitorOutcome, MonitorSettings, RealtimeMonitor};
use sysdash::platform::parse_bytes;

#[derive(Parser)]
#[command(name = "sysdash")]
#[command(about = "Console dashboard for CPU, memory, disks, processes and files", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/sysdash/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Stop live monitors after this many samples
    #[arg(long, global = true, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    samples: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Live CPU usage bar
    Cpu,

    /// Live memory usage page
    Memory,

    /// Disk overview, or a live monitor for one mount point
    Disk {
        /// Mount point to watch live
        #[arg(short, long)]
        watch: Option<PathBuf>,
    },

    /// List running processes
    Processes {
        /// Only show processes whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Kill a process by PID or name
    Kill {
        /// PID or exact process name
        target: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Search for files under a directory
    Search {
        /// Directory to search
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Wildcard file mask, e.g. *.log
        #[arg(short, long, default_value = "*")]
        mask: String,

        /// Minimum file size, e.g. 10KB
        #[arg(long)]
        min_size: Option<String>,

        /// Maximum file size, e.g. 1.5GB
        #[arg(long)]
        max_size: Option<String>,
    },

    /// Show a directory tree
    Tree {
        /// Root directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Maximum depth to expand
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Show configuration
    Config {
        /// Write the default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("SYSDASH_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.clone().or_else(DashboardConfig::default_path);
    let config = DashboardConfig::load_or_default(config_path.as_deref())?;
    debug!("Using config: {:?}", config);

    match cli.command {
        Commands::Cpu => {
            let provider = match config.cpu_source {
                CpuSourceKind::Counter => CpuProvider::counter(),
                CpuSourceKind::ProcStat => CpuProvider::proc_stat()?,
            };
            run_monitor(provider, &config, cli.samples).await?;
        }

        Commands::Memory => {
            run_monitor(MemoryProvider::new(), &config, cli.samples).await?;
        }

        Commands::Disk { watch: Some(mount) } => {
            run_monitor(DiskProvider::new(mount), &config, cli.samples).await?;
        }

        Commands::Disk { watch: None } => {
            let style = bar_style(&config);
            for line in disk_report(&collect_disks(), &style, config.disk_warning_percent) {
                println!("{}", line);
            }
        }

        Commands::Processes { filter, json } => {
            let mut manager = ProcessManager::new();
            let entries = manager
                .snapshot(config.process_window(), filter.as_deref())
                .await;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for line in process_table(&entries) {
                    println!("{}", line);
                }
                println!();
                println!("Total processes: {}", entries.len());
            }
        }

        Commands::Kill { target, yes } => {
            let mut manager = ProcessManager::new();
            let mut out = TerminalSink::stdout();
            let mut stdin = io::stdin().lock();
            match manager.kill_interactive(&target, yes, &mut out, &mut stdin) {
                Ok(pid) => println!("Process {} terminated.", pid),
                Err(e) if e.downcast_ref::<ProcessError>() == Some(&ProcessError::Cancelled) => {
                    println!("{}", e);
                }
                Err(e) => return Err(e),
            }
        }

        Commands::Search {
            dir,
            mask,
            min_size,
            max_size,
        } => {
            let options = SearchOptions {
                mask: WildcardMask::new(&mask)?,
                min_size: size_arg(min_size.as_deref())?,
                max_size: size_arg(max_size.as_deref())?,
            };
            println!("Searching {} for {}...", dir.display(), mask);
            let results = search(&dir, &options)?;
            for line in search_table(&results) {
                println!("{}", line);
            }
        }

        Commands::Tree { dir, depth } => {
            for line in tree_lines(&dir, depth)? {
                println!("{}", line);
            }
        }

        Commands::Config { init } => {
            if init {
                let path = config_path
                    .as_deref()
                    .ok_or("No config directory on this platform")?;
                init_config(path, &config)?;
            }
            match &config_path {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("Config file: (none)"),
            }
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Run one live monitor on the terminal until it stops.
async fn run_monitor<P: MetricProvider>(
    provider: P,
    config: &DashboardConfig,
    samples: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let mut settings = MonitorSettings::from(config);
    settings.max_samples = samples;

    let mut out = TerminalSink::stdout();
    let mut input = KeyboardInput::new(config.cancel_key)?;
    let mut monitor = RealtimeMonitor::new(provider, settings);
    let report = monitor.run(&mut out, &mut input).await?;

    match report.outcome {
        MonitorOutcome::Failed(e) => info!("Monitor ended with error: {}", e),
        outcome => info!("Monitor ended: {:?} after {} samples", outcome, report.samples),
    }
    Ok(())
}

fn bar_style(config: &DashboardConfig) -> BarStyle {
    BarStyle {
        width: config.bar_width,
        filled: config.filled_char,
        empty: config.empty_char,
    }
}

fn size_arg(value: Option<&str>) -> Result<Option<u64>, String> {
    value
        .map(|v| parse_bytes(v).ok_or_else(|| format!("Invalid size: {}", v)))
        .transpose()
}

fn init_config(path: &Path, config: &DashboardConfig) -> Result<(), Box<dyn Error>> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
    } else {
        config.save(path)?;
        println!("Wrote default config to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_limit_must_be_positive() {
        assert!(Cli::try_parse_from(["sysdash", "--samples", "0", "cpu"]).is_err());
        let cli = Cli::try_parse_from(["sysdash", "memory", "--samples", "3"]).unwrap();
        assert_eq!(cli.samples, Some(3));
    }
}
