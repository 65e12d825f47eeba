//! Real-time metric monitoring
//!
//! One generic loop drives every live screen:
//!
//! ```text
//! Sampling -> Rendering -> WaitingTick -> Sampling
//!    |                         |
//!    v                         v
//!  Failed                  Cancelled
//! ```
//!
//! The tick wait is sliced into short cancel polls, so a key press ends the
//! loop within one poll slice and never triggers another sample.

use std::io;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::dashboard::{render_sample, BarStyle, Screen};
use crate::console::{InputSource, OutputSink};
use crate::core::DashboardConfig;
use crate::metrics::{MetricKind, MetricProvider, MetricSample, ProviderError};

/// Timing and appearance of a live monitor.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub tick: Duration,
    pub cancel_poll: Duration,
    pub style: BarStyle,
    pub cancel_key: char,
    /// Stop after this many rendered samples
    pub max_samples: Option<usize>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            cancel_poll: Duration::from_millis(100),
            style: BarStyle::default(),
            cancel_key: 'q',
            max_samples: None,
        }
    }
}

impl From<&DashboardConfig> for MonitorSettings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            tick: config.tick_interval(),
            cancel_poll: config.cancel_poll(),
            style: BarStyle {
                width: config.bar_width,
                filled: config.filled_char,
                empty: config.empty_char,
            },
            cancel_key: config.cancel_key,
            max_samples: None,
        }
    }
}

/// How a monitor session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorOutcome {
    /// The operator asked to stop
    Cancelled,
    /// The sample limit was reached
    Completed,
    /// The provider failed; the message has already been shown
    Failed(ProviderError),
}

/// Summary returned when the loop exits.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorReport {
    pub outcome: MonitorOutcome,
    /// Samples rendered before exit
    pub samples: usize,
}

enum MonitorState {
    Sampling,
    Rendering(MetricSample),
    WaitingTick,
    Done(MonitorOutcome),
}

/// Live monitor for one provider.
pub struct RealtimeMonitor<P> {
    provider: P,
    settings: MonitorSettings,
}

impl<P: MetricProvider> RealtimeMonitor<P> {
    pub fn new(provider: P, settings: MonitorSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run until cancelled, failed, or the sample limit is hit.
    ///
    /// Provider errors end the loop as [`MonitorOutcome::Failed`]; errors
    /// writing output are returned as `Err`.
    pub async fn run(
        &mut self,
        out: &mut dyn OutputSink,
        input: &mut dyn InputSource,
    ) -> io::Result<MonitorReport> {
        let label = self.provider.label();
        let kind = self.provider.kind();
        info!("Starting {} monitor (tick {:?})", label, self.settings.tick);

        out.clear_screen()?;
        if kind == MetricKind::Cpu {
            out.write_line(&format!(
                "=== {} Monitor (Press {} to quit) ===",
                label,
                self.settings.cancel_key.to_ascii_uppercase()
            ))?;
            out.write_line("")?;
        }
        out.flush()?;

        let mut samples = 0usize;
        let mut state = MonitorState::Sampling;

        if self.limit_reached(0) {
            state = MonitorState::Done(MonitorOutcome::Completed);
        } else if self.provider.needs_warm_up() {
            if let Err(e) = self.provider.warm_up() {
                debug!("Discarding failed {} warm-up: {}", label, e);
            }
            if self.wait_tick(input).await? {
                state = MonitorState::Done(MonitorOutcome::Cancelled);
            }
        }

        let outcome = loop {
            state = match state {
                MonitorState::Sampling => match self.provider.sample() {
                    Ok(sample) => MonitorState::Rendering(sample),
                    Err(e) => {
                        warn!("{} provider failed: {}", label, e);
                        MonitorState::Done(MonitorOutcome::Failed(e))
                    }
                },
                MonitorState::Rendering(sample) => {
                    debug!("{} sample: {:.1}%", label, sample.percent);
                    self.draw(out, &label, &sample)?;
                    samples += 1;
                    if self.limit_reached(samples) {
                        MonitorState::Done(MonitorOutcome::Completed)
                    } else {
                        MonitorState::WaitingTick
                    }
                }
                MonitorState::WaitingTick => {
                    if self.wait_tick(input).await? {
                        MonitorState::Done(MonitorOutcome::Cancelled)
                    } else {
                        MonitorState::Sampling
                    }
                }
                MonitorState::Done(outcome) => break outcome,
            };
        };

        if kind == MetricKind::Cpu {
            // End the line that was redrawn in place.
            out.write_line("")?;
        }
        if let MonitorOutcome::Failed(e) = &outcome {
            out.write_line(&format!("Error reading {}: {}", label, e))?;
        }
        out.write_line(&format!("Exiting {} monitor...", label))?;
        out.flush()?;

        info!("{} monitor stopped after {} samples", label, samples);
        Ok(MonitorReport { outcome, samples })
    }

    fn draw(&self, out: &mut dyn OutputSink, label: &str, sample: &MetricSample) -> io::Result<()> {
        match render_sample(
            self.provider.kind(),
            label,
            sample,
            &self.settings.style,
            self.settings.cancel_key,
        ) {
            Screen::Line(line) => out.redraw_line(&line)?,
            Screen::Page(lines) => {
                out.clear_screen()?;
                for line in &lines {
                    out.write_line(line)?;
                }
            }
        }
        out.flush()
    }

    fn limit_reached(&self, samples: usize) -> bool {
        self.settings.max_samples.is_some_and(|limit| samples >= limit)
    }

    /// Wait one tick, polling for cancellation. Returns true if cancelled.
    async fn wait_tick(&self, input: &mut dyn InputSource) -> io::Result<bool> {
        let deadline = Instant::now() + self.settings.tick;
        loop {
            if input.poll_cancel()? {
                debug!("Cancellation requested");
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.settings.cancel_poll.min(deadline - now)).await;
        }
    }
}
