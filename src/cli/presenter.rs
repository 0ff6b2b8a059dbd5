//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Width of the rendered volume meter
const METER_SLOTS: usize = 10;

/// Presenter for CLI output formatting
pub struct Presenter {
    meter: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { meter: None }
    }

    /// Start the recording meter: elapsed seconds against the limit plus a
    /// live volume bar in the message slot.
    pub fn start_meter(&mut self, limit_secs: u64) {
        let bar = ProgressBar::new(limit_secs);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}s/{len}s {msg}")
                .unwrap(),
        );
        bar.set_message(Self::volume_bar(0.0));
        self.meter = Some(bar);
    }

    /// Update the elapsed position
    pub fn update_elapsed(&self, secs: u64) {
        if let Some(ref meter) = self.meter {
            meter.set_position(secs);
        }
    }

    /// Update the volume display
    pub fn update_volume(&self, level: f32) {
        if let Some(ref meter) = self.meter {
            meter.set_message(Self::volume_bar(level));
        }
    }

    /// Stop and clear the recording meter
    pub fn finish_meter(&mut self) {
        if let Some(meter) = self.meter.take() {
            meter.finish_and_clear();
        }
    }

    /// Render a [0,1] level as a fixed-width block meter
    fn volume_bar(level: f32) -> String {
        let filled = ((level.clamp(0.0, 1.0) * METER_SLOTS as f32).round() as usize).min(METER_SLOTS);
        let mut bar = String::with_capacity(METER_SLOTS);
        for slot in 0..METER_SLOTS {
            bar.push(if slot < filled { '█' } else { '░' });
        }
        bar
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (the final URL list)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
