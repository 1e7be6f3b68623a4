use crate::core::{TransferDirection, TransferProgress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Receives the progress of a file transfer.
pub trait ProgressReporter: Send + Sync {
    fn update(&self, progress: &TransferProgress);
    fn finish(&self);
}

/// Indicatif-based progress reporter
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// A byte bar, or a spinner when `total_bytes` is unknown (zero).
    pub fn new(label: &str, total_bytes: u64) -> Self {
        let bar = if total_bytes == 0 {
            let bar = ProgressBar::new_spinner();
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::new(total_bytes)
        };
        Self::styled(bar, label, total_bytes)
    }

    /// A bar that tracks progress without drawing anything.
    pub fn hidden(total_bytes: u64) -> Self {
        let bar = ProgressBar::hidden();
        if total_bytes > 0 {
            bar.set_length(total_bytes);
        }
        Self { bar }
    }

    fn styled(bar: ProgressBar, label: &str, total_bytes: u64) -> Self {
        let template = if total_bytes == 0 {
            format!("{{spinner:.green}} {} {{bytes}} ({{bytes_per_sec}})", label)
        } else {
            format!(
                "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}})",
                label
            )
        };
        let style = ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl ProgressReporter for IndicatifProgress {
    fn update(&self, progress: &TransferProgress) {
        if progress.total_bytes > 0 && self.bar.length() != Some(progress.total_bytes) {
            self.bar.set_length(progress.total_bytes);
        }
        self.bar.set_position(progress.bytes_transferred);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

/// No-op progress reporter for when progress reporting is disabled
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    fn update(&self, _progress: &TransferProgress) {}
    fn finish(&self) {}
}

/// Hands out one reporter per transferred file.
pub struct ProgressFactory {
    enabled: bool,
    multi: MultiProgress,
}

impl ProgressFactory {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            multi: MultiProgress::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn file_transfer(
        &self,
        direction: TransferDirection,
        file_name: &str,
        total_bytes: u64,
    ) -> Box<dyn ProgressReporter> {
        if !self.enabled {
            return Box::new(NoOpProgress);
        }

        let arrow = match direction {
            TransferDirection::Push => "↑",
            TransferDirection::Pull => "↓",
        };
        let progress = IndicatifProgress::new(&format!("{} {}", arrow, file_name), total_bytes);
        self.multi.add(progress.bar.clone());
        Box::new(progress)
    }
}
