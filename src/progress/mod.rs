use crate::core::types::{TransferDirection, TransferProgress};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

const TRANSFER_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Receives chunk-completion events during push and pull.
///
/// `update` fires after each chunk has been written locally, not after the
/// device acknowledges it.
pub trait ProgressReporter: Send + Sync {
    fn start(&self, progress: &TransferProgress);
    fn update(&self, progress: &TransferProgress);
    fn finish(&self, progress: &TransferProgress);
}

/// Indicatif-based progress reporter
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(total: u64) -> Self {
        Self::with_template(total, TRANSFER_TEMPLATE)
    }

    /// Create a progress bar with custom template
    pub fn with_template(total: u64, template: &str) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);

        Self { bar }
    }
}

impl ProgressReporter for IndicatifProgress {
    fn start(&self, progress: &TransferProgress) {
        if progress.total_bytes > 0 {
            self.bar.set_length(progress.total_bytes);
        }
        let verb = match progress.direction {
            TransferDirection::Push => "push",
            TransferDirection::Pull => "pull",
        };
        self.bar
            .set_message(format!("{} {}", verb, progress.file_path));
    }

    fn update(&self, progress: &TransferProgress) {
        if progress.total_bytes == 0 {
            self.bar.set_length(progress.bytes_transferred);
        }
        self.bar.set_position(progress.bytes_transferred);
    }

    fn finish(&self, _progress: &TransferProgress) {
        self.bar.finish_with_message("Complete");
    }
}

/// No-op progress reporter for when progress reporting is disabled
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    fn start(&self, _progress: &TransferProgress) {}
    fn update(&self, _progress: &TransferProgress) {}
    fn finish(&self, _progress: &TransferProgress) {}
}

/// Progress reporter factory
pub struct ProgressFactory {
    enabled: bool,
}

impl ProgressFactory {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create a progress reporter for file transfer
    pub fn file_transfer(&self, total_bytes: u64) -> Arc<dyn ProgressReporter> {
        if !self.enabled {
            return Arc::new(NoOpProgress);
        }
        Arc::new(IndicatifProgress::new(total_bytes))
    }
}
