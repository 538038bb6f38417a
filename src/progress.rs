use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::constants::BYTES_PER_MB;

/// Byte-level progress bar for a generation run
pub struct GenerationProgress {
    pub progress_bar: ProgressBar,
}

impl GenerationProgress {
    /// Create a bar for `total_bytes`; a hidden bar when `visible` is false
    pub fn new(total_bytes: u64, visible: bool) -> Self {
        let pb = ProgressBar::new(total_bytes);
        if !visible {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        let style = ProgressStyle::default_bar()
            .template(
                "Generating: {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, ETA: {eta}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ");
        pb.set_style(style);

        Self { progress_bar: pb }
    }

    /// Update with the running total of bytes written
    pub fn update(&self, bytes_written: u64) {
        self.progress_bar.set_position(bytes_written);
    }

    /// Finish the bar with a throughput summary
    pub fn finish(&self, total_bytes: u64, duration: Duration) {
        let mb = total_bytes as f64 / BYTES_PER_MB as f64;
        let secs = duration.as_secs_f64();
        let throughput_mbps = if secs > 0.0 { mb / secs } else { 0.0 };

        self.progress_bar.finish_with_message(format!(
            "Generation complete! {:.2} MB in {:.2}s ({:.2} MB/s)",
            mb, secs, throughput_mbps
        ));
    }

    /// Leave the bar where it stopped, after a failed or cancelled run
    pub fn abandon(&self) {
        self.progress_bar.abandon();
    }
}
