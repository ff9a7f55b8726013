use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

const LOG_INTERVAL: u64 = 25;

/// Per-item progress display for the export loop.
///
/// Interactive terminals get an indicatif bar; everything else gets
/// periodic structured log lines so Docker/cron output stays readable.
pub struct ExportUI {
    bar: ProgressBar,
    interactive: bool,
}

impl ExportUI {
    pub fn new() -> Self {
        let interactive = std::io::stderr().is_terminal();

        let bar = if interactive {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap()
                    .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            bar.set_message("Processing");
            bar
        } else {
            tracing::info!(
                operation = "ui_init",
                mode = "non_interactive",
                "Running in non-interactive mode - progress bar disabled, using structured logging"
            );
            ProgressBar::hidden()
        };

        Self { bar, interactive }
    }

    pub fn update(&self, processed: usize, total: usize) {
        let (processed, total) = (processed as u64, total as u64);
        if self.interactive {
            if self.bar.length() != Some(total) {
                self.bar.set_length(total);
            }
            self.bar.set_position(processed);
        } else if processed % LOG_INTERVAL == 0 || processed == total {
            tracing::info!(
                operation = "progress",
                current = processed,
                total = total,
                "Export progress update"
            );
        }
    }

    pub fn finish(&self) {
        if self.interactive {
            self.bar.finish_with_message("Done");
        }
    }
}
