//! Progress bar for the extracted file.

use indicatif::{ProgressBar, ProgressStyle};
use tar_to_file::ProgressEvent;

/// Longest entry name shown next to the bar
const MAX_NAME_CHARS: usize = 40;

/// Byte progress display for one extraction
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Creates a new progress display
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Reading archive");
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        };

        Self { bar }
    }

    /// Applies a progress event
    pub fn update(&self, event: &ProgressEvent) {
        if event.is_metadata() {
            self.bar.set_length(event.header.size);
            self.bar.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} {wide_msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            self.bar.set_message(display_name(&event.header.name));
        }
        self.bar.set_position(event.bytes);
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Stops the progress display, leaving the last state visible
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

/// Truncates long names from the left
fn display_name(name: &str) -> String {
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        let tail: String = name.chars().skip(chars - (MAX_NAME_CHARS - 3)).collect();
        format!("...{}", tail)
    } else {
        name.to_string()
    }
}
