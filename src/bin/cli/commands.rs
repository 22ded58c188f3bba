//! Command implementation for the CLI tool.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tar_to_file::progress::format_bytes_iec;
use tar_to_file::{ChannelObserver, ExtractOptions, Notification, extract_single_file};

use crate::Decompress;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::progress::CliProgress;

/// Configuration for the extract command.
pub struct ExtractConfig<'a> {
    pub archive_path: &'a Path,
    pub destination: &'a Path,
    pub decompress: Decompress,
    pub quiet: bool,
}

/// Extract command implementation
pub async fn extract(config: &ExtractConfig<'_>) -> ExitCode {
    let mut options = ExtractOptions::new();
    match config.decompress.transform(config.archive_path) {
        Ok(Some(transform)) => options = options.tar_transform(transform),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    }

    let (observer, mut rx) = ChannelObserver::new();
    let subscription =
        extract_single_file(config.archive_path, config.destination, options).subscribe(observer);

    // Ctrl+C cancels the run; the loop below then sees the channel close
    let interrupted = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&interrupted);
    let handler_subscription = subscription.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        handler_subscription.unsubscribe();
    }) {
        log::warn!("Failed to install Ctrl+C handler: {}", e);
    }

    let progress = CliProgress::new(config.quiet);
    let mut written = 0;
    let mut outcome = None;
    while let Some(notification) = rx.recv().await {
        match notification {
            Notification::Next(event) => {
                written = event.bytes;
                progress.update(&event);
            }
            Notification::Error(err) => outcome = Some(Err(err)),
            Notification::Complete => outcome = Some(Ok(())),
        }
    }

    match outcome {
        Some(Ok(())) => {
            progress.finish();
            if !config.quiet {
                println!(
                    "Extracted {} ({})",
                    config.destination.display(),
                    format_bytes_iec(written)
                );
            }
            ExitCode::Success
        }
        Some(Err(err)) => {
            progress.abandon();
            eprintln!("Error: {}", err);
            error_to_exit_code(&err)
        }
        None => {
            progress.abandon();
            if interrupted.load(Ordering::SeqCst) {
                eprintln!("\nInterrupted");
                ExitCode::UserInterrupt
            } else {
                eprintln!("Error: extraction stopped without a result");
                ExitCode::FatalError
            }
        }
    }
}
