//! Shared test utilities for integration tests.
//!
//! Fixture archives are built in memory with the `tar` crate and written to
//! temporary directories.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use tar_to_file::{ChannelObserver, Error, Extraction, Notification, ProgressEvent};

/// One entry of a fixture archive.
pub enum Fixture<'a> {
    /// A regular file with its content.
    File(&'a str, &'a [u8]),
    /// A directory.
    Dir(&'a str),
    /// A symbolic link and its target.
    Symlink(&'a str, &'a str),
}

/// Builds an uncompressed tar archive in memory.
pub fn tar_bytes(entries: &[Fixture<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_mtime(1_600_000_000);
        match entry {
            Fixture::File(name, data) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(0o644);
                header.set_size(data.len() as u64);
                builder.append_data(&mut header, name, *data).unwrap();
            }
            Fixture::Dir(name) => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                builder
                    .append_data(&mut header, name, std::io::empty())
                    .unwrap();
            }
            Fixture::Symlink(name, target) => {
                header.set_entry_type(tar::EntryType::Symlink);
                header.set_mode(0o777);
                header.set_size(0);
                builder.append_link(&mut header, name, target).unwrap();
            }
        }
    }
    builder.into_inner().unwrap()
}

/// Gzips bytes.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Writes `data` to `dir/name` and returns the path.
pub fn write_fixture(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// The notifications observed during one run.
#[derive(Debug, Default)]
pub struct Outcome {
    pub events: Vec<ProgressEvent>,
    pub error: Option<Error>,
    pub completed: bool,
}

impl Outcome {
    /// Returns the delivered error, panicking if the run did not fail.
    pub fn unwrap_err(self) -> Error {
        assert!(!self.completed, "run completed unexpectedly");
        self.error.expect("run did not fail")
    }

    /// Asserts that the run completed.
    pub fn assert_completed(&self) {
        assert!(
            self.error.is_none(),
            "run failed unexpectedly: {:?}",
            self.error
        );
        assert!(self.completed, "run did not complete");
    }

    /// Returns `true` if nothing at all was delivered.
    pub fn is_silent(&self) -> bool {
        self.events.is_empty() && self.error.is_none() && !self.completed
    }
}

/// Subscribes to `extraction` and collects notifications until the run ends.
pub async fn run(extraction: Extraction) -> Outcome {
    let (observer, mut rx) = ChannelObserver::new();
    let _subscription = extraction.subscribe(observer);
    drain(&mut rx).await
}

/// Collects notifications until the channel closes.
pub async fn drain(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<Notification>,
) -> Outcome {
    let mut outcome = Outcome::default();
    while let Some(notification) = rx.recv().await {
        assert!(
            outcome.error.is_none() && !outcome.completed,
            "notification after terminal event: {:?}",
            notification
        );
        match notification {
            Notification::Next(event) => outcome.events.push(event),
            Notification::Error(err) => outcome.error = Some(err),
            Notification::Complete => outcome.completed = true,
        }
    }
    outcome
}
