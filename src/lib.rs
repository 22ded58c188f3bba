//! # tar-to-file
//!
//! Extracts the only file of a tar archive to a destination path, with
//! byte-level progress and cancellation.
//!
//! The archive must contain exactly one entry, and that entry must be a
//! regular file. Directories, links, and additional entries make the run
//! fail. Nothing is written to the destination before the whole archive has
//! been checked.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tar_to_file::{ExtractOptions, extract_single_file, observer_fn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscription = extract_single_file("archive.tar", "out/file.txt", ExtractOptions::new())
//!         .subscribe(observer_fn(
//!             |event| println!("{} of {} bytes", event.bytes, event.header.size),
//!             |err| eprintln!("error: {}", err),
//!             || println!("done"),
//!         ));
//!
//!     subscription.closed().await;
//! }
//! ```
//!
//! ## Options
//!
//! [`ExtractOptions`] plugs hooks into the pipeline:
//!
//! - `map` rewrites each entry header before the single-entry check,
//! - `map_stream` replaces the content stream of the accepted entry,
//! - `tar_transform` rewrites the archive bytes before tar parsing.
//!
//! Compressed archives need a `tar_transform`:
//!
//! ```rust,ignore
//! # #[cfg(feature = "gzip")]
//! use tar_to_file::{ExtractOptions, Transform, extract_single_file};
//!
//! let options = ExtractOptions::new().tar_transform(Transform::gzip());
//! let extraction = extract_single_file("archive.tar.gz", "file.txt", options);
//! ```
//!
//! ## Cancellation
//!
//! [`Subscription::unsubscribe`] stops the run at its next suspension point.
//! No notification is delivered after that. To cancel from inside an option
//! hook, pass a [`CancellationToken`] with [`Extraction::cancel_token`].
//!
//! ## Dynamic Arguments
//!
//! [`Extraction::from_args`] accepts loosely typed [`args::Value`]
//! arguments and reports malformed calls through the error channel:
//!
//! ```rust
//! use tar_to_file::Extraction;
//! use tar_to_file::args::Value;
//!
//! let extraction = Extraction::from_args(vec![Value::from("a.tar")]);
//! assert!(!extraction.is_valid());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `gzip` | Yes | `Transform::gzip` |
//! | `zstd` | No | `Transform::zstd` |
//! | `xz` | No | `Transform::xz` |
//! | `bzip2` | No | `Transform::bzip2` |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod args;
pub mod entry;
pub mod error;
pub mod extraction;
pub mod observer;
pub mod options;
pub mod progress;
pub mod stream;

mod destination;
mod guard;
mod pipeline;

pub use entry::{EntryHeader, EntryKind};
pub use error::{Error, ErrorKind, Result};
pub use extraction::{Extraction, Subscription, extract_single_file};
pub use observer::{ChannelObserver, NoObserver, Notification, Observer, observer_fn};
pub use options::ExtractOptions;
pub use pipeline::extract_to_path;
pub use progress::ProgressEvent;
pub use stream::{Stream, Transform};

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
