//! Lazy, subscribable extraction runs.
//!
//! An [`Extraction`] describes one run but does nothing until
//! [`Extraction::subscribe`] is called. Subscribing spawns the pipeline on
//! the current Tokio runtime and returns a [`Subscription`] that cancels the
//! run when unsubscribed.
//!
//! # Example
//!
//! ```rust,no_run
//! use tar_to_file::{ChannelObserver, ExtractOptions, Notification, extract_single_file};
//!
//! # async fn example() {
//! let (observer, mut rx) = ChannelObserver::new();
//! let subscription = extract_single_file("file.tar", "out/file.txt", ExtractOptions::new())
//!     .subscribe(observer);
//!
//! while let Some(notification) = rx.recv().await {
//!     match notification {
//!         Notification::Next(event) => println!("{} / {}", event.bytes, event.header.size),
//!         Notification::Error(err) => eprintln!("{}", err),
//!         Notification::Complete => println!("done"),
//!     }
//! }
//! # drop(subscription);
//! # }
//! ```

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::args::{self, ExtractionRequest, Value};
use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::options::ExtractOptions;
use crate::pipeline;

/// A lazily started single-file extraction.
#[derive(Debug)]
pub struct Extraction {
    request: Result<ExtractionRequest>,
    cancel_token: Option<CancellationToken>,
}

/// Creates an extraction of the single file in `archive` to `destination`.
///
/// Empty paths are reported through the observer's `error` callback once
/// the extraction is subscribed to.
pub fn extract_single_file(
    archive: impl Into<PathBuf>,
    destination: impl Into<PathBuf>,
    options: ExtractOptions,
) -> Extraction {
    Extraction {
        request: ExtractionRequest::new(archive, destination, options),
        cancel_token: None,
    }
}

impl Extraction {
    /// Creates an extraction from dynamic call arguments.
    ///
    /// The arguments are validated immediately; a failure is delivered to
    /// the observer on subscription.
    pub fn from_args(args: Vec<Value>) -> Self {
        Self {
            request: args::validate(args),
            cancel_token: None,
        }
    }

    /// Uses `token` as the run's cancellation token.
    ///
    /// Cancelling the token has the same effect as
    /// [`Subscription::unsubscribe`]. This is the way to cancel from within
    /// an option hook, which runs before `subscribe` has returned.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Returns `true` if the arguments passed validation.
    pub fn is_valid(&self) -> bool {
        self.request.is_ok()
    }

    /// Starts the run.
    ///
    /// Validation errors, and the absence of a Tokio runtime, are delivered
    /// to `observer.error` before this method returns. Otherwise the
    /// pipeline runs on a spawned task and `observer` receives its
    /// notifications from there.
    pub fn subscribe<O: Observer>(self, mut observer: O) -> Subscription {
        let token = self.cancel_token.unwrap_or_default();
        let finished = CancellationToken::new();
        let subscription = Subscription {
            token: token.clone(),
            finished: finished.clone(),
        };

        let request = match self.request {
            Ok(request) => request,
            Err(err) => {
                log::debug!("rejecting extraction: {}", err);
                observer.error(err);
                finished.cancel();
                return subscription;
            }
        };

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                observer.error(Error::NoRuntime);
                finished.cancel();
                return subscription;
            }
        };

        handle.spawn(async move {
            let finished = finished.drop_guard();
            deliver(request, &token, observer).await;
            drop(finished);
        });

        subscription
    }
}

/// Runs the pipeline and forwards its outcome to `observer`.
///
/// The observer is dropped before this returns.
async fn deliver<O: Observer>(
    request: ExtractionRequest,
    token: &CancellationToken,
    mut observer: O,
) {
    let result = {
        let mut emit = |event| {
            if !token.is_cancelled() {
                observer.next(event);
            }
        };
        pipeline::run(request, token, &mut emit).await
    };

    if token.is_cancelled() {
        log::debug!("extraction cancelled");
        return;
    }
    match result {
        Ok(()) => observer.complete(),
        Err(err) => {
            log::debug!("extraction failed: {}", err);
            observer.error(err);
        }
    }
}

/// Handle to a subscribed extraction run.
///
/// Dropping the handle does not cancel the run.
#[derive(Debug, Clone)]
pub struct Subscription {
    token: CancellationToken,
    finished: CancellationToken,
}

impl Subscription {
    /// Cancels the run.
    ///
    /// No further notification is delivered afterwards. Calling it again,
    /// or after the run ended, has no effect.
    pub fn unsubscribe(&self) {
        if !self.token.is_cancelled() && !self.finished.is_cancelled() {
            log::debug!("unsubscribing");
        }
        self.token.cancel();
    }

    /// Returns `true` once the run ended or was cancelled.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.finished.is_cancelled()
    }

    /// Waits until the run's task has stopped.
    ///
    /// After cancellation this resolves once the pipeline has released its
    /// file handles.
    pub async fn closed(&self) {
        self.finished.cancelled().await
    }
}
