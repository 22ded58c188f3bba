//! Observers receiving the notifications of an extraction run.
//!
//! A run delivers zero or more `next` notifications followed by at most one
//! terminal notification, `error` or `complete`. A cancelled run delivers
//! nothing after the cancellation.

use tokio::sync::mpsc;

use crate::error::Error;
use crate::progress::ProgressEvent;

/// Receiver of extraction notifications.
///
/// All methods have no-op defaults; implement the ones you need. Callbacks
/// run on the extraction task and should return quickly.
pub trait Observer: Send + 'static {
    /// Called for each progress event.
    fn next(&mut self, event: ProgressEvent) {
        let _ = event;
    }

    /// Called once if the run fails.
    fn error(&mut self, error: Error) {
        let _ = error;
    }

    /// Called once after the destination file is in place.
    fn complete(&mut self) {}
}

/// An observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObserver;

impl Observer for NoObserver {}

/// An observer built from three closures.
pub struct FnObserver<N, E, C> {
    next: N,
    error: E,
    complete: C,
}

impl<N, E, C> Observer for FnObserver<N, E, C>
where
    N: FnMut(ProgressEvent) + Send + 'static,
    E: FnMut(Error) + Send + 'static,
    C: FnMut() + Send + 'static,
{
    fn next(&mut self, event: ProgressEvent) {
        (self.next)(event)
    }

    fn error(&mut self, error: Error) {
        (self.error)(error)
    }

    fn complete(&mut self) {
        (self.complete)()
    }
}

/// Creates a closure-based observer.
///
/// # Example
///
/// ```rust
/// use tar_to_file::observer_fn;
///
/// let observer = observer_fn(
///     |event| println!("{} bytes", event.bytes),
///     |err| eprintln!("{}", err),
///     || println!("done"),
/// );
/// # let _ = observer;
/// ```
pub fn observer_fn<N, E, C>(next: N, error: E, complete: C) -> FnObserver<N, E, C>
where
    N: FnMut(ProgressEvent) + Send + 'static,
    E: FnMut(Error) + Send + 'static,
    C: FnMut() + Send + 'static,
{
    FnObserver {
        next,
        error,
        complete,
    }
}

/// Notifications sent by [`ChannelObserver`].
#[derive(Debug)]
pub enum Notification {
    /// A progress event.
    Next(ProgressEvent),
    /// The run failed.
    Error(Error),
    /// The run completed.
    Complete,
}

impl Notification {
    /// Returns `true` for `Error` and `Complete`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }
}

/// An observer forwarding notifications into a Tokio channel.
///
/// The channel closes once the run ends and the observer is dropped, so
/// draining the receiver until `None` observes the whole run.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelObserver {
    /// Creates a new channel observer.
    ///
    /// Returns a tuple of (observer, receiver).
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: tx }, rx)
    }
}

impl Observer for ChannelObserver {
    fn next(&mut self, event: ProgressEvent) {
        let _ = self.sender.send(Notification::Next(event));
    }

    fn error(&mut self, error: Error) {
        let _ = self.sender.send(Notification::Error(error));
    }

    fn complete(&mut self) {
        let _ = self.sender.send(Notification::Complete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryHeader, EntryKind};
    use std::sync::{Arc, Mutex};

    fn event(bytes: u64) -> ProgressEvent {
        ProgressEvent::new(EntryHeader::new("a", 4, EntryKind::File), bytes)
    }

    #[test]
    fn test_no_observer() {
        let mut observer = NoObserver;
        observer.next(event(0));
        observer.error(Error::NoRuntime);
        observer.complete();
    }

    #[test]
    fn test_observer_fn() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
        let mut observer = observer_fn(
            move |e| l1.lock().unwrap().push(format!("next {}", e.bytes)),
            move |e| l2.lock().unwrap().push(format!("error {}", e)),
            move || l3.lock().unwrap().push("complete".to_string()),
        );
        observer.next(event(0));
        observer.next(event(4));
        observer.complete();
        assert_eq!(*log.lock().unwrap(), vec!["next 0", "next 4", "complete"]);
    }

    #[tokio::test]
    async fn test_channel_observer() {
        let (mut observer, mut rx) = ChannelObserver::new();
        observer.next(event(0));
        observer.error(Error::NoRuntime);
        drop(observer);

        assert!(matches!(rx.recv().await, Some(Notification::Next(_))));
        let terminal = rx.recv().await.unwrap();
        assert!(terminal.is_terminal());
        assert!(matches!(terminal, Notification::Error(Error::NoRuntime)));
        assert!(rx.recv().await.is_none());
    }
}
