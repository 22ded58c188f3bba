//! The extraction pipeline.
//!
//! Stages run sequentially on one task:
//!
//! ```text
//! archive file -> tar_transform -> tar parser -> map -> guard
//!     -> map_stream -> staging file -> destination
//! ```
//!
//! Every await is raced against the run's cancellation token, so a
//! cancelled run stops at its next suspension point.

use std::future::Future;
use std::path::Path;

use futures::StreamExt;
use tokio::io::{AsyncReadExt, BufReader};
use tokio_tar::Archive;
use tokio_util::sync::CancellationToken;

use crate::READ_BUFFER_SIZE;
use crate::args::ExtractionRequest;
use crate::destination::Destination;
use crate::entry::EntryHeader;
use crate::error::{Error, FsAction, Result};
use crate::guard::{Admission, SingleEntryGuard};
use crate::options::MAP_STREAM;
use crate::progress::{ProgressEvent, ProgressTracker};
use crate::stream::{BoxedReader, Stream};

/// Awaits `future` unless the token is cancelled first.
async fn checkpoint<F: Future>(token: &CancellationToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        output = future => Ok(output),
    }
}

fn ensure_active(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Turns the stream returned by `map_stream` into a reader.
fn readable_content(stream: Stream) -> Result<BoxedReader> {
    match stream {
        Stream::Readable(reader) => Ok(reader),
        Stream::Writable(_) => Err(Error::invalid_type(format!(
            "The function passed to `{}` option must return a stream that is readable, \
             but returned a non-readable stream.",
            MAP_STREAM
        ))),
        Stream::Transform(_) => Err(Error::invalid_type(format!(
            "The function passed to `{}` option must return a stream that is readable, \
             but returned a transform stream with no input. Apply the transform to the entry \
             stream and return the result instead.",
            MAP_STREAM
        ))),
    }
}

/// Runs one extraction, calling `emit` for every progress event.
///
/// Returns `Err(Error::Cancelled)` once the token is cancelled.
pub(crate) async fn run(
    request: ExtractionRequest,
    token: &CancellationToken,
    emit: &mut (dyn FnMut(ProgressEvent) + Send),
) -> Result<()> {
    let ExtractionRequest {
        archive_path,
        destination_path,
        mut options,
    } = request;
    log::debug!(
        "extracting '{}' to '{}' ({:?})",
        archive_path.display(),
        destination_path.display(),
        options
    );

    let file = checkpoint(token, tokio::fs::File::open(&archive_path))
        .await?
        .map_err(|e| Error::filesystem(FsAction::OpenArchive, &archive_path, e))?;
    let mut source: BoxedReader = Box::pin(BufReader::with_capacity(READ_BUFFER_SIZE, file));
    if let Some(transform) = options.tar_transform.take() {
        log::trace!("applying tar transform");
        source = transform.apply(source);
    }

    let mut archive = Archive::new(source);
    let mut entries = archive
        .entries()
        .map_err(|e| Error::from_archive_read(&archive_path, e))?;

    let mut guard = SingleEntryGuard::new(&archive_path);
    let mut accepted: Option<Destination> = None;

    while let Some(entry) = checkpoint(token, entries.next()).await? {
        let entry = entry.map_err(|e| Error::from_archive_read(&archive_path, e))?;
        let header = EntryHeader::from_entry(&entry)
            .map_err(|e| Error::from_archive_read(&archive_path, e))?;
        log::trace!(
            "entry '{}' ({}, {} bytes)",
            header.name,
            header.kind,
            header.size
        );

        // `map` may cancel the run.
        let header = options.apply_map(header);
        ensure_active(token)?;

        match guard.observe(&header)? {
            Admission::Drain => {
                log::debug!("skipping non-file entry '{}'", header.name);
            }
            Admission::Accept => {
                let (mut tracker, started) = ProgressTracker::start(header.clone());
                emit(started);

                let mut destination =
                    checkpoint(token, Destination::prepare(&destination_path)).await??;

                let content: BoxedReader = Box::pin(entry);
                let remapped = options.map_stream.is_some();
                let mut reader = match &options.map_stream {
                    Some(map_stream) => readable_content(map_stream(content, &header))?,
                    None => content,
                };

                let mut buf = vec![0u8; READ_BUFFER_SIZE];
                loop {
                    let n = checkpoint(token, reader.read(&mut buf))
                        .await?
                        .map_err(|e| {
                            if remapped {
                                Error::ContentStream {
                                    entry: header.name.clone(),
                                    source: e,
                                }
                            } else {
                                Error::from_archive_read(&archive_path, e)
                            }
                        })?;
                    if n == 0 {
                        break;
                    }
                    checkpoint(token, destination.write_all(&buf[..n])).await??;
                    emit(tracker.advance(n));
                }
                log::trace!("streamed {} bytes of '{}'", tracker.bytes(), header.name);

                accepted = Some(destination);
            }
        }
    }

    let header = guard.finish()?;
    let destination = accepted.ok_or_else(|| Error::EmptyArchive {
        archive: archive_path.clone(),
    })?;
    checkpoint(token, destination.commit()).await??;

    log::debug!(
        "extracted '{}' from '{}'",
        header.name,
        archive_path.display()
    );
    Ok(())
}

/// Extracts the single file of `archive` to `destination`, without events.
///
/// Convenience wrapper for callers that do not need progress or an
/// observer; cancellation still works through `token`.
pub async fn extract_to_path(
    archive: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: crate::ExtractOptions,
    token: &CancellationToken,
) -> Result<()> {
    let request = ExtractionRequest::new(
        archive.as_ref().to_path_buf(),
        destination.as_ref().to_path_buf(),
        options,
    )?;
    run(request, token, &mut |_| {}).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readable_content() {
        assert!(readable_content(Stream::readable(tokio::io::empty())).is_ok());

        let Err(err) = readable_content(Stream::writable(tokio::io::sink())) else {
            panic!("writable stream accepted");
        };
        assert_eq!(
            err.to_string(),
            "The function passed to `mapStream` option must return a stream that is readable, \
             but returned a non-readable stream."
        );

        let Err(err) = readable_content(crate::Transform::new(|r| r).into()) else {
            panic!("transform stream accepted");
        };
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_checkpoint_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let result = checkpoint(&token, std::future::pending::<()>()).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_checkpoint_passes_output() {
        let token = CancellationToken::new();
        assert_eq!(checkpoint(&token, async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_missing_archive() {
        let token = CancellationToken::new();
        let err = extract_to_path(
            "definitely-missing.tar",
            "unused.txt",
            crate::ExtractOptions::new(),
            &token,
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), Some("ENOENT"));
    }
}
