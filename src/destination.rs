//! Destination file handling.
//!
//! The accepted entry is streamed into a staging file created next to the
//! destination. Only once the archive has been fully read and the entry is
//! known to be the only one are the staged bytes copied into the
//! destination. The destination itself is created (and truncated) up front
//! so that problems such as a directory in the way surface before any
//! content is read.
//!
//! The destination is written through the handle opened by
//! [`Destination::prepare`], never replaced, so symlinks, hard links and
//! permissions of an existing file survive.
//!
//! Dropping a [`Destination`] without committing removes the staging file
//! and leaves the empty destination file and any created directories in
//! place.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::error::{Error, FsAction, Result};

/// Prefix of staging file names.
const STAGING_PREFIX: &str = ".tar-to-file-";

/// A destination file being written.
#[derive(Debug)]
pub(crate) struct Destination {
    path: PathBuf,
    target: tokio::fs::File,
    staging: TempPath,
    writer: tokio::fs::File,
}

impl Destination {
    /// Creates parent directories, the destination file and the staging file.
    pub(crate) async fn prepare(path: &Path) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::filesystem(FsAction::CreateDirectory, parent, e))?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let target = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await
            .map_err(|e| Error::filesystem(FsAction::CreateDestination, path, e))?;

        let staging_dir = dir.clone();
        let staging = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .tempfile_in(&staging_dir)
        })
        .await
        .map_err(|e| Error::filesystem(FsAction::CreateStaging, &dir, io::Error::other(e)))?
        .map_err(|e| Error::filesystem(FsAction::CreateStaging, &dir, e))?;
        let (file, staging) = staging.into_parts();

        log::trace!(
            "staging '{}' for '{}'",
            staging.display(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            target,
            staging,
            writer: tokio::fs::File::from_std(file),
        })
    }

    /// Appends bytes to the staging file.
    pub(crate) async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.writer
            .write_all(buf)
            .await
            .map_err(|e| Error::filesystem(FsAction::WriteDestination, &self.path, e))
    }

    /// Copies the staged bytes into the destination.
    ///
    /// The staging file is removed afterwards.
    pub(crate) async fn commit(self) -> Result<()> {
        let Self {
            path,
            mut target,
            staging,
            mut writer,
        } = self;

        writer
            .flush()
            .await
            .map_err(|e| Error::filesystem(FsAction::WriteDestination, &path, e))?;
        writer
            .seek(SeekFrom::Start(0))
            .await
            .map_err(|e| Error::filesystem(FsAction::CommitDestination, &*staging, e))?;

        let copied = tokio::io::copy(&mut writer, &mut target)
            .await
            .map_err(|e| Error::filesystem(FsAction::CommitDestination, &path, e))?;
        target
            .flush()
            .await
            .map_err(|e| Error::filesystem(FsAction::CommitDestination, &path, e))?;
        drop(writer);
        drop(staging);

        log::debug!("wrote {} bytes to '{}'", copied, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_commit_moves_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        let mut destination = Destination::prepare(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"");
        destination.write_all(b"hello").await.unwrap();
        destination.commit().await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("out.txt")]);
    }

    #[tokio::test]
    async fn test_drop_leaves_empty_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"previous").unwrap();

        let mut destination = Destination::prepare(&path).await.unwrap();
        destination.write_all(b"partial").await.unwrap();
        drop(destination);

        assert_eq!(std::fs::read(&path).unwrap(), b"");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_commit_keeps_hard_links() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let other = dir.path().join("other.txt");
        std::fs::write(&path, b"old").unwrap();
        std::fs::hard_link(&path, &other).unwrap();

        let mut destination = Destination::prepare(&path).await.unwrap();
        destination.write_all(b"new content").await.unwrap();
        destination.commit().await.unwrap();

        assert_eq!(std::fs::read(&other).unwrap(), b"new content");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_directory_in_the_way() {
        let dir = TempDir::new().unwrap();
        let err = Destination::prepare(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Filesystem);
    }

    #[tokio::test]
    async fn test_parent_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"").unwrap();

        let err = Destination::prepare(&file.join("_")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Filesystem {
                action: FsAction::CreateDirectory,
                ..
            }
        ));
    }
}
