//! Error types for single-file tar extraction.
//!
//! This module provides the [`Error`] enum which represents every failure a
//! run can report through its error channel, along with a convenient
//! [`Result<T>`] type alias and the [`ErrorKind`] tag used to classify them.
//!
//! # Error Handling
//!
//! Errors are never returned from [`subscribe`]; they are delivered to the
//! observer's `error` callback. Match on the variant or on [`Error::kind`]:
//!
//! ```rust
//! use tar_to_file::{Error, ErrorKind};
//!
//! fn describe(error: &Error) -> String {
//!     match error.kind() {
//!         ErrorKind::Filesystem => format!("filesystem error ({:?})", error.code()),
//!         ErrorKind::Parse => "not a tar archive".to_string(),
//!         ErrorKind::MultiEntry | ErrorKind::NonFileEntry => error.to_string(),
//!         _ => format!("invalid call: {}", error),
//!     }
//! }
//! ```
//!
//! [`subscribe`]: crate::Extraction::subscribe

use std::io;
use std::path::{Path, PathBuf};

use crate::entry::{EntryHeader, EntryKind};

/// Coarse classification of an [`Error`].
///
/// Every error delivered through the error channel carries exactly one of
/// these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Wrong number of positional arguments.
    Arity,
    /// Wrong type for a path, the options object, or an option value.
    TypeValidation,
    /// A value of the right type with an unacceptable content.
    ValueValidation,
    /// The archive holds more than one entry.
    MultiEntry,
    /// The archive's only entry is not a regular file, or there is no entry.
    NonFileEntry,
    /// The archive bytes are not a valid tar stream.
    Parse,
    /// An OS-level failure while touching the filesystem.
    Filesystem,
    /// The stream returned by `map_stream` failed.
    Stream,
    /// The run could not be scheduled.
    Runtime,
    /// The run was cancelled.
    Cancelled,
}

/// The filesystem operation that failed, used for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsAction {
    /// Opening the archive for reading.
    OpenArchive,
    /// Reading bytes from the archive.
    ReadArchive,
    /// Creating the destination's parent directories.
    CreateDirectory,
    /// Creating or truncating the destination file.
    CreateDestination,
    /// Creating the staging file next to the destination.
    CreateStaging,
    /// Writing entry bytes.
    WriteDestination,
    /// Copying the staged content into the destination.
    CommitDestination,
}

impl std::fmt::Display for FsAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::OpenArchive => "failed to open archive",
            Self::ReadArchive => "failed to read archive",
            Self::CreateDirectory => "failed to create directory",
            Self::CreateDestination => "failed to create destination file",
            Self::CreateStaging => "failed to create staging file in",
            Self::WriteDestination => "failed to write destination file",
            Self::CommitDestination => "failed to copy extracted content to",
        };
        f.write_str(text)
    }
}

/// Helper struct for formatting the argument count of an arity error.
struct ArgCountDisplay(usize);

impl std::fmt::Display for ArgCountDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => write!(f, "no arguments"),
            1 => write!(f, "1 argument"),
            n => write!(f, "{} arguments", n),
        }
    }
}

/// Helper struct for formatting the two entries of a multi-entry error.
///
/// Only the first non-file entry of the pair is annotated with its kind.
struct EntryPairDisplay<'a> {
    first: &'a EntryHeader,
    second: &'a EntryHeader,
}

impl std::fmt::Display for EntryPairDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let annotate_first = self.first.kind != EntryKind::File;
        let annotate_second = !annotate_first && self.second.kind != EntryKind::File;

        write!(f, "'{}'", self.first.name)?;
        if annotate_first {
            write!(f, " ({})", self.first.kind)?;
        }
        write!(f, " and '{}'", self.second.name)?;
        if annotate_second {
            write!(f, " ({})", self.second.kind)?;
        }
        Ok(())
    }
}

/// The error type for single-file extraction.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Validation | [`Arity`][Self::Arity], [`InvalidType`][Self::InvalidType], [`InvalidValue`][Self::InvalidValue] | Bad call arguments |
/// | Archive shape | [`MultipleEntries`][Self::MultipleEntries], [`NonFileEntry`][Self::NonFileEntry], [`EmptyArchive`][Self::EmptyArchive] | Not a single-file archive |
/// | Format | [`InvalidArchive`][Self::InvalidArchive] | Not a tar stream |
/// | I/O | [`Filesystem`][Self::Filesystem] | OS-level failure |
/// | Hooks | [`ContentStream`][Self::ContentStream] | `map_stream` reader failed |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The dynamic entry point received the wrong number of arguments.
    #[error(
        "Expected 2 or 3 arguments (<string>, <string>[, <Object>]), but got {} instead.",
        ArgCountDisplay(*got)
    )]
    Arity {
        /// The number of arguments actually passed.
        got: usize,
    },

    /// An argument or option value has the wrong type or capability.
    #[error("{message}")]
    InvalidType {
        /// Description of the expected and the received value.
        message: String,
    },

    /// An argument has the right type but an unacceptable value.
    #[error("{message}")]
    InvalidValue {
        /// Description of the expected and the received value.
        message: String,
    },

    /// The archive contains more than one entry.
    #[error(
        "Expected the archive {} to contain only a single file, but actually contains multiple entries {}.",
        archive.display(),
        EntryPairDisplay { first, second }
    )]
    MultipleEntries {
        /// Path of the archive.
        archive: PathBuf,
        /// The first entry of the archive.
        first: EntryHeader,
        /// The entry that followed it.
        second: EntryHeader,
    },

    /// The archive's only entry is not a regular file.
    #[error(
        "Expected the archive {} to contain only a single file, but actually contains a non-file entry '{}' ({}).",
        archive.display(),
        entry.name,
        entry.kind
    )]
    NonFileEntry {
        /// Path of the archive.
        archive: PathBuf,
        /// The offending entry.
        entry: EntryHeader,
    },

    /// The archive holds no entry at all.
    #[error(
        "Expected the archive {} to contain only a single file, but actually contains no entries.",
        archive.display()
    )]
    EmptyArchive {
        /// Path of the archive.
        archive: PathBuf,
    },

    /// The archive bytes could not be parsed as tar.
    ///
    /// Compressed archives produce this error unless a matching
    /// `tar_transform` is configured.
    #[error("Invalid tar header. Maybe the tar is corrupted or it needs to be gunzipped?")]
    InvalidArchive {
        /// Path of the archive.
        archive: PathBuf,
        /// The parser's own error.
        #[source]
        source: io::Error,
    },

    /// An OS-level filesystem failure.
    ///
    /// The original [`io::Error`] is preserved; use [`Error::code`] or
    /// [`Error::os_error`] to inspect it.
    #[error("{action} {}: {source}", path.display())]
    Filesystem {
        /// What the pipeline was doing.
        action: FsAction,
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Reading the stream returned by `map_stream` failed.
    ///
    /// The stream is caller code, so its errors are reported as they are,
    /// without the tar parsing hint.
    #[error("The stream returned by `mapStream` for '{entry}' failed: {source}")]
    ContentStream {
        /// Name of the entry whose content was remapped.
        entry: String,
        /// The stream's own error.
        #[source]
        source: io::Error,
    },

    /// `subscribe` was called outside of a Tokio runtime.
    #[error("extraction must be subscribed from within a Tokio runtime")]
    NoRuntime,

    /// The run was cancelled.
    ///
    /// Used internally to unwind the pipeline; observers never receive it.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns the classification tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Arity { .. } => ErrorKind::Arity,
            Error::InvalidType { .. } => ErrorKind::TypeValidation,
            Error::InvalidValue { .. } => ErrorKind::ValueValidation,
            Error::MultipleEntries { .. } => ErrorKind::MultiEntry,
            Error::NonFileEntry { .. } | Error::EmptyArchive { .. } => ErrorKind::NonFileEntry,
            Error::InvalidArchive { .. } => ErrorKind::Parse,
            Error::Filesystem { .. } => ErrorKind::Filesystem,
            Error::ContentStream { .. } => ErrorKind::Stream,
            Error::NoRuntime => ErrorKind::Runtime,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns `true` if this error was raised before any I/O happened.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Arity | ErrorKind::TypeValidation | ErrorKind::ValueValidation
        )
    }

    /// Returns the raw OS error code carried by the error, if any.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Error::Filesystem { source, .. } | Error::ContentStream { source, .. } => {
                source.raw_os_error()
            }
            _ => None,
        }
    }

    /// Returns the symbolic name of a filesystem error's code.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tar_to_file::Error;
    /// use tar_to_file::error::FsAction;
    ///
    /// let err = Error::filesystem(
    ///     FsAction::OpenArchive,
    ///     "missing.tar",
    ///     std::io::Error::from(std::io::ErrorKind::NotFound),
    /// );
    /// assert_eq!(err.code(), Some("ENOENT"));
    /// ```
    pub fn code(&self) -> Option<&'static str> {
        let Error::Filesystem { source, .. } = self else {
            return None;
        };
        let code = match source.kind() {
            io::ErrorKind::NotFound => "ENOENT",
            io::ErrorKind::IsADirectory => "EISDIR",
            io::ErrorKind::NotADirectory => "ENOTDIR",
            io::ErrorKind::AlreadyExists => "EEXIST",
            io::ErrorKind::PermissionDenied => "EACCES",
            io::ErrorKind::ReadOnlyFilesystem => "EROFS",
            io::ErrorKind::StorageFull => "ENOSPC",
            io::ErrorKind::DirectoryNotEmpty => "ENOTEMPTY",
            io::ErrorKind::Interrupted => "EINTR",
            _ => return None,
        };
        Some(code)
    }

    /// Returns the archive path this error refers to, if any.
    pub fn archive(&self) -> Option<&Path> {
        match self {
            Error::MultipleEntries { archive, .. }
            | Error::NonFileEntry { archive, .. }
            | Error::EmptyArchive { archive }
            | Error::InvalidArchive { archive, .. } => Some(archive),
            _ => None,
        }
    }

    /// Returns the names of the entries this error refers to.
    pub fn entry_names(&self) -> Vec<&str> {
        match self {
            Error::MultipleEntries { first, second, .. } => {
                vec![first.name.as_str(), second.name.as_str()]
            }
            Error::NonFileEntry { entry, .. } => vec![entry.name.as_str()],
            Error::ContentStream { entry, .. } => vec![entry.as_str()],
            _ => Vec::new(),
        }
    }

    /// Creates an InvalidType error.
    pub fn invalid_type(message: impl Into<String>) -> Self {
        Error::InvalidType {
            message: message.into(),
        }
    }

    /// Creates an InvalidValue error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Error::InvalidValue {
            message: message.into(),
        }
    }

    /// Creates a Filesystem error.
    pub fn filesystem(action: FsAction, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Classifies an error raised while reading archive bytes.
    ///
    /// Errors carrying an OS error code come from the filesystem; everything
    /// else was produced by the tar parser or a decoding transform.
    pub fn from_archive_read(archive: impl Into<PathBuf>, source: io::Error) -> Self {
        if source.raw_os_error().is_some() {
            Error::Filesystem {
                action: FsAction::ReadArchive,
                path: archive.into(),
                source,
            }
        } else {
            Error::InvalidArchive {
                archive: archive.into(),
                source,
            }
        }
    }
}

/// A specialized Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, kind: EntryKind) -> EntryHeader {
        EntryHeader::new(name, 0, kind)
    }

    #[test]
    fn test_arity_messages() {
        assert_eq!(
            Error::Arity { got: 0 }.to_string(),
            "Expected 2 or 3 arguments (<string>, <string>[, <Object>]), but got no arguments instead."
        );
        assert!(Error::Arity { got: 1 }.to_string().contains("got 1 argument instead"));
        assert!(Error::Arity { got: 4 }.to_string().contains("got 4 arguments instead"));
    }

    #[test]
    fn test_multiple_entries_message() {
        let err = Error::MultipleEntries {
            archive: PathBuf::from("fixture.tgz"),
            first: header("a.txt", EntryKind::File),
            second: header("b.txt", EntryKind::File),
        };
        assert_eq!(
            err.to_string(),
            "Expected the archive fixture.tgz to contain only a single file, \
             but actually contains multiple entries 'a.txt' and 'b.txt'."
        );
        assert_eq!(err.kind(), ErrorKind::MultiEntry);
        assert_eq!(err.entry_names(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_multiple_entries_names_first_non_file() {
        let err = Error::MultipleEntries {
            archive: PathBuf::from("x.tar"),
            first: header("_", EntryKind::Directory),
            second: header("link", EntryKind::Symlink),
        };
        assert!(err.to_string().ends_with("multiple entries '_' (directory) and 'link'."));

        let err = Error::MultipleEntries {
            archive: PathBuf::from("x.tar"),
            first: header("a.txt", EntryKind::File),
            second: header("dir", EntryKind::Directory),
        };
        assert!(err.to_string().ends_with("multiple entries 'a.txt' and 'dir' (directory)."));
    }

    #[test]
    fn test_non_file_entry_message() {
        let err = Error::NonFileEntry {
            archive: PathBuf::from("fixture-directory.tar"),
            entry: header("_", EntryKind::Directory),
        };
        assert_eq!(
            err.to_string(),
            "Expected the archive fixture-directory.tar to contain only a single file, \
             but actually contains a non-file entry '_' (directory)."
        );
        assert_eq!(err.kind(), ErrorKind::NonFileEntry);
    }

    #[test]
    fn test_archive_read_classification() {
        let os = io::Error::from_raw_os_error(21);
        let err = Error::from_archive_read("dir", os);
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert_eq!(err.os_error(), Some(21));

        let parse = io::Error::other("archive header checksum mismatch");
        let err = Error::from_archive_read("file.rs", parse);
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(
            err.to_string(),
            "Invalid tar header. Maybe the tar is corrupted or it needs to be gunzipped?"
        );
        assert_eq!(err.archive(), Some(Path::new("file.rs")));
    }

    #[test]
    fn test_content_stream_error() {
        let err = Error::ContentStream {
            entry: "a.txt".to_string(),
            source: io::Error::other("boom"),
        };
        assert_eq!(err.kind(), ErrorKind::Stream);
        assert_eq!(
            err.to_string(),
            "The stream returned by `mapStream` for 'a.txt' failed: boom"
        );
        assert_eq!(err.entry_names(), vec!["a.txt"]);
        assert_eq!(err.os_error(), None);
    }

    #[test]
    fn test_codes() {
        let cases = [
            (io::ErrorKind::NotFound, "ENOENT"),
            (io::ErrorKind::IsADirectory, "EISDIR"),
            (io::ErrorKind::AlreadyExists, "EEXIST"),
            (io::ErrorKind::PermissionDenied, "EACCES"),
        ];
        for (kind, code) in cases {
            let err = Error::filesystem(FsAction::CreateDestination, "dest", io::Error::from(kind));
            assert_eq!(err.code(), Some(code));
        }
        assert_eq!(Error::Arity { got: 0 }.code(), None);
    }

    #[test]
    fn test_filesystem_display() {
        let err = Error::filesystem(
            FsAction::OpenArchive,
            "none",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(err.to_string().starts_with("failed to open archive none:"));
    }

    #[test]
    fn test_validation_predicate() {
        assert!(Error::Arity { got: 4 }.is_validation_error());
        assert!(Error::invalid_type("x").is_validation_error());
        assert!(Error::invalid_value("x").is_validation_error());
        assert!(!Error::Cancelled.is_validation_error());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
