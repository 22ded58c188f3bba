//! Archive entry metadata.
//!
//! [`EntryHeader`] is the parser-independent view of a tar header that flows
//! through the `map` option, the single-entry guard, and every
//! [`ProgressEvent`](crate::ProgressEvent).

use std::io;

use tokio::io::AsyncRead;
use tokio_tar::{Entry, EntryType};

/// The type of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
    /// A hard link to another entry.
    HardLink,
    /// Any other entry type (devices, FIFOs, ...).
    Other,
}

impl EntryKind {
    /// Returns `true` for regular files.
    pub fn is_file(self) -> bool {
        self == Self::File
    }
}

impl From<EntryType> for EntryKind {
    fn from(entry_type: EntryType) -> Self {
        if entry_type.is_file() || entry_type.is_contiguous() {
            Self::File
        } else if entry_type.is_dir() {
            Self::Directory
        } else if entry_type.is_symlink() {
            Self::Symlink
        } else if entry_type.is_hard_link() {
            Self::HardLink
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::HardLink => "link",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Metadata of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    /// Entry path inside the archive.
    pub name: String,
    /// Content size in bytes.
    pub size: u64,
    /// Entry type.
    pub kind: EntryKind,
    /// Permission bits as stored in the archive.
    pub mode: u32,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: u64,
    /// Link target for symlinks and hard links.
    pub link_name: Option<String>,
}

impl EntryHeader {
    /// Creates a header with the given name, size and kind.
    pub fn new(name: impl Into<String>, size: u64, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            size,
            kind,
            mode: 0o644,
            mtime: 0,
            link_name: None,
        }
    }

    /// Returns `true` if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Builds a header from a parsed tar entry.
    ///
    /// Long names from GNU and PAX extensions are already resolved by the
    /// parser at this point.
    pub(crate) fn from_entry<R: AsyncRead + Unpin>(entry: &Entry<R>) -> io::Result<Self> {
        let header = entry.header();
        let name = entry.path()?.to_string_lossy().into_owned();
        let link_name = entry
            .link_name()?
            .map(|target| target.to_string_lossy().into_owned());

        Ok(Self {
            name,
            size: header.size()?,
            kind: EntryKind::from(header.entry_type()),
            mode: header.mode().unwrap_or(0),
            mtime: header.mtime().unwrap_or(0),
            link_name,
        })
    }
}
