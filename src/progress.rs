//! Progress accounting for the accepted entry.
//!
//! The pipeline reports progress as a sequence of [`ProgressEvent`]s:
//! one metadata event with `bytes == 0` as soon as the entry is accepted,
//! then one event per chunk written carrying the cumulative byte count.
//!
//! # Example
//!
//! ```rust
//! use tar_to_file::{EntryHeader, EntryKind, ProgressEvent};
//!
//! let event = ProgressEvent::new(EntryHeader::new("a.txt", 200, EntryKind::File), 50);
//! assert!(!event.is_metadata());
//! assert_eq!(event.percentage(), 25.0);
//! ```

use crate::entry::EntryHeader;

/// IEC byte unit: 1 KiB = 1024 bytes.
const BYTES_KB: f64 = 1024.0;
const BYTES_MB: f64 = BYTES_KB * 1024.0;
const BYTES_GB: f64 = BYTES_MB * 1024.0;

/// A progress notification for the entry being extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Header of the entry, after the `map` option was applied.
    pub header: EntryHeader,
    /// Bytes written to the destination so far.
    pub bytes: u64,
}

impl ProgressEvent {
    /// Creates a progress event.
    pub fn new(header: EntryHeader, bytes: u64) -> Self {
        Self { header, bytes }
    }

    /// Returns `true` for the initial event emitted before any byte is written.
    pub fn is_metadata(&self) -> bool {
        self.bytes == 0
    }

    /// Returns the completion percentage (0.0 - 100.0) relative to the
    /// header size.
    ///
    /// An empty entry reports 100 once reached. When `map_stream` produces
    /// more bytes than the header announces, the value exceeds 100.
    pub fn percentage(&self) -> f64 {
        if self.header.size == 0 {
            100.0
        } else {
            (self.bytes as f64 / self.header.size as f64) * 100.0
        }
    }
}

/// Tracks the cumulative byte count of the accepted entry.
///
/// Produces events with non-decreasing `bytes`.
#[derive(Debug, Clone)]
pub(crate) struct ProgressTracker {
    header: EntryHeader,
    bytes: u64,
}

impl ProgressTracker {
    /// Starts tracking and returns the metadata event.
    pub(crate) fn start(header: EntryHeader) -> (Self, ProgressEvent) {
        let event = ProgressEvent::new(header.clone(), 0);
        (Self { header, bytes: 0 }, event)
    }

    /// Records `written` more bytes and returns the cumulative event.
    pub(crate) fn advance(&mut self, written: usize) -> ProgressEvent {
        self.bytes = self.bytes.saturating_add(written as u64);
        ProgressEvent::new(self.header.clone(), self.bytes)
    }

    /// Bytes recorded so far.
    pub(crate) fn bytes(&self) -> u64 {
        self.bytes
    }
}

/// Formats bytes as a human-readable string using IEC units (KiB, MiB, GiB).
///
/// # Examples
///
/// ```rust
/// use tar_to_file::progress::format_bytes_iec;
///
/// assert_eq!(format_bytes_iec(0), "0 B");
/// assert_eq!(format_bytes_iec(1024), "1.0 KiB");
/// assert_eq!(format_bytes_iec(1048576), "1.0 MiB");
/// ```
pub fn format_bytes_iec(bytes: u64) -> String {
    let bytes_f64 = bytes as f64;
    if bytes_f64 < BYTES_KB {
        format!("{} B", bytes)
    } else if bytes_f64 < BYTES_MB {
        format!("{:.1} KiB", bytes_f64 / BYTES_KB)
    } else if bytes_f64 < BYTES_GB {
        format!("{:.1} MiB", bytes_f64 / BYTES_MB)
    } else {
        format!("{:.1} GiB", bytes_f64 / BYTES_GB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    fn header(size: u64) -> EntryHeader {
        EntryHeader::new("file.txt", size, EntryKind::File)
    }

    #[test]
    fn test_tracker_sequence() {
        let (mut tracker, first) = ProgressTracker::start(header(10));
        assert!(first.is_metadata());
        assert_eq!(first.header.name, "file.txt");

        assert_eq!(tracker.advance(4).bytes, 4);
        assert_eq!(tracker.advance(6).bytes, 10);
        assert_eq!(tracker.bytes(), 10);
    }

    #[test]
    fn test_percentage() {
        assert!((ProgressEvent::new(header(200), 50).percentage() - 25.0).abs() < 0.001);
        assert_eq!(ProgressEvent::new(header(0), 0).percentage(), 100.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes_iec(500), "500 B");
        assert_eq!(format_bytes_iec(1500), "1.5 KiB");
        assert_eq!(format_bytes_iec(1500 * 1024), "1.5 MiB");
        assert_eq!(format_bytes_iec(1500 * 1024 * 1024), "1.5 GiB");
    }
}
