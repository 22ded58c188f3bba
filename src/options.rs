//! Extraction options.
//!
//! [`ExtractOptions`] holds the three hooks a caller can plug into the
//! pipeline. Each hook is optional:
//!
//! - `map` rewrites every entry header before the single-entry check,
//! - `map_stream` replaces the accepted entry's content stream,
//! - `tar_transform` rewrites the raw archive bytes before parsing.

use std::sync::Arc;

use crate::entry::EntryHeader;
use crate::stream::{BoxedReader, Stream, Transform};

/// Option name of the header mapper.
pub const MAP: &str = "map";
/// Option name of the content stream mapper.
pub const MAP_STREAM: &str = "mapStream";
/// Option name of the raw archive transform.
pub const TAR_TRANSFORM: &str = "tarTransform";

/// Header mapping hook.
pub type MapFn = Arc<dyn Fn(EntryHeader) -> EntryHeader + Send + Sync>;

/// Content stream mapping hook.
///
/// Receives the entry's content reader and its (mapped) header and returns
/// the stream whose bytes are written to the destination.
pub type MapStreamFn = Arc<dyn Fn(BoxedReader, &EntryHeader) -> Stream + Send + Sync>;

/// Options for a single-file extraction.
#[derive(Default)]
pub struct ExtractOptions {
    /// Header mapping hook.
    pub map: Option<MapFn>,
    /// Content stream mapping hook.
    pub map_stream: Option<MapStreamFn>,
    /// Transform applied to the archive bytes before tar parsing.
    pub tar_transform: Option<Transform>,
}

impl std::fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("has_map", &self.map.is_some())
            .field("has_map_stream", &self.map_stream.is_some())
            .field("has_tar_transform", &self.tar_transform.is_some())
            .finish()
    }
}

impl ExtractOptions {
    /// Creates options with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the header mapping hook.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tar_to_file::ExtractOptions;
    ///
    /// let options = ExtractOptions::new().map(|mut header| {
    ///     header.name = header.name.replace("original", "renamed");
    ///     header
    /// });
    /// # let _ = options;
    /// ```
    pub fn map<F>(mut self, f: F) -> Self
    where
        F: Fn(EntryHeader) -> EntryHeader + Send + Sync + 'static,
    {
        self.map = Some(Arc::new(f));
        self
    }

    /// Sets the content stream mapping hook.
    pub fn map_stream<F>(mut self, f: F) -> Self
    where
        F: Fn(BoxedReader, &EntryHeader) -> Stream + Send + Sync + 'static,
    {
        self.map_stream = Some(Arc::new(f));
        self
    }

    /// Sets the transform applied to the archive bytes before parsing.
    pub fn tar_transform(mut self, transform: Transform) -> Self {
        self.tar_transform = Some(transform);
        self
    }

    /// Returns `true` if no hook is configured.
    pub fn is_empty(&self) -> bool {
        self.map.is_none() && self.map_stream.is_none() && self.tar_transform.is_none()
    }

    pub(crate) fn apply_map(&self, header: EntryHeader) -> EntryHeader {
        match &self.map {
            Some(map) => map(header),
            None => header,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    #[test]
    fn test_extract_options_default() {
        let options = ExtractOptions::default();
        assert!(options.is_empty());
        assert!(options.map.is_none());
        assert!(options.map_stream.is_none());
        assert!(options.tar_transform.is_none());
    }

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .map(|header| header)
            .map_stream(|reader, _| Stream::Readable(reader))
            .tar_transform(Transform::new(|upstream| upstream));

        assert!(!options.is_empty());
        let debug = format!("{:?}", options);
        assert!(debug.contains("has_map: true"));
        assert!(debug.contains("has_tar_transform: true"));
    }

    #[test]
    fn test_apply_map() {
        let header = EntryHeader::new("original.txt", 1, EntryKind::File);
        assert_eq!(ExtractOptions::new().apply_map(header.clone()), header);

        let options = ExtractOptions::new().map(|mut header| {
            header.name = header.name.replace("original", "renamed");
            header
        });
        assert_eq!(options.apply_map(header).name, "renamed.txt");
    }
}
