//! Byte streams exchanged with caller-supplied hooks.
//!
//! The pipeline moves bytes through boxed Tokio readers. Hooks that hand a
//! stream back to the pipeline return a [`Stream`], which records the
//! capabilities the stream offers so the pipeline can reject one that cannot
//! be read from.
//!
//! A [`Transform`] is a stream that is both writable and readable: it is fed
//! the bytes of an upstream reader and yields modified bytes. The
//! `tar_transform` option uses one to decompress the archive before it
//! reaches the tar parser.

use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};

/// An owned, type-erased async reader.
pub type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;

/// An owned, type-erased async writer.
pub type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// A stream together with the capabilities it offers.
pub enum Stream {
    /// A stream that can only be read from.
    Readable(BoxedReader),
    /// A stream that can only be written to.
    Writable(BoxedWriter),
    /// A stream that is written to and read from.
    Transform(Transform),
}

impl Stream {
    /// Wraps a reader.
    pub fn readable<R: AsyncRead + Send + 'static>(reader: R) -> Self {
        Self::Readable(Box::pin(reader))
    }

    /// Wraps a writer.
    pub fn writable<W: AsyncWrite + Send + 'static>(writer: W) -> Self {
        Self::Writable(Box::pin(writer))
    }

    /// Returns `true` if bytes can be read from this stream.
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Readable(_) | Self::Transform(_))
    }

    /// Returns `true` if bytes can be written to this stream.
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Writable(_) | Self::Transform(_))
    }

    /// Short description used in error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Readable(_) => "a readable stream",
            Self::Writable(_) => "a writable stream",
            Self::Transform(_) => "a transform stream",
        }
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Readable(_) => "Stream::Readable",
            Self::Writable(_) => "Stream::Writable",
            Self::Transform(_) => "Stream::Transform",
        })
    }
}

type TransformFn = Box<dyn FnOnce(BoxedReader) -> BoxedReader + Send>;

/// A readable and writable stream that rewrites bytes in transit.
///
/// # Example
///
/// ```rust
/// use tar_to_file::{Transform, stream::BoxedReader};
/// use tokio::io::BufReader;
///
/// // Pass-through transform that only adds buffering.
/// let transform = Transform::new(|upstream: BoxedReader| Box::pin(BufReader::new(upstream)));
/// # let _ = transform;
/// ```
pub struct Transform {
    apply: TransformFn,
}

impl Transform {
    /// Creates a transform from a function connecting it to its upstream.
    pub fn new<F>(apply: F) -> Self
    where
        F: FnOnce(BoxedReader) -> BoxedReader + Send + 'static,
    {
        Self {
            apply: Box::new(apply),
        }
    }

    /// Connects the transform to `upstream` and returns its readable side.
    pub fn apply(self, upstream: BoxedReader) -> BoxedReader {
        (self.apply)(upstream)
    }

    /// Gzip decompression.
    #[cfg(feature = "gzip")]
    #[cfg_attr(docsrs, doc(cfg(feature = "gzip")))]
    pub fn gzip() -> Self {
        Self::new(|upstream| {
            let mut decoder = async_compression::tokio::bufread::GzipDecoder::new(
                tokio::io::BufReader::new(upstream),
            );
            decoder.multiple_members(true);
            Box::pin(decoder)
        })
    }

    /// Zstandard decompression.
    #[cfg(feature = "zstd")]
    #[cfg_attr(docsrs, doc(cfg(feature = "zstd")))]
    pub fn zstd() -> Self {
        Self::new(|upstream| {
            Box::pin(async_compression::tokio::bufread::ZstdDecoder::new(
                tokio::io::BufReader::new(upstream),
            ))
        })
    }

    /// XZ decompression.
    #[cfg(feature = "xz")]
    #[cfg_attr(docsrs, doc(cfg(feature = "xz")))]
    pub fn xz() -> Self {
        Self::new(|upstream| {
            Box::pin(async_compression::tokio::bufread::XzDecoder::new(
                tokio::io::BufReader::new(upstream),
            ))
        })
    }

    /// BZip2 decompression.
    #[cfg(feature = "bzip2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "bzip2")))]
    pub fn bzip2() -> Self {
        Self::new(|upstream| {
            Box::pin(async_compression::tokio::bufread::BzDecoder::new(
                tokio::io::BufReader::new(upstream),
            ))
        })
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform").finish_non_exhaustive()
    }
}

impl From<Transform> for Stream {
    fn from(transform: Transform) -> Self {
        Self::Transform(transform)
    }
}
