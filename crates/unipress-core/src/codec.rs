//! Codec descriptors and the per-algorithm function table.
//!
//! A [`CodecImpl`] is the function table an algorithm supplies: the
//! mandatory one-shot pair plus size estimators, and optionally a native
//! stream constructor. The [`Codec`] descriptor wraps one implementation
//! with its name and capability flags and is shared process-wide as an
//! immutable `Arc`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::stream::{CodecStream, Direction, Stream};

/// Opaque per-codec options object.
///
/// The core passes options through to codec functions untouched; only
/// the codec that defined them downcasts and inspects them.
pub type CodecOptions = dyn Any + Send + Sync;

/// Capability flags advertised by a codec implementation.
///
/// Flags are fixed at registration; streams read them once at
/// construction to resolve dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecInfo {
    /// The codec can emit pending output mid-stream on demand.
    pub can_flush: bool,
    /// The codec supplies its own incremental stream; when set,
    /// [`CodecImpl::create_stream`] must succeed and the buffering
    /// adapter is bypassed entirely.
    pub native_streaming: bool,
}

/// Function table supplied by each compression algorithm.
pub trait CodecImpl: Send + Sync {
    /// Capability flags for this implementation.
    fn info(&self) -> CodecInfo;

    /// Worst-case compressed size for `uncompressed_len` input bytes.
    /// Used to size one-shot destination buffers.
    fn max_compressed_size(&self, uncompressed_len: usize) -> usize;

    /// Best-effort decompressed size of `compressed`.
    ///
    /// Advisory only: `None` when the size cannot be known without
    /// decoding, and even a `Some` value may prove insufficient. Callers
    /// must grow reactively.
    fn uncompressed_size(&self, _compressed: &[u8]) -> Option<usize> {
        None
    }

    /// Compress `src` into `dst` in one pass. Returns the number of
    /// bytes written, or [`Error::BufferTooSmall`] when `dst` cannot
    /// hold the result.
    fn compress_buffer(
        &self,
        dst: &mut [u8],
        src: &[u8],
        options: Option<&CodecOptions>,
    ) -> Result<usize>;

    /// Decompress `src` into `dst` in one pass. Same contract as
    /// [`compress_buffer`](CodecImpl::compress_buffer).
    fn decompress_buffer(
        &self,
        dst: &mut [u8],
        src: &[u8],
        options: Option<&CodecOptions>,
    ) -> Result<usize>;

    /// Construct a native incremental stream.
    ///
    /// Only called when [`CodecInfo::native_streaming`] is set; the
    /// default implementation reports the capability as missing.
    fn create_stream(
        &self,
        _direction: Direction,
        _options: Option<Arc<CodecOptions>>,
    ) -> Result<Box<dyn CodecStream>> {
        Err(Error::unsupported("native streaming"))
    }
}

/// Immutable descriptor binding a codec name to its function table.
pub struct Codec {
    name: String,
    info: CodecInfo,
    imp: Box<dyn CodecImpl>,
}

impl Codec {
    /// Create a descriptor. The capability flags are read from the
    /// implementation once and never change afterwards.
    pub fn new(name: impl Into<String>, imp: Box<dyn CodecImpl>) -> Self {
        let info = imp.info();
        Self {
            name: name.into(),
            info,
            imp,
        }
    }

    /// The codec's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capability flags.
    pub fn info(&self) -> CodecInfo {
        self.info
    }

    /// Whether this codec can emit pending output mid-stream.
    #[inline]
    pub fn can_flush(&self) -> bool {
        self.info.can_flush
    }

    /// Whether this codec supplies its own incremental stream.
    #[inline]
    pub fn has_native_streaming(&self) -> bool {
        self.info.native_streaming
    }

    /// Direct access to the function table.
    pub fn implementation(&self) -> &dyn CodecImpl {
        self.imp.as_ref()
    }

    /// Worst-case compressed size for `uncompressed_len` input bytes.
    pub fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
        self.imp.max_compressed_size(uncompressed_len)
    }

    /// Best-effort decompressed size of `compressed`; advisory only.
    pub fn uncompressed_size(&self, compressed: &[u8]) -> Option<usize> {
        self.imp.uncompressed_size(compressed)
    }

    /// One-shot compress into a caller buffer. Returns bytes written.
    pub fn compress_to(&self, dst: &mut [u8], src: &[u8]) -> Result<usize> {
        self.imp.compress_buffer(dst, src, None)
    }

    /// One-shot decompress into a caller buffer. Returns bytes written.
    pub fn decompress_to(&self, dst: &mut [u8], src: &[u8]) -> Result<usize> {
        self.imp.decompress_buffer(dst, src, None)
    }

    /// One-shot compress into a freshly allocated vector.
    pub fn compress(&self, src: &[u8]) -> Result<Vec<u8>> {
        one_shot(self, Direction::Compress, src, None)
    }

    /// One-shot decompress into a freshly allocated vector, growing the
    /// destination until the codec accepts it.
    pub fn decompress(&self, src: &[u8]) -> Result<Vec<u8>> {
        one_shot(self, Direction::Decompress, src, None)
    }

    /// Open an incremental stream for this codec.
    pub fn stream(self: Arc<Self>, direction: Direction) -> Result<Stream> {
        Stream::new(self, direction)
    }

    /// Open an incremental stream with an opaque options object.
    pub fn stream_with_options(
        self: Arc<Self>,
        direction: Direction,
        options: Option<Arc<CodecOptions>>,
    ) -> Result<Stream> {
        Stream::with_options(self, direction, options)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("name", &self.name)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Ceiling for scratch-estimate growth in the retry loop.
const MAX_ONE_SHOT_CAPACITY: usize = usize::MAX >> 2;

/// Floor for scratch estimates, so a zero or bogus estimate still makes
/// progress when retried.
const MIN_ONE_SHOT_CAPACITY: usize = 64;

/// Run a codec's one-shot function over `src`, sizing the destination
/// from the codec's estimators and growing it reactively on
/// [`Error::BufferTooSmall`].
///
/// Undersized-scratch failures are internal to this loop and never reach
/// the caller; any other error propagates unchanged. The loop is bounded
/// by doubling up to [`MAX_ONE_SHOT_CAPACITY`].
pub(crate) fn one_shot(
    codec: &Codec,
    direction: Direction,
    src: &[u8],
    options: Option<&CodecOptions>,
) -> Result<Vec<u8>> {
    let mut capacity = match direction {
        Direction::Compress => codec.max_compressed_size(src.len()),
        Direction::Decompress => codec
            .uncompressed_size(src)
            .unwrap_or_else(|| src.len().saturating_mul(4).max(MIN_ONE_SHOT_CAPACITY)),
    };
    loop {
        let mut scratch = vec![0u8; capacity];
        let result = match direction {
            Direction::Compress => codec.imp.compress_buffer(&mut scratch, src, options),
            Direction::Decompress => codec.imp.decompress_buffer(&mut scratch, src, options),
        };
        match result {
            Ok(written) => {
                scratch.truncate(written);
                return Ok(scratch);
            }
            Err(Error::BufferTooSmall { required, .. }) if capacity < MAX_ONE_SHOT_CAPACITY => {
                let grown = required
                    .max(capacity.saturating_mul(2))
                    .max(MIN_ONE_SHOT_CAPACITY)
                    .min(MAX_ONE_SHOT_CAPACITY);
                debug!(
                    codec = codec.name(),
                    capacity, grown, "one-shot scratch undersized, growing estimate"
                );
                capacity = grown;
            }
            Err(err) => return Err(err),
        }
    }
}
