//! # Unipress
//!
//! Uniform streaming interface over heterogeneous compression codecs.
//!
//! Some compression libraries stream incrementally, others only
//! transform a single fully-buffered block. Unipress hides the
//! difference: every codec is driven through the same push-pull stream
//! interface, with one-shot codecs adapted transparently by an internal
//! buffering layer.
//!
//! This crate wires the built-in codecs into the process-wide registry
//! and re-exports the core types.
//!
//! ## Example
//!
//! ```
//! use unipress::Direction;
//!
//! let compressed = unipress::compress("rle", b"aaaaaaaaaaaabbbbb").unwrap();
//! let restored = unipress::decompress("rle", &compressed).unwrap();
//! assert_eq!(restored, b"aaaaaaaaaaaabbbbb");
//!
//! // The same data, incrementally:
//! let mut stream = unipress::stream("rle", Direction::Compress).unwrap();
//! let mut out = [0u8; 64];
//! stream.process(b"aaaaaaaaaaaabbbbb", &mut out).unwrap();
//! let progress = stream.finish(&mut out).unwrap();
//! assert_eq!(&out[..progress.produced], compressed.as_slice());
//! ```

pub mod io;

use std::sync::Arc;

use unipress_core::registry;

pub use unipress_core::{
    BufferStream, ChunkedBuffer, Codec, CodecImpl, CodecInfo, CodecOptions, CodecStream,
    Direction, Error, Operation, Progress, Registry, Result, Status, Stream, StreamIo,
    StreamState, CHUNK_CAPACITY,
};
pub use unipress_copy::CopyCodec;
pub use unipress_rle::RleCodec;

/// Build a registry holding the built-in codecs.
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(Codec::new(CopyCodec::NAME, Box::new(CopyCodec::new())));
    registry.register(Codec::new(RleCodec::NAME, Box::new(RleCodec::new())));
    registry
}

/// The process-wide registry, installing the built-in codecs on first
/// use. Install a custom [`Registry`] through
/// [`unipress_core::registry::install`] before the first call to
/// override the set of codecs.
pub fn global_registry() -> &'static Registry {
    registry::global_or_init(default_registry)
}

/// Look up a codec by name in the process-wide registry.
pub fn codec(name: &str) -> Result<Arc<Codec>> {
    global_registry().get(name)
}

/// One-shot compress with a named codec.
pub fn compress(codec_name: &str, input: &[u8]) -> Result<Vec<u8>> {
    codec(codec_name)?.compress(input)
}

/// One-shot decompress with a named codec.
pub fn decompress(codec_name: &str, input: &[u8]) -> Result<Vec<u8>> {
    codec(codec_name)?.decompress(input)
}

/// Open an incremental stream for a named codec.
pub fn stream(codec_name: &str, direction: Direction) -> Result<Stream> {
    codec(codec_name)?.stream(direction)
}
