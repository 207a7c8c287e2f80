//! # Unipress Core
//!
//! Core buffers, traits, and the streaming state machine for the
//! unipress compression layer.
//!
//! Compression libraries disagree about calling conventions: some only
//! transform a single fully-buffered block, others stream incrementally.
//! This crate makes every codec look the same to callers (push bytes
//! in, pull bytes out, in windows of any size):
//!
//! - [`Codec`] / [`CodecImpl`] - per-algorithm descriptor and function
//!   table
//! - [`Stream`] - the uniform incremental interface
//! - [`BufferStream`] - adapter that synthesizes streaming on top of
//!   one-shot codecs
//! - [`ChunkedBuffer`] - reallocation-free accumulation buffer
//! - [`Registry`] - process-wide codec lookup
//!
//! ## Example
//!
//! ```ignore
//! use unipress_core::{Direction, Status};
//!
//! let codec = unipress_core::registry::get("rle")?;
//! let mut stream = codec.stream(Direction::Compress)?;
//!
//! let mut out = [0u8; 4096];
//! stream.process(data, &mut out)?;
//! loop {
//!     let progress = stream.finish(&mut out)?;
//!     sink.extend_from_slice(&out[..progress.produced]);
//!     if progress.status.is_complete() {
//!         break;
//!     }
//! }
//! ```

pub mod buffer;
pub mod buffer_stream;
pub mod codec;
pub mod error;
pub mod registry;
pub mod stream;

pub use buffer::{ChunkedBuffer, CHUNK_CAPACITY};
pub use buffer_stream::BufferStream;
pub use codec::{Codec, CodecImpl, CodecInfo, CodecOptions};
pub use error::{Error, Result};
pub use registry::Registry;
pub use stream::{
    CodecStream, Direction, Operation, Progress, Status, Stream, StreamIo, StreamState,
};
