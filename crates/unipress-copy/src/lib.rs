//! # Unipress Copy
//!
//! Pass-through codec: output is a byte-for-byte copy of input.
//!
//! Useful on incompressible data, as a baseline in benchmarks, and as
//! the reference implementation of the full codec contract - it supplies
//! the one-shot pair, exact size estimators, a native incremental
//! stream, and flush support.

use std::sync::Arc;

use unipress_core::{
    CodecImpl, CodecInfo, CodecOptions, CodecStream, Direction, Error, Operation, Result, Status,
    StreamIo,
};

/// The pass-through codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyCodec;

impl CopyCodec {
    /// Canonical registry name.
    pub const NAME: &'static str = "copy";

    /// Create the codec.
    pub fn new() -> Self {
        CopyCodec
    }
}

impl CodecImpl for CopyCodec {
    fn info(&self) -> CodecInfo {
        CodecInfo {
            can_flush: true,
            native_streaming: true,
        }
    }

    fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
        uncompressed_len
    }

    fn uncompressed_size(&self, compressed: &[u8]) -> Option<usize> {
        Some(compressed.len())
    }

    fn compress_buffer(
        &self,
        dst: &mut [u8],
        src: &[u8],
        _options: Option<&CodecOptions>,
    ) -> Result<usize> {
        if dst.len() < src.len() {
            return Err(Error::buffer_too_small(src.len(), dst.len()));
        }
        dst[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    fn decompress_buffer(
        &self,
        dst: &mut [u8],
        src: &[u8],
        options: Option<&CodecOptions>,
    ) -> Result<usize> {
        self.compress_buffer(dst, src, options)
    }

    fn create_stream(
        &self,
        _direction: Direction,
        _options: Option<Arc<CodecOptions>>,
    ) -> Result<Box<dyn CodecStream>> {
        Ok(Box::new(CopyStream))
    }
}

/// Native incremental stream for the pass-through codec.
///
/// Stateless: every operation copies `min(input, output)` bytes and
/// reports [`Status::Processing`] while input remains.
struct CopyStream;

impl CodecStream for CopyStream {
    fn process(&mut self, io: &mut StreamIo<'_, '_>, operation: Operation) -> Result<Status> {
        match operation {
            Operation::Process | Operation::Flush | Operation::Finish => {
                io.copy_through();
                if io.remaining_input().is_empty() {
                    Ok(Status::Complete)
                } else {
                    Ok(Status::Processing)
                }
            }
            Operation::Terminate => unreachable!("terminate passed to process entry point"),
        }
    }
}
