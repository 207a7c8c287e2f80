//! RLE codec (one-shot function table).

use unipress_core::{CodecImpl, CodecInfo, CodecOptions, Result};

use crate::compress;
use crate::decompress;

/// Run-length codec.
///
/// One-shot only: streaming callers are served through the core's
/// buffering adapter, so the descriptor advertises neither native
/// streaming nor flush support.
#[derive(Debug, Default, Clone, Copy)]
pub struct RleCodec;

impl RleCodec {
    /// Canonical registry name.
    pub const NAME: &'static str = "rle";

    /// Create the codec.
    pub fn new() -> Self {
        RleCodec
    }
}

impl CodecImpl for RleCodec {
    fn info(&self) -> CodecInfo {
        CodecInfo::default()
    }

    fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
        compress::max_compressed_len(uncompressed_len)
    }

    fn uncompressed_size(&self, _compressed: &[u8]) -> Option<usize> {
        // Unknowable without a full decode pass.
        None
    }

    fn compress_buffer(
        &self,
        dst: &mut [u8],
        src: &[u8],
        _options: Option<&CodecOptions>,
    ) -> Result<usize> {
        compress::compress(dst, src)
    }

    fn decompress_buffer(
        &self,
        dst: &mut [u8],
        src: &[u8],
        _options: Option<&CodecOptions>,
    ) -> Result<usize> {
        decompress::decompress(dst, src)
    }
}
