//! Run-length decoding.

use unipress_core::{Error, Result};

use crate::compress::MIN_REPEAT_RUN;

/// Decode `src` into `dst`, returning the decoded length.
///
/// The decoded size is not recoverable from the encoded form without a
/// full scan, so callers size `dst` speculatively and retry on
/// [`Error::BufferTooSmall`]; the `required` field carries a lower bound
/// on the capacity needed.
pub fn decompress(dst: &mut [u8], src: &[u8]) -> Result<usize> {
    let mut pos = 0;
    let mut out = 0;

    while pos < src.len() {
        let ctrl = src[pos];
        pos += 1;

        if ctrl < 0x80 {
            let len = ctrl as usize + 1;
            if pos + len > src.len() {
                return Err(Error::corrupted_at("literal run past end of input", pos - 1));
            }
            if out + len > dst.len() {
                return Err(Error::buffer_too_small(out + len, dst.len()));
            }
            dst[out..out + len].copy_from_slice(&src[pos..pos + len]);
            pos += len;
            out += len;
        } else {
            let len = (ctrl - 0x80) as usize + MIN_REPEAT_RUN;
            if pos >= src.len() {
                return Err(Error::corrupted_at("repeat run missing value byte", pos - 1));
            }
            let value = src[pos];
            pos += 1;
            if out + len > dst.len() {
                return Err(Error::buffer_too_small(out + len, dst.len()));
            }
            dst[out..out + len].fill(value);
            out += len;
        }
    }

    Ok(out)
}
