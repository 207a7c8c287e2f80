//! # Unipress RLE
//!
//! Byte-oriented run-length codec.
//!
//! The encoded form is a sequence of control bytes: values below `0x80`
//! introduce a literal run of 1-128 bytes, values from `0x80` up repeat
//! the following byte 3-130 times. Runs shorter than three bytes are
//! folded into literals, so incompressible data costs one control byte
//! per 128 input bytes.
//!
//! The codec only exposes the one-shot pair - run-length decoding has no
//! natural incremental state here, so streaming callers go through the
//! core's buffering adapter.

pub mod codec;
pub mod compress;
pub mod decompress;

pub use codec::RleCodec;
