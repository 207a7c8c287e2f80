//! `std::io` bridges over incremental streams.
//!
//! [`StreamWriter`] compresses (or decompresses) everything written to
//! it and forwards the result to an inner writer; [`StreamReader`] pulls
//! compressed bytes from an inner reader and yields the transformed
//! bytes. Both work identically for natively-streaming and
//! adapter-backed codecs.

use std::io::{self, Read, Write};

use unipress_core::{Error, Stream};

/// Scratch window size for the bridges (64 KiB).
pub const DEFAULT_SCRATCH_SIZE: usize = 64 * 1024;

fn to_io_error(err: Error) -> io::Error {
    match err {
        Error::CorruptedData { .. } => io::Error::new(io::ErrorKind::InvalidData, err),
        _ => io::Error::other(err),
    }
}

/// A writer that pushes all written bytes through a [`Stream`] before
/// handing them to the inner writer.
///
/// Call [`finish`](StreamWriter::finish) when done; dropping the writer
/// without finishing loses any output the stream has not emitted yet.
pub struct StreamWriter<W: Write> {
    inner: W,
    stream: Stream,
    scratch: Vec<u8>,
}

impl<W: Write> StreamWriter<W> {
    /// Create a writer with the default scratch window.
    pub fn new(inner: W, stream: Stream) -> Self {
        Self::with_scratch_size(inner, stream, DEFAULT_SCRATCH_SIZE)
    }

    /// Create a writer with a custom scratch window size.
    pub fn with_scratch_size(inner: W, stream: Stream, scratch_size: usize) -> Self {
        Self {
            inner,
            stream,
            scratch: vec![0u8; scratch_size.max(1)],
        }
    }

    /// Get a reference to the inner writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Get a mutable reference to the inner writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// The underlying stream.
    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    /// Drain the stream's remaining output, flush the inner writer, and
    /// return it.
    pub fn finish(mut self) -> io::Result<W> {
        loop {
            let progress = self.stream.finish(&mut self.scratch).map_err(to_io_error)?;
            self.inner.write_all(&self.scratch[..progress.produced])?;
            if progress.status.is_complete() {
                break;
            }
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for StreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut consumed = 0;
        while consumed < buf.len() {
            let progress = self
                .stream
                .process(&buf[consumed..], &mut self.scratch)
                .map_err(to_io_error)?;
            self.inner.write_all(&self.scratch[..progress.produced])?;
            consumed += progress.consumed;
            if progress.consumed == 0 && progress.produced == 0 {
                return Err(io::Error::other("stream made no progress"));
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.stream.codec().can_flush() {
            loop {
                let progress = self.stream.flush(&mut self.scratch).map_err(to_io_error)?;
                self.inner.write_all(&self.scratch[..progress.produced])?;
                if progress.status.is_complete() {
                    break;
                }
            }
        }
        self.inner.flush()
    }
}

/// A reader that pulls bytes from an inner reader through a [`Stream`].
///
/// Reaches EOF once the inner reader is exhausted and the stream is
/// fully drained.
pub struct StreamReader<R: Read> {
    inner: R,
    stream: Stream,
    input: Vec<u8>,
    input_pos: usize,
    input_len: usize,
    eof: bool,
}

impl<R: Read> StreamReader<R> {
    /// Create a reader with the default scratch window.
    pub fn new(inner: R, stream: Stream) -> Self {
        Self::with_scratch_size(inner, stream, DEFAULT_SCRATCH_SIZE)
    }

    /// Create a reader with a custom input buffer size.
    pub fn with_scratch_size(inner: R, stream: Stream, scratch_size: usize) -> Self {
        Self {
            inner,
            stream,
            input: vec![0u8; scratch_size.max(1)],
            input_pos: 0,
            input_len: 0,
            eof: false,
        }
    }

    /// Get a reference to the inner reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the inner reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// The underlying stream.
    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    fn refill(&mut self) -> io::Result<()> {
        let n = self.inner.read(&mut self.input)?;
        self.input_pos = 0;
        self.input_len = n;
        if n == 0 {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for StreamReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.input_pos < self.input_len {
                let progress = self
                    .stream
                    .process(&self.input[self.input_pos..self.input_len], buf)
                    .map_err(to_io_error)?;
                self.input_pos += progress.consumed;
                if progress.produced > 0 {
                    return Ok(progress.produced);
                }
                continue;
            }
            if self.eof {
                let progress = self.stream.finish(buf).map_err(to_io_error)?;
                return Ok(progress.produced);
            }
            self.refill()?;
        }
    }
}
