//! Buffering adapter for one-shot codecs.
//!
//! One-shot codecs require the complete input and a destination large
//! enough for the complete output; incremental callers supply neither.
//! [`BufferStream`] bridges the two: `Process` calls accumulate input
//! into a chunked buffer, the first `Finish` call runs the one-shot
//! function over everything at once, and subsequent `Finish` calls dole
//! the computed output out through the caller's windows.

use std::sync::Arc;

use tracing::debug;

use crate::buffer::ChunkedBuffer;
use crate::codec::{one_shot, Codec, CodecOptions};
use crate::error::{Error, Result};
use crate::stream::{CodecStream, Direction, Operation, Status, StreamIo};

/// Synthesizes the incremental stream contract on top of a codec that
/// only exposes whole-buffer compress/decompress functions.
///
/// Input is accumulated without backpressure: these codecs have no legal
/// granularity other than "everything", so memory grows to hold the
/// whole input before processing can begin.
pub struct BufferStream {
    codec: Arc<Codec>,
    direction: Direction,
    options: Option<Arc<CodecOptions>>,
    /// Accumulated caller input, pending the one-shot call.
    input: ChunkedBuffer,
    /// Computed output awaiting delivery; its read cursor is the
    /// delivery offset.
    output: ChunkedBuffer,
    /// Set once the one-shot call has run. Needed because a legal output
    /// may be zero-length.
    executed: bool,
}

impl BufferStream {
    pub(crate) fn new(
        codec: Arc<Codec>,
        direction: Direction,
        options: Option<Arc<CodecOptions>>,
    ) -> Self {
        Self {
            codec,
            direction,
            options,
            input: ChunkedBuffer::new(),
            output: ChunkedBuffer::new(),
            executed: false,
        }
    }

    /// Buffer whatever remains of the caller's input window.
    fn absorb_input(&mut self, io: &mut StreamIo<'_, '_>) {
        let n = {
            let input = io.remaining_input();
            self.input.append(input);
            input.len()
        };
        io.consume(n);
    }
}

impl CodecStream for BufferStream {
    fn process(&mut self, io: &mut StreamIo<'_, '_>, operation: Operation) -> Result<Status> {
        match operation {
            // No backpressure while accumulating: the whole window is
            // always absorbed, so Process is complete by definition.
            Operation::Process => {
                self.absorb_input(io);
                Ok(Status::Complete)
            }
            // A pure one-shot codec cannot emit mid-stream output; a
            // descriptor routed through this adapter must not advertise
            // flush support.
            Operation::Flush => Err(Error::unsupported("flush on a buffered stream")),
            Operation::Finish => {
                if !self.executed {
                    self.absorb_input(io);
                    let input_len = self.input.len();
                    let produced = {
                        let src = self.input.coalesce();
                        one_shot(&self.codec, self.direction, src, self.options.as_deref())
                    }?;
                    debug!(
                        codec = self.codec.name(),
                        input = input_len,
                        output = produced.len(),
                        "ran one-shot over accumulated input"
                    );
                    self.output = ChunkedBuffer::from_vec(produced);
                    self.executed = true;
                    self.input.clear();
                }
                let n = self.output.read_into(io.remaining_output());
                io.produce(n);
                if self.output.remaining() == 0 {
                    Ok(Status::Complete)
                } else if n > 0 {
                    Ok(Status::Processing)
                } else {
                    Ok(Status::BufferFull)
                }
            }
            Operation::Terminate => unreachable!("terminate passed to process entry point"),
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.input.clear();
        self.output.clear();
        self.executed = false;
        Ok(())
    }
}
