//! Incremental streaming interface.
//!
//! Every codec is driven through the same small state machine regardless
//! of whether it streams natively or is adapted from a one-shot pair:
//!
//! ```text
//! Idle ──process──▶ Processing ──finish──▶ Finishing ──▶ Done
//!   ▲                                                      │
//!   └──────────────────────── reset ───────────────────────┘
//! ```
//!
//! Callers push input and pull output in windows of any size; a
//! [`Status`] tells them whether to keep going.

use std::sync::Arc;

use tracing::debug;

use crate::buffer_stream::BufferStream;
use crate::codec::{Codec, CodecOptions};
use crate::error::{Error, Result};

/// Direction of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Uncompressed bytes in, compressed bytes out.
    Compress,
    /// Compressed bytes in, uncompressed bytes out.
    Decompress,
}

impl Direction {
    /// Check whether this is the compression direction.
    #[inline]
    pub fn is_compress(self) -> bool {
        matches!(self, Direction::Compress)
    }
}

/// Operation verb passed to a stream backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Consume as much input as fits, produce as much output as fits.
    /// More input may follow.
    Process,
    /// Emit all processable output for data seen so far without ending
    /// the stream. Only valid when the codec advertises flush support.
    Flush,
    /// No more input will arrive; drain remaining output, possibly over
    /// several calls.
    Finish,
    /// Abort marker used for teardown. Never a legal argument to a
    /// backend's process entry point.
    Terminate,
}

/// Non-failure outcome of a stream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation's goal is fully satisfied: for `Process`, all input
    /// was consumed; for `Finish`, all output was delivered.
    Complete,
    /// Progress was made but more work remains; call again, typically
    /// with more input or a fresh output window.
    Processing,
    /// The output window had no room for progress; supply more space and
    /// retry.
    BufferFull,
}

impl Status {
    /// Check whether the operation is fully satisfied.
    #[inline]
    pub fn is_complete(self) -> bool {
        matches!(self, Status::Complete)
    }

    /// Check whether the caller should call again.
    #[inline]
    pub fn in_progress(self) -> bool {
        matches!(self, Status::Processing | Status::BufferFull)
    }
}

/// Lifecycle state of a [`Stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Just constructed or just reset.
    #[default]
    Idle,
    /// At least one process or flush call issued.
    Processing,
    /// A finish was issued and output is still being drained.
    Finishing,
    /// Finished and fully drained.
    Done,
    /// A backend reported an error; only reset is allowed.
    Failed,
}

impl StreamState {
    /// Check whether the stream is in a terminal state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, StreamState::Done | StreamState::Failed)
    }

    /// Check whether the stream can accept more input.
    #[inline]
    pub fn accepts_input(self) -> bool {
        matches!(self, StreamState::Idle | StreamState::Processing)
    }

    fn name(self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::Processing => "processing",
            StreamState::Finishing => "finishing",
            StreamState::Done => "done",
            StreamState::Failed => "failed",
        }
    }
}

/// The caller's input/output windows for a single stream call.
///
/// Both slices alias caller-owned memory and live only for the duration
/// of the call; backends advance the cursors and never retain them.
#[derive(Debug)]
pub struct StreamIo<'i, 'o> {
    input: &'i [u8],
    output: &'o mut [u8],
    consumed: usize,
    produced: usize,
}

impl<'i, 'o> StreamIo<'i, 'o> {
    /// Wrap a pair of caller windows.
    pub fn new(input: &'i [u8], output: &'o mut [u8]) -> Self {
        Self {
            input,
            output,
            consumed: 0,
            produced: 0,
        }
    }

    /// Unconsumed remainder of the input window.
    #[inline]
    pub fn remaining_input(&self) -> &[u8] {
        &self.input[self.consumed..]
    }

    /// Unfilled remainder of the output window.
    #[inline]
    pub fn remaining_output(&mut self) -> &mut [u8] {
        &mut self.output[self.produced..]
    }

    /// Bytes consumed from the input window so far.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes written to the output window so far.
    #[inline]
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Advance the input cursor by `n` bytes (clamped to the window).
    #[inline]
    pub fn consume(&mut self, n: usize) {
        self.consumed = (self.consumed + n).min(self.input.len());
    }

    /// Advance the output cursor by `n` bytes (clamped to the window).
    #[inline]
    pub fn produce(&mut self, n: usize) {
        self.produced = (self.produced + n).min(self.output.len());
    }

    /// Copy as much of `data` as fits into the output window and return
    /// the amount copied.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.output.len() - self.produced);
        self.output[self.produced..self.produced + n].copy_from_slice(&data[..n]);
        self.produced += n;
        n
    }

    /// Copy `min(remaining input, remaining output)` bytes straight from
    /// the input window to the output window, advancing both cursors.
    pub fn copy_through(&mut self) -> usize {
        let n = (self.input.len() - self.consumed).min(self.output.len() - self.produced);
        self.output[self.produced..self.produced + n]
            .copy_from_slice(&self.input[self.consumed..self.consumed + n]);
        self.consumed += n;
        self.produced += n;
        n
    }
}

/// Backend half of a stream: either a codec's native incremental
/// implementation or the [`BufferStream`] adapter.
///
/// Implementations must uphold the status contract: a `Process` call
/// that leaves input unconsumed returns [`Status::Processing`], never
/// [`Status::Complete`]. Passing [`Operation::Terminate`] is a contract
/// violation and must hit an unreachable path.
pub trait CodecStream: Send {
    /// Run one operation against the caller's windows.
    fn process(&mut self, io: &mut StreamIo<'_, '_>, operation: Operation) -> Result<Status>;

    /// Return the backend to its initial state for reuse.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Outcome of a single [`Stream`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes consumed from the caller's input window.
    pub consumed: usize,
    /// Bytes written to the caller's output window.
    pub produced: usize,
    /// What the call achieved.
    pub status: Status,
}

enum Backend {
    Native(Box<dyn CodecStream>),
    Buffered(BufferStream),
}

impl Backend {
    fn as_codec_stream(&mut self) -> &mut dyn CodecStream {
        match self {
            Backend::Native(stream) => stream.as_mut(),
            Backend::Buffered(stream) => stream,
        }
    }
}

/// An incremental compression or decompression stream.
///
/// Construction resolves the dispatch once: codecs with native streaming
/// get their own backend, all others are wrapped in the buffering
/// adapter. Callers cannot observe the difference.
pub struct Stream {
    codec: Arc<Codec>,
    direction: Direction,
    state: StreamState,
    backend: Backend,
    total_in: u64,
    total_out: u64,
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("direction", &self.direction)
            .field("state", &self.state)
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish_non_exhaustive()
    }
}

impl Stream {
    /// Create a stream for `codec` in the given direction.
    pub fn new(codec: Arc<Codec>, direction: Direction) -> Result<Self> {
        Self::with_options(codec, direction, None)
    }

    /// Create a stream, passing an opaque options object through to the
    /// codec. The core never inspects the options.
    pub fn with_options(
        codec: Arc<Codec>,
        direction: Direction,
        options: Option<Arc<CodecOptions>>,
    ) -> Result<Self> {
        let backend = if codec.has_native_streaming() {
            Backend::Native(codec.implementation().create_stream(direction, options)?)
        } else {
            Backend::Buffered(BufferStream::new(Arc::clone(&codec), direction, options))
        };
        debug!(
            codec = codec.name(),
            ?direction,
            native = codec.has_native_streaming(),
            "created stream"
        );
        Ok(Self {
            codec,
            direction,
            state: StreamState::Idle,
            backend,
            total_in: 0,
            total_out: 0,
        })
    }

    /// The codec backing this stream.
    pub fn codec(&self) -> &Arc<Codec> {
        &self.codec
    }

    /// The stream's direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Cumulative bytes consumed from callers' input windows.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Cumulative bytes written to callers' output windows.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Push input and pull output. Returns [`Status::Complete`] once all
    /// supplied input was consumed; more input may follow in later calls.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<Progress> {
        if !self.state.accepts_input() {
            return Err(Error::InvalidState {
                expected: "idle or processing",
                actual: self.state.name(),
            });
        }
        let progress = self.drive(input, output, Operation::Process)?;
        self.state = StreamState::Processing;
        Ok(progress)
    }

    /// Force out all processable output for the input seen so far,
    /// without ending the stream.
    pub fn flush(&mut self, output: &mut [u8]) -> Result<Progress> {
        if !self.codec.can_flush() {
            return Err(Error::unsupported(format!(
                "codec {:?} cannot flush",
                self.codec.name()
            )));
        }
        if !self.state.accepts_input() {
            return Err(Error::InvalidState {
                expected: "idle or processing",
                actual: self.state.name(),
            });
        }
        let progress = self.drive(&[], output, Operation::Flush)?;
        self.state = StreamState::Processing;
        Ok(progress)
    }

    /// Signal that no more input will arrive and drain remaining output.
    /// Call repeatedly until [`Status::Complete`]; once complete, further
    /// finish calls are no-ops.
    pub fn finish(&mut self, output: &mut [u8]) -> Result<Progress> {
        match self.state {
            StreamState::Done => Ok(Progress {
                consumed: 0,
                produced: 0,
                status: Status::Complete,
            }),
            StreamState::Failed => Err(Error::InvalidState {
                expected: "an unfailed stream",
                actual: self.state.name(),
            }),
            _ => {
                self.state = StreamState::Finishing;
                let progress = self.drive(&[], output, Operation::Finish)?;
                if progress.status.is_complete() {
                    self.state = StreamState::Done;
                }
                Ok(progress)
            }
        }
    }

    /// Discard all stream state and return to [`StreamState::Idle`].
    pub fn reset(&mut self) -> Result<()> {
        self.backend.as_codec_stream().reset()?;
        self.state = StreamState::Idle;
        self.total_in = 0;
        self.total_out = 0;
        Ok(())
    }

    fn drive(&mut self, input: &[u8], output: &mut [u8], operation: Operation) -> Result<Progress> {
        let mut io = StreamIo::new(input, output);
        match self.backend.as_codec_stream().process(&mut io, operation) {
            Ok(status) => {
                self.total_in += io.consumed() as u64;
                self.total_out += io.produced() as u64;
                Ok(Progress {
                    consumed: io.consumed(),
                    produced: io.produced(),
                    status,
                })
            }
            Err(err) => {
                self.state = StreamState::Failed;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecImpl, CodecInfo};

    // Pass-through codec with a native stream, in the shape real
    // streaming codecs use.
    struct Passthrough;

    struct PassthroughStream;

    impl CodecStream for PassthroughStream {
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

    impl CodecImpl for Passthrough {
        fn info(&self) -> CodecInfo {
            CodecInfo {
                can_flush: true,
                native_streaming: true,
            }
        }

        fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
            uncompressed_len
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
            Ok(Box::new(PassthroughStream))
        }
    }

    // One-shot codec that always reports corrupt input.
    struct Broken;

    impl CodecImpl for Broken {
        fn info(&self) -> CodecInfo {
            CodecInfo::default()
        }

        fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
            uncompressed_len
        }

        fn compress_buffer(
            &self,
            _dst: &mut [u8],
            _src: &[u8],
            _options: Option<&CodecOptions>,
        ) -> Result<usize> {
            Err(Error::corrupted("mangled header"))
        }

        fn decompress_buffer(
            &self,
            _dst: &mut [u8],
            _src: &[u8],
            _options: Option<&CodecOptions>,
        ) -> Result<usize> {
            Err(Error::corrupted("mangled header"))
        }
    }

    fn passthrough() -> Arc<Codec> {
        Arc::new(Codec::new("passthrough", Box::new(Passthrough)))
    }

    #[test]
    fn test_status_helpers() {
        assert!(Status::Complete.is_complete());
        assert!(!Status::Complete.in_progress());
        assert!(Status::Processing.in_progress());
        assert!(Status::BufferFull.in_progress());
    }

    #[test]
    fn test_state_helpers() {
        assert!(StreamState::Idle.accepts_input());
        assert!(StreamState::Processing.accepts_input());
        assert!(!StreamState::Finishing.accepts_input());
        assert!(StreamState::Done.is_terminal());
        assert!(StreamState::Failed.is_terminal());
    }

    #[test]
    fn test_stream_io_cursors() {
        let input = b"abcdef";
        let mut out = [0u8; 4];
        let mut io = StreamIo::new(input, &mut out);

        assert_eq!(io.copy_through(), 4);
        assert_eq!(io.consumed(), 4);
        assert_eq!(io.produced(), 4);
        assert_eq!(io.remaining_input(), b"ef");
        assert_eq!(&out, b"abcd");
    }

    #[test]
    fn test_stream_io_write_clamps() {
        let mut out = [0u8; 3];
        let mut io = StreamIo::new(&[], &mut out);
        assert_eq!(io.write(b"xyzzy"), 3);
        assert_eq!(io.write(b"!"), 0);
        assert_eq!(&out, b"xyz");
    }

    #[test]
    fn test_process_then_finish() {
        let mut stream = Stream::new(passthrough(), Direction::Compress).unwrap();
        let mut out = [0u8; 32];

        let progress = stream.process(b"hello", &mut out).unwrap();
        assert_eq!(progress.consumed, 5);
        assert_eq!(progress.produced, 5);
        assert_eq!(progress.status, Status::Complete);
        assert_eq!(stream.state(), StreamState::Processing);

        let progress = stream.finish(&mut out).unwrap();
        assert!(progress.status.is_complete());
        assert_eq!(stream.state(), StreamState::Done);
        assert_eq!(stream.total_in(), 5);
        assert_eq!(stream.total_out(), 5);
    }

    #[test]
    fn test_small_output_windows_report_processing() {
        let mut stream = Stream::new(passthrough(), Direction::Compress).unwrap();
        let input = b"0123456789";
        let mut window = [0u8; 4];
        let mut collected = Vec::new();
        let mut offset = 0;
        let mut statuses = Vec::new();

        while offset < input.len() {
            let progress = stream.process(&input[offset..], &mut window).unwrap();
            collected.extend_from_slice(&window[..progress.produced]);
            offset += progress.consumed;
            statuses.push(progress.status);
        }

        assert_eq!(
            statuses,
            [Status::Processing, Status::Processing, Status::Complete]
        );
        assert_eq!(collected, input);

        // A further call with no input left is a completed no-op.
        let progress = stream.process(&[], &mut window).unwrap();
        assert_eq!(progress.consumed, 0);
        assert_eq!(progress.status, Status::Complete);
    }

    #[test]
    fn test_process_after_finish_is_rejected() {
        let mut stream = Stream::new(passthrough(), Direction::Compress).unwrap();
        let mut out = [0u8; 8];
        stream.finish(&mut out).unwrap();

        let err = stream.process(b"late", &mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
        // Misuse does not poison the stream.
        assert_eq!(stream.state(), StreamState::Done);
    }

    #[test]
    fn test_finish_after_done_is_noop() {
        let mut stream = Stream::new(passthrough(), Direction::Compress).unwrap();
        let mut out = [0u8; 8];
        stream.process(b"ab", &mut out).unwrap();
        stream.finish(&mut out).unwrap();

        let progress = stream.finish(&mut out).unwrap();
        assert_eq!(progress.produced, 0);
        assert!(progress.status.is_complete());
    }

    #[test]
    fn test_flush_supported() {
        let mut stream = Stream::new(passthrough(), Direction::Compress).unwrap();
        let mut out = [0u8; 8];
        stream.process(b"ab", &mut out).unwrap();

        let progress = stream.flush(&mut out).unwrap();
        assert!(progress.status.is_complete());
        assert_eq!(stream.state(), StreamState::Processing);
    }

    #[test]
    fn test_flush_unsupported() {
        let codec = Arc::new(Codec::new("broken", Box::new(Broken)));
        let mut stream = Stream::new(codec, Direction::Compress).unwrap();
        let mut out = [0u8; 8];

        let err = stream.flush(&mut out).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_backend_error_poisons_stream() {
        let codec = Arc::new(Codec::new("broken", Box::new(Broken)));
        let mut stream = Stream::new(codec, Direction::Decompress).unwrap();
        let mut out = [0u8; 8];

        stream.process(b"junk", &mut out).unwrap();
        let err = stream.finish(&mut out).unwrap_err();
        assert!(matches!(err, Error::CorruptedData { .. }));
        assert_eq!(stream.state(), StreamState::Failed);

        let err = stream.finish(&mut out).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut stream = Stream::new(passthrough(), Direction::Compress).unwrap();
        let mut out = [0u8; 8];
        stream.process(b"abc", &mut out).unwrap();
        stream.finish(&mut out).unwrap();

        stream.reset().unwrap();
        assert_eq!(stream.state(), StreamState::Idle);
        assert_eq!(stream.total_in(), 0);

        let progress = stream.process(b"again", &mut out).unwrap();
        assert_eq!(progress.consumed, 5);
        assert_eq!(&out[..5], b"again");
    }

    #[test]
    fn test_stream_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Stream>();
    }

    #[test]
    #[should_panic(expected = "terminate")]
    fn test_terminate_is_unreachable() {
        let mut backend = PassthroughStream;
        let mut out = [0u8; 4];
        let mut io = StreamIo::new(b"x", &mut out);
        let _ = backend.process(&mut io, Operation::Terminate);
    }
}
