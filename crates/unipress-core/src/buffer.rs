//! Chunked accumulation buffers.
//!
//! [`ChunkedBuffer`] grows by whole chunks, so appending never moves bytes
//! that were already written. Reads go through a monotonic cursor and are
//! independent of append position, which lets one side fill the buffer
//! while the other drains it in arbitrarily sized windows.

/// Per-chunk bookkeeping allowance (header fields plus allocator slack).
const CHUNK_OVERHEAD: usize = 32;

/// Payload capacity of a freshly allocated chunk.
pub const CHUNK_CAPACITY: usize = 4096 - CHUNK_OVERHEAD;

/// A fixed-capacity byte block. Only the last chunk of a buffer may be
/// partially filled.
#[derive(Debug)]
struct Chunk {
    data: Box<[u8]>,
    used: usize,
}

impl Chunk {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            used: 0,
        }
    }

    /// Wrap an owned vector as a fully-used chunk without copying.
    fn from_vec(data: Vec<u8>) -> Self {
        let used = data.len();
        Self {
            data: data.into_boxed_slice(),
            used,
        }
    }

    #[inline]
    fn available(&self) -> usize {
        self.data.len() - self.used
    }

    #[inline]
    fn filled(&self) -> &[u8] {
        &self.data[..self.used]
    }
}

/// An append-only byte sequence stored as a chunk arena, with a separate
/// read cursor.
///
/// Chunks are addressed by index; growing the arena never relocates chunk
/// payloads. The read cursor `(chunk, offset)` advances monotonically and
/// is only reset by [`clear`](ChunkedBuffer::clear).
#[derive(Debug, Default)]
pub struct ChunkedBuffer {
    chunks: Vec<Chunk>,
    /// Total stored bytes; equals the sum of every chunk's used length.
    len: usize,
    /// Bytes already handed out through the read cursor.
    consumed: usize,
    cursor_chunk: usize,
    cursor_offset: usize,
}

impl ChunkedBuffer {
    /// Create an empty buffer. No chunks are allocated until the first
    /// append.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an owned vector as a single-chunk buffer without copying.
    pub fn from_vec(data: Vec<u8>) -> Self {
        if data.is_empty() {
            return Self::new();
        }
        let len = data.len();
        Self {
            chunks: vec![Chunk::from_vec(data)],
            len,
            consumed: 0,
            cursor_chunk: 0,
            cursor_offset: 0,
        }
    }

    /// Total bytes stored, regardless of how many have been read.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether the buffer holds no bytes at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes already delivered through the read cursor.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes stored but not yet delivered through the read cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.len - self.consumed
    }

    /// Number of chunks currently allocated.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Copy `bytes` into the tail chunk, allocating further chunks of
    /// [`CHUNK_CAPACITY`] as needed. Bytes already stored never move.
    pub fn append(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
        let mut rest = bytes;
        while !rest.is_empty() {
            let tail_full = match self.chunks.last() {
                Some(tail) => tail.available() == 0,
                None => true,
            };
            if tail_full {
                self.chunks.push(Chunk::with_capacity(CHUNK_CAPACITY));
            }
            if let Some(tail) = self.chunks.last_mut() {
                let take = rest.len().min(tail.available());
                tail.data[tail.used..tail.used + take].copy_from_slice(&rest[..take]);
                tail.used += take;
                rest = &rest[take..];
            }
        }
    }

    /// Copy up to `dest.len()` bytes starting at the read cursor into
    /// `dest`, advance the cursor, and return the amount copied (0 once
    /// the buffer is drained).
    pub fn read_into(&mut self, dest: &mut [u8]) -> usize {
        let mut copied = 0;
        while copied < dest.len() && self.cursor_chunk < self.chunks.len() {
            let chunk = &self.chunks[self.cursor_chunk];
            let avail = chunk.used - self.cursor_offset;
            if avail == 0 {
                if self.cursor_chunk + 1 < self.chunks.len() {
                    self.cursor_chunk += 1;
                    self.cursor_offset = 0;
                    continue;
                }
                break;
            }
            let take = (dest.len() - copied).min(avail);
            dest[copied..copied + take]
                .copy_from_slice(&chunk.data[self.cursor_offset..self.cursor_offset + take]);
            self.cursor_offset += take;
            copied += take;
        }
        self.consumed += copied;
        copied
    }

    /// Flatten the arena into a single contiguous chunk and return a view
    /// of all stored bytes. The read cursor keeps its logical position.
    ///
    /// No-op (and no copy) when the contents already fit in one chunk.
    pub fn coalesce(&mut self) -> &[u8] {
        if self.chunks.len() > 1 {
            let mut flat = Vec::with_capacity(self.len);
            for chunk in &self.chunks {
                flat.extend_from_slice(chunk.filled());
            }
            self.chunks.clear();
            self.chunks.push(Chunk::from_vec(flat));
            self.cursor_chunk = 0;
            self.cursor_offset = self.consumed;
        }
        match self.chunks.first() {
            Some(chunk) => chunk.filled(),
            None => &[],
        }
    }

    /// Release every chunk and reset the cursor.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
        self.consumed = 0;
        self.cursor_chunk = 0;
        self.cursor_offset = 0;
    }
}
