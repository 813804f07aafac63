use bytes::{Buf, BytesMut};

use crate::codec::{RawFrame, CHECKSUM_LEN, HEADER_LEN, STX};

const INITIAL_BUFFER_CAPACITY: usize = 2 * 1024;

/// Resumable frame assembler for one inbound byte stream.
///
/// Feed it chunks of any size and alignment; it yields every complete
/// candidate frame and keeps the remainder for the next call. Bytes that
/// cannot start a frame are dropped one at a time, so a sync byte hidden
/// inside garbage is never skipped over.
#[derive(Debug)]
pub struct FrameAssembler {
    buf: BytesMut,
    skipped: u64,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            skipped: 0,
        }
    }

    /// Append `chunk` and return an iterator over the frames now available.
    ///
    /// The iterator is lazy. Frames it has not yielded when dropped stay
    /// buffered and come out of the next `feed`.
    pub fn feed(&mut self, chunk: &[u8]) -> Frames<'_> {
        self.buf.extend_from_slice(chunk);
        Frames { assembler: self }
    }

    /// Slice the next complete frame off the buffer, if there is one.
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            let first = *self.buf.first()?;

            if first != STX {
                self.buf.advance(1);
                self.skipped = self.skipped.saturating_add(1);
                tracing::trace!(byte = first, "resync: dropped non-sync byte");
                continue;
            }

            if self.buf.len() < HEADER_LEN {
                return None; // Need more data
            }

            let payload_len = usize::from(self.buf[1]);
            let total = HEADER_LEN + payload_len + CHECKSUM_LEN;
            if self.buf.len() < total {
                return None; // Need more data
            }

            return Some(RawFrame::new(self.buf.split_to(total).freeze()));
        }
    }

    /// Discard all buffered bytes.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Total bytes dropped while hunting for a sync byte.
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames available after one [`FrameAssembler::feed`].
#[derive(Debug)]
pub struct Frames<'a> {
    assembler: &'a mut FrameAssembler,
}

impl Iterator for Frames<'_> {
    type Item = RawFrame;

    fn next(&mut self) -> Option<RawFrame> {
        self.assembler.next_frame()
    }
}
