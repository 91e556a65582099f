//! The bounded undecoded input window.
//!
//! All input chunks land in a single growable byte window. A reader offset
//! tracks how far decoding has progressed; the consumed prefix is discarded
//! on the next `add`. The window never holds more than `undecoded_limit`
//! unread bytes.

use crate::ensure;
use crate::protocol::ParseError;
use bytes::{Buf, Bytes, BytesMut};

/// Buffered input with a reader offset and a bound on unread bytes.
///
/// Scan operations peek at the window without consuming; a partial decode
/// that comes up short restores the reader offset to its position on entry,
/// so no byte is lost across retries.
#[derive(Debug)]
pub(crate) struct InputBuffer {
    buf: BytesMut,
    reader: usize,
    undecoded_limit: usize,
}

impl InputBuffer {
    pub(crate) fn with_limit(undecoded_limit: usize) -> Self {
        Self { buf: BytesMut::new(), reader: 0, undecoded_limit }
    }

    /// Appends `chunk` to the window.
    ///
    /// Compacts first (discarding the consumed prefix), then refuses with
    /// `LimitExceeded` if appending would leave more than the configured
    /// limit unread. The offending chunk is dropped.
    pub(crate) fn add(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        self.compact();
        let unread = self.buf.len() + chunk.len();
        ensure!(unread <= self.undecoded_limit, ParseError::limit_exceeded(unread, self.undecoded_limit));
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    fn compact(&mut self) {
        if self.reader > 0 {
            self.buf.advance(self.reader);
            self.reader = 0;
        }
    }

    /// Free space under the limit, as seen by the next `add`
    pub(crate) fn room(&self) -> usize {
        self.undecoded_limit.saturating_sub(self.readable())
    }

    /// Number of unread bytes
    pub(crate) fn readable(&self) -> usize {
        self.buf.len() - self.reader
    }

    pub(crate) fn reader_offset(&self) -> usize {
        self.reader
    }

    pub(crate) fn set_reader_offset(&mut self, offset: usize) {
        debug_assert!(offset <= self.buf.len());
        self.reader = offset;
    }

    pub(crate) fn advance_reader(&mut self, n: usize) {
        debug_assert!(self.reader + n <= self.buf.len());
        self.reader += n;
    }

    #[allow(unused)]
    pub(crate) fn writer_offset(&self) -> usize {
        self.buf.len()
    }

    /// Byte at absolute offset `i`
    pub(crate) fn get(&self, i: usize) -> u8 {
        self.buf[i]
    }

    /// The unread bytes
    pub(crate) fn window(&self) -> &[u8] {
        &self.buf[self.reader..]
    }

    /// Detaches the next `n` unread bytes as an owned slice, advancing the
    /// reader past them.
    pub(crate) fn read_split(&mut self, n: usize) -> Bytes {
        debug_assert!(n <= self.readable());
        let mut head = self.buf.split_to(self.reader + n);
        head.advance(self.reader);
        self.reader = 0;
        head.freeze()
    }

    /// Releases all owned bytes
    pub(crate) fn release(&mut self) {
        self.buf = BytesMut::new();
        self.reader = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_read_split() {
        let mut buffer = InputBuffer::with_limit(16);
        buffer.add(b"hello world").unwrap();

        assert_eq!(buffer.readable(), 11);
        assert_eq!(buffer.window(), b"hello world");

        let head = buffer.read_split(5);
        assert_eq!(&head[..], b"hello");
        assert_eq!(buffer.window(), b" world");
        assert_eq!(buffer.readable(), 6);
    }

    #[test]
    fn compaction_frees_consumed_prefix() {
        let mut buffer = InputBuffer::with_limit(8);
        buffer.add(b"12345678").unwrap();
        buffer.advance_reader(6);

        // only 2 unread bytes remain, so 6 more fit after compaction
        buffer.add(b"abcdef").unwrap();
        assert_eq!(buffer.window(), b"78abcdef");
    }

    #[test]
    fn limit_exceeded_drops_chunk() {
        let mut buffer = InputBuffer::with_limit(4);
        buffer.add(b"1234").unwrap();

        let err = buffer.add(b"5").unwrap_err();
        assert!(matches!(err, ParseError::LimitExceeded { current_size: 5, limit: 4 }));

        // the window is untouched by the failed add
        assert_eq!(buffer.window(), b"1234");
    }

    #[test]
    fn restore_reader_offset() {
        let mut buffer = InputBuffer::with_limit(16);
        buffer.add(b"abc").unwrap();

        let entry = buffer.reader_offset();
        buffer.advance_reader(2);
        buffer.set_reader_offset(entry);
        assert_eq!(buffer.window(), b"abc");
    }

    #[test]
    fn release_drops_everything() {
        let mut buffer = InputBuffer::with_limit(16);
        buffer.add(b"abc").unwrap();
        buffer.release();
        assert_eq!(buffer.readable(), 0);
        assert_eq!(buffer.writer_offset(), 0);
    }
}
