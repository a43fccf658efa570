//! Zero-copy byte sources feeding the tokenizer.
//!
//! Input arrives as a sequence of borrowed buffers rather than one
//! materialized allocation, so arbitrarily large inputs never need to be
//! held in memory at once. The tokenizer pulls one buffer at a time and, on
//! teardown, returns the unread suffix of the last buffer so another reader
//! can resume from the exact byte position.

/// A stream of borrowed input buffers.
///
/// Buffers borrow from the underlying data (`'a`), not from the stream
/// handle, so the tokenizer can hold the current buffer while continuing to
/// pull from the stream.
pub trait ZeroCopyInput<'a> {
    /// Pull the next contiguous buffer of input.
    ///
    /// An empty slice signals end of stream or a read error; the tokenizer
    /// treats both the same way and stops pulling.
    fn next_buffer(&mut self) -> &'a [u8];

    /// Accept back the last `count` bytes of the most recently returned
    /// buffer. The tokenizer calls this on teardown with whatever it did
    /// not consume.
    fn back_up(&mut self, count: usize);
}

impl<'a, T: ZeroCopyInput<'a> + ?Sized> ZeroCopyInput<'a> for &mut T {
    fn next_buffer(&mut self) -> &'a [u8] {
        (**self).next_buffer()
    }

    fn back_up(&mut self, count: usize) {
        (**self).back_up(count);
    }
}

/// In-memory input that hands out its slice in fixed-size blocks.
///
/// A block size of 0 yields the whole remaining slice in one buffer. Small
/// block sizes force tokens to span buffer refills, which is how the refill
/// and recording paths get exercised in tests.
#[derive(Debug)]
pub struct SliceInput<'a> {
    data: &'a [u8],
    pos: usize,
    block_size: usize,
    backed_up: usize,
}

impl<'a> SliceInput<'a> {
    /// Input over `data`, delivered as a single buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_block_size(data, 0)
    }

    /// Input over `data`, delivered in buffers of at most `block_size`
    /// bytes (0 = unlimited).
    pub fn with_block_size(data: &'a [u8], block_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            block_size,
            backed_up: 0,
        }
    }

    /// Byte offset the next `next_buffer` call will read from.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total number of bytes returned through [`ZeroCopyInput::back_up`].
    pub fn bytes_backed_up(&self) -> usize {
        self.backed_up
    }
}

impl<'a> ZeroCopyInput<'a> for SliceInput<'a> {
    fn next_buffer(&mut self) -> &'a [u8] {
        let remaining = self.data.len() - self.pos;
        let take = if self.block_size == 0 {
            remaining
        } else {
            self.block_size.min(remaining)
        };
        let buffer = &self.data[self.pos..self.pos + take];
        self.pos += take;
        buffer
    }

    fn back_up(&mut self, count: usize) {
        debug_assert!(count <= self.pos, "cannot back up past the stream start");
        let count = count.min(self.pos);
        self.pos -= count;
        self.backed_up += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Whole-slice delivery ===

    #[test]
    fn single_buffer_when_unlimited() {
        let mut input = SliceInput::new(b"hello world");
        assert_eq!(input.next_buffer(), b"hello world");
        assert_eq!(input.next_buffer(), b"");
        assert_eq!(input.next_buffer(), b"");
    }

    #[test]
    fn empty_input_is_immediately_exhausted() {
        let mut input = SliceInput::new(b"");
        assert_eq!(input.next_buffer(), b"");
    }

    // === Block delivery ===

    #[test]
    fn blocks_of_fixed_size() {
        let mut input = SliceInput::with_block_size(b"abcdefg", 3);
        assert_eq!(input.next_buffer(), b"abc");
        assert_eq!(input.next_buffer(), b"def");
        assert_eq!(input.next_buffer(), b"g");
        assert_eq!(input.next_buffer(), b"");
    }

    #[test]
    fn block_size_one() {
        let mut input = SliceInput::with_block_size(b"ab", 1);
        assert_eq!(input.next_buffer(), b"a");
        assert_eq!(input.next_buffer(), b"b");
        assert_eq!(input.next_buffer(), b"");
    }

    // === Back-up ===

    #[test]
    fn back_up_rewinds_position() {
        let mut input = SliceInput::new(b"hello");
        let buffer = input.next_buffer();
        assert_eq!(buffer.len(), 5);
        assert_eq!(input.position(), 5);

        input.back_up(3);
        assert_eq!(input.position(), 2);
        assert_eq!(input.bytes_backed_up(), 3);
        assert_eq!(input.next_buffer(), b"llo");
    }

    #[test]
    fn back_up_through_reference() {
        let mut input = SliceInput::new(b"xy");
        {
            let mut by_ref: &mut SliceInput = &mut input;
            assert_eq!(by_ref.next_buffer(), b"xy");
            by_ref.back_up(1);
        }
        assert_eq!(input.position(), 1);
        assert_eq!(input.bytes_backed_up(), 1);
    }
}
