//! Buffered input cursor with display-column tracking and byte recording.
//!
//! The cursor pulls one buffer at a time from a [`ZeroCopyInput`] and
//! advances byte-by-byte, refilling transparently when a buffer is
//! exhausted. `current()` reports `0x00` at end of input or after a read
//! error; interior NUL bytes also read as `0x00` but leave the read-error
//! flag clear, so callers can tell the two apart.
//!
//! # Recording
//!
//! Between `start_recording` and `stop_recording`, every byte the cursor
//! consumes is captured. While the window stays inside one buffer no bytes
//! are copied until `stop_recording` slices them out; when a refill happens
//! mid-window, the tail `[record_start, buffer_end)` of the outgoing buffer
//! is flushed to a pending store first. The concatenation of flushed
//! segments always equals the exact byte sequence consumed in the window.
//!
//! # Columns
//!
//! Columns are zero-based display columns: most bytes advance the column by
//! one, a tab advances to the next multiple of 8, and a newline resets the
//! column to zero and bumps the line. Bulk skipping (memchr fast paths)
//! therefore stops at every tab and handles it through the per-byte path.

use crate::input::ZeroCopyInput;

/// Display width of a tab stop.
const TAB_WIDTH: u32 = 8;

/// Returns the earliest (minimum) of two optional positions.
///
/// Combines results from separate memchr calls when the stop set is larger
/// than the 3 needles `memchr3` supports.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Cursor over a stream of borrowed buffers.
///
/// Invariant: once construction finishes, an empty `buffer` implies the
/// read-error flag is set; every successful refill installs a non-empty
/// buffer.
pub(crate) struct InputCursor<'a, I> {
    input: I,
    /// The buffer currently being consumed.
    buffer: &'a [u8],
    /// Index of the current byte within `buffer`.
    pos: usize,
    /// Byte at `pos`, or `0x00` at end of input / after a read error.
    current: u8,
    /// Zero-based line of the current byte.
    line: u32,
    /// Zero-based display column of the current byte.
    column: u32,
    /// Set once the stream returns an empty buffer; never cleared.
    read_error: bool,
    /// Whether `buffer` came from the stream (as opposed to the initial
    /// in-memory buffer). Only stream buffers are handed back on teardown.
    buffer_from_input: bool,
    recording: bool,
    /// Start of the not-yet-flushed recording segment within `buffer`.
    record_start: usize,
    /// Recorded segments from buffers that have already been dropped.
    pending: Vec<u8>,
}

impl<'a, I: ZeroCopyInput<'a>> InputCursor<'a, I> {
    /// Create a cursor over `initial` (consumed first, if given) followed
    /// by whatever `input` yields.
    pub(crate) fn new(initial: Option<&'a [u8]>, input: I) -> Self {
        let mut cursor = Self {
            input,
            buffer: &[],
            pos: 0,
            current: 0,
            line: 0,
            column: 0,
            read_error: false,
            buffer_from_input: false,
            recording: false,
            record_start: 0,
            pending: Vec::new(),
        };
        match initial {
            Some(buffer) if !buffer.is_empty() => {
                cursor.buffer = buffer;
                cursor.current = buffer[0];
            }
            _ => cursor.refresh(),
        }
        cursor
    }

    /// The current byte; `0x00` at end of input or after a read error.
    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.current
    }

    /// Zero-based line of the current byte.
    #[inline]
    pub(crate) fn line(&self) -> u32 {
        self.line
    }

    /// Zero-based display column of the current byte.
    #[inline]
    pub(crate) fn column(&self) -> u32 {
        self.column
    }

    /// True once the stream has been exhausted (or failed).
    #[inline]
    pub(crate) fn read_error(&self) -> bool {
        self.read_error
    }

    /// Commit the current byte to position tracking and step to the next
    /// one, refilling if this buffer is exhausted.
    pub(crate) fn advance(&mut self) {
        match self.current {
            b'\n' => {
                self.line += 1;
                self.column = 0;
            }
            b'\t' => self.column += TAB_WIDTH - self.column % TAB_WIDTH,
            _ => self.column += 1,
        }
        self.pos += 1;
        if self.pos < self.buffer.len() {
            self.current = self.buffer[self.pos];
        } else {
            self.refresh();
        }
    }

    /// Drop the exhausted buffer and pull the next one from the stream.
    fn refresh(&mut self) {
        if self.read_error {
            self.pos = 0;
            self.current = 0;
            return;
        }
        // Flush the recorded tail of the outgoing buffer before dropping it.
        if self.recording {
            if self.record_start < self.buffer.len() {
                self.pending
                    .extend_from_slice(&self.buffer[self.record_start..]);
            }
            self.record_start = 0;
        }
        self.buffer = &[];
        self.pos = 0;
        let next = self.input.next_buffer();
        if next.is_empty() {
            self.read_error = true;
            self.current = 0;
        } else {
            self.buffer = next;
            self.buffer_from_input = true;
            self.current = next[0];
        }
    }

    /// Begin capturing consumed bytes. At most one window may be active.
    pub(crate) fn start_recording(&mut self) {
        debug_assert!(!self.recording, "nested recording windows are not supported");
        self.recording = true;
        self.record_start = self.pos;
    }

    /// End the capture window, appending the recorded bytes to `out`.
    pub(crate) fn stop_recording(&mut self, out: &mut Vec<u8>) {
        debug_assert!(self.recording, "stop_recording without start_recording");
        self.recording = false;
        out.append(&mut self.pending);
        out.extend_from_slice(&self.buffer[self.record_start..self.pos]);
    }

    /// Return the unread suffix of the current buffer to the stream.
    ///
    /// Called on tokenizer teardown. Only buffers that actually came from
    /// the stream are handed back; the caller-provided initial buffer is
    /// not the stream's to take.
    pub(crate) fn return_unread(&mut self) {
        if self.buffer_from_input && self.pos < self.buffer.len() {
            self.input.back_up(self.buffer.len() - self.pos);
        }
    }

    /// Advance over `n` plain bytes. The caller guarantees none of them is
    /// a tab, newline, or NUL, so the column advances one per byte.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "n is bounded by the buffer length, far below u32::MAX columns"
    )]
    fn bulk_advance(&mut self, n: usize) {
        self.column += n as u32;
        self.pos += n;
        if self.pos < self.buffer.len() {
            self.current = self.buffer[self.pos];
        } else {
            self.refresh();
        }
    }

    /// Skip ordinary string-literal content up to the next byte the string
    /// recognizer must inspect: `delimiter`, `\`, `\n`, or NUL. Tabs are
    /// consumed through the per-byte path for column arithmetic; everything
    /// else is skipped in bulk via memchr.
    pub(crate) fn skip_to_string_delim(&mut self, delimiter: u8) {
        loop {
            if self.current == delimiter || matches!(self.current, b'\\' | b'\n' | 0) {
                return;
            }
            let rest = &self.buffer[self.pos..];
            let primary = memchr::memchr3(delimiter, b'\\', b'\n', rest);
            let secondary = memchr::memchr2(b'\t', 0, rest);
            match earliest_of(primary, secondary) {
                Some(offset) => {
                    self.bulk_advance(offset);
                    if self.current == b'\t' {
                        self.advance();
                    } else {
                        return;
                    }
                }
                None => {
                    self.bulk_advance(rest.len());
                    if self.read_error {
                        return;
                    }
                }
            }
        }
    }

    /// Skip line-comment content up to the terminating `\n` or NUL.
    pub(crate) fn skip_to_line_end(&mut self) {
        loop {
            if matches!(self.current, b'\n' | 0) {
                return;
            }
            let rest = &self.buffer[self.pos..];
            match memchr::memchr3(b'\n', b'\t', 0, rest) {
                Some(offset) => {
                    self.bulk_advance(offset);
                    if self.current == b'\t' {
                        self.advance();
                    } else {
                        return;
                    }
                }
                None => {
                    self.bulk_advance(rest.len());
                    if self.read_error {
                        return;
                    }
                }
            }
        }
    }

    /// Skip block-comment content up to the next `*`, `/`, `\n`, or NUL.
    pub(crate) fn skip_to_block_delim(&mut self) {
        loop {
            if matches!(self.current, b'*' | b'/' | b'\n' | 0) {
                return;
            }
            let rest = &self.buffer[self.pos..];
            let primary = memchr::memchr3(b'*', b'/', b'\n', rest);
            let secondary = memchr::memchr2(b'\t', 0, rest);
            match earliest_of(primary, secondary) {
                Some(offset) => {
                    self.bulk_advance(offset);
                    if self.current == b'\t' {
                        self.advance();
                    } else {
                        return;
                    }
                }
                None => {
                    self.bulk_advance(rest.len());
                    if self.read_error {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SliceInput;

    fn cursor(source: &[u8]) -> InputCursor<'_, SliceInput<'_>> {
        InputCursor::new(None, SliceInput::new(source))
    }

    fn cursor_blocks(source: &[u8], block_size: usize) -> InputCursor<'_, SliceInput<'_>> {
        InputCursor::new(None, SliceInput::with_block_size(source, block_size))
    }

    /// Drain the cursor, returning every byte it reported as current.
    fn drain<'a>(cursor: &mut InputCursor<'a, SliceInput<'a>>) -> Vec<u8> {
        let mut out = Vec::new();
        while !cursor.read_error() {
            out.push(cursor.current());
            cursor.advance();
        }
        out
    }

    // === Basic navigation ===

    #[test]
    fn reads_bytes_in_order() {
        let mut c = cursor(b"abc");
        assert_eq!(c.current(), b'a');
        c.advance();
        assert_eq!(c.current(), b'b');
        c.advance();
        assert_eq!(c.current(), b'c');
        c.advance();
        assert_eq!(c.current(), 0);
        assert!(c.read_error());
    }

    #[test]
    fn empty_input_is_immediately_at_end() {
        let c = cursor(b"");
        assert_eq!(c.current(), 0);
        assert!(c.read_error());
    }

    #[test]
    fn refills_across_single_byte_blocks() {
        let mut c = cursor_blocks(b"hello", 1);
        assert_eq!(drain(&mut c), b"hello");
    }

    #[test]
    fn interior_null_reads_as_zero_without_read_error() {
        let mut c = cursor(b"a\0b");
        c.advance();
        assert_eq!(c.current(), 0);
        assert!(!c.read_error());
        c.advance();
        assert_eq!(c.current(), b'b');
    }

    // === Initial buffer ===

    #[test]
    fn initial_buffer_is_consumed_before_the_stream() {
        let mut c = InputCursor::new(Some(b"ab"), SliceInput::new(b"cd"));
        assert_eq!(drain(&mut c), b"abcd");
    }

    #[test]
    fn empty_initial_buffer_falls_through_to_stream() {
        let mut c = InputCursor::new(Some(b""), SliceInput::new(b"xy"));
        assert_eq!(drain(&mut c), b"xy");
    }

    // === Line and column tracking ===

    #[test]
    fn newline_resets_column_and_bumps_line() {
        let mut c = cursor(b"ab\ncd");
        assert_eq!((c.line(), c.column()), (0, 0));
        c.advance();
        c.advance();
        assert_eq!((c.line(), c.column()), (0, 2));
        c.advance(); // consume '\n'
        assert_eq!((c.line(), c.column()), (1, 0));
        c.advance();
        assert_eq!((c.line(), c.column()), (1, 1));
    }

    #[test]
    fn tab_advances_to_next_tab_stop() {
        let mut c = cursor(b"\tx");
        c.advance();
        assert_eq!(c.column(), 8);

        let mut c = cursor(b"ab\tx");
        c.advance();
        c.advance();
        assert_eq!(c.column(), 2);
        c.advance(); // tab from column 2
        assert_eq!(c.column(), 8);
    }

    #[test]
    fn tab_at_tab_stop_advances_full_width() {
        let mut c = cursor(b"12345678\tx");
        for _ in 0..8 {
            c.advance();
        }
        assert_eq!(c.column(), 8);
        c.advance();
        assert_eq!(c.column(), 16);
    }

    // === Recording ===

    #[test]
    fn records_within_one_buffer() {
        let mut c = cursor(b"hello world");
        c.advance(); // 'h' not recorded
        c.start_recording();
        for _ in 0..4 {
            c.advance();
        }
        let mut out = Vec::new();
        c.stop_recording(&mut out);
        assert_eq!(out, b"ello");
    }

    #[test]
    fn records_across_refills() {
        for block_size in [1, 2, 3] {
            let mut c = cursor_blocks(b"abcdef", block_size);
            c.start_recording();
            for _ in 0..6 {
                c.advance();
            }
            let mut out = Vec::new();
            c.stop_recording(&mut out);
            assert_eq!(out, b"abcdef", "block size {block_size}");
        }
    }

    #[test]
    fn stop_recording_appends_to_existing_content() {
        let mut c = cursor(b"abcd");
        let mut out = Vec::new();

        c.start_recording();
        c.advance();
        c.advance();
        c.stop_recording(&mut out);

        c.start_recording();
        c.advance();
        c.stop_recording(&mut out);

        assert_eq!(out, b"abc");
    }

    #[test]
    fn recording_survives_end_of_input() {
        let mut c = cursor_blocks(b"ab", 1);
        c.start_recording();
        c.advance();
        c.advance();
        assert!(c.read_error());
        let mut out = Vec::new();
        c.stop_recording(&mut out);
        assert_eq!(out, b"ab");
    }

    // === Bulk skipping ===

    #[test]
    fn skip_to_string_delim_stops_at_interesting_bytes() {
        for (source, stop) in [
            (&b"plain\"rest"[..], b'"'),
            (b"plain\\rest", b'\\'),
            (b"plain\nrest", b'\n'),
            (b"plain\0rest", 0),
        ] {
            let mut c = cursor(source);
            c.skip_to_string_delim(b'"');
            assert_eq!(c.current(), stop, "source {source:?}");
            assert_eq!(c.column(), 5);
        }
    }

    #[test]
    fn skip_to_string_delim_honors_alternate_delimiter() {
        let mut c = cursor(b"abc'rest");
        c.skip_to_string_delim(b'\'');
        assert_eq!(c.current(), b'\'');
        assert_eq!(c.column(), 3);
    }

    #[test]
    fn skip_to_string_delim_expands_tabs() {
        let mut c = cursor(b"a\tb\"x");
        c.skip_to_string_delim(b'"');
        assert_eq!(c.current(), b'"');
        // 'a' -> column 1, tab -> column 8, 'b' -> column 9.
        assert_eq!(c.column(), 9);
    }

    #[test]
    fn skip_to_string_delim_reaches_end_of_input() {
        let mut c = cursor(b"no delimiter here");
        c.skip_to_string_delim(b'"');
        assert_eq!(c.current(), 0);
        assert!(c.read_error());
    }

    #[test]
    fn skip_to_string_delim_spans_refills() {
        for block_size in [1, 2, 3] {
            let mut c = cursor_blocks(b"abcdefgh\"x", block_size);
            c.skip_to_string_delim(b'"');
            assert_eq!(c.current(), b'"', "block size {block_size}");
            assert_eq!(c.column(), 8);
        }
    }

    #[test]
    fn skip_to_line_end_stops_at_newline_or_end() {
        let mut c = cursor(b"comment text\nnext");
        c.skip_to_line_end();
        assert_eq!(c.current(), b'\n');
        assert_eq!(c.column(), 12);

        let mut c = cursor(b"no newline");
        c.skip_to_line_end();
        assert_eq!(c.current(), 0);
    }

    #[test]
    fn skip_to_line_end_expands_tabs() {
        let mut c = cursor(b"a\tb\nx");
        c.skip_to_line_end();
        assert_eq!(c.current(), b'\n');
        assert_eq!(c.column(), 9);
    }

    #[test]
    fn skip_to_block_delim_stops_at_each_delimiter() {
        for (source, stop) in [
            (&b"text*rest"[..], b'*'),
            (b"text/rest", b'/'),
            (b"text\nrest", b'\n'),
            (b"text\0rest", 0),
        ] {
            let mut c = cursor(source);
            c.skip_to_block_delim();
            assert_eq!(c.current(), stop, "source {source:?}");
            assert_eq!(c.column(), 4);
        }
    }

    // === Teardown ===

    #[test]
    fn return_unread_hands_back_stream_suffix() {
        let mut input = SliceInput::new(b"abcdef");
        {
            let mut c = InputCursor::new(None, &mut input);
            c.advance();
            c.advance();
            c.return_unread();
        }
        assert_eq!(input.bytes_backed_up(), 4);
        assert_eq!(input.position(), 2);
    }

    #[test]
    fn return_unread_skips_the_initial_buffer() {
        let mut input = SliceInput::new(b"stream");
        {
            let mut c = InputCursor::new(Some(b"prefix"), &mut input);
            c.advance();
            c.return_unread();
        }
        // Still on the caller's initial buffer; nothing belongs to the stream.
        assert_eq!(input.bytes_backed_up(), 0);
        assert_eq!(input.position(), 0);
    }
}
