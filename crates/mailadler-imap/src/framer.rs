//! Line framing for server responses.
//!
//! IMAP responses handled here are CRLF-terminated lines. Bytes arrive in
//! arbitrary chunks from the transport; [`LineFramer`] accumulates them and
//! hands out complete lines in arrival order, keeping any trailing partial
//! line for the next call. Framing is byte-exact, content interpretation is
//! left to the parser.
//!
//! There is no maximum line length. A server that never sends CRLF makes the
//! buffer grow without bound.

use bytes::{Bytes, BytesMut};

/// Default buffer size for the receive buffer.
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Accumulates transport bytes and splits them into CRLF-terminated lines.
#[derive(Debug)]
pub struct LineFramer {
    buffer: BytesMut,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    /// Creates an empty framer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }

    /// Appends `data` and returns an iterator over the lines it completed.
    ///
    /// Lines are yielded without their CRLF terminator. Lines the iterator
    /// did not get to (because it was dropped early) stay buffered and are
    /// yielded by the next call.
    pub fn feed(&mut self, data: &[u8]) -> Lines<'_> {
        self.buffer.extend_from_slice(data);
        Lines {
            buffer: &mut self.buffer,
        }
    }

    /// Returns the bytes of the incomplete trailing line.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Discards any buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Iterator over the complete lines currently held by a [`LineFramer`].
#[derive(Debug)]
pub struct Lines<'a> {
    buffer: &'a mut BytesMut,
}

impl Iterator for Lines<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = find_crlf(self.buffer)?;
        let mut line = self.buffer.split_to(pos + 2);
        line.truncate(pos);
        Some(line.freeze())
    }
}

/// Finds the position of CRLF in a buffer.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::needless_collect,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_find_crlf() {
        assert_eq!(find_crlf(b"hello\r\n"), Some(5));
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"no newline"), None);
        assert_eq!(find_crlf(b"just\n"), None);
        assert_eq!(find_crlf(b"just\r"), None);
    }

    #[test]
    fn test_single_line() {
        let mut framer = LineFramer::new();
        let lines: Vec<Bytes> = framer.feed(b"* OK ready\r\n").collect();
        assert_eq!(lines, vec![Bytes::from_static(b"* OK ready")]);
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn test_partial_line_is_retained() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed(b"* 3 EXI").count(), 0);
        assert_eq!(framer.pending(), b"* 3 EXI");

        let lines: Vec<Bytes> = framer.feed(b"STS\r\nA0001 OK").collect();
        assert_eq!(lines, vec![Bytes::from_static(b"* 3 EXISTS")]);
        assert_eq!(framer.pending(), b"A0001 OK");
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed(b"* OK hi\r").count(), 0);
        let lines: Vec<Bytes> = framer.feed(b"\n").collect();
        assert_eq!(lines, vec![Bytes::from_static(b"* OK hi")]);
    }

    #[test]
    fn test_multiple_lines_in_order() {
        let mut framer = LineFramer::new();
        let lines: Vec<Bytes> = framer
            .feed(b"* 2 EXISTS\r\n* 0 RECENT\r\nA0002 OK done\r\n")
            .collect();
        assert_eq!(
            lines,
            vec![
                Bytes::from_static(b"* 2 EXISTS"),
                Bytes::from_static(b"* 0 RECENT"),
                Bytes::from_static(b"A0002 OK done"),
            ]
        );
    }

    #[test]
    fn test_dropped_iterator_keeps_remaining_lines() {
        let mut framer = LineFramer::new();
        let first = framer.feed(b"one\r\ntwo\r\n").next();
        assert_eq!(first, Some(Bytes::from_static(b"one")));

        let rest: Vec<Bytes> = framer.feed(b"").collect();
        assert_eq!(rest, vec![Bytes::from_static(b"two")]);
    }

    #[test]
    fn test_clear() {
        let mut framer = LineFramer::new();
        let _ = framer.feed(b"partial").count();
        framer.clear();
        assert!(framer.pending().is_empty());
    }

    proptest! {
        #[test]
        fn prop_lines_reassemble_input(
            data in proptest::collection::vec(
                prop_oneof![Just(b'\r'), Just(b'\n'), any::<u8>()],
                0..512,
            ),
            mut cuts in proptest::collection::vec(any::<usize>(), 0..16),
        ) {
            let mut framer = LineFramer::new();
            let mut reassembled = Vec::new();

            let len = data.len();
            for cut in &mut cuts {
                *cut = if len == 0 { 0 } else { *cut % (len + 1) };
            }
            cuts.push(len);
            cuts.sort_unstable();

            let mut start = 0;
            for cut in cuts {
                for line in framer.feed(&data[start..cut]) {
                    reassembled.extend_from_slice(&line);
                    reassembled.extend_from_slice(b"\r\n");
                }
                start = cut;
            }
            reassembled.extend_from_slice(framer.pending());

            prop_assert_eq!(reassembled, data);
        }

        #[test]
        fn prop_yielded_lines_contain_no_crlf(
            data in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let mut framer = LineFramer::new();
            for line in framer.feed(&data) {
                prop_assert!(find_crlf(&line).is_none());
            }
            prop_assert!(find_crlf(framer.pending()).is_none());
        }
    }
}
