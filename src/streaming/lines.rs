//! Line reassembly for `data:`-framed event streams.

use bytes::{Buf, BytesMut};

/// Accumulates raw bytes and hands out complete lines.
///
/// Splitting happens on the `\n` byte, which never occurs inside a multi-byte
/// UTF-8 sequence, so a character split across chunks stays buffered until its
/// line is complete.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
    /// Bytes before this offset are known to contain no `\n`.
    scanned: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line it completed, without terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(found) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(self.scanned + found);
            self.buffer.advance(1);
            self.scanned = 0;
            lines.push(decode_line(&line));
        }
        self.scanned = self.buffer.len();
        lines
    }

    /// Take the unterminated tail, if any.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = self.buffer.split();
        self.scanned = 0;
        Some(decode_line(&rest))
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Payload of a `data:` line, or `None` for any other line.
pub fn sse_data(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest).trim())
}
