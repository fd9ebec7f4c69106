// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Accumulation of typed bytes into lines.

use crate::bluetooth::ble_constants::keys;

use super::chunker::Chunker;

/// What the buffer wants done after a byte was pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// Keep reading.
    Pending,
    /// A CR arrived; the buffer holds a complete line ending in "\r\n".
    Complete,
    /// Ctrl-X arrived; the session should end.
    Cancel,
}

/// A line taken out of the buffer, ready to be sent.
#[derive(Debug)]
pub struct CompletedLine {
    bytes: Vec<u8>,
}

impl CompletedLine {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Split the line into chunks of at most `chunk_size` bytes.
    pub fn chunks(&self, chunk_size: usize) -> Chunker<'_> {
        Chunker::new(&self.bytes, chunk_size)
    }
}

/// Buffer for the line currently being typed.
///
/// Storage is reused between lines.
#[derive(Debug)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create an empty line buffer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(128),
        }
    }

    /// Append a typed byte.
    ///
    /// A CR is followed by an LF, since terminals in raw mode only send CR.
    pub fn push(&mut self, byte: u8) -> LineEvent {
        self.buffer.push(byte);

        match byte {
            keys::CANCEL => LineEvent::Cancel,
            keys::CR => {
                self.buffer.push(keys::LF);
                LineEvent::Complete
            }
            _ => LineEvent::Pending,
        }
    }

    /// Bytes accumulated so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Hand the completed line over for sending, leaving the buffer empty.
    ///
    /// Give the returned line back with [`LineBuffer::recycle`] to reuse its storage.
    pub fn take_line(&mut self) -> CompletedLine {
        CompletedLine {
            bytes: std::mem::take(&mut self.buffer),
        }
    }

    /// Reuse the storage of a sent line. Bytes typed since `take_line` are kept.
    pub fn recycle(&mut self, line: CompletedLine) {
        let mut storage = line.bytes;
        storage.clear();
        if self.buffer.is_empty() && storage.capacity() > self.buffer.capacity() {
            self.buffer = storage;
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_bytes_are_pending() {
        let mut line = LineBuffer::new();
        assert_eq!(line.push(b'h'), LineEvent::Pending);
        assert_eq!(line.push(b'i'), LineEvent::Pending);
        assert_eq!(line.as_bytes(), b"hi");
    }

    #[test]
    fn test_carriage_return_appends_line_feed() {
        let mut line = LineBuffer::new();
        line.push(b'h');
        line.push(b'i');
        assert_eq!(line.push(b'\r'), LineEvent::Complete);
        assert_eq!(line.as_bytes(), b"hi\r\n");
        assert_eq!(line.len(), 4);
    }

    #[test]
    fn test_bare_carriage_return_is_a_line() {
        let mut line = LineBuffer::new();
        assert_eq!(line.push(b'\r'), LineEvent::Complete);
        assert_eq!(line.as_bytes(), b"\r\n");
    }

    #[test]
    fn test_line_feed_alone_does_not_complete() {
        let mut line = LineBuffer::new();
        assert_eq!(line.push(b'\n'), LineEvent::Pending);
    }

    #[test]
    fn test_ctrl_x_cancels() {
        let mut line = LineBuffer::new();
        line.push(b'a');
        assert_eq!(line.push(0x18), LineEvent::Cancel);
    }

    #[test]
    fn test_chunks_cover_line() {
        let mut line = LineBuffer::new();
        for _ in 0..45 {
            line.push(b'z');
        }
        line.push(b'\r');

        let completed = line.take_line();
        let sizes: Vec<usize> = completed.chunks(20).map(|c| c.bytes.len()).collect();
        assert_eq!(sizes, vec![20, 20, 7]);
    }

    #[test]
    fn test_take_line_empties_buffer_before_send() {
        let mut line = LineBuffer::new();
        line.push(b'o');
        line.push(b'k');
        line.push(b'\r');

        let completed = line.take_line();
        assert!(line.is_empty());
        assert_eq!(completed.as_bytes(), b"ok\r\n");
    }

    #[test]
    fn test_recycle_restores_storage() {
        let mut line = LineBuffer::new();
        for _ in 0..300 {
            line.push(b'x');
        }
        line.push(b'\r');
        let capacity = line.buffer.capacity();

        let completed = line.take_line();
        line.recycle(completed);
        assert!(line.is_empty());
        assert_eq!(line.buffer.capacity(), capacity);
    }
}
