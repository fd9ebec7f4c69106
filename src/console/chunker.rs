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

//! Splitting of completed lines into notification-sized chunks.

/// A piece of a line, sent as one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of the first byte within the line.
    pub offset: usize,
    /// The bytes to send. Never empty.
    pub bytes: &'a [u8],
}

/// Iterator over the chunks of a line, in offset order.
#[derive(Debug, Clone)]
pub struct Chunker<'a> {
    data: &'a [u8],
    offset: usize,
    chunk_size: usize,
}

impl<'a> Chunker<'a> {
    /// Split `data` into chunks of at most `chunk_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            data,
            offset: 0,
            chunk_size,
        }
    }
}

impl<'a> Iterator for Chunker<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let remaining = self.data.len() - self.offset;
        let len = remaining.min(self.chunk_size);
        let chunk = Chunk {
            offset: self.offset,
            bytes: &self.data[self.offset..self.offset + len],
        };
        self.offset += len;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len().saturating_sub(self.offset);
        let count = remaining.div_ceil(self.chunk_size);
        (count, Some(count))
    }
}

impl ExactSizeIterator for Chunker<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(data: &[u8], chunk_size: usize) -> Vec<usize> {
        Chunker::new(data, chunk_size).map(|c| c.bytes.len()).collect()
    }

    #[test]
    fn test_short_line_is_one_chunk() {
        let chunks: Vec<_> = Chunker::new(b"hi\r\n", 20).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[0].bytes, b"hi\r\n");
    }

    #[test]
    fn test_last_chunk_is_remainder() {
        let line = vec![b'x'; 47];
        assert_eq!(sizes(&line, 20), vec![20, 20, 7]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_chunk() {
        let line = vec![b'x'; 40];
        assert_eq!(sizes(&line, 20), vec![20, 20]);
        assert_eq!(sizes(&line[..20], 20), vec![20]);
    }

    #[test]
    fn test_empty_line_yields_nothing() {
        assert_eq!(Chunker::new(&[], 20).count(), 0);
    }

    #[test]
    fn test_chunks_reassemble_in_order() {
        let line: Vec<u8> = (0..=255u8).cycle().take(1000).collect();

        for chunk_size in [1, 7, 20, 64, 512] {
            let chunker = Chunker::new(&line, chunk_size);
            assert_eq!(chunker.len(), line.len().div_ceil(chunk_size));

            let mut rebuilt = Vec::new();
            let mut next_offset = 0;
            for chunk in chunker {
                assert_eq!(chunk.offset, next_offset);
                assert!(!chunk.bytes.is_empty());
                assert!(chunk.bytes.len() <= chunk_size);
                rebuilt.extend_from_slice(chunk.bytes);
                next_offset += chunk.bytes.len();
            }
            assert_eq!(rebuilt, line);
        }
    }

    #[test]
    fn test_only_final_chunk_may_be_short() {
        let line = vec![b'a'; 61];
        let sizes = sizes(&line, 20);
        let (last, full) = sizes.split_last().unwrap();
        assert!(full.iter().all(|&s| s == 20));
        assert_eq!(*last, 1);
    }

    #[test]
    #[should_panic]
    fn test_zero_chunk_size_panics() {
        let _ = Chunker::new(b"abc", 0);
    }
}
