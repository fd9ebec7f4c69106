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

//! Local keyboard input to TX notifications.
//!
//! Typed bytes are echoed and collected into a line. When the user presses
//! return, the line (with "\r\n") goes out as a series of notifications, each
//! at most `chunk_size` bytes, before the next byte is read. Ctrl-X ends the
//! session and drops whatever was typed since the last return.

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use std::io::Write;
use tracing::{debug, info};

use crate::bluetooth::ble_constants::keys;
use crate::bluetooth::NotifySink;

use super::line_buffer::{LineBuffer, LineEvent};

/// Why the session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// User pressed Ctrl-X.
    Cancelled,
    /// The input stream ended.
    InputClosed,
}

/// What a finished session sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub end: SessionEnd,
    /// Lines sent.
    pub lines: usize,
    /// Notifications sent.
    pub chunks: usize,
    /// Bytes sent over all notifications.
    pub bytes: usize,
}

/// Outbound half of the console.
pub struct OutboundSession<T, W> {
    tx: T,
    echo: W,
    line: LineBuffer,
    chunk_size: usize,
    lines: usize,
    chunks: usize,
    bytes: usize,
}

impl<T: NotifySink, W: Write> OutboundSession<T, W> {
    /// Create a session sending through `tx` and echoing to `echo`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0.
    pub fn new(tx: T, echo: W, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self {
            tx,
            echo,
            line: LineBuffer::new(),
            chunk_size,
            lines: 0,
            chunks: 0,
            bytes: 0,
        }
    }

    /// Consume `input` until Ctrl-X or end of input.
    ///
    /// Any error (reading input, echoing, sending) ends the session.
    pub async fn run<I>(mut self, mut input: I) -> Result<SessionSummary>
    where
        I: Stream<Item = std::io::Result<u8>> + Unpin,
    {
        let end = loop {
            let Some(byte) = input.next().await else {
                info!("Terminal input closed");
                break SessionEnd::InputClosed;
            };
            let byte = byte.context("failed to read terminal input")?;

            self.echo_byte(byte)?;
            match self.line.push(byte) {
                LineEvent::Pending => {}
                LineEvent::Cancel => {
                    debug!("Ctrl-X, discarding {} buffered bytes", self.line.len() - 1);
                    break SessionEnd::Cancelled;
                }
                LineEvent::Complete => {
                    self.echo_byte(keys::LF)?;
                    self.flush_line().await?;
                }
            }
        };

        let summary = SessionSummary {
            end,
            lines: self.lines,
            chunks: self.chunks,
            bytes: self.bytes,
        };
        info!("Console session ended: {:?}", summary);
        Ok(summary)
    }

    fn echo_byte(&mut self, byte: u8) -> Result<()> {
        self.echo
            .write_all(&[byte])
            .and_then(|_| self.echo.flush())
            .context("failed to echo input")
    }

    /// Send the completed line, one notification per chunk.
    ///
    /// The line is taken out of the buffer first; its storage is reused once sent.
    async fn flush_line(&mut self) -> Result<()> {
        let line = self.line.take_line();
        debug!("Sending line of {} bytes", line.as_bytes().len());

        for chunk in line.chunks(self.chunk_size) {
            self.tx
                .notify(chunk.bytes)
                .await
                .context("failed to send notification")?;
            debug!(
                "Sent chunk at offset {}: {} bytes",
                chunk.offset,
                chunk.bytes.len()
            );
            self.chunks += 1;
            self.bytes += chunk.bytes.len();
        }

        self.lines += 1;
        self.line.recycle(line);
        Ok(())
    }
}
