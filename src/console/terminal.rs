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

//! Local terminal access: raw mode and byte-wise input.

use anyhow::{Context, Result};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::Stream;
use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Keeps the terminal in raw mode until dropped.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Switch the terminal to raw (character at a time, no echo) mode.
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        debug!("Terminal switched to raw mode");
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        match disable_raw_mode() {
            Ok(()) => debug!("Terminal mode restored"),
            Err(e) => warn!("Failed to restore terminal mode: {}", e),
        }
    }
}

/// Bytes typed on the terminal, one at a time.
///
/// Reads happen on a detached thread so a pending read never holds up shutdown.
/// The stream ends when the reader hits end of file, after yielding any read error.
pub struct TerminalInput {
    rx: mpsc::Receiver<io::Result<u8>>,
}

impl TerminalInput {
    /// Read from the process' stdin.
    pub fn stdin() -> Self {
        Self::from_reader(io::stdin())
    }

    /// Read from any blocking reader.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel(64);

        thread::spawn(move || {
            for byte in reader.bytes() {
                let failed = byte.is_err();
                if tx.blocking_send(byte).is_err() || failed {
                    break;
                }
            }
            debug!("Terminal reader finished");
        });

        Self { rx }
    }
}

impl Stream for TerminalInput {
    type Item = io::Result<u8>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
