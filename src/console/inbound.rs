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

//! Display of bytes written by the central.

use std::io::{self, Write};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bluetooth::ble_constants::keys;
use crate::bluetooth::InboundWrite;

/// Write `data` to `out`, expanding each CR to CR LF.
pub fn render_inbound<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    for &byte in data {
        out.write_all(&[byte])?;
        if byte == keys::CR {
            out.write_all(&[keys::LF])?;
        }
    }
    out.flush()
}

/// Drains RX writes and shows them on the local terminal.
pub struct InboundBridge<W> {
    events: mpsc::Receiver<InboundWrite>,
    out: W,
}

impl<W: Write> InboundBridge<W> {
    pub fn new(events: mpsc::Receiver<InboundWrite>, out: W) -> Self {
        Self { events, out }
    }

    /// Render one write. Local output errors are logged, never returned.
    pub fn handle(&mut self, write: &InboundWrite) {
        debug!(
            "Inbound {} bytes from {} (offset {})",
            write.data.len(),
            write.device,
            write.offset
        );

        if let Err(e) = render_inbound(&mut self.out, &write.data) {
            warn!("Failed to write inbound data to terminal: {}", e);
        }
    }

    /// Process writes until the service goes away, then hand back the output.
    pub async fn run(mut self) -> W {
        while let Some(write) = self.events.recv().await {
            self.handle(&write);
        }
        info!("Inbound bridge stopped");
        self.out
    }
}
