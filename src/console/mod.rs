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

//! Console bridge between the local terminal and the NUS characteristics.

mod chunker;
mod inbound;
mod line_buffer;
mod outbound;
mod terminal;

pub use chunker::{Chunk, Chunker};
pub use inbound::{render_inbound, InboundBridge};
pub use line_buffer::{CompletedLine, LineBuffer, LineEvent};
pub use outbound::{OutboundSession, SessionEnd, SessionSummary};
pub use terminal::{RawModeGuard, TerminalInput};

/// Printed once the terminal is in raw mode.
pub const BANNER: &str = "NUS console enabled, use Ctrl-X to exit\r\n";
