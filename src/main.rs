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

//! NUS Console

use anyhow::{Context, Result};
use std::io::Write;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nus_console::bluetooth::{GattServer, NusService, TxCharacteristic};
use nus_console::config::Config;
use nus_console::console::{
    InboundBridge, OutboundSession, RawModeGuard, SessionSummary, TerminalInput, BANNER,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout belongs to the console
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nus_console=warn")),
        )
        .init();

    info!("Starting NUS Console v{}...", env!("CARGO_PKG_VERSION"));

    let config = Config::load().context("failed to load configuration")?;
    info!("Configuration loaded");

    let mut server = GattServer::new(&config.bluetooth)
        .await
        .context("failed to enable BLE stack")?;
    info!(
        "Adapter {} ({}) ready",
        server.adapter_name(),
        server.address().await.context("failed to read adapter address")?
    );
    server
        .start_advertising(&config.bluetooth)
        .await
        .context("failed to start advertisement")?;
    let NusService {
        inbound,
        tx,
        handle: _app_handle,
    } = server
        .register_service()
        .await
        .context("failed to add service")?;

    tokio::spawn(InboundBridge::new(inbound, std::io::stdout()).run());

    let summary = run_console(tx, config.console.chunk_size).await?;
    info!(
        "Sent {} lines in {} notifications ({} bytes)",
        summary.lines, summary.chunks, summary.bytes
    );

    info!("NUS Console stopped");
    Ok(())
}

/// Run the outbound session with the terminal in raw mode.
async fn run_console(tx: TxCharacteristic, chunk_size: usize) -> Result<SessionSummary> {
    let _raw = RawModeGuard::enter()?;

    let mut stdout = std::io::stdout();
    stdout.write_all(BANNER.as_bytes())?;
    stdout.flush()?;

    OutboundSession::new(tx, stdout, chunk_size)
        .run(TerminalInput::stdin())
        .await
}
