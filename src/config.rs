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

//! Configuration module.
//!
//! Handles loading and saving application settings.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bluetooth::ble_constants::config as ble;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bluetooth settings.
    pub bluetooth: BluetoothConfig,

    /// Console settings.
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BluetoothConfig {
    /// Adapter to use (e.g. "hci1"). The default adapter when unset.
    pub adapter: Option<String>,

    /// Local name put in the advertisement.
    pub local_name: String,

    /// Advertising interval in milliseconds.
    pub advertising_interval_ms: u64,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            adapter: None,
            local_name: ble::DEFAULT_LOCAL_NAME.to_string(),
            advertising_interval_ms: ble::DEFAULT_ADVERTISING_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Maximum bytes per TX notification.
    ///
    /// Defaults to 20, which every central can receive without an MTU exchange.
    /// Larger values (up to 512) are only safe when all centrals negotiate an
    /// ATT MTU of at least `chunk_size + 3`; nothing checks this at runtime.
    pub chunk_size: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            chunk_size: ble::DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nus-console")
            .join("config.toml")
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, writing the defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Reject values the BLE link cannot carry.
    pub fn validate(&self) -> Result<()> {
        let chunk_size = self.console.chunk_size;
        if chunk_size == 0 || chunk_size > ble::MAX_ATTRIBUTE_LEN {
            bail!(
                "console.chunk_size must be between 1 and {}, got {}",
                ble::MAX_ATTRIBUTE_LEN,
                chunk_size
            );
        }
        if self.bluetooth.local_name.is_empty() {
            bail!("bluetooth.local_name must not be empty");
        }
        if self.bluetooth.advertising_interval_ms == 0 {
            bail!("bluetooth.advertising_interval_ms must be positive");
        }
        Ok(())
    }
}
