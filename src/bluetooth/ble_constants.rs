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

//! BLE service and characteristic UUIDs for the Nordic UART Service.

use uuid::Uuid;

/// NUS GATT service UUID.
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x6e400001_b5a3_f393_e0a9_e50e24dcca9e);

/// RX characteristic UUID (central writes console input here).
/// Properties: Write, Write Without Response
pub const RX_UUID: Uuid = Uuid::from_u128(0x6e400002_b5a3_f393_e0a9_e50e24dcca9e);

/// TX characteristic UUID (peripheral sends console lines here).
/// Properties: Notify, Read
pub const TX_UUID: Uuid = Uuid::from_u128(0x6e400003_b5a3_f393_e0a9_e50e24dcca9e);

/// Console control bytes.
pub mod keys {
    pub const CR: u8 = b'\r';
    pub const LF: u8 = b'\n';
    /// Ctrl-X, ends the console session.
    pub const CANCEL: u8 = 0x18;
}

/// BLE configuration constants.
pub mod config {
    /// Local name put in the advertisement.
    pub const DEFAULT_LOCAL_NAME: &str = "NUS";

    /// Advertising interval in milliseconds.
    pub const DEFAULT_ADVERTISING_INTERVAL_MS: u64 = 100;

    /// Notification payload size used when splitting console lines.
    ///
    /// 20 bytes fits the default 23 byte ATT MTU minus the 3 byte ATT header,
    /// so it works before (or without) any MTU exchange.
    pub const DEFAULT_CHUNK_SIZE: usize = 20;

    /// Largest attribute value the ATT protocol allows.
    pub const MAX_ATTRIBUTE_LEN: usize = 512;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        assert_eq!(
            SERVICE_UUID.to_string().to_lowercase(),
            "6e400001-b5a3-f393-e0a9-e50e24dcca9e"
        );
        assert_eq!(
            RX_UUID.to_string().to_lowercase(),
            "6e400002-b5a3-f393-e0a9-e50e24dcca9e"
        );
        assert_eq!(
            TX_UUID.to_string().to_lowercase(),
            "6e400003-b5a3-f393-e0a9-e50e24dcca9e"
        );
    }

    #[test]
    fn test_uuid_bytes_match_nus_layout() {
        assert_eq!(
            SERVICE_UUID.as_bytes(),
            &[
                0x6E, 0x40, 0x00, 0x01, 0xB5, 0xA3, 0xF3, 0x93, 0xE0, 0xA9, 0xE5, 0x0E, 0x24, 0xDC,
                0xCA, 0x9E
            ]
        );
        // RX and TX only differ from the service in the 4th byte
        assert_eq!(RX_UUID.as_bytes()[3], 0x02);
        assert_eq!(TX_UUID.as_bytes()[3], 0x03);
        assert_eq!(RX_UUID.as_bytes()[4..], SERVICE_UUID.as_bytes()[4..]);
    }

    #[test]
    fn test_default_chunk_fits_default_mtu() {
        // Default ATT MTU is 23, 3 bytes go to the ATT header
        assert!(config::DEFAULT_CHUNK_SIZE <= 23 - 3);
    }
}
