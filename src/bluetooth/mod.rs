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

//! Bluetooth communication module.
//!
//! Exposes the Nordic UART Service as a BlueZ GATT peripheral.

pub mod ble_constants;
mod gatt_server;
mod tx;

pub use gatt_server::{GattServer, InboundWrite, NusService};
pub use tx::{NotifyRequest, NotifySink, TxCharacteristic};
