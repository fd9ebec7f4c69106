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

//! BLE GATT server exposing the Nordic UART Service.

use anyhow::Result;
use bluer::adv::{Advertisement, AdvertisementHandle};
use bluer::gatt::local::{
    Application, ApplicationHandle, Characteristic, CharacteristicNotifier, CharacteristicNotify,
    CharacteristicNotifyMethod, CharacteristicRead, CharacteristicReadRequest,
    CharacteristicWrite, CharacteristicWriteMethod, CharacteristicWriteRequest, Service,
};
use bluer::{Adapter, Address};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::ble_constants::*;
use super::tx::{notify_failed, TxCharacteristic};
use crate::config::BluetoothConfig;

/// A write from the central to the RX characteristic.
#[derive(Debug, Clone)]
pub struct InboundWrite {
    /// Address of the central that wrote.
    pub device: Address,
    /// Offset requested by the central. Not honoured, writes are appended to the console.
    pub offset: u16,
    /// ATT MTU of the link the write arrived on.
    pub mtu: u16,
    /// Written bytes.
    pub data: Vec<u8>,
}

/// Result of registering the NUS service.
///
/// Dropping `handle` unregisters the service and closes `inbound`.
pub struct NusService {
    /// Writes to the RX characteristic, in arrival order.
    pub inbound: mpsc::Receiver<InboundWrite>,
    /// Handle used to write (and notify) the TX characteristic.
    pub tx: TxCharacteristic,
    /// Keeps the GATT application registered with BlueZ.
    pub handle: ApplicationHandle,
}

/// GATT peripheral backed by BlueZ.
pub struct GattServer {
    adapter: Adapter,
    _adv_handle: Option<AdvertisementHandle>,
}

impl GattServer {
    /// Open a BlueZ session and power on the adapter.
    pub async fn new(config: &BluetoothConfig) -> Result<Self> {
        info!("Initializing BLE GATT server...");

        // Create BlueZ session
        let session = bluer::Session::new().await?;
        debug!("BlueZ session created");

        let adapter = match config.adapter.as_deref() {
            Some(name) => session.adapter(name)?,
            None => session.default_adapter().await?,
        };
        info!("Using Bluetooth adapter: {}", adapter.name());

        // Ensure adapter is powered on
        if !adapter.is_powered().await? {
            info!("Powering on Bluetooth adapter...");
            adapter.set_powered(true).await?;
        }

        Ok(Self {
            adapter,
            _adv_handle: None,
        })
    }

    /// Name of the adapter in use (e.g. `hci0`).
    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    /// Bluetooth address of the adapter in use.
    pub async fn address(&self) -> Result<Address> {
        Ok(self.adapter.address().await?)
    }

    /// Start advertising the NUS service.
    pub async fn start_advertising(&mut self, config: &BluetoothConfig) -> Result<()> {
        let handle = self.adapter.advertise(Self::advertisement(config)).await?;
        self._adv_handle = Some(handle);

        info!(
            "BLE advertising started as '{}' every {} ms",
            config.local_name, config.advertising_interval_ms
        );
        Ok(())
    }

    /// Register the NUS service with BlueZ.
    pub async fn register_service(&self) -> Result<NusService> {
        let (inbound_tx, inbound_rx) = mpsc::channel::<InboundWrite>(32);
        let tx = TxCharacteristic::new();

        let app = Self::nus_application(inbound_tx, tx.clone());
        let handle = self.adapter.serve_gatt_application(app).await?;
        info!("NUS service registered");

        Ok(NusService {
            inbound: inbound_rx,
            tx,
            handle,
        })
    }

    /// Advertisement for the NUS service, fixed interval.
    fn advertisement(config: &BluetoothConfig) -> Advertisement {
        let interval = Duration::from_millis(config.advertising_interval_ms);
        Advertisement {
            service_uuids: vec![SERVICE_UUID].into_iter().collect(),
            discoverable: Some(true),
            local_name: Some(config.local_name.clone()),
            min_interval: Some(interval),
            max_interval: Some(interval),
            ..Default::default()
        }
    }

    /// GATT application with the NUS service.
    ///
    /// RX writes are queued on `inbound_tx`; TX reads and notifications are served from `tx`.
    fn nus_application(
        inbound_tx: mpsc::Sender<InboundWrite>,
        tx: TxCharacteristic,
    ) -> Application {
        // RX: central writes console bytes here
        let rx_char = Characteristic {
            uuid: RX_UUID,
            write: Some(CharacteristicWrite {
                write: true,
                write_without_response: true,
                method: CharacteristicWriteMethod::Fun(Box::new(
                    move |data: Vec<u8>, req: CharacteristicWriteRequest| {
                        let inbound_tx = inbound_tx.clone();
                        Box::pin(async move {
                            Self::handle_rx_write(data, req, inbound_tx).await;
                            Ok(())
                        })
                    },
                )),
                ..Default::default()
            }),
            ..Default::default()
        };

        // TX: read + notify, no write access for the central
        let tx_char = {
            let read_tx = tx.clone();
            let notify_tx = tx;

            Characteristic {
                uuid: TX_UUID,
                read: Some(CharacteristicRead {
                    read: true,
                    fun: Box::new(move |_req: CharacteristicReadRequest| {
                        let tx = read_tx.clone();
                        Box::pin(async move { Ok(tx.value().await) })
                    }),
                    ..Default::default()
                }),
                notify: Some(CharacteristicNotify {
                    notify: true,
                    method: CharacteristicNotifyMethod::Fun(Box::new(move |notifier| {
                        let tx = notify_tx.clone();
                        Box::pin(async move { Self::run_notify_session(tx, notifier).await })
                    })),
                    ..Default::default()
                }),
                ..Default::default()
            }
        };

        Application {
            services: vec![Service {
                uuid: SERVICE_UUID,
                primary: true,
                characteristics: vec![rx_char, tx_char],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    /// Forward an RX write to the inbound bridge.
    async fn handle_rx_write(
        data: Vec<u8>,
        req: CharacteristicWriteRequest,
        inbound_tx: mpsc::Sender<InboundWrite>,
    ) {
        debug!(
            "RX write from {}: {} bytes (offset {}, mtu {})",
            req.device_address,
            data.len(),
            req.offset,
            req.mtu
        );

        let write = InboundWrite {
            device: req.device_address,
            offset: req.offset,
            mtu: req.mtu,
            data,
        };
        if inbound_tx.send(write).await.is_err() {
            warn!("Inbound bridge stopped, dropping RX write");
        }
    }

    /// Drain queued TX values into notifications while the central is subscribed.
    async fn run_notify_session(tx: TxCharacteristic, mut notifier: CharacteristicNotifier) {
        let mut requests = tx.subscribe().await;
        info!("Central subscribed to TX notifications");

        while let Some(req) = requests.recv().await {
            if notifier.is_stopped() {
                let _ = req.done.send(Ok(()));
                break;
            }

            debug!("Sending notification: {} bytes", req.value.len());
            match notifier.notify(req.value).await {
                Ok(()) => {
                    let _ = req.done.send(Ok(()));
                }
                Err(e) => {
                    error!("Failed to send notification: {}", e);
                    let _ = req.done.send(Err(notify_failed(e)));
                    break;
                }
            }
        }

        info!("TX notification session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> Application {
        let (inbound_tx, _inbound_rx) = mpsc::channel(1);
        GattServer::nus_application(inbound_tx, TxCharacteristic::new())
    }

    #[test]
    fn test_advertisement_contents() {
        let adv = GattServer::advertisement(&BluetoothConfig::default());

        assert_eq!(adv.local_name.as_deref(), Some("NUS"));
        assert_eq!(adv.service_uuids.len(), 1);
        assert!(adv.service_uuids.contains(&SERVICE_UUID));
        assert_eq!(adv.discoverable, Some(true));
        assert_eq!(adv.min_interval, Some(Duration::from_millis(100)));
        assert_eq!(adv.max_interval, Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_advertisement_uses_configured_name() {
        let config = BluetoothConfig {
            local_name: "bench-uart".to_string(),
            advertising_interval_ms: 250,
            ..Default::default()
        };
        let adv = GattServer::advertisement(&config);

        assert_eq!(adv.local_name.as_deref(), Some("bench-uart"));
        assert_eq!(adv.min_interval, Some(Duration::from_millis(250)));
        assert_eq!(adv.max_interval, adv.min_interval);
    }

    #[test]
    fn test_service_has_rx_and_tx() {
        let app = application();
        assert_eq!(app.services.len(), 1);

        let service = &app.services[0];
        assert_eq!(service.uuid, SERVICE_UUID);
        assert!(service.primary);

        let uuids: Vec<_> = service.characteristics.iter().map(|c| c.uuid).collect();
        assert_eq!(uuids, vec![RX_UUID, TX_UUID]);
    }

    #[test]
    fn test_rx_is_write_only() {
        let app = application();
        let rx_char = &app.services[0].characteristics[0];

        let write = rx_char.write.as_ref().unwrap();
        assert!(write.write);
        assert!(write.write_without_response);
        assert!(matches!(write.method, CharacteristicWriteMethod::Fun(_)));
        assert!(rx_char.read.is_none());
        assert!(rx_char.notify.is_none());
    }

    #[test]
    fn test_tx_is_read_and_notify_only() {
        let app = application();
        let tx_char = &app.services[0].characteristics[1];

        assert!(tx_char.read.as_ref().unwrap().read);
        let notify = tx_char.notify.as_ref().unwrap();
        assert!(notify.notify);
        assert!(matches!(notify.method, CharacteristicNotifyMethod::Fun(_)));
        assert!(tx_char.write.is_none());
    }
}
