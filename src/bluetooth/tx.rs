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

//! TX characteristic handle.
//!
//! Writing to TX stores the value (so the central can read it back) and, when
//! a central is subscribed, hands it to the notification session and waits
//! until BlueZ accepted it.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tracing::debug;

/// Something that can deliver one notification payload to the central.
#[async_trait]
pub trait NotifySink: Send + Sync {
    /// Send `chunk` as a single notification. Returns once it was handed off.
    async fn notify(&self, chunk: &[u8]) -> Result<()>;
}

/// A pending notification, queued for the active notification session.
#[derive(Debug)]
pub struct NotifyRequest {
    pub value: Vec<u8>,
    pub done: oneshot::Sender<Result<()>>,
}

/// Shared handle to the TX characteristic.
#[derive(Debug, Clone, Default)]
pub struct TxCharacteristic {
    value: Arc<RwLock<Vec<u8>>>,
    subscriber: Arc<Mutex<Option<mpsc::Sender<NotifyRequest>>>>,
}

impl TxCharacteristic {
    /// Create a TX handle with an empty value and no subscriber.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to the characteristic.
    pub async fn value(&self) -> Vec<u8> {
        self.value.read().await.clone()
    }

    /// Start a notification session.
    ///
    /// Replaces any previous session; its receiver sees the channel close.
    pub async fn subscribe(&self) -> mpsc::Receiver<NotifyRequest> {
        let (tx, rx) = mpsc::channel(1);
        *self.subscriber.lock().await = Some(tx);
        rx
    }

    /// Whether a notification session is currently attached.
    #[cfg(test)]
    async fn is_subscribed(&self) -> bool {
        self.subscriber
            .lock()
            .await
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    async fn active_subscriber(&self) -> Option<mpsc::Sender<NotifyRequest>> {
        let mut guard = self.subscriber.lock().await;
        match guard.as_ref() {
            Some(tx) if !tx.is_closed() => Some(tx.clone()),
            Some(_) => {
                debug!("Notification session closed, dropping subscriber");
                *guard = None;
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl NotifySink for TxCharacteristic {
    async fn notify(&self, chunk: &[u8]) -> Result<()> {
        *self.value.write().await = chunk.to_vec();

        let Some(session) = self.active_subscriber().await else {
            debug!("No TX subscriber, stored {} bytes", chunk.len());
            return Ok(());
        };

        let (done_tx, done_rx) = oneshot::channel();
        let request = NotifyRequest {
            value: chunk.to_vec(),
            done: done_tx,
        };
        if session.send(request).await.is_err() {
            debug!("TX subscriber went away before send");
            return Ok(());
        }

        match done_rx.await {
            Ok(result) => result,
            Err(_) => {
                debug!("TX subscriber went away during send");
                Ok(())
            }
        }
    }
}

/// Turn a transport error into the error returned to the writer.
pub(crate) fn notify_failed(e: impl std::fmt::Display) -> anyhow::Error {
    anyhow!("notification rejected: {}", e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_without_subscriber_stores_value() {
        let tx = TxCharacteristic::new();
        assert!(tx.value().await.is_empty());
        assert!(!tx.is_subscribed().await);

        tx.notify(b"hello").await.unwrap();
        assert_eq!(tx.value().await, b"hello");
    }

    #[tokio::test]
    async fn test_notify_waits_for_session() {
        let tx = TxCharacteristic::new();
        let mut requests = tx.subscribe().await;
        assert!(tx.is_subscribed().await);

        let session = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(req) = requests.recv().await {
                seen.push(req.value.clone());
                req.done.send(Ok(())).unwrap();
            }
            seen
        });

        tx.notify(b"first").await.unwrap();
        tx.notify(b"second").await.unwrap();
        assert_eq!(tx.value().await, b"second");

        // New session replaces the old one, which then ends
        let _next = tx.subscribe().await;
        let seen = session.await.unwrap();
        assert_eq!(seen, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[tokio::test]
    async fn test_notify_reports_session_error() {
        let tx = TxCharacteristic::new();
        let mut requests = tx.subscribe().await;

        tokio::spawn(async move {
            if let Some(req) = requests.recv().await {
                let _ = req.done.send(Err(notify_failed("link lost")));
            }
        });

        let err = tx.notify(b"data").await.unwrap_err();
        assert!(err.to_string().contains("link lost"));
    }

    #[tokio::test]
    async fn test_closed_session_is_dropped() {
        let tx = TxCharacteristic::new();
        let requests = tx.subscribe().await;
        drop(requests);

        assert!(!tx.is_subscribed().await);
        tx.notify(b"x").await.unwrap();
        assert_eq!(tx.value().await, b"x");
    }
}
