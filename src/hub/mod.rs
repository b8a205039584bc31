// Copyright 2026 BadCompany
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

//! Channel event hub: one deliver stream to one peer, fanned out to
//! chaincode event listeners.
//!
//! ```text
//! connect() ──► seek envelope ──► DeliverConnector::open ──► DeliverStream
//!                                                                 │
//!                                   dispatch task (one per connection)
//!                                                                 │
//!        decode ──► ListenerRegistry::dispatch ──► ChaincodeEventHandler
//! ```
//!
//! Any terminal condition (status message, stream error, decode error, end
//! of stream, end block, a `disconnect` registration, or [`ChannelEventHub::disconnect`])
//! ends the task. Every listener still registered then receives exactly one
//! `on_error` call and the registry is emptied.

pub mod decode;
pub mod handler;
pub mod registry;
pub mod seek;
pub mod transport;

pub use handler::{ChaincodeEventHandler, FnHandler, LoggingHandler};
pub use registry::{ListenerRegistry, RegistrationOptions};
pub use seek::{build_seek_envelope, ConnectOptions, DeliveryMode};
pub use transport::{DeliverConnector, DeliverStream, GrpcConnector};

use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::constants::deliver;
use crate::core::crypto::SigningIdentity;
use crate::core::errors::ListenerError;
use crate::core::models::{ChaincodeEventRecord, ListenerHandle};
use crate::profile::PeerTarget;
use crate::protos::common::{Envelope, Status};
use crate::protos::peer::{deliver_response, DeliverResponse};

const NO_BLOCK: u64 = u64::MAX;

pub struct ChannelEventHub {
    shared: Arc<HubShared>,
    connector: Arc<dyn DeliverConnector>,
    connection: Mutex<Option<Connection>>,
}

struct HubShared {
    channel_name: String,
    peer: PeerTarget,
    identity: Arc<SigningIdentity>,
    tls_cert_hash: Option<Vec<u8>>,
    registry: Mutex<ListenerRegistry>,
    last_block: AtomicU64,
}

struct Connection {
    cancel: CancellationToken,
    done: CancellationToken,
    task: JoinHandle<()>,
    // Dropping the sender would half-close the request stream.
    _requests: mpsc::Sender<Envelope>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl ChannelEventHub {
    pub fn new(
        channel_name: String,
        peer: PeerTarget,
        identity: Arc<SigningIdentity>,
        tls_cert_hash: Option<Vec<u8>>,
        connector: Arc<dyn DeliverConnector>,
    ) -> Self {
        Self {
            shared: Arc::new(HubShared {
                channel_name,
                peer,
                identity,
                tls_cert_hash,
                registry: Mutex::new(ListenerRegistry::default()),
                last_block: AtomicU64::new(NO_BLOCK),
            }),
            connector,
            connection: Mutex::new(None),
        }
    }

    pub fn channel_name(&self) -> &str {
        &self.shared.channel_name
    }

    pub fn peer_name(&self) -> &str {
        &self.shared.peer.name
    }

    pub async fn register_chaincode_event(
        &self,
        chaincode_id: &str,
        event_name: &str,
        handler: Arc<dyn ChaincodeEventHandler>,
        options: RegistrationOptions,
    ) -> Result<ListenerHandle, ListenerError> {
        let handle = self
            .shared
            .registry
            .lock()
            .await
            .register(chaincode_id, event_name, handler, options)?;
        debug!(
            "Registered {} for chaincode {} event {}",
            handle, chaincode_id, event_name
        );
        Ok(handle)
    }

    /// Returns false when `handle` was not registered.
    pub async fn unregister_chaincode_event(&self, handle: ListenerHandle) -> bool {
        self.shared.registry.lock().await.unregister(handle)
    }

    pub async fn listener_count(&self) -> usize {
        self.shared.registry.lock().await.len()
    }

    /// Number of the most recent block processed, if any.
    pub fn last_block_number(&self) -> Option<u64> {
        match self.shared.last_block.load(Ordering::SeqCst) {
            NO_BLOCK => None,
            n => Some(n),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .await
            .as_ref()
            .is_some_and(|c| !c.done.is_cancelled())
    }

    /// Sign a seek request, open the deliver stream and start dispatching.
    pub async fn connect(&self, options: ConnectOptions) -> Result<(), ListenerError> {
        options.validate()?;

        let mut connection = self.connection.lock().await;
        if connection.as_ref().is_some_and(|c| !c.done.is_cancelled()) {
            return Err(ListenerError::HubState(format!(
                "event hub for peer {} is already connected",
                self.shared.peer.name
            )));
        }

        let envelope = build_seek_envelope(
            &self.shared.channel_name,
            &self.shared.identity,
            self.shared.tls_cert_hash.as_deref(),
            &options,
        )?;
        let (requests, receiver) = mpsc::channel(deliver::REQUEST_BUFFER);
        requests.send(envelope).await.map_err(|_| {
            ListenerError::HubState("request stream closed before the seek request".to_string())
        })?;

        let stream = self
            .connector
            .open(&self.shared.peer, options.mode(), receiver)
            .await?;
        info!(
            "Event hub connected to {} on channel {} (mode={:?}, start={}, end={:?})",
            self.shared.peer.name,
            self.shared.channel_name,
            options.mode(),
            options.start,
            options.end_block
        );

        let cancel = CancellationToken::new();
        let done = CancellationToken::new();
        let task = tokio::spawn(run_dispatch(
            self.shared.clone(),
            stream,
            options.end_block,
            cancel.clone(),
            done.clone(),
        ));

        *connection = Some(Connection {
            cancel,
            done,
            task,
            _requests: requests,
        });
        Ok(())
    }

    /// Close the stream. Every registered listener is notified once through
    /// `on_error` and the registry is cleared.
    pub async fn disconnect(&self) {
        let connection = self.connection.lock().await.take();
        match connection {
            Some(mut conn) => {
                conn.cancel.cancel();
                if let Err(e) = (&mut conn.task).await {
                    warn!("Event hub dispatch task ended abnormally: {}", e);
                }
            }
            None => {
                self.shared
                    .shutdown(ListenerError::HubShutdown("disconnect requested".to_string()))
                    .await;
            }
        }
    }

    /// Resolves once the current connection has ended, or immediately when
    /// the hub is not connected.
    pub async fn closed(&self) {
        let done = self
            .connection
            .lock()
            .await
            .as_ref()
            .map(|c| c.done.clone());
        if let Some(done) = done {
            done.cancelled().await;
        }
    }
}

async fn run_dispatch(
    shared: Arc<HubShared>,
    mut stream: DeliverStream,
    end_block: Option<u64>,
    cancel: CancellationToken,
    done: CancellationToken,
) {
    let reason = loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                break ListenerError::HubShutdown("disconnect requested".to_string());
            }
            item = stream.next() => item,
        };
        let response = match item {
            Some(Ok(response)) => response,
            Some(Err(e)) => break e,
            None => break ListenerError::StreamClosed,
        };
        if let Err(e) = shared.handle_response(response, end_block).await {
            break e;
        }
    };

    drop(stream);
    shared.shutdown(reason).await;
    done.cancel();
}

impl HubShared {
    async fn handle_response(
        &self,
        response: DeliverResponse,
        end_block: Option<u64>,
    ) -> Result<(), ListenerError> {
        match response.r#type {
            Some(deliver_response::Type::Block(block)) => {
                let number = decode::block_number(&block);
                let records = decode::events_from_block(&block)?;
                self.deliver(number, records, end_block).await
            }
            Some(deliver_response::Type::FilteredBlock(block)) => {
                let records = decode::events_from_filtered_block(&block);
                self.deliver(block.number, records, end_block).await
            }
            Some(deliver_response::Type::Status(code)) => match Status::try_from(code) {
                Ok(Status::Success) => Err(ListenerError::HubShutdown(
                    "event service ended with SUCCESS".to_string(),
                )),
                Ok(status) => Err(ListenerError::DeliverStatus(status.as_str_name().to_string())),
                Err(_) => Err(ListenerError::DeliverStatus(code.to_string())),
            },
            None => {
                debug!("Ignoring empty deliver response");
                Ok(())
            }
        }
    }

    async fn deliver(
        &self,
        number: u64,
        records: Vec<ChaincodeEventRecord>,
        end_block: Option<u64>,
    ) -> Result<(), ListenerError> {
        self.last_block.store(number, Ordering::SeqCst);
        debug!("Block {} carried {} chaincode event(s)", number, records.len());

        for record in &records {
            let dispatch = self.registry.lock().await.dispatch(record);
            for handler in &dispatch.handlers {
                handler.on_event(record);
            }
            if dispatch.disconnect {
                return Err(ListenerError::HubShutdown(format!(
                    "listener requested disconnect after transaction {}",
                    record.tx_id
                )));
            }
        }

        match end_block {
            Some(end) if number >= end => Err(ListenerError::HubShutdown(format!(
                "end block number has been seen: {}",
                number
            ))),
            _ => Ok(()),
        }
    }

    async fn shutdown(&self, reason: ListenerError) {
        let handlers = self.registry.lock().await.drain();
        info!(
            "Event hub for peer {} closed: {} ({} listener(s) notified)",
            self.peer.name,
            reason,
            handlers.len()
        );
        for handler in handlers {
            handler.on_error(&reason);
        }
    }
}
