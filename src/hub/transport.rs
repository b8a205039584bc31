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

//! Deliver stream transport.
//!
//! The hub talks to a [`DeliverConnector`] so the gRPC channel can be swapped
//! for an in-process stream in tests.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use http::uri::PathAndQuery;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codec::ProstCodec;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};
use tracing::debug;

use super::seek::DeliveryMode;
use crate::client::TlsClientIdentity;
use crate::core::errors::ListenerError;
use crate::profile::PeerTarget;
use crate::protos::common::Envelope;
use crate::protos::peer::DeliverResponse;

pub type DeliverStream = Pin<Box<dyn Stream<Item = Result<DeliverResponse, ListenerError>> + Send>>;

#[async_trait]
pub trait DeliverConnector: Send + Sync {
    /// Open a deliver stream to `peer`. Envelopes sent on `requests` go to
    /// the peer; the stream ends when the peer closes it.
    async fn open(
        &self,
        peer: &PeerTarget,
        mode: DeliveryMode,
        requests: mpsc::Receiver<Envelope>,
    ) -> Result<DeliverStream, ListenerError>;
}

/// Connector backed by a tonic channel.
#[derive(Debug, Clone, Default)]
pub struct GrpcConnector {
    tls_client: Option<TlsClientIdentity>,
}

impl GrpcConnector {
    pub fn new(tls_client: Option<TlsClientIdentity>) -> Self {
        Self { tls_client }
    }

    fn endpoint(&self, peer: &PeerTarget) -> Result<Endpoint, ListenerError> {
        let mut endpoint = Endpoint::from_shared(peer.endpoint.clone())?
            .connect_timeout(peer.connect_timeout);
        if let Some(interval) = peer.keepalive_interval {
            endpoint = endpoint
                .http2_keep_alive_interval(interval)
                .keep_alive_while_idle(true);
        }
        if let Some(timeout) = peer.keepalive_timeout {
            endpoint = endpoint.keep_alive_timeout(timeout);
        }

        if let Some(tls) = &peer.tls {
            let mut config =
                ClientTlsConfig::new().ca_certificate(Certificate::from_pem(&tls.ca_pem));
            if let Some(domain) = &tls.domain_name {
                config = config.domain_name(domain.clone());
            }
            if let Some(client) = &self.tls_client {
                config = config.identity(Identity::from_pem(&client.cert_pem, &client.key_pem));
            }
            endpoint = endpoint.tls_config(config)?;
        }
        Ok(endpoint)
    }
}

#[async_trait]
impl DeliverConnector for GrpcConnector {
    async fn open(
        &self,
        peer: &PeerTarget,
        mode: DeliveryMode,
        requests: mpsc::Receiver<Envelope>,
    ) -> Result<DeliverStream, ListenerError> {
        debug!("Connecting to peer {} at {}", peer.name, peer.endpoint);
        let channel: Channel = self.endpoint(peer)?.connect().await?;

        let mut grpc = tonic::client::Grpc::new(channel);
        grpc = grpc.max_decoding_message_size(peer.max_receive_message_length);
        grpc.ready().await?;

        let codec = ProstCodec::<Envelope, DeliverResponse>::default();
        let response = grpc
            .streaming(
                tonic::Request::new(ReceiverStream::new(requests)),
                PathAndQuery::from_static(mode.path()),
                codec,
            )
            .await?;
        debug!("Deliver stream open on {} ({:?})", peer.name, mode);

        Ok(response
            .into_inner()
            .map(|item| item.map_err(ListenerError::from))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn target(endpoint: &str) -> PeerTarget {
        PeerTarget {
            name: "peer0".to_string(),
            endpoint: endpoint.to_string(),
            tls: None,
            connect_timeout: Duration::from_millis(200),
            keepalive_interval: Some(Duration::from_secs(120)),
            keepalive_timeout: Some(Duration::from_secs(20)),
            max_receive_message_length: usize::MAX,
        }
    }

    #[test]
    fn test_endpoint_rejects_malformed_uri() {
        let connector = GrpcConnector::default();
        assert!(matches!(
            connector.endpoint(&target("not a uri")),
            Err(ListenerError::ConnectionError(_))
        ));
    }

    #[tokio::test]
    async fn test_open_unreachable_peer_fails() {
        let connector = GrpcConnector::default();
        let (_tx, rx) = mpsc::channel(1);
        let result = connector
            .open(&target("http://127.0.0.1:1"), DeliveryMode::Full, rx)
            .await;
        assert!(matches!(result, Err(ListenerError::ConnectionError(_))));
    }
}
