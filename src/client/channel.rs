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

//! Channel handle: a named channel from the profile plus the client context
//! needed to open event hubs on it.

use std::sync::Arc;
use tracing::warn;

use super::{TlsClientIdentity, User};
use crate::core::errors::ListenerError;
use crate::hub::transport::{DeliverConnector, GrpcConnector};
use crate::hub::ChannelEventHub;
use crate::profile::{ChannelSection, ConnectionProfile};

pub struct Channel {
    name: String,
    section: ChannelSection,
    profile: Arc<ConnectionProfile>,
    user: Option<Arc<User>>,
    tls_client: Option<TlsClientIdentity>,
}

impl Channel {
    pub(crate) fn new(
        name: &str,
        section: ChannelSection,
        profile: Arc<ConnectionProfile>,
        user: Option<Arc<User>>,
        tls_client: Option<TlsClientIdentity>,
    ) -> Self {
        Self {
            name: name.to_string(),
            section,
            profile,
            user,
            tls_client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event hub for `peer_name` over gRPC.
    pub async fn new_channel_event_hub(
        &self,
        peer_name: &str,
    ) -> Result<ChannelEventHub, ListenerError> {
        let connector = Arc::new(GrpcConnector::new(self.tls_client.clone()));
        self.new_channel_event_hub_with(peer_name, connector).await
    }

    /// Event hub for `peer_name` using a caller supplied transport.
    pub async fn new_channel_event_hub_with(
        &self,
        peer_name: &str,
        connector: Arc<dyn DeliverConnector>,
    ) -> Result<ChannelEventHub, ListenerError> {
        let roles = self
            .section
            .peers
            .get(peer_name)
            .ok_or_else(|| ListenerError::UnknownPeer {
                peer: peer_name.to_string(),
                channel: self.name.clone(),
            })?;
        if !roles.event_source {
            warn!(
                "Peer {} is not marked as an event source on channel {}",
                peer_name, self.name
            );
        }

        let peer = self.profile.peer_target(peer_name).await?;
        let user = self.user.as_ref().ok_or(ListenerError::MissingUserContext)?;
        let tls_cert_hash = match &self.tls_client {
            Some(tls) => Some(tls.cert_hash()?),
            None => None,
        };

        Ok(ChannelEventHub::new(
            self.name.clone(),
            peer,
            user.signing_identity().clone(),
            tls_cert_hash,
            connector,
        ))
    }
}
