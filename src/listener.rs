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

//! The two setup routines of the listener binary: build an authenticated
//! client, then subscribe to the configured chaincode event.

use std::sync::Arc;
use tracing::{debug, info};

use crate::client::{Client, CryptoContent, TlsClientIdentity, UserOptions};
use crate::config::Config;
use crate::core::errors::ListenerError;
use crate::core::models::ListenerHandle;
use crate::hub::{
    ChaincodeEventHandler, ChannelEventHub, DeliverConnector, LoggingHandler, RegistrationOptions,
};
use crate::profile::{OrganizationSection, PemSource};

/// Client with merged profiles, open credential stores and the configured
/// user as its (persisted) user context.
pub async fn get_client(config: &Config) -> Result<Client, ListenerError> {
    let mut client = Client::load_from_config(&config.network_profile).await?;
    client.load_additional_config(&config.org_profile).await?;
    client.init_credential_stores().await?;

    if let Some(identity) = tls_client_identity(config).await? {
        client.set_tls_client_cert_and_key(identity);
    }

    let crypto_content = crypto_content(config, &client)?;
    let user = client
        .create_user(UserOptions {
            username: config.user_name.clone(),
            mspid: config.msp_id.clone(),
            crypto_content,
            skip_persistence: true,
        })
        .await?;
    client.set_user_context(user, false).await?;
    info!("User '{}' ({}) set as client context", config.user_name, config.msp_id);
    Ok(client)
}

/// Register the logging handler for the configured chaincode event and
/// connect. Without `connector` the hub dials the peer over gRPC.
pub async fn subscribe_event(
    client: &Client,
    config: &Config,
    connector: Option<Arc<dyn DeliverConnector>>,
) -> Result<(ChannelEventHub, ListenerHandle), ListenerError> {
    let channel = client.get_channel(&config.channel_name)?;
    let hub = match connector {
        Some(connector) => {
            channel
                .new_channel_event_hub_with(&config.peer_name, connector)
                .await?
        }
        None => channel.new_channel_event_hub(&config.peer_name).await?,
    };

    let handler: Arc<dyn ChaincodeEventHandler> = Arc::new(LoggingHandler);
    let handle = hub
        .register_chaincode_event(
            &config.chaincode_id,
            &config.chaincode_event,
            handler,
            RegistrationOptions::default(),
        )
        .await?;
    hub.connect(config.connect_options()).await?;
    Ok((hub, handle))
}

fn crypto_content(config: &Config, client: &Client) -> Result<CryptoContent, ListenerError> {
    let org = organization_for(client, &config.msp_id);
    let private_key = pem_source(
        config.private_key.as_ref(),
        org.and_then(|o| o.admin_private_key.as_ref()),
        "private key",
    )?;
    let signed_cert = pem_source(
        config.signed_cert.as_ref(),
        org.and_then(|o| o.signed_cert.as_ref()),
        "signed certificate",
    )?;
    Ok(CryptoContent {
        private_key,
        signed_cert,
    })
}

fn organization_for<'a>(client: &'a Client, msp_id: &str) -> Option<&'a OrganizationSection> {
    client
        .profile()
        .organizations
        .as_ref()
        .and_then(|orgs| orgs.values().find(|org| org.mspid == msp_id))
        .or_else(|| client.profile().client_organization())
}

fn pem_source(
    explicit: Option<&std::path::PathBuf>,
    fallback: Option<&PemSource>,
    what: &str,
) -> Result<PemSource, ListenerError> {
    match (explicit, fallback) {
        (Some(path), _) => Ok(PemSource {
            path: Some(path.clone()),
            pem: None,
        }),
        (None, Some(source)) => {
            debug!("Using {} from the organization profile", what);
            Ok(source.clone())
        }
        (None, None) => Err(ListenerError::ConfigurationError(format!(
            "no {} configured and the organization profile provides none",
            what
        ))),
    }
}

async fn tls_client_identity(config: &Config) -> Result<Option<TlsClientIdentity>, ListenerError> {
    match (&config.tls_client_cert, &config.tls_client_key) {
        (Some(cert), Some(key)) => Ok(Some(TlsClientIdentity {
            cert_pem: tokio::fs::read(cert).await?,
            key_pem: tokio::fs::read(key).await?,
        })),
        (None, None) => Ok(None),
        _ => Err(ListenerError::ConfigurationError(
            "TLS client certificate and key must be configured together".to_string(),
        )),
    }
}
