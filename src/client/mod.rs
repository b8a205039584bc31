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

//! Client construction: profiles, credential stores, user context and
//! channel lookup.

pub mod channel;
pub mod store;
pub mod user;

pub use channel::Channel;
pub use store::FileKeyValueStore;
pub use user::{CryptoContent, User, UserOptions};

use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::constants::crypto;
use crate::core::crypto::SigningIdentity;
use crate::core::errors::{CryptoError, ListenerError};
use crate::profile::ConnectionProfile;
use user::{read_material, StoredUser};

/// Client certificate and key presented to peers requiring mutual TLS.
#[derive(Debug, Clone)]
pub struct TlsClientIdentity {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

impl TlsClientIdentity {
    /// SHA-256 of the DER certificate, bound into seek request headers.
    pub fn cert_hash(&self) -> Result<Vec<u8>, CryptoError> {
        let cert = pem::parse(&self.cert_pem)
            .map_err(|e| CryptoError::CertificateLoadError(e.to_string()))?;
        Ok(Sha256::digest(cert.contents()).to_vec())
    }
}

pub struct Client {
    profile: Arc<ConnectionProfile>,
    state_store: Option<FileKeyValueStore>,
    crypto_store: Option<FileKeyValueStore>,
    user: Option<Arc<User>>,
    tls_client: Option<TlsClientIdentity>,
}

impl Client {
    pub async fn load_from_config(path: impl AsRef<Path>) -> Result<Self, ListenerError> {
        let profile = ConnectionProfile::load(path).await?;
        Ok(Self::from_profile(profile))
    }

    pub fn from_profile(profile: ConnectionProfile) -> Self {
        Self {
            profile: Arc::new(profile),
            state_store: None,
            crypto_store: None,
            user: None,
            tls_client: None,
        }
    }

    /// Merge a second profile (typically the organization's) into this client.
    pub async fn load_additional_config(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<(), ListenerError> {
        let additional = ConnectionProfile::load(path).await?;
        Arc::make_mut(&mut self.profile).merge(additional);
        Ok(())
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// Open the state store and crypto key store named by `client.credentialStore`.
    pub async fn init_credential_stores(&mut self) -> Result<(), ListenerError> {
        let settings = self.profile.credential_store().cloned().ok_or_else(|| {
            ListenerError::ConfigurationError("No credentialStore settings found".to_string())
        })?;

        self.state_store = Some(FileKeyValueStore::open(&settings.path).await?);
        self.crypto_store = match &settings.crypto_store {
            Some(crypto) => Some(FileKeyValueStore::open(&crypto.path).await?),
            None => None,
        };
        info!(
            "Credential stores initialized (state={}, crypto={})",
            settings.path.display(),
            settings
                .crypto_store
                .as_ref()
                .map(|c| c.path.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        Ok(())
    }

    pub fn set_tls_client_cert_and_key(&mut self, identity: TlsClientIdentity) {
        self.tls_client = Some(identity);
    }

    /// Build a user from its crypto content and make it the user context.
    pub async fn create_user(&mut self, opts: UserOptions) -> Result<Arc<User>, ListenerError> {
        if opts.username.is_empty() {
            return Err(ListenerError::ConfigurationError(
                "Client.createUser missing required 'username' parameter".to_string(),
            ));
        }
        if opts.mspid.is_empty() {
            return Err(ListenerError::ConfigurationError(
                "Client.createUser missing required 'mspid' parameter".to_string(),
            ));
        }

        let key = read_material(
            &opts.crypto_content.private_key,
            "private key",
            CryptoError::KeyLoadError,
        )
        .await?;
        let cert = read_material(
            &opts.crypto_content.signed_cert,
            "signed certificate",
            CryptoError::CertificateLoadError,
        )
        .await?;

        let identity = SigningIdentity::from_pem(opts.mspid, &key, &cert)?;
        debug!("Created identity for '{}' ski={}", opts.username, identity.ski());
        let user = Arc::new(User::new(opts.username, identity));
        self.set_user_context(user, opts.skip_persistence).await
    }

    /// Make `user` the active context, saving it unless `skip_persistence`.
    pub async fn set_user_context(
        &mut self,
        user: Arc<User>,
        skip_persistence: bool,
    ) -> Result<Arc<User>, ListenerError> {
        self.user = Some(user.clone());
        if !skip_persistence {
            self.save_user_to_state_store().await?;
        }
        Ok(user)
    }

    pub fn user_context(&self) -> Option<&Arc<User>> {
        self.user.as_ref()
    }

    /// Restore a previously persisted user into the context.
    pub async fn load_user_from_state_store(
        &mut self,
        name: &str,
    ) -> Result<Option<Arc<User>>, ListenerError> {
        let store = self.state_store.as_ref().ok_or_else(|| {
            ListenerError::StoreError("state store has not been initialized".to_string())
        })?;
        let Some(json) = store.get_value(name).await? else {
            return Ok(None);
        };
        let stored: StoredUser = serde_json::from_str(&json).map_err(|e| {
            ListenerError::StoreError(format!("corrupt user record '{}': {}", name, e))
        })?;

        let crypto = self.crypto_store.as_ref().ok_or_else(|| {
            ListenerError::StoreError("crypto store has not been initialized".to_string())
        })?;
        let key_name = format!(
            "{}{}",
            stored.enrollment.signing_identity,
            crypto::PRIVATE_KEY_SUFFIX
        );
        let key = crypto.get_value(&key_name).await?.ok_or_else(|| {
            ListenerError::StoreError(format!("private key '{}' not found", key_name))
        })?;

        let user = Arc::new(User::from_stored(stored, key.as_bytes())?);
        self.user = Some(user.clone());
        Ok(Some(user))
    }

    async fn save_user_to_state_store(&self) -> Result<(), ListenerError> {
        let user = self.user.as_ref().ok_or(ListenerError::MissingUserContext)?;
        let store = self.state_store.as_ref().ok_or_else(|| {
            ListenerError::StoreError(
                "Cannot save user to state store when stateStore is null".to_string(),
            )
        })?;

        let record = serde_json::to_string(&user.to_stored())
            .map_err(|e| ListenerError::StoreError(e.to_string()))?;
        store.set_value(user.name(), &record).await?;

        if let Some(crypto) = &self.crypto_store {
            let identity = user.signing_identity();
            let key_name = format!("{}{}", identity.ski(), crypto::PRIVATE_KEY_SUFFIX);
            crypto.set_value(&key_name, identity.private_key_pem()).await?;
        }
        debug!("Saved user '{}' to state store", user.name());
        Ok(())
    }

    /// Channel declared under `channels` in the profile.
    pub fn get_channel(&self, name: &str) -> Result<Channel, ListenerError> {
        let section = self
            .profile
            .channel(name)
            .ok_or_else(|| ListenerError::UnknownChannel(name.to_string()))?;
        Ok(Channel::new(
            name,
            section.clone(),
            self.profile.clone(),
            self.user.clone(),
            self.tls_client.clone(),
        ))
    }
}
