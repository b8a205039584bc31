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

//! Loading and merging connection profiles.

use std::path::Path;
use tracing::debug;

use super::model::{
    resolve, ChannelSection, ConnectionProfile, CredentialStoreSection, OrganizationSection,
};
use crate::core::errors::ListenerError;

impl ConnectionProfile {
    /// Read a YAML profile. Relative paths inside it are resolved against
    /// the directory holding the file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ListenerError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ListenerError::profile(path, format!("cannot read file: {}", e)))?;
        let mut profile = Self::from_yaml(&content)
            .map_err(|e| ListenerError::profile(path, e.to_string()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        profile.resolve_paths(base);
        profile.source = path.to_path_buf();
        debug!(
            "Loaded connection profile {} (name={:?})",
            path.display(),
            profile.name
        );
        Ok(profile)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        serde_yaml_ng::from_str(content)
    }

    /// Overlay `additional` on this profile: each top-level section present
    /// in `additional` replaces the section here.
    pub fn merge(&mut self, additional: ConnectionProfile) {
        if additional.client.is_some() {
            self.client = additional.client;
        }
        if additional.channels.is_some() {
            self.channels = additional.channels;
        }
        if additional.organizations.is_some() {
            self.organizations = additional.organizations;
        }
        if additional.orderers.is_some() {
            self.orderers = additional.orderers;
        }
        if additional.peers.is_some() {
            self.peers = additional.peers;
        }
        if additional.certificate_authorities.is_some() {
            self.certificate_authorities = additional.certificate_authorities;
        }
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelSection> {
        self.channels.as_ref()?.get(name)
    }

    pub fn organization(&self, name: &str) -> Option<&OrganizationSection> {
        self.organizations.as_ref()?.get(name)
    }

    /// Organization named by `client.organization`.
    pub fn client_organization(&self) -> Option<&OrganizationSection> {
        let name = self.client.as_ref()?.organization.as_deref()?;
        self.organization(name)
    }

    pub fn credential_store(&self) -> Option<&CredentialStoreSection> {
        self.client.as_ref()?.credential_store.as_ref()
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(store) = self
            .client
            .as_mut()
            .and_then(|c| c.credential_store.as_mut())
        {
            resolve(base, &mut store.path);
            if let Some(crypto) = store.crypto_store.as_mut() {
                resolve(base, &mut crypto.path);
            }
        }
        for org in self.organizations.iter_mut().flat_map(|m| m.values_mut()) {
            if let Some(key) = org.admin_private_key.as_mut() {
                key.resolve_relative(base);
            }
            if let Some(cert) = org.signed_cert.as_mut() {
                cert.resolve_relative(base);
            }
        }
        for node in self
            .orderers
            .iter_mut()
            .chain(self.peers.iter_mut())
            .flat_map(|m| m.values_mut())
        {
            if let Some(tls) = node.tls_ca_certs.as_mut() {
                tls.resolve_relative(base);
            }
        }
        for ca in self
            .certificate_authorities
            .iter_mut()
            .flat_map(|m| m.values_mut())
        {
            if let Some(tls) = ca.tls_ca_certs.as_mut() {
                tls.resolve_relative(base);
            }
        }
    }
}
