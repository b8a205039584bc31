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

//! Serde model of a connection profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::errors::ListenerError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "x-type")]
    pub x_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub client: Option<ClientSection>,
    #[serde(default)]
    pub channels: Option<BTreeMap<String, ChannelSection>>,
    #[serde(default)]
    pub organizations: Option<BTreeMap<String, OrganizationSection>>,
    #[serde(default)]
    pub orderers: Option<BTreeMap<String, NodeSection>>,
    #[serde(default)]
    pub peers: Option<BTreeMap<String, NodeSection>>,
    #[serde(default)]
    pub certificate_authorities: Option<BTreeMap<String, CertificateAuthoritySection>>,
    /// File the profile was loaded from (the first one, after merges).
    #[serde(skip)]
    pub source: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSection {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub credential_store: Option<CredentialStoreSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStoreSection {
    pub path: PathBuf,
    #[serde(default)]
    pub crypto_store: Option<CryptoStoreSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoStoreSection {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSection {
    #[serde(default)]
    pub orderers: Vec<String>,
    #[serde(default)]
    pub peers: BTreeMap<String, ChannelPeerRoles>,
}

/// Roles a peer plays on a channel; every role defaults to enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPeerRoles {
    #[serde(default = "enabled")]
    pub endorsing_peer: bool,
    #[serde(default = "enabled")]
    pub chaincode_query: bool,
    #[serde(default = "enabled")]
    pub ledger_query: bool,
    #[serde(default = "enabled")]
    pub event_source: bool,
}

impl Default for ChannelPeerRoles {
    fn default() -> Self {
        Self {
            endorsing_peer: true,
            chaincode_query: true,
            ledger_query: true,
            event_source: true,
        }
    }
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSection {
    pub mspid: String,
    #[serde(default)]
    pub peers: Vec<String>,
    #[serde(default)]
    pub certificate_authorities: Vec<String>,
    #[serde(default)]
    pub admin_private_key: Option<PemSource>,
    #[serde(default)]
    pub signed_cert: Option<PemSource>,
}

/// Orderer or peer endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSection {
    pub url: String,
    #[serde(default)]
    pub grpc_options: BTreeMap<String, serde_yaml_ng::Value>,
    #[serde(default, rename = "tlsCACerts")]
    pub tls_ca_certs: Option<PemSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAuthoritySection {
    pub url: String,
    #[serde(default)]
    pub ca_name: Option<String>,
    #[serde(default, rename = "tlsCACerts")]
    pub tls_ca_certs: Option<PemSource>,
}

/// PEM material given inline or by path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PemSource {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub pem: Option<String>,
}

impl PemSource {
    /// Inline PEM wins over a path.
    pub async fn read(&self) -> Result<Vec<u8>, ListenerError> {
        if let Some(pem) = &self.pem {
            return Ok(pem.as_bytes().to_vec());
        }
        match &self.path {
            Some(path) => tokio::fs::read(path).await.map_err(|e| {
                ListenerError::profile(path, format!("cannot read PEM file: {}", e))
            }),
            None => Err(ListenerError::ConfigurationError(
                "PEM source has neither 'pem' nor 'path'".to_string(),
            )),
        }
    }

    pub(crate) fn resolve_relative(&mut self, base: &Path) {
        if let Some(path) = self.path.as_mut() {
            resolve(base, path);
        }
    }
}

pub(crate) fn resolve(base: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}
