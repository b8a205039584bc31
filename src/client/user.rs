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

//! Users: an MSP member name bound to a signing identity.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::crypto::SigningIdentity;
use crate::core::errors::{CryptoError, ListenerError};
use crate::profile::PemSource;

/// Key and certificate a user is built from.
#[derive(Debug, Clone, Default)]
pub struct CryptoContent {
    pub private_key: PemSource,
    pub signed_cert: PemSource,
}

#[derive(Debug, Clone)]
pub struct UserOptions {
    pub username: String,
    pub mspid: String,
    pub crypto_content: CryptoContent,
    /// Do not save the user to the state store.
    pub skip_persistence: bool,
}

#[derive(Debug, Clone)]
pub struct User {
    name: String,
    roles: Vec<String>,
    affiliation: String,
    identity: Arc<SigningIdentity>,
}

impl User {
    pub fn new(name: impl Into<String>, identity: SigningIdentity) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
            affiliation: String::new(),
            identity: Arc::new(identity),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn msp_id(&self) -> &str {
        self.identity.msp_id()
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn signing_identity(&self) -> &Arc<SigningIdentity> {
        &self.identity
    }

    pub(crate) fn to_stored(&self) -> StoredUser {
        StoredUser {
            name: self.name.clone(),
            mspid: self.msp_id().to_string(),
            roles: (!self.roles.is_empty()).then(|| self.roles.clone()),
            affiliation: self.affiliation.clone(),
            enrollment_secret: String::new(),
            enrollment: StoredEnrollment {
                signing_identity: self.identity.ski(),
                identity: StoredCertificate {
                    certificate: String::from_utf8_lossy(self.identity.certificate_pem())
                        .into_owned(),
                },
            },
        }
    }

    pub(crate) fn from_stored(
        stored: StoredUser,
        private_key_pem: &[u8],
    ) -> Result<Self, ListenerError> {
        let identity = SigningIdentity::from_pem(
            stored.mspid,
            private_key_pem,
            stored.enrollment.identity.certificate.as_bytes(),
        )?;
        Ok(Self {
            name: stored.name,
            roles: stored.roles.unwrap_or_default(),
            affiliation: stored.affiliation,
            identity: Arc::new(identity),
        })
    }
}

/// Persisted user record, keyed by user name in the state store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredUser {
    pub name: String,
    pub mspid: String,
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default)]
    pub enrollment_secret: String,
    pub enrollment: StoredEnrollment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredEnrollment {
    pub signing_identity: String,
    pub identity: StoredCertificate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredCertificate {
    pub certificate: String,
}

/// Read user crypto material, reporting failures as crypto errors.
pub(crate) async fn read_material(
    source: &PemSource,
    what: &str,
    to_err: fn(String) -> CryptoError,
) -> Result<Vec<u8>, CryptoError> {
    if let Some(pem) = &source.pem {
        return Ok(pem.as_bytes().to_vec());
    }
    let path = source
        .path
        .as_ref()
        .ok_or_else(|| to_err(format!("no {} configured", what)))?;
    tokio::fs::read(path)
        .await
        .map_err(|e| to_err(format!("cannot read {} {}: {}", what, path.display(), e)))
}
