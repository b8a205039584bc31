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

use serde::Serialize;
use std::env;
use std::path::PathBuf;

use crate::core::constants::{config as keys, defaults};
use crate::core::errors::ListenerError;
use crate::core::models::StartPosition;
use crate::hub::ConnectOptions;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub network_profile: PathBuf,
    pub org_profile: PathBuf,
    pub user_name: String,
    pub msp_id: String,
    pub peer_name: String,
    pub channel_name: String,
    pub chaincode_id: String,
    /// Regular expression matched against chaincode event names.
    pub chaincode_event: String,
    /// Falls back to the organization's `adminPrivateKey` when unset.
    pub private_key: Option<PathBuf>,
    /// Falls back to the organization's `signedCert` when unset.
    pub signed_cert: Option<PathBuf>,
    pub tls_client_cert: Option<PathBuf>,
    pub tls_client_key: Option<PathBuf>,
    pub full_block: bool,
    pub start: StartPosition,
    pub end_block: Option<u64>,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

/// Command line values. A set field replaces its environment variable,
/// which is then not parsed at all.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub network_profile: Option<PathBuf>,
    pub org_profile: Option<PathBuf>,
    pub peer_name: Option<String>,
    pub channel_name: Option<String>,
    pub chaincode_id: Option<String>,
    pub chaincode_event: Option<String>,
    pub private_key: Option<PathBuf>,
    pub signed_cert: Option<PathBuf>,
    /// Forces filtered delivery.
    pub filtered: bool,
    pub start: Option<StartPosition>,
    pub end_block: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ListenerError> {
        Self::from_env_with(Overrides::default())
    }

    /// Environment configuration with `overrides` applied on top.
    pub fn from_env_with(overrides: Overrides) -> Result<Self, ListenerError> {
        let base = Self::default();
        let full_block = if overrides.filtered {
            false
        } else {
            match env::var(keys::ENV_FULL_BLOCK) {
                Ok(v) => parse_bool(keys::ENV_FULL_BLOCK, &v)?,
                Err(_) => base.full_block,
            }
        };
        let start = match overrides.start {
            Some(start) => start,
            None => match env::var(keys::ENV_START_BLOCK) {
                Ok(v) => v.parse().map_err(ListenerError::ConfigurationError)?,
                Err(_) => base.start,
            },
        };
        let end_block = match overrides.end_block {
            Some(end) => Some(end),
            None => env_end_block()?,
        };

        Ok(Self {
            network_profile: overrides
                .network_profile
                .or_else(|| env_path(keys::ENV_NETWORK_PROFILE))
                .unwrap_or(base.network_profile),
            org_profile: overrides
                .org_profile
                .or_else(|| env_path(keys::ENV_ORG_PROFILE))
                .unwrap_or(base.org_profile),
            user_name: env::var(keys::ENV_USER_NAME).unwrap_or(base.user_name),
            msp_id: env::var(keys::ENV_MSP_ID).unwrap_or(base.msp_id),
            peer_name: env_or(overrides.peer_name, keys::ENV_PEER_NAME, base.peer_name),
            channel_name: env_or(overrides.channel_name, keys::ENV_CHANNEL_NAME, base.channel_name),
            chaincode_id: env_or(overrides.chaincode_id, keys::ENV_CHAINCODE_ID, base.chaincode_id),
            chaincode_event: env_or(
                overrides.chaincode_event,
                keys::ENV_CHAINCODE_EVENT,
                base.chaincode_event,
            ),
            private_key: overrides.private_key.or_else(|| env_path(keys::ENV_PRIVATE_KEY)),
            signed_cert: overrides.signed_cert.or_else(|| env_path(keys::ENV_SIGNED_CERT)),
            tls_client_cert: env_path(keys::ENV_TLS_CLIENT_CERT),
            tls_client_key: env_path(keys::ENV_TLS_CLIENT_KEY),
            full_block,
            start,
            end_block,
            log_level: env::var(keys::ENV_LOG_LEVEL).unwrap_or(base.log_level),
            log_format: env::var(keys::ENV_LOG_FORMAT).unwrap_or(base.log_format),
        })
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            full_block: self.full_block,
            start: self.start,
            end_block: self.end_block,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network_profile: PathBuf::from(defaults::NETWORK_PROFILE),
            org_profile: PathBuf::from(defaults::ORG_PROFILE),
            user_name: defaults::USER_NAME.to_string(),
            msp_id: defaults::MSP_ID.to_string(),
            peer_name: defaults::PEER_NAME.to_string(),
            channel_name: defaults::CHANNEL_NAME.to_string(),
            chaincode_id: defaults::CHAINCODE_ID.to_string(),
            chaincode_event: defaults::CHAINCODE_EVENT.to_string(),
            private_key: None,
            signed_cert: None,
            tls_client_cert: None,
            tls_client_key: None,
            full_block: true,
            start: StartPosition::Newest,
            end_block: None,
            log_level: defaults::LOG_LEVEL.to_string(),
            log_format: defaults::LOG_FORMAT.to_string(),
        }
    }
}

fn env_or(value: Option<String>, key: &str, default: String) -> String {
    value.or_else(|| env::var(key).ok()).unwrap_or(default)
}

fn env_end_block() -> Result<Option<u64>, ListenerError> {
    match env::var(keys::ENV_END_BLOCK) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().map(Some).map_err(|_| {
            ListenerError::ConfigurationError(format!(
                "{} must be a block number, got '{}'",
                keys::ENV_END_BLOCK,
                v
            ))
        }),
        _ => Ok(None),
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ListenerError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ListenerError::ConfigurationError(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}
