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

//! Resolution of a profile peer into a dialable gRPC target.

use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

use super::model::ConnectionProfile;
use crate::core::constants::profile as keys;
use crate::core::errors::ListenerError;

/// Everything needed to open a channel to one peer.
#[derive(Debug, Clone)]
pub struct PeerTarget {
    pub name: String,
    /// `http://` or `https://` endpoint derived from the profile URL.
    pub endpoint: String,
    pub tls: Option<PeerTls>,
    pub connect_timeout: Duration,
    pub keepalive_interval: Option<Duration>,
    pub keepalive_timeout: Option<Duration>,
    /// Largest response accepted, `usize::MAX` when unlimited.
    pub max_receive_message_length: usize,
}

#[derive(Debug, Clone)]
pub struct PeerTls {
    pub ca_pem: Vec<u8>,
    /// Name checked against the peer certificate instead of the URL host.
    pub domain_name: Option<String>,
}

impl ConnectionProfile {
    pub async fn peer_target(&self, name: &str) -> Result<PeerTarget, ListenerError> {
        let node = self
            .peers
            .as_ref()
            .and_then(|peers| peers.get(name))
            .ok_or_else(|| {
                ListenerError::profile(&self.source, format!("peer '{}' is not defined", name))
            })?;

        let (endpoint, secure) = if let Some(rest) = node.url.strip_prefix(keys::GRPCS_SCHEME) {
            (format!("https://{}", rest), true)
        } else if let Some(rest) = node.url.strip_prefix(keys::GRPC_SCHEME) {
            (format!("http://{}", rest), false)
        } else {
            return Err(ListenerError::profile(
                &self.source,
                format!("peer '{}' has unsupported url '{}'", name, node.url),
            ));
        };

        let options = &node.grpc_options;
        let tls = if secure {
            let ca = node.tls_ca_certs.as_ref().ok_or_else(|| {
                ListenerError::profile(
                    &self.source,
                    format!("peer '{}' uses grpcs but has no tlsCACerts", name),
                )
            })?;
            Some(PeerTls {
                ca_pem: ca.read().await?,
                domain_name: option_str(options, keys::SSL_TARGET_NAME_OVERRIDE),
            })
        } else {
            None
        };

        let keepalive_timeout =
            option_u64(options, keys::KEEPALIVE_TIMEOUT_MS).map(Duration::from_millis);
        let keepalive_interval = match option_u64(options, keys::KEEPALIVE_TIME_MS) {
            Some(ms) => Some(Duration::from_millis(ms)),
            None if keepalive_timeout.is_some() => {
                warn!(
                    "peer '{}' sets {} without {}; using {} ms",
                    name,
                    keys::KEEPALIVE_TIMEOUT_MS,
                    keys::KEEPALIVE_TIME_MS,
                    keys::DEFAULT_KEEPALIVE_TIME_MS
                );
                Some(Duration::from_millis(keys::DEFAULT_KEEPALIVE_TIME_MS))
            }
            None => None,
        };

        Ok(PeerTarget {
            name: name.to_string(),
            endpoint,
            tls,
            connect_timeout: Duration::from_millis(
                option_u64(options, keys::WAIT_FOR_READY_TIMEOUT)
                    .unwrap_or(keys::DEFAULT_CONNECT_TIMEOUT_MS),
            ),
            keepalive_interval,
            keepalive_timeout,
            max_receive_message_length: message_limit(options, keys::MAX_RECEIVE_MESSAGE_LENGTH),
        })
    }
}

fn option_str(options: &BTreeMap<String, Value>, key: &str) -> Option<String> {
    match options.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Numbers may be written as YAML numbers or strings.
fn option_i64(options: &BTreeMap<String, Value>, key: &str) -> Option<i64> {
    match options.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Negative values read as unset.
fn option_u64(options: &BTreeMap<String, Value>, key: &str) -> Option<u64> {
    option_i64(options, key).and_then(|v| u64::try_from(v).ok())
}

/// Message size limit in bytes; absent or negative means unlimited.
fn message_limit(options: &BTreeMap<String, Value>, key: &str) -> usize {
    match option_i64(options, key) {
        Some(v) if v >= 0 => usize::try_from(v).unwrap_or(usize::MAX),
        _ => usize::MAX,
    }
}
