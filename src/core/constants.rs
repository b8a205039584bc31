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

//! chaincode-listener Constants - Single source of truth for all configuration values.
//!
//! This module centralizes protocol identifiers, defaults and environment
//! variable names so the binary and the library agree on them.

/// Defaults matching the sample network the listener was written against
pub mod defaults {
    pub const NETWORK_PROFILE: &str = "network-config.yaml";
    pub const ORG_PROFILE: &str = "org1.yaml";
    pub const USER_NAME: &str = "my";
    pub const MSP_ID: &str = "Org1MSP";
    pub const PEER_NAME: &str = "peer0.org1.example.com";
    pub const CHANNEL_NAME: &str = "mychannel";
    pub const CHAINCODE_ID: &str = "erc20-transfer";
    pub const CHAINCODE_EVENT: &str = "transferEvent";
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FORMAT: &str = "text";
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_NETWORK_PROFILE: &str = "CC_LISTENER_NETWORK_PROFILE";
    pub const ENV_ORG_PROFILE: &str = "CC_LISTENER_ORG_PROFILE";
    pub const ENV_USER_NAME: &str = "CC_LISTENER_USER_NAME";
    pub const ENV_MSP_ID: &str = "CC_LISTENER_MSP_ID";
    pub const ENV_PEER_NAME: &str = "CC_LISTENER_PEER_NAME";
    pub const ENV_CHANNEL_NAME: &str = "CC_LISTENER_CHANNEL_NAME";
    pub const ENV_CHAINCODE_ID: &str = "CC_LISTENER_CHAINCODE_ID";
    pub const ENV_CHAINCODE_EVENT: &str = "CC_LISTENER_CHAINCODE_EVENT";
    pub const ENV_PRIVATE_KEY: &str = "CC_LISTENER_PRIVATE_KEY";
    pub const ENV_SIGNED_CERT: &str = "CC_LISTENER_SIGNED_CERT";
    pub const ENV_TLS_CLIENT_CERT: &str = "CC_LISTENER_TLS_CLIENT_CERT";
    pub const ENV_TLS_CLIENT_KEY: &str = "CC_LISTENER_TLS_CLIENT_KEY";
    pub const ENV_FULL_BLOCK: &str = "CC_LISTENER_FULL_BLOCK";
    pub const ENV_START_BLOCK: &str = "CC_LISTENER_START_BLOCK";
    pub const ENV_END_BLOCK: &str = "CC_LISTENER_END_BLOCK";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Cryptographic constants
pub mod crypto {
    /// Length of the random nonce placed in every signature header
    pub const NONCE_LENGTH: usize = 24;
    /// PEM tag of a PKCS#8 private key
    pub const PEM_TAG_PRIVATE_KEY: &str = "PRIVATE KEY";
    /// PEM tag of an X.509 certificate
    pub const PEM_TAG_CERTIFICATE: &str = "CERTIFICATE";
    /// Suffix of private key entries in the crypto key store
    pub const PRIVATE_KEY_SUFFIX: &str = "-priv";
}

/// Deliver service
pub mod deliver {
    pub const DELIVER_PATH: &str = "/protos.Deliver/Deliver";
    pub const DELIVER_FILTERED_PATH: &str = "/protos.Deliver/DeliverFiltered";
    /// Channel header version used for seek requests
    pub const CHANNEL_HEADER_VERSION: i32 = 1;
    /// Open-ended stop position (largest signed 64-bit block number)
    pub const MAX_BLOCK_NUMBER: u64 = i64::MAX as u64;
    /// Request-side channel capacity; only the seek envelope is ever sent
    pub const REQUEST_BUFFER: usize = 1;
}

/// Connection profile keys
pub mod profile {
    pub const GRPC_SCHEME: &str = "grpc://";
    pub const GRPCS_SCHEME: &str = "grpcs://";
    pub const SSL_TARGET_NAME_OVERRIDE: &str = "ssl-target-name-override";
    pub const KEEPALIVE_TIME_MS: &str = "grpc.keepalive_time_ms";
    pub const KEEPALIVE_TIMEOUT_MS: &str = "grpc.keepalive_timeout_ms";
    pub const MAX_RECEIVE_MESSAGE_LENGTH: &str = "grpc.max_receive_message_length";
    pub const WAIT_FOR_READY_TIMEOUT: &str = "grpc-wait-for-ready-timeout";
    /// Keepalive interval applied when only a keepalive timeout is given
    pub const DEFAULT_KEEPALIVE_TIME_MS: u64 = 120_000;
    /// Connect timeout used when the profile does not carry one
    pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;
}
