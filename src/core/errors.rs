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

// Domain error types for client setup and event delivery

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the listener
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Missing or malformed configuration value
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Connection profile could not be read or is inconsistent
    #[error("Connection profile error ({}): {reason}", path.display())]
    ProfileError { path: PathBuf, reason: String },

    /// Credential or crypto key store failure
    #[error("Credential store error: {0}")]
    StoreError(String),

    /// Cryptographic error
    #[error("Cryptographic error: {0}")]
    CryptoError(#[from] CryptoError),

    /// Channel not declared in the connection profile
    #[error("Channel not found for name {0}")]
    UnknownChannel(String),

    /// Peer not declared, or not assigned to the channel
    #[error("Peer with name {peer} not assigned to channel {channel}")]
    UnknownPeer { peer: String, channel: String },

    /// Operation requires a user context that was never set
    #[error("No user context has been set on the client")]
    MissingUserContext,

    /// Transport failure while connecting to the peer
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Non-success status received on the deliver stream
    #[error("Received status message on the event stream. status:{0}")]
    DeliverStatus(String),

    /// gRPC level failure on an open stream
    #[error("Event stream error: {0}")]
    StreamError(String),

    /// Peer closed the deliver stream
    #[error("fabric peer service has closed the event stream")]
    StreamClosed,

    /// Block or transaction could not be decoded
    #[error("Decode error: {0}")]
    DecodeError(#[from] prost::DecodeError),

    /// Event name is not a valid regular expression
    #[error("Invalid event name pattern: {0}")]
    InvalidEventPattern(#[from] regex::Error),

    /// Event hub used in the wrong state (e.g. connecting twice)
    #[error("Event hub state error: {0}")]
    HubState(String),

    /// Event hub shut down; delivered to every error callback
    #[error("ChannelEventHub has been shutdown: {0}")]
    HubShutdown(String),

    /// I/O Error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Cryptographic operation errors
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Failed to load private key
    #[error("Failed to load private key: {0}")]
    KeyLoadError(String),

    /// Failed to load signing certificate
    #[error("Failed to load certificate: {0}")]
    CertificateLoadError(String),

    /// Failed to sign payload
    #[error("Failed to sign payload: {0}")]
    SigningError(String),

    /// Failed to generate random bytes
    #[error("Failed to generate random bytes")]
    RandomError,
}

impl From<tonic::Status> for ListenerError {
    fn from(status: tonic::Status) -> Self {
        ListenerError::StreamError(format!("{:?}: {}", status.code(), status.message()))
    }
}

impl From<tonic::transport::Error> for ListenerError {
    fn from(err: tonic::transport::Error) -> Self {
        ListenerError::ConnectionError(err.to_string())
    }
}

impl ListenerError {
    pub(crate) fn profile(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ListenerError::ProfileError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the error ends the event stream rather than a single setup step.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            ListenerError::DeliverStatus(_)
                | ListenerError::StreamError(_)
                | ListenerError::StreamClosed
                | ListenerError::HubShutdown(_)
        )
    }
}
