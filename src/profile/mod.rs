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

//! Connection profiles.
//!
//! A connection profile is the YAML document describing the network: the
//! client's organization and credential store, channels, organizations,
//! orderers, peers and certificate authorities. The listener loads a
//! network-level profile and merges an organization-level one on top.

pub mod loader;
pub mod model;
pub mod peer;

pub use model::{
    ChannelPeerRoles, ChannelSection, ClientSection, ConnectionProfile, CredentialStoreSection,
    NodeSection, OrganizationSection, PemSource,
};
pub use peer::{PeerTarget, PeerTls};
