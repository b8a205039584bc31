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

//! chaincode-listener: subscribes to chaincode events on a permissioned
//! ledger network.
//!
//! This library carries the client side of the peer deliver service:
//! connection profiles, signing identities, the signed seek request, the
//! gRPC deliver stream and the fan-out of decoded chaincode events to
//! registered listeners.

pub mod client;
pub mod config;
pub mod core;
pub mod hub;
pub mod listener;
pub mod profile;
pub mod protos;
pub mod utils;
