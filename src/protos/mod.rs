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

//! Hand-declared protobuf messages for the Fabric deliver service.
//!
//! Only the subset needed to request a block stream and walk a block down
//! to its chaincode events is declared here. Field tags follow the
//! upstream `.proto` definitions so the messages are wire compatible.

pub mod common;
pub mod msp;
pub mod orderer;
pub mod peer;
