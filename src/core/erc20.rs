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

//! Payload shapes of the events emitted by the ERC20 token chaincode.
//!
//! The chaincode sets `transferEvent` on every transfer and `approvalEvent`
//! when an allowance changes; both payloads are JSON objects.

use serde::{Deserialize, Serialize};

pub const TRANSFER_EVENT: &str = "transferEvent";
pub const APPROVAL_EVENT: &str = "approvalEvent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub owner: String,
    pub spender: String,
    pub allowance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Erc20Event {
    Transfer(TransferEvent),
    Approval(Approval),
}

impl Erc20Event {
    /// Typed view of a payload; `None` for other event names or payloads
    /// that do not match the expected shape.
    pub fn decode(event_name: &str, payload: &[u8]) -> Option<Self> {
        match event_name {
            TRANSFER_EVENT => serde_json::from_slice(payload).ok().map(Erc20Event::Transfer),
            APPROVAL_EVENT => serde_json::from_slice(payload).ok().map(Erc20Event::Approval),
            _ => None,
        }
    }
}

impl std::fmt::Display for Erc20Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Erc20Event::Transfer(t) => {
                write!(f, "transfer {} -> {} amount={}", t.sender, t.recipient, t.amount)
            }
            Erc20Event::Approval(a) => {
                write!(f, "approval {} -> {} allowance={}", a.owner, a.spender, a.allowance)
            }
        }
    }
}
