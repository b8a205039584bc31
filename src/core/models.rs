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

//! Domain records delivered to chaincode event listeners.

use serde::Serialize;

use crate::protos::peer::TxValidationCode;

/// Identifies a registered listener; returned by registration and used to
/// unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cc-listener-{}", self.0)
    }
}

/// A chaincode event together with the block and transaction it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeEventRecord {
    pub chaincode_id: String,
    pub event_name: String,
    pub tx_id: String,
    /// Empty when the event arrived through a filtered block.
    pub payload: Vec<u8>,
    pub block_number: u64,
    pub tx_status: TxValidationCode,
}

impl ChaincodeEventRecord {
    /// Payload rendered as text, replacing invalid UTF-8.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    pub fn is_valid(&self) -> bool {
        self.tx_status == TxValidationCode::Valid
    }
}

/// Where the peer starts streaming blocks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPosition {
    #[default]
    Newest,
    Oldest,
    Block(u64),
}

impl std::str::FromStr for StartPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "" => Ok(StartPosition::Newest),
            "oldest" => Ok(StartPosition::Oldest),
            other => other.parse::<u64>().map(StartPosition::Block).map_err(|_| {
                format!(
                    "invalid start position '{}': expected newest, oldest or a block number",
                    s
                )
            }),
        }
    }
}

impl std::fmt::Display for StartPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartPosition::Newest => write!(f, "newest"),
            StartPosition::Oldest => write!(f, "oldest"),
            StartPosition::Block(n) => write!(f, "{}", n),
        }
    }
}
