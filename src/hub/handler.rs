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

//! Callback side of a chaincode event registration.

use tracing::{debug, error, info, warn};

use crate::core::erc20::Erc20Event;
use crate::core::errors::ListenerError;
use crate::core::models::ChaincodeEventRecord;

/// Receives matching chaincode events and stream errors.
///
/// Callbacks run on the hub's dispatch task; keep them short and do not block.
pub trait ChaincodeEventHandler: Send + Sync + 'static {
    fn on_event(&self, event: &ChaincodeEventRecord);

    /// Called once when the hub disconnects while this listener is registered.
    fn on_error(&self, error: &ListenerError);
}

/// Handler built from a pair of closures.
pub struct FnHandler<E, R> {
    on_event: E,
    on_error: R,
}

impl<E, R> FnHandler<E, R>
where
    E: Fn(&ChaincodeEventRecord) + Send + Sync + 'static,
    R: Fn(&ListenerError) + Send + Sync + 'static,
{
    pub fn new(on_event: E, on_error: R) -> Self {
        Self { on_event, on_error }
    }
}

impl<E, R> ChaincodeEventHandler for FnHandler<E, R>
where
    E: Fn(&ChaincodeEventRecord) + Send + Sync + 'static,
    R: Fn(&ListenerError) + Send + Sync + 'static,
{
    fn on_event(&self, event: &ChaincodeEventRecord) {
        (self.on_event)(event)
    }

    fn on_error(&self, error: &ListenerError) {
        (self.on_error)(error)
    }
}

/// Console callbacks: one log line per event or error.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ChaincodeEventHandler for LoggingHandler {
    fn on_event(&self, event: &ChaincodeEventRecord) {
        info!(
            block = event.block_number,
            tx_id = %event.tx_id,
            status = %event.tx_status,
            "chaincode event emitted: {}  {}  {}",
            event.chaincode_id,
            event.event_name,
            event.payload_text()
        );
        if let Some(decoded) = Erc20Event::decode(&event.event_name, &event.payload) {
            debug!(tx_id = %event.tx_id, "{}", decoded);
        }
    }

    fn on_error(&self, err: &ListenerError) {
        if err.is_disconnect() {
            warn!("chaincode event error: {}", err);
        } else {
            error!("chaincode event error: {}", err);
        }
    }
}
