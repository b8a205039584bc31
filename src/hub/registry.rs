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

//! Listener bookkeeping for an event hub.

use regex::Regex;
use std::sync::Arc;

use super::handler::ChaincodeEventHandler;
use crate::core::errors::ListenerError;
use crate::core::models::{ChaincodeEventRecord, ListenerHandle};

/// Per-registration behavior after the first delivered event.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationOptions {
    /// Remove the listener after its first event.
    pub unregister: bool,
    /// Shut the whole hub down after this listener's first event.
    pub disconnect: bool,
}

struct Registration {
    handle: ListenerHandle,
    chaincode_id: String,
    event_name: Regex,
    handler: Arc<dyn ChaincodeEventHandler>,
    options: RegistrationOptions,
}

impl Registration {
    fn matches(&self, record: &ChaincodeEventRecord) -> bool {
        self.chaincode_id == record.chaincode_id && self.event_name.is_match(&record.event_name)
    }
}

/// Handlers selected for one event.
pub struct Dispatch {
    pub handlers: Vec<Arc<dyn ChaincodeEventHandler>>,
    pub disconnect: bool,
}

#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl ListenerRegistry {
    /// `event_name` is a regular expression searched within event names.
    pub fn register(
        &mut self,
        chaincode_id: &str,
        event_name: &str,
        handler: Arc<dyn ChaincodeEventHandler>,
        options: RegistrationOptions,
    ) -> Result<ListenerHandle, ListenerError> {
        if chaincode_id.is_empty() {
            return Err(ListenerError::ConfigurationError(
                "Missing \"chaincode_id\" parameter".to_string(),
            ));
        }
        if event_name.is_empty() {
            return Err(ListenerError::ConfigurationError(
                "Missing \"event_name\" parameter".to_string(),
            ));
        }
        let event_name = Regex::new(event_name)?;

        self.next_id += 1;
        let handle = ListenerHandle::new(self.next_id);
        self.registrations.push(Registration {
            handle,
            chaincode_id: chaincode_id.to_string(),
            event_name,
            handler,
            options,
        });
        Ok(handle)
    }

    pub fn unregister(&mut self, handle: ListenerHandle) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.handle != handle);
        before != self.registrations.len()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Select handlers for `record`, dropping one-shot registrations.
    pub fn dispatch(&mut self, record: &ChaincodeEventRecord) -> Dispatch {
        let mut dispatch = Dispatch {
            handlers: Vec::new(),
            disconnect: false,
        };
        self.registrations.retain(|reg| {
            if !reg.matches(record) {
                return true;
            }
            dispatch.handlers.push(reg.handler.clone());
            dispatch.disconnect |= reg.options.disconnect;
            !reg.options.unregister
        });
        dispatch
    }

    /// Remove every registration, returning their handlers.
    pub fn drain(&mut self) -> Vec<Arc<dyn ChaincodeEventHandler>> {
        self.registrations.drain(..).map(|r| r.handler).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::handler::FnHandler;
    use crate::protos::peer::TxValidationCode;

    fn noop() -> Arc<dyn ChaincodeEventHandler> {
        Arc::new(FnHandler::new(
            |_: &ChaincodeEventRecord| {},
            |_: &ListenerError| {},
        ))
    }

    fn record(cc: &str, name: &str) -> ChaincodeEventRecord {
        ChaincodeEventRecord {
            chaincode_id: cc.into(),
            event_name: name.into(),
            tx_id: "tx".into(),
            payload: Vec::new(),
            block_number: 7,
            tx_status: TxValidationCode::Valid,
        }
    }

    #[test]
    fn test_matches_exact_chaincode_and_pattern() {
        let mut reg = ListenerRegistry::default();
        reg.register("erc20", "^transfer", noop(), RegistrationOptions::default())
            .unwrap();

        assert_eq!(reg.dispatch(&record("erc20", "transferEvent")).handlers.len(), 1);
        assert!(reg.dispatch(&record("erc20", "approvalEvent")).handlers.is_empty());
        assert!(reg.dispatch(&record("erc20-v2", "transferEvent")).handlers.is_empty());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unregister_option_is_one_shot() {
        let mut reg = ListenerRegistry::default();
        reg.register(
            "erc20",
            "transferEvent",
            noop(),
            RegistrationOptions {
                unregister: true,
                disconnect: false,
            },
        )
        .unwrap();

        let first = reg.dispatch(&record("erc20", "transferEvent"));
        assert_eq!(first.handlers.len(), 1);
        assert!(!first.disconnect);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_handles_are_unique_and_unregister() {
        let mut reg = ListenerRegistry::default();
        let a = reg.register("cc", "a", noop(), Default::default()).unwrap();
        let b = reg.register("cc", "b", noop(), Default::default()).unwrap();
        assert_ne!(a, b);
        assert!(reg.unregister(a));
        assert!(!reg.unregister(a));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.drain().len(), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_invalid_registrations() {
        let mut reg = ListenerRegistry::default();
        assert!(matches!(
            reg.register("cc", "(", noop(), Default::default()),
            Err(ListenerError::InvalidEventPattern(_))
        ));
        assert!(reg.register("", "ev", noop(), Default::default()).is_err());
        assert!(reg.register("cc", "", noop(), Default::default()).is_err());
    }
}
