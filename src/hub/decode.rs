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

//! Walks delivered blocks down to the chaincode events they carry.
//!
//! ```text
//! Block.data[i] ─► Envelope ─► Payload ─► ChannelHeader (ENDORSER_TRANSACTION only)
//!                                     └─► Transaction.actions[j]
//!                                           ─► ChaincodeActionPayload
//!                                           ─► ProposalResponsePayload.extension
//!                                           ─► ChaincodeAction.events ─► ChaincodeEvent
//! ```
//!
//! The validation code of transaction `i` is byte `i` of the block's
//! `TRANSACTIONS_FILTER` metadata.

use prost::Message;

use crate::core::errors::ListenerError;
use crate::core::models::ChaincodeEventRecord;
use crate::protos::common::{
    Block, BlockMetadataIndex, ChannelHeader, Envelope, HeaderType, Payload,
};
use crate::protos::peer::{
    filtered_transaction, ChaincodeAction, ChaincodeActionPayload, ChaincodeEvent, FilteredBlock,
    ProposalResponsePayload, Transaction, TxValidationCode,
};

pub fn block_number(block: &Block) -> u64 {
    block.header.as_ref().map(|h| h.number).unwrap_or_default()
}

/// Chaincode events of a full block, in transaction order.
pub fn events_from_block(block: &Block) -> Result<Vec<ChaincodeEventRecord>, ListenerError> {
    let number = block_number(block);
    let filter = block
        .metadata
        .as_ref()
        .and_then(|m| m.metadata.get(BlockMetadataIndex::TransactionsFilter as usize));

    let mut records = Vec::new();
    let transactions = block.data.iter().flat_map(|d| d.data.iter());
    for (index, raw) in transactions.enumerate() {
        let envelope = Envelope::decode(raw.as_slice())?;
        let payload = Payload::decode(envelope.payload.as_slice())?;
        let Some(header) = payload.header else {
            continue;
        };
        let channel_header = ChannelHeader::decode(header.channel_header.as_slice())?;
        if channel_header.r#type != HeaderType::EndorserTransaction as i32 {
            continue;
        }

        let status = filter
            .and_then(|codes| codes.get(index))
            .map(|code| TxValidationCode::from_code(*code as i32))
            .unwrap_or(TxValidationCode::NotValidated);

        let transaction = Transaction::decode(payload.data.as_slice())?;
        for action in &transaction.actions {
            if let Some(event) = chaincode_event(&action.payload)? {
                records.push(record(event, number, &channel_header.tx_id, status));
            }
        }
    }
    Ok(records)
}

/// Chaincode events of a filtered block; payloads are always empty.
pub fn events_from_filtered_block(block: &FilteredBlock) -> Vec<ChaincodeEventRecord> {
    let mut records = Vec::new();
    for tx in &block.filtered_transactions {
        if tx.r#type != HeaderType::EndorserTransaction as i32 {
            continue;
        }
        let status = TxValidationCode::from_code(tx.tx_validation_code);
        let Some(filtered_transaction::Data::TransactionActions(actions)) = &tx.data else {
            continue;
        };
        for action in &actions.chaincode_actions {
            if let Some(event) = &action.chaincode_event {
                records.push(record(event.clone(), block.number, &tx.txid, status));
            }
        }
    }
    records
}

fn chaincode_event(action_payload: &[u8]) -> Result<Option<ChaincodeEvent>, ListenerError> {
    let action_payload = ChaincodeActionPayload::decode(action_payload)?;
    let Some(endorsed) = action_payload.action else {
        return Ok(None);
    };
    let response = ProposalResponsePayload::decode(endorsed.proposal_response_payload.as_slice())?;
    let action = ChaincodeAction::decode(response.extension.as_slice())?;
    if action.events.is_empty() {
        return Ok(None);
    }
    Ok(Some(ChaincodeEvent::decode(action.events.as_slice())?))
}

fn record(
    event: ChaincodeEvent,
    block_number: u64,
    tx_id: &str,
    status: TxValidationCode,
) -> ChaincodeEventRecord {
    ChaincodeEventRecord {
        chaincode_id: event.chaincode_id,
        event_name: event.event_name,
        tx_id: tx_id.to_string(),
        payload: event.payload,
        block_number,
        tx_status: status,
    }
}
