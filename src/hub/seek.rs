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

//! Signed seek request that opens a deliver stream.

use prost::Message;
use serde::Serialize;

use crate::core::constants::deliver;
use crate::core::crypto::{compute_tx_id, generate_nonce, SigningIdentity};
use crate::core::errors::ListenerError;
use crate::core::models::StartPosition;
use crate::protos::common::{ChannelHeader, Envelope, Header, HeaderType, Payload, SignatureHeader};
use crate::protos::orderer::{SeekBehavior, SeekInfo, SeekPosition};
use crate::utils::time;

/// Which deliver RPC to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Full blocks; chaincode events carry their payloads.
    Full,
    /// Filtered blocks; chaincode events arrive without payloads.
    Filtered,
}

impl DeliveryMode {
    pub fn path(&self) -> &'static str {
        match self {
            DeliveryMode::Full => deliver::DELIVER_PATH,
            DeliveryMode::Filtered => deliver::DELIVER_FILTERED_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectOptions {
    pub full_block: bool,
    pub start: StartPosition,
    /// Last block to deliver; the hub shuts down once it has been seen.
    pub end_block: Option<u64>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            full_block: true,
            start: StartPosition::Newest,
            end_block: None,
        }
    }
}

impl ConnectOptions {
    pub fn mode(&self) -> DeliveryMode {
        if self.full_block {
            DeliveryMode::Full
        } else {
            DeliveryMode::Filtered
        }
    }

    pub fn validate(&self) -> Result<(), ListenerError> {
        if let (StartPosition::Block(start), Some(end)) = (self.start, self.end_block) {
            if start > end {
                return Err(ListenerError::ConfigurationError(format!(
                    "start block {} must be equal to or less than end block {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    fn seek_info(&self) -> SeekInfo {
        let start = match self.start {
            StartPosition::Newest => SeekPosition::newest(),
            StartPosition::Oldest => SeekPosition::oldest(),
            StartPosition::Block(n) => SeekPosition::specified(n),
        };
        let stop = SeekPosition::specified(self.end_block.unwrap_or(deliver::MAX_BLOCK_NUMBER));
        SeekInfo {
            start: Some(start),
            stop: Some(stop),
            behavior: SeekBehavior::BlockUntilReady as i32,
        }
    }
}

/// Build the `DELIVER_SEEK_INFO` envelope signed by `identity`.
pub fn build_seek_envelope(
    channel_id: &str,
    identity: &SigningIdentity,
    tls_cert_hash: Option<&[u8]>,
    options: &ConnectOptions,
) -> Result<Envelope, ListenerError> {
    options.validate()?;

    let creator = identity.serialize();
    let nonce = generate_nonce()?;
    let tx_id = compute_tx_id(&nonce, &creator);

    let channel_header = ChannelHeader {
        r#type: HeaderType::DeliverSeekInfo as i32,
        version: deliver::CHANNEL_HEADER_VERSION,
        timestamp: Some(time::now()),
        channel_id: channel_id.to_string(),
        tx_id,
        epoch: 0,
        extension: Vec::new(),
        tls_cert_hash: tls_cert_hash.map(<[u8]>::to_vec).unwrap_or_default(),
    };
    let signature_header = SignatureHeader { creator, nonce };

    let payload = Payload {
        header: Some(Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: signature_header.encode_to_vec(),
        }),
        data: options.seek_info().encode_to_vec(),
    }
    .encode_to_vec();

    let signature = identity.sign(&payload)?;
    Ok(Envelope { payload, signature })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::crypto::test_support::{dummy_cert_pem, generate_key_pem};
    use crate::protos::msp::SerializedIdentity;
    use crate::protos::orderer::seek_position::Type;
    use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};

    fn identity() -> SigningIdentity {
        SigningIdentity::from_pem(
            "Org1MSP",
            generate_key_pem().as_bytes(),
            dummy_cert_pem().as_bytes(),
        )
        .unwrap()
    }

    fn open(envelope: &Envelope) -> (ChannelHeader, SignatureHeader, SeekInfo) {
        let payload = Payload::decode(envelope.payload.as_slice()).unwrap();
        let header = payload.header.unwrap();
        (
            ChannelHeader::decode(header.channel_header.as_slice()).unwrap(),
            SignatureHeader::decode(header.signature_header.as_slice()).unwrap(),
            SeekInfo::decode(payload.data.as_slice()).unwrap(),
        )
    }

    #[test]
    fn test_default_seek_envelope() {
        let id = identity();
        let envelope =
            build_seek_envelope("mychannel", &id, None, &ConnectOptions::default()).unwrap();
        let (ch, sh, seek) = open(&envelope);

        assert_eq!(ch.r#type, HeaderType::DeliverSeekInfo as i32);
        assert_eq!(ch.version, 1);
        assert_eq!(ch.channel_id, "mychannel");
        assert!(ch.tls_cert_hash.is_empty());
        assert!(ch.timestamp.is_some());
        assert_eq!(ch.tx_id, compute_tx_id(&sh.nonce, &sh.creator));

        let creator = SerializedIdentity::decode(sh.creator.as_slice()).unwrap();
        assert_eq!(creator.mspid, "Org1MSP");

        assert_eq!(seek.start.unwrap().r#type, Some(Type::Newest(Default::default())));
        assert_eq!(
            seek.stop.unwrap().r#type,
            Some(Type::Specified(crate::protos::orderer::SeekSpecified {
                number: deliver::MAX_BLOCK_NUMBER
            }))
        );
        assert_eq!(seek.behavior, SeekBehavior::BlockUntilReady as i32);

        UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, id.public_key())
            .verify(&envelope.payload, &envelope.signature)
            .expect("envelope signature must verify");
    }

    #[test]
    fn test_block_range_and_tls_binding() {
        let id = identity();
        let options = ConnectOptions {
            full_block: false,
            start: StartPosition::Block(5),
            end_block: Some(9),
        };
        let envelope = build_seek_envelope("mychannel", &id, Some(&[7u8; 32]), &options).unwrap();
        let (ch, _, seek) = open(&envelope);

        assert_eq!(ch.tls_cert_hash, vec![7u8; 32]);
        assert_eq!(seek.start, Some(SeekPosition::specified(5)));
        assert_eq!(seek.stop, Some(SeekPosition::specified(9)));
        assert_eq!(options.mode(), DeliveryMode::Filtered);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let options = ConnectOptions {
            full_block: true,
            start: StartPosition::Block(10),
            end_block: Some(3),
        };
        assert!(build_seek_envelope("mychannel", &identity(), None, &options).is_err());
    }

    #[test]
    fn test_nonce_makes_tx_ids_unique() {
        let id = identity();
        let a = build_seek_envelope("c", &id, None, &ConnectOptions::default()).unwrap();
        let b = build_seek_envelope("c", &id, None, &ConnectOptions::default()).unwrap();
        assert_ne!(open(&a).0.tx_id, open(&b).0.tx_id);
    }
}
