#![allow(dead_code)]

use async_trait::async_trait;
use chaincode_listener::config::Config;
use chaincode_listener::core::errors::ListenerError;
use chaincode_listener::hub::{DeliverConnector, DeliverStream, DeliveryMode};
use chaincode_listener::profile::PeerTarget;
use chaincode_listener::protos::common::{
    Block, BlockData, BlockHeader, BlockMetadata, ChannelHeader, Envelope, Header, HeaderType,
    Payload,
};
use chaincode_listener::protos::peer::{
    deliver_response, ChaincodeAction, ChaincodeActionPayload, ChaincodeEndorsedAction,
    ChaincodeEvent, DeliverResponse, ProposalResponsePayload, Transaction, TransactionAction,
};
use futures::StreamExt;
use prost::Message;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub const NETWORK_PROFILE: &str = r#"
name: basic-network
version: "1.0"
x-type: hlfv1
channels:
  mychannel:
    orderers:
      - orderer.example.com
    peers:
      peer0.org1.example.com:
        endorsingPeer: true
        eventSource: true
organizations:
  Org1:
    mspid: Org1MSP
    peers:
      - peer0.org1.example.com
    adminPrivateKey:
      path: crypto/admin_sk.pem
    signedCert:
      path: crypto/admin-cert.pem
orderers:
  orderer.example.com:
    url: grpc://localhost:7050
peers:
  peer0.org1.example.com:
    url: grpc://localhost:7051
    grpcOptions:
      ssl-target-name-override: peer0.org1.example.com
  peer1.org1.example.com:
    url: grpc://localhost:8051
"#;

pub const ORG_PROFILE: &str = r#"
name: org1
version: "1.0"
client:
  organization: Org1
  credentialStore:
    path: ./hfc-key-store
    cryptoStore:
      path: ./hfc-crypto-store
"#;

pub fn key_pem() -> String {
    let rng = SystemRandom::new();
    let doc = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
    pem::encode(&pem::Pem::new("PRIVATE KEY", doc.as_ref().to_vec()))
}

pub fn cert_pem() -> String {
    pem::encode(&pem::Pem::new("CERTIFICATE", b"integration test certificate".to_vec()))
}

/// Temp directory with both profiles and the admin credentials they point to.
pub fn fixture() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), ORG_PROFILE);
    let config = Config {
        network_profile: dir.path().join("network-config.yaml"),
        org_profile: dir.path().join("org1.yaml"),
        ..Config::default()
    };
    (dir, config)
}

pub fn write_fixture(dir: &Path, org_profile: &str) {
    std::fs::create_dir_all(dir.join("crypto")).unwrap();
    std::fs::write(dir.join("crypto/admin_sk.pem"), key_pem()).unwrap();
    std::fs::write(dir.join("crypto/admin-cert.pem"), cert_pem()).unwrap();
    std::fs::write(dir.join("network-config.yaml"), NETWORK_PROFILE).unwrap();
    std::fs::write(dir.join("org1.yaml"), org_profile).unwrap();
}

pub type ResponseSender = mpsc::UnboundedSender<Result<DeliverResponse, ListenerError>>;

/// In-process deliver service. Responses pushed on the returned sender are
/// streamed to the hub; the seek envelope of each `open` is recorded.
pub struct MockConnector {
    responses: Mutex<Option<mpsc::UnboundedReceiver<Result<DeliverResponse, ListenerError>>>>,
    pub seeks: Mutex<Vec<(DeliveryMode, Envelope)>>,
}

impl MockConnector {
    pub fn new() -> (std::sync::Arc<Self>, ResponseSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = std::sync::Arc::new(Self {
            responses: Mutex::new(Some(rx)),
            seeks: Mutex::new(Vec::new()),
        });
        (connector, tx)
    }
}

#[async_trait]
impl DeliverConnector for MockConnector {
    async fn open(
        &self,
        _peer: &PeerTarget,
        mode: DeliveryMode,
        mut requests: mpsc::Receiver<Envelope>,
    ) -> Result<DeliverStream, ListenerError> {
        let seek = requests.recv().await.ok_or(ListenerError::StreamClosed)?;
        self.seeks.lock().unwrap().push((mode, seek));
        let responses = self
            .responses
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ListenerError::ConnectionError("mock already opened".to_string()))?;
        Ok(UnboundedReceiverStream::new(responses).boxed())
    }
}

pub fn event(chaincode_id: &str, name: &str, payload: &[u8]) -> ChaincodeEvent {
    ChaincodeEvent {
        chaincode_id: chaincode_id.to_string(),
        tx_id: String::new(),
        event_name: name.to_string(),
        payload: payload.to_vec(),
    }
}

fn transaction(tx_id: &str, event: &ChaincodeEvent) -> Vec<u8> {
    let action = ChaincodeAction {
        events: event.encode_to_vec(),
        ..Default::default()
    };
    let action_payload = ChaincodeActionPayload {
        chaincode_proposal_payload: Vec::new(),
        action: Some(ChaincodeEndorsedAction {
            proposal_response_payload: ProposalResponsePayload {
                proposal_hash: Vec::new(),
                extension: action.encode_to_vec(),
            }
            .encode_to_vec(),
            endorsements: Vec::new(),
        }),
    };
    let channel_header = ChannelHeader {
        r#type: HeaderType::EndorserTransaction as i32,
        channel_id: "mychannel".to_string(),
        tx_id: tx_id.to_string(),
        ..Default::default()
    };
    Envelope {
        payload: Payload {
            header: Some(Header {
                channel_header: channel_header.encode_to_vec(),
                signature_header: Vec::new(),
            }),
            data: Transaction {
                actions: vec![TransactionAction {
                    header: Vec::new(),
                    payload: action_payload.encode_to_vec(),
                }],
            }
            .encode_to_vec(),
        }
        .encode_to_vec(),
        signature: Vec::new(),
    }
    .encode_to_vec()
}

/// Full block with one valid transaction per event.
pub fn block(number: u64, events: &[ChaincodeEvent]) -> Block {
    let data = events
        .iter()
        .enumerate()
        .map(|(i, e)| transaction(&format!("tx-{}-{}", number, i), e))
        .collect::<Vec<_>>();
    Block {
        header: Some(BlockHeader {
            number,
            ..Default::default()
        }),
        metadata: Some(BlockMetadata {
            metadata: vec![Vec::new(), Vec::new(), vec![0u8; data.len()]],
        }),
        data: Some(BlockData { data }),
    }
}

pub fn block_response(
    number: u64,
    events: &[ChaincodeEvent],
) -> Result<DeliverResponse, ListenerError> {
    Ok(DeliverResponse {
        r#type: Some(deliver_response::Type::Block(block(number, events))),
    })
}

pub fn status_response(status: i32) -> Result<DeliverResponse, ListenerError> {
    Ok(DeliverResponse {
        r#type: Some(deliver_response::Type::Status(status)),
    })
}
