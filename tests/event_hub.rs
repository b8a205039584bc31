mod common;

use chaincode_listener::core::erc20::{Erc20Event, TransferEvent};
use chaincode_listener::core::errors::ListenerError;
use chaincode_listener::core::models::{ChaincodeEventRecord, StartPosition};
use chaincode_listener::hub::{
    ChaincodeEventHandler, ChannelEventHub, ConnectOptions, DeliveryMode, FnHandler,
    RegistrationOptions,
};
use chaincode_listener::listener::{get_client, subscribe_event};
use chaincode_listener::protos::common::{ChannelHeader, HeaderType, Payload, Status};
use chaincode_listener::protos::orderer::{seek_position, SeekInfo};
use common::{block_response, event, fixture, status_response, MockConnector, ResponseSender};
use prost::Message;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum Seen {
    Event(ChaincodeEventRecord),
    Error(String),
}

fn recorder() -> (Arc<dyn ChaincodeEventHandler>, mpsc::UnboundedReceiver<Seen>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let events = tx.clone();
    let handler = FnHandler::new(
        move |record: &ChaincodeEventRecord| {
            let _ = events.send(Seen::Event(record.clone()));
        },
        move |err: &ListenerError| {
            let _ = tx.send(Seen::Error(err.to_string()));
        },
    );
    (Arc::new(handler), rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for callback")
        .expect("handler dropped")
}

fn remaining(rx: &mut mpsc::UnboundedReceiver<Seen>) -> Vec<Seen> {
    let mut seen = Vec::new();
    while let Ok(s) = rx.try_recv() {
        seen.push(s);
    }
    seen
}

async fn hub() -> (TempDir, ChannelEventHub, Arc<MockConnector>, ResponseSender) {
    let (dir, config) = fixture();
    let client = get_client(&config).await.unwrap();
    let (connector, responses) = MockConnector::new();
    let hub = client
        .get_channel("mychannel")
        .unwrap()
        .new_channel_event_hub_with("peer0.org1.example.com", connector.clone())
        .await
        .unwrap();
    (dir, hub, connector, responses)
}

async fn wait_closed(hub: &ChannelEventHub) {
    timeout(WAIT, hub.closed())
        .await
        .expect("event hub did not close");
}

#[tokio::test]
async fn test_subscribe_registers_exactly_one_listener() {
    let (_dir, config) = fixture();
    let client = get_client(&config).await.unwrap();
    let (connector, responses) = MockConnector::new();

    let (hub, handle) = subscribe_event(&client, &config, Some(connector.clone()))
        .await
        .unwrap();
    assert_eq!(hub.listener_count().await, 1);
    assert!(hub.is_connected().await);
    assert!(handle.to_string().starts_with("cc-listener-"));

    {
        let seeks = connector.seeks.lock().unwrap();
        assert_eq!(seeks.len(), 1);
        assert_eq!(seeks[0].0, DeliveryMode::Full);
        let payload = Payload::decode(seeks[0].1.payload.as_slice()).unwrap();
        let header =
            ChannelHeader::decode(payload.header.unwrap().channel_header.as_slice()).unwrap();
        assert_eq!(header.r#type, HeaderType::DeliverSeekInfo as i32);
        assert_eq!(header.channel_id, "mychannel");
        assert!(!seeks[0].1.signature.is_empty());
    }

    drop(responses);
    wait_closed(&hub).await;
    assert_eq!(hub.listener_count().await, 0);
    assert!(!hub.is_connected().await);
}

#[tokio::test]
async fn test_only_matching_listeners_receive_events() {
    let (_dir, hub, _connector, responses) = hub().await;
    let (transfers, mut transfer_rx) = recorder();
    let (other, mut other_rx) = recorder();
    hub.register_chaincode_event(
        "erc20-transfer",
        "^transfer",
        transfers,
        RegistrationOptions::default(),
    )
    .await
    .unwrap();
    hub.register_chaincode_event(
        "other-cc",
        "transferEvent",
        other,
        RegistrationOptions::default(),
    )
    .await
    .unwrap();
    hub.connect(ConnectOptions::default()).await.unwrap();

    responses
        .send(block_response(
            7,
            &[
                event(
                    "erc20-transfer",
                    "transferEvent",
                    br#"{"sender":"alice","recipient":"bob","amount":5}"#,
                ),
                event("erc20-transfer", "approvalEvent", b"{}"),
            ],
        ))
        .unwrap();

    match next(&mut transfer_rx).await {
        Seen::Event(record) => {
            assert_eq!(record.event_name, "transferEvent");
            assert_eq!(record.block_number, 7);
            assert_eq!(record.tx_id, "tx-7-0");
            assert!(record.is_valid());
            let transfer = Erc20Event::decode(&record.event_name, &record.payload);
            assert_eq!(
                transfer,
                Some(Erc20Event::Transfer(TransferEvent {
                    sender: "alice".into(),
                    recipient: "bob".into(),
                    amount: 5,
                }))
            );
        }
        other => panic!("expected event, got {:?}", other),
    }
    assert_eq!(hub.last_block_number(), Some(7));

    hub.disconnect().await;
    let rest = remaining(&mut transfer_rx);
    assert_eq!(rest.len(), 1);
    assert!(matches!(rest[0], Seen::Error(_)));
    let other_seen = remaining(&mut other_rx);
    assert_eq!(other_seen.len(), 1);
    assert!(matches!(other_seen[0], Seen::Error(_)));
}

#[tokio::test]
async fn test_unregister_option_removes_after_first_event() {
    let (_dir, hub, _connector, responses) = hub().await;
    let (once, mut once_rx) = recorder();
    let (always, mut always_rx) = recorder();
    hub.register_chaincode_event(
        "erc20-transfer",
        "transferEvent",
        once,
        RegistrationOptions {
            unregister: true,
            disconnect: false,
        },
    )
    .await
    .unwrap();
    hub.register_chaincode_event(
        "erc20-transfer",
        "transferEvent",
        always,
        RegistrationOptions::default(),
    )
    .await
    .unwrap();
    hub.connect(ConnectOptions::default()).await.unwrap();

    for n in 1..=2 {
        responses
            .send(block_response(n, &[event("erc20-transfer", "transferEvent", b"")]))
            .unwrap();
    }
    assert!(matches!(next(&mut always_rx).await, Seen::Event(_)));
    assert!(matches!(next(&mut always_rx).await, Seen::Event(_)));
    assert_eq!(hub.listener_count().await, 1);

    drop(responses);
    wait_closed(&hub).await;

    let once_seen = remaining(&mut once_rx);
    assert_eq!(once_seen.len(), 1);
    assert!(matches!(once_seen[0], Seen::Event(_)));
    match next(&mut always_rx).await {
        Seen::Error(msg) => assert!(msg.contains("closed the event stream")),
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_disconnect_option_shuts_hub_down() {
    let (_dir, hub, _connector, responses) = hub().await;
    let (trigger, mut trigger_rx) = recorder();
    let (bystander, mut bystander_rx) = recorder();
    hub.register_chaincode_event(
        "erc20-transfer",
        "transferEvent",
        trigger,
        RegistrationOptions {
            unregister: false,
            disconnect: true,
        },
    )
    .await
    .unwrap();
    hub.register_chaincode_event(
        "erc20-transfer",
        "approvalEvent",
        bystander,
        RegistrationOptions::default(),
    )
    .await
    .unwrap();
    hub.connect(ConnectOptions::default()).await.unwrap();

    responses
        .send(block_response(4, &[event("erc20-transfer", "transferEvent", b"")]))
        .unwrap();
    wait_closed(&hub).await;

    let trigger_seen = remaining(&mut trigger_rx);
    assert_eq!(trigger_seen.len(), 2);
    assert!(matches!(trigger_seen[0], Seen::Event(_)));
    assert!(matches!(
        &trigger_seen[1],
        Seen::Error(msg) if msg.contains("ChannelEventHub has been shutdown")
    ));
    let bystander_seen = remaining(&mut bystander_rx);
    assert_eq!(bystander_seen.len(), 1);
    assert!(matches!(bystander_seen[0], Seen::Error(_)));
    assert_eq!(hub.listener_count().await, 0);
}

#[tokio::test]
async fn test_end_block_closes_hub() {
    let (_dir, hub, connector, responses) = hub().await;
    let (handler, mut rx) = recorder();
    hub.register_chaincode_event(
        "erc20-transfer",
        "transferEvent",
        handler,
        RegistrationOptions::default(),
    )
    .await
    .unwrap();
    hub.connect(ConnectOptions {
        full_block: true,
        start: StartPosition::Block(1),
        end_block: Some(3),
    })
    .await
    .unwrap();

    {
        let seeks = connector.seeks.lock().unwrap();
        let payload = Payload::decode(seeks[0].1.payload.as_slice()).unwrap();
        let seek = SeekInfo::decode(payload.data.as_slice()).unwrap();
        let stop = seek.stop.unwrap().r#type.unwrap();
        assert!(matches!(stop, seek_position::Type::Specified(s) if s.number == 3));
    }

    responses.send(block_response(3, &[])).unwrap();
    wait_closed(&hub).await;
    match next(&mut rx).await {
        Seen::Error(msg) => assert!(msg.contains("end block number has been seen: 3")),
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_error_reaches_every_error_callback_once() {
    let (_dir, hub, _connector, responses) = hub().await;
    let (first, mut first_rx) = recorder();
    let (second, mut second_rx) = recorder();
    for handler in [first, second] {
        hub.register_chaincode_event(
            "erc20-transfer",
            ".*",
            handler,
            RegistrationOptions::default(),
        )
        .await
        .unwrap();
    }
    hub.connect(ConnectOptions::default()).await.unwrap();

    responses
        .send(Err(ListenerError::StreamError("Unavailable: peer went away".to_string())))
        .unwrap();
    wait_closed(&hub).await;

    for rx in [&mut first_rx, &mut second_rx] {
        let seen = remaining(rx);
        assert_eq!(seen.len(), 1);
        assert!(matches!(&seen[0], Seen::Error(msg) if msg.contains("peer went away")));
    }
    assert_eq!(hub.listener_count().await, 0);
}

#[tokio::test]
async fn test_status_message_disconnects() {
    let (_dir, hub, _connector, responses) = hub().await;
    let (handler, mut rx) = recorder();
    hub.register_chaincode_event(
        "erc20-transfer",
        "transferEvent",
        handler,
        RegistrationOptions::default(),
    )
    .await
    .unwrap();
    hub.connect(ConnectOptions::default()).await.unwrap();

    responses.send(status_response(Status::NotFound as i32)).unwrap();
    wait_closed(&hub).await;
    match next(&mut rx).await {
        Seen::Error(msg) => assert!(msg.contains("NOT_FOUND")),
        other => panic!("expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connect_twice_is_rejected() {
    let (_dir, hub, _connector, _responses) = hub().await;
    hub.connect(ConnectOptions::default()).await.unwrap();
    assert!(matches!(
        hub.connect(ConnectOptions::default()).await,
        Err(ListenerError::HubState(_))
    ));
    hub.disconnect().await;
}

#[tokio::test]
async fn test_disconnect_notifies_listeners() {
    let (_dir, hub, _connector, _responses) = hub().await;
    let (handler, mut rx) = recorder();
    hub.register_chaincode_event(
        "erc20-transfer",
        "transferEvent",
        handler,
        RegistrationOptions::default(),
    )
    .await
    .unwrap();
    hub.connect(ConnectOptions::default()).await.unwrap();

    hub.disconnect().await;
    assert!(!hub.is_connected().await);
    let seen = remaining(&mut rx);
    assert_eq!(seen.len(), 1);
    assert!(matches!(&seen[0], Seen::Error(msg) if msg.contains("disconnect requested")));
}

#[tokio::test]
async fn test_filtered_delivery_uses_filtered_service() {
    let (_dir, hub, connector, _responses) = hub().await;
    hub.connect(ConnectOptions {
        full_block: false,
        ..ConnectOptions::default()
    })
    .await
    .unwrap();
    assert_eq!(connector.seeks.lock().unwrap()[0].0, DeliveryMode::Filtered);
    hub.disconnect().await;
}
