mod support;

use std::time::{Duration, Instant};

use petnet::{ConnectionDescriptor, FetchResult, Payload, fetch_one, fetch_one_blocking};
use serde_json::json;
use support::{Behaviour, StubBroker};

const TOPIC: &str = "Sensor/THP2";

fn descriptor(port: u16, client_id: &str) -> ConnectionDescriptor {
    ConnectionDescriptor::new("127.0.0.1", port, TOPIC, client_id).unwrap()
}

#[tokio::test]
async fn fetch_structured_payload_end_to_end() {
    let body = br#"{"temp": 21.5, "hum": 60}"#.to_vec();
    let broker = StubBroker::start(Behaviour::Publish(body)).await;

    let result = fetch_one(&descriptor(broker.port, "petnet_e2e_json"), Duration::from_secs(5)).await;

    assert_eq!(
        result,
        FetchResult::Success(Payload::Structured(json!({"temp": 21.5, "hum": 60})))
    );
    assert!(broker.wait_closed(1, Duration::from_secs(2)).await);
    assert_eq!(broker.client_ids(), vec!["petnet_e2e_json".to_string()]);
}

#[tokio::test]
async fn fetch_plain_text_end_to_end() {
    let broker = StubBroker::start(Behaviour::Publish(b"OK".to_vec())).await;

    let result = fetch_one(&descriptor(broker.port, "petnet_e2e_text"), Duration::from_secs(5)).await;

    assert_eq!(result, FetchResult::Success(Payload::Text("OK".to_string())));
    assert!(broker.wait_closed(1, Duration::from_secs(2)).await);
}

#[tokio::test]
async fn silent_topic_times_out_and_closes() {
    let broker = StubBroker::start(Behaviour::Silent).await;
    let bound = Duration::from_millis(500);

    let started = Instant::now();
    let result = fetch_one(&descriptor(broker.port, "petnet_e2e_silent"), bound).await;
    let elapsed = started.elapsed();

    assert_eq!(result, FetchResult::Timeout);
    assert!(elapsed >= bound, "returned early: {elapsed:?}");
    assert!(
        elapsed < bound + Duration::from_millis(250),
        "returned late: {elapsed:?}"
    );
    assert!(broker.wait_closed(1, Duration::from_secs(2)).await);
}

#[tokio::test]
async fn refused_session_is_connection_error() {
    let broker = StubBroker::start(Behaviour::Refuse).await;

    let result = fetch_one(&descriptor(broker.port, "petnet_e2e_refused"), Duration::from_secs(5)).await;

    assert!(matches!(result, FetchResult::ConnectionError(_)), "{result:?}");
    assert!(broker.wait_closed(1, Duration::from_secs(2)).await);
}

#[tokio::test]
async fn rejected_subscription_is_connection_error() {
    let broker = StubBroker::start(Behaviour::RejectSubscribe).await;
    let bound = Duration::from_secs(5);

    let started = Instant::now();
    let result = fetch_one(&descriptor(broker.port, "petnet_e2e_denied"), bound).await;

    match result {
        FetchResult::ConnectionError(msg) => assert!(msg.contains("rejected"), "{msg}"),
        other => panic!("expected connection error, got {other:?}"),
    }
    // reported as soon as the SUBACK arrives, not after the wait bound
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(broker.wait_closed(1, Duration::from_secs(2)).await);
}

#[tokio::test]
async fn unreachable_broker_fails_without_hanging() {
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        fetch_one(&descriptor(port, "petnet_e2e_unreachable"), Duration::from_secs(5)),
    )
    .await
    .expect("fetch_one hung");

    assert!(matches!(result, FetchResult::ConnectionError(_)));
}

#[tokio::test]
async fn sequential_fetches_with_distinct_ids_are_independent() {
    let broker = StubBroker::start(Behaviour::Publish(b"{\"temp\": 20}".to_vec())).await;
    let first = descriptor(broker.port, "petnet_e2e_a");
    let second = first.with_client_id("petnet_e2e_b").unwrap();

    let a = fetch_one(&first, Duration::from_secs(5)).await;
    let b = fetch_one(&second, Duration::from_secs(5)).await;

    let expected = FetchResult::Success(Payload::Structured(json!({"temp": 20})));
    assert_eq!(a, expected);
    assert_eq!(b, expected);
    assert_eq!(
        broker.client_ids(),
        vec!["petnet_e2e_a".to_string(), "petnet_e2e_b".to_string()]
    );
    assert!(broker.wait_closed(2, Duration::from_secs(2)).await);
}

#[test]
fn blocking_fetch_from_sync_context() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let broker = runtime.block_on(StubBroker::start(Behaviour::Publish(b"42".to_vec())));

    let result = fetch_one_blocking(&descriptor(broker.port, "petnet_e2e_blocking"), Duration::from_secs(5));

    assert_eq!(result, FetchResult::Success(Payload::Structured(json!(42))));
    assert!(runtime.block_on(broker.wait_closed(1, Duration::from_secs(2))));
}
