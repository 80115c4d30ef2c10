//! The `error` module defines the error types used within `petnet`.
//!
//! Only descriptor validation and transport failures are errors. A payload
//! that is not JSON is not an error: it degrades into `Payload::Text`, and a
//! silent topic is reported as `FetchResult::Timeout`.

use std::time::Duration;

use thiserror::Error;

/// Rejected connection descriptor fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("broker address must not be empty")]
    EmptyBroker,
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("port must be in 1..=65535, got {0}")]
    InvalidPort(u16),
    #[error("client identifier must be non-empty and must not start with whitespace")]
    InvalidClientId,
}

/// Failures of the underlying MQTT session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(#[from] rumqttc::ConnectionError),
    #[error("no CONNACK from broker within {0:?}")]
    ConnectTimeout(Duration),
    #[error("subscribe request failed: {0}")]
    Subscribe(#[from] rumqttc::ClientError),
    #[error("broker rejected the subscription (packet id {0})")]
    SubscribeRejected(u16),
    #[error("not connected")]
    NotConnected,
    #[error("delivery channel closed before a message arrived")]
    Closed,
}
