//! The `transport` module is responsible for network communication with the
//! MQTT broker.
//!
//! It defines the `Subscriber` seam used by the fetcher and implements it
//! over `rumqttc` in `MqttSubscriber`. Message delivery runs on a background
//! task that owns the MQTT event loop; the foreground only sees a single-slot
//! delivery channel.

pub mod mqtt;

use std::time::Duration;

use async_trait::async_trait;

use crate::utils::TransportError;

pub use mqtt::MqttSubscriber;

/// A transient, single-topic subscription.
///
/// Implementations must make `close` safe to call in every state, including
/// before `connect` and more than once.
#[async_trait]
pub trait Subscriber: Send {
    /// Open the session and wait for the broker to accept it.
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Register interest in `topic`.
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Wait for the next delivered payload.
    async fn recv(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Stop background delivery and release the connection.
    async fn close(&mut self);

    fn is_connected(&self) -> bool;
}

/// Session parameters that are not part of the connection descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub keep_alive: Duration,
    pub connect_timeout: Duration,
    pub clean_session: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            keep_alive: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(5),
            clean_session: true,
        }
    }
}
