//! Connection descriptor
//!
//! A `ConnectionDescriptor` is built fresh for every fetch and never
//! persisted. Construction validates every field, so a descriptor that
//! exists is always usable by the transport.
//!
//! The client identifier must be unique per concurrent session: brokers
//! evict the older session when two clients connect with the same id.
//! Uniqueness is the caller's job; `generate_client_id` helps with it.

use std::fmt;

use uuid::Uuid;

use crate::utils::DescriptorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    broker: String,
    port: u16,
    topic: String,
    client_id: String,
}

impl ConnectionDescriptor {
    /// Validate and build a descriptor.
    ///
    /// Broker address and topic are trimmed and must be non-empty, the port
    /// must be a usable TCP port and the client id must be non-empty and must
    /// not start with whitespace.
    pub fn new(
        broker: impl Into<String>,
        port: u16,
        topic: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let broker = broker.into().trim().to_string();
        let topic = topic.into().trim().to_string();
        let client_id = client_id.into();

        if broker.is_empty() {
            return Err(DescriptorError::EmptyBroker);
        }
        if port == 0 {
            return Err(DescriptorError::InvalidPort(port));
        }
        if topic.is_empty() {
            return Err(DescriptorError::EmptyTopic);
        }
        if client_id.is_empty() || client_id.starts_with(char::is_whitespace) {
            return Err(DescriptorError::InvalidClientId);
        }

        Ok(Self {
            broker,
            port,
            topic,
            client_id,
        })
    }

    pub fn broker(&self) -> &str {
        &self.broker
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Same coordinates under a different client identifier.
    pub fn with_client_id(&self, client_id: impl Into<String>) -> Result<Self, DescriptorError> {
        Self::new(self.broker.clone(), self.port, self.topic.clone(), client_id)
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mqtt://{}:{}/{} as {}",
            self.broker, self.port, self.topic, self.client_id
        )
    }
}

/// Build a client identifier from `prefix` and a random suffix.
pub fn generate_client_id(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}
