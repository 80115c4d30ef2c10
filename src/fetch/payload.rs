//! Payload decoding and fetch outcomes
//!
//! The shape of a topic's payload is not known in advance, so structured
//! payloads are kept as an untyped `serde_json::Value` rather than decoded
//! into a schema.

use serde_json::Value;

/// A decoded message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body parsed as JSON (object, array, string, number, bool or null).
    Structured(Value),
    /// Body that is not JSON, kept as text.
    Text(String),
}

impl Payload {
    /// Decode raw bytes: JSON first, opaque text as the fallback.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn decode(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Payload::Structured(value),
            Err(_) => Payload::Text(text.into_owned()),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Payload::Structured(_))
    }
}

/// Outcome of one fetch. Every failure is folded into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Success(Payload),
    /// The broker was reachable but nothing arrived within the bound.
    Timeout,
    /// The transport failed; carries the underlying diagnostic.
    ConnectionError(String),
}

impl FetchResult {
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            FetchResult::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }
}
