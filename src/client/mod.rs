//! The `client` module defines how this console identifies itself to a broker.
//!
//! It provides the `ConnectionDescriptor`, the validated set of coordinates
//! (broker address, port, topic, client identifier) used for one fetch, and
//! the generator for per-fetch client identifiers.

pub mod descriptor;
pub use descriptor::{ConnectionDescriptor, generate_client_id};

#[cfg(test)]
mod tests;
