//! # PetNet
//!
//! `petnet` is a small operator console for MQTT sensors. It connects to a
//! broker, subscribes to one topic, waits a bounded time for a single
//! message and renders it as labelled metrics or raw text.
//!
//! ## Core Modules
//!
//! - `client`: the validated connection descriptor and client id generation.
//! - `transport`: the `Subscriber` seam and its MQTT implementation.
//! - `fetch`: the bounded single-message fetcher and payload decoding.
//! - `dashboard`: rendering, the last-result session and the interactive console.
//! - `config`: loading and merging console configuration.
//! - `utils`: error types and logging.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod transport;
pub mod utils;

pub use client::ConnectionDescriptor;
pub use fetch::{FetchResult, Payload, fetch_one, fetch_one_blocking, fetch_one_with};
