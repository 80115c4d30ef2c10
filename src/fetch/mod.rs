//! The `fetch` module is the core of the console: one bounded
//! subscribe-wait-unsubscribe cycle per call.
//!
//! - `payload`: decoding of delivered bytes and the `FetchResult` outcome.
//! - `fetcher`: the phase-tracking `Fetcher` and the `fetch_one` entry points.

pub mod fetcher;
pub mod payload;

pub use fetcher::{
    DEFAULT_TIMEOUT, FetchPhase, Fetcher, fetch_one, fetch_one_blocking, fetch_one_with,
};
pub use payload::{FetchResult, Payload};
