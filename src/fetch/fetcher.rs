//! Bounded single-message fetcher
//!
//! A `Fetcher` walks one subscription through
//! `Idle -> Connecting -> Waiting -> {Delivered | TimedOut | Failed} -> Closed`.
//! Delivery happens on the transport's background task; the foreground
//! waits on it with a timeout combinator, so a silent topic resolves to
//! `Timeout` exactly at the bound. The subscriber is closed on every path
//! before `run` returns.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::payload::{FetchResult, Payload};
use crate::client::ConnectionDescriptor;
use crate::transport::{MqttSubscriber, Subscriber, TransportOptions};
use crate::utils::TransportError;

/// Wait bound used by the console when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Connecting,
    /// Subscribed and waiting for a delivery.
    Waiting,
    Delivered,
    TimedOut,
    Failed,
    Closed,
}

/// Single-use driver for one fetch over any `Subscriber`.
pub struct Fetcher<S> {
    subscriber: S,
    phases: Vec<FetchPhase>,
}

impl<S: Subscriber> Fetcher<S> {
    pub fn new(subscriber: S) -> Self {
        Self {
            subscriber,
            phases: vec![FetchPhase::Idle],
        }
    }

    pub fn phase(&self) -> FetchPhase {
        self.phases.last().copied().unwrap_or(FetchPhase::Idle)
    }

    /// Every phase entered so far, in order.
    pub fn history(&self) -> &[FetchPhase] {
        &self.phases
    }

    pub fn subscriber(&self) -> &S {
        &self.subscriber
    }

    pub fn into_inner(self) -> S {
        self.subscriber
    }

    /// Subscribe to `topic` and wait up to `timeout` for one message.
    ///
    /// A fetcher runs once; later calls report a connection error without
    /// touching the transport.
    pub async fn run(&mut self, topic: &str, timeout: Duration) -> FetchResult {
        if self.phase() != FetchPhase::Idle {
            return FetchResult::ConnectionError("fetcher has already run".to_string());
        }

        let result = self.acquire(topic, timeout).await;

        self.subscriber.close().await;
        self.enter(FetchPhase::Closed);
        result
    }

    async fn acquire(&mut self, topic: &str, timeout: Duration) -> FetchResult {
        self.enter(FetchPhase::Connecting);
        if let Err(e) = self.subscriber.connect().await {
            return self.fail(e);
        }
        if let Err(e) = self.subscriber.subscribe(topic).await {
            return self.fail(e);
        }

        self.enter(FetchPhase::Waiting);
        match tokio::time::timeout(timeout, self.subscriber.recv()).await {
            Ok(Ok(bytes)) => {
                self.enter(FetchPhase::Delivered);
                FetchResult::Success(Payload::decode(&bytes))
            }
            Ok(Err(e)) => self.fail(e),
            Err(_) => {
                self.enter(FetchPhase::TimedOut);
                FetchResult::Timeout
            }
        }
    }

    fn fail(&mut self, e: TransportError) -> FetchResult {
        self.enter(FetchPhase::Failed);
        FetchResult::ConnectionError(e.to_string())
    }

    fn enter(&mut self, phase: FetchPhase) {
        debug!(from = ?self.phase(), to = ?phase, "fetch phase");
        self.phases.push(phase);
    }
}

/// Fetch one message from the descriptor's topic using default transport
/// options.
pub async fn fetch_one(descriptor: &ConnectionDescriptor, timeout: Duration) -> FetchResult {
    fetch_one_with(descriptor, timeout, TransportOptions::default()).await
}

pub async fn fetch_one_with(
    descriptor: &ConnectionDescriptor,
    timeout: Duration,
    options: TransportOptions,
) -> FetchResult {
    info!(%descriptor, ?timeout, "fetching one message");

    let mut fetcher = Fetcher::new(MqttSubscriber::new(descriptor, options));
    let result = fetcher.run(descriptor.topic(), timeout).await;

    match &result {
        FetchResult::Success(payload) => {
            info!(topic = %descriptor.topic(), structured = payload.is_structured(), "message received")
        }
        FetchResult::Timeout => warn!(topic = %descriptor.topic(), ?timeout, "no message received"),
        FetchResult::ConnectionError(e) => error!(broker = %descriptor.broker(), "fetch failed: {e}"),
    }
    result
}

/// Blocking variant for callers outside an async runtime.
///
/// Must not be called from within a Tokio runtime.
pub fn fetch_one_blocking(descriptor: &ConnectionDescriptor, timeout: Duration) -> FetchResult {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime.block_on(fetch_one(descriptor, timeout)),
        Err(e) => FetchResult::ConnectionError(format!("failed to start runtime: {e}")),
    }
}
