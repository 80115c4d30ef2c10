//! MQTT transport
//!
//! `MqttSubscriber` wraps a `rumqttc` client/event-loop pair. Lifecycle:
//! - `connect` polls the event loop in the foreground until the broker's
//!   CONNACK arrives (bounded by the connect timeout), then hands the event
//!   loop to a background driver task
//! - the driver forwards at most one publish payload through a single-slot
//!   channel and stops on the first transport error or a rejected SUBACK;
//!   there is no reconnect
//! - `close` sends DISCONNECT, gives the driver a short grace period to flush
//!   it, then aborts the driver. Dropping the event loop closes the socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, SubscribeReasonCode,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::{Subscriber, TransportOptions};
use crate::client::ConnectionDescriptor;
use crate::utils::TransportError;

/// Capacity of the rumqttc request channel.
const REQUEST_CAPACITY: usize = 10;

/// How long `close` waits for the driver to flush DISCONNECT before aborting it.
const DISCONNECT_GRACE: Duration = Duration::from_millis(500);

type Delivery = Result<Vec<u8>, TransportError>;

pub struct MqttSubscriber {
    options: MqttOptions,
    connect_timeout: Duration,
    client: Option<AsyncClient>,
    deliveries: Option<mpsc::Receiver<Delivery>>,
    driver: Option<JoinHandle<()>>,
    connected: Arc<AtomicBool>,
}

impl MqttSubscriber {
    pub fn new(descriptor: &ConnectionDescriptor, transport: TransportOptions) -> Self {
        let mut options = MqttOptions::new(
            descriptor.client_id(),
            descriptor.broker(),
            descriptor.port(),
        );
        // rumqttc only accepts whole seconds here
        options.set_keep_alive(Duration::from_secs(transport.keep_alive.as_secs()));
        options.set_clean_session(transport.clean_session);

        Self {
            options,
            connect_timeout: transport.connect_timeout,
            client: None,
            deliveries: None,
            driver: None,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl Subscriber for MqttSubscriber {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.client.is_some() {
            return Ok(());
        }

        let (client, mut eventloop) = AsyncClient::new(self.options.clone(), REQUEST_CAPACITY);
        let (host, port) = self.options.broker_address();
        debug!(%host, port, client_id = %self.options.client_id(), "connecting");

        match tokio::time::timeout(self.connect_timeout, await_connack(&mut eventloop)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(TransportError::ConnectTimeout(self.connect_timeout)),
        }

        let (tx, rx) = mpsc::channel(1);
        self.connected.store(true, Ordering::SeqCst);
        self.driver = Some(tokio::spawn(drive(eventloop, tx, self.connected.clone())));
        self.deliveries = Some(rx);
        self.client = Some(client);

        debug!(%host, port, "connected");
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        let client = self.client.as_ref().ok_or(TransportError::NotConnected)?;
        client.subscribe(topic, QoS::AtMostOnce).await?;
        debug!(%topic, "subscribe requested");
        Ok(())
    }

    async fn recv(&mut self) -> Result<Vec<u8>, TransportError> {
        let deliveries = self
            .deliveries
            .as_mut()
            .ok_or(TransportError::NotConnected)?;
        deliveries.recv().await.unwrap_or(Err(TransportError::Closed))
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.disconnect().await {
                debug!(error = %e, "disconnect request not delivered");
            }
        }

        if let Some(mut driver) = self.driver.take() {
            if tokio::time::timeout(DISCONNECT_GRACE, &mut driver)
                .await
                .is_err()
            {
                driver.abort();
                let _ = driver.await;
            }
        }

        self.deliveries = None;
        self.connected.store(false, Ordering::SeqCst);
        trace!("transport closed");
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for MqttSubscriber {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

async fn await_connack(eventloop: &mut EventLoop) -> Result<(), TransportError> {
    loop {
        match eventloop.poll().await? {
            Event::Incoming(Packet::ConnAck(ack)) => {
                trace!(?ack, "connack");
                return Ok(());
            }
            event => trace!(?event, "event before connack"),
        }
    }
}

/// Background delivery path. Owns the event loop until DISCONNECT goes out
/// or the connection fails.
async fn drive(
    mut eventloop: EventLoop,
    deliveries: mpsc::Sender<Delivery>,
    connected: Arc<AtomicBool>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!(topic = %publish.topic, bytes = publish.payload.len(), "publish received");
                if deliveries.try_send(Ok(publish.payload.to_vec())).is_err() {
                    trace!("delivery slot occupied, dropping publish");
                }
            }
            Ok(Event::Incoming(Packet::SubAck(ack)))
                if ack.return_codes.contains(&SubscribeReasonCode::Failure) =>
            {
                warn!(pkid = ack.pkid, "subscription rejected by broker");
                let _ = deliveries.try_send(Err(TransportError::SubscribeRejected(ack.pkid)));
                break;
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("disconnect sent");
                break;
            }
            Ok(event) => trace!(?event, "mqtt event"),
            Err(e) => {
                warn!(error = %e, "mqtt event loop stopped");
                let _ = deliveries.try_send(Err(e.into()));
                break;
            }
        }
    }
    connected.store(false, Ordering::SeqCst);
}
