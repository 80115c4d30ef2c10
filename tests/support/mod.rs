//! Minimal MQTT 3.1.1 broker stand-in for end-to-end tests.
//!
//! It understands just enough of the protocol to accept a session, answer a
//! subscription and optionally publish one message on the subscribed topic.
//! Each connection is counted as closed once the client drops the socket.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Publish this payload right after acknowledging the subscription.
    Publish(Vec<u8>),
    /// Accept the subscription and never publish.
    Silent,
    /// Reject the session with CONNACK code 5 (not authorized).
    Refuse,
    /// Accept the session but answer the subscription with failure code 0x80.
    RejectSubscribe,
}

pub struct StubBroker {
    pub port: u16,
    client_ids: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicUsize>,
}

impl StubBroker {
    pub async fn start(behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let client_ids = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicUsize::new(0));

        let broker = Self {
            port,
            client_ids: client_ids.clone(),
            closed: closed.clone(),
        };

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let session = Session {
                    behaviour: behaviour.clone(),
                    client_ids: client_ids.clone(),
                };
                let closed = closed.clone();
                tokio::spawn(async move {
                    session.serve(stream).await;
                    closed.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        broker
    }

    pub fn client_ids(&self) -> Vec<String> {
        self.client_ids.lock().unwrap().clone()
    }

    /// Wait until `count` client sockets have been closed.
    pub async fn wait_closed(&self, count: usize, within: Duration) -> bool {
        let deadline = Instant::now() + within;
        while Instant::now() < deadline {
            if self.closed.load(Ordering::SeqCst) >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.closed.load(Ordering::SeqCst) >= count
    }
}

struct Session {
    behaviour: Behaviour,
    client_ids: Arc<Mutex<Vec<String>>>,
}

impl Session {
    /// Serve one client until it closes the connection.
    async fn serve(self, mut stream: TcpStream) {
        while let Some((header, body)) = read_packet(&mut stream).await {
            let reply = match header >> 4 {
                // CONNECT
                1 => {
                    if let Some(id) = connect_client_id(&body) {
                        self.client_ids.lock().unwrap().push(id);
                    }
                    let code = if matches!(self.behaviour, Behaviour::Refuse) { 5 } else { 0 };
                    vec![0x20, 0x02, 0x00, code]
                }
                // SUBSCRIBE
                8 => {
                    let code = if matches!(self.behaviour, Behaviour::RejectSubscribe) {
                        0x80
                    } else {
                        0x00
                    };
                    let mut reply = vec![0x90, 0x03, body[0], body[1], code];
                    if let (Behaviour::Publish(payload), Some(topic)) =
                        (&self.behaviour, subscribe_topic(&body))
                    {
                        reply.extend(publish_packet(&topic, payload));
                    }
                    reply
                }
                // PINGREQ
                12 => vec![0xD0, 0x00],
                _ => Vec::new(),
            };

            if !reply.is_empty() && stream.write_all(&reply).await.is_err() {
                break;
            }
        }
    }
}

async fn read_packet(stream: &mut TcpStream) -> Option<(u8, Vec<u8>)> {
    let header = stream.read_u8().await.ok()?;

    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let byte = stream.read_u8().await.ok()?;
        len |= ((byte & 0x7f) as usize) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 21 {
            return None;
        }
    }

    let mut body = vec![0; len];
    stream.read_exact(&mut body).await.ok()?;
    Some((header, body))
}

fn read_str(bytes: &[u8], at: usize) -> Option<(String, usize)> {
    let len = u16::from_be_bytes([*bytes.get(at)?, *bytes.get(at + 1)?]) as usize;
    let raw = bytes.get(at + 2..at + 2 + len)?;
    Some((String::from_utf8_lossy(raw).into_owned(), at + 2 + len))
}

/// Protocol name, then level, flags and keep-alive, then the client id.
fn connect_client_id(body: &[u8]) -> Option<String> {
    let (_, after_name) = read_str(body, 0)?;
    read_str(body, after_name + 4).map(|(id, _)| id)
}

/// Packet id, then the first topic filter.
fn subscribe_topic(body: &[u8]) -> Option<String> {
    read_str(body, 2).map(|(topic, _)| topic)
}

fn publish_packet(topic: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend((topic.len() as u16).to_be_bytes());
    body.extend(topic.as_bytes());
    body.extend(payload);

    let mut packet = vec![0x30];
    let mut len = body.len();
    loop {
        let mut byte = (len % 128) as u8;
        len /= 128;
        if len > 0 {
            byte |= 0x80;
        }
        packet.push(byte);
        if len == 0 {
            break;
        }
    }
    packet.extend(body);
    packet
}
