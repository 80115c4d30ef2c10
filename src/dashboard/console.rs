//! Interactive console
//!
//! Line-oriented stand-in for the operator form: the operator edits the
//! connection fields with `set`, triggers a fetch, and can redisplay or
//! clear the last result without fetching again.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::render::{raw_dump, render, render_config_error};
use super::session::{Session, Snapshot};
use crate::client::{ConnectionDescriptor, generate_client_id};
use crate::config::Settings;
use crate::fetch::{DEFAULT_TIMEOUT, fetch_one_with};
use crate::transport::TransportOptions;
use crate::utils::DescriptorError;

const PROMPT: &str = "petnet> ";

const SET_USAGE: &str = "usage: set <broker|port|topic|timeout|client> <value>";

pub const HELP: &str = "\
commands:
  fetch                  subscribe and wait for one message
  show                   redisplay the last result
  raw                    dump the last payload in full
  clear                  forget the last result
  set broker <host>      broker address
  set port <1-65535>     broker port
  set topic <topic>      topic to read
  set timeout <secs>     wait bound for one fetch
  set client <id|auto>   pin a client identifier, or generate one per fetch
  help                   this text
  quit                   leave the console";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Broker(String),
    Port(u16),
    Topic(String),
    Timeout(Duration),
    /// `None` generates a fresh identifier for every fetch.
    ClientId(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch,
    Show,
    Raw,
    Clear,
    Set(Setting),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };

    match verb.to_lowercase().as_str() {
        "fetch" | "f" => Ok(Command::Fetch),
        "show" => Ok(Command::Show),
        "raw" => Ok(Command::Raw),
        "clear" => Ok(Command::Clear),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "set" => {
            let field = words.next().ok_or_else(|| SET_USAGE.to_string())?;
            let value = words.collect::<Vec<_>>().join(" ");
            parse_setting(field, value).map(Command::Set)
        }
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn parse_setting(field: &str, value: String) -> Result<Setting, String> {
    if value.is_empty() && field != "client" {
        return Err(format!("missing value for '{field}'"));
    }

    match field {
        "broker" => Ok(Setting::Broker(value)),
        "topic" => Ok(Setting::Topic(value)),
        "port" => value
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .map(Setting::Port)
            .ok_or_else(|| format!("invalid port '{value}'")),
        "timeout" => value
            .parse::<f64>()
            .ok()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .filter(|timeout| !timeout.is_zero())
            .map(Setting::Timeout)
            .ok_or_else(|| format!("invalid timeout '{value}'")),
        "client" if value.is_empty() || value == "auto" => Ok(Setting::ClientId(None)),
        "client" => Ok(Setting::ClientId(Some(value))),
        other => Err(format!("unknown setting '{other}'\n{SET_USAGE}")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

/// Connection fields, fetch bounds and the last result for one operator.
#[derive(Debug)]
pub struct Console {
    broker: String,
    port: u16,
    topic: String,
    client_id: Option<String>,
    client_id_prefix: String,
    timeout: Duration,
    options: TransportOptions,
    session: Session,
}

impl Console {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            broker: settings.broker.host.clone(),
            port: settings.broker.port,
            topic: settings.broker.topic.clone(),
            client_id: None,
            client_id_prefix: settings.broker.client_id_prefix.clone(),
            timeout: match settings.fetch.timeout_secs {
                0 => DEFAULT_TIMEOUT,
                secs => Duration::from_secs(secs),
            },
            options: TransportOptions {
                keep_alive: Duration::from_secs(settings.fetch.keep_alive_secs),
                connect_timeout: Duration::from_secs(settings.fetch.connect_timeout_secs),
                clean_session: true,
            },
            session: Session::new(),
        }
    }

    /// Apply a setting and describe the change.
    pub fn apply(&mut self, setting: Setting) -> String {
        match setting {
            Setting::Broker(broker) => {
                self.broker = broker;
                format!("broker set to {}", self.broker)
            }
            Setting::Port(port) => {
                self.port = port;
                format!("port set to {port}")
            }
            Setting::Topic(topic) => {
                self.topic = topic;
                format!("topic set to {}", self.topic)
            }
            Setting::Timeout(timeout) => {
                self.timeout = timeout;
                format!("timeout set to {:.1}s", timeout.as_secs_f64())
            }
            Setting::ClientId(Some(id)) => {
                self.client_id = Some(id);
                "client id pinned".to_string()
            }
            Setting::ClientId(None) => {
                self.client_id = None;
                "client id generated per fetch".to_string()
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Descriptor for the next fetch. Without a pinned client id every call
    /// yields a fresh one, so consecutive fetches never share a session.
    pub fn descriptor(&self) -> Result<ConnectionDescriptor, DescriptorError> {
        let client_id = match &self.client_id {
            Some(id) => id.clone(),
            None => generate_client_id(&self.client_id_prefix),
        };
        ConnectionDescriptor::new(
            self.broker.clone(),
            self.port,
            self.topic.clone(),
            client_id,
        )
    }

    /// Run one fetch and keep its result as the session's latest.
    pub async fn fetch(&mut self) -> Result<&Snapshot, DescriptorError> {
        let descriptor = self.descriptor()?;
        let result = fetch_one_with(&descriptor, self.timeout, self.options).await;
        Ok(self.session.record(descriptor, result))
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        debug!(?command, "console command");
        match command {
            Command::Fetch => match self.fetch().await {
                Ok(snapshot) => Reply::text(render(&snapshot.result, false)),
                Err(e) => Reply::text(render_config_error(&e)),
            },
            Command::Show => match self.session.last() {
                Some(snapshot) => Reply::text(format!(
                    "last fetch at {} from {}\n{}",
                    snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    snapshot.descriptor,
                    render(&snapshot.result, false)
                )),
                None => Reply::text("no result yet, run 'fetch'"),
            },
            Command::Raw => match self.session.last().and_then(|s| s.result.payload()) {
                Some(payload) => Reply::text(raw_dump(payload)),
                None => Reply::text("no payload to dump"),
            },
            Command::Clear => {
                if self.session.clear() {
                    Reply::text("last result cleared")
                } else {
                    Reply::text("nothing to clear")
                }
            }
            Command::Set(setting) => Reply::text(self.apply(setting)),
            Command::Help => Reply::text(HELP),
            Command::Quit => Reply {
                text: "bye".to_string(),
                quit: true,
            },
        }
    }
}

/// Read commands from `input` until `quit` or end of input, writing replies
/// to `output`.
pub async fn run<R, W>(console: &mut Console, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match parse_command(&line) {
            Ok(command) => console.execute(command).await,
            Err(e) => Reply::text(e),
        };
        output.write_all(reply.text.as_bytes()).await?;
        output.write_all(b"\n").await?;

        if reply.quit {
            break;
        }
    }
    output.flush().await
}
