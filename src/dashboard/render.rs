//! Text rendering of fetch outcomes.
//!
//! The three outcomes always get distinct status lines so a silent topic is
//! never mistaken for an unreachable broker.

use serde_json::Value;

use crate::fetch::{FetchResult, Payload};
use crate::utils::DescriptorError;

const STATUS_OK: &str = "OK: message received";
const STATUS_TIMEOUT: &str = "NO DATA: no message arrived before the timeout";
const STATUS_OFFLINE: &str = "OFFLINE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// `hum_rel` -> `[HUM REL]`
pub fn metric_label(key: &str) -> String {
    format!("[{}]", key.to_uppercase().replace('_', " "))
}

/// Numbers get two decimals; strings are shown bare; anything else as JSON.
pub fn format_metric_value(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => format!("{f:.2}"),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One metric per top-level key, in payload order. `None` unless the
/// payload is a JSON object.
pub fn metrics(payload: &Payload) -> Option<Vec<Metric>> {
    match payload {
        Payload::Structured(Value::Object(map)) => Some(
            map.iter()
                .map(|(key, value)| Metric {
                    label: metric_label(key),
                    value: format_metric_value(value),
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Full dump of the payload: pretty JSON when structured, the text itself
/// otherwise.
pub fn raw_dump(payload: &Payload) -> String {
    match payload {
        Payload::Structured(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Payload::Text(text) => text.clone(),
    }
}

pub fn render(result: &FetchResult, show_raw: bool) -> String {
    match result {
        FetchResult::Success(payload) => render_payload(payload, show_raw),
        FetchResult::Timeout => STATUS_TIMEOUT.to_string(),
        FetchResult::ConnectionError(message) => format!("{STATUS_OFFLINE}: {message}"),
    }
}

pub fn render_config_error(error: &DescriptorError) -> String {
    format!("CONFIG ERROR: {error}")
}

fn render_payload(payload: &Payload, show_raw: bool) -> String {
    let mut out = String::from(STATUS_OK);

    match metrics(payload) {
        Some(metrics) if metrics.is_empty() => out.push_str("\n  (empty object)"),
        Some(metrics) => {
            let width = metrics.iter().map(|m| m.label.len()).max().unwrap_or(0);
            for metric in metrics {
                out.push_str(&format!("\n  {:<width$}  {}", metric.label, metric.value));
            }
        }
        None => {
            out.push_str("\nraw data:");
            out.push_str(&indent(&plain_text(payload)));
        }
    }

    if show_raw && payload.is_structured() {
        out.push_str("\nraw payload:");
        out.push_str(&indent(&raw_dump(payload)));
    }
    out
}

/// Non-object payloads as shown in the raw block: JSON strings unquoted.
fn plain_text(payload: &Payload) -> String {
    match payload {
        Payload::Structured(Value::String(s)) => s.clone(),
        Payload::Structured(value) => value.to_string(),
        Payload::Text(text) => text.clone(),
    }
}

fn indent(block: &str) -> String {
    block.lines().map(|line| format!("\n    {line}")).collect()
}

/// Process exit status for a one-shot fetch.
pub fn exit_code(result: &FetchResult) -> u8 {
    match result {
        FetchResult::Success(_) => 0,
        FetchResult::ConnectionError(_) => 1,
        FetchResult::Timeout => 2,
    }
}
