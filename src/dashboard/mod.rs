//! The `dashboard` module is the presentation side of the console.
//!
//! It turns a `FetchResult` into text (one labelled metric per top-level
//! key for JSON objects, a raw block otherwise), keeps the most recent
//! result in a `Session`, and runs the interactive command loop.

pub mod console;
pub mod render;
pub mod session;

pub use console::{Command, Console, Reply, Setting, parse_command};
pub use render::{
    Metric, exit_code, format_metric_value, metric_label, metrics, raw_dump, render,
    render_config_error,
};
pub use session::{Session, Snapshot};
