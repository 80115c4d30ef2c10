mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, FetchSettings, LoggingSettings, Settings};

/// Loads the configuration from the default file and `PETNET_`-prefixed
/// environment variables (nested keys separated by `__`, e.g.
/// `PETNET_BROKER__PORT`), then merges it with default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("PETNET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(merge(partial, Settings::default()))
}

fn merge(partial: PartialSettings, default: Settings) -> Settings {
    let broker = partial.broker;
    let fetch = partial.fetch;
    let logging = partial.logging;

    Settings {
        broker: BrokerSettings {
            host: broker
                .as_ref()
                .and_then(|b| b.host.clone())
                .unwrap_or(default.broker.host),
            port: broker
                .as_ref()
                .and_then(|b| b.port)
                .unwrap_or(default.broker.port),
            topic: broker
                .as_ref()
                .and_then(|b| b.topic.clone())
                .unwrap_or(default.broker.topic),
            client_id_prefix: broker
                .as_ref()
                .and_then(|b| b.client_id_prefix.clone())
                .unwrap_or(default.broker.client_id_prefix),
        },
        fetch: FetchSettings {
            timeout_secs: fetch
                .as_ref()
                .and_then(|f| f.timeout_secs)
                .unwrap_or(default.fetch.timeout_secs),
            connect_timeout_secs: fetch
                .as_ref()
                .and_then(|f| f.connect_timeout_secs)
                .unwrap_or(default.fetch.connect_timeout_secs),
            keep_alive_secs: fetch
                .as_ref()
                .and_then(|f| f.keep_alive_secs)
                .unwrap_or(default.fetch.keep_alive_secs),
        },
        logging: LoggingSettings {
            level: logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    }
}
