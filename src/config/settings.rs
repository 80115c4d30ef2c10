use serde::Deserialize;

/// Top-level configuration settings for the console.
///
/// Includes the default broker coordinates, fetch bounds and logging level.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub fetch: FetchSettings,
    pub logging: LoggingSettings,
}

/// Default broker coordinates offered to the operator.
///
/// Every field can be overridden per invocation from the command line.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub client_id_prefix: String,
}

/// Bounds applied to a single fetch.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub keep_alive_secs: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub fetch: Option<PartialFetchSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub topic: Option<String>,
    pub client_id_prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialFetchSettings {
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub keep_alive_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// The broker and topic point at a public test broker so the console works
/// without any configuration file.
impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                host: "broker.mqttdashboard.com".to_string(),
                port: 1883,
                topic: "Sensor/THP2".to_string(),
                client_id_prefix: "petnet_client_".to_string(),
            },
            fetch: FetchSettings {
                timeout_secs: 5,
                connect_timeout_secs: 5,
                keep_alive_secs: 60,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
