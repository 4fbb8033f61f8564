use std::time::Duration;

use serde::Deserialize;

use crate::transport::codec::DEFAULT_MAX_FRAME_BYTES;

/// Top-level configuration settings for the application.
///
/// Includes settings for the server, the broker, the command-line client and logging.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the server.
///
/// Defines the address the server binds to and the longest accepted line.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_frame_bytes: usize,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration settings for the broker.
///
/// `ping_interval_secs = 0` disables advisory server pings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    pub max_connections: usize,
    pub ping_interval_secs: u64,
}

impl BrokerSettings {
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }
}

/// Configuration settings for the command-line client.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ClientSettings {
    pub ack_timeout_secs: u64,
}

impl ClientSettings {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ack_timeout_secs)
    }
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
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub client: Option<PartialClientSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_frame_bytes: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub max_connections: Option<usize>,
    pub ping_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialClientSettings {
    pub ack_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 1373,
                max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            },
            broker: BrokerSettings {
                max_connections: 1000,
                ping_interval_secs: 0,
            },
            client: ClientSettings {
                ack_timeout_secs: 10,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
