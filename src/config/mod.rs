mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, ClientSettings, LoggingSettings, ServerSettings, Settings};

/// Prefix for environment overrides, e.g. `PUBLINE__SERVER__PORT=4000`.
pub const ENV_PREFIX: &str = "PUBLINE";

/// Loads the configuration from `config/default` (any supported format) and
/// environment variables, merged over the built-in defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Like `load_config`, reading the optional file at `path` (extension optional).
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
            max_frame_bytes: partial
                .server
                .as_ref()
                .and_then(|s| s.max_frame_bytes)
                .unwrap_or(default.server.max_frame_bytes),
        },
        broker: BrokerSettings {
            max_connections: partial
                .broker
                .as_ref()
                .and_then(|b| b.max_connections)
                .unwrap_or(default.broker.max_connections),
            ping_interval_secs: partial
                .broker
                .as_ref()
                .and_then(|b| b.ping_interval_secs)
                .unwrap_or(default.broker.ping_interval_secs),
        },
        client: ClientSettings {
            ack_timeout_secs: partial
                .client
                .as_ref()
                .and_then(|c| c.ack_timeout_secs)
                .unwrap_or(default.client.ack_timeout_secs),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}
