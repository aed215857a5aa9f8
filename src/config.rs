use serde::Deserialize;

use crate::server::DEFAULT_SERVER_NAME;

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}

fn default_server_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_protocol_version() -> String {
    crate::LATEST_PROTOCOL_VERSION.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Server settings read from an optional JSON file. Every key may be omitted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_server_name")]
    pub server_name: String,
    #[serde(default = "default_server_version")]
    pub server_version: String,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
    /// A `tracing` filter directive such as `info` or `mcp_calculator_rs=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            server_version: default_server_version(),
            protocol_version: default_protocol_version(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load_config(path: &str) -> anyhow::Result<Config> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&data)?;
        Ok(config)
    }
}
