use serde::Deserialize;
use std::net::SocketAddr;

use super::decode::DecodeConfig;
use super::output::OutputConfig;
use super::telemetry::{LoggingConfig, TelemetryConfig};

/// Port INT reports are exported to.
pub const DEFAULT_REPORT_PORT: u16 = 8002;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address and port INT reports arrive on
    /// Default: "0.0.0.0:8002"
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Kernel receive buffer size for the report socket (optional)
    /// Default: None (system default)
    #[serde(default)]
    pub recv_buffer_bytes: Option<usize>,
    /// Report decoding configuration
    #[serde(default)]
    pub decode: DecodeConfig,
    /// Sink file configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            recv_buffer_bytes: None,
            decode: DecodeConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_REPORT_PORT))
}
