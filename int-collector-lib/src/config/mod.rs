mod decode;
mod loader;
mod output;
mod root;
mod telemetry;
mod validator;

pub use decode::{DecodeConfig, HopSource, MetricKind};
pub use loader::{load_from_path, load_from_str};
pub use output::OutputConfig;
pub use root::{Config, DEFAULT_REPORT_PORT};
pub use telemetry::{LoggingConfig, TelemetryConfig};
pub use validator::validate;
