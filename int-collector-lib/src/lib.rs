#![forbid(unsafe_code)]

pub mod collector;
pub mod config;
pub mod decode;
pub mod demux;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod telemetry;

pub use collector::{CollectorStats, ReportHandler};
pub use config::{load_from_path, Config, DecodeConfig, HopSource, MetricKind};
pub use decode::{DecodeError, IntReport, PerHopRecord};
pub use demux::{SwitchDemux, SwitchId};
pub use error::{CollectorError, Result};
pub use pipeline::{PayloadSummary, Pipeline, PipelineError, RunClock};
pub use sink::{open_sinks, MetricSample, MetricSink, SinkError};
