use serde::Deserialize;

/// Which per-hop field is written to the output sinks.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    HopLatency,
    QueueOccupancy,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HopLatency => "hop_latency",
            Self::QueueOccupancy => "queue_occupancy",
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hop_latency" => Ok(Self::HopLatency),
            "queue_occupancy" => Ok(Self::QueueOccupancy),
            other => Err(format!(
                "unknown metric kind '{other}', expected hop_latency or queue_occupancy"
            )),
        }
    }
}

/// Where the hop stack shape comes from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HopSource {
    /// Use `fields_per_hop` and `num_transits` from this file.
    #[default]
    Config,
    /// Derive both from the shim length and `hop_metadata_len` of each report.
    Header,
}

/// Report decoding configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Per-hop value written to the sinks: "hop_latency" or "queue_occupancy"
    /// Default: "hop_latency"
    #[serde(default)]
    pub metric_kind: MetricKind,
    /// 4-byte words per hop; sets the stride between hop records
    /// Must be at least 8 (the size of one record)
    /// Default: 10
    #[serde(default = "default_fields_per_hop")]
    pub fields_per_hop: usize,
    /// Number of hop records expected after the INT metadata header
    /// Default: 3
    #[serde(default = "default_num_transits")]
    pub num_transits: usize,
    /// "config" uses the two values above, "header" reads them from each report
    /// Default: "config"
    #[serde(default)]
    pub hop_source: HopSource,
    /// Emit one structured trace event per decoded header and hop record
    /// Events go to the `int_collector::trace` target at DEBUG level, which
    /// is enabled on top of `logging.level` while this is on
    /// Default: false
    #[serde(default)]
    pub diagnostic_trace: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            metric_kind: MetricKind::default(),
            fields_per_hop: default_fields_per_hop(),
            num_transits: default_num_transits(),
            hop_source: HopSource::default(),
            diagnostic_trace: false,
        }
    }
}

fn default_fields_per_hop() -> usize {
    10
}

fn default_num_transits() -> usize {
    3
}
