//! Per-payload processing: decode, demultiplex, append.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::trace;

use crate::config::DecodeConfig;
use crate::decode::{DecodeError, HopLayout, HopRecords, IntReport, PerHopRecord, Traced};
use crate::demux::SwitchDemux;
use crate::sink::{MetricSample, MetricSink, SinkError};
use crate::telemetry::Metrics;

/// Reference instant that sample timestamps are measured from.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    origin: Instant,
}

impl RunClock {
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn from_origin(origin: Instant) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// What happened to one payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadSummary {
    /// Hop records fully decoded.
    pub hops_decoded: usize,
    /// Records written to a sink.
    pub emitted: usize,
    /// Records whose switch id has no sink.
    pub dropped: usize,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The payload ran out of bytes. Records routed before the cut stay written.
    #[error("report truncated after {} emitted records: {source}", summary.emitted)]
    Truncated {
        summary: PayloadSummary,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl PipelineError {
    /// Sink failures end the run; everything else only skips the payload.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Sink(_))
    }

    /// Header or span that was cut short.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Truncated { source: DecodeError::BufferUnderrun { what, .. }, .. } => Some(what),
            Self::Truncated { .. } => Some("bits"),
            Self::Sink(_) => None,
        }
    }
}

/// Decodes INT report payloads and appends one sample per routed hop record.
#[derive(Debug)]
pub struct Pipeline {
    config: DecodeConfig,
    sinks: SwitchDemux<MetricSink>,
    clock: RunClock,
    metrics: Option<Arc<Metrics>>,
}

impl Pipeline {
    pub fn new(config: DecodeConfig, sinks: SwitchDemux<MetricSink>, clock: RunClock) -> Self {
        Self { config, sinks, clock, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    pub fn sinks(&self) -> &SwitchDemux<MetricSink> {
        &self.sinks
    }

    pub fn clock(&self) -> RunClock {
        self.clock
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.metrics.as_ref()
    }

    /// Process one UDP payload end to end.
    pub fn process(&self, payload: &[u8]) -> Result<PayloadSummary, PipelineError> {
        let started = Instant::now();
        let result = self.decode_and_route(payload);
        if let Some(metrics) = &self.metrics {
            metrics.record_payload(&result, started.elapsed().as_secs_f64());
        }
        result
    }

    fn decode_and_route(&self, payload: &[u8]) -> Result<PayloadSummary, PipelineError> {
        let trace = self.config.diagnostic_trace;
        let mut summary = PayloadSummary::default();

        let (report, offset) = IntReport::decode_traced(payload, trace)
            .map_err(|source| PipelineError::Truncated { summary, source })?;
        let layout = HopLayout::resolve(&report, &self.config);

        for item in HopRecords::new(payload, offset, layout.fields_per_hop, layout.num_transits) {
            let record = item.map_err(|source| PipelineError::Truncated { summary, source })?;
            summary.hops_decoded += 1;
            if trace {
                record.trace();
            }
            self.route(&record, &mut summary)?;
        }

        Ok(summary)
    }

    fn route(&self, record: &PerHopRecord, summary: &mut PayloadSummary) -> Result<(), SinkError> {
        let Some((switch, sink)) = self.sinks.route(record) else {
            trace!(switch_id = record.switch_id, "no sink for switch id, dropping hop record");
            summary.dropped += 1;
            if let Some(metrics) = &self.metrics {
                metrics.record_hop_dropped();
            }
            return Ok(());
        };

        let value = record.metric(self.config.metric_kind);
        sink.record(MetricSample { elapsed_seconds: self.clock.elapsed_secs(), value })?;
        summary.emitted += 1;
        if let Some(metrics) = &self.metrics {
            metrics.record_hop(switch, record);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clock_counts_from_origin() {
        let origin = Instant::now().checked_sub(Duration::from_secs(2)).unwrap_or_else(Instant::now);
        let clock = RunClock::from_origin(origin);
        assert_eq!(clock.origin(), origin);
        assert!(clock.elapsed_secs() >= 0.0);
    }

    #[test]
    fn truncation_is_not_fatal() {
        let err = PipelineError::Truncated {
            summary: PayloadSummary { hops_decoded: 2, emitted: 2, dropped: 0 },
            source: DecodeError::BufferUnderrun {
                what: "hop record",
                offset: 150,
                needed: 40,
                available: 35,
            },
        };
        assert!(!err.is_fatal());
        assert_eq!(err.stage(), Some("hop record"));
        assert!(err.to_string().contains("after 2 emitted records"));
    }

    #[test]
    fn bit_level_truncation_has_generic_stage() {
        let err = PipelineError::Truncated {
            summary: PayloadSummary::default(),
            source: DecodeError::BitUnderrun { position: 3, width: 8, remaining: 5 },
        };
        assert_eq!(err.stage(), Some("bits"));
    }
}
