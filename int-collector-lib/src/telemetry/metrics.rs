use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use opentelemetry::KeyValue;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;
use std::sync::Arc;

use crate::decode::PerHopRecord;
use crate::error::CollectorError;
use crate::demux::SwitchId;
use crate::pipeline::{PayloadSummary, PipelineError};

pub mod labels {
    pub const SWITCH: &str = "switch";
    pub const STAGE: &str = "stage";
    pub const VERSION: &str = "version";
    pub const RUST_VERSION: &str = "rust_version";
}

#[derive(Clone)]
pub struct Metrics {
    pub reports_received_total: Counter<u64>,
    pub reports_decoded_total: Counter<u64>,
    pub reports_truncated_total: Counter<u64>,
    pub report_bytes_received_total: Counter<u64>,
    pub decode_duration_seconds: Histogram<f64>,

    // Per-hop records, label switch=1..4
    pub hop_records_total: Counter<u64>,
    pub hop_records_dropped_total: Counter<u64>,
    pub hop_latency: Histogram<u64>,
    pub queue_occupancy: Histogram<u64>,

    pub sink_errors_total: Counter<u64>,

    // Build info
    pub build_info: Gauge<u64>,
}

impl Metrics {
    pub fn new(meter: Meter) -> Self {
        Self {
            reports_received_total: meter
                .u64_counter("int_reports_received_total")
                .with_description("Total number of INT report datagrams received")
                .build(),
            reports_decoded_total: meter
                .u64_counter("int_reports_decoded_total")
                .with_description("Total number of INT reports decoded end to end")
                .build(),
            reports_truncated_total: meter
                .u64_counter("int_reports_truncated_total")
                .with_description("Total number of INT reports cut short. stage=header or hop span")
                .build(),
            report_bytes_received_total: meter
                .u64_counter("int_report_bytes_received_total")
                .with_description("Total bytes of INT report payloads received")
                .build(),
            decode_duration_seconds: meter
                .f64_histogram("int_decode_duration_seconds")
                .with_description("Time to decode and route one report in seconds")
                .build(),

            hop_records_total: meter
                .u64_counter("int_hop_records_total")
                .with_description("Total number of hop records written to a sink")
                .build(),
            hop_records_dropped_total: meter
                .u64_counter("int_hop_records_dropped_total")
                .with_description("Total number of hop records with no sink for their switch id")
                .build(),
            hop_latency: meter
                .u64_histogram("int_hop_latency")
                .with_description("Hop latency reported by each switch")
                .build(),
            queue_occupancy: meter
                .u64_histogram("int_queue_occupancy")
                .with_description("Queue occupancy reported by each switch")
                .build(),

            sink_errors_total: meter
                .u64_counter("int_sink_errors_total")
                .with_description("Total number of failed sink writes")
                .build(),

            build_info: meter
                .u64_gauge("int_build_info")
                .with_description("Build information")
                .build(),
        }
    }

    pub fn set_build_info(&self) {
        let version = env!("CARGO_PKG_VERSION");
        let rust_version = env!("CARGO_PKG_RUST_VERSION");

        self.build_info.record(
            1,
            &[
                KeyValue::new(labels::VERSION, version),
                KeyValue::new(labels::RUST_VERSION, rust_version),
            ],
        );
    }

    pub fn record_received(&self, bytes: usize) {
        self.reports_received_total.add(1, &[]);
        self.report_bytes_received_total
            .add(u64::try_from(bytes).unwrap_or(u64::MAX), &[]);
    }

    pub fn record_payload(&self, result: &Result<PayloadSummary, PipelineError>, duration: f64) {
        self.decode_duration_seconds.record(duration, &[]);
        match result {
            Ok(_) => self.reports_decoded_total.add(1, &[]),
            Err(e) if e.is_fatal() => self.sink_errors_total.add(1, &[]),
            Err(e) => {
                let stage = e.stage().unwrap_or("unknown");
                self.reports_truncated_total
                    .add(1, &[KeyValue::new(labels::STAGE, stage)]);
            }
        }
    }

    pub fn record_hop(&self, switch: SwitchId, record: &PerHopRecord) {
        let attrs = &[KeyValue::new(labels::SWITCH, i64::from(switch.raw()))];
        self.hop_records_total.add(1, attrs);
        self.hop_latency.record(u64::from(record.hop_latency), attrs);
        self.queue_occupancy.record(u64::from(record.q_occupancy), attrs);
    }

    pub fn record_hop_dropped(&self) {
        self.hop_records_dropped_total.add(1, &[]);
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

pub fn init_metrics() -> crate::error::Result<(Arc<Metrics>, Registry)> {
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter()
        .with_registry(registry.clone())
        .build()
        .map_err(|e| {
            CollectorError::Telemetry(format!("Failed to build Prometheus exporter: {e}"))
        })?;

    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();

    global::set_meter_provider(meter_provider);

    let meter = global::meter("int-collector");
    let metrics = Arc::new(Metrics::new(meter));

    metrics.set_build_info();

    Ok((metrics, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;

    #[test]
    fn recording_without_provider_is_noop() {
        let metrics = Metrics::new(global::meter("int-collector-test"));
        metrics.record_received(128);
        metrics.record_hop(SwitchId::S1, &PerHopRecord::default());
        metrics.record_hop_dropped();
        metrics.record_payload(&Ok(PayloadSummary::default()), 0.001);
        let truncated = Err(PipelineError::Truncated {
            summary: PayloadSummary::default(),
            source: DecodeError::BufferUnderrun { what: "udp", offset: 50, needed: 8, available: 2 },
        });
        metrics.record_payload(&truncated, 0.001);
    }
}
