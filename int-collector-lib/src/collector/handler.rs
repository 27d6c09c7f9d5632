use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::collector::stats::CollectorStats;
use crate::error::CollectorError;
use crate::pipeline::{Pipeline, PipelineError};

/// Largest UDP payload.
pub const MAX_DATAGRAM: usize = 65_535;

/// Feeds every datagram received on the report socket through the pipeline.
///
/// Datagrams are processed one at a time in arrival order, so writes to each
/// sink stay ordered by arrival. Sink appends run synchronously on the
/// receive task.
pub struct ReportHandler {
    pipeline: Arc<Pipeline>,
    stats: Arc<CollectorStats>,
}

impl ReportHandler {
    pub fn new(pipeline: Arc<Pipeline>, stats: Arc<CollectorStats>) -> Self {
        Self { pipeline, stats }
    }

    pub async fn run(
        &self,
        socket: UdpSocket,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), CollectorError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        self.stats.set_listening(true);

        let outcome = loop {
            let result = tokio::select! {
                res = socket.recv_from(&mut buf) => res,
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        info!("shutdown signal received, stopping receive loop");
                        break Ok(());
                    }
                    continue;
                }
            };
            let (len, peer) = match result {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "failed to receive report datagram");
                    continue;
                }
            };

            let payload = buf.get(..len).unwrap_or_default();
            if let Err(e) = self.handle(payload) {
                error!(%peer, error = %e, "sink write failed, stopping collector");
                break Err(CollectorError::from(e));
            }
        };

        self.stats.set_listening(false);
        outcome
    }

    /// Process one payload. Only fatal errors are returned.
    pub fn handle(&self, payload: &[u8]) -> Result<(), crate::sink::SinkError> {
        self.stats.increment_received();
        if let Some(metrics) = self.pipeline.metrics() {
            metrics.record_received(payload.len());
        }

        let result = self.pipeline.process(payload);
        self.stats.record(&result);

        match result {
            Ok(summary) => {
                debug!(
                    hops = summary.hops_decoded,
                    emitted = summary.emitted,
                    dropped = summary.dropped,
                    "report processed"
                );
                Ok(())
            }
            Err(PipelineError::Sink(e)) => Err(e),
            Err(e) => {
                debug!(len = payload.len(), error = %e, "skipping truncated report");
                Ok(())
            }
        }
    }
}
