use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::pipeline::{PayloadSummary, PipelineError};

/// Counters kept by the receive loop.
#[derive(Debug, Default)]
pub struct CollectorStats {
    listening: AtomicBool,
    received: AtomicUsize,
    decoded: AtomicUsize,
    truncated: AtomicUsize,
    records_emitted: AtomicUsize,
    records_dropped: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: usize,
    pub decoded: usize,
    pub truncated: usize,
    pub records_emitted: usize,
    pub records_dropped: usize,
}

impl CollectorStats {
    pub fn set_listening(&self, listening: bool) {
        self.listening.store(listening, Ordering::Relaxed);
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }

    pub fn increment_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold the outcome of one payload into the counters.
    pub fn record(&self, result: &Result<PayloadSummary, PipelineError>) {
        let summary = match result {
            Ok(summary) => {
                self.decoded.fetch_add(1, Ordering::Relaxed);
                summary
            }
            Err(PipelineError::Truncated { summary, .. }) => {
                self.truncated.fetch_add(1, Ordering::Relaxed);
                summary
            }
            Err(PipelineError::Sink(_)) => return,
        };
        self.records_emitted.fetch_add(summary.emitted, Ordering::Relaxed);
        self.records_dropped.fetch_add(summary.dropped, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            decoded: self.decoded.load(Ordering::Relaxed),
            truncated: self.truncated.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
        }
    }
}
