//! Append-only text sinks, one per switch.
//!
//! Each sink owns its writer behind its own mutex, so concurrent writers
//! serialize per switch and never interleave partial lines.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::config::OutputConfig;
use crate::demux::{SwitchDemux, SwitchId};

/// One timestamped value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    pub elapsed_seconds: f64,
    pub value: u64,
}

impl fmt::Display for MetricSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {}", self.elapsed_seconds, self.value)
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open sink {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write sample for switch {switch}: {source}")]
    Write {
        switch: SwitchId,
        #[source]
        source: io::Error,
    },

    #[error("sink for switch {switch} is poisoned")]
    Poisoned { switch: SwitchId },
}

pub struct MetricSink {
    switch: SwitchId,
    path: Option<PathBuf>,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl MetricSink {
    /// Open (or create) `<dir>/<prefix><id>.txt` for appending.
    pub fn open(dir: &Path, prefix: &str, switch: SwitchId) -> Result<Self, SinkError> {
        let path = sink_path(dir, prefix, switch);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open { path: path.clone(), source })?;
        Ok(Self::with_file(switch, path, file))
    }

    fn with_file(switch: SwitchId, path: PathBuf, file: File) -> Self {
        Self { switch, path: Some(path), writer: Mutex::new(Box::new(file)) }
    }

    pub fn from_writer(switch: SwitchId, writer: impl Write + Send + 'static) -> Self {
        Self { switch, path: None, writer: Mutex::new(Box::new(writer)) }
    }

    pub fn switch(&self) -> SwitchId {
        self.switch
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one line and flush it before returning.
    pub fn record(&self, sample: MetricSample) -> Result<(), SinkError> {
        let line = format!("{sample}\n");
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned { switch: self.switch })?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| SinkError::Write { switch: self.switch, source })
    }

    pub fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned { switch: self.switch })?;
        writer.flush().map_err(|source| SinkError::Write { switch: self.switch, source })
    }
}

impl fmt::Debug for MetricSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricSink")
            .field("switch", &self.switch)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

pub fn sink_path(dir: &Path, prefix: &str, switch: SwitchId) -> PathBuf {
    dir.join(format!("{prefix}{}.txt", switch.raw()))
}

/// Open one sink per switch under the configured directory, creating it if needed.
pub fn open_sinks(cfg: &OutputConfig) -> Result<SwitchDemux<MetricSink>, SinkError> {
    fs::create_dir_all(&cfg.directory)
        .map_err(|source| SinkError::Open { path: cfg.directory.clone(), source })?;
    SwitchDemux::try_from_fn(|switch| MetricSink::open(&cfg.directory, &cfg.file_prefix, switch))
}

pub fn flush_all(sinks: &SwitchDemux<MetricSink>) -> Result<(), SinkError> {
    for (_, sink) in sinks.iter() {
        sink.flush()?;
    }
    Ok(())
}
