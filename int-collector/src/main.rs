#![forbid(unsafe_code)]

use clap::Parser;
use int_collector_lib::config::{load_from_path, validate, Config, MetricKind};
use int_collector_lib::telemetry::{init_metrics, init_tracing, start_observability_server};
use int_collector_lib::{collector, open_sinks, sink, CollectorStats, Pipeline, RunClock};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "INT telemetry report collector")]
struct Cli {
    /// Path to configuration TOML file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to receive INT reports on
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Directory for the per-switch sample files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Per-hop value to record: hop_latency or queue_occupancy
    #[arg(long, value_name = "KIND")]
    metric_kind: Option<MetricKind>,

    /// Number of hop records expected in each report
    #[arg(long, value_name = "N")]
    num_transits: Option<usize>,

    /// Emit structured per-field decode events
    #[arg(long)]
    diagnostic_trace: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config, String> {
        let mut cfg = match &self.config {
            Some(path) => load_from_path(path).map_err(|e| e.to_string())?,
            None => Config::default(),
        };

        if let Some(listen) = self.listen {
            cfg.listen = listen;
        }
        if let Some(dir) = &self.output_dir {
            cfg.output.directory = dir.clone();
        }
        if let Some(kind) = self.metric_kind {
            cfg.decode.metric_kind = kind;
        }
        if let Some(n) = self.num_transits {
            cfg.decode.num_transits = n;
        }
        if self.diagnostic_trace {
            cfg.decode.diagnostic_trace = true;
        }

        validate(&cfg)?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            let _ = init_tracing("info", false, "warn", false);
            error!(%err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(
        &cfg.logging.level,
        cfg.logging.show_target,
        &cfg.telemetry.otel_log_level,
        cfg.decode.diagnostic_trace,
    ) {
        eprintln!("failed to initialize tracing: {err}");
        std::process::exit(1);
    }

    info!(
        listen = ?cfg.listen,
        metric_kind = cfg.decode.metric_kind.as_str(),
        fields_per_hop = cfg.decode.fields_per_hop,
        num_transits = cfg.decode.num_transits,
        hop_source = ?cfg.decode.hop_source,
        output = %cfg.output.directory.display(),
        "configuration loaded"
    );

    let sinks = match open_sinks(&cfg.output) {
        Ok(sinks) => sinks,
        Err(err) => {
            error!(%err, "failed to open output sinks");
            std::process::exit(1);
        }
    };

    let mut pipeline = Pipeline::new(cfg.decode.clone(), sinks, RunClock::start());
    let metrics_registry = match cfg.telemetry.metrics_port {
        Some(_) => match init_metrics() {
            Ok((metrics, registry)) => {
                pipeline = pipeline.with_metrics(metrics);
                Some(registry)
            }
            Err(err) => {
                warn!(%err, "failed to initialize metrics, continuing without them");
                None
            }
        },
        None => None,
    };

    let pipeline = Arc::new(pipeline);
    let stats = Arc::new(CollectorStats::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    if let (Some(port), Some(registry)) = (cfg.telemetry.metrics_port, metrics_registry) {
        let stats = stats.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(err) = start_observability_server(port, registry, stats, shutdown).await {
                error!(%err, "observability server exited with error");
            }
        });
    }

    let cfg = Arc::new(cfg);
    let result = collector::run(cfg, pipeline.clone(), stats.clone(), shutdown_rx).await;

    if let Err(err) = sink::flush_all(pipeline.sinks()) {
        warn!(%err, "failed to flush sinks on shutdown");
    }
    let snapshot = stats.snapshot();
    info!(
        received = snapshot.received,
        decoded = snapshot.decoded,
        truncated = snapshot.truncated,
        emitted = snapshot.records_emitted,
        dropped = snapshot.records_dropped,
        "collector stopped"
    );

    if let Err(err) = result {
        error!(%err, "collector exited with error");
        std::process::exit(1);
    }
}

async fn wait_for_signal() {
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = signal::ctrl_c() => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
