use crate::collector::CollectorStats;
use crate::telemetry::responses::{
    health_check_response, live_check_response, metrics_response, plain_response,
    ready_check_response, stats_response,
};
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

/// Start the observability server that handles metrics and health checks
/// This server runs on a dedicated port and serves:
/// - `/metrics` - Prometheus metrics
/// - `/health` - Health check endpoint
/// - `/ready` - Readiness check endpoint (report socket bound)
/// - `/live` - Liveness check endpoint
/// - `/stats` - Receive loop counters
///
/// Runs until `shutdown` flips to true or its sender is dropped.
pub async fn start_observability_server(
    port: u16,
    registry: Registry,
    stats: Arc<CollectorStats>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = Arc::new(registry);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(?addr, "Observability server started (metrics + health checks)");

    loop {
        tokio::select! {
            res = shutdown.changed() => {
                if res.is_err() || *shutdown.borrow() {
                    info!("Observability server: shutdown signal received");
                    break;
                }
            }
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok((stream, peer)) => (stream, peer),
                    Err(e) => {
                        warn!(error = %e, "Observability server: accept error");
                        continue;
                    }
                };

                let registry = registry.clone();
                let stats = stats.clone();
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let registry = registry.clone();
                        let stats = stats.clone();
                        async move {
                            let result = match req.uri().path() {
                                "/health" => health_check_response(),
                                "/ready" => ready_check_response(&stats),
                                "/live" => live_check_response(),
                                "/stats" => stats_response(&stats),
                                "/metrics" => metrics_response(&registry),
                                _ => return Ok::<_, hyper::Error>(plain_response(StatusCode::NOT_FOUND, "Not Found")),
                            };
                            Ok(result.unwrap_or_else(|e| {
                                warn!(error = %e, "Observability server: failed to build response");
                                plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                            }))
                        }
                    });

                    let builder = ConnBuilder::new(TokioExecutor::new());
                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        warn!(?peer, error = %e, "Observability server: serve_connection error");
                    }
                });
            }
        }
    }

    info!("Observability server stopped");
    Ok(())
}
