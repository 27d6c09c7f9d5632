//! Response bodies for the observability endpoints.

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::{Response, StatusCode};
use prometheus::{Encoder, Registry, TextEncoder};
use serde_json::json;

use crate::collector::CollectorStats;
use crate::error::{CollectorError, Result};

pub type RespBody = BoxBody<Bytes, hyper::Error>;

/// Always 200 while the process runs.
pub fn health_check_response() -> Result<Response<RespBody>> {
    json_response(StatusCode::OK, &json!({"status": "healthy"}))
}

/// 200 once the report socket is bound, 503 before that and after shutdown.
pub fn ready_check_response(stats: &CollectorStats) -> Result<Response<RespBody>> {
    if stats.is_listening() {
        json_response(StatusCode::OK, &json!({"status": "ready"}))
    } else {
        json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &json!({
                "status": "not_ready",
                "reason": "report_socket_not_bound"
            }),
        )
    }
}

pub fn live_check_response() -> Result<Response<RespBody>> {
    json_response(StatusCode::OK, &json!({"status": "alive"}))
}

/// Receive loop counters as JSON.
pub fn stats_response(stats: &CollectorStats) -> Result<Response<RespBody>> {
    let snapshot = stats.snapshot();
    json_response(
        StatusCode::OK,
        &json!({
            "received": snapshot.received,
            "decoded": snapshot.decoded,
            "truncated": snapshot.truncated,
            "records_emitted": snapshot.records_emitted,
            "records_dropped": snapshot.records_dropped,
        }),
    )
}

/// Collector instruments in Prometheus text format.
pub fn metrics_response(registry: &Registry) -> Result<Response<RespBody>> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| CollectorError::Http(format!("Failed to encode metrics: {e}")))?;

    body_response(StatusCode::OK, encoder.format_type(), buffer)
}

pub fn plain_response(status: StatusCode, text: &'static str) -> Response<RespBody> {
    let mut resp = Response::new(full(Bytes::from(text)));
    *resp.status_mut() = status;
    resp
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Result<Response<RespBody>> {
    let body = serde_json::to_vec(body)
        .map_err(|e| CollectorError::Http(format!("Failed to serialize response: {e}")))?;
    body_response(status, "application/json", body)
}

fn body_response(
    status: StatusCode,
    content_type: &str,
    body: Vec<u8>,
) -> Result<Response<RespBody>> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(full(Bytes::from(body)))
        .map_err(|e| CollectorError::Http(format!("Failed to build response: {e}")))
}

fn full(bytes: Bytes) -> RespBody {
    Full::new(bytes).map_err(|never| match never {}).boxed()
}
