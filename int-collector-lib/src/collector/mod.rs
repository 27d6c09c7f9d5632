use std::net::SocketAddr;
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::error::CollectorError;
use crate::pipeline::Pipeline;

mod handler;
pub mod stats;

pub use handler::{ReportHandler, MAX_DATAGRAM};
pub use stats::{CollectorStats, StatsSnapshot};

/// Bind the report socket, applying the configured receive buffer size.
pub fn bind_report_socket(
    addr: SocketAddr,
    recv_buffer_bytes: Option<usize>,
) -> Result<UdpSocket, CollectorError> {
    let bind_err = |source| CollectorError::Bind { addr, source };

    let socket =
        Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP)).map_err(bind_err)?;
    socket.set_reuse_address(true).map_err(bind_err)?;
    if let Some(size) = recv_buffer_bytes {
        socket.set_recv_buffer_size(size).map_err(bind_err)?;
    }
    socket.set_nonblocking(true).map_err(bind_err)?;
    socket.bind(&addr.into()).map_err(bind_err)?;

    UdpSocket::from_std(socket.into()).map_err(bind_err)
}

/// Receive INT reports on `config.listen` until shutdown or a sink failure.
pub async fn run(
    config: Arc<Config>,
    pipeline: Arc<Pipeline>,
    stats: Arc<CollectorStats>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), CollectorError> {
    let socket = bind_report_socket(config.listen, config.recv_buffer_bytes)?;
    info!(addr = ?config.listen, "report socket bound");

    let handler = ReportHandler::new(pipeline, stats);
    handler.run(socket, &mut shutdown).await
}
