pub mod metrics;
pub mod responses;
pub mod server;
pub mod tracing;

pub use metrics::{init_metrics, Metrics};
pub use responses::{
    health_check_response, live_check_response, metrics_response, ready_check_response,
    stats_response,
};
pub use server::start_observability_server;
pub use tracing::{build_env_filter, init_tracing};
