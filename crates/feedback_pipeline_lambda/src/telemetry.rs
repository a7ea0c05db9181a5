use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;

pub const PRODUCER_COMPONENT: &str = "producer_handler";
pub const CONSUMER_COMPONENT: &str = "consumer_handler";

/// Installs the JSON log subscriber on stderr. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_timer(ChronoUtc::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
}
