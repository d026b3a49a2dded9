use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref DEVICES_CREATED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "registry_devices_created_total",
        "Total devices created through the API"
    ))
    .expect("valid metric options");
    pub static ref INVALID_REQUESTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "registry_invalid_requests_total",
        "Total requests rejected as client errors"
    ))
    .expect("valid metric options");
    pub static ref DB_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "registry_db_failures_total",
        "Total storage errors returned to clients"
    ))
    .expect("valid metric options");
    pub static ref DB_UP: Gauge = Gauge::with_opts(Opts::new(
        "registry_db_up",
        "1 if the last health probe reached the database, 0 otherwise"
    ))
    .expect("valid metric options");
    pub static ref QUERY_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "registry_query_latency_seconds",
            "Time taken by device store operations"
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
        ])
    )
    .expect("valid metric options");
}

pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(DEVICES_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INVALID_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DB_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DB_UP.clone()))?;
    REGISTRY.register(Box::new(QUERY_LATENCY_SECONDS.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Registers the metrics once per test binary
#[cfg(test)]
pub(crate) fn init_for_tests() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| init_metrics().expect("metrics register once"));
}
