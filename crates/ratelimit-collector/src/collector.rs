//! Collector contract consumed by the metrics publisher
//!
//! `describe` lists every metric family the exporter will ever emit;
//! `collect` scrapes once and returns the same families with values. The
//! publisher decides how samples are rendered.

use std::future::Future;
use std::pin::Pin;

pub const LIMIT_METRIC: &str = "dockerhub_limit_max_requests_total";
pub const REMAINING_METRIC: &str = "dockerhub_limit_remaining_requests_total";
pub const SCRAPES_METRIC: &str = "dockerhub_exporter_scrapes_total";
pub const POLL_FAILURES_METRIC: &str = "dockerhub_exporter_poll_failures_total";

/// Label carrying the registry-reported origin of the quota
pub const SOURCE_LABEL: &str = "source_ip";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

/// Static description of one metric family.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

/// Every family emitted by the exporter, in collection order.
pub static DESCRIPTORS: [MetricDesc; 4] = [
    MetricDesc {
        name: LIMIT_METRIC,
        help: "Docker Hub Rate Limit Maximum Requests",
        kind: MetricKind::Gauge,
        labels: &[SOURCE_LABEL],
    },
    MetricDesc {
        name: REMAINING_METRIC,
        help: "Docker Hub Rate Limit Remaining Requests",
        kind: MetricKind::Gauge,
        labels: &[SOURCE_LABEL],
    },
    MetricDesc {
        name: SCRAPES_METRIC,
        help: "Current total Docker Hub scrapes.",
        kind: MetricKind::Counter,
        labels: &[],
    },
    MetricDesc {
        name: POLL_FAILURES_METRIC,
        help: "Number of errors while polling Docker Hub.",
        kind: MetricKind::Counter,
        labels: &[],
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    /// Monotonic total, published as an absolute value
    Counter(u64),
    Gauge(f64),
}

/// One collected value with its label values, in `desc.labels` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub desc: &'static MetricDesc,
    pub labels: Vec<(&'static str, String)>,
    pub value: SampleValue,
}

/// Something the metrics publisher can describe and collect from.
///
/// Uses `Pin<Box<dyn Future>>` so publishers can hold `Arc<dyn Collector>`.
pub trait Collector: Send + Sync {
    fn describe(&self) -> &'static [MetricDesc];

    fn collect(&self) -> Pin<Box<dyn Future<Output = Vec<Sample>> + Send + '_>>;
}
