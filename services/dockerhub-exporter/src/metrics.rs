//! Prometheus metrics exposition
//!
//! The exporter is pull-driven: every `/metrics` request runs one collection,
//! copies the samples into a recorder built for that request and renders it.
//! Nothing is carried between renders, so a `source_ip` the registry stops
//! reporting is gone from the very next exposition.
//!
//! - `dockerhub_limit_max_requests_total` (gauge): label `source_ip`
//! - `dockerhub_limit_remaining_requests_total` (gauge): label `source_ip`
//! - `dockerhub_exporter_scrapes_total` (counter)
//! - `dockerhub_exporter_poll_failures_total` (counter)
//! - `dockerhub_exporter_build_info` (gauge): label `version`

use metrics::Label;
use metrics_exporter_prometheus::PrometheusBuilder;
use ratelimit_collector::{Collector, MetricKind, Sample, SampleValue};

pub const BUILD_INFO_METRIC: &str = "dockerhub_exporter_build_info";

/// Register help text for every family the collector emits.
pub fn describe(collector: &dyn Collector) {
    for desc in collector.describe() {
        match desc.kind {
            MetricKind::Gauge => metrics::describe_gauge!(desc.name, desc.help),
            MetricKind::Counter => metrics::describe_counter!(desc.name, desc.help),
        }
    }
    metrics::describe_gauge!(
        BUILD_INFO_METRIC,
        "A metric with a constant '1' value labeled by the exporter version."
    );
}

/// Copy collected samples into the recorder.
///
/// Counters are published as absolute values since the collector owns the
/// running totals.
pub fn publish(samples: &[Sample]) {
    for sample in samples {
        let labels: Vec<Label> = sample
            .labels
            .iter()
            .map(|(key, value)| Label::new(*key, value.clone()))
            .collect();

        match sample.value {
            SampleValue::Gauge(value) => metrics::gauge!(sample.desc.name, labels).set(value),
            SampleValue::Counter(value) => {
                metrics::counter!(sample.desc.name, labels).absolute(value)
            }
        }
    }
}

pub fn publish_build_info() {
    metrics::gauge!(BUILD_INFO_METRIC, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Collect once and render the full exposition.
///
/// The recorder lives only for this call, so the output holds exactly the
/// samples of this collection and concurrent renders never see each other's
/// values.
pub async fn render(collector: &dyn Collector) -> String {
    let samples = collector.collect().await;

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::with_local_recorder(&recorder, || {
        describe(collector);
        publish(&samples);
        publish_build_info();
    });
    handle.render()
}
