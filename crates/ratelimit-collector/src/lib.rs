//! Docker Hub rate-limit scrape engine
//!
//! Turns one authenticated `HEAD` against the registry into a quota
//! observation and keeps the last good one, together with scrape and failure
//! counters, behind a single lock. The collector contract (`describe` /
//! `collect`) is what the metrics publisher consumes.
//!
//! Scrape cycle:
//! 1. Count the attempt
//! 2. Ask the `TokenCache` for a usable token (exchanging if needed)
//! 3. `HEAD` the manifest URL with the bearer token
//! 4. Parse `RateLimit-Limit` / `RateLimit-Remaining` (+ optional source)
//! 5. Replace the observation, or count a failure and keep the old one

pub mod collector;
pub mod error;
pub mod exporter;
pub mod headers;
pub mod snapshot;

#[cfg(test)]
mod test_support;

pub use collector::{
    Collector, DESCRIPTORS, MetricDesc, MetricKind, Sample, SampleValue, LIMIT_METRIC,
    POLL_FAILURES_METRIC, REMAINING_METRIC, SCRAPES_METRIC, SOURCE_LABEL,
};
pub use error::{Error, Result};
pub use exporter::Exporter;
pub use headers::{LIMIT_HEADER, REMAINING_HEADER, SOURCE_HEADER, parse_quota, parse_quota_value};
pub use snapshot::{QuotaObservation, Snapshot};
