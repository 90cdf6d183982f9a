//! Published scrape state

/// Last successfully observed quota.
///
/// `limit` and `remaining` are requests per window; the window itself is
/// not kept. Zero-valued until the first successful scrape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotaObservation {
    pub limit: f64,
    pub remaining: f64,
    /// Origin reported by the registry (the client IP the quota applies to)
    pub source: Option<String>,
}

impl QuotaObservation {
    /// Label value for the `source_ip` label; empty when no origin was seen.
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or_default()
    }
}

/// Consistent copy of the exporter state handed to readers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub observation: QuotaObservation,
    /// Scrape attempts, successful or not
    pub scrapes_total: u64,
    pub failures_total: u64,
}
