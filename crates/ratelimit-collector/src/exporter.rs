//! Stateful scrape engine
//!
//! All mutable state (token cache, last observation, counters) lives in one
//! `tokio::sync::Mutex`. A scrape holds it from the first counter bump to the
//! final update, so overlapping collections run one after another and
//! readers never see a half-written snapshot. Throughput is not a concern:
//! scrapes are driven by a low-rate external poller.

use std::future::Future;
use std::pin::Pin;

use registry_auth::TokenCache;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::collector::{Collector, DESCRIPTORS, MetricDesc, SOURCE_LABEL, Sample, SampleValue};
use crate::error::{Error, Result};
use crate::headers::parse_quota;
use crate::snapshot::{QuotaObservation, Snapshot};

struct State {
    tokens: TokenCache,
    observation: QuotaObservation,
    scrapes_total: u64,
    failures_total: u64,
}

impl State {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            observation: self.observation.clone(),
            scrapes_total: self.scrapes_total,
            failures_total: self.failures_total,
        }
    }
}

/// Docker Hub rate-limit exporter.
///
/// Request timeouts come from the `reqwest::Client` passed in; they bound
/// how long a hung upstream can hold the lock.
pub struct Exporter {
    client: reqwest::Client,
    rate_limit_url: String,
    state: Mutex<State>,
}

impl Exporter {
    pub fn new(
        client: reqwest::Client,
        tokens: TokenCache,
        rate_limit_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            rate_limit_url: rate_limit_url.into(),
            state: Mutex::new(State {
                tokens,
                observation: QuotaObservation::default(),
                scrapes_total: 0,
                failures_total: 0,
            }),
        }
    }

    pub fn rate_limit_url(&self) -> &str {
        &self.rate_limit_url
    }

    /// Run one scrape cycle.
    ///
    /// Never fails: errors are logged and counted, and the previous
    /// observation stays in place.
    pub async fn scrape(&self) {
        let mut state = self.state.lock().await;
        self.scrape_locked(&mut state).await;
    }

    /// Current state without scraping.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.snapshot()
    }

    pub fn describe(&self) -> &'static [MetricDesc] {
        &DESCRIPTORS
    }

    /// Scrape once, then return every family populated from the resulting
    /// state. Both steps happen under one lock acquisition.
    pub async fn collect(&self) -> Vec<Sample> {
        let mut state = self.state.lock().await;
        self.scrape_locked(&mut state).await;
        samples(&state.snapshot())
    }

    #[instrument(skip_all, fields(url = %self.rate_limit_url))]
    async fn scrape_locked(&self, state: &mut State) {
        state.scrapes_total += 1;

        match self.fetch_rate_limit(&mut state.tokens).await {
            Ok(observation) => {
                debug!(
                    limit = observation.limit,
                    remaining = observation.remaining,
                    source = observation.source_label(),
                    "rate limit scraped"
                );
                state.observation = observation;
            }
            Err(e) => {
                state.failures_total += 1;
                warn!(
                    error = %e,
                    kind = e.kind(),
                    failures_total = state.failures_total,
                    "rate limit scrape failed, keeping previous observation"
                );
            }
        }
    }

    /// Token lookup, quota request and header parse. A failed token lookup ends the
    /// attempt; the quota request is never sent anonymously.
    async fn fetch_rate_limit(&self, tokens: &mut TokenCache) -> Result<QuotaObservation> {
        let token = tokens.usable_token(&self.client).await?;

        let response = self
            .client
            .head(&self.rate_limit_url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| Error::Http(format!("rate limit request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        parse_quota(response.headers())
    }
}

impl Collector for Exporter {
    fn describe(&self) -> &'static [MetricDesc] {
        Exporter::describe(self)
    }

    fn collect(&self) -> Pin<Box<dyn Future<Output = Vec<Sample>> + Send + '_>> {
        Box::pin(Exporter::collect(self))
    }
}

/// Lay a snapshot out as samples, one per entry of `DESCRIPTORS`.
fn samples(snapshot: &Snapshot) -> Vec<Sample> {
    let [limit, remaining, scrapes, failures] = &DESCRIPTORS;
    let source = snapshot.observation.source_label().to_owned();

    vec![
        Sample {
            desc: limit,
            labels: vec![(SOURCE_LABEL, source.clone())],
            value: SampleValue::Gauge(snapshot.observation.limit),
        },
        Sample {
            desc: remaining,
            labels: vec![(SOURCE_LABEL, source)],
            value: SampleValue::Gauge(snapshot.observation.remaining),
        },
        Sample {
            desc: scrapes,
            labels: Vec::new(),
            value: SampleValue::Counter(snapshot.scrapes_total),
        },
        Sample {
            desc: failures,
            labels: Vec::new(),
            value: SampleValue::Counter(snapshot.failures_total),
        },
    ]
}
