//! Crawl orchestration.
//!
//! Resolves the configured adapter identifiers, runs each adapter under a
//! timeout, and concatenates their output in configuration order. Adapters
//! run as separate tasks, so a panicking or hanging adapter costs only its
//! own contribution.

use crate::config::CrawlerConfig;
use crate::gateway::Gateway;
use crate::models::JobRecord;
use crate::scrapers::fetch::HttpSettings;
use crate::scrapers::registry::{AdapterRef, Registry};
use crate::store::StoreError;
use futures::future::join_all;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Registry,
    adapter_timeout: Duration,
    parallel: bool,
}

impl Orchestrator {
    pub fn new(registry: Registry, adapter_timeout: Duration, parallel: bool) -> Self {
        Self {
            registry,
            adapter_timeout,
            parallel,
        }
    }

    /// Orchestrator over the built-in adapters.
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            Registry::builtin(&HttpSettings::from(config), config.warmup_delay()),
            config.adapter_timeout(),
            config.parallel,
        )
    }

    /// Run every adapter in `adapter_ids` and merge their records.
    ///
    /// Unknown identifiers are skipped. The result lists records adapter by
    /// adapter in `adapter_ids` order, each adapter's records in the order
    /// it emitted them, whether or not adapters run concurrently.
    #[instrument(level = "info", skip_all, fields(targets = ?adapter_ids, parallel = self.parallel))]
    pub async fn run(&self, adapter_ids: &[String]) -> Vec<JobRecord> {
        let adapters: Vec<(&str, AdapterRef)> = adapter_ids
            .iter()
            .filter_map(|id| match self.registry.resolve(id) {
                Some(adapter) => Some((id.as_str(), adapter)),
                None => {
                    warn!(
                        source = %id,
                        stage = "resolve",
                        known = ?self.registry.ids(),
                        "No crawler registered for source; skipping"
                    );
                    None
                }
            })
            .collect();

        let mut batches = Vec::with_capacity(adapters.len());
        if self.parallel {
            let (ids, handles): (Vec<&str>, Vec<_>) = adapters
                .into_iter()
                .map(|(id, adapter)| (id, self.spawn(adapter)))
                .unzip();
            // join_all yields in input order, not completion order.
            for (id, outcome) in ids.into_iter().zip(join_all(handles).await) {
                batches.push(settle(id, outcome));
            }
        } else {
            for (id, adapter) in adapters {
                let outcome = self.spawn(adapter).await;
                batches.push(settle(id, outcome));
            }
        }

        let records: Vec<JobRecord> = batches.into_iter().flatten().collect();
        info!(count = records.len(), "Total jobs scraped");
        records
    }

    fn spawn(&self, adapter: AdapterRef) -> JoinHandle<Option<Vec<JobRecord>>> {
        let timeout = self.adapter_timeout;
        tokio::spawn(async move {
            let id = adapter.id();
            match tokio::time::timeout(timeout, adapter.produce()).await {
                Ok(records) => Some(records),
                Err(_) => {
                    warn!(source = id, stage = "adapter", ?timeout, "Crawler timed out; contributing no jobs");
                    None
                }
            }
        })
    }
}

fn settle(id: &str, outcome: Result<Option<Vec<JobRecord>>, JoinError>) -> Vec<JobRecord> {
    match outcome {
        Ok(Some(records)) => {
            info!(source = id, count = records.len(), "Crawler finished");
            records
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            error!(source = id, stage = "adapter", error = %e, "Crawler crashed; continuing with next source");
            Vec::new()
        }
    }
}

/// Outcome of one crawl-and-save pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub scraped: usize,
    pub written: usize,
}

/// Run the crawl and hand the batch to `gateway`.
///
/// An empty batch is reported and never reaches the store.
pub async fn crawl_and_persist(
    orchestrator: &Orchestrator,
    gateway: &Gateway,
    adapter_ids: &[String],
) -> Result<CrawlSummary, StoreError> {
    let records = orchestrator.run(adapter_ids).await;
    if records.is_empty() {
        warn!("No jobs were scraped; skipping save");
        return Ok(CrawlSummary { scraped: 0, written: 0 });
    }

    let scraped = records.len();
    let written = gateway.persist(records).await?;
    Ok(CrawlSummary { scraped, written })
}
