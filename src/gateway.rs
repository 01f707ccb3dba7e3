//! Deduplicating write path from a crawl batch to the store.
//!
//! Records are upserted on `url`, so re-running a crawl converges on one
//! row per posting instead of piling up duplicates. PostgREST rejects a
//! bulk upsert that touches the same key twice, so the batch is reduced
//! to one record per `url` first, keeping the last one emitted.

use crate::models::JobRecord;
use crate::store::{JobStore, StoreError};
use itertools::Itertools;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const JOBS_TABLE: &str = "jobs";
pub const CONFLICT_KEY: &str = "url";

#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn JobStore>,
    table: String,
}

impl Gateway {
    pub fn new(store: Arc<dyn JobStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Upsert `records` in a single call and return how many rows the
    /// store reports as written.
    ///
    /// An empty batch returns `Ok(0)` without touching the store. Failures
    /// are not retried.
    #[instrument(level = "info", skip_all, fields(table = %self.table, batch = records.len()))]
    pub async fn persist(&self, records: Vec<JobRecord>) -> Result<usize, StoreError> {
        if records.is_empty() {
            info!("No jobs to save");
            return Ok(0);
        }

        let before = records.len();
        let batch = dedup_by_url(records);
        if batch.len() < before {
            info!(dropped = before - batch.len(), "Collapsed duplicate urls in batch");
        }

        match self.store.upsert(&self.table, &batch, CONFLICT_KEY).await {
            Ok(written) => {
                info!(written = written.len(), "Successfully upserted jobs");
                Ok(written.len())
            }
            Err(e) => {
                warn!(stage = "persist", error = %e, "Save failed");
                Err(e)
            }
        }
    }
}

/// One record per `url`, the last occurrence winning, in the order the
/// surviving records were emitted.
pub fn dedup_by_url(records: Vec<JobRecord>) -> Vec<JobRecord> {
    let mut latest: Vec<JobRecord> = records
        .into_iter()
        .rev()
        .unique_by(|r| r.url.clone())
        .collect();
    latest.reverse();
    latest
}
