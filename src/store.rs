//! Persistence client for the `jobs` table.
//!
//! [`JobStore`] is the narrow surface the crawler and the read API need:
//! bulk upsert on a unique column, and an ordered select. The production
//! implementation, [`SupabaseClient`], talks to Supabase's PostgREST
//! endpoint over HTTPS. It is built once at startup and handed to the
//! gateway and the API explicitly.

use crate::models::JobRecord;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{error, info, instrument};
use url::Url;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store answered with HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("store misconfigured: {0}")]
    Config(String),
}

/// Table store with upsert-by-key semantics.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert `records`, updating existing rows that share `conflict_key`.
    ///
    /// Returns the rows as written.
    async fn upsert(
        &self,
        table: &str,
        records: &[JobRecord],
        conflict_key: &str,
    ) -> Result<Vec<JobRecord>, StoreError>;

    /// Every row of `table` ordered by `order_by`.
    async fn select(&self, table: &str, order_by: &str, desc: bool) -> Result<Vec<JobRecord>, StoreError>;
}

/// Supabase REST client.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    rest_url: Url,
    key: String,
}

impl SupabaseClient {
    /// Validate credentials and build the client.
    ///
    /// `url` is the project URL (`https://<ref>.supabase.co`); `key` is the
    /// service or anon API key.
    pub fn connect(url: &str, key: &str) -> Result<Self, StoreError> {
        if url.trim().is_empty() || key.trim().is_empty() {
            return Err(StoreError::Config(
                "SUPABASE_URL and SUPABASE_KEY must be set".to_string(),
            ));
        }

        let mut base = Url::parse(url.trim())
            .map_err(|e| StoreError::Config(format!("invalid SUPABASE_URL {url:?}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base
            .join("rest/v1/")
            .map_err(|e| StoreError::Config(format!("invalid SUPABASE_URL {url:?}: {e}")))?;

        info!(%rest_url, "Configured Supabase client");
        Ok(Self {
            http: Client::builder().build()?,
            rest_url,
            key: key.trim().to_string(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.rest_url
            .join(table)
            .map_err(|e| StoreError::Config(format!("invalid table name {table:?}: {e}")))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

async fn rows(response: reqwest::Response) -> Result<Vec<JobRecord>, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Status {
            status,
            body: truncate_for_log(&body, 500),
        });
    }
    Ok(response.json::<Vec<JobRecord>>().await?)
}

#[async_trait]
impl JobStore for SupabaseClient {
    #[instrument(level = "info", skip(self, records), fields(count = records.len()))]
    async fn upsert(
        &self,
        table: &str,
        records: &[JobRecord],
        conflict_key: &str,
    ) -> Result<Vec<JobRecord>, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("on_conflict", conflict_key);

        let response = self
            .request(reqwest::Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(records)
            .send()
            .await?;

        let written = rows(response).await.inspect_err(|e| {
            error!(error = %e, "Upsert rejected");
        })?;
        info!(written = written.len(), "Upserted rows");
        Ok(written)
    }

    #[instrument(level = "info", skip(self))]
    async fn select(&self, table: &str, order_by: &str, desc: bool) -> Result<Vec<JobRecord>, StoreError> {
        let direction = if desc { "desc" } else { "asc" };
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", &format!("{order_by}.{direction}"));

        let response = self.request(reqwest::Method::GET, url).send().await?;
        rows(response).await
    }
}
