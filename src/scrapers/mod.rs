//! Job board scrapers.
//!
//! Every source is reached through the [`SourceAdapter`] contract: a
//! single `produce()` call that fetches the board and returns the
//! normalized [`JobRecord`]s it found. `produce()` never fails. Network
//! errors and markup drift are logged and turned into an empty result so
//! one broken board cannot stop the others from contributing.
//!
//! # Supported Sources
//!
//! | Source | Module | Fetch | Notes |
//! |--------|--------|-------|-------|
//! | Remote OK | [`remoteok`] | single GET | Posting time from `<time datetime>` |
//! | Boss Zhipin | [`boss`] | warm-up GET, 2s pause, GET | Cookie session; often client-rendered |
//!
//! # Common Patterns
//!
//! HTML boards implement [`ListingScraper`], which splits the work into a
//! [`FetchPlan`] and a pure `parse` step. [`HtmlAdapter`] glues the two
//! together and owns the error-to-empty conversion, so parsers can be
//! tested against fixture HTML without any network.

pub mod boss;
pub mod fetch;
pub mod registry;
pub mod remoteok;

use crate::models::JobRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fetch::{FetchPlan, HttpSettings, build_client, fetch_page};
use scraper::{ElementRef, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Anything that can turn one job board into job records.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Identifier used in configuration and stamped into `JobRecord::source`.
    fn id(&self) -> &'static str;

    /// Fetch and extract the board's current listings.
    ///
    /// Returns an empty vector on any failure.
    async fn produce(&self) -> Vec<JobRecord>;
}

/// Board-specific half of an HTML adapter.
pub trait ListingScraper: Send + Sync + 'static {
    fn id(&self) -> &'static str;

    /// Requests needed to get a servable listing page.
    fn fetch_plan(&self) -> FetchPlan;

    /// Extract records from the listing page.
    ///
    /// Must return [`AdapterError::NoListings`] when the listing selector
    /// matches nothing, and must only return records that passed the
    /// completeness filter.
    fn parse(&self, html: &str, scraped_at: DateTime<Utc>) -> Result<Vec<JobRecord>, AdapterError>;
}

/// Why an adapter produced nothing.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("{url} answered with HTTP {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("no elements matched `{selector}`; markup changed or listings are rendered client-side")]
    NoListings { selector: &'static str },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl AdapterError {
    /// Log stage for the error: `"parse"` for structural drift,
    /// `"fetch"` for everything on the network side.
    pub fn stage(&self) -> &'static str {
        match self {
            AdapterError::NoListings { .. } => "parse",
            _ => "fetch",
        }
    }
}

/// [`SourceAdapter`] for any [`ListingScraper`].
///
/// Builds a fresh HTTP session per `produce()` call so cookies from a
/// warm-up request never leak into another run.
#[derive(Debug)]
pub struct HtmlAdapter<S> {
    scraper: S,
    http: HttpSettings,
}

impl<S: ListingScraper> HtmlAdapter<S> {
    pub fn new(scraper: S, http: HttpSettings) -> Self {
        Self { scraper, http }
    }

    async fn scrape(&self) -> Result<Vec<JobRecord>, AdapterError> {
        let client = build_client(&self.http)?;
        let html = fetch_page(&client, &self.scraper.fetch_plan()).await?;
        debug!(source = self.scraper.id(), bytes = html.len(), "Fetched listing page");
        self.scraper.parse(&html, Utc::now())
    }
}

#[async_trait]
impl<S: ListingScraper> SourceAdapter for HtmlAdapter<S> {
    fn id(&self) -> &'static str {
        self.scraper.id()
    }

    async fn produce(&self) -> Vec<JobRecord> {
        let source = self.scraper.id();
        info!(source, "Scraping job board");

        match self.scrape().await {
            Ok(records) => {
                let estimated = records.iter().filter(|r| r.posted_at_estimated).count();
                info!(
                    source,
                    count = records.len(),
                    estimated_posted_at = estimated,
                    "Scraped job listings"
                );
                records
            }
            Err(e) => {
                warn!(source, stage = e.stage(), error = %e, "Scrape failed; contributing no jobs");
                Vec::new()
            }
        }
    }
}

/// Collapsed text of the first element under `root` matching `selector`.
///
/// `None` when nothing matches or the text is blank.
pub(crate) fn select_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Collapsed text of every element under `root` matching `selector`,
/// skipping blank ones.
pub(crate) fn select_all_text(root: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    root.select(selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    crate::utils::collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Absolute posting URL for `href` as found on the page at `base`.
///
/// `None` for blank links, non-web schemes (`javascript:`, `mailto:`),
/// host-less results, and links that point back at the listing page.
pub(crate) fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut link = base.join(href).ok()?;
    if !matches!(link.scheme(), "http" | "https") || link.host_str().is_none() {
        return None;
    }

    link.set_fragment(None);
    let mut page = base.clone();
    page.set_fragment(None);
    (link != page).then(|| link.into())
}
