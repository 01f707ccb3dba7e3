//! Remote OK scraper.
//!
//! This module scrapes the [Remote OK](https://remoteok.io) front page,
//! which renders every posting as a `<tr class="job">` row carrying the
//! posting path in a `data-url` attribute.
//!
//! # URL Pattern
//!
//! `data-url` values are relative (`/remote-jobs/123-rust-engineer`) and are
//! resolved against the listing page to absolute URLs like
//! `https://remoteok.io/remote-jobs/123-rust-engineer`. Rows whose
//! `data-url` is blank or resolves to anything but a posting page are
//! dropped.

use super::fetch::FetchPlan;
use super::{AdapterError, ListingScraper, resolve_link, select_all_text, select_text};
use crate::models::{JobListing, JobRecord};
use crate::utils::parse_timestamp;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const ID: &str = "remoteok";
pub const LISTING_URL: &str = "https://remoteok.io/";

const JOB_ROW: &str = "tr.job";

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse(JOB_ROW).unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"h2[itemprop="title"]"#).unwrap());
static COMPANY: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"h3[itemprop="name"]"#).unwrap());
static TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("div.tag").unwrap());
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("div.description").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());

#[derive(Debug, Clone)]
pub struct RemoteOk {
    listing_url: Url,
}

impl RemoteOk {
    pub fn new(listing_url: Url) -> Self {
        Self { listing_url }
    }

    fn listing(&self, row: ElementRef<'_>) -> Option<JobListing> {
        // Ad and separator rows share the class but carry no posting.
        let path = row.value().attr("data-url")?;

        Some(JobListing {
            url: resolve_link(&self.listing_url, path),
            title: select_text(row, &TITLE),
            company: select_text(row, &COMPANY),
            tags: select_all_text(row, &TAG),
            description: select_text(row, &DESCRIPTION),
            posted_at: row
                .select(&TIME)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .and_then(parse_timestamp),
        })
    }
}

impl Default for RemoteOk {
    fn default() -> Self {
        Self::new(Url::parse(LISTING_URL).expect("static listing url"))
    }
}

impl ListingScraper for RemoteOk {
    fn id(&self) -> &'static str {
        ID
    }

    fn fetch_plan(&self) -> FetchPlan {
        FetchPlan::single(self.listing_url.as_str())
    }

    fn parse(&self, html: &str, scraped_at: DateTime<Utc>) -> Result<Vec<JobRecord>, AdapterError> {
        let document = Html::parse_document(html);
        let rows: Vec<ElementRef<'_>> = document.select(&ROW).collect();
        if rows.is_empty() {
            return Err(AdapterError::NoListings { selector: JOB_ROW });
        }

        Ok(rows
            .into_iter()
            .filter_map(|row| self.listing(row))
            .filter_map(|listing| listing.into_record(ID, scraped_at))
            .collect())
    }
}
