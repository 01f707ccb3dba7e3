//! Boss Zhipin scraper.
//!
//! Scrapes the remote-job search on [Boss Zhipin](https://www.zhipin.com).
//! The site guards its listing page with cookie checks, so the page is
//! requested twice through one session with a pause in between. It also
//! renders most results client-side; when the server-side HTML carries no
//! job cards this adapter reports a parse failure and contributes nothing.
//!
//! The list page shows no absolute posting time, so every record gets the
//! scrape time as an estimated `posted_at`.

use super::fetch::FetchPlan;
use super::{AdapterError, ListingScraper, resolve_link, select_all_text, select_text};
use crate::models::{JobListing, JobRecord};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

pub const ID: &str = "boss";
pub const ORIGIN: &str = "https://www.zhipin.com";
pub const SEARCH_PATH: &str = "/web/geek/job";
pub const QUERY: &str = "远程";

/// Pause between the cookie warm-up request and the real one.
pub const WARMUP_DELAY: Duration = Duration::from_secs(2);

const JOB_CARD: &str = "li.job-card-wrapper";

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse(JOB_CARD).unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.job-name").unwrap());
static COMPANY: Lazy<Selector> = Lazy::new(|| Selector::parse("a.company-name").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.job-card-left[href]").unwrap());
static TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("li.tag-item").unwrap());

#[derive(Debug, Clone)]
pub struct Boss {
    search_url: Url,
    warmup_delay: Duration,
}

impl Boss {
    /// Search for remote jobs on the board rooted at `origin`.
    pub fn new(origin: &str) -> Result<Self, AdapterError> {
        let search_url = Url::parse(&format!(
            "{}{}?query={}",
            origin.trim_end_matches('/'),
            SEARCH_PATH,
            urlencoding::encode(QUERY)
        ))?;
        Ok(Self {
            search_url,
            warmup_delay: WARMUP_DELAY,
        })
    }

    pub fn with_warmup_delay(mut self, delay: Duration) -> Self {
        self.warmup_delay = delay;
        self
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    fn listing(&self, card: ElementRef<'_>) -> JobListing {
        let tags = select_all_text(card, &TAG);
        let description = (!tags.is_empty())
            .then(|| format!("Location/Experience tags: {}", tags.join(", ")));

        JobListing {
            url: card
                .select(&LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve_link(&self.search_url, href)),
            title: select_text(card, &TITLE),
            company: select_text(card, &COMPANY),
            tags,
            description,
            posted_at: None,
        }
    }
}

impl ListingScraper for Boss {
    fn id(&self) -> &'static str {
        ID
    }

    fn fetch_plan(&self) -> FetchPlan {
        FetchPlan::warmed(self.search_url().as_str(), self.warmup_delay)
    }

    fn parse(&self, html: &str, scraped_at: DateTime<Utc>) -> Result<Vec<JobRecord>, AdapterError> {
        let document = Html::parse_document(html);
        let cards: Vec<ElementRef<'_>> = document.select(&CARD).collect();
        if cards.is_empty() {
            return Err(AdapterError::NoListings { selector: JOB_CARD });
        }

        Ok(cards
            .into_iter()
            .map(|card| self.listing(card))
            .filter_map(|listing| listing.into_record(ID, scraped_at))
            .collect())
    }
}
