//! Data models for scraped job listings.
//!
//! This module defines the two shapes a listing passes through:
//! - [`JobListing`]: what an adapter managed to pull out of one listing
//!   element, with every field independently optional
//! - [`JobRecord`]: the normalized row every adapter emits and the store
//!   persists, keyed by `url`
//!
//! Missing fields are modelled as `Option` while a listing is being
//! extracted. The `"N/A"` sentinel only appears at the record boundary,
//! because the `jobs` table (and the read API serving it) expects plain
//! strings.

use crate::utils::format_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder written into string fields the source did not expose.
pub const NOT_AVAILABLE: &str = "N/A";

/// A normalized job posting, ready to be upserted.
///
/// Field names match the columns of the `jobs` table. `url` is the
/// unique key used for conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JobRecord {
    /// Absolute link to the posting.
    pub url: String,
    /// Role title.
    pub title: String,
    /// Employer name, or [`NOT_AVAILABLE`].
    #[serde(default = "not_available")]
    pub company: String,
    /// Free-form labels (location, seniority, stack).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Single-line description; empty when the listing page has none.
    #[serde(default)]
    pub description: String,
    /// Identifier of the adapter that produced the record.
    pub source: String,
    /// ISO-8601 UTC timestamp, e.g. `2025-05-06T14:30:00Z`.
    pub posted_at: String,
    /// Set when `posted_at` is the scrape time rather than the source's
    /// own posting time. The table has no column for it, so it never
    /// leaves the process.
    #[serde(skip)]
    pub posted_at_estimated: bool,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Fields extracted from a single listing element before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobListing {
    pub url: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl JobListing {
    /// Turn the listing into a [`JobRecord`] stamped with `source`.
    ///
    /// Returns `None` when `url` or `title` is missing, blank, or the
    /// sentinel text itself: those two fields identify a posting, so a
    /// record without them is worthless downstream. Any other missing
    /// field falls back to its default, and a missing `posted_at` is
    /// replaced by `scraped_at` with `posted_at_estimated` set.
    pub fn into_record(self, source: &str, scraped_at: DateTime<Utc>) -> Option<JobRecord> {
        let url = present(self.url)?;
        let title = present(self.title)?;

        let (posted_at, posted_at_estimated) = match self.posted_at {
            Some(ts) => (ts, false),
            None => (scraped_at, true),
        };

        Some(JobRecord {
            url,
            title,
            company: present(self.company).unwrap_or_else(not_available),
            tags: self.tags.into_iter().filter(|t| !t.is_empty()).collect(),
            description: self.description.unwrap_or_default(),
            source: source.to_string(),
            posted_at: format_timestamp(posted_at),
            posted_at_estimated,
        })
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scraped_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap()
    }

    fn listing() -> JobListing {
        JobListing {
            url: Some("https://remoteok.io/remote-jobs/1".to_string()),
            title: Some("Rust Engineer".to_string()),
            company: Some("Acme".to_string()),
            tags: vec!["rust".to_string(), "backend".to_string()],
            description: Some("Build things".to_string()),
            posted_at: Some(Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_complete_listing_becomes_record() {
        let record = listing().into_record("remoteok", scraped_at()).unwrap();
        assert_eq!(record.url, "https://remoteok.io/remote-jobs/1");
        assert_eq!(record.title, "Rust Engineer");
        assert_eq!(record.company, "Acme");
        assert_eq!(record.tags, vec!["rust", "backend"]);
        assert_eq!(record.source, "remoteok");
        assert_eq!(record.posted_at, "2025-05-01T09:00:00Z");
        assert!(!record.posted_at_estimated);
    }

    #[test]
    fn test_missing_url_or_title_is_dropped() {
        let no_url = JobListing { url: None, ..listing() };
        assert!(no_url.into_record("remoteok", scraped_at()).is_none());

        let blank_title = JobListing { title: Some(String::new()), ..listing() };
        assert!(blank_title.into_record("remoteok", scraped_at()).is_none());

        let sentinel_url = JobListing { url: Some(NOT_AVAILABLE.to_string()), ..listing() };
        assert!(sentinel_url.into_record("remoteok", scraped_at()).is_none());
    }

    #[test]
    fn test_optional_fields_fall_back_to_defaults() {
        let sparse = JobListing {
            company: None,
            tags: vec![],
            description: None,
            posted_at: None,
            ..listing()
        };
        let record = sparse.into_record("boss", scraped_at()).unwrap();
        assert_eq!(record.company, NOT_AVAILABLE);
        assert!(record.tags.is_empty());
        assert_eq!(record.description, "");
        assert_eq!(record.posted_at, "2025-05-06T14:30:00Z");
        assert!(record.posted_at_estimated);
    }

    #[test]
    fn test_serialization_matches_table_columns() {
        let record = listing().into_record("remoteok", scraped_at()).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        assert!(!obj.contains_key("posted_at_estimated"));
        assert_eq!(obj["tags"], serde_json::json!(["rust", "backend"]));
    }

    #[test]
    fn test_deserialize_row_with_extra_columns() {
        let json = r#"{
            "id": 42,
            "url": "https://www.zhipin.com/job_detail/abc.html",
            "title": "Backend",
            "tags": [],
            "description": "",
            "source": "boss",
            "posted_at": "2025-05-06T14:30:00Z",
            "created_at": "2025-05-06T14:31:00Z"
        }"#;
        let row: JobRecord = serde_json::from_str(json).unwrap();
        assert_eq!(row.company, NOT_AVAILABLE);
        assert_eq!(row.source, "boss");
    }
}
