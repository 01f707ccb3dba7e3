//! Crawl configuration loaded from a YAML file.
//!
//! Every field has a default, so the file is optional and may list only
//! what differs:
//!
//! ```yaml
//! targets:
//!   - remoteok
//!   - boss
//! request_timeout_secs: 15
//! adapter_timeout_secs: 60
//! parallel: true
//! warmup_delay_ms: 2000
//! ```

use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// Desktop Chrome identity; several boards reject default client agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Adapter identifiers, run and aggregated in this order.
    pub targets: Vec<String>,
    /// Bound on each individual HTTP request.
    pub request_timeout_secs: u64,
    /// Bound on one adapter's whole fetch-and-parse sequence.
    pub adapter_timeout_secs: u64,
    /// Run adapters concurrently instead of one after another.
    pub parallel: bool,
    pub user_agent: String,
    /// Pause between a board's cookie warm-up request and the real one.
    pub warmup_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            targets: vec!["remoteok".to_string(), "boss".to_string()],
            request_timeout_secs: 15,
            adapter_timeout_secs: 60,
            parallel: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            warmup_delay_ms: 2000,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }

    pub fn warmup_delay(&self) -> Duration {
        Duration::from_millis(self.warmup_delay_ms)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Load the crawl configuration, or the defaults when no path is given.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&str>) -> Result<CrawlerConfig, Box<dyn Error>> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(CrawlerConfig::default());
    };

    let yaml = tokio::fs::read_to_string(path).await?;
    let config = CrawlerConfig::from_yaml(&yaml)?;
    info!(
        targets = ?config.targets,
        parallel = config.parallel,
        "Loaded crawler configuration"
    );
    Ok(config)
}
