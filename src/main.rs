//! # Remote Job Crawler
//!
//! Collects remote-job listings from several job boards, normalizes them
//! into one record shape, and upserts them into a Supabase table keyed by
//! posting URL. A small read API serves the stored listings.
//!
//! ## Usage
//!
//! ```sh
//! remote_job_crawler crawl --config crawler.yaml
//! remote_job_crawler serve --port 8000
//! ```
//!
//! ## Architecture
//!
//! 1. **Scraping**: each configured board's adapter fetches its listing
//!    page and extracts job records, failing soft to an empty result
//! 2. **Merging**: the orchestrator concatenates adapter output in
//!    configuration order
//! 3. **Saving**: the gateway collapses duplicate URLs and upserts the
//!    batch in one call
//! 4. **Serving**: `serve` exposes the table at `GET /jobs`

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod crawl;
mod gateway;
mod models;
mod scrapers;
mod store;
#[cfg(test)]
mod testing;
mod utils;

use cli::{Cli, Command};
use crawl::{Orchestrator, crawl_and_persist};
use gateway::Gateway;
use store::SupabaseClient;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; the values may come from the real environment.
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("remote_job_crawler starting up");
    debug!(dotenv = ?dotenv.as_ref().ok(), "Environment file");

    let args = Cli::parse();
    let command = args.command.clone().unwrap_or_else(|| {
        info!("No command specified; running crawlers by default");
        Command::Crawl
    });

    // Fail fast on missing credentials, before any board is contacted.
    let store = Arc::new(SupabaseClient::connect(
        args.supabase_url.as_deref().unwrap_or_default(),
        args.supabase_key.as_deref().unwrap_or_default(),
    )?);

    match command {
        Command::Crawl => {
            let config = config::load_config(args.config.as_deref()).await?;
            let orchestrator = Orchestrator::from_config(&config);
            let gateway = Gateway::new(store, args.table.clone());

            info!(targets = ?config.targets, "Starting crawler process");
            match crawl_and_persist(&orchestrator, &gateway, &config.targets).await {
                Ok(summary) => info!(
                    scraped = summary.scraped,
                    written = summary.written,
                    "Crawl complete"
                ),
                Err(e) => {
                    error!(stage = "persist", error = %e, "An error occurred while saving jobs");
                    return Err(e.into());
                }
            }
        }
        Command::Serve { host, port } => {
            let state = api::ApiState {
                store,
                table: args.table.clone(),
            };
            api::serve(state, &format!("{host}:{port}")).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
