//! Read-only HTTP API over the stored job listings.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | Welcome message pointing at `/jobs` |
//! | `GET /jobs` | `{"count": n, "jobs": [...]}`, newest `posted_at` first |
//!
//! Rows are served exactly as the store returns them.

use crate::models::JobRecord;
use crate::store::JobStore;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn JobStore>,
    pub table: String,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub count: usize,
    pub jobs: Vec<JobRecord>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/jobs", get(list_jobs))
        .with_state(state)
}

async fn read_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to the Remote Job API. Go to /jobs to see the listings.",
    })
}

/// A store failure is logged and served as an empty list.
async fn list_jobs(State(state): State<ApiState>) -> Json<JobsResponse> {
    let jobs = match state.store.select(&state.table, "posted_at", true).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!(table = %state.table, error = %e, "Failed to fetch jobs from store");
            Vec::new()
        }
    };
    Json(JobsResponse {
        count: jobs.len(),
        jobs,
    })
}

/// Bind `addr` and serve until the process is stopped.
#[instrument(level = "info", skip(state))]
pub async fn serve(state: ApiState, addr: &str) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Job API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
