//! Test support: a throwaway local HTTP server and an in-memory job store.

use crate::models::JobRecord;
use crate::store::{JobStore, StoreError};
use async_trait::async_trait;
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serve `app` on an ephemeral loopback port and return its address.
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// [`JobStore`] backed by a map of tables, with upsert-by-key semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<JobRecord>>>,
    upsert_calls: AtomicUsize,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, like an unreachable database.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self, table: &str) -> Vec<JobRecord> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

fn column(record: &JobRecord, name: &str) -> String {
    serde_json::to_value(record)
        .ok()
        .and_then(|v| v.get(name).map(|c| c.to_string()))
        .unwrap_or_default()
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn upsert(
        &self,
        table: &str,
        records: &[JobRecord],
        conflict_key: &str,
    ) -> Result<Vec<JobRecord>, StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Config("memory store set to fail".to_string()));
        }

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        for record in records {
            let key = column(record, conflict_key);
            match rows.iter_mut().find(|row| column(row, conflict_key) == key) {
                Some(existing) => *existing = record.clone(),
                None => rows.push(record.clone()),
            }
        }
        Ok(records.to_vec())
    }

    async fn select(&self, table: &str, order_by: &str, desc: bool) -> Result<Vec<JobRecord>, StoreError> {
        if self.fail {
            return Err(StoreError::Config("memory store set to fail".to_string()));
        }
        let mut rows = self.rows(table);
        rows.sort_by_key(|row| column(row, order_by));
        if desc {
            rows.reverse();
        }
        Ok(rows)
    }
}
