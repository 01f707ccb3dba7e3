//! Lookup from configured adapter identifiers to adapter instances.

use super::boss::{self, Boss};
use super::fetch::HttpSettings;
use super::remoteok::RemoteOk;
use super::{HtmlAdapter, SourceAdapter};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub type AdapterRef = Arc<dyn SourceAdapter>;

/// Adapters keyed by [`SourceAdapter::id`].
#[derive(Clone, Default)]
pub struct Registry {
    adapters: BTreeMap<&'static str, AdapterRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every adapter shipped with the crawler.
    ///
    /// `warmup_delay` is the pause boards with a cookie warm-up take
    /// between their two requests.
    pub fn builtin(http: &HttpSettings, warmup_delay: Duration) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HtmlAdapter::new(RemoteOk::default(), http.clone())));
        match Boss::new(boss::ORIGIN) {
            Ok(board) => {
                let board = board.with_warmup_delay(warmup_delay);
                registry.register(Arc::new(HtmlAdapter::new(board, http.clone())));
            }
            Err(e) => warn!(source = boss::ID, error = %e, "Could not build adapter"),
        }
        registry
    }

    /// Add `adapter`, replacing any earlier one with the same id.
    pub fn register(&mut self, adapter: AdapterRef) -> &mut Self {
        let id = adapter.id();
        if self.adapters.insert(id, adapter).is_some() {
            debug!(source = id, "Replaced registered adapter");
        }
        self
    }

    pub fn resolve(&self, id: &str) -> Option<AdapterRef> {
        self.adapters.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.adapters.keys().copied().collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("adapters", &self.ids()).finish()
    }
}
