// SPDX-License-Identifier: PMPL-1.0-or-later

//! Conflict knowledge store: known mod-conflict fixes with cached refresh.
//!
//! Conflict data changes slowly and the scan must stay usable offline, so
//! the cached copy is trusted for 48 hours and every fetch failure falls
//! back silently to whatever was cached last.

use crate::cache::CacheStore;
use crate::remote::{blocking_client, RemoteFetchPolicy};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CONFLICTS_CACHE: &str = "conflicts";

/// Known-fix record for one mod identifier. An absent `fix` field is a
/// permissible feed shape and means no fix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConflictEntry {
    #[serde(default)]
    pub fix: Option<String>,
}

/// Lowercased mod identifier to known-fix record. An absent key means
/// "no known fix", never an error.
pub type ConflictMap = HashMap<String, ConflictEntry>;

/// Transport seam for the remote conflict feed. Tests inject fakes.
pub trait ConflictFeed {
    fn fetch(&self) -> Result<ConflictMap>;
}

/// GET against the live conflicts URL.
pub struct HttpConflictFeed {
    url: String,
    policy: RemoteFetchPolicy,
}

impl HttpConflictFeed {
    pub fn new(url: impl Into<String>, policy: RemoteFetchPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
        }
    }
}

impl ConflictFeed for HttpConflictFeed {
    fn fetch(&self) -> Result<ConflictMap> {
        let client = blocking_client(&self.policy).context("building HTTP client")?;
        let response = client
            .get(&self.url)
            .send()
            .with_context(|| format!("fetching {}", self.url))?;
        if !response.status().is_success() {
            bail!("conflict feed returned {}", response.status());
        }
        response.json::<ConflictMap>().context("parsing conflict feed JSON")
    }
}

/// Mod-id to known-fix map behind an expiring cache entry.
pub struct ConflictStore {
    cache: CacheStore,
    feed: Box<dyn ConflictFeed>,
    max_age_hours: u64,
    map: ConflictMap,
}

impl ConflictStore {
    pub fn new(cache: CacheStore, feed: Box<dyn ConflictFeed>, max_age_hours: u64) -> Self {
        Self {
            cache,
            feed,
            max_age_hours,
            map: ConflictMap::new(),
        }
    }

    /// Refresh from the remote feed when the cached copy has gone stale,
    /// otherwise serve the cache without touching the network. A fetch
    /// failure falls back to the cached copy, possibly empty. Never
    /// raises to the caller.
    pub fn load_or_refresh(&mut self) {
        if self.cache.is_expired(CONFLICTS_CACHE, self.max_age_hours) {
            match self.feed.fetch() {
                Ok(map) => {
                    let _ = self.cache.write(CONFLICTS_CACHE, &map);
                    self.map = map;
                }
                Err(err) => {
                    tracing::warn!("conflict feed unavailable, using cached data: {err:#}");
                    self.map = self.cache.read(CONFLICTS_CACHE);
                }
            }
        } else {
            self.map = self.cache.read(CONFLICTS_CACHE);
        }
    }

    /// Known fix for `id`, if any. Lookup is case-insensitive; `None` is
    /// a normal outcome.
    pub fn get_fix(&self, id: &str) -> Option<&str> {
        self.map
            .get(&id.to_lowercase())
            .and_then(|entry| entry.fix.as_deref())
    }
}
