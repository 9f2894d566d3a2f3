// SPDX-License-Identifier: PMPL-1.0-or-later

//! Issue lookup: best-match external reference for a literal crash line.
//!
//! Search results for a fixed error string are treated as effectively
//! immutable, so the cache is revalidated weekly to amortize rate-limited
//! queries. Entries persist across window expiry and are only refreshed,
//! never pruned.

use crate::cache::CacheStore;
use crate::remote::{blocking_client, RemoteFetchPolicy};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

pub const ISSUES_CACHE: &str = "github_issues";

/// Literal error line to formatted suggestion.
pub type IssueCacheMap = HashMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct IssueHit {
    pub title: String,
    pub html_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct IssueSearchResponse {
    #[serde(default)]
    items: Vec<IssueHit>,
}

/// Transport seam for the issue search endpoint. Tests inject fakes.
pub trait IssueSearch {
    fn search(&self, error_line: &str) -> Result<Vec<IssueHit>>;
}

/// GitHub issue search scoped to modded-crash reports.
pub struct GithubIssueSearch {
    base_url: String,
    token: String,
    policy: RemoteFetchPolicy,
}

impl GithubIssueSearch {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        policy: RemoteFetchPolicy,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            policy,
        }
    }
}

impl IssueSearch for GithubIssueSearch {
    fn search(&self, error_line: &str) -> Result<Vec<IssueHit>> {
        let client = blocking_client(&self.policy).context("building HTTP client")?;
        let query = format!("\"{error_line}\" in:title,body minecraft mod crash");
        let response = client
            .get(&self.base_url)
            .query(&[("q", query.as_str())])
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header(
                "User-Agent",
                concat!("modsleuth/", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .context("querying issue search")?;
        if !response.status().is_success() {
            bail!("issue search returned {}", response.status());
        }
        let parsed: IssueSearchResponse =
            response.json().context("parsing issue search JSON")?;
        Ok(parsed.items)
    }
}

/// Cache-first lookup of external references for crash lines.
pub struct IssueLookup {
    cache: CacheStore,
    search: Box<dyn IssueSearch>,
    max_age_hours: u64,
    cached: IssueCacheMap,
}

impl IssueLookup {
    pub fn new(cache: CacheStore, search: Box<dyn IssueSearch>, max_age_hours: u64) -> Self {
        let cached = cache.read(ISSUES_CACHE);
        Self {
            cache,
            search,
            max_age_hours,
            cached,
        }
    }

    /// Best-match external reference for `error_line`, formatted as
    /// `"<title> → <url>"`. At most one remote query per distinct line
    /// per freshness window; empty results, timeouts, and errors yield
    /// `None` with no retry within the call.
    pub fn find_reference(&mut self, error_line: &str) -> Option<String> {
        if !self.cache.is_expired(ISSUES_CACHE, self.max_age_hours) {
            if let Some(cached) = self.cached.get(error_line) {
                return Some(cached.clone());
            }
        }
        match self.search.search(error_line) {
            Ok(items) => {
                let top = items.into_iter().next()?;
                let suggestion = format!("{} → {}", top.title, top.html_url);
                self.cached.insert(error_line.to_string(), suggestion.clone());
                let _ = self.cache.write(ISSUES_CACHE, &self.cached);
                Some(suggestion)
            }
            Err(err) => {
                tracing::warn!("issue search unavailable: {err:#}");
                None
            }
        }
    }
}
