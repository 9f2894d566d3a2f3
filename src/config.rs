// SPDX-License-Identifier: PMPL-1.0-or-later

//! Runtime configuration: endpoints, token, cache location, freshness
//! windows, and timeouts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const GITHUB_TOKEN_ENV: &str = "MODSLEUTH_GITHUB_TOKEN";
const DEFAULT_CONFIG_FILE: &str = "modsleuth.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache_dir: PathBuf,
    pub conflicts_url: String,
    pub issue_search_url: String,
    pub github_token: Option<String>,
    pub conflicts_max_age_hours: u64,
    pub issues_max_age_hours: u64,
    pub conflicts_timeout_secs: u64,
    pub issues_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".cache"),
            conflicts_url:
                "https://raw.githubusercontent.com/modsleuth/conflict-db/main/conflicts.json"
                    .to_string(),
            issue_search_url: "https://api.github.com/search/issues".to_string(),
            github_token: None,
            conflicts_max_age_hours: 48,
            issues_max_age_hours: 168,
            conflicts_timeout_secs: 5,
            issues_timeout_secs: 8,
        }
    }
}

impl Config {
    /// Load from the given file, or from `modsleuth.yaml` when present in
    /// the working directory, or defaults. The token environment variable
    /// overrides any file value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        if let Ok(token) = env::var(GITHUB_TOKEN_ENV) {
            if !token.trim().is_empty() {
                config.github_token = Some(token);
            }
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_windows() {
        let config = Config::default();
        assert_eq!(config.conflicts_max_age_hours, 48);
        assert_eq!(config.issues_max_age_hours, 168);
        assert_eq!(config.cache_dir, PathBuf::from(".cache"));
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_fields() {
        let config: Config =
            serde_yaml::from_str("conflicts_max_age_hours: 12\ncache_dir: /tmp/sleuth").unwrap();
        assert_eq!(config.conflicts_max_age_hours, 12);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/sleuth"));
        assert_eq!(config.issues_max_age_hours, 168);
    }
}
