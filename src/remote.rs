// SPDX-License-Identifier: PMPL-1.0-or-later

//! Remote fetch policy shared by the conflict feed and issue search.
//!
//! Both services make best-effort, short-timeout calls with no retry.
//! On any failure the owning store keeps serving stale cached data or
//! reports an absent result; failures never surface to the scan.

use std::time::Duration;

/// Timeout posture for one remote endpoint.
#[derive(Debug, Clone, Copy)]
pub struct RemoteFetchPolicy {
    pub timeout: Duration,
}

impl RemoteFetchPolicy {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
        }
    }
}

impl Default for RemoteFetchPolicy {
    fn default() -> Self {
        Self::with_timeout_secs(5)
    }
}

/// Blocking HTTP client honoring the policy timeout.
pub(crate) fn blocking_client(
    policy: &RemoteFetchPolicy,
) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(policy.timeout)
        .build()
}
