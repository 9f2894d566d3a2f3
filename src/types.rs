// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for modsleuth

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// One signature's attribution result within a report.
///
/// `suspects` is case-normalized, deduplicated, and sorted; when no
/// installed mod could be implicated it holds the single entry `"unknown"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub signature: String,
    pub suspects: Vec<String>,
    pub advice: String,
}

/// The output artifact of one scan. Built once per invocation and
/// immutable afterwards.
///
/// Section order mirrors the rendered report: per-signature findings,
/// the merged suspect list (sorted), deduplicated fix suggestions in
/// first-insertion order, then external references in query order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributionReport {
    pub findings: Vec<Finding>,
    pub suspects: Vec<String>,
    pub fixes: Vec<String>,
    pub external: Vec<String>,
    /// Notes about internal failures that were converted into report
    /// entries instead of aborting the scan.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// Row of the mod compatibility sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModCompatibility {
    pub id: String,
    pub archive: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

/// Missing local resources are named outcomes the caller can render
/// specifically, not generic I/O faults.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("log file not found: {path}")]
    LogMissing { path: PathBuf },
    #[error("failed to read log file {path}")]
    LogUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
