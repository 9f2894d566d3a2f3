// SPDX-License-Identifier: PMPL-1.0-or-later

//! Crash attribution engine.
//!
//! Orchestrates one sequential pass over a crash log: signature matching,
//! class-based and stack-frame-based attribution against the installed
//! mod inventory, the explicit loader-failure sweep through the conflict
//! store, and the issue lookup for leading exception lines. The pass may
//! block on the short-timeout network calls of the injected services;
//! there is no internal parallelism and no mid-scan cancellation.

use crate::conflicts::ConflictStore;
use crate::inventory::ModInventory;
use crate::issues::IssueLookup;
use crate::signatures::{self, Signature, SignatureKind};
use crate::types::{AttributionReport, Finding, ModCompatibility};
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

/// Lines of surrounding context taken on each side of a marker line.
const FRAME_CONTEXT_RADIUS: usize = 10;
/// Exception lines forwarded to the issue lookup per scan.
const ISSUE_LOOKUP_LIMIT: usize = 2;

pub struct AttributionEngine {
    conflicts: ConflictStore,
    issues: IssueLookup,
    signatures: Vec<Signature>,
}

impl AttributionEngine {
    /// Services are injected at construction so tests can supply fake
    /// network and cache backends.
    pub fn new(conflicts: ConflictStore, issues: IssueLookup) -> Self {
        Self {
            conflicts,
            issues,
            signatures: signatures::signature_table(),
        }
    }

    /// Analyze a crash log against the mods installed under
    /// `install_dir`. Always returns a report: unexpected internal
    /// failures become a diagnostics entry instead of propagating.
    pub fn analyze(&mut self, log_text: &str, install_dir: &Path) -> AttributionReport {
        match self.run(log_text, install_dir) {
            Ok(report) => report,
            Err(err) => AttributionReport {
                diagnostics: vec![format!("analysis aborted: {err:#}")],
                ..AttributionReport::default()
            },
        }
    }

    fn run(&mut self, log_text: &str, install_dir: &Path) -> Result<AttributionReport> {
        let inventory = ModInventory::scan(&install_dir.join("mods"));
        let lines: Vec<&str> = log_text.lines().collect();

        self.conflicts.load_or_refresh();

        let mut findings = Vec::new();
        let mut all_suspects: BTreeSet<String> = BTreeSet::new();
        let mut fixes: Vec<String> = Vec::new();

        for signature in &self.signatures {
            if !signature.matches(log_text) {
                continue;
            }

            let mut raw_suspects = match signature.kind {
                SignatureKind::MissingClass => attribute_by_class(log_text, &inventory),
                SignatureKind::StackFrame => Vec::new(),
            };
            if raw_suspects.is_empty() {
                raw_suspects = attribute_by_stack_frames(&lines, signature.name, &inventory);
            }

            let suspects: Vec<String> = raw_suspects
                .into_iter()
                .map(|id| id.to_lowercase())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            all_suspects.extend(suspects.iter().cloned());
            if !fixes.iter().any(|fix| fix == signature.advice) {
                fixes.push(signature.advice.to_string());
            }

            let display = if suspects.is_empty() {
                vec!["unknown".to_string()]
            } else {
                suspects
            };
            findings.push(Finding {
                signature: signature.name.to_string(),
                suspects: display,
                advice: signature.advice.to_string(),
            });
        }

        // Explicit loader failures name the responsible mod directly.
        let failed_re = Regex::new(r"Failed to load mod: (\w+)").unwrap();
        for caps in failed_re.captures_iter(log_text) {
            let id = caps[1].to_lowercase();
            if !inventory.contains(&id) {
                continue;
            }
            if let Some(fix) = self.conflicts.get_fix(&id) {
                if !fixes.iter().any(|known| known == fix) {
                    fixes.push(fix.to_string());
                }
            }
            all_suspects.insert(id);
        }

        let mut external = Vec::new();
        let exception_re = Regex::new(r"java\.[^\n]+").unwrap();
        for hit in exception_re.find_iter(log_text).take(ISSUE_LOOKUP_LIMIT) {
            if let Some(suggestion) = self.issues.find_reference(hit.as_str().trim()) {
                external.push(suggestion);
            }
        }

        Ok(AttributionReport {
            findings,
            suspects: all_suspects.into_iter().collect(),
            fixes,
            external,
            diagnostics: Vec::new(),
        })
    }

    /// Compatibility sweep: one row per installed mod with its known
    /// conflict fix, if any.
    pub fn sweep_mods(&mut self, install_dir: &Path) -> Vec<ModCompatibility> {
        self.conflicts.load_or_refresh();
        let inventory = ModInventory::scan(&install_dir.join("mods"));
        inventory
            .iter()
            .map(|(id, path)| ModCompatibility {
                id: id.to_string(),
                archive: path.to_path_buf(),
                fix: self.conflicts.get_fix(id).map(str::to_string),
            })
            .collect()
    }
}

/// For each missing class, the first archive (inventory order) whose
/// entry list contains the class path form. Archives that fail to open
/// are skipped, never fatal.
fn attribute_by_class(log_text: &str, inventory: &ModInventory) -> Vec<String> {
    let mut suspects = Vec::new();
    for class_name in signatures::missing_classes(log_text) {
        let entry_path = signatures::class_entry_path(&class_name);
        for (id, archive) in inventory.iter() {
            match archive_contains(archive, &entry_path) {
                Ok(true) => {
                    suspects.push(id.to_string());
                    break;
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!(
                        "skipping unreadable archive {}: {err:#}",
                        archive.display()
                    );
                }
            }
        }
    }
    suspects
}

/// Whether any entry path in the archive contains `entry_fragment`.
/// The handle is dropped as soon as the archive has been checked.
fn archive_contains(archive: &Path, entry_fragment: &str) -> Result<bool> {
    let file = File::open(archive)?;
    let zip = zip::ZipArchive::new(file)?;
    let found = zip.file_names().any(|name| name.contains(entry_fragment));
    Ok(found)
}

/// Mods implicated by stack frames near each occurrence of `marker`:
/// any chain segment matching an installed identifier is a suspect.
fn attribute_by_stack_frames(
    lines: &[&str],
    marker: &str,
    inventory: &ModInventory,
) -> Vec<String> {
    let mut suspects = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if !line.contains(marker) {
            continue;
        }
        let start = idx.saturating_sub(FRAME_CONTEXT_RADIUS);
        let end = (idx + FRAME_CONTEXT_RADIUS + 1).min(lines.len());
        let context = lines[start..end].join("\n");
        for chain in signatures::stack_frame_chains(&context) {
            for segment in chain.split('.') {
                if inventory.contains(segment) {
                    suspects.push(segment.to_lowercase());
                }
            }
        }
    }
    suspects
}
