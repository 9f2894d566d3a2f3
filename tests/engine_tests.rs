// SPDX-License-Identifier: PMPL-1.0-or-later

//! End-to-end tests for the crash attribution engine, driving it with
//! fixture install directories, real zip archives, and fake remote
//! transports.

use anyhow::{anyhow, Result};
use modsleuth::cache::CacheStore;
use modsleuth::conflicts::{ConflictEntry, ConflictFeed, ConflictMap, ConflictStore};
use modsleuth::engine::AttributionEngine;
use modsleuth::issues::{IssueHit, IssueLookup, IssueSearch};
use modsleuth::types::Finding;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

struct StaticFeed {
    map: ConflictMap,
}

impl ConflictFeed for StaticFeed {
    fn fetch(&self) -> Result<ConflictMap> {
        Ok(self.map.clone())
    }
}

struct FailingFeed;

impl ConflictFeed for FailingFeed {
    fn fetch(&self) -> Result<ConflictMap> {
        Err(anyhow!("network down"))
    }
}

/// Echoes the queried line back so query order is observable.
struct EchoSearch;

impl IssueSearch for EchoSearch {
    fn search(&self, error_line: &str) -> Result<Vec<IssueHit>> {
        Ok(vec![IssueHit {
            title: format!("issue for {error_line}"),
            html_url: "https://github.com/example/repo/issues/7".to_string(),
        }])
    }
}

struct EmptySearch;

impl IssueSearch for EmptySearch {
    fn search(&self, _error_line: &str) -> Result<Vec<IssueHit>> {
        Ok(Vec::new())
    }
}

fn conflict_map(entries: &[(&str, &str)]) -> ConflictMap {
    entries
        .iter()
        .map(|(id, fix)| {
            (
                id.to_string(),
                ConflictEntry {
                    fix: Some(fix.to_string()),
                },
            )
        })
        .collect()
}

fn build_engine(
    cache_root: &Path,
    feed: Box<dyn ConflictFeed>,
    search: Box<dyn IssueSearch>,
) -> AttributionEngine {
    let conflicts = ConflictStore::new(CacheStore::new(cache_root.join("cache")), feed, 48);
    let issues = IssueLookup::new(CacheStore::new(cache_root.join("cache")), search, 168);
    AttributionEngine::new(conflicts, issues)
}

fn quiet_engine(cache_root: &Path) -> AttributionEngine {
    build_engine(
        cache_root,
        Box::new(StaticFeed {
            map: ConflictMap::new(),
        }),
        Box::new(EmptySearch),
    )
}

/// Write a zip archive under `mods_dir` whose entry list holds `entries`.
fn write_jar(mods_dir: &Path, name: &str, entries: &[&str]) {
    let file = fs::File::create(mods_dir.join(name)).unwrap();
    let mut archive = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for entry in entries {
        archive.start_file(*entry, options).unwrap();
        archive.write_all(b"").unwrap();
    }
    archive.finish().unwrap();
}

/// Install directory fixture with an empty mods/ subdirectory.
fn install_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("mods")).unwrap();
    dir
}

fn finding_for<'a>(findings: &'a [Finding], signature: &str) -> &'a Finding {
    findings
        .iter()
        .find(|f| f.signature == signature)
        .unwrap_or_else(|| panic!("no finding for {signature}"))
}

#[test]
fn one_finding_per_signature_regardless_of_occurrences() {
    let install = install_fixture();
    let log = "java.lang.VerifyError: bad bytecode\n\
               some unrelated line\n\
               java.lang.VerifyError: bad bytecode again\n";

    let mut engine = quiet_engine(install.path());
    let report = engine.analyze(log, install.path());

    let verify_findings: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.signature == "VerifyError")
        .collect();
    assert_eq!(verify_findings.len(), 1);
}

#[test]
fn missing_class_attributed_to_sole_containing_archive() {
    let install = install_fixture();
    let mods = install.path().join("mods");
    write_jar(
        &mods,
        "magiclib-1.2.0.jar",
        &["com/example/magic/MagicCore.class", "fabric.mod.json"],
    );
    write_jar(&mods, "other-1.0.jar", &["net/other/Thing.class"]);

    let log = "[main/ERROR]: startup failed\n\
               java.lang.ClassNotFoundException: com.example.magic.MagicCore\n\
               \tat net.fabricmc.loader.Launcher.run(Launcher.java:10)\n";

    let mut engine = quiet_engine(install.path());
    let report = engine.analyze(log, install.path());

    let finding = finding_for(&report.findings, "ClassNotFoundException");
    assert_eq!(finding.suspects, vec!["magiclib"]);
    assert_eq!(report.suspects, vec!["magiclib"]);
}

#[test]
fn stack_frame_fallback_when_no_archive_contains_class() {
    let install = install_fixture();
    let mods = install.path().join("mods");
    write_jar(&mods, "magiclib-1.0.jar", &["assets/magiclib/icon.png"]);

    let log = "java.lang.ClassNotFoundException: com.ghost.Missing\n\
               \tat net.magiclib.mixin.HookMixin.apply(HookMixin.java:5)\n";

    let mut engine = quiet_engine(install.path());
    let report = engine.analyze(log, install.path());

    let finding = finding_for(&report.findings, "ClassNotFoundException");
    assert_eq!(
        finding.suspects,
        vec!["magiclib"],
        "suspects must come from the inventory only"
    );
}

#[test]
fn suspects_are_sorted_deduped_and_case_normalized() {
    let install = install_fixture();
    let mods = install.path().join("mods");
    write_jar(&mods, "AlphaMod-1.0.jar", &["alphamod.json"]);
    write_jar(&mods, "zetamod-2.0.jar", &["zetamod.json"]);

    let log = "java.lang.NullPointerException: boom\n\
               \tat zetamod.client.Renderer.draw(Renderer.java:1)\n\
               \tat AlphaMod.core.Engine.tick(Engine.java:2)\n\
               \tat zetamod.client.Renderer.draw(Renderer.java:1)\n";

    let mut engine = quiet_engine(install.path());
    let report = engine.analyze(log, install.path());

    let finding = finding_for(&report.findings, "NullPointerException");
    assert_eq!(finding.suspects, vec!["alphamod", "zetamod"]);
    assert_eq!(report.suspects, vec!["alphamod", "zetamod"]);
}

#[test]
fn unmatched_signature_lists_unknown_with_its_advice() {
    let install = install_fixture();
    let log = "java.lang.NullPointerException: oops\n";

    let mut engine = quiet_engine(install.path());
    let report = engine.analyze(log, install.path());

    let finding = finding_for(&report.findings, "NullPointerException");
    assert_eq!(finding.suspects, vec!["unknown"]);
    assert_eq!(
        finding.advice,
        "Mod tried to access a null value. Reset configs or remove the broken mod."
    );
    assert!(
        report.suspects.is_empty(),
        "unknown is a label, not a suspect"
    );
    assert!(report.fixes.contains(&finding.advice));
}

#[test]
fn missing_mods_directory_still_completes() {
    let install = TempDir::new().unwrap();
    let log = "java.lang.NullPointerException: oops\n";

    let mut engine = quiet_engine(install.path());
    let report = engine.analyze(log, install.path());

    assert!(report.suspects.is_empty());
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.findings.len(), 1);
}

#[test]
fn loader_failure_adds_suspect_and_conflict_fix() {
    let install = install_fixture();
    let mods = install.path().join("mods");
    write_jar(&mods, "jei-1.0.jar", &["jei.json"]);

    let log = "Failed to load mod: jei\n";
    let mut engine = build_engine(
        install.path(),
        Box::new(StaticFeed {
            map: conflict_map(&[("jei", "Update JEI to 15.2")]),
        }),
        Box::new(EmptySearch),
    );
    let report = engine.analyze(log, install.path());

    assert!(report.findings.is_empty());
    assert_eq!(report.suspects, vec!["jei"]);
    assert_eq!(report.fixes, vec!["Update JEI to 15.2"]);
}

#[test]
fn loader_failure_for_uninstalled_mod_is_ignored() {
    let install = install_fixture();
    let log = "Failed to load mod: ghostmod\n";

    let mut engine = quiet_engine(install.path());
    let report = engine.analyze(log, install.path());

    assert!(report.suspects.is_empty());
}

#[test]
fn external_suggestions_capped_at_two_in_query_order() {
    let install = install_fixture();
    let log = "java.lang.NullPointerException: first\n\
               java.lang.VerifyError: second\n\
               java.lang.OutOfMemoryError: third\n";

    let mut engine = build_engine(
        install.path(),
        Box::new(StaticFeed {
            map: ConflictMap::new(),
        }),
        Box::new(EchoSearch),
    );
    let report = engine.analyze(log, install.path());

    assert_eq!(report.external.len(), 2);
    assert!(report.external[0].contains("java.lang.NullPointerException: first"));
    assert!(report.external[1].contains("java.lang.VerifyError: second"));
}

#[test]
fn conflict_feed_failure_without_cache_completes_without_its_fixes() {
    let install = install_fixture();
    let mods = install.path().join("mods");
    write_jar(&mods, "jei-1.0.jar", &["jei.json"]);

    let log = "Failed to load mod: jei\n";
    let mut engine = build_engine(install.path(), Box::new(FailingFeed), Box::new(EmptySearch));
    let report = engine.analyze(log, install.path());

    assert_eq!(report.suspects, vec!["jei"]);
    assert!(report.fixes.is_empty());
}

#[test]
fn malformed_archive_is_skipped_not_fatal() {
    let install = install_fixture();
    let mods = install.path().join("mods");
    fs::write(mods.join("corrupt-1.0.jar"), b"this is not a zip").unwrap();
    write_jar(&mods, "sane-1.0.jar", &["net/sane/Thing.class"]);

    let log = "java.lang.ClassNotFoundException: com.ghost.Missing\n";

    let mut engine = quiet_engine(install.path());
    let report = engine.analyze(log, install.path());

    let finding = finding_for(&report.findings, "ClassNotFoundException");
    assert_eq!(finding.suspects, vec!["unknown"]);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn duplicate_advice_is_reported_once() {
    let install = install_fixture();
    let mods = install.path().join("mods");
    write_jar(&mods, "jei-1.0.jar", &["jei.json"]);

    let log = "Failed to load mod: jei\nFailed to load mod: jei\n";
    let mut engine = build_engine(
        install.path(),
        Box::new(StaticFeed {
            map: conflict_map(&[("jei", "Update JEI to 15.2")]),
        }),
        Box::new(EmptySearch),
    );
    let report = engine.analyze(log, install.path());

    assert_eq!(report.fixes, vec!["Update JEI to 15.2"]);
}

#[test]
fn sweep_reports_every_installed_mod_in_order() {
    let install = install_fixture();
    let mods = install.path().join("mods");
    write_jar(&mods, "sodium-0.5.jar", &["sodium.json"]);
    write_jar(&mods, "jei-1.0.jar", &["jei.json"]);

    let mut engine = build_engine(
        install.path(),
        Box::new(StaticFeed {
            map: conflict_map(&[("jei", "Update JEI to 15.2")]),
        }),
        Box::new(EmptySearch),
    );
    let rows = engine.sweep_mods(install.path());

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "jei");
    assert_eq!(rows[0].fix.as_deref(), Some("Update JEI to 15.2"));
    assert_eq!(rows[1].id, "sodium");
    assert_eq!(rows[1].fix, None);
}
