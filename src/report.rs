// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report rendering and persistence

use crate::types::{AttributionReport, ModCompatibility};
use anyhow::Result;
use colored::*;
use std::fs;
use std::path::Path;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, report: &AttributionReport) {
        println!("\n{}", "=== MODSLEUTH CRASH REPORT ===".bold().cyan());
        println!();
        self.print_findings(report);
        self.print_suspects(report);
        self.print_fixes(report);
        self.print_external(report);
        self.print_diagnostics(report);
    }

    fn print_findings(&self, report: &AttributionReport) {
        if report.findings.is_empty() {
            println!("{}", "No known failure signatures matched.".green());
            println!();
            return;
        }
        println!("{}", "DETECTED FAILURES".bold().yellow());
        for finding in &report.findings {
            println!(
                "  {} caused by: {}",
                finding.signature.bold().red(),
                finding.suspects.join(", ")
            );
            println!("    fix: {}", finding.advice);
        }
        println!();
    }

    fn print_suspects(&self, report: &AttributionReport) {
        println!("{}", "SUSPECTED MODS".bold().yellow());
        if report.suspects.is_empty() {
            println!("  {}", "No direct suspects found.".green());
        } else {
            for id in &report.suspects {
                println!("  - {id}");
            }
        }
        println!();
    }

    fn print_fixes(&self, report: &AttributionReport) {
        if report.fixes.is_empty() {
            return;
        }
        println!("{}", "SUGGESTED FIXES".bold().yellow());
        for fix in &report.fixes {
            println!("  -> {fix}");
        }
        println!();
    }

    fn print_external(&self, report: &AttributionReport) {
        if report.external.is_empty() {
            return;
        }
        println!("{}", "EXTERNAL REFERENCES".bold().yellow());
        for item in &report.external {
            println!("  {item}");
        }
        println!();
    }

    fn print_diagnostics(&self, report: &AttributionReport) {
        if report.diagnostics.is_empty() {
            return;
        }
        println!("{}", "SCAN DIAGNOSTICS".bold().red());
        for note in &report.diagnostics {
            println!("  {note}");
        }
        println!();
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the report as pretty JSON, creating parent directories.
pub fn save_report(report: &AttributionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

/// Print the compatibility sweep as a summary table.
pub fn print_compatibility(rows: &[ModCompatibility]) {
    println!("\n{}", "=== MOD COMPATIBILITY CHECK ===".bold().cyan());
    if rows.is_empty() {
        println!("  No mods installed.");
        println!();
        return;
    }
    println!("  {:<28} {}", "Mod", "Status");
    println!("  {}", "-".repeat(64));
    for row in rows {
        match &row.fix {
            Some(fix) => println!("  {:<28} {} {}", row.id, "conflict:".red().bold(), fix),
            None => println!("  {:<28} {}", row.id, "no conflict found".green()),
        }
    }
    println!();
}
