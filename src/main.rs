// SPDX-License-Identifier: PMPL-1.0-or-later

//! modsleuth: crash log attribution and mod conflict diagnosis
//!
//! Scans an install directory's latest run log, matches known failure
//! signatures, attributes them to installed mod archives, and merges in
//! remote conflict and issue knowledge.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use modsleuth::cache::CacheStore;
use modsleuth::config::Config;
use modsleuth::conflicts::{ConflictStore, HttpConflictFeed};
use modsleuth::engine::AttributionEngine;
use modsleuth::issues::{GithubIssueSearch, IssueLookup};
use modsleuth::remote::RemoteFetchPolicy;
use modsleuth::report::{self, ReportFormatter};
use modsleuth::types::ScanError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "modsleuth")]
#[command(version)]
#[command(about = "Crash log attribution and mod conflict diagnosis for modded Java installs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the latest run log of an install directory
    Scan {
        /// Install directory containing logs/ and mods/
        #[arg(value_name = "FOLDER")]
        folder: PathBuf,

        /// Write the report as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON instead of formatted text
        #[arg(long)]
        json: bool,

        /// Configuration file (default: modsleuth.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check installed mods against the conflict database
    Mods {
        /// Install directory containing mods/
        #[arg(value_name = "FOLDER")]
        folder: PathBuf,

        /// Configuration file (default: modsleuth.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Scan {
            folder,
            output,
            json,
            config,
        } => {
            let config = Config::load(config.as_deref())?;
            let log_text = match read_run_log(&folder) {
                Ok(text) => text,
                Err(ScanError::LogMissing { path }) => {
                    println!(
                        "{} {} not found; run the game once to produce a log",
                        "missing log:".red().bold(),
                        path.display()
                    );
                    return Ok(ExitCode::from(2));
                }
                Err(err) => return Err(err.into()),
            };

            let mut engine = build_engine(&config);
            let report = engine.analyze(&log_text, &folder);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                ReportFormatter::new().print(&report);
            }
            if let Some(path) = output {
                report::save_report(&report, &path)?;
                println!("Report saved to: {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Mods { folder, config } => {
            let config = Config::load(config.as_deref())?;
            let mut engine = build_engine(&config);
            let rows = engine.sweep_mods(&folder);
            report::print_compatibility(&rows);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Wire concrete services from the configuration. Each service owns its
/// own cache handle over the shared cache directory.
fn build_engine(config: &Config) -> AttributionEngine {
    let conflicts = ConflictStore::new(
        CacheStore::new(&config.cache_dir),
        Box::new(HttpConflictFeed::new(
            config.conflicts_url.as_str(),
            RemoteFetchPolicy::with_timeout_secs(config.conflicts_timeout_secs),
        )),
        config.conflicts_max_age_hours,
    );
    let issues = IssueLookup::new(
        CacheStore::new(&config.cache_dir),
        Box::new(GithubIssueSearch::new(
            config.issue_search_url.as_str(),
            config.github_token.clone().unwrap_or_default(),
            RemoteFetchPolicy::with_timeout_secs(config.issues_timeout_secs),
        )),
        config.issues_max_age_hours,
    );
    AttributionEngine::new(conflicts, issues)
}

/// Read `logs/latest.log` under the install directory, decoding
/// tolerantly: invalid UTF-8 sequences are replaced, not fatal.
fn read_run_log(folder: &Path) -> Result<String, ScanError> {
    let path = folder.join("logs").join("latest.log");
    if !path.is_file() {
        return Err(ScanError::LogMissing { path });
    }
    let raw = fs::read(&path).map_err(|source| ScanError::LogUnreadable {
        path: path.clone(),
        source,
    })?;
    let (text, _, _) = encoding_rs::UTF_8.decode(&raw);
    Ok(text.into_owned())
}
