//! dupman - Manifest-Driven Duplicate File Finder
//!
//! Builds a persisted inventory ("manifest") of files under one or more
//! directory trees, recording each file's path, SHA-1 content hash, and
//! size, and answers "which files are byte-identical duplicates?" from
//! that inventory. Re-scans reuse previously computed hashes for unchanged
//! paths, which keeps audits of large, slow-changing stores cheap.

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod progress;
pub mod scanner;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::error::ExitCode;
use crate::manifest::{codec, Manifest};
use crate::progress::Progress;
use crate::scanner::Scanner;

/// Run the requested operations.
///
/// When both `--scan` and `--find-dups` are given, the scan runs first so
/// the duplicate report reflects the freshly written manifest.
pub fn run(cli: Cli) -> Result<ExitCode> {
    if !cli.scan && !cli.find_dups {
        log::warn!("nothing to do: pass --scan and/or --find-dups");
        return Ok(ExitCode::Success);
    }

    let mut code = ExitCode::Success;
    if cli.scan {
        let manifest_path = required_manifest(&cli)?;
        code = scan_command(&cli.paths, manifest_path, cli.strict, cli.quiet)?;
    }
    if cli.find_dups {
        let manifest_path = required_manifest(&cli)?;
        find_dups_command(manifest_path, cli.report.as_deref())?;
    }
    Ok(code)
}

fn required_manifest(cli: &Cli) -> Result<&Path> {
    // clap enforces this; the context is for programmatic callers.
    cli.manifest
        .as_deref()
        .context("a manifest path is required (--manifest/-m)")
}

/// Scan the given roots and replace the manifest.
fn scan_command(
    paths: &[PathBuf],
    manifest_path: &Path,
    strict: bool,
    quiet: bool,
) -> Result<ExitCode> {
    let started = Instant::now();

    let prior = codec::read(manifest_path)
        .with_context(|| format!("reading manifest {}", manifest_path.display()))?;
    let index = prior.map(|m| m.path_index()).unwrap_or_default();
    log::info!("{} existing hashes loaded from manifest", index.len());

    let mut progress = if quiet {
        Progress::disabled()
    } else {
        Progress::new()
    };
    let scanner = Scanner::new(index).strict(strict);
    let (manifest, stats) = scanner.scan(paths, &mut progress);
    progress.clear();

    write_replacing(&manifest, manifest_path)?;
    log::info!(
        "scanned {} files ({} hashed, {} reused) in {:.3} seconds",
        stats.files,
        stats.hashed,
        stats.reused,
        started.elapsed().as_secs_f64()
    );

    if stats.degraded() {
        log::warn!(
            "{} files could not be hashed, {} could not be sized",
            stats.hash_failures,
            stats.size_failures
        );
        Ok(ExitCode::PartialSuccess)
    } else {
        Ok(ExitCode::Success)
    }
}

/// Write the manifest via a temporary sibling and rename.
///
/// The codec itself is not atomic; staging here means a crash mid-write
/// leaves the previous manifest intact rather than a truncated one.
fn write_replacing(manifest: &Manifest, path: &Path) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    codec::write(manifest, &tmp)
        .with_context(|| format!("writing manifest {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("replacing manifest {}", path.display()))?;
    log::debug!("wrote {} entries to {}", manifest.len(), path.display());
    Ok(())
}

/// Load the manifest and render the duplicate report.
fn find_dups_command(manifest_path: &Path, report_path: Option<&Path>) -> Result<()> {
    let started = Instant::now();

    let manifest = codec::read(manifest_path)
        .with_context(|| format!("reading manifest {}", manifest_path.display()))?
        .with_context(|| format!("manifest {} does not exist", manifest_path.display()))?;
    log::info!("finding duplicates across {} entries", manifest.len());

    let report = duplicates::find(&manifest);
    match report_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating report file {}", path.display()))?;
            let mut out = BufWriter::new(file);
            report.write_to(&mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            report.write_to(&mut stdout.lock())?;
        }
    }

    log::info!(
        "find-dups: {} groups among {} entries in {:.3} seconds",
        report.groups.len(),
        report.total_entries,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
