//! Command-line interface definitions for dupman.
//!
//! Flat flag-style surface (no subcommands) matching how the tool is used
//! in practice: point it at roots, name a manifest, and pick one or both
//! operations.
//!
//! # Example
//!
//! ```bash
//! # Build or refresh a manifest for two trees
//! dupman --scan -m archive.manifest /mnt/backup /mnt/media
//!
//! # Report duplicates from an existing manifest
//! dupman --find-dups -m archive.manifest --report dups.txt
//!
//! # One pass: rescan then report
//! dupman --scan --find-dups -m archive.manifest /mnt/backup
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Manifest-driven duplicate file finder.
///
/// dupman keeps a persisted inventory of (path, hash, size) for large,
/// slow-changing file stores. Re-scans reuse hashes for paths already in
/// the manifest, so only new or moved files pay for a content read.
/// Note: reuse trusts the path alone — a file changed in place keeps its
/// old hash unless --strict forces a full re-hash.
#[derive(Debug, Parser)]
#[command(name = "dupman")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Paths to scan
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Manifest file to read and write
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_if_eq("scan", "true"),
        required_if_eq("find_dups", "true")
    )]
    pub manifest: Option<PathBuf>,

    /// Compute hashes for the given paths and rewrite the manifest
    #[arg(long)]
    pub scan: bool,

    /// Find files with the same hash in the manifest
    #[arg(long)]
    pub find_dups: bool,

    /// Write the duplicate report here instead of standard output
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Re-hash every file instead of trusting hashes from the existing
    /// manifest (slower, but catches files changed in place)
    #[arg(long)]
    pub strict: bool,

    /// Increase verbosity (-v for per-file diagnostics, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
