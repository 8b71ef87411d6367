//! Tree scanner: incremental traversal that builds a fresh manifest.
//!
//! The scanner walks each root depth-first (single-threaded, blocking I/O)
//! and appends one manifest entry per regular file visited. Hashes are
//! reused from the prior manifest's path index when the path is present
//! there; only index misses pay for a content read.
//!
//! # Known limitation
//!
//! Reuse trusts that an unchanged path implies unchanged content. There is
//! no mtime or size validation against the cached entry, so a file whose
//! content changed in place keeps its stale hash until the manifest is
//! rebuilt with [`Scanner::strict`]. Size, by contrast, is re-read on every
//! scan, so size drift is caught even when content drift is not.

pub mod hasher;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::manifest::{Manifest, ManifestEntry, NULL_DIGEST};
use crate::progress::{Progress, Update};

/// Counters accumulated over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Entries appended to the manifest.
    pub files: u64,
    /// Files freshly hashed (index misses, or all files under strict mode).
    pub hashed: u64,
    /// Hashes reused from the prior manifest.
    pub reused: u64,
    /// Files whose size was read successfully.
    pub sized: u64,
    /// Files recorded with the sentinel digest.
    pub hash_failures: u64,
    /// Files recorded with an absent size.
    pub size_failures: u64,
}

impl ScanStats {
    /// Whether any file degraded to a sentinel hash or absent size.
    #[must_use]
    pub fn degraded(&self) -> bool {
        self.hash_failures > 0 || self.size_failures > 0
    }
}

/// Walks directory trees and produces manifest entries.
pub struct Scanner {
    index: HashMap<PathBuf, String>,
    strict: bool,
}

impl Scanner {
    /// Create a scanner over a path→hash index from a prior manifest.
    ///
    /// Pass an empty index for a from-scratch scan.
    #[must_use]
    pub fn new(index: HashMap<PathBuf, String>) -> Self {
        Self {
            index,
            strict: false,
        }
    }

    /// Enable strict mode: ignore the index and re-hash every file.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Scan all roots and build a replacement manifest.
    ///
    /// Per-file errors are never fatal: an unreadable file is recorded with
    /// the sentinel digest and/or an absent size, and traversal continues.
    /// Roots that overlap produce one entry per visit; the scanner does not
    /// deduplicate paths.
    pub fn scan(&self, roots: &[PathBuf], progress: &mut Progress) -> (Manifest, ScanStats) {
        let mut manifest = Manifest::new();
        let mut stats = ScanStats::default();
        for root in roots {
            self.walk(root, &mut manifest, &mut stats, progress);
        }
        (manifest, stats)
    }

    fn walk(
        &self,
        root: &Path,
        manifest: &mut Manifest,
        stats: &mut ScanStats,
        progress: &mut Progress,
    ) {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();

            let cached = if self.strict {
                None
            } else {
                self.index.get(&path)
            };
            let hash = match cached {
                Some(hash) => {
                    stats.reused += 1;
                    hash.clone()
                }
                None => {
                    log::debug!("hashing {}", path.display());
                    stats.hashed += 1;
                    let hash = hasher::hash_file(&path, progress);
                    if hash == NULL_DIGEST {
                        stats.hash_failures += 1;
                    }
                    hash
                }
            };

            // Size is always read fresh, even when the hash came from the
            // index, so a size change shows up in the new manifest.
            let size = match fs::metadata(&path) {
                Ok(meta) => {
                    stats.sized += 1;
                    Some(meta.len())
                }
                Err(e) => {
                    log::warn!("could not read size of {}: {}", path.display(), e);
                    stats.size_failures += 1;
                    None
                }
            };

            manifest.push(ManifestEntry {
                hash,
                size,
                path: path.clone(),
            });
            stats.files += 1;
            progress.report(Update::file_scanned(
                stats.files,
                stats.hashed,
                stats.sized,
                &path,
            ));
        }
    }
}
