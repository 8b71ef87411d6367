//! Grouping manifest entries by hash and ranking duplicate groups.
//!
//! Groups are ranked by file size descending, not by copy count: the point
//! of the report is to surface the largest space-reclaim opportunities
//! first, and three spare copies of a disk image beat fifty spare copies of
//! a config file. Two reserved hashes are excluded outright — the all-zero
//! sentinel (unreadable files) and the digest of the empty input (zero-byte
//! files) — since both collide trivially and would drown the report.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::manifest::{Manifest, ManifestEntry, EMPTY_DIGEST, NULL_DIGEST};

/// A set of ≥2 paths sharing one content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The shared content hash.
    pub hash: String,
    /// Common file size for the hash. Zero when no entry in the bucket had
    /// a readable size.
    pub size: u64,
    /// All paths carrying this hash, in manifest order.
    pub paths: Vec<PathBuf>,
    /// Reclaimable bytes accumulated across this and all higher-ranked
    /// groups: `size × (count − 1)` summed in report order.
    pub cumulative_excess: u64,
}

impl DuplicateGroup {
    /// Reclaimable bytes for this group alone.
    #[must_use]
    pub fn excess_bytes(&self) -> u64 {
        self.size * (self.paths.len() as u64 - 1)
    }
}

/// Result of a duplicate search, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Reported groups, largest file size first.
    pub groups: Vec<DuplicateGroup>,
    /// Distinct hashes across the whole manifest.
    pub unique_hashes: usize,
    /// Total manifest entries.
    pub total_entries: usize,
    /// Every path in every reported group (not just the excess copies).
    pub duplicate_files: usize,
}

impl DuplicateReport {
    /// Render the report.
    ///
    /// Output depends only on the manifest content, so re-rendering an
    /// unchanged manifest is byte-identical.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for group in &self.groups {
            writeln!(
                out,
                "{}: {} duplicates, {} bytes each ({} GB reclaimable so far)",
                group.hash,
                group.paths.len(),
                group.size,
                whole_gigabytes(group.cumulative_excess)
            )?;
            for path in &group.paths {
                writeln!(out, "    {}", path.display())?;
            }
        }
        writeln!(
            out,
            "{} unique files out of {} total files",
            self.unique_hashes, self.total_entries
        )?;
        writeln!(
            out,
            "{} duplicated hashes found, {} duplicated files found",
            self.groups.len(),
            self.duplicate_files
        )?;
        Ok(())
    }
}

/// Group a manifest's entries by hash and build the ranked report.
pub fn find(manifest: &Manifest) -> DuplicateReport {
    let mut buckets: HashMap<&str, Vec<&ManifestEntry>> = HashMap::new();
    for entry in manifest {
        buckets.entry(entry.hash.as_str()).or_default().push(entry);
    }
    let unique_hashes = buckets.len();

    let mut groups: Vec<DuplicateGroup> = buckets
        .into_iter()
        .filter(|(hash, entries)| {
            entries.len() >= 2 && *hash != NULL_DIGEST && *hash != EMPTY_DIGEST
        })
        .map(|(hash, entries)| DuplicateGroup {
            hash: hash.to_string(),
            size: bucket_size(hash, &entries),
            paths: entries.iter().map(|e| e.path.clone()).collect(),
            cumulative_excess: 0,
        })
        .collect();

    // Size descending; hash breaks ties so the report order is total and
    // repeat runs stay byte-identical.
    groups.sort_by(|a, b| (Reverse(a.size), &a.hash).cmp(&(Reverse(b.size), &b.hash)));

    let mut cumulative = 0u64;
    let mut duplicate_files = 0usize;
    for group in &mut groups {
        cumulative += group.excess_bytes();
        group.cumulative_excess = cumulative;
        duplicate_files += group.paths.len();
    }

    DuplicateReport {
        groups,
        unique_hashes,
        total_entries: manifest.len(),
        duplicate_files,
    }
}

/// Pick the common size for a hash bucket.
///
/// Identical content implies identical length, so all sized entries should
/// agree; a disagreement means caller error or manifest corruption and is
/// surfaced as a warning while the first observed size is kept.
fn bucket_size(hash: &str, entries: &[&ManifestEntry]) -> u64 {
    let mut size: Option<u64> = None;
    for entry in entries {
        if let Some(s) = entry.size {
            match size {
                None => size = Some(s),
                Some(first) if first != s => {
                    log::warn!(
                        "size mismatch within hash {hash}: {first} vs {s} ({})",
                        entry.path.display()
                    );
                }
                Some(_) => {}
            }
        }
    }
    size.unwrap_or(0)
}

/// Round a byte count to whole (decimal) gigabytes for display.
fn whole_gigabytes(bytes: u64) -> u64 {
    (bytes + 500_000_000) / 1_000_000_000
}
