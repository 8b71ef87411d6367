//! Manifest data model: the persisted inventory of scanned files.
//!
//! A [`Manifest`] is an ordered sequence of [`ManifestEntry`] records, one
//! per file visited during a scan. Order is discovery order and is not
//! guaranteed stable across runs. Entries are keyed by path only loosely:
//! overlapping scan roots can legitimately produce repeated paths, and the
//! derived [path index](Manifest::path_index) resolves repeats by letting
//! the last entry win.

pub mod codec;

use std::collections::HashMap;
use std::path::PathBuf;

/// Length of a rendered digest in hex characters (SHA-1, 160 bits).
pub const HASH_LEN: usize = 40;

/// Sentinel digest recorded when a file's content could not be read.
pub const NULL_DIGEST: &str = "0000000000000000000000000000000000000000";

/// SHA-1 of the empty input, i.e. the shared digest of every zero-byte file.
pub const EMPTY_DIGEST: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

/// One record per scanned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Content digest: 40 lowercase hex characters, or [`NULL_DIGEST`]
    /// when the content was unreadable.
    pub hash: String,
    /// Byte count, or `None` when the size could not be determined.
    /// Size is independent of hash validity; either can fail alone.
    pub size: Option<u64>,
    /// Path as supplied by the caller or produced by traversal.
    pub path: PathBuf,
}

impl ManifestEntry {
    #[must_use]
    pub fn new(hash: impl Into<String>, size: Option<u64>, path: impl Into<PathBuf>) -> Self {
        Self {
            hash: hash.into(),
            size,
            path: path.into(),
        }
    }
}

/// Ordered inventory of scanned files.
///
/// Constructed empty, populated entry-by-entry during a scan, and replaced
/// wholesale on each scan; only hash values are carried over from the prior
/// manifest, via [`Manifest::path_index`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    /// Build the ephemeral path→hash index used for incremental scans.
    ///
    /// When a path appears more than once (overlapping roots in the scan
    /// that produced this manifest), the last entry wins.
    #[must_use]
    pub fn path_index(&self) -> HashMap<PathBuf, String> {
        let mut index = HashMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            index.insert(entry.path.clone(), entry.hash.clone());
        }
        index
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_index_last_entry_wins() {
        let mut manifest = Manifest::new();
        manifest.push(ManifestEntry::new("a".repeat(40), Some(1), "/x"));
        manifest.push(ManifestEntry::new("b".repeat(40), Some(2), "/x"));
        manifest.push(ManifestEntry::new("c".repeat(40), None, "/y"));

        let index = manifest.path_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&PathBuf::from("/x")], "b".repeat(40));
        assert_eq!(index[&PathBuf::from("/y")], "c".repeat(40));
    }

    #[test]
    fn test_manifest_starts_empty() {
        let manifest = Manifest::new();
        assert!(manifest.is_empty());
        assert_eq!(manifest.len(), 0);
        assert!(manifest.path_index().is_empty());
    }

    #[test]
    fn test_reserved_digests_are_distinct() {
        assert_eq!(NULL_DIGEST.len(), HASH_LEN);
        assert_eq!(EMPTY_DIGEST.len(), HASH_LEN);
        assert_ne!(NULL_DIGEST, EMPTY_DIGEST);
    }
}
