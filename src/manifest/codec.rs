//! On-disk manifest format: version-1 writer and the dual-version reader.
//!
//! # Format
//!
//! The current format ("version 1") is a text file whose first line is the
//! literal `version 1`. Each subsequent line is:
//!
//! ```text
//! <40-char hash> <size-or-None> <path>
//! ```
//!
//! The path is stored verbatim and may itself contain spaces; records are
//! parsed by locating the second separator only, relying on the size field
//! being a contiguous non-space token.
//!
//! # Legacy fallback
//!
//! Historical ("version 0") manifests carry no header: every line is a
//! fixed-width `<40 chars><separator><path>` record with no size field.
//! Version detection peeks at the first line; anything other than exactly
//! `version 1` re-parses the whole file, first line included, under the
//! legacy rule. Legacy files predate any encoding discipline, so they are
//! decoded byte-per-character (latin-1 style) rather than as UTF-8.
//!
//! Both readers are plain functions ([`parse_current`], [`parse_legacy`])
//! selected by [`read`]; each is testable on its own.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{Manifest, ManifestEntry, HASH_LEN};

/// Header line that identifies the current format.
pub const VERSION_HEADER: &str = "version 1";

/// Serialized form of an absent size.
const ABSENT_SIZE: &str = "None";

/// Errors raised by manifest reading and writing.
///
/// Parse errors are fatal to the read and carry the one-based line number
/// and the raw offending line; the codec never attempts recovery.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    /// An I/O error occurred while reading or writing the manifest file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Manifest path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A record line did not match the expected structure.
    #[error("malformed manifest line {line}: {content:?}")]
    MalformedLine {
        /// One-based line number within the file
        line: usize,
        /// The raw line content
        content: String,
    },
}

impl CodecError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a manifest file, detecting its format version.
///
/// Returns `Ok(None)` when the file does not exist; an absent manifest is
/// an ordinary state (first scan), not an error.
pub fn read(path: &Path) -> Result<Option<Manifest>, CodecError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|e| CodecError::io(path, e))?;

    // Peek one line to pick the parse variant. The header check is exact;
    // any other first line means the whole file is legacy data.
    let (first, body) = split_first_line(&bytes);
    let manifest = if trim_newline(first) == VERSION_HEADER.as_bytes() {
        parse_current(body)?
    } else {
        parse_legacy(&bytes)?
    };
    log::debug!(
        "read {} entries from manifest {}",
        manifest.len(),
        path.display()
    );
    Ok(Some(manifest))
}

/// Write a manifest in the current (version 1) format.
///
/// Always emits the `version 1` header and UTF-8 record lines; an absent
/// size is serialized as the literal token `None`. The write is not atomic;
/// callers that need atomicity stage to a temporary path and rename.
pub fn write(manifest: &Manifest, path: &Path) -> Result<(), CodecError> {
    let file = File::create(path).map_err(|e| CodecError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let mut emit = || -> std::io::Result<()> {
        writeln!(out, "{VERSION_HEADER}")?;
        for entry in manifest {
            match entry.size {
                Some(size) => {
                    writeln!(out, "{} {} {}", entry.hash, size, entry.path.display())?;
                }
                None => {
                    writeln!(out, "{} {ABSENT_SIZE} {}", entry.hash, entry.path.display())?;
                }
            }
        }
        out.flush()
    };
    emit().map_err(|e| CodecError::io(path, e))
}

/// Parse version-1 record lines (the bytes after the header line).
///
/// Line numbering starts at 2 because line 1 was consumed as the header,
/// and counts physical lines so a reported error position matches what an
/// editor shows. Blank lines are skipped but still numbered.
pub fn parse_current(body: &[u8]) -> Result<Manifest, CodecError> {
    let mut manifest = Manifest::new();
    for (offset, raw) in body.split(|&b| b == b'\n').enumerate() {
        let linenum = offset + 2;
        let line = trim_newline(raw);
        if line.is_empty() {
            continue;
        }
        // Version 1 is written as UTF-8; anything else is corruption, not
        // a path to be repaired.
        let line = std::str::from_utf8(line).map_err(|_| CodecError::MalformedLine {
            line: linenum,
            content: decode_latin1(line),
        })?;
        manifest.push(parse_current_line(line, linenum)?);
    }
    Ok(manifest)
}

fn parse_current_line(line: &str, linenum: usize) -> Result<ManifestEntry, CodecError> {
    let malformed = || CodecError::MalformedLine {
        line: linenum,
        content: line.to_string(),
    };

    // Hash occupies exactly the first 40 characters, then one separator.
    // The hash field is hex, so a multi-byte character inside it (or a
    // missing separator) is structural corruption.
    if line.len() < HASH_LEN + 2
        || !line.is_char_boundary(HASH_LEN)
        || line.as_bytes()[HASH_LEN] != b' '
    {
        return Err(malformed());
    }
    let hash = &line[..HASH_LEN];
    let rest = &line[HASH_LEN + 1..];

    // Size is the contiguous token up to the second separator; everything
    // after that separator is the path, verbatim (spaces included).
    let sep = rest.find(' ').ok_or_else(malformed)?;
    let (size_token, path) = (&rest[..sep], &rest[sep + 1..]);
    if path.is_empty() {
        return Err(malformed());
    }
    let size = if size_token == ABSENT_SIZE {
        None
    } else {
        Some(size_token.parse::<u64>().map_err(|_| malformed())?)
    };

    Ok(ManifestEntry::new(hash, size, path))
}

/// Parse a whole file under the version-0 fixed-width rule.
///
/// Every line, including whatever was peeked as a would-be header, is a
/// record: 40 hash characters, one separator character (skipped without
/// inspection, as historical writers varied), then the path. Size is always
/// absent. Bytes outside 7-bit ASCII are decoded one-byte-per-character.
pub fn parse_legacy(bytes: &[u8]) -> Result<Manifest, CodecError> {
    let mut manifest = Manifest::new();
    for (offset, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let linenum = offset + 1;
        let line = trim_newline(raw);
        if line.is_empty() {
            continue;
        }
        if line.len() < HASH_LEN + 2 {
            return Err(CodecError::MalformedLine {
                line: linenum,
                content: decode_latin1(line),
            });
        }
        let hash = decode_latin1(&line[..HASH_LEN]);
        // Historical writers right-padded some paths; trailing whitespace
        // is not meaningful in version 0.
        let path = decode_latin1(&line[HASH_LEN + 1..]).trim_end().to_string();
        manifest.push(ManifestEntry::new(hash, None, path));
    }
    Ok(manifest)
}

/// Split off the first line (including its terminator) from the rest.
fn split_first_line(bytes: &[u8]) -> (&[u8], &[u8]) {
    match bytes.iter().position(|&b| b == b'\n') {
        Some(pos) => (&bytes[..=pos], &bytes[pos + 1..]),
        None => (bytes, &[]),
    }
}

fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
