//! Integration tests for the manifest codec: round trips and the
//! version-0 fallback path, exercised through real files.

use std::fs;
use std::path::PathBuf;

use dupman::manifest::codec::{self, CodecError, VERSION_HEADER};
use dupman::manifest::{Manifest, ManifestEntry};
use tempfile::tempdir;

fn hash(c: char) -> String {
    std::iter::repeat(c).take(40).collect()
}

#[test]
fn round_trip_preserves_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.manifest");

    let mut manifest = Manifest::new();
    manifest.push(ManifestEntry::new(hash('a'), Some(0), "/data/zero.bin"));
    manifest.push(ManifestEntry::new(
        hash('b'),
        Some(u64::MAX),
        "/data/with spaces/also spaces.img",
    ));
    manifest.push(ManifestEntry::new(hash('c'), None, "/gone mid-scan"));

    codec::write(&manifest, &path).unwrap();
    let loaded = codec::read(&path).unwrap().expect("manifest exists");
    assert_eq!(loaded, manifest);
}

#[test]
fn written_file_starts_with_version_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.manifest");
    codec::write(&Manifest::new(), &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, format!("{VERSION_HEADER}\n"));
}

#[test]
fn absent_size_serialized_as_none_token() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.manifest");

    let mut manifest = Manifest::new();
    manifest.push(ManifestEntry::new(hash('a'), None, "/x"));
    codec::write(&manifest, &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(&format!("{} None /x", hash('a'))));
}

#[test]
fn missing_file_reads_as_absent() {
    let dir = tempdir().unwrap();
    let result = codec::read(&dir.path().join("no-such.manifest")).unwrap();
    assert!(result.is_none());
}

#[test]
fn legacy_file_parsed_without_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.manifest");
    fs::write(
        &path,
        format!("{} /old/a.txt\n{} /old/b with space.txt\n", hash('1'), hash('2')),
    )
    .unwrap();

    let manifest = codec::read(&path).unwrap().unwrap();
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.entries[0].hash, hash('1'));
    assert_eq!(manifest.entries[0].size, None);
    assert_eq!(manifest.entries[1].path, PathBuf::from("/old/b with space.txt"));
}

#[test]
fn first_line_of_legacy_file_is_data_not_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.manifest");
    // No header at all: line one must come back as a record, not be
    // swallowed as a misidentified version line.
    fs::write(&path, format!("{} /first/line.bin\n", hash('f'))).unwrap();

    let manifest = codec::read(&path).unwrap().unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.entries[0].path, PathBuf::from("/first/line.bin"));
}

#[test]
fn near_miss_header_falls_back_to_legacy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.manifest");
    // "version 2" is not "version 1"; the whole file is legacy, and this
    // line is too short to be a legacy record.
    fs::write(&path, "version 2\n").unwrap();

    match codec::read(&path).unwrap_err() {
        CodecError::MalformedLine { line, content } => {
            assert_eq!(line, 1);
            assert_eq!(content, "version 2");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn legacy_file_tolerates_arbitrary_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.manifest");
    let mut bytes = hash('9').into_bytes();
    bytes.push(b' ');
    bytes.extend_from_slice(&[b'/', 0xff, 0xfe, b'x', b'\n']);
    fs::write(&path, &bytes).unwrap();

    let manifest = codec::read(&path).unwrap().unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(
        manifest.entries[0].path,
        PathBuf::from("/\u{ff}\u{fe}x"),
        "high bytes decode one-per-character"
    );
}

#[test]
fn malformed_current_line_reports_line_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.manifest");
    fs::write(
        &path,
        format!(
            "{VERSION_HEADER}\n{} 10 /fine\n{} 12no-second-separator\n",
            hash('a'),
            hash('b')
        ),
    )
    .unwrap();

    match codec::read(&path).unwrap_err() {
        CodecError::MalformedLine { line, content } => {
            assert_eq!(line, 3);
            assert!(content.contains("12no-second-separator"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_lines_do_not_shift_error_line_numbers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.manifest");
    // Malformed record sits on physical line 4; the blank line above it
    // must not shrink the reported position.
    fs::write(
        &path,
        format!("{VERSION_HEADER}\n{} 10 /fine\n\nbroken\n", hash('a')),
    )
    .unwrap();

    match codec::read(&path).unwrap_err() {
        CodecError::MalformedLine { line, content } => {
            assert_eq!(line, 4);
            assert_eq!(content, "broken");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_utf8_in_current_record_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.manifest");
    let mut bytes = format!("{VERSION_HEADER}\n{} 10 /caf", hash('a')).into_bytes();
    bytes.push(0xe9); // valid in legacy files, corruption in version 1
    bytes.push(b'\n');
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        codec::read(&path).unwrap_err(),
        CodecError::MalformedLine { line: 2, .. }
    ));
}

#[test]
fn malformed_size_token_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.manifest");
    fs::write(
        &path,
        format!("{VERSION_HEADER}\n{} many /path\n", hash('a')),
    )
    .unwrap();

    assert!(matches!(
        codec::read(&path).unwrap_err(),
        CodecError::MalformedLine { line: 2, .. }
    ));
}

#[test]
fn crlf_line_endings_are_accepted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.manifest");
    fs::write(
        &path,
        format!("{VERSION_HEADER}\r\n{} 5 /dos/path\r\n", hash('a')),
    )
    .unwrap();

    let manifest = codec::read(&path).unwrap().unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.entries[0].size, Some(5));
    assert_eq!(manifest.entries[0].path, PathBuf::from("/dos/path"));
}
