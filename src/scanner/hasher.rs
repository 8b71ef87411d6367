//! Streaming SHA-1 content hasher.
//!
//! Files are read through a fixed 64 KiB buffer so memory stays bounded
//! regardless of file size. Hashing never fails from the caller's point of
//! view: any I/O error, at open or mid-read, yields the all-zero sentinel
//! digest so a tree scan is never derailed by one unreadable file.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::manifest::NULL_DIGEST;
use crate::progress::{Progress, Update};

/// Read buffer size for streaming hash computation.
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Hash a file's content, reporting cumulative bytes read as it goes.
///
/// Returns 40 lowercase hex characters, or [`NULL_DIGEST`] when the content
/// could not be read. Errors are logged at debug level only; the per-file
/// failure is recorded in the manifest itself via the sentinel.
pub fn hash_file(path: &Path, progress: &mut Progress) -> String {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::debug!("cannot open {}: {}", path.display(), e);
            return NULL_DIGEST.to_string();
        }
    };

    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; BLOCK_SIZE];
    let mut total: u64 = 0;
    loop {
        match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buf[..n]);
                total += n as u64;
                progress.report(Update::hashing(path, total));
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                log::debug!("read error in {}: {}", path.display(), e);
                return NULL_DIGEST.to_string();
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::EMPTY_DIGEST;
    use std::io::Write;

    #[test]
    fn test_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"hello world")
            .unwrap();

        let digest = hash_file(&path, &mut Progress::disabled());
        assert_eq!(digest, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
    }

    #[test]
    fn test_empty_file_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::File::create(&path).unwrap();

        let digest = hash_file(&path, &mut Progress::disabled());
        assert_eq!(digest, EMPTY_DIGEST);
    }

    #[test]
    fn test_sentinel_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vanished");

        let digest = hash_file(&path, &mut Progress::disabled());
        assert_eq!(digest, NULL_DIGEST);
    }

    #[test]
    fn test_large_file_spans_multiple_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data = vec![0xabu8; BLOCK_SIZE * 2 + 17];
        std::fs::write(&path, &data).unwrap();

        let mut progress = Progress::disabled();
        let digest = hash_file(&path, &mut progress);
        assert_eq!(digest.len(), 40);
        assert_ne!(digest, NULL_DIGEST);
        assert_eq!(progress.counters().bytes_read, data.len() as u64);
    }
}
