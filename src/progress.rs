//! Throttled single-line progress reporting on stderr.
//!
//! The reporter owns its own throttle clock and last-reported counters;
//! callers hand it a [`Update`] as often as they like (per file, per read
//! chunk) and it renders at most every 100 ms. Updates between renders are
//! overwritten by the latest one, never queued or replayed.
//!
//! Rendering uses carriage-return repositioning so successive status lines
//! overwrite each other in place, and queries the terminal width on every
//! render (the terminal may be resized mid-scan). Messages wider than the
//! terminal are shortened with a middle ellipsis, keeping the counters at
//! the front and the tail of the current path visible. When stderr is not
//! an interactive terminal the reporter is a no-op.

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

/// Minimum interval between renders.
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Running totals carried between updates.
///
/// Fields an [`Update`] leaves unset keep their previous value, so callers
/// only report what they know (the hasher knows bytes and path, the scanner
/// knows file counts).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    /// Files appended to the manifest so far.
    pub files: u64,
    /// Files freshly hashed (cache misses).
    pub hashed: u64,
    /// Files whose size was successfully read.
    pub sized: u64,
    /// Cumulative bytes read from the file currently being hashed.
    pub bytes_read: u64,
    /// Path currently being processed.
    pub path: String,
}

/// Partial counter update; unset fields carry over from the last report.
#[derive(Debug, Clone, Default)]
pub struct Update {
    pub files: Option<u64>,
    pub hashed: Option<u64>,
    pub sized: Option<u64>,
    pub bytes_read: Option<u64>,
    pub path: Option<String>,
}

impl Update {
    /// Update emitted per read chunk while hashing one file.
    #[must_use]
    pub fn hashing(path: &Path, bytes_read: u64) -> Self {
        Self {
            bytes_read: Some(bytes_read),
            path: Some(path.display().to_string()),
            ..Self::default()
        }
    }

    /// Update emitted after each file is appended to the manifest.
    #[must_use]
    pub fn file_scanned(files: u64, hashed: u64, sized: u64, path: &Path) -> Self {
        Self {
            files: Some(files),
            hashed: Some(hashed),
            sized: Some(sized),
            bytes_read: Some(0),
            path: Some(path.display().to_string()),
        }
    }
}

/// Rate-limited status line writer.
pub struct Progress {
    start: Instant,
    last_render: Option<Instant>,
    counters: Counters,
    enabled: bool,
}

impl Progress {
    /// Create a reporter that renders only when stderr is a terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_enabled(io::stderr().is_terminal())
    }

    /// Create a reporter that never renders (quiet mode, tests).
    #[must_use]
    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    fn with_enabled(enabled: bool) -> Self {
        Self {
            start: Instant::now(),
            last_render: None,
            counters: Counters::default(),
            enabled,
        }
    }

    /// Merge an update into the retained counters and render if the
    /// throttle interval has elapsed.
    pub fn report(&mut self, update: Update) {
        if let Some(files) = update.files {
            self.counters.files = files;
        }
        if let Some(hashed) = update.hashed {
            self.counters.hashed = hashed;
        }
        if let Some(sized) = update.sized {
            self.counters.sized = sized;
        }
        if let Some(bytes) = update.bytes_read {
            self.counters.bytes_read = bytes;
        }
        if let Some(path) = update.path {
            self.counters.path = path;
        }

        if let Some(last) = self.last_render {
            if last.elapsed() < RENDER_INTERVAL {
                return;
            }
        }
        self.render();
    }

    /// Blank the status line so ordinary output starts on a clean line.
    pub fn clear(&mut self) {
        if self.enabled {
            status_line("");
        }
    }

    /// Latest merged counters.
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    fn render(&mut self) {
        if !self.enabled {
            return;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        let c = &self.counters;
        let msg = if c.bytes_read > 0 {
            format!(
                "T+{elapsed:.1} Hashed={} Sized={} Total={} [{}] {}",
                c.hashed,
                c.sized,
                c.files,
                ByteSize(c.bytes_read),
                c.path
            )
        } else {
            format!(
                "T+{elapsed:.1} Hashed={} Sized={} Total={} {}",
                c.hashed, c.sized, c.files, c.path
            )
        };
        status_line(&msg);
        self.last_render = Some(Instant::now());
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a non-advancing status line to stderr.
///
/// Writes the padded line once to erase the previous render, then rewrites
/// the unpadded message so the cursor sits at its natural end. The width
/// query happens here, per call, so resizes take effect immediately; if the
/// width cannot be determined there is nothing safe to render.
fn status_line(msg: &str) {
    let Ok((cols, _)) = crossterm::terminal::size() else {
        return;
    };
    let max_col = (cols as usize).saturating_sub(1);
    let msg = truncate_middle(msg, max_col);
    let pad = " ".repeat(max_col.saturating_sub(msg.chars().count()));
    let mut err = io::stderr();
    let _ = write!(err, "\r{msg}{pad}\r{msg}");
    let _ = err.flush();
}

/// Shorten a message to `max_col` display columns with a middle ellipsis,
/// preserving the prefix (counters) and suffix (current path tail).
fn truncate_middle(msg: &str, max_col: usize) -> String {
    let len = msg.chars().count();
    if len <= max_col {
        return msg.to_string();
    }
    let half = (max_col / 2).saturating_sub(3);
    let head: String = msg.chars().take(half).collect();
    let tail: String = msg.chars().skip(len - half).collect();
    format!("{head}...{tail}")
}
