//! Exit codes for the dupman CLI.

/// Exit codes for the dupman application.
///
/// - 0: Success (operation completed normally)
/// - 1: General error (manifest parse failure, unwritable output, ...)
/// - 3: Partial success (scan completed but some files degraded to a
///   sentinel hash or absent size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: the requested operations completed normally.
    Success = 0,
    /// General error: an unexpected or fatal error occurred.
    GeneralError = 1,
    /// Partial success: the scan finished but recorded per-file failures.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DM000",
            Self::GeneralError => "DM001",
            Self::PartialSuccess => "DM003",
        }
    }
}
