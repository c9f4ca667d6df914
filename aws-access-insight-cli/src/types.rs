//! CLI-specific type definitions.
//!
//! This module contains types that are specific to the CLI binary and should
//! not be part of the core library.

/// Exit codes for the CLI application.
///
/// These codes follow the documented convention where:
/// - 0 indicates successful completion (and, for access checks, "allowed")
/// - 1 indicates a clean "not allowed" answer
/// - 2 indicates a failure: bad input, bad configuration, or a provider error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Operation completed successfully
    Success,

    /// Operation completed; the access in question is not allowed
    Denied,

    /// Error, validation failure, or configuration problem
    Error,
}

impl ExitCode {
    /// Convert to the integer exit code for process::exit()
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Denied => 1,
            Self::Error => 2,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(exit_code: ExitCode) -> Self {
        exit_code.code()
    }
}
