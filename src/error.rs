// src/error.rs

//! Error types for recipe resolution, cooking and tasting

use std::fmt;
use std::io;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Phase of the install sequence an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Resolve,
    Fetch,
    Verify,
    Build,
    Test,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Resolve => "resolve",
            Phase::Fetch => "fetch",
            Phase::Verify => "verify",
            Phase::Build => "build",
            Phase::Test => "test",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three post-install smoke checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Version,
    Help,
    Render,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Version => "version",
            CheckKind::Help => "help",
            CheckKind::Render => "render",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// Requested source variant is not declared, or does not exist upstream
    #[error("Unresolvable source: {0}")]
    UnresolvableSource(String),

    /// Declared checksum is empty, malformed or still a placeholder
    #[error("Invalid checksum {value:?}: {reason}")]
    InvalidChecksum { value: String, reason: String },

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// A declared dependency has no executable on the search path
    #[error("Missing dependency {name}: none of [{commands}] found on the search path")]
    MissingDependency { name: String, commands: String },

    #[error("Build failed: {0}")]
    BuildFailure(String),

    #[error("{check} check failed: expected output containing {expected:?}, got {actual:?}")]
    AssertionFailure {
        check: CheckKind,
        expected: String,
        actual: String,
    },

    #[error("{check} check failed: {reason}")]
    SubprocessFailure { check: CheckKind, reason: String },

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    /// Filesystem failure attributed to the install phase it interrupted
    #[error("I/O error during {phase}: {reason}")]
    PhaseIo { phase: Phase, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// The install phase this error aborted, if it maps to one
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Error::UnresolvableSource(_) | Error::InvalidChecksum { .. } | Error::ParseError(_) => {
                Some(Phase::Resolve)
            }
            Error::DownloadError(_) => Some(Phase::Fetch),
            Error::ChecksumMismatch { .. } => Some(Phase::Verify),
            Error::MissingDependency { .. } | Error::BuildFailure(_) => Some(Phase::Build),
            Error::AssertionFailure { .. } | Error::SubprocessFailure { .. } => Some(Phase::Test),
            Error::PhaseIo { phase, .. } => Some(*phase),
            Error::IoError(_) | Error::Io(_) => None,
        }
    }

    /// Attribute a bare I/O error to `phase`; other errors pass through
    pub fn during(self, phase: Phase) -> Self {
        match self {
            Error::Io(e) => Error::PhaseIo {
                phase,
                reason: e.to_string(),
            },
            Error::IoError(reason) => Error::PhaseIo { phase, reason },
            other => other,
        }
    }
}
