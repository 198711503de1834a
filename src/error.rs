//! Error types for pattern compilation and directory scanning.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of a [`ScanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The scanner was misconfigured (missing or invalid base directory).
    Configuration,
    /// Listing or stat-ing a directory failed during the primary pass.
    Io,
    /// A pattern could not be compiled.
    Pattern,
}

impl ErrorKind {
    /// Process exit code used by the CLI for this kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Pattern => 3,
            ErrorKind::Io => 4,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Io => "io",
            ErrorKind::Pattern => "pattern",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no basedir set")]
    MissingBasedir,

    #[error("basedir {} does not exist", .0.display())]
    BasedirNotFound(PathBuf),

    #[error("basedir {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid regex pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::MissingBasedir
            | ScanError::BasedirNotFound(_)
            | ScanError::NotADirectory(_) => ErrorKind::Configuration,
            ScanError::Io { .. } => ErrorKind::Io,
            ScanError::Regex { .. } | ScanError::Glob { .. } => ErrorKind::Pattern,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
