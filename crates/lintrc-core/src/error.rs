//! Error types and handling for configuration resolution and file gathering

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lintrc operations
///
/// Every variant is fatal to a run. The messages are part of the observable
/// contract: they start with a fixed prefix and end with the offending path.
#[derive(Debug, Error)]
pub enum LintrcError {
    /// An explicit, discovered or inherited config file does not exist
    #[error("Can't find config file: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// A config file exists but is not a valid JSON object
    #[error("Can't parse config file: {}\nError: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// A path given on the command line does not exist
    #[error("Can't open {}", path.display())]
    PathNotFound { path: PathBuf },

    /// A reporter path could not be resolved to something runnable
    #[error("Can't load reporter file: {}", path.display())]
    ReporterLoad { path: PathBuf },

    /// A prerequisite script does not exist
    #[error("Can't find prerequisite file: {}", path.display())]
    PrereqNotFound { path: PathBuf },

    /// File system I/O errors
    #[error("IO error for path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An ignore or override pattern failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigNotFound,
    ConfigParse,
    PathNotFound,
    ReporterLoad,
    PrereqNotFound,
    Io,
    InvalidPattern,
}

impl LintrcError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LintrcError::ConfigNotFound { .. } => ErrorKind::ConfigNotFound,
            LintrcError::ConfigParse { .. } => ErrorKind::ConfigParse,
            LintrcError::PathNotFound { .. } => ErrorKind::PathNotFound,
            LintrcError::ReporterLoad { .. } => ErrorKind::ReporterLoad,
            LintrcError::PrereqNotFound { .. } => ErrorKind::PrereqNotFound,
            LintrcError::Io { .. } => ErrorKind::Io,
            LintrcError::InvalidPattern { .. } => ErrorKind::InvalidPattern,
        }
    }

    /// Create a config-not-found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create a config parse error
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a path-not-found error
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a reporter load error
    pub fn reporter_load(path: impl Into<PathBuf>) -> Self {
        Self::ReporterLoad { path: path.into() }
    }

    /// Create a prerequisite-not-found error
    pub fn prereq_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PrereqNotFound { path: path.into() }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
