//! Result type alias for lintrc operations

use crate::error::LintrcError;

/// Standard Result type for lintrc operations
pub type Result<T> = std::result::Result<T, LintrcError>;

/// Extension trait for attaching a path to raw I/O results
pub trait IoResultExt<T> {
    /// Wrap an `std::io::Error` into [`LintrcError::Io`] for `path`
    fn with_path(self, path: impl Into<std::path::PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<std::path::PathBuf>) -> Result<T> {
        self.map_err(|source| LintrcError::io_error(path, source))
    }
}
