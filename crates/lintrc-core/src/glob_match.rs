//! Pure glob matching shared by ignore rules and config overrides
//!
//! Matching never touches the filesystem. Paths and patterns are compared as
//! `/`-separated strings:
//!
//! - `*` and `?` never cross a `/`
//! - `**` as a whole segment matches any number of segments
//! - segments starting with `.` are matched by wildcards like any other
//! - comparison is case-insensitive

use crate::{LintrcError, Result};
use glob::{MatchOptions, Pattern};
use std::path::Path;

/// Options used for every match performed by lintrc
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled glob pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    pattern: Pattern,
}

impl PathPattern {
    /// Compile a pattern, normalizing `\` separators to `/`
    pub fn new(source: &str) -> Result<Self> {
        let normalized = to_slash(source);
        let pattern = Pattern::new(&normalized)
            .map_err(|e| LintrcError::invalid_pattern(source, e.msg))?;
        Ok(Self {
            source: normalized,
            pattern,
        })
    }

    /// The normalized pattern text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a `/`-separated path string
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches_with(path, MATCH_OPTIONS)
    }

    /// Match a filesystem path
    pub fn matches_path(&self, path: &Path) -> bool {
        self.matches(&to_slash(&path.to_string_lossy()))
    }
}

/// Decide whether `path` matches `pattern`
///
/// An invalid pattern matches nothing.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    match PathPattern::new(pattern) {
        Ok(compiled) => compiled.matches(&to_slash(path)),
        Err(_) => false,
    }
}

/// Whether `text` contains glob metacharacters
pub fn is_glob(text: &str) -> bool {
    text.contains(['*', '?', '['])
}

/// Escape every glob metacharacter in `text`
pub fn escape(text: &str) -> String {
    Pattern::escape(text)
}

/// Replace platform separators with `/`
pub fn to_slash(text: &str) -> String {
    if std::path::MAIN_SEPARATOR == '\\' {
        text.replace('\\', "/")
    } else {
        text.to_string()
    }
}
