//! Ignore rules from `--exclude`, `--exclude-path` and `.jshintignore`
//!
//! Rules are resolved to absolute form against the directory of the ignore
//! file they came from (the working directory for `--exclude` entries when
//! no ignore file exists). The last matching rule decides, so a later
//! `!pattern` re-includes what an earlier rule excluded.

use crate::cache::RunCache;
use crate::glob_match::{PathPattern, escape, is_glob, to_slash};
use crate::paths::{absolutize, normalize_path};
use crate::Result;
use crate::result::IoResultExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default ignore file looked up from the working directory upward
pub const IGNORE_FILE_NAME: &str = ".jshintignore";

/// How a single rule matches
#[derive(Debug, Clone)]
pub enum IgnoreMatcher {
    /// An absolute path; matches itself and everything beneath it
    Literal(PathBuf),
    /// A glob anchored at an absolute base directory
    Glob(PathPattern),
}

/// One compiled ignore rule
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pub matcher: IgnoreMatcher,
    pub negated: bool,
}

impl IgnoreRule {
    /// Compile `line` relative to `base_dir`
    pub fn new(line: &str, base_dir: &Path) -> Result<Self> {
        let (negated, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, line),
        };
        let body = body.trim_start_matches(['/', '\\']);

        let matcher = if is_glob(body) {
            let base = escape(&to_slash(&base_dir.to_string_lossy()));
            let base = base.trim_end_matches('/');
            IgnoreMatcher::Glob(PathPattern::new(&format!("{base}/{body}"))?)
        } else {
            IgnoreMatcher::Literal(normalize_path(&base_dir.join(body)))
        };

        Ok(Self { matcher, negated })
    }

    /// Whether this rule's pattern covers `absolute`
    pub fn matches(&self, absolute: &Path) -> bool {
        match &self.matcher {
            IgnoreMatcher::Literal(path) => absolute.starts_with(path),
            IgnoreMatcher::Glob(pattern) => pattern.matches_path(absolute),
        }
    }

    /// The resolved pattern text, with a leading `!` for negated rules
    pub fn display(&self) -> String {
        let body = match &self.matcher {
            IgnoreMatcher::Literal(path) => path.to_string_lossy().into_owned(),
            IgnoreMatcher::Glob(pattern) => pattern.as_str().to_string(),
        };
        if self.negated { format!("!{body}") } else { body }
    }
}

/// The active set of ignore rules for a run
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    rules: Vec<IgnoreRule>,
}

impl IgnoreSet {
    /// A set that ignores nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile pattern lines relative to `base_dir`
    ///
    /// Blank lines and `#` comments are skipped.
    pub fn from_lines<I, S>(lines: I, base_dir: &Path) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            rules.push(IgnoreRule::new(line, base_dir)?);
        }
        Ok(Self { rules })
    }

    /// Build the ignore set for a run
    ///
    /// The ignore file is `exclude_path` when given, otherwise
    /// `.jshintignore`; either is looked up from `cwd` upward. Entries from
    /// the comma separated `exclude` list come first, followed by the
    /// ignore file's lines.
    pub fn load(
        exclude: Option<&str>,
        exclude_path: Option<&Path>,
        cwd: &Path,
        cache: &mut RunCache,
    ) -> Result<Self> {
        let name = match exclude_path {
            Some(path) => path.to_string_lossy().into_owned(),
            None => IGNORE_FILE_NAME.to_string(),
        };

        let ignore_file = cache.find_upward(cwd, &name);
        if ignore_file.is_none() && exclude_path.is_some() {
            warn!("Ignore file not found: {}", name);
        }

        let base_dir = match &ignore_file {
            Some(file) => normalize_path(file.parent().unwrap_or(cwd)),
            None => normalize_path(cwd),
        };

        let mut lines: Vec<String> = exclude
            .map(|list| list.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        if let Some(file) = &ignore_file {
            let content = cache.read_source(file).with_path(file)?;
            debug!("Loading ignore patterns from {}", file.display());
            lines.extend(content.lines().map(str::to_string));
        }

        let set = Self::from_lines(lines, &base_dir)?;
        debug!("Loaded {} ignore rules", set.len());
        Ok(set)
    }

    /// Whether `path` (absolute or relative to `cwd`) is excluded
    pub fn is_ignored(&self, path: &Path, cwd: &Path) -> bool {
        if self.rules.is_empty() {
            return false;
        }

        let absolute = absolutize(path, cwd);
        let mut ignored = false;
        for rule in &self.rules {
            if rule.matches(&absolute) {
                ignored = !rule.negated;
            }
        }
        ignored
    }

    /// Resolved rule texts, in evaluation order
    pub fn patterns(&self) -> Vec<String> {
        self.rules.iter().map(IgnoreRule::display).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
