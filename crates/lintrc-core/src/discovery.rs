//! Target file discovery
//!
//! Expands the paths given on the command line into the ordered list of
//! files to lint. Directories are walked recursively in file-name order and
//! only files with a lintable extension are kept; a file named directly is
//! always kept. Ignore rules are checked before existence, so an ignored
//! path that does not exist is silently dropped.

use crate::ignore::IgnoreSet;
use crate::paths::{absolutize, normalize_path};
use crate::{LintrcError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extension linted by default
pub const DEFAULT_EXTENSION: &str = "js";

/// Trait for expanding target arguments into files
pub trait FileDiscovery {
    /// Expand `args` into the files to lint, in visit order
    fn gather(&self, args: &[PathBuf]) -> Result<Vec<PathBuf>>;

    /// Whether a file found while walking a directory should be linted
    fn should_include(&self, path: &Path) -> bool;
}

/// Parse a comma separated extension list such as `"json, .ts"`
///
/// Whitespace and leading dots are dropped, as are empty entries.
pub fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').trim())
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Filesystem-backed discovery used by the runner
#[derive(Debug, Clone)]
pub struct DefaultFileDiscovery<'a> {
    ignores: &'a IgnoreSet,
    extensions: Vec<String>,
    cwd: PathBuf,
}

impl<'a> DefaultFileDiscovery<'a> {
    /// Create a discovery instance
    ///
    /// `extra_extensions` is added to the default `js` extension.
    pub fn new(ignores: &'a IgnoreSet, extra_extensions: &[String], cwd: impl Into<PathBuf>) -> Self {
        let mut extensions = vec![DEFAULT_EXTENSION.to_string()];
        for ext in extra_extensions {
            if !extensions.contains(ext) {
                extensions.push(ext.clone());
            }
        }

        Self {
            ignores,
            extensions,
            cwd: cwd.into(),
        }
    }

    /// The extensions this instance considers lintable
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn collect(
        &self,
        arg: &Path,
        files: &mut Vec<PathBuf>,
        seen: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        if self.ignores.is_ignored(arg, &self.cwd) {
            debug!("Ignoring {}", arg.display());
            return Ok(());
        }

        let root = self.cwd.join(arg);
        let metadata =
            std::fs::metadata(&root).map_err(|_| LintrcError::path_not_found(arg))?;

        if !metadata.is_dir() {
            self.push(arg.to_path_buf(), files, seen);
            return Ok(());
        }

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let shown = display_path(arg, &root, entry.path());
                !self.ignores.is_ignored(&shown, &self.cwd)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", arg.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let shown = display_path(arg, &root, entry.path());
            if self.should_include(&shown) {
                self.push(shown, files, seen);
            }
        }

        Ok(())
    }

    fn push(&self, path: PathBuf, files: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>) {
        if seen.insert(absolutize(&path, &self.cwd)) {
            files.push(path);
        }
    }
}

impl FileDiscovery for DefaultFileDiscovery<'_> {
    fn gather(&self, args: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut seen = HashSet::new();

        for arg in args {
            self.collect(arg, &mut files, &mut seen)?;
        }

        info!("Gathered {} files", files.len());
        debug!("Files: {:?}", files);
        Ok(files)
    }

    fn should_include(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();

        self.extensions
            .iter()
            .any(|ext| name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}")))
    }
}

/// Convenience wrapper around [`DefaultFileDiscovery::gather`]
pub fn gather(
    args: &[PathBuf],
    ignores: &IgnoreSet,
    extra_extensions: &[String],
    cwd: &Path,
) -> Result<Vec<PathBuf>> {
    DefaultFileDiscovery::new(ignores, extra_extensions, cwd).gather(args)
}

/// Re-express a walked path in the form the user gave for its root
///
/// The joined path is normalized lexically, so walking `.` reports `a.js`
/// rather than `./a.js`.
fn display_path(arg: &Path, root: &Path, walked: &Path) -> PathBuf {
    match walked.strip_prefix(root) {
        Ok(relative) => normalize_path(&arg.join(relative)),
        Err(_) => walked.to_path_buf(),
    }
}
