//! Prerequisite scripts
//!
//! A prerequisite is a script that runs before the linted file in the
//! target environment. Its top-level declarations are visible to the file,
//! so they are added to the predefined globals for the analysis.

use crate::cache::RunCache;
use crate::paths::absolutize;
use crate::result::IoResultExt;
use crate::scanner::{tokenize, top_level_declarations};
use crate::{LintrcError, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Split a comma separated `--prereq` value, dropping empty entries
pub fn parse_prereq_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Combine config and command-line prerequisites into one ordered list
///
/// Config entries are resolved against `config_base_dir` and come first;
/// command-line entries are resolved against `cwd`. A path that appears
/// twice (after normalization) is kept at its first position.
pub fn merge_prereq_paths(
    config_prereqs: &[PathBuf],
    config_base_dir: &Path,
    cli_prereqs: &[String],
    cwd: &Path,
) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let config_paths = config_prereqs
        .iter()
        .map(|entry| absolutize(entry, &absolutize(config_base_dir, cwd)));
    let cli_paths = cli_prereqs
        .iter()
        .map(|entry| absolutize(Path::new(entry), cwd));

    config_paths
        .chain(cli_paths)
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

/// Loads global names from prerequisite scripts through the run cache
pub struct PrereqLoader<'a> {
    cache: &'a mut RunCache,
}

impl<'a> PrereqLoader<'a> {
    pub fn new(cache: &'a mut RunCache) -> Self {
        Self { cache }
    }

    /// Union of the top-level names declared by every script in `paths`
    pub fn load_globals(&mut self, paths: &[PathBuf]) -> Result<BTreeSet<String>> {
        let mut globals = BTreeSet::new();

        for path in paths {
            if !path.is_file() {
                return Err(LintrcError::prereq_not_found(path));
            }

            let source = self.cache.read_source(path).with_path(path)?;
            let declared = top_level_declarations(&tokenize(&source));
            debug!(
                "Prerequisite {} declares {} globals",
                path.display(),
                declared.len()
            );
            globals.extend(declared);
        }

        Ok(globals)
    }
}
