//! Configuration file discovery and loading

use super::document::{
    EXTENDS_KEY, MANIFEST_CONFIG_KEY, MANIFEST_FILE_NAME, RC_FILE_NAME, ResolvedConfig,
    parse_document,
};
use super::merge::deep_merge;
use crate::cache::RunCache;
use crate::paths::absolutize;
use crate::{LintrcError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// An implicit configuration source found by [`ConfigLoader::auto_discover`]
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveredConfig {
    /// A `.jshintrc` in the target's ancestry or the home directory
    RcFile(PathBuf),

    /// The `jshintConfig` field of a `package.json`
    Manifest {
        path: PathBuf,
        config: Map<String, Value>,
    },
}

impl DiscoveredConfig {
    /// Path of the file the config came from
    pub fn path(&self) -> &Path {
        match self {
            DiscoveredConfig::RcFile(path) => path,
            DiscoveredConfig::Manifest { path, .. } => path,
        }
    }
}

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover config by traversing upward from `start`
    ///
    /// At each directory level, starting with the directory containing
    /// `start` (or `start` itself when it is a directory):
    /// 1. `.jshintrc`
    /// 2. `package.json` with an object-valued `jshintConfig` field
    ///
    /// A relative `start` is resolved against `cwd`. A `package.json` that
    /// fails to parse is skipped. When the filesystem root is reached without
    /// a match, `<home>/.jshintrc` is used if it is readable.
    pub fn auto_discover(
        start: &Path,
        cwd: &Path,
        home: Option<&Path>,
    ) -> Option<DiscoveredConfig> {
        let start = absolutize(start, cwd);
        let mut current = if start.is_dir() {
            start.as_path()
        } else {
            start.parent()?
        };

        loop {
            let rc_path = current.join(RC_FILE_NAME);
            if rc_path.is_file() {
                debug!("Found config: {}", rc_path.display());
                return Some(DiscoveredConfig::RcFile(rc_path));
            }

            let manifest_path = current.join(MANIFEST_FILE_NAME);
            if manifest_path.is_file()
                && let Some(config) = Self::read_manifest_config(&manifest_path)
            {
                debug!("Found config in manifest: {}", manifest_path.display());
                return Some(DiscoveredConfig::Manifest {
                    path: manifest_path,
                    config,
                });
            }

            match current.parent() {
                Some(parent) => current = parent,
                // Reached filesystem root
                None => break,
            }
        }

        let home_rc = home?.join(RC_FILE_NAME);
        if is_readable(&home_rc) {
            debug!("Using home config: {}", home_rc.display());
            return Some(DiscoveredConfig::RcFile(home_rc));
        }

        None
    }

    /// Resolve a config file and its `extends` chain
    ///
    /// Fails with `ConfigNotFound` for a missing file and `ConfigParse` for
    /// invalid content, naming whichever file in the chain is at fault.
    pub fn resolve(path: &Path, cache: &mut RunCache) -> Result<Arc<ResolvedConfig>> {
        let mut chain = Vec::new();
        Self::resolve_file(path, cache, &mut chain)
    }

    /// Resolve the implicit config that applies to `target`
    ///
    /// Returns the built-in defaults when nothing is discovered.
    pub fn load_implicit(
        target: &Path,
        cwd: &Path,
        home: Option<&Path>,
        cache: &mut RunCache,
    ) -> Result<Arc<ResolvedConfig>> {
        match Self::auto_discover(target, cwd, home) {
            Some(DiscoveredConfig::RcFile(path)) => Self::resolve(&path, cache),
            Some(DiscoveredConfig::Manifest { path, config }) => {
                let base_dir = parent_dir(&path);
                let mut chain = vec![path.clone()];
                let options = Self::flatten(config, &path, &base_dir, cache, &mut chain)?;
                Ok(Arc::new(ResolvedConfig {
                    options,
                    source: Some(path),
                    base_dir,
                }))
            }
            None => {
                debug!("No config found for {}, using defaults", target.display());
                let dir = absolutize(target, cwd);
                let dir = if dir.is_dir() { dir } else { parent_dir(&dir) };
                Ok(Arc::new(ResolvedConfig::defaults(dir)))
            }
        }
    }

    fn resolve_file(
        path: &Path,
        cache: &mut RunCache,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Arc<ResolvedConfig>> {
        if !path.exists() {
            return Err(LintrcError::config_not_found(path));
        }

        let key = path
            .canonicalize()
            .map_err(|_| LintrcError::config_not_found(path))?;

        if chain.contains(&key) {
            return Err(LintrcError::config_parse(
                path,
                "circular \"extends\" chain",
            ));
        }

        if let Some(resolved) = cache.config(&key) {
            debug!("Config cache hit: {}", key.display());
            return Ok(resolved);
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| LintrcError::config_parse(path, e.to_string()))?;
        let document = parse_document(path, &text)?;
        let base_dir = parent_dir(&key);

        chain.push(key.clone());
        let options = Self::flatten(document, path, &base_dir, cache, chain);
        chain.pop();

        let resolved = Arc::new(ResolvedConfig {
            options: options?,
            source: Some(path.to_path_buf()),
            base_dir,
        });
        cache.insert_config(key, Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Consume `extends`, merging the child on top of its resolved parent
    fn flatten(
        mut document: Map<String, Value>,
        origin: &Path,
        base_dir: &Path,
        cache: &mut RunCache,
        chain: &mut Vec<PathBuf>,
    ) -> Result<Map<String, Value>> {
        let parent_ref = match document.shift_remove(EXTENDS_KEY) {
            None => return Ok(document),
            Some(Value::String(parent_ref)) => parent_ref,
            Some(other) => {
                return Err(LintrcError::config_parse(
                    origin,
                    format!("\"extends\" must be a string, found {other}"),
                ));
            }
        };

        let parent_path = base_dir.join(&parent_ref);
        debug!("{} extends {}", origin.display(), parent_path.display());
        let parent = Self::resolve_file(&parent_path, cache, chain)?;

        let mut merged = parent.options.clone();
        deep_merge(&mut merged, document);
        Ok(merged)
    }

    /// Read the `jshintConfig` field of a manifest, if usable
    fn read_manifest_config(path: &Path) -> Option<Map<String, Value>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!("Skipping unreadable manifest {}: {}", path.display(), e);
                return None;
            }
        };

        let manifest: Value = match serde_json::from_str(&text) {
            Ok(manifest) => manifest,
            Err(e) => {
                debug!("Skipping malformed manifest {}: {}", path.display(), e);
                return None;
            }
        };

        match manifest.get(MANIFEST_CONFIG_KEY) {
            Some(Value::Object(config)) => Some(config.clone()),
            _ => None,
        }
    }
}

/// Determine the user's home directory from the environment
///
/// Checks `USERPROFILE`, `HOME`, `HOMEPATH` and `HOMEDRIVE` + `HOMEPATH`, in
/// that order, returning the first that names an existing directory.
pub fn home_dir() -> Option<PathBuf> {
    let var = |name: &str| std::env::var_os(name).filter(|value| !value.is_empty());

    let mut candidates: Vec<PathBuf> = ["USERPROFILE", "HOME", "HOMEPATH"]
        .into_iter()
        .filter_map(|name| var(name).map(PathBuf::from))
        .collect();

    if let (Some(drive), Some(rest)) = (var("HOMEDRIVE"), var("HOMEPATH")) {
        let mut joined = drive;
        joined.push(rest);
        candidates.push(PathBuf::from(joined));
    }

    candidates.into_iter().find(|candidate| candidate.is_dir())
}

fn is_readable(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
