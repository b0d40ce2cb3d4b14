//! Run-scoped filesystem cache
//!
//! A [`RunCache`] lives for exactly one orchestrator run. It memoizes upward
//! file lookups, resolved config documents, and prerequisite sources so a
//! run with many targets in the same tree reads each file once. Nothing here
//! outlives the run that created it.

use crate::config::ResolvedConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// Memoized state for a single run
#[derive(Debug, Default)]
pub struct RunCache {
    /// (directory, file name) -> nearest match walking upward
    lookups: HashMap<(PathBuf, String), Option<PathBuf>>,

    /// canonical config path -> resolved document
    configs: HashMap<PathBuf, Arc<ResolvedConfig>>,

    /// directory -> implicit config resolved for targets in it
    implicit: HashMap<PathBuf, Arc<ResolvedConfig>>,

    /// prerequisite path -> source text
    sources: HashMap<PathBuf, Arc<str>>,

    hits: usize,
    misses: usize,
}

/// Counters describing cache effectiveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl RunCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Find `name` in `dir` or the nearest ancestor of `dir`
    pub fn find_upward(&mut self, dir: &Path, name: &str) -> Option<PathBuf> {
        let key = (dir.to_path_buf(), name.to_string());
        if let Some(found) = self.lookups.get(&key) {
            self.hits += 1;
            return found.clone();
        }
        self.misses += 1;

        let candidate = dir.join(name);
        let found = if candidate.exists() {
            Some(candidate)
        } else {
            match dir.parent() {
                Some(parent) if parent != dir => self.find_upward(parent, name),
                _ => None,
            }
        };

        trace!("find_upward({}, {}) -> {:?}", dir.display(), name, found);
        self.lookups.insert(key, found.clone());
        found
    }

    /// Get a previously resolved config
    pub fn config(&mut self, path: &Path) -> Option<Arc<ResolvedConfig>> {
        let found = self.configs.get(path).cloned();
        self.count(found.is_some());
        found
    }

    /// Store a resolved config
    pub fn insert_config(&mut self, path: PathBuf, config: Arc<ResolvedConfig>) {
        self.configs.insert(path, config);
    }

    /// Get the implicit config previously resolved for a directory
    pub fn implicit_config(&mut self, dir: &Path) -> Option<Arc<ResolvedConfig>> {
        let found = self.implicit.get(dir).cloned();
        self.count(found.is_some());
        found
    }

    /// Store the implicit config for a directory
    pub fn insert_implicit_config(&mut self, dir: PathBuf, config: Arc<ResolvedConfig>) {
        self.implicit.insert(dir, config);
    }

    /// Read a file through the cache
    pub fn read_source(&mut self, path: &Path) -> std::io::Result<Arc<str>> {
        if let Some(source) = self.sources.get(path) {
            self.hits += 1;
            return Ok(Arc::clone(source));
        }
        self.misses += 1;
        let text: Arc<str> = std::fs::read_to_string(path)?.into();
        self.sources.insert(path.to_path_buf(), Arc::clone(&text));
        Ok(text)
    }

    /// Current hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn count(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}
