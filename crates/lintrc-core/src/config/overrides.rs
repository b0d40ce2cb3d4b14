//! Per-file override resolution

use super::document::{EXTENDS_KEY, EffectiveConfig, OVERRIDES_KEY, ResolvedConfig};
use super::merge::deep_merge;
use crate::glob_match::glob_match;
use crate::paths::{relative_slash_path, strip_dot_slash};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Whether an override pattern applies to a cwd-relative path
///
/// The pattern is anchored at the working directory; a leading `./` is
/// ignored. Patterns without a `/` also match the file's base name.
pub fn override_matches(pattern: &str, relative_path: &str) -> bool {
    let pattern = strip_dot_slash(pattern);
    let relative_path = strip_dot_slash(relative_path);

    if glob_match(pattern, relative_path) {
        return true;
    }

    if !pattern.contains('/') {
        let base_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        return glob_match(pattern, base_name);
    }

    false
}

/// Compute the effective config for `file`
///
/// Matching overrides are merged in declaration order, so later entries win
/// on conflicting keys. The result never contains `overrides`.
pub fn apply_overrides(config: &ResolvedConfig, file: &Path, cwd: &Path) -> EffectiveConfig {
    let mut options = config.options.clone();
    let overrides = options.shift_remove(OVERRIDES_KEY);

    if let Some(Value::Object(entries)) = overrides {
        let relative = relative_slash_path(file, cwd);

        for (pattern, partial) in entries {
            if !override_matches(&pattern, &relative) {
                continue;
            }

            match partial {
                Value::Object(mut partial) => {
                    debug!("Override '{}' applies to {}", pattern, relative);
                    partial.shift_remove(EXTENDS_KEY);
                    partial.shift_remove(OVERRIDES_KEY);
                    deep_merge(&mut options, partial);
                }
                other => warn!("Ignoring override '{}': expected an object, found {}", pattern, other),
            }
        }
    }

    EffectiveConfig {
        options,
        source: config.source.clone(),
        base_dir: config.base_dir.clone(),
    }
}
