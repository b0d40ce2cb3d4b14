//! Lexical path helpers for deterministic matching
//!
//! Nothing in here touches the filesystem; symlinks are not resolved.

use crate::glob_match::to_slash;
use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into their parent
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make `path` absolute against `cwd` and normalize it
#[must_use]
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&cwd.join(path))
    }
}

/// Express `path` relative to `cwd` as a `/`-separated string
///
/// Paths outside `cwd` keep their absolute form.
#[must_use]
pub fn relative_slash_path(path: &Path, cwd: &Path) -> String {
    let absolute = absolutize(path, cwd);
    let base = normalize_path(cwd);
    let shown = absolute.strip_prefix(&base).unwrap_or(&absolute);
    to_slash(&shown.to_string_lossy())
}

/// Strip one leading `./` from a `/`-separated pattern or path
#[must_use]
pub fn strip_dot_slash(text: &str) -> &str {
    text.strip_prefix("./").unwrap_or(text)
}
