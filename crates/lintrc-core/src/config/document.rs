//! Config documents and the resolved forms handed to the analyzer

use crate::{LintrcError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Project-local implicit config file name
pub const RC_FILE_NAME: &str = ".jshintrc";

/// Package manifest that may embed a config
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Manifest field holding the embedded config
pub const MANIFEST_CONFIG_KEY: &str = "jshintConfig";

/// Reserved key naming the parent document
pub const EXTENDS_KEY: &str = "extends";

/// Reserved key holding glob-keyed partial documents
pub const OVERRIDES_KEY: &str = "overrides";

/// Predefined global names (name -> writable)
pub const GLOBALS_KEY: &str = "globals";

/// Legacy list of predefined globals
pub const PREDEF_KEY: &str = "predef";

/// Scripts whose top-level declarations become globals
pub const PREREQ_KEY: &str = "prereq";

/// A config document with `extends` flattened away
///
/// `overrides` is kept, in declaration order, until a concrete file is known.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedConfig {
    /// Merged options, including `overrides`
    pub options: Map<String, Value>,

    /// File the document was loaded from, if any
    pub source: Option<PathBuf>,

    /// Directory that relative `prereq` entries are resolved against
    pub base_dir: PathBuf,
}

impl ResolvedConfig {
    /// The built-in defaults: an empty document rooted at `base_dir`
    pub fn defaults(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            options: Map::new(),
            source: None,
            base_dir: base_dir.into(),
        }
    }

    /// Look up a top-level option
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// The override table, if the document declares one
    pub fn overrides(&self) -> Option<&Map<String, Value>> {
        self.options.get(OVERRIDES_KEY).and_then(Value::as_object)
    }
}

/// The options that apply to one specific file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectiveConfig {
    /// Merged options with `overrides` removed
    pub options: Map<String, Value>,

    pub source: Option<PathBuf>,

    pub base_dir: PathBuf,
}

impl EffectiveConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Whether a boolean option is set to `true`
    pub fn is_enabled(&self, key: &str) -> bool {
        matches!(self.options.get(key), Some(Value::Bool(true)))
    }

    /// Predefined globals from `globals` and `predef`
    ///
    /// The value tells whether the global may be assigned to. A `predef`
    /// entry starting with `-` removes a name defined earlier.
    pub fn globals(&self) -> BTreeMap<String, bool> {
        let mut globals = BTreeMap::new();

        for key in [PREDEF_KEY, GLOBALS_KEY] {
            match self.options.get(key) {
                Some(Value::Object(entries)) => {
                    for (name, writable) in entries {
                        globals.insert(name.clone(), writable.as_bool().unwrap_or(false));
                    }
                }
                Some(Value::Array(names)) => {
                    for name in names.iter().filter_map(Value::as_str) {
                        if let Some(removed) = name.strip_prefix('-') {
                            globals.remove(removed);
                        } else {
                            globals.insert(name.to_string(), false);
                        }
                    }
                }
                _ => {}
            }
        }

        globals
    }

    /// `prereq` entries resolved against the config's directory
    pub fn prereq_entries(&self) -> Vec<PathBuf> {
        match self.options.get(PREREQ_KEY) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(Value::as_str)
                .map(|entry| self.base_dir.join(entry))
                .collect(),
            Some(Value::String(entry)) => vec![self.base_dir.join(entry)],
            _ => Vec::new(),
        }
    }
}

/// Parse config text into an object
///
/// Comments and trailing commas are accepted. A leading byte order mark is
/// ignored. Anything but a top-level object is a parse error for `path`.
pub fn parse_document(path: &Path, text: &str) -> Result<Map<String, Value>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let value: Value =
        json5::from_str(text).map_err(|e| LintrcError::config_parse(path, e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(LintrcError::config_parse(
            path,
            format!("expected an object, found {}", value_kind(&other)),
        )),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
