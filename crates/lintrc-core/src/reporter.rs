//! Reporter seam and reporter selection

use crate::engine::{AnalysisData, Finding};
use crate::paths::absolutize;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// One finding attributed to the file it was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// The file as it was gathered (relative paths stay relative)
    pub file: String,
    pub error: Finding,
}

/// Per-file analysis data, in gathered order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    pub file: String,
    #[serde(flatten)]
    pub data: AnalysisData,
}

/// Receives the results of a run exactly once
pub trait Reporter {
    fn report(&mut self, results: &[ReportEntry], data: &[FileData]) -> Result<()>;
}

/// Reporters that ship with lintrc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinReporter {
    /// `file: line L, col C, message` lines and a count
    Default,
    /// `file:line:col: message` lines
    Unix,
    /// JSLint XML
    Jslint,
    /// CheckStyle XML
    Checkstyle,
    /// Default output followed by implied globals and unused names
    NonError,
}

impl BuiltinReporter {
    pub const ALL: [BuiltinReporter; 5] = [
        BuiltinReporter::Default,
        BuiltinReporter::Unix,
        BuiltinReporter::Jslint,
        BuiltinReporter::Checkstyle,
        BuiltinReporter::NonError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinReporter::Default => "default",
            BuiltinReporter::Unix => "unix",
            BuiltinReporter::Jslint => "jslint",
            BuiltinReporter::Checkstyle => "checkstyle",
            BuiltinReporter::NonError => "non-error",
        }
    }
}

impl fmt::Display for BuiltinReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinReporter {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "default" => Ok(BuiltinReporter::Default),
            "unix" => Ok(BuiltinReporter::Unix),
            "jslint" | "jslint_xml" => Ok(BuiltinReporter::Jslint),
            "checkstyle" => Ok(BuiltinReporter::Checkstyle),
            "non-error" | "non_error" => Ok(BuiltinReporter::NonError),
            _ => Err(()),
        }
    }
}

/// The reporter a run should use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterChoice {
    Builtin(BuiltinReporter),
    /// An executable that reads JSON results on stdin
    External(PathBuf),
    /// A reporter path that does not name a file
    LoadError(PathBuf),
}

impl ReporterChoice {
    /// Pick a reporter from `--reporter` and `--show-non-errors`
    ///
    /// Built-in names win over paths. Anything else is a path resolved
    /// against `cwd` and must name an existing file.
    pub fn resolve(name: Option<&str>, show_non_errors: bool, cwd: &Path) -> Self {
        let Some(name) = name else {
            return if show_non_errors {
                ReporterChoice::Builtin(BuiltinReporter::NonError)
            } else {
                ReporterChoice::Builtin(BuiltinReporter::Default)
            };
        };

        if let Ok(builtin) = name.parse::<BuiltinReporter>() {
            return ReporterChoice::Builtin(builtin);
        }

        let path = absolutize(Path::new(name), cwd);
        if path.is_file() {
            debug!("Using external reporter {}", path.display());
            ReporterChoice::External(path)
        } else {
            ReporterChoice::LoadError(PathBuf::from(name))
        }
    }
}

/// Serialize results in the JSON shape external reporters read
pub fn results_json(results: &[ReportEntry], data: &[FileData]) -> serde_json::Value {
    serde_json::json!({
        "results": results,
        "data": data,
    })
}
