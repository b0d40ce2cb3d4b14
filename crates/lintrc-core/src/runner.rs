//! Run orchestration
//!
//! A run moves through a fixed sequence of states:
//!
//! ```text
//! Init -> ConfigResolved -> FilesGathered -> PerFileAnalysis -> Reported -> Terminal
//! ```
//!
//! Any error before `Reported` ends the run in `Terminal(Fatal)` without
//! invoking the reporter. Per-file problems found by the analyzer never stop
//! the run; they only decide between `Success` and `Findings`.

use crate::cache::{CacheStats, RunCache};
use crate::config::{ConfigLoader, ResolvedConfig, apply_overrides};
use crate::discovery::{DefaultFileDiscovery, FileDiscovery, parse_extensions};
use crate::engine::{Analyzer, Finding, LintOutcome, UNREADABLE_FILE};
use crate::ignore::IgnoreSet;
use crate::paths::absolutize;
use crate::prereq::{PrereqLoader, merge_prereq_paths, parse_prereq_list};
use crate::reporter::{FileData, ReportEntry, Reporter};
use crate::{LintrcError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Display name for source read from standard input
pub const STDIN_FILENAME: &str = "stdin";

/// Everything a run needs to know, gathered from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Files and directories to lint
    pub paths: Vec<PathBuf>,
    /// Explicit config file; disables implicit discovery
    pub config: Option<PathBuf>,
    /// Comma separated ignore patterns
    pub exclude: Option<String>,
    /// Ignore file to use instead of `.jshintignore`
    pub exclude_path: Option<PathBuf>,
    /// Comma separated extensions linted in addition to `js`
    pub extra_ext: Option<String>,
    /// Comma separated prerequisite scripts
    pub prereq: Option<String>,
    /// Source text to lint instead of `paths`
    pub stdin: Option<String>,
    /// Path used for `stdin` in override matching and reports
    pub filename: Option<PathBuf>,
    /// Directory relative paths are resolved against
    pub cwd: PathBuf,
    /// Home directory consulted for a fallback `.jshintrc`
    pub home: Option<PathBuf>,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every file passed
    Success,
    /// At least one finding was reported
    Findings,
    /// The run could not complete
    Fatal,
}

impl ExitStatus {
    /// Process exit code
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Fatal => 1,
            ExitStatus::Findings => 2,
        }
    }
}

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    ConfigResolved,
    FilesGathered,
    PerFileAnalysis,
    Reported,
    Terminal(ExitStatus),
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Terminal(status) => write!(f, "Terminal({status:?})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Summary of a finished run
#[derive(Debug)]
pub struct RunOutcome {
    pub status: ExitStatus,
    /// Number of files analyzed
    pub files: usize,
    /// Number of findings reported
    pub findings: usize,
    /// The fatal error, when `status` is `Fatal`
    pub error: Option<LintrcError>,
    pub cache: CacheStats,
}

/// A file scheduled for analysis along with the config that applies to it
struct Target {
    /// Path as gathered, used in reports
    display: PathBuf,
    /// Absolute path, used for reading and override matching
    absolute: PathBuf,
    config: Arc<ResolvedConfig>,
}

/// Drives a single run
pub struct Runner<'a> {
    options: &'a RunOptions,
    cache: RunCache,
    state: RunState,
}

impl<'a> Runner<'a> {
    /// Execute a complete run
    ///
    /// The reporter is invoked exactly once unless the run is fatal, in
    /// which case it is not invoked at all.
    pub fn run(
        options: &'a RunOptions,
        analyzer: &dyn Analyzer,
        reporter: &mut dyn Reporter,
    ) -> RunOutcome {
        let mut runner = Runner {
            options,
            cache: RunCache::new(),
            state: RunState::Init,
        };

        match runner.execute(analyzer, reporter) {
            Ok((files, findings)) => {
                let status = if findings == 0 {
                    ExitStatus::Success
                } else {
                    ExitStatus::Findings
                };
                runner.transition(RunState::Terminal(status));
                info!("Linted {} files, {} findings", files, findings);
                RunOutcome {
                    status,
                    files,
                    findings,
                    error: None,
                    cache: runner.cache.stats(),
                }
            }
            Err(error) => {
                runner.transition(RunState::Terminal(ExitStatus::Fatal));
                RunOutcome {
                    status: ExitStatus::Fatal,
                    files: 0,
                    findings: 0,
                    error: Some(error),
                    cache: runner.cache.stats(),
                }
            }
        }
    }

    /// The state the runner is currently in
    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!("{} -> {}", self.state, next);
        self.state = next;
    }

    fn execute(
        &mut self,
        analyzer: &dyn Analyzer,
        reporter: &mut dyn Reporter,
    ) -> Result<(usize, usize)> {
        let cwd = self.options.cwd.clone();

        let explicit = match &self.options.config {
            Some(path) => Some(ConfigLoader::resolve(&absolutize(path, &cwd), &mut self.cache)?),
            None => None,
        };
        self.transition(RunState::ConfigResolved);

        let ignores = IgnoreSet::load(
            self.options.exclude.as_deref(),
            self.options.exclude_path.as_deref(),
            &cwd,
            &mut self.cache,
        )?;

        let files = match &self.options.stdin {
            Some(_) => {
                let name = self.stdin_name();
                if ignores.is_ignored(&name, &cwd) {
                    Vec::new()
                } else {
                    vec![name]
                }
            }
            None => {
                let extensions = self
                    .options
                    .extra_ext
                    .as_deref()
                    .map(parse_extensions)
                    .unwrap_or_default();
                DefaultFileDiscovery::new(&ignores, &extensions, &cwd).gather(&self.options.paths)?
            }
        };
        self.transition(RunState::FilesGathered);

        // Resolve every config before analyzing anything so a broken config
        // fails the run up front
        let mut targets = Vec::with_capacity(files.len());
        for file in files {
            let absolute = absolutize(&file, &cwd);
            let config = match &explicit {
                Some(config) => Arc::clone(config),
                None => self.implicit_config(&absolute)?,
            };
            targets.push(Target {
                display: file,
                absolute,
                config,
            });
        }

        self.transition(RunState::PerFileAnalysis);
        let cli_prereqs = self
            .options
            .prereq
            .as_deref()
            .map(parse_prereq_list)
            .unwrap_or_default();

        let mut results = Vec::new();
        let mut data = Vec::new();
        for target in &targets {
            let effective = apply_overrides(&target.config, &target.absolute, &cwd);
            let prereq_paths = merge_prereq_paths(
                &effective.prereq_entries(),
                &effective.base_dir,
                &cli_prereqs,
                &cwd,
            );
            let globals = PrereqLoader::new(&mut self.cache).load_globals(&prereq_paths)?;

            let file = target.display.display().to_string();
            let outcome = match self.read_target(target) {
                Ok(source) => analyzer.lint(&source, &effective, &globals),
                Err(e) => {
                    debug!("Can't read {}: {}", file, e);
                    LintOutcome::from_findings(
                        vec![Finding::new(UNREADABLE_FILE, format!("Can't open {file}"), 0, 0)],
                        Default::default(),
                    )
                }
            };

            debug!("{}: {} findings", file, outcome.findings.len());
            results.extend(outcome.findings.into_iter().map(|error| ReportEntry {
                file: file.clone(),
                error,
            }));
            data.push(FileData {
                file,
                data: outcome.data,
            });
        }

        reporter.report(&results, &data)?;
        self.transition(RunState::Reported);

        Ok((targets.len(), results.len()))
    }

    fn implicit_config(&mut self, file: &Path) -> Result<Arc<ResolvedConfig>> {
        let dir = file.parent().unwrap_or(file).to_path_buf();
        if let Some(config) = self.cache.implicit_config(&dir) {
            return Ok(config);
        }

        let config = ConfigLoader::load_implicit(
            file,
            &self.options.cwd,
            self.options.home.as_deref(),
            &mut self.cache,
        )?;
        self.cache.insert_implicit_config(dir, Arc::clone(&config));
        Ok(config)
    }

    fn stdin_name(&self) -> PathBuf {
        self.options
            .filename
            .clone()
            .unwrap_or_else(|| PathBuf::from(STDIN_FILENAME))
    }

    fn read_target(&self, target: &Target) -> std::io::Result<String> {
        match &self.options.stdin {
            Some(source) => Ok(source.clone()),
            None => std::fs::read_to_string(&target.absolute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectiveConfig;
    use crate::engine::{AnalysisData, BasicAnalyzer};
    use crate::error::ErrorKind;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    /// Records what the analyzer was asked to do
    #[derive(Default)]
    struct RecordingAnalyzer {
        calls: RefCell<Vec<(String, EffectiveConfig, BTreeSet<String>)>>,
    }

    impl Analyzer for RecordingAnalyzer {
        fn lint(&self, source: &str, config: &EffectiveConfig, globals: &BTreeSet<String>) -> LintOutcome {
            self.calls
                .borrow_mut()
                .push((source.to_string(), config.clone(), globals.clone()));
            LintOutcome::from_findings(Vec::new(), AnalysisData::default())
        }
    }

    #[derive(Default)]
    struct CollectingReporter {
        calls: usize,
        results: Vec<ReportEntry>,
        data: Vec<FileData>,
    }

    impl Reporter for CollectingReporter {
        fn report(&mut self, results: &[ReportEntry], data: &[FileData]) -> Result<()> {
            self.calls += 1;
            self.results = results.to_vec();
            self.data = data.to_vec();
            Ok(())
        }
    }

    fn options(cwd: &Path, paths: &[&str]) -> RunOptions {
        RunOptions {
            paths: paths.iter().map(PathBuf::from).collect(),
            cwd: cwd.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Fatal.code(), 1);
        assert_eq!(ExitStatus::Findings.code(), 2);
    }

    #[test]
    fn test_clean_run_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::write(cwd.join("pass.js"), "a();").unwrap();

        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&options(cwd, &["pass.js"]), &BasicAnalyzer, &mut reporter);

        assert_eq!(outcome.status, ExitStatus::Success);
        assert_eq!(outcome.files, 1);
        assert_eq!(reporter.calls, 1);
        assert!(reporter.results.is_empty());
    }

    #[test]
    fn test_findings_reported_once_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::write(cwd.join("a.js"), "a()").unwrap();
        fs::write(cwd.join("b.js"), "b()").unwrap();

        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&options(cwd, &["b.js", "a.js"]), &BasicAnalyzer, &mut reporter);

        assert_eq!(outcome.status, ExitStatus::Findings);
        assert_eq!(reporter.calls, 1);
        let files: Vec<&str> = reporter.results.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["b.js", "a.js"]);
        assert_eq!(reporter.results[0].error.code, "W033");
        assert_eq!(reporter.data.len(), 2);
    }

    #[test]
    fn test_overrides_apply_per_file() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::write(
            cwd.join("config.json"),
            r#"{ "asi": true, "overrides": { "bar.js": { "asi": false } } }"#,
        )
        .unwrap();
        fs::write(cwd.join("foo.js"), "a()").unwrap();
        fs::write(cwd.join("bar.js"), "a()").unwrap();

        let mut opts = options(cwd, &["foo.js"]);
        opts.config = Some(PathBuf::from("config.json"));
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&opts, &BasicAnalyzer, &mut reporter);
        assert_eq!(outcome.status, ExitStatus::Success);

        opts.paths = vec![PathBuf::from("bar.js")];
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&opts, &BasicAnalyzer, &mut reporter);
        assert_eq!(outcome.status, ExitStatus::Findings);
        assert_eq!(reporter.results.len(), 1);
        assert_eq!(reporter.results[0].error.code, "W033");
    }

    #[test]
    fn test_missing_config_is_fatal_and_skips_reporter() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::write(cwd.join("file.js"), "a();").unwrap();

        let mut opts = options(cwd, &["file.js"]);
        opts.config = Some(PathBuf::from("missing.json"));
        let analyzer = RecordingAnalyzer::default();
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&opts, &analyzer, &mut reporter);

        assert_eq!(outcome.status, ExitStatus::Fatal);
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::ConfigNotFound);
        assert_eq!(reporter.calls, 0);
        assert!(analyzer.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&options(temp_dir.path(), &["nope.js"]), &BasicAnalyzer, &mut reporter);

        assert_eq!(outcome.status, ExitStatus::Fatal);
        let error = outcome.error.unwrap();
        assert_eq!(error.kind(), ErrorKind::PathNotFound);
        assert_eq!(error.to_string(), "Can't open nope.js");
        assert_eq!(reporter.calls, 0);
    }

    #[test]
    fn test_broken_implicit_config_fails_before_analysis() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::create_dir_all(cwd.join("bad")).unwrap();
        fs::write(cwd.join("good.js"), "a();").unwrap();
        fs::write(cwd.join("bad/.jshintrc"), "not json").unwrap();
        fs::write(cwd.join("bad/file.js"), "a();").unwrap();

        let analyzer = RecordingAnalyzer::default();
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&options(cwd, &["good.js", "bad"]), &analyzer, &mut reporter);

        assert_eq!(outcome.status, ExitStatus::Fatal);
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::ConfigParse);
        assert!(analyzer.calls.borrow().is_empty());
        assert_eq!(reporter.calls, 0);
    }

    #[test]
    fn test_implicit_config_nearest_to_each_file() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::create_dir_all(cwd.join("strict")).unwrap();
        fs::write(cwd.join(".jshintrc"), r#"{ "level": "root" }"#).unwrap();
        fs::write(cwd.join("strict/.jshintrc"), r#"{ "level": "strict" }"#).unwrap();
        fs::write(cwd.join("a.js"), "a();").unwrap();
        fs::write(cwd.join("strict/b.js"), "b();").unwrap();
        fs::write(cwd.join("strict/c.js"), "c();").unwrap();

        let analyzer = RecordingAnalyzer::default();
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&options(cwd, &["a.js", "strict"]), &analyzer, &mut reporter);
        assert_eq!(outcome.status, ExitStatus::Success);

        let calls = analyzer.calls.borrow();
        let levels: Vec<&str> = calls
            .iter()
            .map(|(_, config, _)| config.get("level").and_then(|v| v.as_str()).unwrap())
            .collect();
        assert_eq!(levels, vec!["root", "strict", "strict"]);
        assert!(outcome.cache.hits > 0);
    }

    #[test]
    fn test_prereq_globals_merge_config_and_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::write(cwd.join("p1.js"), "var p1 = 1;").unwrap();
        fs::write(cwd.join("p2.js"), "var p2 = 1;").unwrap();
        fs::write(cwd.join("p3.js"), "var p3 = 1;").unwrap();
        fs::write(cwd.join("config.json"), r#"{ "undef": true, "prereq": ["p1.js"] }"#).unwrap();
        fs::write(cwd.join("file.js"), "p1(); p2(); p3();").unwrap();

        let mut opts = options(cwd, &["file.js"]);
        opts.config = Some(PathBuf::from("config.json"));
        opts.prereq = Some("p2.js, p3.js".to_string());

        let analyzer = RecordingAnalyzer::default();
        let mut reporter = CollectingReporter::default();
        Runner::run(&opts, &analyzer, &mut reporter);

        let calls = analyzer.calls.borrow();
        let globals: Vec<&str> = calls[0].2.iter().map(String::as_str).collect();
        assert_eq!(globals, vec!["p1", "p2", "p3"]);

        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&opts, &BasicAnalyzer, &mut reporter);
        assert_eq!(outcome.status, ExitStatus::Success);
    }

    #[test]
    fn test_missing_prereq_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::write(cwd.join("file.js"), "a();").unwrap();

        let mut opts = options(cwd, &["file.js"]);
        opts.prereq = Some("gone.js".to_string());
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&opts, &BasicAnalyzer, &mut reporter);

        assert_eq!(outcome.status, ExitStatus::Fatal);
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::PrereqNotFound);
        assert_eq!(reporter.calls, 0);
    }

    #[test]
    fn test_stdin_uses_filename_for_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::write(
            cwd.join(".jshintrc"),
            r#"{ "asi": true, "overrides": { "src/*.js": { "asi": false } } }"#,
        )
        .unwrap();

        let mut opts = options(cwd, &["-"]);
        opts.stdin = Some("a()".to_string());
        opts.filename = Some(PathBuf::from("src/piped.js"));
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&opts, &BasicAnalyzer, &mut reporter);

        assert_eq!(outcome.status, ExitStatus::Findings);
        assert_eq!(reporter.results[0].file, "src/piped.js");

        opts.filename = None;
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&opts, &BasicAnalyzer, &mut reporter);
        assert_eq!(outcome.status, ExitStatus::Success);
        assert_eq!(reporter.data[0].file, STDIN_FILENAME);
    }

    #[test]
    fn test_ignored_files_are_not_analyzed() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::create_dir_all(cwd.join("vendor")).unwrap();
        fs::write(cwd.join(".jshintignore"), "vendor/**\n").unwrap();
        fs::write(cwd.join("vendor/lib.js"), "broken(").unwrap();
        fs::write(cwd.join("app.js"), "a();").unwrap();

        let mut opts = options(cwd, &["."]);
        opts.exclude = Some("nothing-here.js".to_string());
        let analyzer = RecordingAnalyzer::default();
        let mut reporter = CollectingReporter::default();
        let outcome = Runner::run(&opts, &analyzer, &mut reporter);

        assert_eq!(outcome.status, ExitStatus::Success);
        assert_eq!(outcome.files, 1);
        assert_eq!(reporter.data[0].file, format!(".{}app.js", std::path::MAIN_SEPARATOR));
    }

    #[test]
    fn test_reporter_failure_is_fatal() {
        struct FailingReporter;
        impl Reporter for FailingReporter {
            fn report(&mut self, _: &[ReportEntry], _: &[FileData]) -> Result<()> {
                Err(LintrcError::reporter_load("broken-reporter"))
            }
        }

        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.js"), "a();").unwrap();
        let outcome = Runner::run(&options(temp_dir.path(), &["a.js"]), &BasicAnalyzer, &mut FailingReporter);
        assert_eq!(outcome.status, ExitStatus::Fatal);
    }
}
