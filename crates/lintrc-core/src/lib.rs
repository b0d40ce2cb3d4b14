//! lintrc Core
//!
//! Configuration resolution and file discovery for a JavaScript lint front
//! end. Given command-line targets and options, this crate decides which
//! files get analyzed and which options apply to each of them, then hands
//! every file to an [`Analyzer`] and the collected results to a
//! [`Reporter`].

pub mod cache;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod glob_match;
pub mod ignore;
pub mod paths;
pub mod prereq;
pub mod reporter;
pub mod result;
pub mod runner;
pub mod scanner;

// Re-export commonly used types
pub use cache::{CacheStats, RunCache};
pub use config::{
    ConfigLoader, DiscoveredConfig, EffectiveConfig, ResolvedConfig, apply_overrides,
    deep_merge, home_dir, override_matches,
};
pub use discovery::{DefaultFileDiscovery, FileDiscovery, gather, parse_extensions};
pub use engine::{AnalysisData, Analyzer, BasicAnalyzer, Finding, ImpliedGlobal, LintOutcome, UnusedName};
pub use error::{ErrorKind, LintrcError};
pub use glob_match::{PathPattern, glob_match};
pub use ignore::IgnoreSet;
pub use prereq::{PrereqLoader, merge_prereq_paths, parse_prereq_list};
pub use reporter::{BuiltinReporter, FileData, ReportEntry, Reporter, ReporterChoice, results_json};
pub use result::Result;
pub use runner::{ExitStatus, RunOptions, RunOutcome, RunState, Runner};

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr so they never mix with reporter output. `RUST_LOG`
/// overrides the default `lintrc=info` filter.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lintrc=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
