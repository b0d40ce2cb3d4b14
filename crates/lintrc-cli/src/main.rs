//! lintrc CLI
//!
//! Command-line front end: resolves configuration, gathers files and hands
//! them to the analyzer, then reports and sets the exit code.

mod output;

use anyhow::Context;
use clap::Parser;
use lintrc_core::{
    BasicAnalyzer, ExitStatus, LintrcError, Reporter, ReporterChoice, RunOptions, Runner,
    init_tracing,
};
use output::{ConsoleReporter, ExternalReporter};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing::debug;

/// Positional argument that reads source from standard input
const STDIN_ARG: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "lintrc")]
#[command(about = "Lint JavaScript files with hierarchical .jshintrc configuration")]
#[command(version = lintrc_core::VERSION)]
#[command(
    long_about = "lintrc resolves .jshintrc and package.json configuration for each target,\n\
honors .jshintignore and --exclude patterns, and reports findings.\n\
\n\
Examples:\n  \
lintrc src/                        # Lint every .js file under src/\n  \
lintrc --extra-ext jsx,mjs src/    # Also lint .jsx and .mjs files\n  \
lintrc --reporter unix app.js      # file:line:col output\n  \
cat a.js | lintrc --filename a.js -  # Lint standard input"
)]
struct Cli {
    /// Files or directories to lint, or `-` for standard input
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Custom configuration file
    #[arg(short, long, help = "Path to a configuration file (disables .jshintrc lookup)")]
    config: Option<PathBuf>,

    /// Reporter name or path
    #[arg(long, help = "Built-in reporter (default, unix, jslint, checkstyle, non-error) or a reporter executable")]
    reporter: Option<String>,

    /// Ignore patterns
    #[arg(long, help = "Comma separated patterns of files to ignore")]
    exclude: Option<String>,

    /// Ignore file
    #[arg(long, help = "Ignore file to use instead of .jshintignore")]
    exclude_path: Option<PathBuf>,

    /// Additional extensions
    #[arg(short = 'e', long, help = "Comma separated extensions to lint in addition to .js")]
    extra_ext: Option<String>,

    /// Prerequisite scripts
    #[arg(long, help = "Comma separated scripts whose top-level declarations become globals")]
    prereq: Option<String>,

    /// Also report implied globals and unused names
    #[arg(long)]
    show_non_errors: bool,

    /// Name used for standard input
    #[arg(long, help = "Path reported for standard input and used for overrides")]
    filename: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();

    if !cli.no_color && std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "lintrc=error",
        1 => "lintrc=warn",
        2 => "lintrc=info",
        3 => "lintrc=debug",
        _ => "lintrc=trace",
    };
    unsafe {
        std::env::set_var("RUST_LOG", log_level);
    }
    init_tracing();

    let status = match run(cli) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("{e:#}");
            ExitStatus::Fatal
        }
    };
    std::process::exit(status.code());
}

fn run(cli: Cli) -> anyhow::Result<ExitStatus> {
    let cwd = std::env::current_dir().context("Can't determine the working directory")?;
    let use_colors = !cli.no_color && std::io::stdout().is_terminal();

    let mut reporter: Box<dyn Reporter> =
        match ReporterChoice::resolve(cli.reporter.as_deref(), cli.show_non_errors, &cwd) {
            ReporterChoice::Builtin(kind) => {
                debug!("Using {} reporter", kind);
                Box::new(ConsoleReporter::stdout(kind, use_colors))
            }
            ReporterChoice::External(path) => Box::new(ExternalReporter::new(path)),
            ReporterChoice::LoadError(path) => return Err(LintrcError::reporter_load(path).into()),
        };

    let stdin = if cli.paths.len() == 1 && cli.paths[0].as_os_str() == STDIN_ARG {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Can't read standard input")?;
        Some(source)
    } else {
        None
    };

    let options = RunOptions {
        paths: if stdin.is_some() { Vec::new() } else { cli.paths },
        config: cli.config,
        exclude: cli.exclude,
        exclude_path: cli.exclude_path,
        extra_ext: cli.extra_ext,
        prereq: cli.prereq,
        stdin,
        filename: cli.filename,
        cwd,
        home: lintrc_core::home_dir(),
    };

    let outcome = Runner::run(&options, &BasicAnalyzer, reporter.as_mut());
    debug!(
        "{} files, {} findings, cache {} hits / {} misses",
        outcome.files, outcome.findings, outcome.cache.hits, outcome.cache.misses
    );
    if let Some(error) = outcome.error {
        eprintln!("{error}");
    }
    Ok(outcome.status)
}
