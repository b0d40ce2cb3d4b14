//! Output formatting and reporting
//!
//! Built-in reporters render to any writer; the external reporter pipes
//! JSON results into a user-supplied executable.

use colored::*;
use lintrc_core::result::IoResultExt;
use lintrc_core::{BuiltinReporter, FileData, LintrcError, ReportEntry, Reporter, Result, results_json};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Renders results with one of the built-in formats
pub struct ConsoleReporter<W: Write> {
    kind: BuiltinReporter,
    use_colors: bool,
    out: W,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout(kind: BuiltinReporter, use_colors: bool) -> Self {
        Self::new(kind, use_colors, std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(kind: BuiltinReporter, use_colors: bool, out: W) -> Self {
        Self {
            kind,
            use_colors,
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render without writing
    pub fn render(&self, results: &[ReportEntry], data: &[FileData]) -> String {
        match self.kind {
            BuiltinReporter::Default => self.render_default(results),
            BuiltinReporter::Unix => render_unix(results),
            BuiltinReporter::Jslint => render_jslint(results),
            BuiltinReporter::Checkstyle => render_checkstyle(results),
            BuiltinReporter::NonError => {
                let mut text = self.render_default(results);
                text.push_str(&render_non_error_data(data));
                text
            }
        }
    }

    fn render_default(&self, results: &[ReportEntry]) -> String {
        if results.is_empty() {
            return String::new();
        }

        let mut text = String::new();
        for entry in results {
            let error = &entry.error;
            let location = format!("{}: line {}, col {},", entry.file, error.line, error.column);
            let code = format!("({})", error.code);
            if self.use_colors {
                text.push_str(&format!(
                    "{} {} {}\n",
                    location.bold(),
                    error.message,
                    code.dimmed()
                ));
            } else {
                text.push_str(&format!("{location} {} {code}\n", error.message));
            }
        }

        let count = error_count(results.len());
        if self.use_colors {
            text.push_str(&format!("\n{}\n", count.red()));
        } else {
            text.push_str(&format!("\n{count}\n"));
        }
        text
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, results: &[ReportEntry], data: &[FileData]) -> Result<()> {
        let text = self.render(results, data);
        self.out.write_all(text.as_bytes()).with_path("<stdout>")?;
        self.out.flush().with_path("<stdout>")
    }
}

/// Pipes JSON results into an external reporter executable
pub struct ExternalReporter {
    path: PathBuf,
}

impl ExternalReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Reporter for ExternalReporter {
    fn report(&mut self, results: &[ReportEntry], data: &[FileData]) -> Result<()> {
        debug!("Spawning reporter {}", self.path.display());
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|_| LintrcError::reporter_load(&self.path))?;

        let payload = results_json(results, data).to_string();
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload.as_bytes()).with_path(&self.path)?;
        }

        let status = child.wait().with_path(&self.path)?;
        if status.success() {
            Ok(())
        } else {
            Err(LintrcError::io_error(
                &self.path,
                std::io::Error::other(format!("reporter exited with {status}")),
            ))
        }
    }
}

fn error_count(count: usize) -> String {
    if count == 1 {
        "1 error".to_string()
    } else {
        format!("{count} errors")
    }
}

fn render_unix(results: &[ReportEntry]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut text = String::new();
    for entry in results {
        let error = &entry.error;
        text.push_str(&format!(
            "{}:{}:{}: {}\n",
            entry.file, error.line, error.column, error.message
        ));
    }
    text.push_str(&format!("\n{}\n", error_count(results.len())));
    text
}

/// Group entries by file, keeping first-appearance order
fn by_file(results: &[ReportEntry]) -> Vec<(&str, Vec<&ReportEntry>)> {
    let mut groups: Vec<(&str, Vec<&ReportEntry>)> = Vec::new();
    for entry in results {
        match groups.iter_mut().find(|(file, _)| *file == entry.file) {
            Some((_, entries)) => entries.push(entry),
            None => groups.push((entry.file.as_str(), vec![entry])),
        }
    }
    groups
}

fn render_jslint(results: &[ReportEntry]) -> String {
    let mut text = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?><jslint>\n");
    for (file, entries) in by_file(results) {
        text.push_str(&format!("\t<file name=\"{}\">\n", escape_xml(file)));
        for entry in entries {
            let error = &entry.error;
            text.push_str(&format!(
                "\t\t<issue line=\"{}\" char=\"{}\" reason=\"{}\" evidence=\"{}\" />\n",
                error.line,
                error.column,
                escape_xml(&error.message),
                escape_xml(error.evidence.as_deref().unwrap_or_default())
            ));
        }
        text.push_str("\t</file>\n");
    }
    text.push_str("</jslint>\n");
    text
}

fn render_checkstyle(results: &[ReportEntry]) -> String {
    let mut text = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<checkstyle version=\"4.3\">\n",
    );
    for (file, entries) in by_file(results) {
        text.push_str(&format!("\t<file name=\"{}\">\n", escape_xml(file)));
        for entry in entries {
            let error = &entry.error;
            let severity = if error.is_error() { "error" } else { "warning" };
            text.push_str(&format!(
                "\t\t<error line=\"{}\" column=\"{}\" severity=\"{}\" message=\"{}\" source=\"jshint.{}\" />\n",
                error.line,
                error.column,
                severity,
                escape_xml(&error.message),
                escape_xml(&error.code)
            ));
        }
        text.push_str("\t</file>\n");
    }
    text.push_str("</checkstyle>\n");
    text
}

fn render_non_error_data(data: &[FileData]) -> String {
    let mut text = String::new();
    for file in data {
        let implieds = &file.data.implieds;
        let unused = &file.data.unused;
        if implieds.is_empty() && unused.is_empty() {
            continue;
        }

        text.push_str(&format!("\n{} :\n", file.file));
        if !implieds.is_empty() {
            text.push_str("\tImplied globals:\n");
            for implied in implieds {
                let lines: Vec<String> = implied.lines.iter().map(usize::to_string).collect();
                text.push_str(&format!("\t\t{}: {}\n", implied.name, lines.join(",")));
            }
        }
        if !unused.is_empty() {
            text.push_str("\tUnused Variables:\n\t\t");
            for name in unused {
                text.push_str(&format!("{}({}), ", name.name, name.line));
            }
            text.push('\n');
        }
    }
    text
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintrc_core::{AnalysisData, Finding, ImpliedGlobal, UnusedName};

    fn entry(file: &str, code: &str, message: &str, line: usize, column: usize) -> ReportEntry {
        ReportEntry {
            file: file.to_string(),
            error: Finding::new(code, message, line, column).with_evidence("a()"),
        }
    }

    fn render(kind: BuiltinReporter, results: &[ReportEntry], data: &[FileData]) -> String {
        let mut reporter = ConsoleReporter::new(kind, false, Vec::new());
        reporter.report(results, data).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_default_format() {
        let results = vec![
            entry("a.js", "W033", "Missing semicolon.", 1, 4),
            entry("b.js", "W117", "'foo' is not defined.", 2, 1),
        ];
        assert_eq!(
            render(BuiltinReporter::Default, &results, &[]),
            "a.js: line 1, col 4, Missing semicolon. (W033)\n\
             b.js: line 2, col 1, 'foo' is not defined. (W117)\n\
             \n2 errors\n"
        );
    }

    #[test]
    fn test_default_format_is_silent_without_results() {
        assert_eq!(render(BuiltinReporter::Default, &[], &[]), "");
    }

    #[test]
    fn test_unix_format() {
        let results = vec![entry("src/a.js", "W033", "Missing semicolon.", 3, 10)];
        assert_eq!(
            render(BuiltinReporter::Unix, &results, &[]),
            "src/a.js:3:10: Missing semicolon.\n\n1 error\n"
        );
    }

    #[test]
    fn test_jslint_groups_by_file_and_escapes() {
        let results = vec![
            entry("a.js", "W033", "Missing semicolon.", 1, 4),
            entry("b.js", "W117", "'foo' is not defined.", 1, 1),
            entry("a.js", "W061", "eval can be harmful.", 2, 1),
        ];
        let xml = render(BuiltinReporter::Jslint, &results, &[]);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?><jslint>"));
        assert_eq!(xml.matches("<file name=").count(), 2);
        assert!(xml.find("name=\"a.js\"").unwrap() < xml.find("name=\"b.js\"").unwrap());
        assert!(xml.contains("reason=\"&apos;foo&apos; is not defined.\""));
        assert!(xml.contains("<issue line=\"1\" char=\"4\" reason=\"Missing semicolon.\" evidence=\"a()\" />"));
        assert!(xml.trim_end().ends_with("</jslint>"));
    }

    #[test]
    fn test_checkstyle_severity_and_source() {
        let results = vec![
            entry("a.js", "W033", "Missing semicolon.", 1, 4),
            entry("a.js", "E900", "Can't open a.js", 0, 0),
        ];
        let xml = render(BuiltinReporter::Checkstyle, &results, &[]);
        assert!(xml.contains("<checkstyle version=\"4.3\">"));
        assert!(xml.contains("severity=\"warning\" message=\"Missing semicolon.\" source=\"jshint.W033\""));
        assert!(xml.contains("severity=\"error\""));
    }

    #[test]
    fn test_non_error_includes_data() {
        let data = vec![FileData {
            file: "file.js".to_string(),
            data: AnalysisData {
                implieds: vec![ImpliedGlobal {
                    name: "helper".to_string(),
                    lines: vec![2, 3],
                }],
                unused: vec![UnusedName {
                    name: "idle".to_string(),
                    line: 1,
                    column: 15,
                }],
                globals: vec![],
            },
        }];
        let text = render(BuiltinReporter::NonError, &[], &data);
        assert!(text.contains("file.js :"));
        assert!(text.contains("Implied globals:\n\t\thelper: 2,3"));
        assert!(text.contains("Unused Variables:\n\t\tidle(1), "));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
