//! Analysis seam
//!
//! The runner hands each file to an [`Analyzer`] together with its effective
//! config and the predefined globals. [`BasicAnalyzer`] is a small reference
//! implementation built on the token scanner; it implements a handful of
//! checks so the pipeline can be exercised end to end, and is not a
//! replacement for a real JavaScript checker.

use crate::config::EffectiveConfig;
use crate::scanner::{Token, TokenKind, all_declarations, continues_expression, tokenize, top_level_declarations};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Code for a statement that is not terminated by `;`
pub const MISSING_SEMICOLON: &str = "W033";

/// Code for a direct call to `eval`
pub const EVAL_CALL: &str = "W061";

/// Code for a call to a name that is never declared
pub const UNDEFINED_NAME: &str = "W117";

/// Code for a target file that could not be read
pub const UNREADABLE_FILE: &str = "E900";

/// Globals every script can reference
const BUILTIN_GLOBALS: &[&str] = &[
    "Array", "ArrayBuffer", "BigInt", "Boolean", "DataView", "Date", "Error", "EvalError",
    "Float32Array", "Float64Array", "Function", "Int16Array", "Int32Array", "Int8Array", "Intl",
    "JSON", "Map", "Math", "Number", "Object", "Promise", "Proxy", "RangeError",
    "ReferenceError", "Reflect", "RegExp", "Set", "String", "Symbol", "SyntaxError",
    "TypeError", "URIError", "Uint16Array", "Uint32Array", "Uint8Array", "Uint8ClampedArray",
    "WeakMap", "WeakSet", "decodeURI", "decodeURIComponent", "encodeURI", "encodeURIComponent",
    "eval", "globalThis", "isFinite", "isNaN", "parseFloat", "parseInt",
];

/// Option name -> globals it predefines
const ENVIRONMENTS: &[(&str, &[&str])] = &[
    (
        "node",
        &[
            "Buffer", "__dirname", "__filename", "clearImmediate", "clearInterval",
            "clearTimeout", "console", "exports", "global", "module", "process", "require",
            "setImmediate", "setInterval", "setTimeout",
        ],
    ),
    (
        "browser",
        &[
            "XMLHttpRequest", "cancelAnimationFrame", "clearInterval", "clearTimeout",
            "document", "fetch", "navigator", "requestAnimationFrame", "setInterval",
            "setTimeout", "window",
        ],
    ),
    ("devel", &["alert", "confirm", "console", "prompt"]),
];

/// One problem found in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// JSHint-compatible code such as `W033`
    pub code: String,
    pub message: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// The source line the finding points at
    pub evidence: Option<String>,
}

impl Finding {
    pub fn new(code: &str, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            line,
            column,
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    /// Whether the code denotes an error rather than a warning
    pub fn is_error(&self) -> bool {
        self.code.starts_with('E')
    }
}

/// A global the file uses without declaring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpliedGlobal {
    pub name: String,
    pub lines: Vec<usize>,
}

/// A top-level binding that is never referenced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedName {
    pub name: String,
    pub line: usize,
    pub column: usize,
}

/// Side information about a file, shown by the non-error reporter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisData {
    pub implieds: Vec<ImpliedGlobal>,
    pub unused: Vec<UnusedName>,
    /// Names the file declares at its top level
    pub globals: Vec<String>,
}

/// Result of analyzing one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintOutcome {
    pub findings: Vec<Finding>,
    /// True when there are no findings
    pub ok: bool,
    pub data: AnalysisData,
}

impl LintOutcome {
    pub fn from_findings(findings: Vec<Finding>, data: AnalysisData) -> Self {
        Self {
            ok: findings.is_empty(),
            findings,
            data,
        }
    }
}

/// The analysis engine invoked once per file
pub trait Analyzer {
    /// Analyze `source` under `config`; `globals` are predefined names from
    /// prerequisites
    fn lint(&self, source: &str, config: &EffectiveConfig, globals: &BTreeSet<String>) -> LintOutcome;
}

/// Reference analyzer
///
/// - `W033` when a statement ends without `;`, unless `asi` is enabled
/// - `W061` for `eval(...)`, unless `evil` is enabled
/// - `W117` for calls to names that are never declared, when `undef` is
///   enabled
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAnalyzer;

impl BasicAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for BasicAnalyzer {
    fn lint(&self, source: &str, config: &EffectiveConfig, globals: &BTreeSet<String>) -> LintOutcome {
        let tokens = tokenize(source);
        let lines: Vec<&str> = source.lines().collect();

        let mut findings = Vec::new();
        if !config.is_enabled("asi") {
            findings.extend(check_missing_semicolons(&tokens));
        }
        if !config.is_enabled("evil") {
            findings.extend(check_eval(&tokens));
        }

        let known = known_names(&tokens, config, globals);
        let undefined = undefined_calls(&tokens, &known);
        if config.is_enabled("undef") {
            findings.extend(undefined.iter().map(|token| {
                Finding::new(
                    UNDEFINED_NAME,
                    format!("'{}' is not defined.", token.text),
                    token.line,
                    token.column,
                )
            }));
        }

        for finding in &mut findings {
            if let Some(line) = finding.line.checked_sub(1).and_then(|i| lines.get(i)) {
                finding.evidence = Some(line.to_string());
            }
        }
        findings.sort_by_key(|f| (f.line, f.column));

        let data = AnalysisData {
            implieds: implied_globals(&undefined),
            unused: unused_names(&tokens),
            globals: top_level_declarations(&tokens).into_iter().collect(),
        };

        LintOutcome::from_findings(findings, data)
    }
}

/// Report statements that end at a line break or end of input without `;`
pub fn check_missing_semicolons(tokens: &[Token]) -> Vec<Finding> {
    let control_closers = control_paren_closers(tokens);
    let mut findings = Vec::new();
    let mut nesting = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "(" | "[" => nesting += 1,
                ")" | "]" => nesting = nesting.saturating_sub(1),
                _ => {}
            }
        }

        if nesting > 0 || !ends_statement(token) || control_closers.contains(&i) {
            continue;
        }

        let terminated = match tokens.get(i + 1) {
            None => false,
            Some(next) if !next.newline_before => true,
            Some(next) => continues_expression(token, next),
        };

        if !terminated {
            findings.push(Finding::new(
                MISSING_SEMICOLON,
                "Missing semicolon.",
                token.line,
                token.column + token.text.chars().count(),
            ));
        }
    }

    findings
}

/// Report direct calls to `eval`
pub fn check_eval(tokens: &[Token]) -> Vec<Finding> {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, token)| {
            token.kind == TokenKind::Identifier
                && token.text == "eval"
                && tokens.get(i + 1).is_some_and(|t| t.is_punct("("))
                && !is_member(tokens, *i)
        })
        .map(|(_, token)| Finding::new(EVAL_CALL, "eval can be harmful.", token.line, token.column))
        .collect()
}

/// Every name the file may reference without a warning
fn known_names(tokens: &[Token], config: &EffectiveConfig, globals: &BTreeSet<String>) -> HashSet<String> {
    let mut known: HashSet<String> = BUILTIN_GLOBALS.iter().map(|name| name.to_string()).collect();
    known.extend(all_declarations(tokens));
    known.extend(globals.iter().cloned());
    known.extend(config.globals().into_keys());

    for (option, names) in ENVIRONMENTS {
        if config.is_enabled(option) {
            known.extend(names.iter().map(|name| name.to_string()));
        }
    }

    known
}

/// Call targets that are not in `known`
fn undefined_calls<'t>(tokens: &'t [Token], known: &HashSet<String>) -> Vec<&'t Token> {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, token)| {
            token.kind == TokenKind::Identifier
                && tokens.get(i + 1).is_some_and(|t| t.is_punct("("))
                && !is_member(tokens, *i)
                && !is_method_definition(tokens, *i)
                && !known.contains(&token.text)
        })
        .map(|(_, token)| token)
        .collect()
}

fn implied_globals(undefined: &[&Token]) -> Vec<ImpliedGlobal> {
    let mut lines: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for token in undefined {
        let entry = lines.entry(token.text.as_str()).or_default();
        if !entry.contains(&token.line) {
            entry.push(token.line);
        }
    }

    lines
        .into_iter()
        .map(|(name, lines)| ImpliedGlobal {
            name: name.to_string(),
            lines,
        })
        .collect()
}

/// Top-level bindings whose name occurs exactly once
fn unused_names(tokens: &[Token]) -> Vec<UnusedName> {
    let declared = top_level_declarations(tokens);
    let mut counts: BTreeMap<&str, (usize, &Token)> = BTreeMap::new();

    for (i, token) in tokens.iter().enumerate() {
        if token.is_name() && declared.contains(&token.text) && !is_member(tokens, i) {
            counts.entry(token.text.as_str()).or_insert((0, token)).0 += 1;
        }
    }

    counts
        .into_iter()
        .filter(|(_, (count, _))| *count == 1)
        .map(|(name, (_, token))| UnusedName {
            name: name.to_string(),
            line: token.line,
            column: token.column,
        })
        .collect()
}

/// Whether the token at `i` is a property access like `a.b`
fn is_member(tokens: &[Token], i: usize) -> bool {
    i.checked_sub(1)
        .and_then(|prev| tokens.get(prev))
        .is_some_and(|prev| prev.is_punct(".") || prev.is_punct("?."))
}

/// Whether `name(...) {` at `i` defines a method rather than calling one
fn is_method_definition(tokens: &[Token], i: usize) -> bool {
    if i > 0 && tokens[i - 1].is_keyword("function") {
        return true;
    }

    let mut depth = 0usize;
    for (j, token) in tokens.iter().enumerate().skip(i + 1) {
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return tokens.get(j + 1).is_some_and(|t| t.is_punct("{"));
            }
        }
    }
    false
}

/// Indices of `)` tokens closing a control header or parameter list
fn control_paren_closers(tokens: &[Token]) -> HashSet<usize> {
    let mut closers = HashSet::new();
    let mut stack: Vec<bool> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if token.is_punct("(") {
            let prev = i.checked_sub(1).map(|p| &tokens[p]);
            let before = i.checked_sub(2).map(|p| &tokens[p]);
            let control = prev.is_some_and(|p| {
                p.kind == TokenKind::Keyword
                    && matches!(p.text.as_str(), "if" | "for" | "while" | "with" | "switch" | "catch" | "function")
            }) || (prev.is_some_and(Token::is_name) && before.is_some_and(|b| b.is_keyword("function")));
            stack.push(control);
        } else if token.is_punct(")") && stack.pop().unwrap_or(false) {
            closers.insert(i);
        }
    }

    closers
}

/// Whether a statement may end right after `token`
fn ends_statement(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier
        | TokenKind::Number
        | TokenKind::String
        | TokenKind::Template
        | TokenKind::Regex => true,
        TokenKind::Keyword => matches!(
            token.text.as_str(),
            "this" | "true" | "false" | "null" | "break" | "continue" | "return" | "debugger" | "super"
        ),
        TokenKind::Punct => matches!(token.text.as_str(), ")" | "]" | "++" | "--"),
    }
}
