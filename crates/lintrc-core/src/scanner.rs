//! Lightweight JavaScript token scanner
//!
//! Just enough lexing to find statement boundaries, call sites, and
//! declarations. Strings, template literals, regular expression literals and
//! comments are consumed as opaque tokens so their contents never look like
//! code. There is no grammar here and no attempt at error recovery beyond
//! treating unknown characters as single-character punctuators.

use std::collections::BTreeSet;

/// Reserved words that can never name a binding
pub const KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "false", "finally", "for",
    "function", "if", "import", "in", "instanceof", "let", "new", "null", "of", "return",
    "static", "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void",
    "while", "with", "yield",
];

/// Keywords after which a `/` starts a regular expression
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

/// Characters that start operator tokens
const OPERATOR_CHARS: &str = "=+-*%<>!&|^~?";

/// Multi-character punctuators, longest first
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    String,
    Template,
    Regex,
    Punct,
}

/// One lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the first character
    pub line: usize,
    /// 1-based column of the first character
    pub column: usize,
    /// Whether a line break separates this token from the previous one
    pub newline_before: bool,
}

impl Token {
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == text
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == text
    }

    /// Whether this token is an identifier or a contextual keyword
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier)
            || (self.kind == TokenKind::Keyword && matches!(self.text.as_str(), "async" | "of" | "static" | "let"))
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    newline_pending: bool,
}

/// Split `source` into tokens, dropping whitespace and comments
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
        newline_pending: false,
    };
    lexer.run();
    lexer.tokens
}

impl Lexer {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.newline_pending = true;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(&mut self) {
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() {
                self.bump();
                continue;
            }

            if c == '/' && self.peek(1) == Some('/') {
                while let Some(c) = self.peek(0) {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }

            if c == '/' && self.peek(1) == Some('*') {
                self.bump();
                self.bump();
                while let Some(c) = self.bump() {
                    if c == '*' && self.peek(0) == Some('/') {
                        self.bump();
                        break;
                    }
                }
                continue;
            }

            let (line, column) = (self.line, self.column);
            let newline_before = std::mem::take(&mut self.newline_pending);
            let start = self.pos;
            let kind = self.scan_token(c);
            // line breaks inside a template or string belong to the token
            self.newline_pending = false;
            let text: String = self.chars[start..self.pos].iter().collect();
            let kind = match kind {
                TokenKind::Identifier if KEYWORDS.contains(&text.as_str()) => TokenKind::Keyword,
                other => other,
            };

            self.tokens.push(Token {
                kind,
                text,
                line,
                column,
                newline_before,
            });
        }
    }

    fn scan_token(&mut self, c: char) -> TokenKind {
        if is_identifier_start(c) {
            while self.peek(0).is_some_and(is_identifier_part) {
                self.bump();
            }
            return TokenKind::Identifier;
        }

        if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) {
            while self
                .peek(0)
                .is_some_and(|n| n.is_ascii_alphanumeric() || n == '.' || n == '_')
            {
                self.bump();
            }
            return TokenKind::Number;
        }

        match c {
            '"' | '\'' => {
                self.scan_quoted(c);
                TokenKind::String
            }
            '`' => {
                self.scan_quoted('`');
                TokenKind::Template
            }
            '/' if self.regex_allowed() => {
                self.scan_regex();
                TokenKind::Regex
            }
            _ => {
                self.scan_punct();
                TokenKind::Punct
            }
        }
    }

    fn scan_punct(&mut self) {
        for op in PUNCTUATORS {
            if self.starts_with(op) {
                for _ in 0..op.len() {
                    self.bump();
                }
                return;
            }
        }
        self.bump();
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(offset, c)| self.peek(offset) == Some(c))
    }

    fn scan_quoted(&mut self, quote: char) {
        self.bump();
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                c if c == quote => return,
                '\n' if quote != '`' => return,
                _ => {}
            }
        }
    }

    fn scan_regex(&mut self) {
        self.bump();
        let mut in_class = false;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                '\n' => return,
                _ => {}
            }
        }
        while self.peek(0).is_some_and(is_identifier_part) {
            self.bump();
        }
    }

    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(token) => match token.kind {
                TokenKind::Punct => !matches!(token.text.as_str(), ")" | "]" | "}"),
                TokenKind::Keyword => REGEX_PREFIX_KEYWORDS.contains(&token.text.as_str()),
                _ => false,
            },
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_alphanumeric()
}

/// Names declared at the top level of a script
///
/// Covers `var` declarators anywhere outside a function body (a `var` inside
/// a top-level block or `for` header is still a global), function
/// declarations in the same positions, and `let`, `const` and `class` at
/// nesting depth zero. Declarators may use simple object and array
/// destructuring.
pub fn top_level_declarations(tokens: &[Token]) -> BTreeSet<String> {
    collect_declarations(tokens, true)
}

/// Every name bound anywhere in a script
///
/// Adds nested declarations, function and arrow parameters, and `catch`
/// bindings to what [`top_level_declarations`] finds.
pub fn all_declarations(tokens: &[Token]) -> BTreeSet<String> {
    collect_declarations(tokens, false)
}

/// Keywords whose parenthesized head is followed by a plain block
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "with"];

/// What an open bracket introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Statement block or object literal
    Block,
    /// Function, method or arrow body, or a class body
    Function,
    /// `(`, remembering whether it is a control statement head
    Paren { control: bool },
    Bracket,
}

/// Tracks bracket nesting and how many function bodies enclose a token
#[derive(Debug, Default)]
struct ScopeStack {
    scopes: Vec<Scope>,
    /// Whether the most recently closed `(` was a control statement head
    last_paren_control: bool,
    /// Set after `class` until its body opens
    class_pending: bool,
}

impl ScopeStack {
    fn open(&mut self, tokens: &[Token], i: usize) {
        let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
        let scope = match tokens[i].text.as_str() {
            "(" => Scope::Paren {
                control: prev.is_some_and(|t| {
                    t.kind == TokenKind::Keyword && CONTROL_KEYWORDS.contains(&t.text.as_str())
                }),
            },
            "[" => Scope::Bracket,
            _ if std::mem::take(&mut self.class_pending) => Scope::Function,
            _ => match prev {
                Some(t) if t.is_punct("=>") => Scope::Function,
                Some(t) if t.is_punct(")") && !self.last_paren_control => Scope::Function,
                _ => Scope::Block,
            },
        };
        self.scopes.push(scope);
    }

    fn close(&mut self) {
        if let Some(Scope::Paren { control }) = self.scopes.pop() {
            self.last_paren_control = control;
        }
    }

    fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    fn in_function(&self) -> bool {
        self.scopes.contains(&Scope::Function)
    }

    /// Whether a statement may start here without leaving the script scope
    fn in_script_block(&self) -> bool {
        !self.in_function() && matches!(self.scopes.last(), None | Some(Scope::Block))
    }
}

/// Whether the `function` keyword at `i` starts a declaration statement
fn starts_statement(tokens: &[Token], i: usize) -> bool {
    let mut prev = i.checked_sub(1);
    if let Some(p) = prev
        && tokens[p].is_keyword("async")
    {
        prev = p.checked_sub(1);
    }
    match prev.map(|p| &tokens[p]) {
        None => true,
        Some(t) => t.is_punct(";") || t.is_punct("{") || t.is_punct("}"),
    }
}

fn collect_declarations(tokens: &[Token], top_level_only: bool) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut scopes = ScopeStack::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];

        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "{" | "(" | "[" => scopes.open(tokens, i),
                "}" | ")" | "]" => scopes.close(),
                "=>" if !top_level_only => collect_arrow_params(tokens, i, &mut names),
                _ => {}
            }
            i += 1;
            continue;
        }

        if token.kind != TokenKind::Keyword {
            i += 1;
            continue;
        }

        match token.text.as_str() {
            "var" if !top_level_only || !scopes.in_function() => {
                i = collect_declarators(tokens, i + 1, &mut names);
                continue;
            }
            "let" | "const" if !top_level_only || scopes.is_empty() => {
                i = collect_declarators(tokens, i + 1, &mut names);
                continue;
            }
            "function" => {
                let mut j = i + 1;
                if tokens.get(j).is_some_and(|t| t.is_punct("*")) {
                    j += 1;
                }
                let declares =
                    !top_level_only || (scopes.in_script_block() && starts_statement(tokens, i));
                if let Some(name) = tokens.get(j).filter(|t| t.is_name()) {
                    if declares {
                        names.insert(name.text.clone());
                    }
                    j += 1;
                }
                if !top_level_only && tokens.get(j).is_some_and(|t| t.is_punct("(")) {
                    collect_params(tokens, j, &mut names);
                }
            }
            "class" => {
                scopes.class_pending = true;
                if (!top_level_only || scopes.is_empty())
                    && let Some(name) = tokens.get(i + 1).filter(|t| t.is_name())
                {
                    names.insert(name.text.clone());
                }
            }
            "catch" if !top_level_only => {
                if tokens.get(i + 1).is_some_and(|t| t.is_punct("(")) {
                    collect_params(tokens, i + 1, &mut names);
                }
            }
            _ => {}
        }
        i += 1;
    }

    names
}

/// Parse declarators starting at `i`; returns the index after the statement
fn collect_declarators(tokens: &[Token], mut i: usize, names: &mut BTreeSet<String>) -> usize {
    loop {
        match tokens.get(i) {
            Some(t) if t.is_name() => {
                names.insert(t.text.clone());
                i += 1;
            }
            Some(t) if t.is_punct("{") || t.is_punct("[") => {
                i = collect_pattern(tokens, i, names);
            }
            _ => return i,
        }

        if tokens.get(i).is_some_and(|t| t.is_punct("=")) {
            i = skip_initializer(tokens, i + 1);
        }

        match tokens.get(i) {
            Some(t) if t.is_punct(",") => i += 1,
            Some(t) if t.is_punct(";") => return i + 1,
            _ => return i,
        }
    }
}

/// Collect binding names from a destructuring pattern opening at `i`
fn collect_pattern(tokens: &[Token], start: usize, names: &mut BTreeSet<String>) -> usize {
    let mut depth = 0usize;
    let mut i = start;

    while let Some(token) = tokens.get(i) {
        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "{" | "[" => depth += 1,
                "}" | "]" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i + 1;
                    }
                }
                "=" => {
                    i = skip_default(tokens, i + 1);
                    continue;
                }
                _ => {}
            }
        } else if token.is_name() {
            let next = tokens.get(i + 1);
            if next.is_some_and(|n| {
                n.is_punct(",") || n.is_punct("}") || n.is_punct("]") || n.is_punct("=")
            }) {
                names.insert(token.text.clone());
            }
        }
        i += 1;
    }

    i
}

/// Skip a default value inside a pattern, stopping at `,` or a closer
fn skip_default(tokens: &[Token], mut i: usize) -> usize {
    let mut depth = 0usize;
    while let Some(token) = tokens.get(i) {
        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "{" | "(" | "[" => depth += 1,
                "}" | ")" | "]" if depth == 0 => return i,
                "}" | ")" | "]" => depth -= 1,
                "," if depth == 0 => return i,
                _ => {}
            }
        }
        i += 1;
    }
    i
}

/// Skip an initializer expression, stopping at a top-level `,` or `;`, or at
/// a line break that cannot continue the expression
fn skip_initializer(tokens: &[Token], mut i: usize) -> usize {
    let mut depth = 0usize;
    while let Some(token) = tokens.get(i) {
        if depth == 0 && token.newline_before && i > 0 && !continues_expression(&tokens[i - 1], token) {
            return i;
        }
        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "{" | "(" | "[" => depth += 1,
                "}" | ")" | "]" if depth == 0 => return i,
                "}" | ")" | "]" => depth -= 1,
                "," | ";" if depth == 0 => return i,
                _ => {}
            }
        }
        i += 1;
    }
    i
}

/// Whether the expression before a line break continues onto `next`
pub fn continues_expression(prev: &Token, next: &Token) -> bool {
    let prev_open = prev.kind == TokenKind::Punct && !matches!(prev.text.as_str(), ")" | "]" | "}" | "++" | "--");
    let prev_binary_keyword = prev.kind == TokenKind::Keyword
        && matches!(prev.text.as_str(), "in" | "instanceof" | "typeof" | "new" | "void" | "delete" | "await");
    let next_continues = next.kind == TokenKind::Punct
        && (matches!(next.text.as_str(), "." | "?." | "," | "(" | "[" | ")" | "]" | "}" | ":" | "?")
            || (OPERATOR_CHARS.contains(next.text.chars().next().unwrap_or(' '))
                && !matches!(next.text.as_str(), "++" | "--" | "!" | "~"))
            || next.text.starts_with('/'));
    let next_binary_keyword = next.is_keyword("in") || next.is_keyword("instanceof");

    prev_open || prev_binary_keyword || next_continues || next_binary_keyword
}

/// Collect parameter names from a parenthesized list opening at `open`
fn collect_params(tokens: &[Token], open: usize, names: &mut BTreeSet<String>) {
    let mut depth = 0usize;
    let mut i = open;
    while let Some(token) = tokens.get(i) {
        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "(" | "{" | "[" => depth += 1,
                ")" | "}" | "]" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                "=" => {
                    i = skip_default(tokens, i + 1);
                    continue;
                }
                _ => {}
            }
        } else if token.is_name() {
            let next = tokens.get(i + 1);
            if next.is_some_and(|n| {
                n.is_punct(",") || n.is_punct(")") || n.is_punct("}") || n.is_punct("]") || n.is_punct("=")
            }) {
                names.insert(token.text.clone());
            }
        }
        i += 1;
    }
}

/// Collect the parameters of the arrow function whose `=>` is at `arrow`
fn collect_arrow_params(tokens: &[Token], arrow: usize, names: &mut BTreeSet<String>) {
    let Some(prev) = arrow.checked_sub(1).and_then(|i| tokens.get(i)) else {
        return;
    };

    if prev.is_name() {
        names.insert(prev.text.clone());
        return;
    }

    if !prev.is_punct(")") {
        return;
    }

    let mut depth = 0usize;
    let mut open = arrow - 1;
    loop {
        let token = &tokens[open];
        if token.is_punct(")") || token.is_punct("]") || token.is_punct("}") {
            depth += 1;
        } else if token.is_punct("(") || token.is_punct("[") || token.is_punct("{") {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                break;
            }
        }
        if open == 0 {
            return;
        }
        open -= 1;
    }
    collect_params(tokens, open, names);
}
