//! Diagnostic sink for the `.mana` front-end.
//!
//! Plays the role spec.md calls out as an external collaborator: "receives
//! errors with line/column". The loader and its collaborators never print
//! directly; they build a [`Diagnostic`] and hand it to a
//! [`DiagnosticEngine`].

use colored::Colorize;
use std::fmt;

/// Source code location: a file, a 1-based line/column, and an underline
/// length. `(0, 0)` marks an error with no precise source position (spec.md
/// §6: "for loader errors without a source position, line and column are
/// 0").
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Span {
    pub fn new(file: impl Into<String>, line: usize, column: usize, length: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            length,
        }
    }

    /// A position-less span for loader errors reported without a precise
    /// source location (resolution, I/O, and cycle errors).
    pub fn at_file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: 0,
            column: 0,
            length: 0,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Error,
    Warning,
    Info,
    Note,
    Help,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
            ErrorLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
            ErrorLevel::Info => write!(f, "{}", "info".blue().bold()),
            ErrorLevel::Note => write!(f, "{}", "note".cyan().bold()),
            ErrorLevel::Help => write!(f, "{}", "help".green().bold()),
        }
    }
}

/// A structured diagnostic. `message` carries the stable, prefix-matchable
/// text spec.md §6 promises consumers ("module not found: <path>", etc.).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: String,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(level: ErrorLevel, code: &str, message: String, span: Span) -> Self {
        Self {
            level,
            code: code.to_string(),
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn error(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Error, code, message, span)
    }

    pub fn warning(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Warning, code, message, span)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Rust-style rendering with a source snippet and caret underline, when
    /// `source_code` has a line at the diagnostic's position.
    pub fn format(&self, source_code: &str) -> String {
        let mut output = self.format_simple();
        if let Some(snippet) = self.source_snippet(source_code) {
            output.push_str(&snippet);
        }
        output
    }

    fn format_simple(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}[{}]: {}\n",
            self.level,
            self.code,
            self.message.bold()
        ));
        output.push_str(&format!(" {} {}\n", "-->".cyan().bold(), self.span));
        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }
        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }
        output
    }

    fn source_snippet(&self, source_code: &str) -> Option<String> {
        if self.span.line == 0 {
            return None;
        }
        let lines: Vec<&str> = source_code.lines().collect();
        let line = *lines.get(self.span.line - 1)?;

        let width = self.span.line.to_string().len().max(2);
        let mut snippet = String::new();
        snippet.push_str(&format!(" {}\n", " ".repeat(width + 1).cyan()));
        snippet.push_str(&format!(
            " {} {} {}\n",
            format!("{:>width$}", self.span.line, width = width)
                .cyan()
                .bold(),
            "|".cyan().bold(),
            line
        ));
        let padding = " ".repeat(width + 3 + self.span.column.saturating_sub(1));
        let underline = "^".repeat(self.span.length.max(1));
        snippet.push_str(&format!(
            " {} {}{}\n",
            " ".repeat(width + 1).cyan(),
            padding,
            underline.red().bold()
        ));
        Some(snippet)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

/// Collects diagnostics emitted over the lifetime of a loader session.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            ErrorLevel::Error => self.error_count += 1,
            ErrorLevel::Warning => self.warning_count += 1,
            _ => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn print_all(&self, source_code: &str) {
        for diag in &self.diagnostics {
            eprintln!("{}", diag.format(source_code));
        }
    }

    pub fn print_summary(&self) {
        if self.error_count > 0 {
            eprintln!(
                "{}: {} error{} emitted",
                "error".red().bold(),
                self.error_count,
                if self.error_count == 1 { "" } else { "s" }
            );
        }
        if self.warning_count > 0 {
            eprintln!(
                "{}: {} warning{} emitted",
                "warning".yellow().bold(),
                self.warning_count,
                if self.warning_count == 1 { "" } else { "s" }
            );
        }
    }

    /// Exports diagnostics as JSON for IDEs/LSP consumers.
    pub fn to_json(&self) -> String {
        let mut json = String::from("{\"diagnostics\":[");
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                json.push(',');
            }
            let level_str = match diag.level {
                ErrorLevel::Error => "error",
                ErrorLevel::Warning => "warning",
                ErrorLevel::Info => "info",
                ErrorLevel::Note => "note",
                ErrorLevel::Help => "help",
            };
            json.push_str(&format!(
                "{{\"level\":\"{}\",\"code\":\"{}\",\"message\":\"{}\",\"file\":\"{}\",\"line\":{},\"column\":{}}}",
                level_str,
                diag.code,
                diag.message.replace('"', "\\\""),
                diag.span.file,
                diag.span.line,
                diag.span.column,
            ));
        }
        json.push_str("]}");
        json
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}

/// Emission helpers for the loader's four fatal error kinds (spec.md §7)
/// plus the sole locally-recovered case (duplicate exports, §4.3/§7). The
/// `message` text matches spec.md §6's stable, prefix-matchable shapes
/// exactly — consumers are allowed to match on prefix.
impl DiagnosticEngine {
    pub fn module_not_found(&mut self, module_path: &str) {
        self.emit(Diagnostic::error(
            error_codes::MODULE_NOT_FOUND,
            format!("module not found: {module_path}"),
            Span::at_file(module_path),
        ));
    }

    pub fn cannot_open_file(&mut self, file: &str) {
        self.emit(Diagnostic::error(
            error_codes::IO_ERROR,
            format!("cannot open file: {file}"),
            Span::at_file(file),
        ));
    }

    pub fn failed_to_parse(&mut self, file: &str, underlying: impl fmt::Display) {
        self.emit(
            Diagnostic::error(
                error_codes::SYNTAX_ERROR,
                format!("failed to parse: {file}"),
                Span::at_file(file),
            )
            .with_note(underlying.to_string()),
        );
    }

    pub fn circular_module_dependency(&mut self, module_path: &str) {
        self.emit(Diagnostic::error(
            error_codes::CIRCULAR_DEPENDENCY,
            format!("circular module dependency: {module_path}"),
            Span::at_file(module_path),
        ));
    }

    /// The sole case of local recovery (spec.md §7): reported once, the
    /// first declaration wins.
    pub fn duplicate_export(&mut self, name: &str, module: &str) {
        self.emit(Diagnostic::error(
            error_codes::DUPLICATE_DEFINITION,
            format!("duplicate public declaration: {name} in module {module}"),
            Span::at_file(module),
        ));
    }
}

/// Error codes this crate's emitters actually use, reusing the teacher's
/// `E0xxx` numbering scheme rather than inventing a new one.
pub mod error_codes {
    pub const SYNTAX_ERROR: &str = "E0001";
    pub const MODULE_NOT_FOUND: &str = "E0583";
    pub const CIRCULAR_DEPENDENCY: &str = "E0391";
    pub const IO_ERROR: &str = "E0432";
    pub const DUPLICATE_DEFINITION: &str = "E0428";
}

/// "Did you mean?" suggestions for module-not-found and similar
/// name-resolution diagnostics.
pub mod fuzzy {
    use strsim::jaro_winkler;

    pub fn find_similar_names(
        target: &str,
        candidates: &[String],
        threshold: f64,
        max_suggestions: usize,
    ) -> Vec<String> {
        let mut scored: Vec<(String, f64)> = candidates
            .iter()
            .map(|candidate| (candidate.clone(), jaro_winkler(target, candidate)))
            .filter(|(_, score)| *score > threshold)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(max_suggestions).map(|(n, _)| n).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_format_includes_code_and_location() {
        let span = Span::new("test.mana", 2, 21, 7);
        let diag = Diagnostic::error("E0308", "mismatched types".to_string(), span)
            .with_note("expected `i32`, found `string`".to_string())
            .with_help("convert the string to an integer".to_string());
        let formatted = diag.format("fn f() {\n    let x = g(1, \"hi\");\n}");
        assert!(formatted.contains("error[E0308]"));
        assert!(formatted.contains("mismatched types"));
        assert!(formatted.contains("test.mana:2:21"));
    }

    #[test]
    fn engine_counts_errors_and_warnings_separately() {
        let mut engine = DiagnosticEngine::new();
        engine.module_not_found("does::not::exist");
        engine.emit(Diagnostic::warning(
            "W0001",
            "unused import".to_string(),
            Span::at_file("a.mana"),
        ));
        assert_eq!(engine.error_count(), 1);
        assert_eq!(engine.warning_count(), 1);
        assert!(engine.has_errors());
    }

    #[test]
    fn fuzzy_suggestions_rank_closest_match_first() {
        let candidates = vec!["std::io".to_string(), "std::fs".to_string()];
        let found = fuzzy::find_similar_names("std::i", &candidates, 0.5, 1);
        assert_eq!(found, vec!["std::io".to_string()]);
    }
}
