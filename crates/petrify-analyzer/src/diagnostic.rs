//! Diagnostic system for errors and warnings
//!
//! All findings flow through the unified Diagnostic type, ensuring
//! consistent formatting across the front end and the two analysis shells.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic schema version
pub const DIAG_VERSION: u32 = 1;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Hard error
    #[serde(rename = "error")]
    Error,
    /// Warning that doesn't fail analysis
    #[serde(rename = "warning")]
    Warning,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message (error or warning)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic schema version
    pub diag_version: u32,
    /// Severity level
    pub level: DiagnosticLevel,
    /// Error code (e.g., "PF1001")
    pub code: String,
    /// Main diagnostic message
    pub message: String,
    /// File path
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Length of error span
    pub length: usize,
    /// Source line string
    pub snippet: String,
    /// Short label for caret range
    pub label: String,
    /// Additional notes (optional)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
    /// Suggested fix (optional)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            diag_version: DIAG_VERSION,
            level: DiagnosticLevel::Error,
            code: code.into(),
            message: message.into(),
            file: "<unknown>".to_string(),
            line: 1,
            column: span.start + 1,
            length: span.len(),
            snippet: String::new(),
            label: String::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    /// Create a new error diagnostic (uses generic error code)
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::error_with_code(error_codes::GENERIC_ERROR, message, span)
    }

    /// Set the file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Set the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Set the column number
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    /// Set the snippet (source line)
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the label (caret description)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a help message
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Fill file, line, column, and snippet from a source unit's text
    pub fn with_location(mut self, file: &str, source: &str, span: Span) -> Self {
        let (line, column) = offset_to_line_col(source, span.start);
        self.file = file.to_string();
        self.line = line;
        self.column = column;
        self.snippet = extract_snippet(source, line).to_string();
        self
    }

    /// Format as human-readable string
    pub fn to_human_string(&self) -> String {
        let mut output = String::new();

        // Header: error[PF1001]: cannot assign ...
        output.push_str(&format!(
            "{}[{}]: {}\n",
            self.level, self.code, self.message
        ));

        // Location: --> path/to/file.pf:12:9
        output.push_str(&format!(
            "  --> {}:{}:{}\n",
            self.file, self.line, self.column
        ));

        // Snippet with caret
        if !self.snippet.is_empty() {
            output.push_str("   |\n");
            output.push_str(&format!("{:>2} | {}\n", self.line, self.snippet));

            if self.length > 0 {
                let padding = " ".repeat(self.column.saturating_sub(1));
                let carets = "^".repeat(self.length);
                output.push_str(&format!("   | {}{}", padding, carets));

                if !self.label.is_empty() {
                    output.push_str(&format!(" {}", self.label));
                }
                output.push('\n');
            }
        }

        for note in &self.notes {
            output.push_str(&format!("   = note: {}\n", note));
        }

        if let Some(help) = &self.help {
            output.push_str(&format!("   = help: {}\n", help));
        }

        output
    }

    /// Format as JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Convert a byte offset to a 1-based (line, column) pair
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (pos, ch) in source.char_indices() {
        if pos >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Extract the given 1-based line from the source text
pub fn extract_snippet(source: &str, line: usize) -> &str {
    source.lines().nth(line.saturating_sub(1)).unwrap_or("")
}

/// Sort diagnostics by level (errors first), then by location
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        match (a.level, b.level) {
            (DiagnosticLevel::Error, DiagnosticLevel::Warning) => std::cmp::Ordering::Less,
            (DiagnosticLevel::Warning, DiagnosticLevel::Error) => std::cmp::Ordering::Greater,
            _ => {
                // Same level: sort by file, line, column
                a.file
                    .cmp(&b.file)
                    .then(a.line.cmp(&b.line))
                    .then(a.column.cmp(&b.column))
            }
        }
    });
}

/// Error code registry
pub mod error_codes {
    // PF0xxx - Syntax errors from the front end
    pub const SYNTAX_ERROR: &str = "PF0001";
    pub const UNEXPECTED_TOKEN: &str = "PF0002";
    pub const UNTERMINATED_STRING: &str = "PF0003";
    pub const UNEXPECTED_CHARACTER: &str = "PF0004";

    // PF1xxx - Frozen-parameter rule
    /// Member write on a frozen parameter, reported by the per-edit shell
    pub const FROZEN_PARAM_MUTATION: &str = "PF1001";
    /// Member write on a frozen parameter, reported by the whole-unit shell
    pub const FROZEN_PARAM_MUTATION_BATCH: &str = "PF1002";

    // PF9xxx - Internal
    pub const GENERIC_ERROR: &str = "PF9999";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::error("test error", Span::new(0, 5));
        assert_eq!(diag.level, DiagnosticLevel::Error);
        assert_eq!(diag.message, "test error");
        assert_eq!(diag.diag_version, DIAG_VERSION);
    }

    #[test]
    fn test_builder_pattern() {
        let diag = Diagnostic::error_with_code(error_codes::FROZEN_PARAM_MUTATION, "x", Span::new(0, 4))
            .with_file("main.pf")
            .with_line(10)
            .with_snippet("cfg.retries = 3;")
            .with_label("frozen parameter")
            .with_note("`cfg` is declared @frozen")
            .with_help("remove the @frozen annotation");

        assert_eq!(diag.file, "main.pf");
        assert_eq!(diag.line, 10);
        assert_eq!(diag.notes.len(), 1);
        assert!(diag.help.is_some());
    }

    #[test]
    fn test_human_format() {
        let diag = Diagnostic::error_with_code("PF1001", "cannot assign to member", Span::new(4, 19))
            .with_file("main.pf")
            .with_line(2)
            .with_column(5)
            .with_snippet("    cfg.retries = 3;")
            .with_label("frozen parameter mutated here");

        let output = diag.to_human_string();
        assert!(output.contains("error[PF1001]"));
        assert!(output.contains("main.pf:2:5"));
        assert!(output.contains("^^^^^^^^^^^^^^^"));
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "fn f(a) {\n    a.x = 1;\n}\n";
        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 14), (2, 5));
    }

    #[test]
    fn test_extract_snippet() {
        let source = "line one\nline two\nline three";
        assert_eq!(extract_snippet(source, 2), "line two");
        assert_eq!(extract_snippet(source, 9), "");
    }

    #[test]
    fn test_json_format() {
        let diag = Diagnostic::error_with_code("PF1002", "msg", Span::new(0, 5)).with_file("a.pf");
        let json = diag.to_json_string().unwrap();
        assert!(json.contains("\"diag_version\": 1"));
        assert!(json.contains("\"level\": \"error\""));
        assert!(json.contains("\"code\": \"PF1002\""));
    }

    #[test]
    fn test_json_roundtrip() {
        let diag = Diagnostic::error_with_code("PF1001", "msg", Span::new(0, 5))
            .with_file("a.pf")
            .with_line(3);
        let json = diag.to_json_string().unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn test_sort_diagnostics() {
        let mut diagnostics = vec![
            Diagnostic::error("b", Span::new(0, 1)).with_file("b.pf").with_line(1),
            Diagnostic::error("a", Span::new(0, 1)).with_file("a.pf").with_line(9),
            Diagnostic::error("a-first", Span::new(0, 1)).with_file("a.pf").with_line(2),
        ];

        sort_diagnostics(&mut diagnostics);

        assert_eq!(diagnostics[0].message, "a-first");
        assert_eq!(diagnostics[1].message, "a");
        assert_eq!(diagnostics[2].message, "b");
    }
}
