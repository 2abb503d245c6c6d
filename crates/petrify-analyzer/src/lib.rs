//! Petrify analyzer - frozen-parameter analysis
//!
//! This library enforces the `@frozen` parameter contract:
//! - Lexing and parsing of Petrify source (with error recovery)
//! - Name binding and marker alias resolution
//! - Detection of member writes on frozen parameters
//! - A mechanical fix that strips the offending annotation
//!
//! Detection runs through two shells sharing one core: a per-edit shell
//! (`analyzer::analyze_edit`) and a whole-unit batch shell
//! (`analyzer::analyze_unit`).

/// Petrify analyzer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod analyzer;
pub mod ast;
pub mod binder;
pub mod diagnostic;
pub mod fix;
pub mod lexer;
pub mod marker;
pub mod parser;
pub mod scan;
pub mod span;
pub mod symbol;
pub mod token;
pub mod unit;
pub mod violation;

// Re-export commonly used types
pub use analyzer::{analyze_all, analyze_edit, analyze_unit, collect_violations};
pub use binder::Binder;
pub use diagnostic::{
    error_codes, sort_diagnostics, Diagnostic, DiagnosticLevel, DIAG_VERSION,
};
pub use fix::{remove_marker, FixError};
pub use lexer::Lexer;
pub use marker::{MarkerTable, MARKER};
pub use parser::Parser;
pub use scan::{scan, Finding};
pub use span::Span;
pub use symbol::{Bindings, Symbol, SymbolKind, SymbolResolver};
pub use token::{Token, TokenKind};
pub use unit::SourceUnit;
pub use violation::{collect, Violation};
