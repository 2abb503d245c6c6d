//! Shared test utilities
//!
//! Helpers for end-to-end tests: parse a source string into a unit and
//! fail loudly on unexpected syntax errors.

use petrify_analyzer::SourceUnit;

// Re-export testing utilities
pub use pretty_assertions::assert_eq;

/// Parse source that is expected to be syntactically clean
pub fn parse_unit(source: &str) -> SourceUnit {
    let (unit, diags) = SourceUnit::parse("test.pf", source);
    assert!(
        diags.is_empty(),
        "unexpected syntax diagnostics: {:#?}",
        diags
    );
    unit
}
