//! Source units: one parsed compilation input
//!
//! A `SourceUnit` owns its text and its tree and is never mutated in
//! place. The rewriter in `fix` produces a fresh unit for every edit.

use crate::ast::{FunctionDecl, Program};
use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::span::Span;

/// An immutable parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    /// File path (or a synthetic name like `<memory>`)
    pub file: String,
    /// Full source text; all spans index into this
    pub text: String,
    /// Parsed tree
    pub program: Program,
}

impl SourceUnit {
    /// Parse source text into a unit, returning syntax diagnostics
    /// alongside. A recovering parse still yields a usable unit.
    pub fn parse(file: impl Into<String>, text: impl Into<String>) -> (Self, Vec<Diagnostic>) {
        let file = file.into();
        let text = text.into();

        let mut lexer = Lexer::new(text.clone());
        let (tokens, mut diagnostics) = lexer.tokenize();

        let mut parser = Parser::new(tokens);
        let (program, parse_diagnostics) = parser.parse();
        diagnostics.extend(parse_diagnostics);

        let diagnostics = diagnostics
            .into_iter()
            .map(|diag| diag.with_file(file.clone()))
            .collect();

        (
            Self {
                file,
                text,
                program,
            },
            diagnostics,
        )
    }

    /// The function declaration whose span contains `span`, if any.
    /// Used by the per-edit shell to scope analysis to one function.
    pub fn function_at(&self, span: Span) -> Option<&FunctionDecl> {
        self.program.functions().find(|func| func.span.contains(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_source() {
        let (unit, diags) = SourceUnit::parse("main.pf", "fn f(@frozen a) { a.x = 1; }");
        assert!(diags.is_empty());
        assert_eq!(unit.program.functions().count(), 1);
    }

    #[test]
    fn test_syntax_diagnostics_carry_file() {
        let (_, diags) = SourceUnit::parse("broken.pf", "fn f( { }");
        assert!(!diags.is_empty());
        assert!(diags.iter().all(|d| d.file == "broken.pf"));
    }

    #[test]
    fn test_function_at() {
        let source = "fn f(a) { a.x = 1; }\nfn g(b) { b.y = 2; }";
        let (unit, _) = SourceUnit::parse("main.pf", source);

        let in_g = source.find("b.y").unwrap();
        let func = unit.function_at(Span::new(in_g, in_g + 3)).unwrap();
        assert_eq!(func.name.name, "g");

        // The newline between the two functions belongs to neither
        let gap = source.find('\n').unwrap();
        assert!(unit.function_at(Span::new(gap, gap + 1)).is_none());
    }
}
