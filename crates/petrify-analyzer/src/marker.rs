//! The frozen marker and its alias table
//!
//! `@frozen` on a parameter forbids member writes through that parameter
//! inside the function body. A program may rename the marker with
//! `use frozen as X;`; every check below goes through the resolved alias
//! table, so a lookalike name that was never declared as an alias does not
//! count as the marker.

use crate::ast::{Annotation, Param, Program};
use crate::symbol::Symbol;
use std::collections::HashSet;

/// Canonical name of the marker annotation
pub const MARKER: &str = "frozen";

/// Resolved set of names that denote the marker in one program
#[derive(Debug, Clone)]
pub struct MarkerTable {
    names: HashSet<String>,
}

impl MarkerTable {
    /// Table containing only the builtin marker name
    pub fn builtin() -> Self {
        let mut names = HashSet::new();
        names.insert(MARKER.to_string());
        Self { names }
    }

    /// Build the table for a program, folding in its alias declarations.
    ///
    /// Aliases resolve transitively in source order: an alias of an alias
    /// of the marker still denotes the marker. An alias whose target never
    /// resolves to the marker is ignored.
    pub fn from_program(program: &Program) -> Self {
        let mut table = Self::builtin();
        for alias in program.marker_aliases() {
            if table.names.contains(&alias.target.name) {
                table.names.insert(alias.alias.name.clone());
            }
        }
        table
    }

    /// Whether an annotation name denotes the marker
    pub fn is_marker(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether a resolved symbol's declaration carries the marker
    pub fn has_marker(&self, symbol: &Symbol) -> bool {
        // The binder stores canonical names, so a plain equality check
        // suffices here.
        symbol.annotations.iter().any(|name| name == MARKER)
    }

    /// Whether a parameter declaration carries the marker
    pub fn param_has_marker(&self, param: &Param) -> bool {
        self.marker_annotation(param).is_some()
    }

    /// The concrete annotation node denoting the marker on a parameter,
    /// if present. This is the node the rewriter strips.
    pub fn marker_annotation<'a>(&self, param: &'a Param) -> Option<&'a Annotation> {
        param
            .annotations
            .iter()
            .find(|ann| self.is_marker(&ann.name.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::span::Span;

    fn parse(source: &str) -> Program {
        let mut lexer = Lexer::new(source);
        let (tokens, _) = lexer.tokenize();
        let mut parser = Parser::new(tokens);
        let (program, diags) = parser.parse();
        assert!(diags.is_empty(), "parse errors: {:?}", diags);
        program
    }

    #[test]
    fn test_builtin_marker() {
        let table = MarkerTable::builtin();
        assert!(table.is_marker("frozen"));
        assert!(!table.is_marker("Frozen"));
        assert!(!table.is_marker("immutable"));
    }

    #[test]
    fn test_alias_resolves_to_marker() {
        let program = parse("use frozen as immutable;\nfn f(@immutable a) { }");
        let table = MarkerTable::from_program(&program);

        assert!(table.is_marker("immutable"));

        let func = program.functions().next().unwrap();
        assert!(table.param_has_marker(&func.params[0]));
    }

    #[test]
    fn test_transitive_alias() {
        let program = parse("use frozen as fixed;\nuse fixed as pinned;\nfn f(a) { }");
        let table = MarkerTable::from_program(&program);
        assert!(table.is_marker("pinned"));
    }

    #[test]
    fn test_unrelated_alias_ignored() {
        let program = parse("use other as immutable;\nfn f(@immutable a) { }");
        let table = MarkerTable::from_program(&program);

        assert!(!table.is_marker("immutable"));

        let func = program.functions().next().unwrap();
        assert!(!table.param_has_marker(&func.params[0]));
    }

    #[test]
    fn test_symbol_marker_check() {
        let table = MarkerTable::builtin();
        let marked = Symbol::parameter("a", Span::new(0, 1)).with_annotation(MARKER);
        let plain = Symbol::parameter("b", Span::new(2, 3));

        assert!(table.has_marker(&marked));
        assert!(!table.has_marker(&plain));
    }

    #[test]
    fn test_marker_annotation_picks_marker_only() {
        let program = parse("fn f(@logged @frozen a) { }");
        let table = MarkerTable::builtin();
        let func = program.functions().next().unwrap();
        let ann = table.marker_annotation(&func.params[0]).unwrap();
        assert_eq!(ann.name.name, "frozen");
    }
}
