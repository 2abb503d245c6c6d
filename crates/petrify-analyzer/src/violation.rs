//! Violations: scan findings anchored to their enclosing function
//!
//! A violation is re-resolvable by construction: `collect` only emits a
//! finding whose parameter is still declared, marker included, on the
//! enclosing function. That guarantee is what makes the annotation-removal
//! rewrite total rather than best-effort.

use crate::ast::FunctionDecl;
use crate::marker::MarkerTable;
use crate::scan::{scan, Finding};
use crate::span::Span;
use crate::symbol::SymbolResolver;
use serde::{Deserialize, Serialize};

/// A member write on a frozen parameter, anchored to its function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Span of the offending assignment expression
    pub span: Span,
    /// Declared name of the mutated parameter
    pub param_name: String,
    /// Name of the enclosing function declaration
    pub function_name: String,
}

/// Collect all violations in one function, in source order.
///
/// An empty result is the expected common case, not an error.
pub fn collect(
    func: &FunctionDecl,
    resolver: &dyn SymbolResolver,
    markers: &MarkerTable,
) -> Vec<Violation> {
    scan(&func.body, resolver, markers)
        .into_iter()
        .filter(|finding| param_still_marked(func, markers, finding))
        .map(|finding| Violation {
            span: finding.span,
            param_name: finding.param,
            function_name: func.name.name.clone(),
        })
        .collect()
}

/// Guard against stale bindings: the parameter must still be declared on
/// the function with the marker present.
fn param_still_marked(func: &FunctionDecl, markers: &MarkerTable, finding: &Finding) -> bool {
    func.params
        .iter()
        .any(|param| param.name.name == finding.param && markers.param_has_marker(param))
}
