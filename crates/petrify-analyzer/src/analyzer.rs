//! Invocation shells over the shared scan/collect core
//!
//! Two drivers, one detection semantics. The per-edit shell re-analyzes
//! the single function an edit landed in; the batch shell sweeps a whole
//! unit (or several). They differ only in scope and diagnostic code, so
//! host tooling can tell the pipelines apart and deduplicate. Every entry
//! point is a pure function of its inputs; concurrent calls over
//! independent units need no coordination.

use crate::binder::Binder;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::marker::MarkerTable;
use crate::span::Span;
use crate::unit::SourceUnit;
use crate::violation::{collect, Violation};

/// Collect every violation in a unit, in source order
pub fn collect_violations(unit: &SourceUnit) -> Vec<Violation> {
    let bindings = Binder::new().bind(&unit.program);
    let markers = MarkerTable::from_program(&unit.program);

    unit.program
        .functions()
        .flat_map(|func| collect(func, &bindings, &markers))
        .collect()
}

/// Per-edit shell: diagnostics for the single function containing
/// `edit_span` (the span of an edited assignment node).
///
/// Recomputed from scratch on every call; functions are small and the
/// scan is cheap, so there is no incremental cache to invalidate.
pub fn analyze_edit(unit: &SourceUnit, edit_span: Span) -> Vec<Diagnostic> {
    let func = match unit.function_at(edit_span) {
        Some(func) => func,
        None => return Vec::new(),
    };

    let bindings = Binder::new().bind(&unit.program);
    let markers = MarkerTable::from_program(&unit.program);

    collect(func, &bindings, &markers)
        .iter()
        .map(|violation| emit(unit, violation, error_codes::FROZEN_PARAM_MUTATION))
        .collect()
}

/// Batch shell: diagnostics for every function in the unit
pub fn analyze_unit(unit: &SourceUnit) -> Vec<Diagnostic> {
    collect_violations(unit)
        .iter()
        .map(|violation| emit(unit, violation, error_codes::FROZEN_PARAM_MUTATION_BATCH))
        .collect()
}

/// Batch shell over a whole compilation: one unioned report
pub fn analyze_all<'a>(units: impl IntoIterator<Item = &'a SourceUnit>) -> Vec<Diagnostic> {
    units.into_iter().flat_map(analyze_unit).collect()
}

/// Project one violation into a diagnostic. Pure and one-to-one; the
/// frozen-parameter rule is a hard contract, so severity is always Error.
pub fn emit(unit: &SourceUnit, violation: &Violation, code: &str) -> Diagnostic {
    Diagnostic::error_with_code(
        code,
        format!(
            "cannot assign to a member of frozen parameter `{}`",
            violation.param_name
        ),
        violation.span,
    )
    .with_location(&unit.file, &unit.text, violation.span)
    .with_label(format!("`{}` is frozen", violation.param_name))
    .with_help(format!(
        "remove the marker annotation from parameter `{}` of `{}`",
        violation.param_name, violation.function_name
    ))
}
