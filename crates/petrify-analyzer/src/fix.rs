//! Annotation removal: the one mechanical fix for a frozen-parameter
//! violation
//!
//! Given a violation, produce a new [`SourceUnit`] whose only difference
//! from the old one is that the marker annotation is gone from the
//! offending parameter. The new unit's tree is rebuilt along the edited
//! spine with every span rebased onto the new text, so follow-up fixes
//! can re-locate their targets without a re-parse.

use crate::ast::*;
use crate::marker::MarkerTable;
use crate::span::Span;
use crate::unit::SourceUnit;
use crate::violation::Violation;
use thiserror::Error;

/// Failure to apply a fix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    /// The violation is stale: its function no longer declares a parameter
    /// by that name carrying the marker.
    #[error("no parameter `{param}` with the frozen marker found in function `{function}`")]
    TargetNotFound { function: String, param: String },
}

/// Remove the marker annotation named by `violation` from `unit`.
///
/// Exactly one annotation is removed, on exactly one parameter; every
/// other byte of the source survives unchanged. The parameter must match
/// the violation by name *and* carry the marker, so a same-named parameter
/// of another function (or an already-fixed one) is never touched.
pub fn remove_marker(unit: &SourceUnit, violation: &Violation) -> Result<SourceUnit, FixError> {
    let markers = MarkerTable::from_program(&unit.program);

    let target = locate_target(&unit.program, &markers, violation).ok_or_else(|| {
        FixError::TargetNotFound {
            function: violation.function_name.clone(),
            param: violation.param_name.clone(),
        }
    })?;

    // Cut the annotation plus the spacing that separated it from what
    // follows, so `(@frozen a)` becomes `(a)` rather than `( a)`.
    let mut cut = target.annotation_span;
    let bytes = unit.text.as_bytes();
    while cut.end < bytes.len() && (bytes[cut.end] == b' ' || bytes[cut.end] == b'\t') {
        cut.end += 1;
    }

    let mut text = String::with_capacity(unit.text.len() - cut.len());
    text.push_str(&unit.text[..cut.start]);
    text.push_str(&unit.text[cut.end..]);

    let mut program = unit.program.clone();
    if let Some(Item::Function(func)) = program.items.get_mut(target.item_index) {
        if let Some(param) = func.params.get_mut(target.param_index) {
            param
                .annotations
                .retain(|ann| ann.span != target.annotation_span);
        }
    }
    rebase_program(&mut program, cut);

    Ok(SourceUnit {
        file: unit.file.clone(),
        text,
        program,
    })
}

/// Location of the annotation to strip
struct FixTarget {
    item_index: usize,
    param_index: usize,
    annotation_span: Span,
}

/// Find the first function with the violation's name that declares a
/// parameter with the violation's name carrying the marker.
fn locate_target(
    program: &Program,
    markers: &MarkerTable,
    violation: &Violation,
) -> Option<FixTarget> {
    for (item_index, item) in program.items.iter().enumerate() {
        let func = match item {
            Item::Function(func) if func.name.name == violation.function_name => func,
            _ => continue,
        };
        for (param_index, param) in func.params.iter().enumerate() {
            if param.name.name != violation.param_name {
                continue;
            }
            if let Some(annotation) = markers.marker_annotation(param) {
                return Some(FixTarget {
                    item_index,
                    param_index,
                    annotation_span: annotation.span,
                });
            }
        }
    }
    None
}

// === Span rebasing ===
//
// After cutting `cut` out of the text, an offset at or past the cut moves
// left by the cut length, an offset before the cut stays put, and an
// offset inside the cut (only the removed annotation had those) collapses
// onto the cut start. Enclosing spans shrink naturally because start and
// end are mapped independently.

fn rebase_offset(offset: usize, cut: Span) -> usize {
    if offset >= cut.end {
        offset - cut.len()
    } else if offset > cut.start {
        cut.start
    } else {
        offset
    }
}

fn rebase_span(span: &mut Span, cut: Span) {
    span.start = rebase_offset(span.start, cut);
    span.end = rebase_offset(span.end, cut);
}

fn rebase_program(program: &mut Program, cut: Span) {
    for item in &mut program.items {
        match item {
            Item::Function(func) => rebase_function(func, cut),
            Item::MarkerAlias(alias) => {
                rebase_span(&mut alias.target.span, cut);
                rebase_span(&mut alias.alias.span, cut);
                rebase_span(&mut alias.span, cut);
            }
        }
    }
}

fn rebase_function(func: &mut FunctionDecl, cut: Span) {
    rebase_span(&mut func.name.span, cut);
    for param in &mut func.params {
        for annotation in &mut param.annotations {
            rebase_span(&mut annotation.name.span, cut);
            rebase_span(&mut annotation.span, cut);
        }
        rebase_span(&mut param.name.span, cut);
        if let Some(type_ref) = &mut param.type_ref {
            rebase_span(&mut type_ref.name.span, cut);
            rebase_span(&mut type_ref.span, cut);
        }
        rebase_span(&mut param.span, cut);
    }
    rebase_block(&mut func.body, cut);
    rebase_span(&mut func.span, cut);
}

fn rebase_block(block: &mut Block, cut: Span) {
    for stmt in &mut block.stmts {
        rebase_stmt(stmt, cut);
    }
    rebase_span(&mut block.span, cut);
}

fn rebase_stmt(stmt: &mut Stmt, cut: Span) {
    match stmt {
        Stmt::Let(let_stmt) => {
            rebase_span(&mut let_stmt.name.span, cut);
            rebase_expr(&mut let_stmt.init, cut);
            rebase_span(&mut let_stmt.span, cut);
        }
        Stmt::Assign(assign) => {
            rebase_expr(&mut assign.target, cut);
            rebase_expr(&mut assign.value, cut);
            rebase_span(&mut assign.span, cut);
        }
        Stmt::Expr(expr_stmt) => {
            rebase_expr(&mut expr_stmt.expr, cut);
            rebase_span(&mut expr_stmt.span, cut);
        }
        Stmt::If(if_stmt) => {
            rebase_expr(&mut if_stmt.condition, cut);
            rebase_block(&mut if_stmt.then_block, cut);
            if let Some(else_block) = &mut if_stmt.else_block {
                rebase_block(else_block, cut);
            }
            rebase_span(&mut if_stmt.span, cut);
        }
        Stmt::While(while_stmt) => {
            rebase_expr(&mut while_stmt.condition, cut);
            rebase_block(&mut while_stmt.body, cut);
            rebase_span(&mut while_stmt.span, cut);
        }
        Stmt::Return(return_stmt) => {
            if let Some(value) = &mut return_stmt.value {
                rebase_expr(value, cut);
            }
            rebase_span(&mut return_stmt.span, cut);
        }
        Stmt::Block(block) => rebase_block(block, cut),
    }
}

fn rebase_expr(expr: &mut Expr, cut: Span) {
    match expr {
        Expr::Literal(_, span) => rebase_span(span, cut),
        Expr::Identifier(ident) => rebase_span(&mut ident.span, cut),
        Expr::Member(member) => {
            rebase_expr(&mut member.object, cut);
            rebase_span(&mut member.member.span, cut);
            rebase_span(&mut member.span, cut);
        }
        Expr::Index(index) => {
            rebase_expr(&mut index.target, cut);
            rebase_expr(&mut index.index, cut);
            rebase_span(&mut index.span, cut);
        }
        Expr::Call(call) => {
            rebase_expr(&mut call.callee, cut);
            for arg in &mut call.args {
                rebase_expr(arg, cut);
            }
            rebase_span(&mut call.span, cut);
        }
        Expr::Binary(binary) => {
            rebase_expr(&mut binary.left, cut);
            rebase_expr(&mut binary.right, cut);
            rebase_span(&mut binary.span, cut);
        }
    }
}
