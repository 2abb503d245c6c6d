//! Mutation scan over a function body
//!
//! Finds every assignment whose target is a member of a frozen parameter.
//! The scan is deliberately shallow: only `param.member = value` counts.
//! A chained target like `param.inner.member = value` mutates an object
//! reached *through* the parameter, not the parameter binding itself, and
//! is out of scope for this rule.

use crate::ast::{Block, Expr, Stmt};
use crate::marker::MarkerTable;
use crate::span::Span;
use crate::symbol::{SymbolKind, SymbolResolver};

/// One member write on a frozen parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Span of the whole assignment expression
    pub span: Span,
    /// Declared name of the mutated parameter
    pub param: String,
}

/// Scan a function body for member writes on frozen parameters.
///
/// Findings come back in source order (document order of the assignment
/// nodes), at every nesting depth. Assignments that are not member writes,
/// or whose base does not resolve to a frozen parameter, are skipped
/// silently; the scan never fails.
pub fn scan(body: &Block, resolver: &dyn SymbolResolver, markers: &MarkerTable) -> Vec<Finding> {
    let mut findings = Vec::new();
    scan_block(body, resolver, markers, &mut findings);
    findings
}

fn scan_block(
    block: &Block,
    resolver: &dyn SymbolResolver,
    markers: &MarkerTable,
    findings: &mut Vec<Finding>,
) {
    for stmt in &block.stmts {
        scan_stmt(stmt, resolver, markers, findings);
    }
}

fn scan_stmt(
    stmt: &Stmt,
    resolver: &dyn SymbolResolver,
    markers: &MarkerTable,
    findings: &mut Vec<Finding>,
) {
    match stmt {
        Stmt::Assign(assign) => {
            // The target must be a member access with a plain identifier
            // base. Anything else (plain name, index, chained member) is
            // not a candidate for this rule.
            let member = match &assign.target {
                Expr::Member(member) => member,
                _ => return,
            };
            if !matches!(member.object.as_ref(), Expr::Identifier(_)) {
                return;
            }

            let symbol = match resolver.resolve(&member.object) {
                Some(symbol) => symbol,
                None => return,
            };
            if symbol.kind != SymbolKind::Parameter {
                return;
            }

            if markers.has_marker(symbol) {
                findings.push(Finding {
                    span: assign.span,
                    param: symbol.name.clone(),
                });
            }
        }
        Stmt::If(if_stmt) => {
            scan_block(&if_stmt.then_block, resolver, markers, findings);
            if let Some(else_block) = &if_stmt.else_block {
                scan_block(else_block, resolver, markers, findings);
            }
        }
        Stmt::While(while_stmt) => {
            scan_block(&while_stmt.body, resolver, markers, findings);
        }
        Stmt::Block(block) => {
            scan_block(block, resolver, markers, findings);
        }
        Stmt::Let(_) | Stmt::Expr(_) | Stmt::Return(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FunctionDecl, Program};
    use crate::binder::Binder;
    use crate::lexer::Lexer;
    use crate::marker::MARKER;
    use crate::parser::Parser;
    use crate::symbol::{Bindings, Symbol};

    fn setup(source: &str) -> (Program, Bindings, MarkerTable) {
        let mut lexer = Lexer::new(source);
        let (tokens, _) = lexer.tokenize();
        let mut parser = Parser::new(tokens);
        let (program, diags) = parser.parse();
        assert!(diags.is_empty(), "parse errors: {:?}", diags);
        let bindings = Binder::new().bind(&program);
        let markers = MarkerTable::from_program(&program);
        (program, bindings, markers)
    }

    fn first_function(program: &Program) -> &FunctionDecl {
        program.functions().next().expect("no function")
    }

    #[test]
    fn test_direct_member_write_found() {
        let source = "fn f(@frozen a, b) { a.x = 1; b.x = 2; }";
        let (program, bindings, markers) = setup(source);
        let func = first_function(&program);

        let findings = scan(&func.body, &bindings, &markers);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].param, "a");
        assert_eq!(&source[findings[0].span.start..findings[0].span.end], "a.x = 1");
    }

    #[test]
    fn test_chained_access_not_flagged() {
        let (program, bindings, markers) = setup("fn f(@frozen a) { a.inner.x = 1; }");
        let func = first_function(&program);

        assert!(scan(&func.body, &bindings, &markers).is_empty());
    }

    #[test]
    fn test_plain_and_index_targets_skipped() {
        let source = "fn f(@frozen a) { a = make(); a[0] = 1; }";
        let (program, bindings, markers) = setup(source);
        let func = first_function(&program);

        assert!(scan(&func.body, &bindings, &markers).is_empty());
    }

    #[test]
    fn test_nested_assignments_found_in_source_order() {
        let source = "fn f(@frozen a) {\n    if (a.ready) {\n        a.x = 1;\n    } else {\n        a.y = 2;\n    }\n    while (a.busy) {\n        { a.z = 3; }\n    }\n}";
        let (program, bindings, markers) = setup(source);
        let func = first_function(&program);

        let findings = scan(&func.body, &bindings, &markers);
        let params: Vec<&str> = findings
            .iter()
            .map(|f| &source[f.span.start..f.span.end])
            .collect();
        assert_eq!(params, vec!["a.x = 1", "a.y = 2", "a.z = 3"]);

        let mut spans: Vec<usize> = findings.iter().map(|f| f.span.start).collect();
        let sorted = {
            let mut s = spans.clone();
            s.sort_unstable();
            s
        };
        assert_eq!(spans, sorted);
        spans.dedup();
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn test_local_shadow_suppresses_finding() {
        let (program, bindings, markers) =
            setup("fn f(@frozen a) { let a = make(); a.x = 1; }");
        let func = first_function(&program);

        assert!(scan(&func.body, &bindings, &markers).is_empty());
    }

    #[test]
    fn test_unmarked_param_not_flagged() {
        let (program, bindings, markers) = setup("fn f(a) { a.x = 1; }");
        let func = first_function(&program);

        assert!(scan(&func.body, &bindings, &markers).is_empty());
    }

    #[test]
    fn test_unresolved_base_skipped() {
        let (program, bindings, markers) = setup("fn f(@frozen a) { ghost.x = 1; }");
        let func = first_function(&program);

        assert!(scan(&func.body, &bindings, &markers).is_empty());
    }

    #[test]
    fn test_synthetic_bindings() {
        // The scan only depends on the resolver capability: a hand-built
        // table works as well as the real binder.
        let source = "fn f(a) { a.x = 1; }";
        let mut lexer = Lexer::new(source);
        let (tokens, _) = lexer.tokenize();
        let mut parser = Parser::new(tokens);
        let (program, _) = parser.parse();
        let func = program.functions().next().unwrap();

        // `a` in `a.x` sits at offset 10
        let mut bindings = Bindings::new();
        bindings.insert(
            Span::new(10, 11),
            Symbol::parameter("a", Span::new(5, 6)).with_annotation(MARKER),
        );

        let findings = scan(&func.body, &bindings, &MarkerTable::builtin());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].param, "a");
    }
}
