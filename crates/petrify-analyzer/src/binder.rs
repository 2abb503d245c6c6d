//! Name binding and scope resolution
//!
//! The binder performs two-pass analysis:
//! 1. Collect all top-level function declarations (hoisting)
//! 2. Walk every function body, resolving identifier occurrences
//!
//! The result is a [`Bindings`] table mapping identifier occurrences (by
//! span) to the symbols they denote. Unresolved names are simply left
//! unbound; the analysis treats them as non-candidates rather than errors.

use crate::ast::*;
use crate::marker::{MarkerTable, MARKER};
use crate::symbol::{Bindings, Symbol, SymbolKind};
use std::collections::HashMap;

/// Binder for name resolution and scope management
pub struct Binder {
    /// Names that denote the frozen marker in this program
    markers: MarkerTable,
    /// Stack of scopes (innermost last)
    scopes: Vec<HashMap<String, Symbol>>,
    /// Resolved identifier occurrences
    bindings: Bindings,
}

impl Binder {
    /// Create a new binder
    pub fn new() -> Self {
        Self {
            markers: MarkerTable::builtin(),
            scopes: Vec::new(),
            bindings: Bindings::new(),
        }
    }

    /// Bind a program, resolving every identifier occurrence it can
    pub fn bind(&mut self, program: &Program) -> Bindings {
        self.markers = MarkerTable::from_program(program);

        // Phase 1: hoist function names into the global scope
        let mut globals = HashMap::new();
        for func in program.functions() {
            globals.insert(
                func.name.name.clone(),
                Symbol {
                    name: func.name.name.clone(),
                    kind: SymbolKind::Function,
                    decl_span: func.name.span,
                    annotations: Vec::new(),
                },
            );
        }
        self.scopes = vec![globals];

        // Phase 2: bind every function body
        for func in program.functions() {
            self.bind_function(func);
        }

        self.scopes.clear();
        std::mem::take(&mut self.bindings)
    }

    /// Bind one function: parameters plus body
    fn bind_function(&mut self, func: &FunctionDecl) {
        self.push_scope();

        for param in &func.params {
            let mut symbol = Symbol::parameter(param.name.name.clone(), param.span);
            for ann in &param.annotations {
                // Store the canonical marker name so downstream checks
                // compare identities, not source spellings.
                if self.markers.is_marker(&ann.name.name) {
                    symbol.annotations.push(MARKER.to_string());
                } else {
                    symbol.annotations.push(ann.name.name.clone());
                }
            }
            self.define(symbol);
        }

        self.bind_block_stmts(&func.body);
        self.pop_scope();
    }

    /// Bind the statements of a block without opening a new scope
    /// (the caller decides scope boundaries)
    fn bind_block_stmts(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.bind_stmt(stmt);
        }
    }

    fn bind_block(&mut self, block: &Block) {
        self.push_scope();
        self.bind_block_stmts(block);
        self.pop_scope();
    }

    fn bind_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(let_stmt) => {
                // The initializer sees the environment before the binding
                self.bind_expr(&let_stmt.init);
                self.define(Symbol::local(let_stmt.name.name.clone(), let_stmt.span));
            }
            Stmt::Assign(assign) => {
                self.bind_expr(&assign.target);
                self.bind_expr(&assign.value);
            }
            Stmt::Expr(expr_stmt) => self.bind_expr(&expr_stmt.expr),
            Stmt::If(if_stmt) => {
                self.bind_expr(&if_stmt.condition);
                self.bind_block(&if_stmt.then_block);
                if let Some(else_block) = &if_stmt.else_block {
                    self.bind_block(else_block);
                }
            }
            Stmt::While(while_stmt) => {
                self.bind_expr(&while_stmt.condition);
                self.bind_block(&while_stmt.body);
            }
            Stmt::Return(return_stmt) => {
                if let Some(value) = &return_stmt.value {
                    self.bind_expr(value);
                }
            }
            Stmt::Block(block) => self.bind_block(block),
        }
    }

    fn bind_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier(ident) => {
                if let Some(symbol) = self.lookup(&ident.name) {
                    let symbol = symbol.clone();
                    self.bindings.insert(ident.span, symbol);
                }
            }
            Expr::Member(member) => {
                // Only the base expression names a symbol; the member name
                // is resolved against the base's type, which this analysis
                // never needs.
                self.bind_expr(&member.object);
            }
            Expr::Index(index) => {
                self.bind_expr(&index.target);
                self.bind_expr(&index.index);
            }
            Expr::Call(call) => {
                self.bind_expr(&call.callee);
                for arg in &call.args {
                    self.bind_expr(arg);
                }
            }
            Expr::Binary(binary) => {
                self.bind_expr(&binary.left);
                self.bind_expr(&binary.right);
            }
            Expr::Literal(_, _) => {}
        }
    }

    // === Scope helpers ===

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn define(&mut self, symbol: Symbol) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(symbol.name.clone(), symbol);
        }
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::symbol::SymbolResolver;

    fn bind(source: &str) -> (Program, Bindings) {
        let mut lexer = Lexer::new(source);
        let (tokens, _) = lexer.tokenize();
        let mut parser = Parser::new(tokens);
        let (program, diags) = parser.parse();
        assert!(diags.is_empty(), "parse errors: {:?}", diags);
        let bindings = Binder::new().bind(&program);
        (program, bindings)
    }

    /// The base identifier of the first assignment target in the function
    fn first_assign_base(func: &FunctionDecl) -> &Expr {
        for stmt in &func.body.stmts {
            if let Stmt::Assign(assign) = stmt {
                if let Expr::Member(member) = &assign.target {
                    return &member.object;
                }
            }
        }
        panic!("no member assignment found");
    }

    #[test]
    fn test_param_resolution() {
        let (program, bindings) = bind("fn f(@frozen a) { a.x = 1; }");
        let func = program.functions().next().unwrap();
        let base = first_assign_base(func);

        let symbol = bindings.resolve(base).unwrap();
        assert_eq!(symbol.kind, SymbolKind::Parameter);
        assert_eq!(symbol.annotations, vec![MARKER.to_string()]);
    }

    #[test]
    fn test_local_shadows_param() {
        let (program, bindings) =
            bind("fn f(@frozen a) { let a = make(); a.x = 1; }");
        let func = program.functions().next().unwrap();
        let base = first_assign_base(func);

        let symbol = bindings.resolve(base).unwrap();
        assert_eq!(symbol.kind, SymbolKind::Local);
    }

    #[test]
    fn test_use_before_shadow_resolves_to_param() {
        let (program, bindings) =
            bind("fn f(@frozen a) { a.x = 1; let a = make(); }");
        let func = program.functions().next().unwrap();
        let base = first_assign_base(func);

        assert_eq!(bindings.resolve(base).unwrap().kind, SymbolKind::Parameter);
    }

    #[test]
    fn test_block_scope_shadow_expires() {
        // The shadow inside the block must not leak back out
        let source = "fn f(@frozen a) { { let a = make(); a.x = 1; } a.y = 2; }";
        let (program, bindings) = bind(source);
        let func = program.functions().next().unwrap();

        // Second assignment is the outer `a.y = 2;`
        let outer = match &func.body.stmts[1] {
            Stmt::Assign(assign) => match &assign.target {
                Expr::Member(member) => member.object.as_ref(),
                other => panic!("expected member target, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        };

        assert_eq!(bindings.resolve(outer).unwrap().kind, SymbolKind::Parameter);
    }

    #[test]
    fn test_unbound_name_left_unresolved() {
        let (program, bindings) = bind("fn f(a) { ghost.x = 1; }");
        let func = program.functions().next().unwrap();
        let base = first_assign_base(func);
        assert!(bindings.resolve(base).is_none());
    }

    #[test]
    fn test_aliased_marker_stored_canonically() {
        let (program, bindings) =
            bind("use frozen as immutable;\nfn f(@immutable a) { a.x = 1; }");
        let func = program.functions().next().unwrap();
        let base = first_assign_base(func);

        let symbol = bindings.resolve(base).unwrap();
        assert_eq!(symbol.annotations, vec![MARKER.to_string()]);
    }

    #[test]
    fn test_params_scoped_per_function() {
        let source = "fn f(@frozen a) { }\nfn g(a) { a.x = 1; }";
        let (program, bindings) = bind(source);
        let g = program.functions().nth(1).unwrap();
        let base = first_assign_base(g);

        let symbol = bindings.resolve(base).unwrap();
        assert!(symbol.annotations.is_empty());
    }
}
