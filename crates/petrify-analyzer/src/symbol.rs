//! Symbols and the resolver capability
//!
//! The mutation scan never inspects scopes itself. It asks a
//! [`SymbolResolver`] what an expression denotes, which keeps the detection
//! logic independent of any particular binder: production code hands it the
//! table built by [`crate::binder::Binder`], tests can hand it a
//! hand-populated [`Bindings`].

use crate::ast::Expr;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Symbol information for a resolved name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol name
    pub name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Declaration location
    pub decl_span: Span,
    /// Resolved canonical annotation names on the declaration.
    ///
    /// Aliased annotations are stored under their canonical name, so marker
    /// checks compare identities rather than source text.
    pub annotations: Vec<String>,
}

impl Symbol {
    /// Create a parameter symbol
    pub fn parameter(name: impl Into<String>, decl_span: Span) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Parameter,
            decl_span,
            annotations: Vec::new(),
        }
    }

    /// Create a local binding symbol
    pub fn local(name: impl Into<String>, decl_span: Span) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Local,
            decl_span,
            annotations: Vec::new(),
        }
    }

    /// Attach a resolved annotation name
    pub fn with_annotation(mut self, name: impl Into<String>) -> Self {
        self.annotations.push(name.into());
        self
    }
}

/// Symbol classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Function parameter
    Parameter,
    /// Local binding introduced by `let`
    Local,
    /// Function declaration
    Function,
}

/// Capability to resolve an expression to the symbol it denotes.
///
/// Resolution is total but partial in its answer: `None` means "not a
/// candidate" (unbound name, non-identifier expression), never an error.
pub trait SymbolResolver {
    /// Resolve the symbol an expression refers to, if any
    fn resolve(&self, expr: &Expr) -> Option<&Symbol>;
}

/// Symbol bindings keyed by identifier occurrence.
///
/// An identifier occurrence is uniquely identified by its source span, which
/// stays valid as long as the tree it came from does.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    map: HashMap<Span, Symbol>,
}

impl Bindings {
    /// Create an empty bindings table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the identifier occurrence at `span` denotes `symbol`
    pub fn insert(&mut self, span: Span, symbol: Symbol) {
        self.map.insert(span, symbol);
    }

    /// Number of bound occurrences
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no occurrences are bound
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl SymbolResolver for Bindings {
    fn resolve(&self, expr: &Expr) -> Option<&Symbol> {
        match expr {
            Expr::Identifier(ident) => self.map.get(&ident.span),
            _ => None,
        }
    }
}
