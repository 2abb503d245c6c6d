//! Abstract Syntax Tree (AST) definitions
//!
//! The tree is plain owned data with a span on every node. Analysis never
//! mutates a tree in place; edits rebuild the affected spine and leave the
//! rest structurally identical (see `fix`).

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Top-level program containing all items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Item>,
}

impl Program {
    /// Iterate over all function declarations in source order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(func) => Some(func),
            _ => None,
        })
    }

    /// Iterate over all marker alias declarations in source order
    pub fn marker_aliases(&self) -> impl Iterator<Item = &MarkerAlias> {
        self.items.iter().filter_map(|item| match item {
            Item::MarkerAlias(alias) => Some(alias),
            _ => None,
        })
    }
}

/// Top-level item (function or marker alias)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Function(FunctionDecl),
    MarkerAlias(MarkerAlias),
}

/// Marker alias declaration
///
/// Syntax: `use frozen as Immutable;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerAlias {
    /// The name being aliased (the marker or an earlier alias of it)
    pub target: Identifier,
    /// The new name
    pub alias: Identifier,
    pub span: Span,
}

/// Function declaration
///
/// Syntax: `fn name(@frozen a, b: Type) { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: Identifier,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// Parameter declaration with its annotation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Annotations written on the parameter, in source order
    pub annotations: Vec<Annotation>,
    pub name: Identifier,
    /// Optional type ascription (`: Type`)
    pub type_ref: Option<TypeRef>,
    pub span: Span,
}

/// A single `@name` annotation at a declaration site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: Identifier,
    /// Span of the whole annotation including the `@` sigil
    pub span: Span,
}

/// Type ascription on a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: Identifier,
    pub span: Span,
}

/// Identifier with source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

/// Braced statement block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Let(LetStmt),
    Assign(AssignStmt),
    Expr(ExprStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Block(Block),
}

/// Local binding: `let name = expr;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetStmt {
    pub name: Identifier,
    pub init: Expr,
    pub span: Span,
}

/// Assignment statement: `target = value;`
///
/// The target is an arbitrary expression; classification of what may
/// legally be assigned to happens downstream, so a recovering parse can
/// still produce a tree here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub target: Expr,
    pub value: Expr,
    /// Span of the assignment expression (target through value, no semicolon)
    pub span: Span,
}

/// Expression statement: `expr;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// If statement with optional else block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub span: Span,
}

/// While loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// Return statement with optional value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal, Span),
    Identifier(Identifier),
    Member(MemberExpr),
    Index(IndexExpr),
    Call(CallExpr),
    Binary(BinaryExpr),
}

impl Expr {
    /// Source span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span) => *span,
            Expr::Identifier(ident) => ident.span,
            Expr::Member(member) => member.span,
            Expr::Index(index) => index.span,
            Expr::Call(call) => call.span,
            Expr::Binary(binary) => binary.span,
        }
    }
}

/// Member access expression (`expr.member`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpr {
    /// The target expression (left side of dot)
    pub object: Box<Expr>,
    /// The member name (right side of dot)
    pub member: Identifier,
    pub span: Span,
}

/// Index expression (`expr[index]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExpr {
    pub target: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

/// Function call expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// Binary expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}
