//! Parsing (tokens to AST)
//!
//! Recursive descent for items and statements, Pratt parsing for
//! expressions. The parser recovers at statement boundaries, so a
//! partially invalid source still yields a tree the analysis can walk.

use crate::ast::*;
use crate::diagnostic::{error_codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Parser state for building an AST from tokens
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: Vec<Diagnostic>,
}

/// Operator precedence levels for Pratt parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equality,   // == !=
    Comparison, // < <= > >=
    Term,       // + -
    Factor,     // * /
    Call,       // () [] .
}

impl Parser {
    /// Create a new parser for the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parse tokens into an AST
    pub fn parse(&mut self) -> (Program, Vec<Diagnostic>) {
        let mut items = Vec::new();

        while !self.is_at_end() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(_) => self.synchronize(),
            }
        }

        (Program { items }, std::mem::take(&mut self.diagnostics))
    }

    // === Top-level parsing ===

    /// Parse a top-level item (function or marker alias)
    fn parse_item(&mut self) -> Result<Item, ()> {
        if self.check(TokenKind::Use) {
            Ok(Item::MarkerAlias(self.parse_marker_alias()?))
        } else if self.check(TokenKind::Fn) {
            Ok(Item::Function(self.parse_function()?))
        } else {
            self.error("Expected 'fn' or 'use'");
            Err(())
        }
    }

    /// Parse a marker alias: `use frozen as Immutable;`
    fn parse_marker_alias(&mut self) -> Result<MarkerAlias, ()> {
        let use_span = self.consume(TokenKind::Use, "Expected 'use'")?.span;
        let target = self.parse_identifier_node("the aliased name")?;
        self.consume(TokenKind::As, "Expected 'as'")?;
        let alias = self.parse_identifier_node("the alias name")?;
        let end_span = self
            .consume(TokenKind::Semicolon, "Expected ';' after alias declaration")?
            .span;

        Ok(MarkerAlias {
            target,
            alias,
            span: use_span.merge(end_span),
        })
    }

    /// Parse a function declaration
    fn parse_function(&mut self) -> Result<FunctionDecl, ()> {
        let fn_span = self.consume(TokenKind::Fn, "Expected 'fn'")?.span;
        let name = self.parse_identifier_node("a function name")?;

        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;

        let body = self.parse_block()?;
        let span = fn_span.merge(body.span);

        Ok(FunctionDecl {
            name,
            params,
            body,
            span,
        })
    }

    /// Parse a parameter: `@frozen name` or `name: Type`
    fn parse_param(&mut self) -> Result<Param, ()> {
        let mut annotations = Vec::new();
        while self.check(TokenKind::At) {
            let at_span = self.advance().span;
            let name = self.parse_identifier_node("an annotation name")?;
            let span = at_span.merge(name.span);
            annotations.push(Annotation { name, span });
        }

        let name = self.parse_identifier_node("a parameter name")?;
        let start = annotations
            .first()
            .map(|a| a.span)
            .unwrap_or(name.span);
        let mut span = start.merge(name.span);

        let type_ref = if self.match_token(TokenKind::Colon) {
            let type_name = self.parse_identifier_node("a type name")?;
            span = span.merge(type_name.span);
            Some(TypeRef {
                span: type_name.span,
                name: type_name,
            })
        } else {
            None
        };

        Ok(Param {
            annotations,
            name,
            type_ref,
            span,
        })
    }

    // === Statement parsing ===

    /// Parse a braced block
    fn parse_block(&mut self) -> Result<Block, ()> {
        let start = self.consume(TokenKind::LeftBrace, "Expected '{'")?.span;

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(_) => self.synchronize_in_block(),
            }
        }

        let end = self.consume(TokenKind::RightBrace, "Expected '}'")?.span;

        Ok(Block {
            stmts,
            span: start.merge(end),
        })
    }

    /// Parse a single statement
    fn parse_statement(&mut self) -> Result<Stmt, ()> {
        match self.peek().kind {
            TokenKind::Let => Ok(Stmt::Let(self.parse_let()?)),
            TokenKind::If => Ok(Stmt::If(self.parse_if()?)),
            TokenKind::While => Ok(Stmt::While(self.parse_while()?)),
            TokenKind::Return => Ok(Stmt::Return(self.parse_return()?)),
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => self.parse_expr_or_assign(),
        }
    }

    /// Parse a local binding: `let name = expr;`
    fn parse_let(&mut self) -> Result<LetStmt, ()> {
        let let_span = self.consume(TokenKind::Let, "Expected 'let'")?.span;
        let name = self.parse_identifier_node("a binding name")?;
        self.consume(TokenKind::Equal, "Expected '=' in let binding")?;
        let init = self.parse_expression()?;
        let end = self
            .consume(TokenKind::Semicolon, "Expected ';' after let binding")?
            .span;

        Ok(LetStmt {
            name,
            init,
            span: let_span.merge(end),
        })
    }

    /// Parse an if statement
    fn parse_if(&mut self) -> Result<IfStmt, ()> {
        let if_span = self.consume(TokenKind::If, "Expected 'if'")?.span;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;

        let then_block = self.parse_block()?;
        let mut span = if_span.merge(then_block.span);

        let else_block = if self.match_token(TokenKind::Else) {
            let block = self.parse_block()?;
            span = span.merge(block.span);
            Some(block)
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            then_block,
            else_block,
            span,
        })
    }

    /// Parse a while loop
    fn parse_while(&mut self) -> Result<WhileStmt, ()> {
        let while_span = self.consume(TokenKind::While, "Expected 'while'")?.span;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;

        let body = self.parse_block()?;
        let span = while_span.merge(body.span);

        Ok(WhileStmt {
            condition,
            body,
            span,
        })
    }

    /// Parse a return statement
    fn parse_return(&mut self) -> Result<ReturnStmt, ()> {
        let return_span = self.consume(TokenKind::Return, "Expected 'return'")?.span;

        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let end = self
            .consume(TokenKind::Semicolon, "Expected ';' after return")?
            .span;

        Ok(ReturnStmt {
            value,
            span: return_span.merge(end),
        })
    }

    /// Parse an expression statement or an assignment
    fn parse_expr_or_assign(&mut self) -> Result<Stmt, ()> {
        let expr = self.parse_expression()?;

        if self.match_token(TokenKind::Equal) {
            let value = self.parse_expression()?;
            let span = expr.span().merge(value.span());
            self.consume(TokenKind::Semicolon, "Expected ';' after assignment")?;
            return Ok(Stmt::Assign(AssignStmt {
                target: expr,
                value,
                span,
            }));
        }

        let span = expr.span();
        self.consume(TokenKind::Semicolon, "Expected ';' after expression")?;
        Ok(Stmt::Expr(ExprStmt { expr, span }))
    }

    // === Expression parsing (Pratt) ===

    /// Parse an expression
    fn parse_expression(&mut self) -> Result<Expr, ()> {
        self.parse_precedence(Precedence::Lowest)
    }

    fn parse_precedence(&mut self, precedence: Precedence) -> Result<Expr, ()> {
        let mut left = self.parse_prefix()?;

        while precedence < self.current_precedence() {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    /// Parse prefix expression
    fn parse_prefix(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                let value: f64 = token.lexeme.parse().unwrap_or(0.0);
                Ok(Expr::Literal(Literal::Number(value), token.span))
            }
            TokenKind::String => {
                let token = self.advance();
                let inner = token.lexeme.trim_matches('"').to_string();
                Ok(Expr::Literal(Literal::String(inner), token.span))
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                let value = token.kind == TokenKind::True;
                Ok(Expr::Literal(Literal::Bool(value), token.span))
            }
            TokenKind::Null => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::Null, token.span))
            }
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(Expr::Identifier(Identifier {
                    name: token.lexeme,
                    span: token.span,
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
                Ok(expr)
            }
            _ => {
                self.error("Expected expression");
                Err(())
            }
        }
    }

    /// Parse infix expression
    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Dot => self.parse_member(left),
            TokenKind::LeftParen => self.parse_call(left),
            TokenKind::LeftBracket => self.parse_index(left),
            _ => self.parse_binary(left),
        }
    }

    /// Parse member access: `expr.name`
    fn parse_member(&mut self, object: Expr) -> Result<Expr, ()> {
        self.advance(); // '.'
        let member = self.parse_identifier_node("a member name")?;
        let span = object.span().merge(member.span);
        Ok(Expr::Member(MemberExpr {
            object: Box::new(object),
            member,
            span,
        }))
    }

    /// Parse call: `expr(args)`
    fn parse_call(&mut self, callee: Expr) -> Result<Expr, ()> {
        self.advance(); // '('

        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end = self
            .consume(TokenKind::RightParen, "Expected ')' after arguments")?
            .span;
        let span = callee.span().merge(end);

        Ok(Expr::Call(CallExpr {
            callee: Box::new(callee),
            args,
            span,
        }))
    }

    /// Parse index: `expr[index]`
    fn parse_index(&mut self, target: Expr) -> Result<Expr, ()> {
        self.advance(); // '['
        let index = self.parse_expression()?;
        let end = self
            .consume(TokenKind::RightBracket, "Expected ']' after index")?
            .span;
        let span = target.span().merge(end);

        Ok(Expr::Index(IndexExpr {
            target: Box::new(target),
            index: Box::new(index),
            span,
        }))
    }

    /// Parse binary expression
    fn parse_binary(&mut self, left: Expr) -> Result<Expr, ()> {
        let token = self.advance();
        let op = match token.kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::EqualEqual => BinaryOp::Eq,
            TokenKind::BangEqual => BinaryOp::NotEq,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::LessEqual => BinaryOp::LessEq,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::GreaterEqual => BinaryOp::GreaterEq,
            _ => {
                self.error_at(token.span, "Expected operator");
                return Err(());
            }
        };

        let precedence = Self::token_precedence(token.kind);
        let right = self.parse_precedence(precedence)?;
        let span = left.span().merge(right.span());

        Ok(Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        }))
    }

    /// Get current token precedence
    fn current_precedence(&self) -> Precedence {
        Self::token_precedence(self.peek().kind)
    }

    /// Get precedence for a token kind
    fn token_precedence(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equality,
            TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash => Precedence::Factor,
            TokenKind::Dot | TokenKind::LeftParen | TokenKind::LeftBracket => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }

    // === Token helpers ===

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ()> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        self.error(message);
        Err(())
    }

    /// Parse an identifier into an AST node
    fn parse_identifier_node(&mut self, what: &str) -> Result<Identifier, ()> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            return Ok(Identifier {
                name: token.lexeme,
                span: token.span,
            });
        }
        self.error(&format!("Expected {}", what));
        Err(())
    }

    fn error(&mut self, message: &str) {
        let span = self.peek().span;
        self.error_at(span, message);
    }

    fn error_at(&mut self, span: Span, message: &str) {
        self.diagnostics.push(
            Diagnostic::error_with_code(error_codes::UNEXPECTED_TOKEN, message, span)
                .with_label("here"),
        );
    }

    /// Recover at the next item boundary
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.check(TokenKind::Fn) || self.check(TokenKind::Use) {
                return;
            }
            self.advance();
        }
    }

    /// Recover at the next statement boundary within a block
    fn synchronize_in_block(&mut self) {
        while !self.is_at_end() {
            if self.match_token(TokenKind::Semicolon) {
                return;
            }
            match self.peek().kind {
                TokenKind::RightBrace
                | TokenKind::Let
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
