//! Lexical analysis (tokenization)
//!
//! The lexer converts Petrify source code into a stream of tokens with
//! byte-accurate span information. Spans index into the original text so
//! the rewriter can splice edits without re-parsing.

use crate::diagnostic::{error_codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer state for tokenizing source code
pub struct Lexer {
    /// Original source code
    source: String,
    /// Characters with their byte offsets
    chars: Vec<(usize, char)>,
    /// Current position in `chars`
    current: usize,
    /// Byte offset where the current token starts
    start_pos: usize,
    /// Collected diagnostics
    diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let chars: Vec<(usize, char)> = source.char_indices().collect();
        Self {
            source,
            chars,
            current: 0,
            start_pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the source code, returning tokens and any diagnostics
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        (tokens, std::mem::take(&mut self.diagnostics))
    }

    /// Scan the next token
    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.start_pos = self.offset();

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof, "");
        }

        let c = self.advance();

        match c {
            '(' => self.make_token(TokenKind::LeftParen, "("),
            ')' => self.make_token(TokenKind::RightParen, ")"),
            '{' => self.make_token(TokenKind::LeftBrace, "{"),
            '}' => self.make_token(TokenKind::RightBrace, "}"),
            '[' => self.make_token(TokenKind::LeftBracket, "["),
            ']' => self.make_token(TokenKind::RightBracket, "]"),
            ';' => self.make_token(TokenKind::Semicolon, ";"),
            ',' => self.make_token(TokenKind::Comma, ","),
            ':' => self.make_token(TokenKind::Colon, ":"),
            '.' => self.make_token(TokenKind::Dot, "."),
            '@' => self.make_token(TokenKind::At, "@"),
            '+' => self.make_token(TokenKind::Plus, "+"),
            '-' => self.make_token(TokenKind::Minus, "-"),
            '*' => self.make_token(TokenKind::Star, "*"),
            '/' => self.make_token(TokenKind::Slash, "/"),

            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqualEqual, "==")
                } else {
                    self.make_token(TokenKind::Equal, "=")
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::BangEqual, "!=")
                } else {
                    self.error_token("Unexpected character '!'")
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::LessEqual, "<=")
                } else {
                    self.make_token(TokenKind::Less, "<")
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::GreaterEqual, ">=")
                } else {
                    self.make_token(TokenKind::Greater, ">")
                }
            }

            '"' => self.scan_string(),

            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            c => self.error_token(format!("Unexpected character '{}'", c)),
        }
    }

    /// Scan a string literal (no escapes, single line)
    fn scan_string(&mut self) -> Token {
        while !self.is_at_end() && self.peek() != '"' && self.peek() != '\n' {
            self.advance();
        }

        if self.is_at_end() || self.peek() == '\n' {
            let span = Span::new(self.start_pos, self.offset());
            self.diagnostics.push(
                Diagnostic::error_with_code(
                    error_codes::UNTERMINATED_STRING,
                    "Unterminated string literal",
                    span,
                )
                .with_label("string starts here"),
            );
            return Token::new(TokenKind::Error, self.lexeme(), span);
        }

        self.advance(); // closing quote
        self.make_lexeme_token(TokenKind::String)
    }

    /// Scan a number literal (integer or decimal)
    fn scan_number(&mut self) -> Token {
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
        }

        if !self.is_at_end() && self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume '.'
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        self.make_lexeme_token(TokenKind::Number)
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) -> Token {
        while !self.is_at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
            self.advance();
        }

        let lexeme = self.lexeme();
        let kind = TokenKind::keyword(&lexeme).unwrap_or(TokenKind::Identifier);
        self.make_lexeme_token(kind)
    }

    /// Skip whitespace and `//` line comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.is_at_end() {
                return;
            }
            let c = self.peek();
            if c.is_whitespace() {
                self.advance();
            } else if c == '/' && self.peek_next() == '/' {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
            } else {
                return;
            }
        }
    }

    // === Helpers ===

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    /// Byte offset of the current position
    fn offset(&self) -> usize {
        if self.current < self.chars.len() {
            self.chars[self.current].0
        } else {
            self.source.len()
        }
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current].1;
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).map_or('\0', |&(_, c)| c)
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.current + 1).map_or('\0', |&(_, c)| c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.current += 1;
        true
    }

    /// Source text of the current token
    fn lexeme(&self) -> String {
        self.source[self.start_pos..self.offset()].to_string()
    }

    fn make_token(&self, kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, Span::new(self.start_pos, self.offset()))
    }

    fn make_lexeme_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.lexeme(), Span::new(self.start_pos, self.offset()))
    }

    fn error_token(&mut self, message: impl Into<String>) -> Token {
        let span = Span::new(self.start_pos, self.offset());
        self.diagnostics.push(Diagnostic::error_with_code(
            error_codes::UNEXPECTED_CHARACTER,
            message,
            span,
        ));
        Token::new(TokenKind::Error, self.lexeme(), span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let (tokens, diags) = lexer.tokenize();
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_annotation_tokens() {
        assert_eq!(
            kinds("@frozen cfg"),
            vec![
                TokenKind::At,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("fn let use as"),
            vec![
                TokenKind::Fn,
                TokenKind::Let,
                TokenKind::Use,
                TokenKind::As,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_member_assignment() {
        assert_eq!(
            kinds("a.x = 1;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let mut lexer = Lexer::new("ab.cd = 10;");
        let (tokens, _) = lexer.tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(2, 3));
        assert_eq!(tokens[2].span, Span::new(3, 5));
        assert_eq!(tokens[4].span, Span::new(8, 10));
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("a // trailing comment\nb"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"oops");
        let (tokens, diags) = lexer.tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, error_codes::UNTERMINATED_STRING);
    }

    #[test]
    fn test_number_literals() {
        let mut lexer = Lexer::new("42 3.14");
        let (tokens, _) = lexer.tokenize();
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].lexeme, "3.14");
    }
}
