//! Parser state and entry points.
//!
//! The grammar itself is split across `expression.rs` (operators, calls,
//! member access) and `terminal.rs` (literals and bindings); both add
//! methods to [`Parser`]. This module owns the token pump, the nesting guard
//! and error construction.

use crate::arena::Arena;
use crate::ast::{Ast, Node, NodeId, NodeKind};
use crate::error::{ErrorKind, ParseError, SyntaxErrorKind};
use crate::lexer::Lexer;
use crate::regex::{BasicRegexScanner, RegexScanner};
use crate::scope::{ScopeResolver, ScopeTree};
use crate::span::Span;
use crate::token::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Deepest allowed expression nesting.
    pub max_depth: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { max_depth: 200 }
    }
}

/// A parsed compilation unit.
pub struct Program<'a> {
    pub ast: Ast<'a>,
    /// Top node, `None` for empty input.
    pub root: Option<NodeId>,
}

impl Program<'_> {
    /// Compact rendering of the whole tree, empty for empty input.
    pub fn display(&self) -> String {
        self.root
            .map(|root| self.ast.display(root))
            .unwrap_or_default()
    }
}

/// The parser.
pub struct Parser<'a, S = ScopeTree, R = BasicRegexScanner> {
    pub(crate) arena: &'a Arena,
    pub(crate) source: &'a str,
    pub(crate) lexer: Lexer<'a>,
    /// Current token, never a line end.
    pub(crate) token: Token,
    pub(crate) ast: Ast<'a>,
    pub(crate) scope: S,
    pub(crate) regex: R,
    options: ParserOptions,
    depth: u32,
    primed: bool,
}

impl<'a> Parser<'a> {
    /// A parser at global scope with the default regex scanner.
    pub fn new(arena: &'a Arena, source: &'a str, options: ParserOptions) -> Self {
        Self::with_collaborators(arena, source, options, ScopeTree::new(), BasicRegexScanner)
    }
}

impl<'a, S: ScopeResolver, R: RegexScanner> Parser<'a, S, R> {
    /// A parser using the caller's scope store and regex scanner.
    pub fn with_collaborators(
        arena: &'a Arena,
        source: &'a str,
        options: ParserOptions,
        scope: S,
        regex: R,
    ) -> Self {
        Self {
            arena,
            source,
            lexer: Lexer::new(source),
            token: Token::new(TokenKind::End, Span::empty(0), 1),
            ast: Ast::new(arena),
            scope,
            regex,
            options,
            depth: 0,
            primed: false,
        }
    }

    /// The current token: the first one not consumed by the last parse.
    pub fn token(&self) -> Token {
        self.token
    }

    pub fn ast(&self) -> &Ast<'a> {
        &self.ast
    }

    pub fn scope(&self) -> &S {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut S {
        &mut self.scope
    }

    /// Give up the parser, keeping the tree and the scope store.
    pub fn finish(self) -> (Ast<'a>, S) {
        (self.ast, self.scope)
    }

    /// Parse one comma expression starting at the current token. The token
    /// following it is left in [`Parser::token`].
    pub fn parse_expression(&mut self) -> Result<NodeId, ParseError> {
        self.prime()?;
        self.expression()
    }

    /// Parse a sequence of expression statements separated by semicolons or
    /// line breaks. Returns the last statement of the chain.
    pub fn parse_script(&mut self) -> Result<Option<NodeId>, ParseError> {
        self.prime()?;

        let mut last = None;

        loop {
            match self.kind() {
                TokenKind::End => break,
                TokenKind::Semicolon => {
                    self.next()?;
                    continue;
                }
                _ => {}
            }

            let expr = self.expression()?;
            let node = self.ast.get(expr);
            let mut stmt = Node::new(NodeKind::Statement, node.span, node.line);
            stmt.left = last;
            stmt.right = Some(expr);
            last = Some(self.add(stmt));

            match self.kind() {
                TokenKind::Semicolon => {
                    self.next()?;
                }
                TokenKind::End => break,
                _ if self.lexer.prev_kind() == TokenKind::LineEnd => {}
                _ => return Err(self.unexpected()),
            }
        }

        Ok(last)
    }

    // =========================================================================
    // Token Handling
    // =========================================================================

    fn prime(&mut self) -> Result<(), ParseError> {
        if !self.primed {
            self.primed = true;
            self.next()?;
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.token.kind
    }

    /// Advance to the next token that is not a line end.
    pub(crate) fn next(&mut self) -> Result<TokenKind, ParseError> {
        loop {
            let token = self
                .lexer
                .next_token()
                .map_err(|err| ParseError::from_lex(err, self.source))?;

            if token.kind != TokenKind::LineEnd {
                self.token = token;
                return Ok(token.kind);
            }
        }
    }

    /// Advance with keywords read as plain names.
    pub(crate) fn next_property(&mut self) -> Result<TokenKind, ParseError> {
        self.lexer.set_property_mode(true);
        self.next()
    }

    /// Require the current token to be `kind`, then advance past it.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.kind() != kind {
            return Err(self.unexpected_as(SyntaxErrorKind::MissingToken, self.token));
        }
        self.next()?;
        Ok(())
    }

    pub(crate) fn text(&self, span: Span) -> &'a str {
        self.source.get(span.range()).unwrap_or("")
    }

    // =========================================================================
    // Nesting
    // =========================================================================

    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            debug!(depth = self.depth, "expression nesting limit reached");
            return Err(self.error(
                SyntaxErrorKind::NestingTooDeep,
                "Expression nesting is too deep",
                self.token.span,
                self.token.line,
            ));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    fn add(&mut self, node: Node<'a>) -> NodeId {
        let id = self.ast.push(node);
        trace!(target: "tern_parser::parser", id = id.0, kind = ?node.kind, line = node.line, "node");
        id
    }

    pub(crate) fn push(&mut self, kind: NodeKind<'a>, span: Span, line: u32) -> NodeId {
        self.add(Node::new(kind, span, line))
    }

    /// A node consuming one value.
    pub(crate) fn unary_node(
        &mut self,
        kind: NodeKind<'a>,
        operand: NodeId,
        span: Span,
        line: u32,
    ) -> NodeId {
        let span = span.merge(self.ast.get(operand).span);
        let mut node = Node::new(kind, span, line);
        node.left = Some(operand);

        let id = self.add(node);
        self.ast.set_dest(operand, id);
        id
    }

    /// A node consuming two values.
    pub(crate) fn binary_node(
        &mut self,
        kind: NodeKind<'a>,
        left: NodeId,
        right: NodeId,
        line: u32,
    ) -> NodeId {
        let span = self.ast.get(left).span.merge(self.ast.get(right).span);
        let mut node = Node::new(kind, span, line);
        node.left = Some(left);
        node.right = Some(right);

        let id = self.add(node);
        self.ast.set_dest(left, id);
        self.ast.set_dest(right, id);
        id
    }

    // =========================================================================
    // Errors
    // =========================================================================

    pub(crate) fn error(
        &self,
        kind: impl Into<ErrorKind>,
        message: impl Into<String>,
        span: Span,
        line: u32,
    ) -> ParseError {
        ParseError::new(kind, message, line, span)
    }

    /// Error for the current token.
    pub(crate) fn unexpected(&self) -> ParseError {
        self.unexpected_as(SyntaxErrorKind::UnexpectedToken, self.token)
    }

    pub(crate) fn unexpected_as(&self, kind: SyntaxErrorKind, token: Token) -> ParseError {
        let message = match token.kind {
            TokenKind::End => "Unexpected end of input".to_string(),
            _ => format!("Unexpected token \"{}\"", self.text(token.span)),
        };
        self.error(kind, message, token.span, token.line)
    }
}

// =============================================================================
// Convenience
// =============================================================================

/// Parse `source` as a single expression that must span the whole input.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse_expression<'a>(
    arena: &'a Arena,
    source: &'a str,
    options: ParserOptions,
) -> Result<Program<'a>, ParseError> {
    let mut parser = Parser::new(arena, source, options);
    let root = parser.parse_expression()?;

    if parser.kind() != TokenKind::End {
        return Err(parser.unexpected());
    }

    let (ast, _) = parser.finish();
    debug!(nodes = ast.len(), "parsed expression");

    Ok(Program {
        ast,
        root: Some(root),
    })
}

/// Parse `source` as a sequence of expression statements.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse_script<'a>(
    arena: &'a Arena,
    source: &'a str,
    options: ParserOptions,
) -> Result<Program<'a>, ParseError> {
    let mut parser = Parser::new(arena, source, options);
    let root = parser.parse_script()?;

    let (ast, _) = parser.finish();
    debug!(nodes = ast.len(), "parsed script");

    Ok(Program { ast, root })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SyntaxErrorKind};

    #[test]
    fn test_expression_must_consume_input() {
        let arena = Arena::new();
        let err = parse_expression(&arena, "a b", ParserOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.kind, ErrorKind::Syntax(SyntaxErrorKind::UnexpectedToken));
        assert_eq!(err.message, "Unexpected token \"b\"");
        assert_eq!(err.span, Span::new(2, 3));
    }

    #[test]
    fn test_parse_expression_leaves_following_token() {
        let arena = Arena::new();
        let mut parser = Parser::new(&arena, "a + 1; b", ParserOptions::default());
        let root = parser.parse_expression().unwrap();
        assert_eq!(parser.ast().display(root), "ADD(a, 1)");
        assert_eq!(parser.token().kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_script_statements() {
        let arena = Arena::new();
        let program = parse_script(&arena, "a = 1;\nb\n;; c", ParserOptions::default()).unwrap();
        assert_eq!(program.display(), "ASSIGN(a, 1); b; c");
        assert_eq!(program.ast.statements(program.root).len(), 3);
    }

    #[test]
    fn test_script_needs_separator() {
        let arena = Arena::new();
        let err = parse_script(&arena, "a b", ParserOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.message, "Unexpected token \"b\"");
    }

    #[test]
    fn test_empty_script() {
        let arena = Arena::new();
        let program = parse_script(&arena, "  \n// nothing\n", ParserOptions::default()).unwrap();
        assert_eq!(program.root, None);
        assert_eq!(program.display(), "");
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let arena = Arena::new();
        let err = parse_expression(&arena, "1 +", ParserOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.message, "Unexpected end of input");
        assert_eq!(err.to_string(), "SyntaxError: Unexpected end of input in 1");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ParserOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ParserOptions::default());

        let options: ParserOptions = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(options.max_depth, 8);
    }
}
