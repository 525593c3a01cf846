//! Terminals: literals, identifiers and the aggregate literals.
//!
//! Object and array literals lower to the same shape: a chain of
//! statements, each assigning one value to a property of the literal under
//! construction.

use crate::ast::{JsString, NodeId, NodeKind, Operation, Reference, ReferenceKind};
use crate::error::{LexError, LexErrorKind, ParseError, ReferenceErrorKind, SyntaxErrorKind};
use crate::escape;
use crate::lexer::TemplateSegment;
use crate::parser::Parser;
use crate::regex::{RegexErrorKind, RegexScanner};
use crate::scope::ScopeResolver;
use crate::span::Span;
use crate::token::{Builtin, BuiltinClass, Token, TokenKind};

impl<'a, S: ScopeResolver, R: RegexScanner> Parser<'a, S, R> {
    /// A primary expression. Leaves the token after it current.
    pub(crate) fn terminal(&mut self) -> Result<NodeId, ParseError> {
        let token = self.token;

        let node = match token.kind {
            TokenKind::OpenParen => {
                self.next()?;
                let expr = self.expression()?;
                self.expect(TokenKind::CloseParen)?;
                self.ast.get_mut(expr).parenthesized = true;
                return Ok(expr);
            }
            TokenKind::OpenBrace => return self.object(),
            TokenKind::OpenBracket => return self.array(),
            TokenKind::Grave => return self.template_literal(None),

            TokenKind::Division | TokenKind::DivisionAssignment => self.regexp()?,
            TokenKind::String => self.string(token),
            TokenKind::EscapedString => self.escaped_string(token)?,
            TokenKind::Number(n) => self.push(NodeKind::Number(n), token.span, token.line),
            TokenKind::Boolean(b) => self.push(NodeKind::Boolean(b), token.span, token.line),
            TokenKind::Null => self.push(NodeKind::Null, token.span, token.line),

            TokenKind::Name
            | TokenKind::Undefined
            | TokenKind::This
            | TokenKind::Arguments
            | TokenKind::Builtin(_) => self.reference(token.kind, token)?,

            _ => return Err(self.unexpected()),
        };

        self.next()?;
        Ok(node)
    }

    // =========================================================================
    // Strings
    // =========================================================================

    /// A string literal without escapes. The node borrows the source text.
    fn string(&mut self, token: Token) -> NodeId {
        let text = self.text(Span::new(token.span.start + 1, token.span.end - 1));
        let string = JsString::new(self.arena, text, text.chars().count());
        self.push(NodeKind::String(string), token.span, token.line)
    }

    fn escaped_string(&mut self, token: Token) -> Result<NodeId, ParseError> {
        let content = Span::new(token.span.start + 1, token.span.end - 1);
        let string = self.decode(content, token.line)?;
        Ok(self.push(NodeKind::String(string), token.span, token.line))
    }

    /// Decode escaped text into the arena.
    fn decode(&self, content: Span, line: u32) -> Result<JsString<'a>, ParseError> {
        let raw = self.text(content);
        let (text, decoded) = escape::decode_in(self.arena, raw).map_err(|_| {
            ParseError::from_lex(
                LexError::new(LexErrorKind::InvalidEscape, content, line),
                self.source,
            )
        })?;

        Ok(JsString::new(self.arena, text, decoded.length))
    }

    /// A property name as a string constant.
    pub(crate) fn name_string(&mut self, token: Token) -> NodeId {
        let text = self.text(token.span);
        // Identifiers are ASCII, so bytes and code points agree.
        let string = JsString::new(self.arena, text, text.len());
        self.push(NodeKind::String(string), token.span, token.line)
    }

    // =========================================================================
    // Regular Expressions
    // =========================================================================

    fn regexp(&mut self) -> Result<NodeId, ParseError> {
        self.lexer.rollback();

        let (token, literal) = match self.lexer.regex(&self.regex) {
            Ok(scanned) => scanned,
            Err(err) => {
                let message = match err.kind {
                    RegexErrorKind::Unterminated => {
                        format!("Unterminated RegExp \"{}\"", self.text(err.span))
                    }
                    RegexErrorKind::InvalidFlags => {
                        format!("Invalid RegExp flags \"{}\"", self.text(err.span))
                    }
                };
                return Err(self.error(
                    SyntaxErrorKind::InvalidRegExp,
                    message,
                    err.span,
                    self.token.line,
                ));
            }
        };

        self.token = token;

        let kind = NodeKind::RegExp {
            pattern: self.text(literal.pattern),
            flags: self.text(literal.flags),
        };
        Ok(self.push(kind, token.span, token.line))
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    /// An identifier-like token as a binding node. `token` supplies the text
    /// and hash; `kind` may differ from `token.kind` for shorthand properties
    /// read in property mode.
    pub(crate) fn reference(&mut self, kind: TokenKind, token: Token) -> Result<NodeId, ParseError> {
        let name = self.text(token.span);
        let hash = token.key_hash;
        let current = self.scope.current();

        let node = match kind {
            TokenKind::Name => {
                let binding = self.scope.reference(current, name, hash);
                NodeKind::Name(Reference {
                    name,
                    hash,
                    binding,
                    kind: ReferenceKind::Reference,
                })
            }

            TokenKind::Undefined => NodeKind::Undefined,

            TokenKind::This => match self.scope.function_scope(current) {
                Some(function) if !function.crossed_arrow => NodeKind::This,
                Some(function) => {
                    self.scope.add_variable(function.id, name, hash);
                    let binding = self.scope.reference(function.id, name, hash);
                    NodeKind::NonLocalThis {
                        function: function.id,
                        binding,
                    }
                }
                None => {
                    let global = self.scope.global();
                    self.scope.add_variable(global, name, hash);
                    NodeKind::GlobalThis(self.scope.reference(global, name, hash))
                }
            },

            TokenKind::Arguments => {
                let Some(function) = self.scope.function_scope(current) else {
                    return Err(self.error(
                        ReferenceErrorKind::ArgumentsOrThisOutsideFunction,
                        "\"arguments\" object in global scope",
                        token.span,
                        token.line,
                    ));
                };

                self.scope.add_variable(function.id, name, hash);
                self.scope.mark_arguments_object(function.id);
                let binding = self.scope.reference(function.id, name, hash);
                NodeKind::Arguments {
                    function: function.id,
                    binding,
                }
            }

            TokenKind::Builtin(builtin) => self.builtin(builtin, name, hash),

            _ => return Err(self.unexpected_as(SyntaxErrorKind::UnexpectedToken, token)),
        };

        Ok(self.push(node, token.span, token.line))
    }

    /// Namespaces and functions are shared global variables; constructors
    /// live in fixed engine slots and need no binding.
    fn builtin(&mut self, builtin: Builtin, name: &'a str, hash: u32) -> NodeKind<'a> {
        let binding = match builtin.class() {
            BuiltinClass::Constructor => None,
            BuiltinClass::Object | BuiltinClass::Function => {
                let global = self.scope.global();
                self.scope.add_variable(global, name, hash);
                let current = self.scope.current();
                Some(self.scope.reference(current, name, hash))
            }
        };

        NodeKind::Builtin { builtin, binding }
    }

    // =========================================================================
    // Object and Array Literals
    // =========================================================================

    fn object(&mut self) -> Result<NodeId, ParseError> {
        let open = self.token;
        let object = self.push(NodeKind::Object, open.span, open.line);

        loop {
            let key_token = match self.next_property()? {
                TokenKind::CloseBrace => break,
                _ => self.token,
            };

            let (key, shorthand) = match key_token.kind {
                TokenKind::Name => {
                    // The keyword the name would otherwise have been.
                    let kind = self.lexer.property_token();
                    let key = self.name_string(key_token);
                    self.next()?;
                    (key, Some(kind))
                }
                TokenKind::OpenBracket => {
                    self.next()?;
                    let key = self.assignment()?;
                    self.expect(TokenKind::CloseBracket)?;
                    (key, None)
                }
                TokenKind::Number(_) | TokenKind::String | TokenKind::EscapedString => {
                    (self.terminal()?, None)
                }
                _ => return Err(self.unexpected()),
            };

            let value = match (self.kind(), shorthand) {
                (TokenKind::Colon, _) => {
                    self.next()?;
                    self.assignment()?
                }
                (TokenKind::Comma | TokenKind::CloseBrace, Some(kind)) if kind != TokenKind::This => {
                    self.reference(kind, key_token)?
                }
                _ => return Err(self.unexpected()),
            };

            self.object_property(object, key, value);

            match self.kind() {
                TokenKind::Comma => continue,
                TokenKind::CloseBrace => break,
                _ => return Err(self.unexpected_as(SyntaxErrorKind::MissingToken, self.token)),
            }
        }

        let close = self.token;
        let node = self.ast.get_mut(object);
        node.span = node.span.merge(close.span);

        self.next()?;
        Ok(object)
    }

    fn array(&mut self) -> Result<NodeId, ParseError> {
        let open = self.token;
        let array = self.push(NodeKind::Array { length: 0, holes: 0 }, open.span, open.line);

        let mut length = 0;
        let mut holes = 0;

        loop {
            match self.next()? {
                TokenKind::CloseBracket => break,
                TokenKind::Comma => {
                    length += 1;
                    holes += 1;
                    continue;
                }
                _ => {}
            }

            let value = self.assignment()?;
            self.array_item(array, length, value);
            length += 1;

            match self.kind() {
                TokenKind::Comma => continue,
                TokenKind::CloseBracket => break,
                _ => return Err(self.unexpected_as(SyntaxErrorKind::MissingToken, self.token)),
            }
        }

        let close = self.token;
        let node = self.ast.get_mut(array);
        node.kind = NodeKind::Array { length, holes };
        node.span = node.span.merge(close.span);

        self.next()?;
        Ok(array)
    }

    /// Store `value` at numeric index `index` of `array`.
    fn array_item(&mut self, array: NodeId, index: u32, value: NodeId) {
        let node = self.ast.get(value);
        let key = self.push(NodeKind::Number(f64::from(index)), node.span, node.line);
        self.object_property(array, key, value);
    }

    /// Append `literal[key] = value` to the literal's statement chain.
    pub(crate) fn object_property(&mut self, literal: NodeId, key: NodeId, value: NodeId) {
        let line = self.ast.get(key).line;
        let key_span = self.ast.get(key).span;

        let object = self.push(NodeKind::ObjectValue { object: literal }, key_span, line);
        let property = self.binary_node(NodeKind::Property, object, key, line);
        let assign = self.binary_node(NodeKind::Assignment(Operation::Move), property, value, line);

        let span = self.ast.get(assign).span;
        let stmt = self.push(NodeKind::Statement, span, line);
        let previous = self.ast.get(literal).left;

        let node = self.ast.get_mut(stmt);
        node.left = previous;
        node.right = Some(assign);

        self.ast.get_mut(literal).left = Some(stmt);
    }

    // =========================================================================
    // Template Literals
    // =========================================================================

    /// A template literal. With `tag`, the pieces become arguments of that
    /// call: the array of strings first, then one argument per substitution.
    pub(crate) fn template_literal(&mut self, tag: Option<NodeId>) -> Result<NodeId, ParseError> {
        let grave = self.token;
        let strings = self.push(NodeKind::Array { length: 0, holes: 0 }, grave.span, grave.line);

        let (node, mut last_argument) = match tag {
            Some(call) => {
                let argument = self.argument(strings, 0);
                self.ast.get_mut(call).right = Some(argument);
                (call, Some(argument))
            }
            None => {
                let template =
                    self.unary_node(NodeKind::TemplateLiteral, strings, grave.span, grave.line);
                (template, None)
            }
        };

        let mut length = 0;
        let mut slot = 1;

        loop {
            let segment = self
                .lexer
                .template_segment()
                .map_err(|err| ParseError::from_lex(err, self.source))?;

            let string = self.template_string(segment)?;
            self.array_item(strings, length, string);
            length += 1;

            if segment.tail {
                break;
            }

            self.next()?;
            let expr = self.expression()?;

            if self.kind() != TokenKind::CloseBrace {
                return Err(self.error(
                    SyntaxErrorKind::MissingToken,
                    "Missing \"}\" in template expression",
                    self.token.span,
                    self.token.line,
                ));
            }

            match last_argument {
                Some(previous) => {
                    let argument = self.argument(expr, slot);
                    self.ast.get_mut(previous).right = Some(argument);
                    last_argument = Some(argument);
                    slot += 1;
                }
                None => {
                    self.array_item(strings, length, expr);
                    length += 1;
                }
            }
        }

        let end = Span::empty(self.lexer.pos() as u32);
        let array = self.ast.get_mut(strings);
        array.kind = NodeKind::Array { length, holes: 0 };
        array.span = array.span.merge(end);

        let node_ref = self.ast.get_mut(node);
        node_ref.span = node_ref.span.merge(end);

        self.next()?;
        Ok(node)
    }

    fn template_string(&mut self, segment: TemplateSegment) -> Result<NodeId, ParseError> {
        let line = self.lexer.line();

        let string = if segment.escaped {
            self.decode(segment.span, line)?
        } else {
            let text = self.text(segment.span);
            JsString::new(self.arena, text, text.chars().count())
        };

        Ok(self.push(NodeKind::String(string), segment.span, line))
    }
}
