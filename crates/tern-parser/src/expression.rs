//! Operator expressions.
//!
//! Precedence climbing from the comma operator down to member access. The
//! binary levels between `||` and `*` are table driven (see
//! `precedence.rs`); everything with special rules has its own method.

use crate::ast::{NodeId, NodeKind, Operation, ReferenceKind};
use crate::error::{ParseError, ReferenceErrorKind, SyntaxErrorKind};
use crate::parser::Parser;
use crate::precedence::{self, Level, Next, COMMA, LOGICAL_OR};
use crate::regex::RegexScanner;
use crate::scope::ScopeResolver;
use crate::span::Span;
use crate::token::{Builtin, Token, TokenKind};

impl<'a, S: ScopeResolver, R: RegexScanner> Parser<'a, S, R> {
    /// Comma expression.
    pub(crate) fn expression(&mut self) -> Result<NodeId, ParseError> {
        self.binary(&COMMA)
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    pub(crate) fn assignment(&mut self) -> Result<NodeId, ParseError> {
        self.enter()?;
        let target = self.conditional()?;
        self.leave();

        let Some(op) = precedence::assignment_operation(self.kind()) else {
            return Ok(target);
        };

        let operator = self.token;
        self.check_assignment_target(target)?;

        self.next()?;
        self.enter()?;
        let value = self.assignment()?;
        self.leave();

        Ok(self.binary_node(NodeKind::Assignment(op), target, value, operator.line))
    }

    fn check_assignment_target(&self, target: NodeId) -> Result<(), ParseError> {
        let node = self.ast.get(target);
        if node.is_lvalue() {
            return Ok(());
        }

        let forbidden = match node.kind {
            NodeKind::Builtin {
                builtin: Builtin::Eval,
                ..
            } => Some("eval"),
            NodeKind::Arguments { .. } => Some("arguments"),
            _ => None,
        };

        Err(match forbidden {
            Some(name) => self.error(
                SyntaxErrorKind::ForbiddenIdentifier,
                format!("Identifier \"{name}\" is forbidden as left-hand in assignment"),
                node.span,
                node.line,
            ),
            None => self.error(
                ReferenceErrorKind::InvalidAssignmentTarget,
                "Invalid left-hand side in assignment",
                node.span,
                node.line,
            ),
        })
    }

    // =========================================================================
    // Conditional and Coalesce
    // =========================================================================

    fn conditional(&mut self) -> Result<NodeId, ParseError> {
        let test = self.coalesce()?;

        if self.kind() != TokenKind::Conditional {
            return Ok(test);
        }

        let question = self.token;
        self.next()?;
        let consequent = self.assignment()?;
        self.expect(TokenKind::Colon)?;
        let alternate = self.assignment()?;

        let branching = self.binary_node(NodeKind::Branching, consequent, alternate, question.line);
        let cond = self.binary_node(NodeKind::Conditional, test, branching, question.line);

        // Both branches deliver their value to the conditional itself.
        self.ast.set_dest(consequent, cond);
        self.ast.set_dest(alternate, cond);

        Ok(cond)
    }

    fn coalesce(&mut self) -> Result<NodeId, ParseError> {
        let mut left = self.binary(&LOGICAL_OR)?;

        while self.kind() == TokenKind::Coalesce {
            let operator = self.token;
            self.check_coalesce_operand(left, operator)?;

            self.next()?;
            let right = self.binary(&LOGICAL_OR)?;
            self.check_coalesce_operand(right, operator)?;

            left = self.binary_node(NodeKind::Coalesce, left, right, operator.line);
        }

        Ok(left)
    }

    /// `??` does not mix with unparenthesized `&&` or `||`.
    fn check_coalesce_operand(&self, operand: NodeId, operator: Token) -> Result<(), ParseError> {
        let node = self.ast.get(operand);
        if matches!(node.kind, NodeKind::Logical(_)) && !node.parenthesized {
            return Err(self.error(
                SyntaxErrorKind::RequiredParenthesization,
                "Either \"??\" or \"||\"/\"&&\" expression must be parenthesized",
                operator.span,
                operator.line,
            ));
        }
        Ok(())
    }

    // =========================================================================
    // Binary Levels
    // =========================================================================

    /// Left-associative chain of the operators accepted by `level`.
    fn binary(&mut self, level: &'static Level) -> Result<NodeId, ParseError> {
        let mut left = self.operand(&level.next)?;

        while let Some(kind) = level.find(self.kind()) {
            let line = self.token.line;
            self.next()?;
            let right = self.operand(&level.next)?;
            left = self.binary_node(kind, left, right, line);
        }

        Ok(left)
    }

    fn operand(&mut self, next: &'static Next) -> Result<NodeId, ParseError> {
        match next {
            Next::Level(level) => self.binary(level),
            Next::Exponential => self.exponential(),
            Next::Assignment => self.assignment(),
        }
    }

    /// `**` is right-associative.
    fn exponential(&mut self) -> Result<NodeId, ParseError> {
        let base = self.unary()?;

        if self.kind() != TokenKind::Exponentiation {
            return Ok(base);
        }

        let line = self.token.line;
        self.next()?;
        self.enter()?;
        let exponent = self.exponential()?;
        self.leave();

        Ok(self.binary_node(NodeKind::Binary(Operation::Exponent), base, exponent, line))
    }

    // =========================================================================
    // Unary and Update
    // =========================================================================

    fn unary(&mut self) -> Result<NodeId, ParseError> {
        let Some(op) = precedence::unary_operation(self.kind()) else {
            return self.prefix_update();
        };

        let operator = self.token;
        self.next()?;
        self.enter()?;
        let operand = self.unary()?;
        self.leave();

        if self.kind() == TokenKind::Exponentiation {
            return Err(self.error(
                SyntaxErrorKind::RequiredParenthesization,
                "Either left-hand side or entire exponentiation must be parenthesized",
                self.token.span,
                self.token.line,
            ));
        }

        let node = self.ast.get(operand);
        let folded = match (op, node.kind) {
            (Operation::UnaryPlus, NodeKind::Number(n)) => NodeKind::Number(n),
            (Operation::UnaryNegation, NodeKind::Number(n)) => NodeKind::Number(-n),
            (Operation::Delete, NodeKind::Property) => NodeKind::PropertyDelete,
            (Operation::Delete, NodeKind::Name(_) | NodeKind::Undefined) => {
                return Err(self.error(
                    SyntaxErrorKind::InvalidDelete,
                    "Delete of an unqualified identifier",
                    node.span,
                    node.line,
                ));
            }
            (Operation::Typeof, NodeKind::Name(mut reference)) => {
                reference.kind = ReferenceKind::Typeof;
                self.ast.get_mut(operand).kind = NodeKind::Name(reference);
                return Ok(self.unary_node(
                    NodeKind::Unary(op),
                    operand,
                    operator.span,
                    operator.line,
                ));
            }
            _ => {
                return Ok(self.unary_node(
                    NodeKind::Unary(op),
                    operand,
                    operator.span,
                    operator.line,
                ))
            }
        };

        // The operand node absorbs the operator.
        let node = self.ast.get_mut(operand);
        node.kind = folded;
        node.span = operator.span.merge(node.span);
        Ok(operand)
    }

    fn prefix_update(&mut self) -> Result<NodeId, ParseError> {
        let op = match self.kind() {
            TokenKind::Increment => Operation::Increment,
            TokenKind::Decrement => Operation::Decrement,
            _ => return self.postfix_update(),
        };

        let operator = self.token;
        self.next()?;
        let operand = self.call_expression()?;

        let node = self.ast.get(operand);
        if !node.is_lvalue() {
            return Err(self.error(
                ReferenceErrorKind::InvalidAssignmentTarget,
                "Invalid left-hand side in prefix operation",
                node.span,
                node.line,
            ));
        }

        Ok(self.unary_node(NodeKind::Update(op), operand, operator.span, operator.line))
    }

    fn postfix_update(&mut self) -> Result<NodeId, ParseError> {
        let operand = self.call_expression()?;

        let op = match self.kind() {
            TokenKind::Increment => Operation::PostIncrement,
            TokenKind::Decrement => Operation::PostDecrement,
            _ => return Ok(operand),
        };

        // A line break before `++`/`--` ends the statement instead.
        if self.lexer.prev_kind() == TokenKind::LineEnd {
            self.lexer.rollback();
            self.token = Token::new(
                TokenKind::Semicolon,
                Span::empty(self.token.span.start),
                self.token.line,
            );
            return Ok(operand);
        }

        let node = self.ast.get(operand);
        if !node.is_lvalue() {
            return Err(self.error(
                ReferenceErrorKind::InvalidAssignmentTarget,
                "Invalid left-hand side in postfix operation",
                node.span,
                node.line,
            ));
        }

        let operator = self.token;
        self.next()?;

        Ok(self.unary_node(NodeKind::Update(op), operand, operator.span, operator.line))
    }

    // =========================================================================
    // Calls and Member Access
    // =========================================================================

    pub(crate) fn call_expression(&mut self) -> Result<NodeId, ParseError> {
        self.enter()?;
        let mut node = if self.kind() == TokenKind::New {
            self.new_expression()?
        } else {
            self.terminal()?
        };
        self.leave();

        loop {
            node = self.property_expression(node)?;

            if !matches!(self.kind(), TokenKind::OpenParen | TokenKind::Grave) {
                return Ok(node);
            }

            self.enter()?;
            node = self.call(node, false)?;
            self.leave();
        }
    }

    /// `new` with its callee and optional argument list.
    fn new_expression(&mut self) -> Result<NodeId, ParseError> {
        let new = self.token;
        self.next()?;

        self.enter()?;
        let callee = if self.kind() == TokenKind::New {
            self.new_expression()?
        } else {
            let node = self.terminal()?;
            self.property_expression(node)?
        };
        self.leave();

        let call = self.call(callee, true)?;
        let node = self.ast.get_mut(call);
        node.span = new.span.merge(node.span);
        Ok(call)
    }

    /// Chain of `.name` and `[expr]` accesses.
    fn property_expression(&mut self, mut object: NodeId) -> Result<NodeId, ParseError> {
        loop {
            let (key, end) = match self.kind() {
                TokenKind::Dot => {
                    if self.next_property()? != TokenKind::Name {
                        return Err(self.unexpected());
                    }
                    let name = self.token;
                    let key = self.name_string(name);
                    self.next()?;
                    (key, name.span)
                }
                TokenKind::OpenBracket => {
                    self.next()?;
                    let key = self.expression()?;
                    let close = self.token;
                    self.expect(TokenKind::CloseBracket)?;
                    (key, close.span)
                }
                _ => return Ok(object),
            };

            let line = self.ast.get(object).line;
            object = self.binary_node(NodeKind::Property, object, key, line);

            let node = self.ast.get_mut(object);
            node.span = node.span.merge(end);
        }
    }

    /// Wrap `callee` in a call node and parse its arguments, if any.
    fn call(&mut self, callee: NodeId, ctor: bool) -> Result<NodeId, ParseError> {
        let node = self.ast.get(callee);
        let kind = match node.kind {
            NodeKind::Property => NodeKind::MethodCall { ctor },
            _ => NodeKind::FunctionCall { ctor },
        };

        let call = self.unary_node(kind, callee, node.span, node.line);

        match self.kind() {
            TokenKind::OpenParen => self.arguments(call)?,
            TokenKind::Grave => self.template_literal(Some(call))?,
            _ => return Ok(call),
        };

        Ok(call)
    }

    /// `( a, b, ... )` chained from the call node through `right`.
    fn arguments(&mut self, call: NodeId) -> Result<NodeId, ParseError> {
        let mut parent = call;
        let mut slot = 0;

        loop {
            if self.next()? == TokenKind::CloseParen {
                break;
            }

            let value = self.assignment()?;
            let argument = self.argument(value, slot);
            self.ast.get_mut(parent).right = Some(argument);
            parent = argument;
            slot += 1;

            match self.kind() {
                TokenKind::Comma => continue,
                TokenKind::CloseParen => break,
                _ => return Err(self.unexpected_as(SyntaxErrorKind::MissingToken, self.token)),
            }
        }

        let close = self.token;
        let node = self.ast.get_mut(call);
        node.span = node.span.merge(close.span);

        self.next()?;
        Ok(call)
    }

    pub(crate) fn argument(&mut self, value: NodeId, slot: u32) -> NodeId {
        let node = self.ast.get(value);
        self.unary_node(NodeKind::Argument { slot }, value, node.span, node.line)
    }
}

#[cfg(test)]
mod tests {
    use crate::arena::Arena;
    use crate::error::{ErrorKind, ParseError, ReferenceErrorKind, SyntaxErrorKind};
    use crate::parser::{parse_expression, ParserOptions};

    fn parse(source: &str) -> String {
        let arena = Arena::new();
        let result = match parse_expression(&arena, source, ParserOptions::default()) {
            Ok(program) => program.display(),
            Err(err) => panic!("{source}: {err}"),
        };
        result
    }

    fn parse_err(source: &str) -> ParseError {
        let arena = Arena::new();
        let result = match parse_expression(&arena, source, ParserOptions::default()) {
            Ok(program) => panic!("{source}: parsed as {}", program.display()),
            Err(err) => err,
        };
        result
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse("1 + 2 * 3"), "ADD(1, MULTIPLY(2, 3))");
        assert_eq!(parse("a - b - c"), "SUBTRACT(SUBTRACT(a, b), c)");
        assert_eq!(parse("a < b == c"), "EQUAL(LESS(a, b), c)");
        assert_eq!(parse("a | b ^ c & d"), "BITWISE_OR(a, BITWISE_XOR(b, BITWISE_AND(c, d)))");
        assert_eq!(parse("a << 1 >>> 2"), "UNSIGNED_RIGHT_SHIFT(LEFT_SHIFT(a, 1), 2)");
        assert_eq!(parse("a in b instanceof c"), "INSTANCEOF(IN(a, b), c)");
        assert_eq!(parse("a || b && c"), "OR(a, AND(b, c))");
        assert_eq!(parse("(1 + 2) * 3"), "MULTIPLY(ADD(1, 2), 3)");
        assert_eq!(parse("a, b = 1"), "COMMA(a, ASSIGN(b, 1))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(parse("a = b = 1"), "ASSIGN(a, ASSIGN(b, 1))");
        assert_eq!(parse("a += 2"), "ADD_ASSIGN(a, 2)");
        assert_eq!(parse("a.b **= 2"), "EXPONENT_ASSIGN(PROPERTY(a, \"b\"), 2)");
        assert_eq!(parse("a[0] >>>= 1"), "UNSIGNED_RIGHT_SHIFT_ASSIGN(PROPERTY(a, 0), 1)");
    }

    #[test]
    fn test_invalid_assignment_targets() {
        let err = parse_err("1 = 2");
        assert_eq!(
            err.kind,
            ErrorKind::Reference(ReferenceErrorKind::InvalidAssignmentTarget)
        );
        assert_eq!(err.to_string(), "ReferenceError: Invalid left-hand side in assignment in 1");

        let err = parse_err("a + b = c");
        assert_eq!(err.message, "Invalid left-hand side in assignment");

        let err = parse_err("eval = 1");
        assert_eq!(err.kind, ErrorKind::Syntax(SyntaxErrorKind::ForbiddenIdentifier));
        assert_eq!(
            err.message,
            "Identifier \"eval\" is forbidden as left-hand in assignment"
        );
    }

    #[test]
    fn test_conditional() {
        assert_eq!(parse("a ? b : c"), "CONDITIONAL(a, b, c)");
        assert_eq!(
            parse("a ? b : c ? d : e"),
            "CONDITIONAL(a, b, CONDITIONAL(c, d, e))"
        );
        assert_eq!(parse("a ? b = 1 : c"), "CONDITIONAL(a, ASSIGN(b, 1), c)");

        let err = parse_err("a ? b c");
        assert_eq!(err.kind, ErrorKind::Syntax(SyntaxErrorKind::MissingToken));
        assert_eq!(err.message, "Unexpected token \"c\"");
    }

    #[test]
    fn test_coalesce() {
        assert_eq!(parse("a ?? b ?? c"), "COALESCE(COALESCE(a, b), c)");
        assert_eq!(parse("(a || b) ?? c"), "COALESCE(OR(a, b), c)");
        assert_eq!(parse("a ?? (b && c)"), "COALESCE(a, AND(b, c))");
        assert_eq!(parse("a ?? b | c"), "COALESCE(a, BITWISE_OR(b, c))");

        for source in ["a || b ?? c", "a ?? b || c", "a && b ?? c", "a ?? b && c"] {
            let err = parse_err(source);
            assert_eq!(
                err.kind,
                ErrorKind::Syntax(SyntaxErrorKind::RequiredParenthesization),
                "{source}"
            );
        }
    }

    #[test]
    fn test_exponent() {
        assert_eq!(parse("2 ** 3 ** 2"), "EXPONENT(2, EXPONENT(3, 2))");
        assert_eq!(parse("(-2) ** 2"), "EXPONENT(-2, 2)");
        assert_eq!(parse("2 ** -2"), "EXPONENT(2, -2)");
        assert_eq!(parse("a * b ** c"), "MULTIPLY(a, EXPONENT(b, c))");

        let err = parse_err("-2 ** 2");
        assert_eq!(err.kind, ErrorKind::Syntax(SyntaxErrorKind::RequiredParenthesization));
        assert_eq!(
            err.message,
            "Either left-hand side or entire exponentiation must be parenthesized"
        );
        assert!(parse_err("typeof a ** 2").is_syntax());
    }

    #[test]
    fn test_unary() {
        assert_eq!(parse("-1"), "-1");
        assert_eq!(parse("+1"), "1");
        assert_eq!(parse("- -1"), "1");
        assert_eq!(parse("-a"), "NEGATE(a)");
        assert_eq!(parse("!a"), "NOT(a)");
        assert_eq!(parse("~a"), "BITWISE_NOT(a)");
        assert_eq!(parse("void 0"), "VOID(0)");
        assert_eq!(parse("typeof a"), "TYPEOF(a)");
        assert_eq!(parse("-a * b"), "MULTIPLY(NEGATE(a), b)");
    }

    #[test]
    fn test_delete() {
        assert_eq!(parse("delete a.b"), "PROPERTY_DELETE(a, \"b\")");
        assert_eq!(parse("delete a[1]"), "PROPERTY_DELETE(a, 1)");
        assert_eq!(parse("delete 1"), "DELETE(1)");

        let err = parse_err("delete a");
        assert_eq!(err.kind, ErrorKind::Syntax(SyntaxErrorKind::InvalidDelete));
        assert_eq!(err.message, "Delete of an unqualified identifier");
        assert!(parse_err("delete undefined").is_syntax());
    }

    #[test]
    fn test_update() {
        assert_eq!(parse("++a"), "INCREMENT(a)");
        assert_eq!(parse("--a.b"), "DECREMENT(PROPERTY(a, \"b\"))");
        assert_eq!(parse("a++"), "POST_INCREMENT(a)");
        assert_eq!(parse("a[0]--"), "POST_DECREMENT(PROPERTY(a, 0))");

        let err = parse_err("++1");
        assert_eq!(err.message, "Invalid left-hand side in prefix operation");
        assert!(!err.is_syntax());

        let err = parse_err("f()++");
        assert_eq!(err.message, "Invalid left-hand side in postfix operation");
    }

    #[test]
    fn test_calls() {
        assert_eq!(parse("f()"), "CALL(f)");
        assert_eq!(parse("f(1, a + b)"), "CALL(f, 1, ADD(a, b))");
        assert_eq!(parse("f(1,)"), "CALL(f, 1)");
        assert_eq!(parse("a.b(c)(d)"), "CALL(CALL(PROPERTY(a, \"b\"), c), d)");
        assert_eq!(parse("f(a, b = 2)"), "CALL(f, a, ASSIGN(b, 2))");

        assert!(parse_err("f(,)").is_syntax());
        let err = parse_err("f(a b)");
        assert_eq!(err.kind, ErrorKind::Syntax(SyntaxErrorKind::MissingToken));
    }

    #[test]
    fn test_new() {
        assert_eq!(parse("new A"), "NEW(A)");
        assert_eq!(parse("new A(1)"), "NEW(A, 1)");
        assert_eq!(parse("new a.B(1).c"), "PROPERTY(NEW(PROPERTY(a, \"B\"), 1), \"c\")");
        assert_eq!(parse("new new A()()"), "NEW(NEW(A))");
        assert_eq!(parse("new A()()"), "CALL(NEW(A))");
    }

    #[test]
    fn test_member_access() {
        assert_eq!(parse("a.b.c"), "PROPERTY(PROPERTY(a, \"b\"), \"c\")");
        assert_eq!(parse("a.if"), "PROPERTY(a, \"if\")");
        assert_eq!(parse("a[b + 1]"), "PROPERTY(a, ADD(b, 1))");
        assert_eq!(parse("a\n.b"), "PROPERTY(a, \"b\")");

        assert!(parse_err("a.1").is_syntax());
        let err = parse_err("a[1");
        assert_eq!(err.message, "Unexpected end of input");
    }
}
