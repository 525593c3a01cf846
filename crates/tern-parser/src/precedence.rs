//! Binary operator precedence tables.
//!
//! Each level lists the tokens it accepts and the node each one builds, and
//! names the level its operands are parsed at. One loop in the expression
//! parser walks every level, so adding an operator is a table edit.

use crate::ast::{NodeKind, Operation};
use crate::token::TokenKind;

/// How the operands of a level are parsed.
pub(crate) enum Next {
    Level(&'static Level),
    Exponential,
    Assignment,
}

pub(crate) struct Level {
    pub next: Next,
    pub ops: &'static [(TokenKind, NodeKind<'static>)],
}

impl Level {
    /// Node built for `kind` at this level, if the level accepts it.
    pub fn find(&self, kind: TokenKind) -> Option<NodeKind<'static>> {
        self.ops
            .iter()
            .find(|(token, _)| *token == kind)
            .map(|&(_, node)| node)
    }
}

pub(crate) static MULTIPLICATIVE: Level = Level {
    next: Next::Exponential,
    ops: &[
        (TokenKind::Multiplication, NodeKind::Binary(Operation::Multiply)),
        (TokenKind::Division, NodeKind::Binary(Operation::Divide)),
        (TokenKind::Remainder, NodeKind::Binary(Operation::Remainder)),
    ],
};

pub(crate) static ADDITIVE: Level = Level {
    next: Next::Level(&MULTIPLICATIVE),
    ops: &[
        (TokenKind::Addition, NodeKind::Binary(Operation::Add)),
        (TokenKind::Subtraction, NodeKind::Binary(Operation::Subtract)),
    ],
};

pub(crate) static SHIFT: Level = Level {
    next: Next::Level(&ADDITIVE),
    ops: &[
        (TokenKind::LeftShift, NodeKind::Binary(Operation::LeftShift)),
        (TokenKind::RightShift, NodeKind::Binary(Operation::RightShift)),
        (
            TokenKind::UnsignedRightShift,
            NodeKind::Binary(Operation::UnsignedRightShift),
        ),
    ],
};

pub(crate) static RELATIONAL: Level = Level {
    next: Next::Level(&SHIFT),
    ops: &[
        (TokenKind::Less, NodeKind::Binary(Operation::Less)),
        (TokenKind::LessOrEqual, NodeKind::Binary(Operation::LessOrEqual)),
        (TokenKind::Greater, NodeKind::Binary(Operation::Greater)),
        (
            TokenKind::GreaterOrEqual,
            NodeKind::Binary(Operation::GreaterOrEqual),
        ),
        (TokenKind::In, NodeKind::Binary(Operation::In)),
        (TokenKind::Instanceof, NodeKind::Binary(Operation::Instanceof)),
    ],
};

pub(crate) static EQUALITY: Level = Level {
    next: Next::Level(&RELATIONAL),
    ops: &[
        (TokenKind::Equal, NodeKind::Binary(Operation::Equal)),
        (TokenKind::NotEqual, NodeKind::Binary(Operation::NotEqual)),
        (TokenKind::StrictEqual, NodeKind::Binary(Operation::StrictEqual)),
        (
            TokenKind::StrictNotEqual,
            NodeKind::Binary(Operation::StrictNotEqual),
        ),
    ],
};

pub(crate) static BITWISE_AND: Level = Level {
    next: Next::Level(&EQUALITY),
    ops: &[(TokenKind::BitwiseAnd, NodeKind::Binary(Operation::BitwiseAnd))],
};

pub(crate) static BITWISE_XOR: Level = Level {
    next: Next::Level(&BITWISE_AND),
    ops: &[(TokenKind::BitwiseXor, NodeKind::Binary(Operation::BitwiseXor))],
};

pub(crate) static BITWISE_OR: Level = Level {
    next: Next::Level(&BITWISE_XOR),
    ops: &[(TokenKind::BitwiseOr, NodeKind::Binary(Operation::BitwiseOr))],
};

pub(crate) static LOGICAL_AND: Level = Level {
    next: Next::Level(&BITWISE_OR),
    ops: &[(TokenKind::LogicalAnd, NodeKind::Logical(Operation::TestIfFalse))],
};

pub(crate) static LOGICAL_OR: Level = Level {
    next: Next::Level(&LOGICAL_AND),
    ops: &[(TokenKind::LogicalOr, NodeKind::Logical(Operation::TestIfTrue))],
};

pub(crate) static COMMA: Level = Level {
    next: Next::Assignment,
    ops: &[(TokenKind::Comma, NodeKind::Comma)],
};

/// Operation performed by an assignment token.
pub(crate) fn assignment_operation(kind: TokenKind) -> Option<Operation> {
    let op = match kind {
        TokenKind::Assignment => Operation::Move,
        TokenKind::AdditionAssignment => Operation::Add,
        TokenKind::SubtractionAssignment => Operation::Subtract,
        TokenKind::MultiplicationAssignment => Operation::Multiply,
        TokenKind::ExponentiationAssignment => Operation::Exponent,
        TokenKind::DivisionAssignment => Operation::Divide,
        TokenKind::RemainderAssignment => Operation::Remainder,
        TokenKind::LeftShiftAssignment => Operation::LeftShift,
        TokenKind::RightShiftAssignment => Operation::RightShift,
        TokenKind::UnsignedRightShiftAssignment => Operation::UnsignedRightShift,
        TokenKind::BitwiseAndAssignment => Operation::BitwiseAnd,
        TokenKind::BitwiseXorAssignment => Operation::BitwiseXor,
        TokenKind::BitwiseOrAssignment => Operation::BitwiseOr,
        _ => return None,
    };

    Some(op)
}

/// Operation performed by a prefix unary token.
pub(crate) fn unary_operation(kind: TokenKind) -> Option<Operation> {
    let op = match kind {
        TokenKind::Addition => Operation::UnaryPlus,
        TokenKind::Subtraction => Operation::UnaryNegation,
        TokenKind::LogicalNot => Operation::LogicalNot,
        TokenKind::BitwiseNot => Operation::BitwiseNot,
        TokenKind::Typeof => Operation::Typeof,
        TokenKind::Void => Operation::Void,
        TokenKind::Delete => Operation::Delete,
        _ => return None,
    };

    Some(op)
}
